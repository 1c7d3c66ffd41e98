//! Staged damage computation.
//!
//! ```text
//! base → critical → direct hit → variance → outgoing % → incoming %
//! ```
//!
//! The rounding rule from the formula set is applied after every stage, so a
//! floor at one stage is never undone by a later multiplier.

use crate::stats::StatBlock;
use crate::types::{Attribute, DamageKind};

use super::{CombatFormulas, DamageRoll};

/// Typed parameters of a damaging effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageProfile {
    pub potency: u32,
    pub kind: DamageKind,
    /// Primary attribute added to attack power.
    pub scaling: Option<Attribute>,
    pub can_crit: bool,
    pub can_direct_hit: bool,
}

impl DamageProfile {
    pub const fn new(potency: u32) -> Self {
        Self {
            potency,
            kind: DamageKind::Physical,
            scaling: None,
            can_crit: true,
            can_direct_hit: true,
        }
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: DamageKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub const fn scaled_by(mut self, attribute: Attribute) -> Self {
        self.scaling = Some(attribute);
        self
    }

    #[must_use]
    pub const fn without_crit(mut self) -> Self {
        self.can_crit = false;
        self
    }

    #[must_use]
    pub const fn without_direct_hit(mut self) -> Self {
        self.can_direct_hit = false;
        self
    }
}

/// Final damage of one effect application.
///
/// `outgoing` and `incoming` are percentage modifiers (10 = +10%) from the
/// source's and target's auras, applied one at a time in the given order.
pub fn compute_damage(
    formulas: &dyn CombatFormulas,
    profile: &DamageProfile,
    source: &StatBlock,
    target: &StatBlock,
    roll: &DamageRoll,
    outgoing: &[i32],
    incoming: &[i32],
) -> u32 {
    if !roll.outcome.landed() {
        return 0;
    }

    let rounding = formulas.rounding();
    let mut damage = rounding.apply(formulas.base_damage(profile, source, target));

    if roll.outcome.is_critical() {
        damage = rounding.apply(f64::from(damage) * formulas.critical_multiplier(source));
    }
    if roll.outcome.is_direct() {
        damage = rounding.apply(f64::from(damage) * formulas.direct_hit_multiplier(source));
    }

    damage = rounding.apply(f64::from(damage) * f64::from(roll.variance) / 1_000.0);

    for percent in outgoing.iter().chain(incoming) {
        damage = rounding.apply(f64::from(damage) * f64::from(100 + percent) / 100.0);
    }

    damage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{CombatParams, StandardFormulas};
    use crate::types::HitResult;

    fn roll(outcome: HitResult, variance: u32) -> DamageRoll {
        DamageRoll { outcome, variance }
    }

    #[test]
    fn plain_hit_deals_base_damage() {
        let formulas = StandardFormulas::default();
        let stats = StatBlock::new();
        let damage = compute_damage(
            &formulas,
            &DamageProfile::new(20),
            &stats,
            &stats,
            &roll(HitResult::Hit, 1_000),
            &[],
            &[],
        );
        assert_eq!(damage, 20);
    }

    #[test]
    fn misses_and_dodges_deal_nothing() {
        let formulas = StandardFormulas::default();
        let stats = StatBlock::new();
        for outcome in [HitResult::Miss, HitResult::Dodge] {
            let damage = compute_damage(
                &formulas,
                &DamageProfile::new(500),
                &stats,
                &stats,
                &roll(outcome, 1_000),
                &[10],
                &[],
            );
            assert_eq!(damage, 0);
        }
    }

    #[test]
    fn stages_floor_independently() {
        let formulas = StandardFormulas::default();
        let stats = StatBlock::new();
        // 333 → ×1.4 = 466.2 → 466 → ×1.25 = 582.5 → 582 → ×0.95 = 552.9 → 552
        let damage = compute_damage(
            &formulas,
            &DamageProfile::new(333),
            &stats,
            &stats,
            &roll(HitResult::CriticalDirect, 950),
            &[],
            &[],
        );
        assert_eq!(damage, 552);
    }

    #[test]
    fn aura_multipliers_apply_in_order() {
        let formulas = StandardFormulas::new(CombatParams::new().with_rounding(crate::math::Rounding::Floor));
        let stats = StatBlock::new();
        // 101 → ×1.10 = 111.1 → 111 → ×1.05 = 116.55 → 116
        let damage = compute_damage(
            &formulas,
            &DamageProfile::new(101),
            &stats,
            &stats,
            &roll(HitResult::Hit, 1_000),
            &[10],
            &[5],
        );
        assert_eq!(damage, 116);
    }
}
