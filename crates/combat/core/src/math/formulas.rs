//! Pluggable combat formulas.
//!
//! The engine only talks to [`CombatFormulas`]. [`StandardFormulas`] is a
//! neutral linear model whose numbers all live in [`CombatParams`]; games swap
//! in their own tables by implementing the trait.

use crate::equipment::Weapon;
use crate::stats::StatBlock;
use crate::types::{Attribute, SimTime};

use super::{DamageProfile, Permille, Rounding};

/// Formula interface consumed by action resolution and aura ticks.
pub trait CombatFormulas: Send + Sync {
    /// Chance that an effect from `source` is not a miss.
    fn hit_chance(&self, source: &StatBlock, target: &StatBlock) -> Permille;

    /// Chance that a hit is dodged by `target`.
    fn dodge_chance(&self, source: &StatBlock, target: &StatBlock) -> Permille;

    fn critical_chance(&self, source: &StatBlock) -> Permille;

    fn direct_hit_chance(&self, source: &StatBlock) -> Permille;

    fn critical_multiplier(&self, source: &StatBlock) -> f64;

    fn direct_hit_multiplier(&self, source: &StatBlock) -> f64;

    /// Unrounded damage before outcome multipliers.
    fn base_damage(&self, profile: &DamageProfile, source: &StatBlock, target: &StatBlock)
    -> f64;

    /// Half-width of the uniform damage spread.
    fn variance(&self) -> Permille;

    fn rounding(&self) -> Rounding;

    /// Cast or recast time after speed scaling.
    fn scaled_duration(&self, base: SimTime, speed: i32) -> SimTime;

    /// Profile of one automatic swing with `weapon`.
    fn auto_attack_profile(&self, weapon: &Weapon) -> DamageProfile {
        weapon.damage
    }
}

/// Linear chance curve: `clamp(base + stat / divisor, min, max)` per-mille.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChanceParams {
    pub base: i32,
    pub divisor: i32,
    pub min: u32,
    pub max: u32,
}

impl ChanceParams {
    pub const fn fixed(value: u32) -> Self {
        Self {
            base: value as i32,
            divisor: 0,
            min: value,
            max: value,
        }
    }

    pub fn chance(&self, stat: i32) -> Permille {
        let scaled = if self.divisor == 0 {
            0
        } else {
            stat / self.divisor
        };
        let min = i32::try_from(self.min).unwrap_or(i32::MAX);
        let max = i32::try_from(self.max).unwrap_or(i32::MAX);
        // Not `clamp`: a misconfigured `min > max` resolves to `max`.
        let value = self.base.saturating_add(scaled).max(min).min(max);
        Permille::new(value.max(0) as u32)
    }
}

/// Balance parameters for [`StandardFormulas`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatParams {
    /// Driven by `accuracy - evasion`.
    pub hit: ChanceParams,
    /// Driven by the target's evasion.
    pub dodge: ChanceParams,
    pub critical: ChanceParams,
    pub direct_hit: ChanceParams,

    /// Critical multiplier per-mille: `base + critical_hit / divisor`.
    pub critical_multiplier_base: u32,
    pub critical_multiplier_divisor: i32,
    /// Direct hit multiplier per-mille.
    pub direct_hit_multiplier: u32,

    /// Attack factor: `1 + attack / attack_divisor`.
    pub attack_divisor: i32,
    /// Mitigation factor: `c / (c + defense)`.
    pub defense_constant: i32,

    pub variance: u32,
    /// Speed reduction per-mille: `speed / speed_divisor`, capped.
    pub speed_divisor: i32,
    pub max_speed_reduction: u32,

    /// Weapon delay at which a swing deals its listed potency; slower
    /// weapons hit proportionally harder.
    pub auto_attack_reference_delay: SimTime,

    pub rounding: Rounding,
}

impl CombatParams {
    pub const DEFAULT_VARIANCE: u32 = 50;
    pub const DEFAULT_CRITICAL_MULTIPLIER: u32 = 1_400;
    pub const DEFAULT_DIRECT_HIT_MULTIPLIER: u32 = 1_250;
    pub const DEFAULT_AUTO_ATTACK_REFERENCE_DELAY: SimTime = SimTime::from_secs(3);

    pub fn new() -> Self {
        Self {
            hit: ChanceParams {
                base: 1_000,
                divisor: 10,
                min: 500,
                max: 1_000,
            },
            dodge: ChanceParams {
                base: 0,
                divisor: 10,
                min: 0,
                max: 500,
            },
            critical: ChanceParams {
                base: 50,
                divisor: 10,
                min: 0,
                max: 1_000,
            },
            direct_hit: ChanceParams {
                base: 0,
                divisor: 10,
                min: 0,
                max: 1_000,
            },
            critical_multiplier_base: Self::DEFAULT_CRITICAL_MULTIPLIER,
            critical_multiplier_divisor: 10,
            direct_hit_multiplier: Self::DEFAULT_DIRECT_HIT_MULTIPLIER,
            attack_divisor: 100,
            defense_constant: 1_000,
            variance: Self::DEFAULT_VARIANCE,
            speed_divisor: 10,
            max_speed_reduction: 500,
            auto_attack_reference_delay: Self::DEFAULT_AUTO_ATTACK_REFERENCE_DELAY,
            rounding: Rounding::Floor,
        }
    }

    /// Parameters with every roll pinned: always hit, never dodge, no critical
    /// or direct hit, no variance.
    pub fn deterministic() -> Self {
        Self {
            hit: ChanceParams::fixed(1_000),
            dodge: ChanceParams::fixed(0),
            critical: ChanceParams::fixed(0),
            direct_hit: ChanceParams::fixed(0),
            variance: 0,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_variance(mut self, variance: u32) -> Self {
        self.variance = variance;
        self
    }

    #[must_use]
    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }
}

impl Default for CombatParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Default formula set backed by [`CombatParams`].
///
/// With all stats at zero, base damage equals potency.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StandardFormulas {
    params: CombatParams,
}

impl StandardFormulas {
    pub fn new(params: CombatParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CombatParams {
        &self.params
    }
}

impl CombatFormulas for StandardFormulas {
    fn hit_chance(&self, source: &StatBlock, target: &StatBlock) -> Permille {
        let diff = source.get(Attribute::Accuracy) - target.get(Attribute::Evasion);
        self.params.hit.chance(diff)
    }

    fn dodge_chance(&self, _source: &StatBlock, target: &StatBlock) -> Permille {
        self.params.dodge.chance(target.get(Attribute::Evasion))
    }

    fn critical_chance(&self, source: &StatBlock) -> Permille {
        self.params
            .critical
            .chance(source.get(Attribute::CriticalHit))
    }

    fn direct_hit_chance(&self, source: &StatBlock) -> Permille {
        self.params
            .direct_hit
            .chance(source.get(Attribute::DirectHit))
    }

    fn critical_multiplier(&self, source: &StatBlock) -> f64 {
        let divisor = self.params.critical_multiplier_divisor;
        let bonus = if divisor == 0 {
            0
        } else {
            source.get(Attribute::CriticalHit).max(0) / divisor
        };
        f64::from(self.params.critical_multiplier_base as i32 + bonus) / 1_000.0
    }

    fn direct_hit_multiplier(&self, _source: &StatBlock) -> f64 {
        f64::from(self.params.direct_hit_multiplier) / 1_000.0
    }

    fn base_damage(
        &self,
        profile: &DamageProfile,
        source: &StatBlock,
        target: &StatBlock,
    ) -> f64 {
        let scaling = profile
            .scaling
            .map(|attribute| source.get(attribute))
            .unwrap_or(0);
        let attack = source.get(Attribute::AttackPower) + source.get(Attribute::WeaponDamage) + scaling;
        let attack_factor = if self.params.attack_divisor == 0 {
            1.0
        } else {
            1.0 + f64::from(attack) / f64::from(self.params.attack_divisor)
        };

        let mitigation = match profile.kind.mitigated_by() {
            Some(attribute) => {
                let defense = f64::from(target.get(attribute).max(0));
                let constant = f64::from(self.params.defense_constant.max(1));
                constant / (constant + defense)
            }
            None => 1.0,
        };

        f64::from(profile.potency) * attack_factor.max(0.0) * mitigation
    }

    fn variance(&self) -> Permille {
        Permille::new(self.params.variance)
    }

    fn rounding(&self) -> Rounding {
        self.params.rounding
    }

    fn scaled_duration(&self, base: SimTime, speed: i32) -> SimTime {
        if self.params.speed_divisor == 0 || speed <= 0 {
            return base;
        }
        let reduction = ((speed / self.params.speed_divisor) as u32).min(self.params.max_speed_reduction);
        SimTime(base.as_millis() * u64::from(1_000 - reduction.min(1_000)) / 1_000)
    }

    fn auto_attack_profile(&self, weapon: &Weapon) -> DamageProfile {
        let reference = self.params.auto_attack_reference_delay.as_millis();
        if reference == 0 {
            return weapon.damage;
        }
        let scaled = u64::from(weapon.damage.potency) * weapon.delay.as_millis() / reference;
        DamageProfile {
            potency: u32::try_from(scaled).unwrap_or(u32::MAX),
            ..weapon.damage
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DamageKind;

    fn potency(potency: u32, kind: DamageKind) -> DamageProfile {
        DamageProfile::new(potency).with_kind(kind)
    }

    #[test]
    fn neutral_stats_yield_potency() {
        let formulas = StandardFormulas::default();
        let stats = StatBlock::new();
        let damage = formulas.base_damage(&potency(20, DamageKind::Physical), &stats, &stats);
        assert_eq!(damage, 20.0);
    }

    #[test]
    fn attack_and_defense_scale_base_damage() {
        let formulas = StandardFormulas::default();
        let source = StatBlock::new().with(Attribute::AttackPower, 50);
        let target = StatBlock::new().with(Attribute::Defense, 1_000);

        let physical = formulas.base_damage(&potency(100, DamageKind::Physical), &source, &target);
        assert!((physical - 75.0).abs() < 1e-9);

        let true_damage = formulas.base_damage(&potency(100, DamageKind::True), &source, &target);
        assert!((true_damage - 150.0).abs() < 1e-9);
    }

    #[test]
    fn chances_follow_stats_and_clamp() {
        let formulas = StandardFormulas::default();
        let source = StatBlock::new().with(Attribute::CriticalHit, 500);
        assert_eq!(formulas.critical_chance(&source), Permille::new(100));
        assert_eq!(formulas.direct_hit_chance(&StatBlock::new()), Permille::ZERO);

        let evasive = StatBlock::new().with(Attribute::Evasion, 20_000);
        assert_eq!(formulas.hit_chance(&StatBlock::new(), &evasive), Permille::new(500));
        assert_eq!(formulas.dodge_chance(&StatBlock::new(), &evasive), Permille::new(500));
    }

    #[test]
    fn critical_multiplier_grows_with_stat() {
        let formulas = StandardFormulas::default();
        assert!((formulas.critical_multiplier(&StatBlock::new()) - 1.4).abs() < 1e-9);
        let source = StatBlock::new().with(Attribute::CriticalHit, 1_000);
        assert!((formulas.critical_multiplier(&source) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn speed_shortens_durations_up_to_cap() {
        let formulas = StandardFormulas::default();
        let gcd = SimTime::from_millis(2_500);
        assert_eq!(formulas.scaled_duration(gcd, 0), gcd);
        assert_eq!(formulas.scaled_duration(gcd, 1_000), SimTime::from_millis(2_250));
        assert_eq!(formulas.scaled_duration(gcd, 1_000_000), SimTime::from_millis(1_250));
    }

    #[test]
    fn inverted_or_extreme_chance_params_do_not_panic() {
        let inverted = ChanceParams {
            base: 300,
            divisor: 1,
            min: 800,
            max: 200,
        };
        assert_eq!(inverted.chance(0), Permille::new(200));

        let saturating = ChanceParams {
            base: i32::MAX,
            divisor: 1,
            min: 0,
            max: 1_000,
        };
        assert_eq!(saturating.chance(i32::MAX), Permille::new(1_000));

        let floor = ChanceParams {
            base: i32::MIN,
            divisor: 1,
            min: 0,
            max: 1_000,
        };
        assert_eq!(floor.chance(-1), Permille::ZERO);
    }

    #[test]
    fn auto_attack_potency_scales_with_weapon_delay() {
        let formulas = StandardFormulas::default();
        let reference = Weapon::new(SimTime::from_secs(3), DamageProfile::new(100));
        assert_eq!(formulas.auto_attack_profile(&reference).potency, 100);

        let slow = Weapon::new(SimTime::from_millis(3_360), DamageProfile::new(100));
        let profile = formulas.auto_attack_profile(&slow);
        assert_eq!(profile.potency, 112);
        assert_eq!(profile.kind, slow.damage.kind);
    }

    #[test]
    fn deterministic_params_pin_every_roll() {
        let formulas = StandardFormulas::new(CombatParams::deterministic());
        let stats = StatBlock::new().with(Attribute::CriticalHit, 5_000);
        assert_eq!(formulas.critical_chance(&stats), Permille::ZERO);
        assert_eq!(formulas.hit_chance(&stats, &stats), Permille::ONE);
        assert_eq!(formulas.variance(), Permille::ZERO);
    }
}
