//! Outcome rolls.
//!
//! Draw order is fixed and does not depend on earlier results:
//!
//! | roll              | draws                                   |
//! |-------------------|-----------------------------------------|
//! | [`roll_damage`]   | hit, dodge, critical, direct, variance  |
//! | [`roll_landing`]  | hit, dodge                              |
//! | [`roll_periodic`] | critical, direct, variance              |
//!
//! Every listed draw is consumed even when an earlier roll already settled
//! the outcome, so the stream position after a resolution only depends on
//! which effects ran, never on how they rolled.

use crate::rng::RandomSource;
use crate::stats::StatBlock;
use crate::types::HitResult;

use super::{CombatFormulas, DamageProfile};

/// Rolled outcome of one damage application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRoll {
    pub outcome: HitResult,
    /// Variance factor per-mille (950..=1050 with the default spread).
    pub variance: u32,
}

/// Full roll for a direct damage effect.
pub fn roll_damage(
    formulas: &dyn CombatFormulas,
    profile: &DamageProfile,
    source: &StatBlock,
    target: &StatBlock,
    rng: &mut dyn RandomSource,
) -> DamageRoll {
    let landing = roll_landing(formulas, source, target, rng);
    let (critical, direct, variance) = roll_amplifiers(formulas, profile, source, rng);

    let outcome = if landing.landed() {
        HitResult::from_flags(critical, direct)
    } else {
        landing
    };
    DamageRoll { outcome, variance }
}

/// Hit and dodge only; used for hostile aura applications.
pub fn roll_landing(
    formulas: &dyn CombatFormulas,
    source: &StatBlock,
    target: &StatBlock,
    rng: &mut dyn RandomSource,
) -> HitResult {
    let hit_roll = rng.roll_permille();
    let dodge_roll = rng.roll_permille();

    if !formulas.hit_chance(source, target).succeeds(hit_roll) {
        HitResult::Miss
    } else if formulas.dodge_chance(source, target).succeeds(dodge_roll) {
        HitResult::Dodge
    } else {
        HitResult::Hit
    }
}

/// Periodic ticks always land; they still roll their amplifiers.
pub fn roll_periodic(
    formulas: &dyn CombatFormulas,
    profile: &DamageProfile,
    source: &StatBlock,
    rng: &mut dyn RandomSource,
) -> DamageRoll {
    let (critical, direct, variance) = roll_amplifiers(formulas, profile, source, rng);
    DamageRoll {
        outcome: HitResult::from_flags(critical, direct),
        variance,
    }
}

fn roll_amplifiers(
    formulas: &dyn CombatFormulas,
    profile: &DamageProfile,
    source: &StatBlock,
    rng: &mut dyn RandomSource,
) -> (bool, bool, u32) {
    let critical_roll = rng.roll_permille();
    let direct_roll = rng.roll_permille();
    let variance_draw = rng.next_u32();

    let critical = profile.can_crit && formulas.critical_chance(source).succeeds(critical_roll);
    let direct = profile.can_direct_hit && formulas.direct_hit_chance(source).succeeds(direct_roll);

    let spread = formulas.variance().get();
    let variance = 1_000 - spread + variance_draw % (2 * spread + 1);

    (critical, direct, variance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{CombatParams, StandardFormulas};
    use crate::rng::PcgRng;
    use crate::types::Attribute;

    /// Replays a fixed list of raw values.
    struct Scripted(Vec<u32>, usize);

    impl RandomSource for Scripted {
        fn next_u32(&mut self) -> u32 {
            let value = self.0[self.1];
            self.1 += 1;
            value
        }
    }

    #[test]
    fn damage_roll_consumes_five_draws() {
        let formulas = StandardFormulas::default();
        let stats = StatBlock::new();
        let mut rng = PcgRng::new(9);
        roll_damage(&formulas, &DamageProfile::new(10), &stats, &stats, &mut rng);
        assert_eq!(rng.draws(), 5);
        roll_periodic(&formulas, &DamageProfile::new(10), &stats, &mut rng);
        assert_eq!(rng.draws(), 8);
        roll_landing(&formulas, &stats, &stats, &mut rng);
        assert_eq!(rng.draws(), 10);
    }

    #[test]
    fn miss_still_consumes_amplifier_draws() {
        let formulas = StandardFormulas::new(CombatParams {
            hit: crate::math::ChanceParams::fixed(0),
            ..CombatParams::new()
        });
        let stats = StatBlock::new();
        let mut rng = Scripted(vec![0, 0, 0, 0, 0], 0);
        let roll = roll_damage(&formulas, &DamageProfile::new(10), &stats, &stats, &mut rng);
        assert_eq!(roll.outcome, HitResult::Miss);
        assert_eq!(rng.1, 5);
    }

    #[test]
    fn scripted_rolls_map_to_outcomes() {
        let formulas = StandardFormulas::default();
        let stats = StatBlock::new().with(Attribute::DirectHit, 1_000);
        // hit 0 (<1000), dodge 999 (not <0), crit 10 (<50), direct 50 (<100), variance draw 50
        let mut rng = Scripted(vec![0, 999, 10, 50, 50], 0);
        let roll = roll_damage(&formulas, &DamageProfile::new(10), &stats, &stats, &mut rng);
        assert_eq!(roll.outcome, HitResult::CriticalDirect);
        assert_eq!(roll.variance, 1_000);
    }

    #[test]
    fn disabled_crit_never_crits() {
        let formulas = StandardFormulas::default();
        let stats = StatBlock::new();
        let mut rng = Scripted(vec![0, 999, 0, 999, 0], 0);
        let profile = DamageProfile::new(10).without_crit();
        let roll = roll_damage(&formulas, &profile, &stats, &stats, &mut rng);
        assert_eq!(roll.outcome, HitResult::Hit);
        assert_eq!(roll.variance, 950);
    }

    #[test]
    fn zero_spread_pins_variance() {
        let formulas = StandardFormulas::new(CombatParams::new().with_variance(0));
        let stats = StatBlock::new();
        let mut rng = PcgRng::new(3);
        for _ in 0..50 {
            let roll = roll_periodic(&formulas, &DamageProfile::new(1), &stats, &mut rng);
            assert_eq!(roll.variance, 1_000);
        }
    }
}
