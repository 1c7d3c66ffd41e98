//! Common math: chances, outcome rolls, staged damage and rounding.
//!
//! Everything here is a pure function over stat inputs. Randomness arrives as
//! an explicit `&mut dyn RandomSource` so callers control the draw order.

pub mod damage;
pub mod formulas;
pub mod rolls;

pub use damage::{DamageProfile, compute_damage};
pub use formulas::{ChanceParams, CombatFormulas, CombatParams, StandardFormulas};
pub use rolls::{DamageRoll, roll_damage, roll_landing, roll_periodic};

/// Probability on a per-mille scale, clamped to `[0, 1000]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permille(u32);

impl Permille {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1_000);

    pub const fn new(value: u32) -> Self {
        if value > 1_000 { Self(1_000) } else { Self(value) }
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// A roll in `0..1000` succeeds when it falls below the chance.
    pub const fn succeeds(self, roll: u32) -> bool {
        roll < self.0
    }
}

/// Rounding rule applied after every damage stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    #[default]
    Floor,
    Nearest,
}

impl Rounding {
    /// Round and saturate into `u32`. Negative values become zero.
    pub fn apply(self, value: f64) -> u32 {
        let rounded = match self {
            Rounding::Floor => value.floor(),
            Rounding::Nearest => value.round(),
        };
        if rounded.is_nan() || rounded <= 0.0 {
            0
        } else if rounded >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            rounded as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permille_clamps_and_compares() {
        assert_eq!(Permille::new(1_500), Permille::ONE);
        assert!(Permille::new(50).succeeds(49));
        assert!(!Permille::new(50).succeeds(50));
        assert!(!Permille::ZERO.succeeds(0));
        assert!(Permille::ONE.succeeds(999));
    }

    #[test]
    fn rounding_rules() {
        assert_eq!(Rounding::Floor.apply(20.99), 20);
        assert_eq!(Rounding::Nearest.apply(20.5), 21);
        assert_eq!(Rounding::Floor.apply(-3.0), 0);
        assert_eq!(Rounding::Nearest.apply(f64::INFINITY), u32::MAX);
    }
}
