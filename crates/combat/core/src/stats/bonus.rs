//! Layered bonus application for aura stat modifiers.
//!
//! Order: Flat → %Inc → More → Less → Clamp. Equipment contributes flat values
//! directly to the stat block; auras contribute through this stack.

/// A single bonus applied to an attribute.
///
/// - **Flat**: additive, summed first
/// - **Increased**: percentages, summed then multiplied once
/// - **More** / **Less**: sequential multipliers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    Flat(i32),

    /// Stored as integer percentage (20 = +20%).
    Increased(i32),

    /// Stored as percentage (50 = ×1.5).
    More(i32),

    /// Stored as percentage (10 = ×0.9).
    Less(i32),
}

impl Bonus {
    /// The bonus contributed by an aura carrying `stacks` stacks.
    ///
    /// Flat and increased bonuses scale linearly. Multipliers compound per stack
    /// by being pushed repeatedly, see [`BonusStack::add_stacked`].
    pub fn scaled(self, stacks: u8) -> Self {
        let n = i32::from(stacks);
        match self {
            Bonus::Flat(v) => Bonus::Flat(v * n),
            Bonus::Increased(p) => Bonus::Increased(p * n),
            other => other,
        }
    }
}

/// A collection of bonuses applied in a fixed order.
///
/// ```
/// # use combat_core::stats::{Bonus, BonusStack};
/// let mut stack = BonusStack::new();
/// stack.add(Bonus::Flat(5));
/// stack.add(Bonus::Increased(20));
/// stack.add(Bonus::Increased(15));
/// stack.add(Bonus::More(50));
/// stack.add(Bonus::Less(10));
///
/// // clamp((10 + 5) × 1.35 × 1.5 × 0.9, 5, 100)
/// assert_eq!(stack.apply(10, 5, 100), 27);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BonusStack {
    bonuses: Vec<Bonus>,
}

impl BonusStack {
    pub fn new() -> Self {
        Self {
            bonuses: Vec::new(),
        }
    }

    pub fn add(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    /// Add one aura's bonus for the given stack count.
    pub fn add_stacked(&mut self, bonus: Bonus, stacks: u8) {
        match bonus {
            Bonus::More(_) | Bonus::Less(_) => {
                for _ in 0..stacks {
                    self.bonuses.push(bonus);
                }
            }
            _ => self.bonuses.push(bonus.scaled(stacks)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }

    /// `clamp((base + flat) × (1 + inc/100) × Π more × Π less, min, max)`
    ///
    /// Intermediate products use i64 and truncate toward zero after each
    /// multiplier.
    pub fn apply(&self, base: i32, min: i32, max: i32) -> i32 {
        let mut flat = 0i64;
        let mut increased = 0i64;
        for bonus in &self.bonuses {
            match bonus {
                Bonus::Flat(v) => flat += i64::from(*v),
                Bonus::Increased(p) => increased += i64::from(*p),
                _ => {}
            }
        }

        let mut value = i64::from(base) + flat;
        if increased != 0 {
            value = value * (100 + increased) / 100;
        }

        for bonus in &self.bonuses {
            if let Bonus::More(p) = bonus {
                value = value * (100 + i64::from(*p)) / 100;
            }
        }
        for bonus in &self.bonuses {
            if let Bonus::Less(p) = bonus {
                value = value * (100 - i64::from(*p)) / 100;
            }
        }

        value.clamp(i64::from(min), i64::from(max)) as i32
    }

    pub fn apply_unclamped(&self, base: i32) -> i32 {
        self.apply(base, i32::MIN, i32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stack_is_identity() {
        assert_eq!(BonusStack::new().apply_unclamped(321), 321);
    }

    #[test]
    fn increased_bonuses_sum_before_multiplying() {
        let mut stack = BonusStack::new();
        stack.add(Bonus::Increased(10));
        stack.add(Bonus::Increased(10));
        assert_eq!(stack.apply_unclamped(100), 120);
    }

    #[test]
    fn more_multipliers_compound() {
        let mut stack = BonusStack::new();
        stack.add(Bonus::More(10));
        stack.add(Bonus::More(10));
        assert_eq!(stack.apply_unclamped(100), 121);
    }

    #[test]
    fn stacked_bonus_scales_with_stack_count() {
        let mut stack = BonusStack::new();
        stack.add_stacked(Bonus::Flat(25), 3);
        assert_eq!(stack.apply_unclamped(100), 175);

        let mut stack = BonusStack::new();
        stack.add_stacked(Bonus::More(10), 2);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.apply_unclamped(100), 121);
    }

    #[test]
    fn clamps_to_bounds() {
        let mut stack = BonusStack::new();
        stack.add(Bonus::Less(200));
        assert_eq!(stack.apply(100, 0, 1_000), 0);
    }
}
