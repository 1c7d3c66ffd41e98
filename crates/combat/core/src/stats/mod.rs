//! Attribute blocks and bonus layering.

pub mod bonus;

pub use bonus::{Bonus, BonusStack};

use std::ops::{Add, AddAssign};

use strum::{EnumCount, IntoEnumIterator};

use crate::types::Attribute;

/// Dense table of attribute values, one per [`Attribute`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBlock {
    values: [i32; Attribute::COUNT],
}

impl StatBlock {
    pub const ZERO: Self = Self {
        values: [0; Attribute::COUNT],
    };

    pub fn new() -> Self {
        Self::ZERO
    }

    /// Builds a block from `(attribute, value)` pairs, summing duplicates.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Attribute, i32)>) -> Self {
        let mut block = Self::ZERO;
        for (attribute, value) in pairs {
            StatBlock::add(&mut block, attribute, value);
        }
        block
    }

    #[inline]
    pub fn get(&self, attribute: Attribute) -> i32 {
        self.values[attribute.index()]
    }

    pub fn set(&mut self, attribute: Attribute, value: i32) {
        self.values[attribute.index()] = value;
    }

    pub fn add(&mut self, attribute: Attribute, value: i32) {
        let slot = &mut self.values[attribute.index()];
        *slot = slot.saturating_add(value);
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, attribute: Attribute, value: i32) -> Self {
        self.set(attribute, value);
        self
    }

    /// Non-zero entries in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, i32)> + '_ {
        Attribute::iter()
            .map(|attribute| (attribute, self.get(attribute)))
            .filter(|(_, value)| *value != 0)
    }
}

impl Default for StatBlock {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for StatBlock {
    type Output = StatBlock;

    fn add(mut self, rhs: StatBlock) -> StatBlock {
        self += rhs;
        self
    }
}

impl AddAssign for StatBlock {
    fn add_assign(&mut self, rhs: StatBlock) {
        for (lhs, rhs) in self.values.iter_mut().zip(rhs.values) {
            *lhs = lhs.saturating_add(rhs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_add_per_attribute() {
        let a = StatBlock::from_pairs([(Attribute::Strength, 10), (Attribute::CriticalHit, 5)]);
        let b = StatBlock::from_pairs([(Attribute::Strength, 3), (Attribute::Strength, 2)]);
        let sum = a + b;
        assert_eq!(sum.get(Attribute::Strength), 15);
        assert_eq!(sum.get(Attribute::CriticalHit), 5);
        assert_eq!(sum.get(Attribute::Defense), 0);
    }

    #[test]
    fn iter_skips_zero_entries() {
        let block = StatBlock::new()
            .with(Attribute::Dexterity, 40)
            .with(Attribute::DirectHit, 7);
        let entries: Vec<_> = block.iter().collect();
        assert_eq!(
            entries,
            vec![(Attribute::Dexterity, 40), (Attribute::DirectHit, 7)]
        );
    }
}
