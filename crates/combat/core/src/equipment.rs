//! Equipment loadouts.
//!
//! Items are plain stat bundles supplied by the caller. An [`Equipment`] is
//! assembled once, when its actor is constructed, and only read afterwards.

use std::collections::BTreeMap;

use crate::error::{ErrorSeverity, SimError};
use crate::math::DamageProfile;
use crate::stats::StatBlock;
use crate::types::{Attribute, SimTime, Slot, SlotMask};

/// A melded stone adding a single attribute bonus to its host item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Materia {
    pub attribute: Attribute,
    pub value: i32,
}

impl Materia {
    pub fn new(attribute: Attribute, value: i32) -> Self {
        Self { attribute, value }
    }
}

/// Automatic attacks granted by a main-hand item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    /// Time between swings before skill speed.
    pub delay: SimTime,
    /// One swing. Formulas may scale it by `delay`.
    pub damage: DamageProfile,
}

impl Weapon {
    pub const fn new(delay: SimTime, damage: DamageProfile) -> Self {
        Self { delay, damage }
    }
}

/// A wearable stat bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub name: String,
    /// Slots the item can be worn in.
    pub fits: SlotMask,
    pub stats: StatBlock,
    pub melds: Vec<Materia>,
    pub weapon: Option<Weapon>,
}

impl Item {
    pub fn new(name: impl Into<String>, fits: SlotMask) -> Self {
        Self {
            name: name.into(),
            fits,
            stats: StatBlock::new(),
            melds: Vec::new(),
            weapon: None,
        }
    }

    #[must_use]
    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    #[must_use]
    pub fn with_stat(mut self, attribute: Attribute, value: i32) -> Self {
        self.stats.add(attribute, value);
        self
    }

    #[must_use]
    pub fn with_meld(mut self, materia: Materia) -> Self {
        self.melds.push(materia);
        self
    }

    /// Item stats plus melded bonuses.
    pub fn contribution(&self) -> StatBlock {
        let mut total = self.stats;
        for materia in &self.melds {
            total.add(materia.attribute, materia.value);
        }
        total
    }
}

/// Errors raised while assembling a loadout.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipmentError {
    /// Two items claim the same slot.
    #[error("slot {slot} claimed by both `{existing}` and `{incoming}`")]
    IncompatibleSlot {
        slot: Slot,
        existing: String,
        incoming: String,
    },

    /// Item cannot be worn in the requested slot.
    #[error("`{item}` cannot be worn in slot {slot}")]
    SlotMismatch { slot: Slot, item: String },
}

impl SimError for EquipmentError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::IncompatibleSlot { .. } => "EQUIPMENT_INCOMPATIBLE_SLOT",
            Self::SlotMismatch { .. } => "EQUIPMENT_SLOT_MISMATCH",
        }
    }
}

/// Immutable slot → item mapping with its aggregated stat contribution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    items: BTreeMap<Slot, Item>,
    modifiers: StatBlock,
}

impl Equipment {
    pub fn builder() -> EquipmentBuilder {
        EquipmentBuilder::default()
    }

    /// Assemble a loadout from `(slot, item)` pairs.
    pub fn from_items(
        items: impl IntoIterator<Item = (Slot, Item)>,
    ) -> Result<Self, EquipmentError> {
        let mut builder = Self::builder();
        for (slot, item) in items {
            builder = builder.equip(slot, item);
        }
        builder.build()
    }

    pub fn item(&self, slot: Slot) -> Option<&Item> {
        self.items.get(&slot)
    }

    pub fn items(&self) -> impl Iterator<Item = (Slot, &Item)> {
        self.items.iter().map(|(slot, item)| (*slot, item))
    }

    /// Additive sum of every item's contribution.
    pub fn modifiers(&self) -> &StatBlock {
        &self.modifiers
    }

    /// Auto-attack source: the main-hand item's weapon, if any.
    pub fn weapon(&self) -> Option<&Weapon> {
        self.items
            .get(&Slot::MainHand)
            .and_then(|item| item.weapon.as_ref())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Collects items, then validates all of them at once in [`build`](Self::build).
#[derive(Clone, Debug, Default)]
pub struct EquipmentBuilder {
    pending: Vec<(Slot, Item)>,
}

impl EquipmentBuilder {
    #[must_use]
    pub fn equip(mut self, slot: Slot, item: Item) -> Self {
        self.pending.push((slot, item));
        self
    }

    pub fn build(self) -> Result<Equipment, EquipmentError> {
        let mut items: BTreeMap<Slot, Item> = BTreeMap::new();
        let mut claimed = SlotMask::empty();

        for (slot, item) in self.pending {
            if !item.fits.contains(slot.mask()) {
                return Err(EquipmentError::SlotMismatch {
                    slot,
                    item: item.name,
                });
            }
            if claimed.contains(slot.mask()) {
                let existing = items
                    .get(&slot)
                    .map(|existing| existing.name.clone())
                    .unwrap_or_default();
                return Err(EquipmentError::IncompatibleSlot {
                    slot,
                    existing,
                    incoming: item.name,
                });
            }
            claimed |= slot.mask();
            items.insert(slot, item);
        }

        let modifiers = items
            .values()
            .fold(StatBlock::new(), |total, item| total + item.contribution());

        Ok(Equipment { items, modifiers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(name: &str, crit: i32) -> Item {
        Item::new(name, SlotMask::RING).with_stat(Attribute::CriticalHit, crit)
    }

    #[test]
    fn aggregates_item_stats_and_melds() {
        let weapon = Item::new("Longbow", SlotMask::MAIN_HAND)
            .with_stat(Attribute::WeaponDamage, 100)
            .with_stat(Attribute::Dexterity, 40)
            .with_meld(Materia::new(Attribute::CriticalHit, 12));
        let equipment = Equipment::builder()
            .equip(Slot::MainHand, weapon)
            .equip(Slot::LeftRing, ring("Ring A", 20))
            .equip(Slot::RightRing, ring("Ring B", 30))
            .build()
            .unwrap();

        let modifiers = equipment.modifiers();
        assert_eq!(modifiers.get(Attribute::WeaponDamage), 100);
        assert_eq!(modifiers.get(Attribute::Dexterity), 40);
        assert_eq!(modifiers.get(Attribute::CriticalHit), 62);
        assert_eq!(equipment.len(), 3);
    }

    #[test]
    fn two_items_in_one_slot_fail() {
        let err = Equipment::from_items([
            (Slot::LeftRing, ring("Ring A", 1)),
            (Slot::LeftRing, ring("Ring B", 1)),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            EquipmentError::IncompatibleSlot {
                slot: Slot::LeftRing,
                existing: "Ring A".into(),
                incoming: "Ring B".into(),
            }
        );
        assert_eq!(err.error_code(), "EQUIPMENT_INCOMPATIBLE_SLOT");
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
    }

    #[test]
    fn item_in_wrong_slot_fails() {
        let err = Equipment::from_items([(Slot::Head, ring("Ring", 1))]).unwrap_err();
        assert!(matches!(err, EquipmentError::SlotMismatch { slot: Slot::Head, .. }));
    }

    #[test]
    fn empty_loadout_contributes_nothing() {
        let equipment = Equipment::from_items([]).unwrap();
        assert!(equipment.is_empty());
        assert_eq!(*equipment.modifiers(), StatBlock::new());
        assert!(equipment.weapon().is_none());
    }

    #[test]
    fn only_the_main_hand_swings() {
        let bow = Weapon::new(SimTime::from_millis(3_040), DamageProfile::new(100));
        let offhand = Item::new("Dagger", SlotMask::OFF_HAND)
            .with_weapon(Weapon::new(SimTime::from_secs(2), DamageProfile::new(50)));
        let equipment = Equipment::from_items([(Slot::OffHand, offhand.clone())]).unwrap();
        assert!(equipment.weapon().is_none());

        let equipment = Equipment::from_items([
            (Slot::MainHand, Item::new("Longbow", SlotMask::MAIN_HAND).with_weapon(bow)),
            (Slot::OffHand, offhand),
        ])
        .unwrap();
        assert_eq!(equipment.weapon(), Some(&bow));
    }
}
