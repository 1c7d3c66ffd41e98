//! Closed symbolic categories shared by every module.

use bitflags::bitflags;

// ============================================================================
// Attributes
// ============================================================================

/// Statistic an actor carries, contributed by base values, equipment and auras.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumCount,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Attribute {
    // Primary
    Strength,
    Dexterity,
    Vitality,
    Intelligence,
    Mind,

    // Offensive
    AttackPower,
    WeaponDamage,
    CriticalHit,
    DirectHit,
    Determination,
    Accuracy,

    // Defensive
    Defense,
    MagicDefense,
    Evasion,

    // Speed
    SkillSpeed,
    SpellSpeed,
}

impl Attribute {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Saturating pools an actor spends and regenerates.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ResourceKind {
    /// Reaching zero defeats the actor.
    Health,
    Mana,
    Energy,
    /// Job-specific counter built up by actions.
    Gauge,
}

// ============================================================================
// Actions and auras
// ============================================================================

/// Broad kind of action, deciding which speed attribute scales its timings.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionCategory {
    #[default]
    Weaponskill,
    Spell,
    /// Off-global utility; never hastened.
    Ability,
}

impl ActionCategory {
    pub const fn hastened_by(self) -> Option<Attribute> {
        match self {
            Self::Weaponskill => Some(Attribute::SkillSpeed),
            Self::Spell => Some(Attribute::SpellSpeed),
            Self::Ability => None,
        }
    }
}

/// Whether an aura helps or hinders its bearer.
///
/// Debuffs landing on another actor roll hit and dodge; buffs always land.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AuraCategory {
    #[default]
    Buff,
    Debuff,
}

/// Damage school, selecting the defensive attribute that mitigates it.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageKind {
    #[default]
    Physical,
    Magical,
    /// Ignores mitigation.
    True,
}

impl DamageKind {
    pub const fn mitigated_by(self) -> Option<Attribute> {
        match self {
            Self::Physical => Some(Attribute::Defense),
            Self::Magical => Some(Attribute::MagicDefense),
            Self::True => None,
        }
    }
}

/// Outcome of a stochastic roll against a target.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HitResult {
    Miss,
    Dodge,
    Hit,
    Critical,
    Direct,
    CriticalDirect,
}

impl HitResult {
    pub const fn from_flags(critical: bool, direct: bool) -> Self {
        match (critical, direct) {
            (false, false) => Self::Hit,
            (true, false) => Self::Critical,
            (false, true) => Self::Direct,
            (true, true) => Self::CriticalDirect,
        }
    }

    /// Returns true if the effect reached the target.
    pub const fn landed(self) -> bool {
        !matches!(self, Self::Miss | Self::Dodge)
    }

    pub const fn is_critical(self) -> bool {
        matches!(self, Self::Critical | Self::CriticalDirect)
    }

    pub const fn is_direct(self) -> bool {
        matches!(self, Self::Direct | Self::CriticalDirect)
    }
}

// ============================================================================
// Equipment slots
// ============================================================================

/// A single equipment slot on an actor.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Slot {
    MainHand,
    OffHand,
    Head,
    Body,
    Hands,
    Waist,
    Legs,
    Feet,
    Ears,
    Neck,
    Wrist,
    LeftRing,
    RightRing,
}

impl Slot {
    pub const fn mask(self) -> SlotMask {
        match self {
            Self::MainHand => SlotMask::MAIN_HAND,
            Self::OffHand => SlotMask::OFF_HAND,
            Self::Head => SlotMask::HEAD,
            Self::Body => SlotMask::BODY,
            Self::Hands => SlotMask::HANDS,
            Self::Waist => SlotMask::WAIST,
            Self::Legs => SlotMask::LEGS,
            Self::Feet => SlotMask::FEET,
            Self::Ears => SlotMask::EARS,
            Self::Neck => SlotMask::NECK,
            Self::Wrist => SlotMask::WRIST,
            Self::LeftRing => SlotMask::LEFT_RING,
            Self::RightRing => SlotMask::RIGHT_RING,
        }
    }
}

bitflags! {
    /// Set of slots an item may be worn in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SlotMask: u16 {
        const MAIN_HAND  = 1 << 0;
        const OFF_HAND   = 1 << 1;
        const HEAD       = 1 << 2;
        const BODY       = 1 << 3;
        const HANDS      = 1 << 4;
        const WAIST      = 1 << 5;
        const LEGS       = 1 << 6;
        const FEET       = 1 << 7;
        const EARS       = 1 << 8;
        const NECK       = 1 << 9;
        const WRIST      = 1 << 10;
        const LEFT_RING  = 1 << 11;
        const RIGHT_RING = 1 << 12;

        const RING = Self::LEFT_RING.bits() | Self::RIGHT_RING.bits();
    }
}
