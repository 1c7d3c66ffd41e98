use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Identifier of a combat participant registered with a simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of an action definition in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(pub u16);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action:{}", self.0)
    }
}

/// Identifier of an aura kind in the catalog.
///
/// An actor holds at most one instance per aura id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraId(pub u16);

impl fmt::Display for AuraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aura:{}", self.0)
    }
}

/// Allegiance used by multi-target rules. Actors on different teams are hostile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Team(pub u8);

impl Team {
    pub const PLAYERS: Self = Self(0);
    pub const ENEMIES: Self = Self(1);

    pub const fn is_hostile_to(self, other: Team) -> bool {
        self.0 != other.0
    }
}

/// Shared recast timer. Actions in the same group block each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecastGroup(pub u16);

impl RecastGroup {
    /// The global recast shared by weaponskills and spells.
    pub const GLOBAL: Self = Self(0);
}

/// Point on (or span of) the simulation clock, in milliseconds.
///
/// Integer time keeps event ordering exact; equal timestamps compare equal
/// regardless of how they were computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u64::MAX);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    pub const fn saturating_sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(rhs.0))
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: SimTime) {
        *self = *self + rhs;
    }
}

impl Sub for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimTime) -> SimTime {
        self.saturating_sub(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1_000, self.0 % 1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_time_displays_seconds_with_millis() {
        assert_eq!(SimTime::from_millis(2_500).to_string(), "2.500s");
        assert_eq!(SimTime::from_secs(300).to_string(), "300.000s");
    }

    #[test]
    fn sim_time_subtraction_saturates() {
        assert_eq!(SimTime::from_secs(1) - SimTime::from_secs(3), SimTime::ZERO);
        assert_eq!(
            SimTime::from_secs(3) - SimTime::from_millis(500),
            SimTime::from_millis(2_500)
        );
    }

    #[test]
    fn teams_are_hostile_only_across_sides() {
        assert!(Team::PLAYERS.is_hostile_to(Team::ENEMIES));
        assert!(!Team::ENEMIES.is_hostile_to(Team::ENEMIES));
    }
}
