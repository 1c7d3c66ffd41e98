//! Saturating resource meters.

use std::collections::BTreeMap;

use crate::error::{ErrorSeverity, SimError};
use crate::types::ResourceKind;

/// A single resource clamped to `[0, maximum]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub fn new(current: u32, maximum: u32) -> Self {
        Self {
            current: current.min(maximum),
            maximum,
        }
    }

    pub fn full(maximum: u32) -> Self {
        Self::new(maximum, maximum)
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Current value as per-mille of the maximum (0 when the maximum is 0).
    pub fn permille(&self) -> u32 {
        if self.maximum == 0 {
            0
        } else {
            (u64::from(self.current) * 1_000 / u64::from(self.maximum)) as u32
        }
    }

    /// Add up to the maximum. Returns the amount actually gained.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let next = self.current.saturating_add(amount).min(self.maximum);
        let gained = next - self.current;
        self.current = next;
        gained
    }

    /// Remove down to zero. Returns the amount actually lost.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.current);
        self.current -= lost;
        lost
    }
}

/// Raised when a resource cannot cover a cost.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceError {
    #[error("insufficient {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: ResourceKind,
        required: u32,
        available: u32,
    },
}

impl SimError for ResourceError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientResource { .. } => "RESOURCE_INSUFFICIENT",
        }
    }
}

/// An actor's resources, keyed by kind.
///
/// Kinds the actor was not given read as an empty meter with maximum 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePool {
    meters: BTreeMap<ResourceKind, ResourceMeter>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, kind: ResourceKind, meter: ResourceMeter) -> Self {
        self.meters.insert(kind, meter);
        self
    }

    pub fn get(&self, kind: ResourceKind) -> ResourceMeter {
        self.meters.get(&kind).copied().unwrap_or_default()
    }

    pub fn current(&self, kind: ResourceKind) -> u32 {
        self.get(kind).current
    }

    pub fn maximum(&self, kind: ResourceKind) -> u32 {
        self.get(kind).maximum
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, ResourceMeter)> + '_ {
        self.meters.iter().map(|(kind, meter)| (*kind, *meter))
    }

    /// Check a cost without spending it.
    pub fn check(&self, kind: ResourceKind, amount: u32) -> Result<(), ResourceError> {
        let available = self.current(kind);
        if amount > available {
            return Err(ResourceError::InsufficientResource {
                resource: kind,
                required: amount,
                available,
            });
        }
        Ok(())
    }

    /// Spend exactly `amount`, or nothing.
    pub fn spend(&mut self, kind: ResourceKind, amount: u32) -> Result<(), ResourceError> {
        self.check(kind, amount)?;
        if let Some(meter) = self.meters.get_mut(&kind) {
            meter.drain(amount);
        }
        Ok(())
    }

    pub fn restore(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        self.meters
            .get_mut(&kind)
            .map(|meter| meter.restore(amount))
            .unwrap_or(0)
    }

    pub fn drain(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        self.meters
            .get_mut(&kind)
            .map(|meter| meter.drain(amount))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ResourcePool {
        ResourcePool::new()
            .with(ResourceKind::Health, ResourceMeter::full(100))
            .with(ResourceKind::Mana, ResourceMeter::new(30, 100))
    }

    #[test]
    fn meter_saturates_at_both_ends() {
        let mut meter = ResourceMeter::new(90, 100);
        assert_eq!(meter.restore(50), 10);
        assert_eq!(meter.current, 100);
        assert_eq!(meter.drain(250), 100);
        assert_eq!(meter.current, 0);
        assert!(meter.is_empty());
    }

    #[test]
    fn construction_clamps_current() {
        assert_eq!(ResourceMeter::new(500, 100).current, 100);
    }

    #[test]
    fn spend_is_all_or_nothing() {
        let mut pool = pool();
        let err = pool.spend(ResourceKind::Mana, 50).unwrap_err();
        assert_eq!(
            err,
            ResourceError::InsufficientResource {
                resource: ResourceKind::Mana,
                required: 50,
                available: 30,
            }
        );
        assert_eq!(pool.current(ResourceKind::Mana), 30);

        pool.spend(ResourceKind::Mana, 30).unwrap();
        assert_eq!(pool.current(ResourceKind::Mana), 0);
    }

    #[test]
    fn missing_kinds_read_empty() {
        let mut pool = pool();
        assert_eq!(pool.get(ResourceKind::Gauge), ResourceMeter::default());
        assert_eq!(pool.restore(ResourceKind::Gauge, 10), 0);
        assert!(pool.spend(ResourceKind::Gauge, 0).is_ok());
        assert!(pool.check(ResourceKind::Gauge, 1).is_err());
    }

    #[test]
    fn permille_of_maximum() {
        assert_eq!(ResourceMeter::new(25, 100).permille(), 250);
        assert_eq!(ResourceMeter::default().permille(), 0);
    }
}
