use crate::types::{ResourceKind, SimTime};

/// Amount restored by one regen rule on every regen event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegenAmount {
    Flat(u32),
    /// Per-mille of the resource's maximum.
    PermilleOfMax(u32),
}

/// Periodic restoration of one resource for every living actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegenRule {
    pub resource: ResourceKind,
    pub amount: RegenAmount,
}

impl RegenRule {
    pub fn amount_for(&self, maximum: u32) -> u32 {
        match self.amount {
            RegenAmount::Flat(value) => value,
            RegenAmount::PermilleOfMax(permille) => {
                (u64::from(maximum) * u64::from(permille) / 1_000) as u32
            }
        }
    }
}

/// Switches for the trace-level queue and decision logs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogOptions {
    pub pushes: bool,
    pub pops: bool,
    pub decisions: bool,
}

/// Engine tunables for one simulator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Delay before asking a policy again after it had nothing ready.
    pub idle_retry: SimTime,
    /// Cadence of resource regeneration. Zero disables regen.
    pub regen_interval: SimTime,
    pub regen: Vec<RegenRule>,
    /// Rejected intents a policy may return in one decision round.
    pub max_decision_attempts: u8,
    /// Trailing span of the horizon reported as the execute phase.
    pub execute_window: SimTime,
    /// Stop the run at the first actor defeat.
    pub end_on_defeat: bool,
    /// Keep every dispatched event in the trace, not only the digest.
    pub capture_trace: bool,
    pub log: LogOptions,
}

impl SimConfig {
    // ===== limits =====
    pub const MIN_IDLE_RETRY: SimTime = SimTime::from_millis(1);

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_IDLE_RETRY: SimTime = SimTime::from_millis(100);
    pub const DEFAULT_REGEN_INTERVAL: SimTime = SimTime::from_secs(3);
    pub const DEFAULT_MANA_REGEN_PERMILLE: u32 = 20;
    pub const DEFAULT_ENERGY_REGEN: u32 = 60;
    pub const DEFAULT_MAX_DECISION_ATTEMPTS: u8 = 8;
    pub const DEFAULT_EXECUTE_WINDOW: SimTime = SimTime::from_secs(60);

    pub fn new() -> Self {
        Self {
            idle_retry: Self::DEFAULT_IDLE_RETRY,
            regen_interval: Self::DEFAULT_REGEN_INTERVAL,
            regen: vec![
                RegenRule {
                    resource: ResourceKind::Mana,
                    amount: RegenAmount::PermilleOfMax(Self::DEFAULT_MANA_REGEN_PERMILLE),
                },
                RegenRule {
                    resource: ResourceKind::Energy,
                    amount: RegenAmount::Flat(Self::DEFAULT_ENERGY_REGEN),
                },
            ],
            max_decision_attempts: Self::DEFAULT_MAX_DECISION_ATTEMPTS,
            execute_window: Self::DEFAULT_EXECUTE_WINDOW,
            end_on_defeat: false,
            capture_trace: true,
            log: LogOptions::default(),
        }
    }

    #[must_use]
    pub fn with_idle_retry(mut self, idle_retry: SimTime) -> Self {
        self.idle_retry = idle_retry.max(Self::MIN_IDLE_RETRY);
        self
    }

    #[must_use]
    pub fn with_regen(mut self, interval: SimTime, rules: Vec<RegenRule>) -> Self {
        self.regen_interval = interval;
        self.regen = rules;
        self
    }

    #[must_use]
    pub fn without_regen(self) -> Self {
        self.with_regen(SimTime::ZERO, Vec::new())
    }

    #[must_use]
    pub fn with_end_on_defeat(mut self, end_on_defeat: bool) -> Self {
        self.end_on_defeat = end_on_defeat;
        self
    }

    #[must_use]
    pub fn with_execute_window(mut self, window: SimTime) -> Self {
        self.execute_window = window;
        self
    }

    #[must_use]
    pub fn with_capture_trace(mut self, capture_trace: bool) -> Self {
        self.capture_trace = capture_trace;
        self
    }

    #[must_use]
    pub fn with_log(mut self, log: LogOptions) -> Self {
        self.log = log;
        self
    }

    pub fn regen_enabled(&self) -> bool {
        !self.regen_interval.is_zero() && !self.regen.is_empty()
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_regen_matches_server_tick() {
        let config = SimConfig::default();
        assert_eq!(config.regen_interval, SimTime::from_secs(3));
        assert_eq!(config.regen[0].amount_for(10_000), 200);
        assert_eq!(config.regen[1].amount_for(1_000), 60);
        assert!(config.regen_enabled());
        assert!(!config.without_regen().regen_enabled());
    }

    #[test]
    fn idle_retry_has_a_floor() {
        let config = SimConfig::new().with_idle_retry(SimTime::ZERO);
        assert_eq!(config.idle_retry, SimConfig::MIN_IDLE_RETRY);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_round_trips_through_json() {
        let config = SimConfig::new().with_end_on_defeat(true);
        let json = serde_json::to_string(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
