//! Time-ordered event queue.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::error::{ErrorSeverity, SimError};
use crate::event::{Event, PriorityTier};
use crate::types::SimTime;

/// Total order of scheduled events: time, then tier, then insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventKey {
    pub at: SimTime,
    pub tier: PriorityTier,
    pub seq: u64,
}

#[derive(Clone, Debug)]
struct Scheduled {
    key: EventKey,
    event: Event,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Errors raised by scheduling.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScheduleError {
    #[error("cannot schedule at {at}: simulation time is already {now}")]
    InvalidTimestamp { at: SimTime, now: SimTime },
}

impl SimError for ScheduleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTimestamp { .. } => "SCHEDULE_INVALID_TIMESTAMP",
        }
    }
}

/// Min-heap of pending events.
///
/// Equal `(at, tier)` pairs pop in insertion order, so two runs that push the
/// same events in the same order always dispatch them identically.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) -> EventKey {
        let key = EventKey {
            at: event.at,
            tier: event.tier,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled { key, event }));
        key
    }

    pub fn pop(&mut self) -> Option<(EventKey, Event)> {
        self.heap
            .pop()
            .map(|Reverse(scheduled)| (scheduled.key, scheduled.event))
    }

    pub fn peek_key(&self) -> Option<EventKey> {
        self.heap.peek().map(|Reverse(scheduled)| scheduled.key)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pending events in no particular order.
    pub fn pending(&self) -> impl Iterator<Item = &Event> {
        self.heap.iter().map(|Reverse(scheduled)| &scheduled.event)
    }

    /// Drop every pending event, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.heap.len();
        self.heap.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, EventPayload};
    use crate::types::{ActorId, AuraId};

    fn ready(at: u64, actor: u32) -> Event {
        Event::new(SimTime::from_millis(at), ActorId(actor), EventPayload::ActorReady)
    }

    #[test]
    fn pops_in_time_order() {
        let mut queue = EventQueue::new();
        queue.push(ready(300, 1));
        queue.push(ready(100, 2));
        queue.push(ready(200, 3));

        let order: Vec<u64> = std::iter::from_fn(|| queue.pop())
            .map(|(key, _)| key.at.as_millis())
            .collect();
        assert_eq!(order, vec![100, 200, 300]);
    }

    #[test]
    fn equal_time_and_tier_is_fifo() {
        let mut queue = EventQueue::new();
        for actor in 0..5 {
            queue.push(ready(1_000, actor));
        }
        let targets: Vec<u32> = std::iter::from_fn(|| queue.pop())
            .map(|(_, event)| event.target.0)
            .collect();
        assert_eq!(targets, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn lower_tier_wins_at_equal_time() {
        let mut queue = EventQueue::new();
        let at = SimTime::from_secs(6);
        queue.push(ready(6_000, 1));
        queue.push(Event::new(
            at,
            ActorId(1),
            EventPayload::AuraExpire {
                aura: AuraId(1),
                expires_at: at,
            },
        ));
        queue.push(Event::new(
            at,
            ActorId(1),
            EventPayload::AuraTick {
                aura: AuraId(1),
                due: at,
            },
        ));

        let kinds: Vec<EventKind> = std::iter::from_fn(|| queue.pop())
            .map(|(_, event)| event.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![EventKind::AuraTick, EventKind::AuraExpire, EventKind::ActorReady]
        );
    }

    #[test]
    fn clear_reports_dropped_count() {
        let mut queue = EventQueue::new();
        queue.push(ready(1, 1));
        queue.push(ready(2, 1));
        assert_eq!(queue.peek_key().map(|key| key.seq), Some(0));
        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }
}
