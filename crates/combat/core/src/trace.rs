//! Dispatch trace and its digest.
//!
//! Two runs with the same seed and setup must dispatch the same events in the
//! same order. The digest folds every dispatched event into a SHA-256 so that
//! comparison is a single equality check.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::action::RecastKey;
use crate::event::{DamageSource, Event, EventKind, EventPayload, PriorityTier};
use crate::queue::EventKey;
use crate::types::{ActorId, SimTime};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceEntry {
    pub at: SimTime,
    pub tier: PriorityTier,
    pub seq: u64,
    pub kind: EventKind,
    pub target: ActorId,
}

/// SHA-256 over the dispatch order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraceDigest(pub [u8; 32]);

impl fmt::Display for TraceDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TraceDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceDigest({self})")
    }
}

#[derive(Clone, Debug)]
pub struct EventTrace {
    capture: bool,
    entries: Vec<TraceEntry>,
    hasher: Sha256,
    len: u64,
}

impl EventTrace {
    /// A trace that keeps entries only when `capture` is set. The digest is
    /// always maintained.
    pub fn new(capture: bool) -> Self {
        Self {
            capture,
            entries: Vec::new(),
            hasher: Sha256::new(),
            len: 0,
        }
    }

    pub(crate) fn record(&mut self, key: &EventKey, event: &Event) {
        let kind = event.kind();
        self.hasher.update(key.at.as_millis().to_le_bytes());
        self.hasher.update([key.tier as u8]);
        self.hasher.update(key.seq.to_le_bytes());
        self.hasher.update(event.target.0.to_le_bytes());
        hash_payload(&mut self.hasher, &event.payload);
        self.len += 1;

        if self.capture {
            self.entries.push(TraceEntry {
                at: key.at,
                tier: key.tier,
                seq: key.seq,
                kind,
                target: event.target,
            });
        }
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Number of dispatched events, captured or not.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.entries.iter().filter(|entry| entry.kind == kind).count()
    }

    pub fn digest(&self) -> TraceDigest {
        TraceDigest(self.hasher.clone().finalize().into())
    }
}

/// Feed `payload` as a tag byte followed by its fields in little-endian order.
fn hash_payload(hasher: &mut Sha256, payload: &EventPayload) {
    match payload {
        EventPayload::ActorReady => hasher.update([0]),
        EventPayload::Damage {
            source,
            origin,
            amount,
            outcome,
        } => {
            hasher.update([1]);
            hasher.update(source.0.to_le_bytes());
            hash_origin(hasher, origin);
            hasher.update(amount.to_le_bytes());
            hasher.update([*outcome as u8]);
        }
        EventPayload::AuraApply { source, aura } => {
            hasher.update([2]);
            hasher.update(source.0.to_le_bytes());
            hasher.update(aura.0.to_le_bytes());
        }
        EventPayload::AuraTick { aura, due } => {
            hasher.update([3]);
            hasher.update(aura.0.to_le_bytes());
            hasher.update(due.as_millis().to_le_bytes());
        }
        EventPayload::AuraExpire { aura, expires_at } => {
            hasher.update([4]);
            hasher.update(aura.0.to_le_bytes());
            hasher.update(expires_at.as_millis().to_le_bytes());
        }
        EventPayload::AuraConsume {
            source,
            aura,
            stacks,
        } => {
            hasher.update([5]);
            hasher.update(source.0.to_le_bytes());
            hasher.update(aura.0.to_le_bytes());
            hasher.update([*stacks]);
        }
        EventPayload::ResourceRestore {
            source,
            resource,
            amount,
        } => {
            hasher.update([6]);
            hasher.update(source.0.to_le_bytes());
            hasher.update([*resource as u8]);
            hasher.update(amount.to_le_bytes());
        }
        EventPayload::ResourceRegen => hasher.update([7]),
        EventPayload::AutoAttack => hasher.update([8]),
        EventPayload::RecastReady { key, ready_at } => {
            hasher.update([9]);
            match key {
                RecastKey::Action(action) => {
                    hasher.update([0]);
                    hasher.update(action.0.to_le_bytes());
                }
                RecastKey::Group(group) => {
                    hasher.update([1]);
                    hasher.update(group.0.to_le_bytes());
                }
            }
            hasher.update(ready_at.as_millis().to_le_bytes());
        }
    }
}

fn hash_origin(hasher: &mut Sha256, origin: &DamageSource) {
    match origin {
        DamageSource::Action(action) => {
            hasher.update([0]);
            hasher.update(action.0.to_le_bytes());
        }
        DamageSource::Aura(aura) => {
            hasher.update([1]);
            hasher.update(aura.0.to_le_bytes());
        }
        DamageSource::AutoAttack => hasher.update([2]),
    }
}

impl Default for EventTrace {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionId, AuraId, HitResult, RecastGroup};

    fn dispatch(trace: &mut EventTrace, seq: u64, at: u64) {
        let event = Event::new(SimTime::from_millis(at), ActorId(1), EventPayload::ActorReady);
        let key = EventKey {
            at: event.at,
            tier: event.tier,
            seq,
        };
        trace.record(&key, &event);
    }

    #[test]
    fn identical_dispatch_gives_identical_digest() {
        let mut a = EventTrace::new(true);
        let mut b = EventTrace::new(false);
        for seq in 0..3 {
            dispatch(&mut a, seq, seq * 100);
            dispatch(&mut b, seq, seq * 100);
        }
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.entries().len(), 3);
        assert!(b.entries().is_empty());
        assert_eq!(b.len(), 3);
    }

    fn digest_of(payload: EventPayload) -> TraceDigest {
        let mut trace = EventTrace::new(false);
        let event = Event::new(SimTime::from_secs(1), ActorId(1), payload);
        let key = EventKey {
            at: event.at,
            tier: event.tier,
            seq: 0,
        };
        trace.record(&key, &event);
        trace.digest()
    }

    #[test]
    fn payload_fields_feed_the_digest() {
        let hit = |amount| EventPayload::Damage {
            source: ActorId(2),
            origin: DamageSource::Action(ActionId(1)),
            amount,
            outcome: HitResult::Hit,
        };
        assert_eq!(digest_of(hit(10)), digest_of(hit(10)));
        assert_ne!(digest_of(hit(10)), digest_of(hit(11)));

        let swing = EventPayload::Damage {
            source: ActorId(2),
            origin: DamageSource::AutoAttack,
            amount: 10,
            outcome: HitResult::Hit,
        };
        assert_ne!(digest_of(hit(10)), digest_of(swing));

        // Same numeric field, different variant.
        let tick = EventPayload::AuraTick {
            aura: AuraId(1),
            due: SimTime::from_secs(1),
        };
        let expire = EventPayload::AuraExpire {
            aura: AuraId(1),
            expires_at: SimTime::from_secs(1),
        };
        assert_ne!(digest_of(tick), digest_of(expire));

        let action = EventPayload::RecastReady {
            key: RecastKey::Action(ActionId(0)),
            ready_at: SimTime::ZERO,
        };
        let group = EventPayload::RecastReady {
            key: RecastKey::Group(RecastGroup::GLOBAL),
            ready_at: SimTime::ZERO,
        };
        assert_ne!(digest_of(action), digest_of(group));
    }

    #[test]
    fn order_changes_digest() {
        let mut a = EventTrace::default();
        let mut b = EventTrace::default();
        dispatch(&mut a, 0, 0);
        dispatch(&mut a, 1, 100);
        dispatch(&mut b, 1, 100);
        dispatch(&mut b, 0, 0);
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest().to_string().len(), 64);
    }
}
