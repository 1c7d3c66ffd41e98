//! Shorthand constructors for writing rotations inline.
//!
//! ```
//! use combat_core::{ActionId, AuraId, SimTime};
//! use rotation::builder::{any, not, rule};
//! use rotation::{Condition, Rotation, Scope};
//!
//! let dot = AuraId(1);
//! let rotation: Rotation = [
//!     rule(ActionId(2)).when(any([
//!         Condition::AuraMissing { aura: dot, on: Scope::Target },
//!         Condition::AuraRemainsBelow { aura: dot, on: Scope::Target, below: SimTime::from_secs(3) },
//!     ])),
//!     rule(ActionId(1)).when(not(Condition::InExecutePhase)),
//! ]
//! .into_iter()
//! .collect();
//! assert_eq!(rotation.len(), 2);
//! ```

use combat_core::ActionId;

use crate::condition::Condition;
use crate::rule::Rule;

pub fn rule(action: ActionId) -> Rule {
    Rule::new(action)
}

pub fn not(condition: Condition) -> Condition {
    Condition::Not(Box::new(condition))
}

pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::All(conditions.into_iter().collect())
}

pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Any(conditions.into_iter().collect())
}
