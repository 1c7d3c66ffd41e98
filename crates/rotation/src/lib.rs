//! Priority-list behavior policies for combat actors.
//!
//! A [`Rotation`] is an ordered list of [`Rule`]s. On every decision the first
//! rule whose action is ready and whose [`Condition`]s all hold produces the
//! intent. The evaluation is pure and deterministic:
//!
//! - **No hidden state**: a rotation only reads the [`PolicyView`] it is given
//! - **No randomness**: two identical views always yield the same intent
//! - **Rejection aware**: rules whose action was refused this round are skipped
//!
//! # Architecture
//!
//! - [`Condition`]: predicates over the view, composable with `Not`/`All`/`Any`
//! - [`Rule`]: action, target selection and conditions
//! - [`Rotation`]: the priority list, implementing [`BehaviorPolicy`]
//! - [`builder`]: shorthand constructors
//!
//! [`PolicyView`]: combat_core::PolicyView
//! [`BehaviorPolicy`]: combat_core::BehaviorPolicy

pub mod builder;
pub mod condition;
pub mod rotation;
pub mod rule;

pub use condition::{Condition, Scope};
pub use rotation::Rotation;
pub use rule::{Rule, RuleTarget};
