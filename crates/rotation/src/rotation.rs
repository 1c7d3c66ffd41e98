//! Priority-list policy.

use combat_core::{BehaviorPolicy, Intent, PolicyView};

use crate::rule::Rule;

/// Ordered rules; the first one that fires wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotation {
    pub rules: Vec<Rule>,
}

impl Rotation {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule that fires, skipping actions rejected this round.
    pub fn next_intent(&self, view: &PolicyView<'_>) -> Option<Intent> {
        self.rules
            .iter()
            .filter(|rule| !view.was_rejected(rule.action))
            .find_map(|rule| rule.evaluate(view))
    }
}

impl FromIterator<Rule> for Rotation {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl BehaviorPolicy for Rotation {
    fn decide(&self, view: &PolicyView<'_>) -> Option<Intent> {
        self.next_intent(view)
    }
}
