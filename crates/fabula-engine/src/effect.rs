//! The effect table: authored overrides of normal verb behavior.
//!
//! An effect special-cases the narrative outcome for one pair of items and a
//! verb, or for one item against any partner. When a verb attempt finds a
//! matching entry, the effect's chain runs in place of the verb's normal
//! test/action logic; `continue_verb` lets the verb still run afterwards,
//! e.g. to let "take" proceed after flavor text fires.

use std::collections::HashMap;

use fabula_core::ItemId;

use crate::action::ActionChain;

/// One authored override.
#[derive(Debug, Clone)]
pub struct Effect {
    /// Whether the overridden outcome counts as verb success for chaining.
    pub successful: bool,
    /// Whether the verb's normal logic still runs after the effect's chain.
    pub continue_verb: bool,
    /// The chain run in place of (or before) the verb's own logic.
    pub actions: ActionChain,
}

impl Effect {
    /// An effect with the given outcome flag and chain.
    pub fn new(successful: bool, actions: ActionChain) -> Self {
        Self {
            successful,
            continue_verb: false,
            actions,
        }
    }

    /// Let the verb's normal logic run after the effect's chain.
    pub fn and_continue(mut self) -> Self {
        self.continue_verb = true;
        self
    }
}

/// Overrides keyed by (item, other, verb), with a wildcard form keyed by
/// (item, verb) that matches any partner. Exact pairs take precedence.
#[derive(Debug, Default)]
pub struct EffectTable {
    exact: HashMap<(ItemId, ItemId, String), Effect>,
    wildcard: HashMap<(ItemId, String), Effect>,
}

impl EffectTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect; `other: None` registers the wildcard form.
    pub fn add(
        &mut self,
        item: ItemId,
        other: Option<ItemId>,
        verb: impl Into<String>,
        effect: Effect,
    ) {
        match other {
            Some(other) => {
                self.exact.insert((item, other, verb.into()), effect);
            }
            None => {
                self.wildcard.insert((item, verb.into()), effect);
            }
        }
    }

    /// Look up the override for an invocation, exact pair first.
    pub fn lookup(
        &self,
        item: Option<ItemId>,
        other: Option<ItemId>,
        verb: &str,
    ) -> Option<&Effect> {
        let item = item?;
        if let Some(other) = other
            && let Some(effect) = self.exact.get(&(item, other, verb.to_string()))
        {
            return Some(effect);
        }
        self.wildcard.get(&(item, verb.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionChain};

    #[test]
    fn exact_pair_takes_precedence_over_wildcard() {
        let mut table = EffectTable::new();
        let ball = ItemId::new();
        let window = ItemId::new();

        table.add(
            ball,
            None,
            "throw",
            Effect::new(false, ActionChain::of(Action::Say("It bounces.".into()))),
        );
        table.add(
            ball,
            Some(window),
            "throw",
            Effect::new(true, ActionChain::of(Action::Say("Crash!".into()))),
        );

        let effect = table.lookup(Some(ball), Some(window), "throw").unwrap();
        assert!(effect.successful);

        // A different partner falls back to the wildcard
        let effect = table.lookup(Some(ball), Some(ItemId::new()), "throw").unwrap();
        assert!(!effect.successful);

        // No partner at all also matches the wildcard
        let effect = table.lookup(Some(ball), None, "throw").unwrap();
        assert!(!effect.successful);
    }

    #[test]
    fn no_item_means_no_effect() {
        let table = EffectTable::new();
        assert!(table.lookup(None, None, "throw").is_none());
    }

    #[test]
    fn different_verb_does_not_match() {
        let mut table = EffectTable::new();
        let ball = ItemId::new();
        table.add(ball, None, "throw", Effect::new(true, ActionChain::new()));
        assert!(table.lookup(Some(ball), None, "kick").is_none());
    }
}
