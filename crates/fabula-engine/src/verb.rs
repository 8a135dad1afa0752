//! Verbs: invocable actions and their success/failure contract.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use fabula_core::ItemId;

use crate::action::{ActionChain, run_chain};
use crate::flow::{Flow, flow_then};
use crate::session::Session;

/// A predicate over the invocation context; all must pass for success.
pub type TestFn = Rc<dyn Fn(&Session, &Invocation) -> bool>;

/// The bound context a verb attempt runs against.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The acting (direct) item.
    pub item: Option<ItemId>,
    /// The indirect item, for prepositional verbs.
    pub other: Option<ItemId>,
    /// The canonical name of the verb being attempted.
    pub verb: String,
    /// Raw tokens after the verb phrase, for dispatcher-style keywords.
    pub tail: Vec<String>,
}

/// The indirect-object contract of a prepositional verb.
#[derive(Debug, Clone)]
pub struct Prepositional {
    /// Completion question fragment, e.g. "at what" or "with what".
    pub interrogative: String,
    /// Whether the verb may also run without an indirect object.
    pub optional: bool,
}

/// A named action: aliases, test predicates, and success/failure chains.
///
/// Cheap to clone; chains and tests are shared behind `Rc` so a verb can be
/// lifted out of the registry before running against the mutable session.
#[derive(Clone)]
pub struct Verb {
    /// Canonical name.
    pub name: String,
    /// Alternate words and phrases that invoke this verb.
    pub aliases: Vec<String>,
    /// The owning item; None for keywords.
    pub parent: Option<ItemId>,
    /// Whether the verb works on items outside the player's inventory.
    pub remote: bool,
    /// Whether the verb consumes the raw token tail instead of object
    /// matching (dispatcher-style keywords).
    pub raw_tail: bool,
    /// Whether this verb moves the player; rooms list these as exits.
    pub movement: bool,
    /// The indirect-object contract, if any.
    pub prepositional: Option<Prepositional>,
    tests: Vec<TestFn>,
    on_success: ActionChain,
    on_failure: ActionChain,
}

impl Verb {
    /// A verb with no tests and empty chains. Non-remote by default: using
    /// it requires holding the item, which is what most authored item
    /// interactions want.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            parent: None,
            remote: false,
            raw_tail: false,
            movement: false,
            prepositional: None,
            tests: Vec::new(),
            on_success: ActionChain::new(),
            on_failure: ActionChain::new(),
        }
    }

    /// Add an alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into().to_lowercase());
        self
    }

    /// Allow use on items outside the inventory.
    pub fn remote(mut self) -> Self {
        self.remote = true;
        self
    }

    /// Consume the raw token tail instead of matching objects.
    pub fn raw_tail(mut self) -> Self {
        self.raw_tail = true;
        self
    }

    /// Mark as a movement verb; rooms list these as exits.
    pub fn movement(mut self) -> Self {
        self.movement = true;
        self
    }

    /// Require an indirect object, asking `interrogative` when missing.
    pub fn prepositional(mut self, interrogative: impl Into<String>) -> Self {
        self.prepositional = Some(Prepositional {
            interrogative: interrogative.into(),
            optional: false,
        });
        self
    }

    /// Accept an optional indirect object.
    pub fn prepositional_optional(mut self, interrogative: impl Into<String>) -> Self {
        self.prepositional = Some(Prepositional {
            interrogative: interrogative.into(),
            optional: true,
        });
        self
    }

    /// Append a test predicate.
    pub fn with_test(mut self, test: impl Fn(&Session, &Invocation) -> bool + 'static) -> Self {
        self.tests.push(Rc::new(test));
        self
    }

    /// Set the success chain.
    pub fn with_success(mut self, chain: ActionChain) -> Self {
        self.on_success = chain;
        self
    }

    /// Set the failure chain.
    pub fn with_failure(mut self, chain: ActionChain) -> Self {
        self.on_failure = chain;
        self
    }

    /// Attempt the verb against a bound context.
    ///
    /// Before any test runs: the auto-action executor may insert implicit
    /// prerequisite commands (aborting everything if one fails), then the
    /// effect table may override or augment the normal logic. Only then do
    /// the test predicates gate the success or failure chain.
    pub fn attempt(&self, sess: &mut Session, inv: Invocation) -> Flow {
        if !sess.run_auto_actions(self, &inv) {
            return Flow::Done(false);
        }
        if let Some(effect) = sess.effects.lookup(inv.item, inv.other, &self.name).cloned() {
            let continue_verb = effect.continue_verb;
            let verb = self.clone();
            let inv_after = inv.clone();
            let flow = run_chain(sess, effect.actions, inv, effect.successful);
            return flow_then(sess, flow, move |sess, result| {
                if continue_verb {
                    verb.run_core(sess, inv_after)
                } else {
                    Flow::Done(result)
                }
            });
        }
        self.run_core(sess, inv)
    }

    fn run_core(&self, sess: &mut Session, inv: Invocation) -> Flow {
        // Non-remote verbs carry an implicit leading test: the item must be
        // in hand, and its failure pre-empts any authored failure narration.
        if !self.remote
            && let Some(item) = inv.item
            && !sess.held(item)
        {
            let name = sess.world.name_of(item).to_string();
            sess.say(format!("You're not holding the {name}."));
            return Flow::Done(false);
        }
        for test in &self.tests {
            if !test(sess, &inv) {
                return run_chain(sess, self.on_failure.clone(), inv, false);
            }
        }
        run_chain(sess, self.on_success.clone(), inv, true)
    }
}

impl fmt::Debug for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verb")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("parent", &self.parent)
            .field("remote", &self.remote)
            .field("tests", &self.tests.len())
            .finish_non_exhaustive()
    }
}

/// Handle to a registered verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerbId(usize);

/// Arena of verbs plus the phrase indexes that find them.
///
/// Keywords are global verbs owned by no item ("inventory", "wait"); their
/// alias registration is last-wins. Per-item maps are independent of the
/// keyword level, and re-registering a name on an item replaces its
/// predecessor, which is how an item overrides a default verb. The phrase
/// set only grows: a verb phrase stays recognizable even when nothing in
/// scope currently answers to it.
#[derive(Debug, Default)]
pub struct VerbRegistry {
    verbs: Vec<Verb>,
    keywords: HashMap<String, VerbId>,
    by_item: HashMap<ItemId, HashMap<String, VerbId>>,
    known: HashSet<String>,
}

impl VerbRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn phrases_of(verb: &Verb) -> Vec<String> {
        let mut phrases = vec![verb.name.to_lowercase()];
        phrases.extend(verb.aliases.iter().cloned());
        phrases
    }

    /// Register a global keyword verb.
    pub fn register_keyword(&mut self, verb: Verb) -> VerbId {
        let id = VerbId(self.verbs.len());
        for phrase in Self::phrases_of(&verb) {
            self.keywords.insert(phrase.clone(), id);
            self.known.insert(phrase);
        }
        self.verbs.push(verb);
        id
    }

    /// Register a verb owned by an item.
    pub fn register_for(&mut self, item: ItemId, mut verb: Verb) -> VerbId {
        verb.parent = Some(item);
        let id = VerbId(self.verbs.len());
        let map = self.by_item.entry(item).or_default();
        for phrase in Self::phrases_of(&verb) {
            map.insert(phrase.clone(), id);
            self.known.insert(phrase);
        }
        self.verbs.push(verb);
        id
    }

    /// Look up a keyword by phrase.
    pub fn keyword(&self, phrase: &str) -> Option<VerbId> {
        self.keywords.get(phrase).copied()
    }

    /// Look up an item's verb by phrase.
    pub fn of_item(&self, item: ItemId, phrase: &str) -> Option<VerbId> {
        self.by_item.get(&item).and_then(|m| m.get(phrase)).copied()
    }

    /// Whether any verb, anywhere, has ever been registered for the phrase.
    pub fn is_known(&self, phrase: &str) -> bool {
        self.known.contains(phrase)
    }

    /// Every verb phrase ever registered.
    pub fn known_phrases(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }

    /// Get a verb by id.
    pub fn get(&self, id: VerbId) -> &Verb {
        &self.verbs[id.0]
    }

    /// Canonical names of an item's verbs matching a predicate.
    pub fn item_verb_names(&self, item: ItemId, filter: impl Fn(&Verb) -> bool) -> Vec<String> {
        let mut names: Vec<String> = self
            .by_item
            .get(&item)
            .map(|m| {
                m.values()
                    .map(|id| &self.verbs[id.0])
                    .filter(|v| filter(v))
                    .map(|v| v.name.clone())
                    .collect::<HashSet<_>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_alias_registration_is_last_wins() {
        let mut registry = VerbRegistry::new();
        let first = registry.register_keyword(Verb::new("wait").with_alias("z"));
        let second = registry.register_keyword(Verb::new("zap").with_alias("z"));

        assert_eq!(registry.keyword("wait"), Some(first));
        assert_eq!(registry.keyword("z"), Some(second));
    }

    #[test]
    fn item_registration_replaces_same_name() {
        let mut registry = VerbRegistry::new();
        let item = ItemId::new();
        registry.register_for(item, Verb::new("take"));
        let custom = registry.register_for(item, Verb::new("take").remote());

        assert_eq!(registry.of_item(item, "take"), Some(custom));
        assert!(registry.get(custom).remote);
    }

    #[test]
    fn item_maps_are_independent_of_keywords() {
        let mut registry = VerbRegistry::new();
        let item = ItemId::new();
        let keyword = registry.register_keyword(Verb::new("look"));
        let local = registry.register_for(item, Verb::new("look"));

        assert_eq!(registry.keyword("look"), Some(keyword));
        assert_eq!(registry.of_item(item, "look"), Some(local));
    }

    #[test]
    fn phrases_stay_known_forever() {
        let mut registry = VerbRegistry::new();
        let item = ItemId::new();
        registry.register_for(item, Verb::new("polish").with_alias("buff"));

        assert!(registry.is_known("polish"));
        assert!(registry.is_known("buff"));
        assert!(!registry.is_known("launder"));
    }

    #[test]
    fn registering_sets_parent() {
        let mut registry = VerbRegistry::new();
        let item = ItemId::new();
        let id = registry.register_for(item, Verb::new("ring"));
        assert_eq!(registry.get(id).parent, Some(item));
    }
}
