//! The vocabulary registry: phrase → item lookup.
//!
//! The registry only grows. An item stays resolvable by name for the life of
//! the world even after it becomes unreachable; reachability is a separate
//! question answered by the world graph at parse time.

use std::collections::{BTreeSet, HashMap};

use crate::item::ItemId;

/// Words too common to serve as single-word aliases on their own.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "some", "this", "that", "my", "your",
];

/// Derive the full alias set for a name: the lower-cased name itself, every
/// non-stopword word of it, and the same treatment for each extra alias.
/// Multi-word phrases are kept whole as well, so the longer, more specific
/// form stays matchable.
pub fn derive_aliases(name: &str, extras: &[String]) -> BTreeSet<String> {
    let mut aliases = BTreeSet::new();
    for phrase in std::iter::once(name).chain(extras.iter().map(String::as_str)) {
        let phrase = phrase.trim().to_lowercase();
        if phrase.is_empty() {
            continue;
        }
        for word in phrase.split_whitespace() {
            if !STOPWORDS.contains(&word) {
                aliases.insert(word.to_string());
            }
        }
        aliases.insert(phrase);
    }
    aliases
}

/// Grow-only index from lower-cased word or phrase to the items known by it.
///
/// Values are arrays, not single items: aliases may legally collide (two
/// "ball" items), and the ambiguity is deferred to the disambiguator rather
/// than resolved arbitrarily here.
#[derive(Debug, Default)]
pub struct Vocabulary {
    entries: HashMap<String, Vec<ItemId>>,
}

impl Vocabulary {
    /// Create an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index an item under every one of its aliases.
    pub fn register(&mut self, id: ItemId, aliases: &BTreeSet<String>) {
        for alias in aliases {
            let ids = self.entries.entry(alias.clone()).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    /// The items known by a word or phrase.
    pub fn lookup(&self, phrase: &str) -> &[ItemId] {
        self.entries
            .get(&phrase.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether any item is known by the phrase.
    pub fn contains(&self, phrase: &str) -> bool {
        self.entries.contains_key(&phrase.to_lowercase())
    }

    /// Every registered word and phrase.
    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_keeps_full_phrase_and_significant_words() {
        let aliases = derive_aliases("the Brass Lantern", &[]);
        assert!(aliases.contains("the brass lantern"));
        assert!(aliases.contains("brass"));
        assert!(aliases.contains("lantern"));
        assert!(!aliases.contains("the"));
    }

    #[test]
    fn derive_decomposes_extras_too() {
        let aliases = derive_aliases("trapdoor", &["the old hatch".to_string()]);
        assert!(aliases.contains("trapdoor"));
        assert!(aliases.contains("the old hatch"));
        assert!(aliases.contains("old"));
        assert!(aliases.contains("hatch"));
    }

    #[test]
    fn colliding_aliases_accumulate() {
        let mut vocab = Vocabulary::new();
        let red = ItemId::new();
        let blue = ItemId::new();
        vocab.register(red, &derive_aliases("red ball", &[]));
        vocab.register(blue, &derive_aliases("blue ball", &[]));

        assert_eq!(vocab.lookup("ball"), &[red, blue]);
        assert_eq!(vocab.lookup("red ball"), &[red]);
    }

    #[test]
    fn reregistration_is_idempotent() {
        let mut vocab = Vocabulary::new();
        let id = ItemId::new();
        let aliases = derive_aliases("mug", &[]);
        vocab.register(id, &aliases);
        vocab.register(id, &aliases);
        assert_eq!(vocab.lookup("mug").len(), 1);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut vocab = Vocabulary::new();
        let id = ItemId::new();
        vocab.register(id, &derive_aliases("Rusty Sword", &[]));
        assert_eq!(vocab.lookup("RUSTY SWORD"), &[id]);
        assert_eq!(vocab.lookup("sword"), &[id]);
    }

    #[test]
    fn unknown_phrase_is_empty() {
        let vocab = Vocabulary::new();
        assert!(vocab.lookup("nothing").is_empty());
        assert!(!vocab.contains("nothing"));
    }

    #[test]
    fn phrases_enumerate_every_entry() {
        let mut vocab = Vocabulary::new();
        vocab.register(ItemId::new(), &derive_aliases("brass key", &[]));
        let phrases: Vec<&str> = vocab.phrases().collect();
        assert!(phrases.contains(&"brass key"));
        assert!(phrases.contains(&"brass"));
        assert!(phrases.contains(&"key"));
    }
}

#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Every significant word of a multi-word name is a standalone alias,
        // and the full phrase is an alias too.
        #[test]
        fn significant_words_are_aliases(words in proptest::collection::vec("[a-z]{2,8}", 1..5)) {
            let name = words.join(" ");
            let aliases = derive_aliases(&name, &[]);
            prop_assert!(aliases.contains(&name));
            for word in &words {
                if !STOPWORDS.contains(&word.as_str()) {
                    prop_assert!(aliases.contains(word));
                }
            }
        }
    }
}
