//! Text production strategies.
//!
//! Narrative text is rarely a single fixed string: descriptions cycle,
//! sequences advance, long passages are paginated. Rather than a hierarchy of
//! text types, each strategy is a variant of one enum with a single
//! `produce` capability.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// A strategy for producing narrative text, one fragment per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum TextSource {
    /// The same text every time.
    Fixed {
        /// The text to produce.
        text: String,
    },
    /// Each entry in turn, wrapping back to the first.
    Cyclic {
        /// The entries to cycle through.
        items: Vec<String>,
        /// Index of the next entry to produce.
        index: usize,
    },
    /// Each entry in turn, then the last entry forever.
    Sequential {
        /// The entries to advance through.
        items: Vec<String>,
        /// Index of the next entry to produce.
        index: usize,
    },
    /// A uniformly random entry.
    Random {
        /// The entries to pick from.
        items: Vec<String>,
    },
    /// One page per call; readers are prompted between pages.
    Paged {
        /// The pages, in reading order.
        pages: Vec<String>,
        /// Index of the next page to produce.
        index: usize,
    },
    /// The concatenation of several sources, separated by spaces.
    Concat {
        /// The sources to concatenate.
        parts: Vec<TextSource>,
    },
}

impl TextSource {
    /// A fixed text.
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::Fixed { text: text.into() }
    }

    /// A cycling text, starting at the first entry.
    pub fn cyclic(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Cyclic {
            items: items.into_iter().map(Into::into).collect(),
            index: 0,
        }
    }

    /// A sequential text, sticking at the last entry once exhausted.
    pub fn sequential(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Sequential {
            items: items.into_iter().map(Into::into).collect(),
            index: 0,
        }
    }

    /// A random text.
    pub fn random(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Random {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// A paginated text, one page per call.
    pub fn paged(pages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Paged {
            pages: pages.into_iter().map(Into::into).collect(),
            index: 0,
        }
    }

    /// The concatenation of several sources.
    pub fn concat(parts: impl IntoIterator<Item = TextSource>) -> Self {
        Self::Concat {
            parts: parts.into_iter().collect(),
        }
    }

    /// Produce the next text fragment, advancing any internal position.
    pub fn produce(&mut self) -> String {
        match self {
            Self::Fixed { text } => text.clone(),
            Self::Cyclic { items, index } => {
                if items.is_empty() {
                    return String::new();
                }
                let text = items[*index].clone();
                *index = (*index + 1) % items.len();
                text
            }
            Self::Sequential { items, index } => {
                if items.is_empty() {
                    return String::new();
                }
                let text = items[*index].clone();
                *index = (*index + 1).min(items.len() - 1);
                text
            }
            Self::Random { items } => items
                .choose(&mut rand::rng())
                .cloned()
                .unwrap_or_default(),
            Self::Paged { pages, index } => {
                if pages.is_empty() {
                    return String::new();
                }
                // The index runs one past the end so the last page counts
                // as read; further calls re-produce the last page.
                let text = pages[(*index).min(pages.len() - 1)].clone();
                *index = (*index + 1).min(pages.len());
                text
            }
            Self::Concat { parts } => parts
                .iter_mut()
                .map(TextSource::produce)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Whether a paginated source still has unread pages. Always false for
    /// other strategies.
    pub fn pages_remaining(&self) -> bool {
        match self {
            Self::Paged { pages, index } => *index < pages.len(),
            _ => false,
        }
    }
}

impl From<&str> for TextSource {
    fn from(text: &str) -> Self {
        Self::fixed(text)
    }
}

impl From<String> for TextSource {
    fn from(text: String) -> Self {
        Self::fixed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_repeats() {
        let mut text = TextSource::fixed("hello");
        assert_eq!(text.produce(), "hello");
        assert_eq!(text.produce(), "hello");
    }

    #[test]
    fn cyclic_wraps() {
        let mut text = TextSource::cyclic(["a", "b"]);
        assert_eq!(text.produce(), "a");
        assert_eq!(text.produce(), "b");
        assert_eq!(text.produce(), "a");
    }

    #[test]
    fn sequential_sticks_at_last() {
        let mut text = TextSource::sequential(["a", "b"]);
        assert_eq!(text.produce(), "a");
        assert_eq!(text.produce(), "b");
        assert_eq!(text.produce(), "b");
    }

    #[test]
    fn paged_reports_remaining() {
        let mut text = TextSource::paged(["one", "two", "three"]);
        assert_eq!(text.produce(), "one");
        assert!(text.pages_remaining());
        assert_eq!(text.produce(), "two");
        assert!(text.pages_remaining());
        assert_eq!(text.produce(), "three");
        assert!(!text.pages_remaining());
        assert_eq!(text.produce(), "three");
    }

    #[test]
    fn random_picks_from_entries() {
        let mut text = TextSource::random(["x", "y"]);
        for _ in 0..10 {
            let produced = text.produce();
            assert!(produced == "x" || produced == "y");
        }
    }

    #[test]
    fn concat_joins_parts() {
        let mut text = TextSource::concat([TextSource::fixed("left"), TextSource::fixed("right")]);
        assert_eq!(text.produce(), "left right");
    }

    #[test]
    fn empty_sources_produce_empty() {
        assert_eq!(TextSource::cyclic(Vec::<String>::new()).produce(), "");
        assert_eq!(TextSource::random(Vec::<String>::new()).produce(), "");
    }
}
