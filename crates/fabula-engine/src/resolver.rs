//! The command resolver: free text to a verb attempt.
//!
//! Tokenize, match the longest verb phrase, match the longest item phrases
//! for the direct and indirect objects among whatever is currently
//! reachable, narrow each candidate set (asking the player when narrowing
//! needs them), then attempt the verb. Every dead end produces a specific,
//! deterministic message rather than an exception; the taxonomy lives in
//! this module.

use std::collections::HashSet;

use fabula_core::{AccessMap, ItemId};
use strsim::jaro_winkler;
use tracing::debug;

use crate::disambiguate::{Narrowed, narrow};
use crate::flow::{Flow, Prompt, PromptOption};
use crate::session::Session;
use crate::verb::{Invocation, VerbId};

/// Longest word count tried for verb and item phrases.
const MAX_PHRASE_WORDS: usize = 4;

/// Minimum jaro-winkler score for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.84;

/// Tokens that split the direct object from the indirect one.
const PREPOSITIONS: &[&str] = &[
    "in", "into", "on", "onto", "at", "to", "with", "under", "behind", "through", "about",
];

/// Lower-case, strip punctuation, split on whitespace.
pub(crate) fn tokenize(input: &str) -> Vec<String> {
    input
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

struct VerbMatch {
    /// The matched phrase as typed (lower-cased).
    phrase: String,
    /// How many tokens the phrase consumed.
    len: usize,
    /// The keyword registered under the phrase, if any.
    keyword: Option<VerbId>,
    /// Accessible items carrying a local verb under the phrase.
    owners: Vec<ItemId>,
}

/// Scan for the longest verb phrase starting at the first token. A phrase
/// counts if any accessible item answers to it, a keyword does, or it was
/// ever registered at all — a known verb with nothing in scope still gets a
/// verb-specific failure instead of the generic one.
fn match_verb(sess: &Session, access: &AccessMap, tokens: &[String]) -> Option<VerbMatch> {
    let mut seen = HashSet::new();
    let mut items: Vec<ItemId> = Vec::new();
    for ids in access.values() {
        for &id in ids {
            if seen.insert(id) {
                items.push(id);
            }
        }
    }

    let max = tokens.len().min(MAX_PHRASE_WORDS);
    for len in (1..=max).rev() {
        let phrase = tokens[..len].join(" ");
        let owners: Vec<ItemId> = items
            .iter()
            .copied()
            .filter(|&id| sess.verbs.of_item(id, &phrase).is_some())
            .collect();
        let keyword = sess.verbs.keyword(&phrase);
        if !owners.is_empty() || keyword.is_some() || sess.verbs.is_known(&phrase) {
            return Some(VerbMatch {
                phrase,
                len,
                keyword,
                owners,
            });
        }
    }
    None
}

/// Find the longest item phrase anywhere in `tokens`; shorter sub-phrases
/// are only tried when no longer phrase matches, leftmost wins on ties.
fn match_object(access: &AccessMap, tokens: &[String]) -> Option<(String, Vec<ItemId>)> {
    let max = tokens.len().min(MAX_PHRASE_WORDS);
    for len in (1..=max).rev() {
        for start in 0..=(tokens.len() - len) {
            let phrase = tokens[start..start + len].join(" ");
            if let Some(ids) = access.get(&phrase) {
                return Some((phrase, ids.clone()));
            }
        }
    }
    None
}

/// Split the remaining tokens at the first preposition after the direct
/// object; a leading preposition belongs to the verb and is skipped.
fn split_preposition(tokens: &[String]) -> (&[String], Option<&[String]>) {
    let tokens = match tokens.first() {
        Some(first) if PREPOSITIONS.contains(&first.as_str()) => &tokens[1..],
        _ => tokens,
    };
    for (index, token) in tokens.iter().enumerate() {
        if index > 0 && PREPOSITIONS.contains(&token.as_str()) {
            return (&tokens[..index], Some(&tokens[index + 1..]));
        }
    }
    (tokens, None)
}

/// The parse, carried across disambiguation suspensions.
#[derive(Debug, Clone)]
struct Plan {
    verb_phrase: String,
    keyword: Option<VerbId>,
    direct_phrase: Option<String>,
    direct: Vec<ItemId>,
    indirect_phrase: Option<String>,
    indirect: Vec<ItemId>,
}

/// Resolve one input string as far as it can go without the player.
pub(crate) fn resolve_input(sess: &mut Session, input: &str) -> Flow {
    let tokens = tokenize(input);
    if tokens.is_empty() {
        let text = sess.describe_room();
        sess.say(text);
        return Flow::Done(true);
    }

    let access = sess.accessible_map();
    let Some(matched) = match_verb(sess, &access, &tokens) else {
        return unrecognized(sess, &tokens);
    };
    debug!(phrase = %matched.phrase, "verb matched");
    let rest: Vec<String> = tokens[matched.len..].to_vec();

    // Dispatcher-style keywords take the raw tail instead of objects.
    if let Some(vid) = matched.keyword
        && sess.verbs.get(vid).raw_tail
    {
        let verb = sess.verbs.get(vid).clone();
        let inv = Invocation {
            item: None,
            other: None,
            verb: verb.name.clone(),
            tail: rest,
        };
        return verb.attempt(sess, inv);
    }

    let (direct_tokens, indirect_tokens) = split_preposition(&rest);

    let direct = match_object(&access, direct_tokens);
    if direct.is_none() && !direct_tokens.is_empty() {
        sess.say(format!("You don't see a way to {} that.", matched.phrase));
        return Flow::Done(false);
    }

    let indirect = match indirect_tokens {
        Some(tokens) if !tokens.is_empty() => match match_object(&access, tokens) {
            Some(found) => Some(found),
            None => {
                sess.say(format!("You don't see any {} here.", tokens.join(" ")));
                return Flow::Done(false);
            }
        },
        _ => None,
    };

    let (direct_phrase, direct_candidates) = match direct {
        Some((phrase, candidates)) => (Some(phrase), candidates),
        // A bare item-owned verb targets its owner when that is unambiguous:
        // directions are verbs on the room itself.
        None if matched.keyword.is_none() => match matched.owners.as_slice() {
            [only] => (None, vec![*only]),
            _ => {
                sess.say(format!("{} what?", capitalize(&matched.phrase)));
                return Flow::Done(false);
            }
        },
        None => (None, Vec::new()),
    };

    let (indirect_phrase, indirect_candidates) = match indirect {
        Some((phrase, candidates)) => (Some(phrase), candidates),
        None => (None, Vec::new()),
    };

    let plan = Plan {
        verb_phrase: matched.phrase,
        keyword: matched.keyword,
        direct_phrase,
        direct: direct_candidates,
        indirect_phrase,
        indirect: indirect_candidates,
    };
    advance(sess, plan)
}

/// Narrow both objects and execute, suspending at most once at a time.
fn advance(sess: &mut Session, plan: Plan) -> Flow {
    let direct_narrowed = narrow(sess, &plan.verb_phrase, &plan.direct);
    let indirect_narrowed = narrow(sess, &plan.verb_phrase, &plan.indirect);

    // Ambiguity on both objects at once degrades to a plain failure rather
    // than chaining two clarification prompts.
    if matches!(direct_narrowed, Narrowed::Choice(_))
        && matches!(indirect_narrowed, Narrowed::Choice(_))
    {
        sess.say("You need to be more specific.");
        return Flow::Done(false);
    }

    let item: Option<ItemId> = if plan.direct.is_empty() {
        None
    } else {
        match direct_narrowed {
            Narrowed::One(id) => Some(id),
            Narrowed::Nothing => {
                sess.say("I don't know what that refers to.");
                return Flow::Done(false);
            }
            Narrowed::Choice(candidates) => {
                return which_prompt(sess, plan, candidates, true);
            }
        }
    };

    let other: Option<ItemId> = if plan.indirect.is_empty() {
        None
    } else {
        match indirect_narrowed {
            Narrowed::One(id) => Some(id),
            Narrowed::Nothing => {
                sess.say("I don't know what that refers to.");
                return Flow::Done(false);
            }
            Narrowed::Choice(candidates) => {
                return which_prompt(sess, plan, candidates, false);
            }
        }
    };

    execute(sess, &plan, item, other)
}

/// Ask which of several candidates the player means; the chosen option
/// resumes resolution with that concrete item substituted.
fn which_prompt(sess: &mut Session, plan: Plan, candidates: Vec<ItemId>, direct: bool) -> Flow {
    let phrase = if direct {
        plan.direct_phrase.clone()
    } else {
        plan.indirect_phrase.clone()
    }
    .unwrap_or_else(|| "one".to_string());

    let options: Vec<PromptOption> = candidates
        .into_iter()
        .map(|id| {
            let label = sess.world.name_of(id).to_string();
            let mut resumed = plan.clone();
            PromptOption::new(
                label,
                Box::new(move |sess: &mut Session| {
                    if direct {
                        resumed.direct = vec![id];
                    } else {
                        resumed.indirect = vec![id];
                    }
                    advance(sess, resumed)
                }),
            )
        })
        .collect();

    Flow::Awaiting(Prompt::new(format!("Which {phrase} do you mean?"), options))
}

/// Pick the verb instance — item-local over keyword — check the
/// prepositional contract, and attempt.
fn execute(sess: &mut Session, plan: &Plan, item: Option<ItemId>, other: Option<ItemId>) -> Flow {
    let local = item.and_then(|id| sess.verbs.of_item(id, &plan.verb_phrase));
    let Some(vid) = local.or(plan.keyword) else {
        match item {
            Some(id) => {
                let name = sess.world.name_of(id).to_string();
                sess.say(format!("You can't {} the {}.", plan.verb_phrase, name));
            }
            None => {
                sess.say(format!("You don't see a way to {} that.", plan.verb_phrase));
            }
        }
        return Flow::Done(false);
    };

    let verb = sess.verbs.get(vid).clone();
    if let Some(prep) = &verb.prepositional
        && other.is_none()
        && !prep.optional
    {
        let subject = match item {
            Some(id) => format!("the {}", sess.world.name_of(id)),
            None => "that".to_string(),
        };
        sess.say(format!(
            "{} {} {}?",
            capitalize(&verb.name),
            subject,
            prep.interrogative
        ));
        return Flow::Done(false);
    }

    let inv = Invocation {
        item,
        other,
        verb: verb.name.clone(),
        tail: Vec::new(),
    };
    verb.attempt(sess, inv)
}

/// Neither a verb nor anything actionable was recognized.
fn unrecognized(sess: &mut Session, tokens: &[String]) -> Flow {
    let mut message = "That's not something you can do.".to_string();
    if let Some(suggestion) = suggest_verb(sess, &tokens[0]) {
        message.push_str(&format!(" Did you mean \"{suggestion}\"?"));
    }
    sess.say(message);
    Flow::Done(false)
}

/// Closest known verb phrase to a mistyped word, if close enough.
fn suggest_verb(sess: &Session, word: &str) -> Option<String> {
    sess.verbs
        .known_phrases()
        .map(|phrase| (phrase.to_string(), jaro_winkler(word, phrase)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(phrase, _)| phrase)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_strips_punctuation_and_case() {
        assert_eq!(tokenize("Take the Ball!"), vec!["take", "the", "ball"]);
        assert_eq!(tokenize("  "), Vec::<String>::new());
    }

    #[test]
    fn split_at_first_inner_preposition() {
        let tokens = tokenize("cushion in chair");
        let (direct, indirect) = split_preposition(&tokens);
        assert_eq!(direct, &["cushion".to_string()]);
        assert_eq!(indirect, Some(&["chair".to_string()][..]));
    }

    #[test]
    fn leading_preposition_is_skipped() {
        let tokens = tokenize("at the ball");
        let (direct, indirect) = split_preposition(&tokens);
        assert_eq!(direct, &["the".to_string(), "ball".to_string()]);
        assert_eq!(indirect, None);
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("throw"), "Throw");
        assert_eq!(capitalize(""), "");
    }
}
