//! Narrowing a candidate set to one item.

use fabula_core::ItemId;

use crate::session::Session;

/// Result of automatic narrowing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Narrowed {
    /// Nothing the player could mean.
    Nothing,
    /// Exactly one item, resolved silently.
    One(ItemId),
    /// Several plausible items; the player must choose among these.
    Choice(Vec<ItemId>),
}

/// Try to narrow `candidates` without asking the player.
///
/// Invisible items are filtered first, then items that do not support the
/// attempted verb; if exactly one candidate survives either filter it is
/// used silently. Anything still plural needs an explicit choice.
pub(crate) fn narrow(sess: &Session, verb_phrase: &str, candidates: &[ItemId]) -> Narrowed {
    match candidates {
        [] => return Narrowed::Nothing,
        [only] => return Narrowed::One(*only),
        _ => {}
    }

    let visible: Vec<ItemId> = candidates
        .iter()
        .copied()
        .filter(|&id| sess.world.item(id).is_some_and(|i| i.visible()))
        .collect();
    match visible.as_slice() {
        [] => return Narrowed::Nothing,
        [only] => return Narrowed::One(*only),
        _ => {}
    }

    let supporting: Vec<ItemId> = visible
        .iter()
        .copied()
        .filter(|&id| sess.verbs.of_item(id, verb_phrase).is_some())
        .collect();
    match supporting.as_slice() {
        [only] => Narrowed::One(*only),
        [] => Narrowed::Choice(visible),
        _ => Narrowed::Choice(supporting),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::verb::Verb;
    use fabula_core::ItemConfig;

    fn session_with_balls() -> (Session, ItemId, ItemId) {
        let mut sess = Session::new();
        let room = sess.add_item(ItemConfig::new("court")).unwrap();
        let red = sess
            .add_item(ItemConfig::new("red ball").holdable())
            .unwrap();
        let blue = sess
            .add_item(ItemConfig::new("blue ball").holdable())
            .unwrap();
        sess.world.place(red, room);
        sess.world.place(blue, room);
        sess.enter(room);
        (sess, red, blue)
    }

    #[test]
    fn single_candidate_resolves_immediately() {
        let (sess, red, _) = session_with_balls();
        assert_eq!(narrow(&sess, "examine", &[red]), Narrowed::One(red));
    }

    #[test]
    fn empty_candidates_resolve_to_nothing() {
        let (sess, _, _) = session_with_balls();
        assert_eq!(narrow(&sess, "examine", &[]), Narrowed::Nothing);
    }

    #[test]
    fn invisible_items_are_filtered() {
        let (mut sess, red, blue) = session_with_balls();
        sess.world.item_mut(blue).unwrap().set_visible(false);
        assert_eq!(narrow(&sess, "examine", &[red, blue]), Narrowed::One(red));
    }

    #[test]
    fn verb_support_filter_narrows() {
        let (mut sess, red, blue) = session_with_balls();
        sess.add_verb(red, Verb::new("bounce").remote());
        assert_eq!(narrow(&sess, "bounce", &[red, blue]), Narrowed::One(red));
    }

    #[test]
    fn still_plural_needs_a_choice() {
        let (sess, red, blue) = session_with_balls();
        assert_eq!(
            narrow(&sess, "examine", &[red, blue]),
            Narrowed::Choice(vec![red, blue])
        );
    }

    #[test]
    fn all_invisible_is_nothing() {
        let (mut sess, red, blue) = session_with_balls();
        sess.world.item_mut(red).unwrap().set_visible(false);
        sess.world.item_mut(blue).unwrap().set_visible(false);
        assert_eq!(narrow(&sess, "examine", &[red, blue]), Narrowed::Nothing);
    }
}
