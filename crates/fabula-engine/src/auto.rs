//! Auto-actions: implicit prerequisite commands.
//!
//! Players should not have to type "take book" before "read book". Before
//! every verb attempt, each registered auto-action checks its condition
//! against the invocation; a triggered one synthesizes one or more command
//! strings and feeds them through the full resolver as if freshly typed. If
//! any synthesized command fails, the outer command is aborted.

use std::fmt;
use std::rc::Rc;

use crate::session::Session;
use crate::verb::{Invocation, Verb};

/// Condition deciding whether the auto-action applies to this attempt.
pub type AutoCondition = Rc<dyn Fn(&Session, &Verb, &Invocation) -> bool>;

/// Producer of the synthesized command strings.
pub type AutoInputs = Rc<dyn Fn(&Session, &Invocation) -> Vec<String>>;

/// An implicit command inserted before a verb attempt.
#[derive(Clone)]
pub struct AutoAction {
    /// Name used in logging.
    pub name: String,
    pub(crate) condition: AutoCondition,
    pub(crate) inputs: AutoInputs,
}

impl AutoAction {
    /// Create an auto-action.
    pub fn new(
        name: impl Into<String>,
        condition: impl Fn(&Session, &Verb, &Invocation) -> bool + 'static,
        inputs: impl Fn(&Session, &Invocation) -> Vec<String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            condition: Rc::new(condition),
            inputs: Rc::new(inputs),
        }
    }
}

impl fmt::Debug for AutoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoAction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn wants_auto_take(sess: &Session, verb: &Verb, target: Option<fabula_core::ItemId>) -> bool {
    // Remote verbs are exempt: they act at a distance by contract.
    if verb.remote {
        return false;
    }
    let Some(id) = target else {
        return false;
    };
    let Some(item) = sess.world.item(id) else {
        return false;
    };
    item.holdable && !sess.held(id)
}

/// The default executor set: auto-take the direct object, then the indirect
/// object, when the attempted verb needs them in hand.
pub fn default_auto_actions() -> Vec<AutoAction> {
    vec![
        AutoAction::new(
            "auto-take-item",
            |sess, verb, inv| wants_auto_take(sess, verb, inv.item),
            |sess, inv| match inv.item {
                Some(id) => vec![format!("take {}", sess.world.name_of(id))],
                None => Vec::new(),
            },
        ),
        AutoAction::new(
            "auto-take-other",
            |sess, verb, inv| {
                // The indirect object only needs taking when it is holdable;
                // containers and fixtures stay where they are.
                wants_auto_take(sess, verb, inv.other)
            },
            |sess, inv| match inv.other {
                Some(id) => vec![format!("take {}", sess.world.name_of(id))],
                None => Vec::new(),
            },
        ),
    ]
}
