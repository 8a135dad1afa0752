//! Action chains: the narrated, state-mutating body of a verb.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use fabula_core::{ItemId, TextSource};

use crate::flow::{Flow, Prompt, flow_then};
use crate::options;
use crate::session::Session;
use crate::verb::Invocation;

/// An arbitrary step; returning false aborts the rest of the chain.
pub type ActFn = Rc<dyn Fn(&mut Session, &Invocation) -> bool>;

/// An item reference resolved against the invocation at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The direct object.
    Direct,
    /// The indirect object.
    Other,
    /// A specific item.
    Fixed(ItemId),
    /// The direct object's traversal destination.
    Destination,
    /// The player's current room.
    Room,
    /// The player's inventory container.
    Inventory,
}

/// One step of an action chain.
#[derive(Clone)]
pub enum Action {
    /// Narrate fixed text.
    Say(String),
    /// Narrate from a text production strategy, advancing it per run.
    SayText(Rc<RefCell<TextSource>>),
    /// Narrate a template; `{item}`, `{other}` and `{prep}` expand to the
    /// direct object's name, the indirect object's name, and the indirect
    /// object's preposition.
    Template(String),
    /// Narrate an item's description; paged descriptions suspend between
    /// pages with a "Next" option.
    Describe(Slot),
    /// Move an item into a container; aborts the chain if it does not fit.
    MoveTo {
        /// The item to move.
        what: Slot,
        /// The receiving container.
        dest: Slot,
    },
    /// Move the player and narrate the new room.
    RelocatePlayer(Slot),
    /// Open or close an item's door capability.
    SetOpen {
        /// The door to change.
        what: Slot,
        /// The new open state.
        open: bool,
    },
    /// Lock or unlock an item's door capability.
    SetLocked {
        /// The door to change.
        what: Slot,
        /// The new locked state.
        locked: bool,
    },
    /// Relocate an item to limbo; its name stays resolvable.
    Consume(Slot),
    /// Suspend into a registered option graph.
    Converse(String),
    /// An arbitrary step; returning false aborts the rest of the chain.
    Run(ActFn),
}

impl Action {
    /// Narrate from a text production strategy.
    pub fn text(source: TextSource) -> Self {
        Self::SayText(Rc::new(RefCell::new(source)))
    }

    /// An arbitrary step.
    pub fn run(f: impl Fn(&mut Session, &Invocation) -> bool + 'static) -> Self {
        Self::Run(Rc::new(f))
    }
}

// Closures keep Action from deriving Debug; summarize instead.
impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Say(text) => f.debug_tuple("Say").field(text).finish(),
            Self::SayText(_) => f.write_str("SayText(..)"),
            Self::Template(tpl) => f.debug_tuple("Template").field(tpl).finish(),
            Self::Describe(slot) => f.debug_tuple("Describe").field(slot).finish(),
            Self::MoveTo { what, dest } => f
                .debug_struct("MoveTo")
                .field("what", what)
                .field("dest", dest)
                .finish(),
            Self::RelocatePlayer(slot) => f.debug_tuple("RelocatePlayer").field(slot).finish(),
            Self::SetOpen { what, open } => f
                .debug_struct("SetOpen")
                .field("what", what)
                .field("open", open)
                .finish(),
            Self::SetLocked { what, locked } => f
                .debug_struct("SetLocked")
                .field("what", what)
                .field("locked", locked)
                .finish(),
            Self::Consume(slot) => f.debug_tuple("Consume").field(slot).finish(),
            Self::Converse(graph) => f.debug_tuple("Converse").field(graph).finish(),
            Self::Run(_) => f.write_str("Run(..)"),
        }
    }
}

/// An ordered sequence of actions, cheap to clone, resumable mid-way.
#[derive(Debug, Clone, Default)]
pub struct ActionChain {
    actions: Vec<Action>,
}

impl ActionChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-action chain.
    pub fn of(action: Action) -> Self {
        Self {
            actions: vec![action],
        }
    }

    /// Append an action.
    pub fn then(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the chain has no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn get(&self, index: usize) -> &Action {
        &self.actions[index]
    }
}

/// Run a chain to completion or its first suspension. `result` is the value
/// reported once the whole chain finishes; an aborting step forces false.
pub(crate) fn run_chain(
    sess: &mut Session,
    chain: ActionChain,
    inv: Invocation,
    result: bool,
) -> Flow {
    run_from(sess, chain, inv, 0, result)
}

fn run_from(
    sess: &mut Session,
    chain: ActionChain,
    inv: Invocation,
    start: usize,
    result: bool,
) -> Flow {
    let mut index = start;
    while index < chain.len() {
        let action = chain.get(index).clone();
        match step(sess, &action, &inv) {
            Flow::Done(true) => index += 1,
            Flow::Done(false) => return Flow::Done(false),
            Flow::Awaiting(prompt) => {
                let chain = chain.clone();
                let inv = inv.clone();
                let next = index + 1;
                return flow_then(sess, Flow::Awaiting(prompt), move |sess, ok| {
                    if ok {
                        run_from(sess, chain, inv, next, result)
                    } else {
                        Flow::Done(false)
                    }
                });
            }
        }
    }
    Flow::Done(result)
}

fn step(sess: &mut Session, action: &Action, inv: &Invocation) -> Flow {
    match action {
        Action::Say(text) => {
            sess.say(text.clone());
            Flow::Done(true)
        }
        Action::SayText(source) => {
            let text = source.borrow_mut().produce();
            sess.say(text);
            Flow::Done(true)
        }
        Action::Template(template) => {
            let text = expand(sess, template, inv);
            sess.say(text);
            Flow::Done(true)
        }
        Action::Describe(slot) => match resolve_slot(sess, *slot, inv) {
            Some(id) => describe(sess, id),
            None => Flow::Done(true),
        },
        Action::MoveTo { what, dest } => {
            let (Some(what), Some(dest)) = (
                resolve_slot(sess, *what, inv),
                resolve_slot(sess, *dest, inv),
            ) else {
                return Flow::Done(false);
            };
            Flow::Done(sess.world.place(what, dest))
        }
        Action::RelocatePlayer(slot) => {
            let Some(room) = resolve_slot(sess, *slot, inv) else {
                return Flow::Done(false);
            };
            sess.enter(room);
            let text = sess.describe_room();
            sess.say(text);
            Flow::Done(true)
        }
        Action::SetOpen { what, open } => {
            if let Some(id) = resolve_slot(sess, *what, inv) {
                sess.world.set_open(id, *open);
            }
            Flow::Done(true)
        }
        Action::SetLocked { what, locked } => {
            if let Some(id) = resolve_slot(sess, *what, inv)
                && let Some(item) = sess.world.item_mut(id)
            {
                item.set_locked(*locked);
            }
            Flow::Done(true)
        }
        Action::Consume(slot) => {
            if let Some(id) = resolve_slot(sess, *slot, inv) {
                sess.world.consume(id);
            }
            Flow::Done(true)
        }
        Action::Converse(graph) => options::begin(sess, graph.clone(), inv.clone()),
        Action::Run(f) => Flow::Done(f(sess, inv)),
    }
}

fn describe(sess: &mut Session, id: ItemId) -> Flow {
    let (text, more) = sess.world.produce_description(id);
    sess.say(text);
    if more {
        Flow::Awaiting(Prompt::next(
            "Next",
            Box::new(move |sess: &mut Session| describe(sess, id)),
        ))
    } else {
        Flow::Done(true)
    }
}

fn resolve_slot(sess: &Session, slot: Slot, inv: &Invocation) -> Option<ItemId> {
    match slot {
        Slot::Direct => inv.item,
        Slot::Other => inv.other,
        Slot::Fixed(id) => Some(id),
        Slot::Destination => inv
            .item
            .and_then(|id| sess.world.item(id))
            .and_then(|item| item.leads_to),
        Slot::Room => Some(sess.room()),
        Slot::Inventory => Some(sess.inventory_id()),
    }
}

fn expand(sess: &Session, template: &str, inv: &Invocation) -> String {
    let item = inv
        .item
        .map(|id| sess.world.name_of(id).to_string())
        .unwrap_or_default();
    let other = inv
        .other
        .map(|id| sess.world.name_of(id).to_string())
        .unwrap_or_default();
    let prep = inv
        .other
        .and_then(|id| sess.world.item(id))
        .map(|i| i.preposition.clone())
        .unwrap_or_else(|| "in".to_string());
    template
        .replace("{item}", &item)
        .replace("{other}", &other)
        .replace("{prep}", &prep)
}
