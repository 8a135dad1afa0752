//! The standard verb library.
//!
//! Keywords that are always in scope (look, inventory, wait, help, debug)
//! and the per-item defaults each capability brings with it. Items override
//! any of these by registering a verb of the same name.

use fabula_core::{Item, ItemId};

use crate::action::{Action, ActionChain, Slot};
use crate::auto::default_auto_actions;
use crate::debug;
use crate::session::Session;
use crate::verb::Verb;

/// Install keywords and default auto-actions into a fresh session.
pub(crate) fn install(sess: &mut Session) {
    sess.set_auto_actions(default_auto_actions());

    sess.add_keyword(
        Verb::new("look")
            .with_alias("l")
            .remote()
            .with_success(ActionChain::of(Action::run(|sess, _| {
                let text = sess.describe_room();
                sess.say(text);
                true
            }))),
    );

    sess.add_keyword(
        Verb::new("inventory")
            .with_alias("i")
            .with_alias("inv")
            .remote()
            .with_success(ActionChain::of(Action::run(|sess, _| {
                let inventory = sess.inventory_id();
                let names: Vec<String> = sess
                    .world
                    .item(inventory)
                    .map(|i| i.contents().to_vec())
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|id| sess.world.item(id))
                    .map(|item| item.name().to_string())
                    .collect();
                if names.is_empty() {
                    sess.say("You are carrying nothing.");
                } else {
                    let mut out = "You are carrying:".to_string();
                    for name in names {
                        out.push_str(&format!("\n  - {name}"));
                    }
                    sess.say(out);
                }
                true
            }))),
    );

    sess.add_keyword(
        Verb::new("wait")
            .with_alias("z")
            .remote()
            .with_success(ActionChain::of(Action::Say("Time passes.".into()))),
    );

    sess.add_keyword(
        Verb::new("help")
            .remote()
            .with_success(ActionChain::of(Action::Say(
                "Some things to try:\n\
                 look — describe your surroundings\n\
                 examine <thing> — look closer\n\
                 take <thing> / drop <thing> — pick things up and put them down\n\
                 put <thing> in <container>\n\
                 open / close / unlock <door>\n\
                 inventory (or i) — what you are carrying\n\
                 directions (north, n, ...) — move between rooms\n\
                 wait — let a turn pass"
                    .into(),
            ))),
    );

    sess.add_keyword(debug::debug_verb());
}

/// Attach the standard verbs a freshly created item's capabilities call for.
pub(crate) fn attach_defaults(sess: &mut Session, id: ItemId) {
    let Some(item) = sess.world.item(id) else {
        return;
    };
    let holdable = item.holdable;
    let has_door = item.door().is_some();
    let leads_somewhere = item.leads_to.is_some();

    sess.add_verb(
        id,
        Verb::new("examine")
            .with_alias("x")
            .with_alias("look at")
            .with_alias("inspect")
            .remote()
            .with_success(ActionChain::of(Action::Describe(Slot::Direct))),
    );

    if holdable {
        sess.add_verb(id, take_verb());
        sess.add_verb(id, drop_verb());
        sess.add_verb(id, put_verb());
    }

    if has_door {
        sess.add_verb(id, open_verb());
        sess.add_verb(id, close_verb());
        sess.add_verb(id, unlock_verb());
    }

    if leads_somewhere {
        sess.add_verb(id, enter_verb());
    }
}

fn take_verb() -> Verb {
    Verb::new("take")
        .with_alias("get")
        .with_alias("grab")
        .with_alias("pick up")
        .remote()
        .with_test(|sess, inv| {
            inv.item
                .and_then(|id| sess.world.item(id))
                .is_some_and(|item| item.holdable)
        })
        .with_test(|sess, inv| inv.item.is_some_and(|id| !sess.held(id)))
        .with_test(|sess, inv| {
            inv.item
                .is_some_and(|id| sess.world.fits(sess.inventory_id(), id))
        })
        .with_success(
            ActionChain::of(Action::MoveTo {
                what: Slot::Direct,
                dest: Slot::Inventory,
            })
            .then(Action::Template("You take the {item}.".into())),
        )
        .with_failure(ActionChain::of(Action::run(|sess, inv| {
            let Some(id) = inv.item else {
                return true;
            };
            let name = sess.world.name_of(id).to_string();
            if sess.held(id) {
                sess.say(format!("You already have the {name}."));
            } else if !sess.world.fits(sess.inventory_id(), id) {
                sess.say("You can't carry any more.");
            } else {
                sess.say(format!("You can't take the {name}."));
            }
            true
        })))
}

fn drop_verb() -> Verb {
    Verb::new("drop")
        .with_alias("put down")
        .with_alias("discard")
        .with_success(
            ActionChain::of(Action::MoveTo {
                what: Slot::Direct,
                dest: Slot::Room,
            })
            .then(Action::Template("You drop the {item}.".into())),
        )
}

fn put_verb() -> Verb {
    Verb::new("put")
        .with_alias("place")
        .with_alias("insert")
        .prepositional("in what")
        .with_test(|sess, inv| {
            inv.other
                .and_then(|id| sess.world.item(id))
                .is_some_and(|other| other.is_container)
        })
        .with_test(|sess, inv| {
            inv.other
                .and_then(|id| sess.world.item(id))
                .is_some_and(|other| other.door().is_none() || other.is_open())
        })
        .with_test(|sess, inv| match (inv.item, inv.other) {
            (Some(item), Some(other)) => sess.world.fits(other, item),
            _ => false,
        })
        .with_success(
            ActionChain::of(Action::MoveTo {
                what: Slot::Direct,
                dest: Slot::Other,
            })
            .then(Action::Template(
                "You put the {item} {prep} the {other}.".into(),
            )),
        )
        .with_failure(ActionChain::of(Action::run(|sess, inv| {
            let Some(other) = inv.other else {
                return true;
            };
            let other_name = sess.world.name_of(other).to_string();
            let closed = sess
                .world
                .item(other)
                .is_some_and(|o| o.door().is_some() && !o.is_open());
            let container = sess.world.item(other).is_some_and(|o| o.is_container);
            if !container {
                let item_name = inv
                    .item
                    .map(|id| sess.world.name_of(id).to_string())
                    .unwrap_or_default();
                sess.say(format!("You can't put the {item_name} there."));
            } else if closed {
                sess.say(format!("The {other_name} is closed."));
            } else {
                sess.say(format!("There's no room in the {other_name}."));
            }
            true
        })))
}

fn open_verb() -> Verb {
    Verb::new("open")
        .remote()
        .with_test(|sess, inv| inv.item.and_then(|id| sess.world.item(id)).is_some_and(|i| !i.is_open()))
        .with_test(|sess, inv| {
            inv.item
                .and_then(|id| sess.world.item(id))
                .is_some_and(|i| !i.is_locked())
        })
        .with_success(
            ActionChain::of(Action::SetOpen {
                what: Slot::Direct,
                open: true,
            })
            .then(Action::Template("You open the {item}.".into())),
        )
        .with_failure(ActionChain::of(Action::run(|sess, inv| {
            let Some(id) = inv.item else {
                return true;
            };
            let name = sess.world.name_of(id).to_string();
            if sess.world.item(id).is_some_and(|i| i.is_open()) {
                sess.say(format!("The {name} is already open."));
            } else {
                sess.say(format!("The {name} is locked."));
            }
            true
        })))
}

fn close_verb() -> Verb {
    Verb::new("close")
        .with_alias("shut")
        .remote()
        .with_test(|sess, inv| inv.item.and_then(|id| sess.world.item(id)).is_some_and(Item::is_open))
        .with_test(|sess, inv| {
            inv.item
                .and_then(|id| sess.world.item(id))
                .is_some_and(|i| !i.door().is_some_and(|d| d.always_open))
        })
        .with_success(
            ActionChain::of(Action::SetOpen {
                what: Slot::Direct,
                open: false,
            })
            .then(Action::Template("You close the {item}.".into())),
        )
        .with_failure(ActionChain::of(Action::run(|sess, inv| {
            let Some(id) = inv.item else {
                return true;
            };
            let name = sess.world.name_of(id).to_string();
            if sess.world.item(id).is_some_and(|i| !i.is_open()) {
                sess.say(format!("The {name} is already closed."));
            } else {
                sess.say(format!("The {name} won't close."));
            }
            true
        })))
}

fn unlock_verb() -> Verb {
    Verb::new("unlock")
        .remote()
        .with_test(|sess, inv| inv.item.and_then(|id| sess.world.item(id)).is_some_and(Item::is_locked))
        .with_test(|sess, inv| {
            // Unlockable freely unless a specific key is required.
            let key = inv
                .item
                .and_then(|id| sess.world.item(id))
                .and_then(|i| i.door())
                .and_then(|d| d.key);
            match key {
                Some(key) => sess.held(key),
                None => true,
            }
        })
        .with_success(
            ActionChain::of(Action::SetLocked {
                what: Slot::Direct,
                locked: false,
            })
            .then(Action::Template("You unlock the {item}.".into())),
        )
        .with_failure(ActionChain::of(Action::run(|sess, inv| {
            let Some(id) = inv.item else {
                return true;
            };
            let name = sess.world.name_of(id).to_string();
            if sess.world.item(id).is_some_and(|i| !i.is_locked()) {
                sess.say(format!("The {name} isn't locked."));
            } else {
                sess.say("You don't have the key.");
            }
            true
        })))
}

fn enter_verb() -> Verb {
    Verb::new("enter")
        .with_alias("go through")
        .remote()
        .with_test(|sess, inv| {
            inv.item
                .and_then(|id| sess.world.item(id))
                .is_some_and(|i| i.door().is_none() || i.is_open())
        })
        .with_success(ActionChain::of(Action::RelocatePlayer(Slot::Destination)))
        .with_failure(ActionChain::of(Action::run(|sess, inv| {
            let Some(id) = inv.item else {
                return true;
            };
            let name = sess.world.name_of(id).to_string();
            sess.say(format!("The {name} is closed."));
            true
        })))
}
