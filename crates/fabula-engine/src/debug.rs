//! The debug dispatcher.
//!
//! Registered as an ordinary keyword verb, so debug commands flow through
//! the same resolver path as everything else. The leading word of the tail
//! selects an operation; the rest are its arguments.

use fabula_core::ItemConfig;

use crate::action::{Action, ActionChain};
use crate::session::Session;
use crate::verb::{Invocation, Verb};

pub(crate) fn debug_verb() -> Verb {
    Verb::new("debug")
        .remote()
        .raw_tail()
        .with_success(ActionChain::of(Action::run(dispatch)))
}

fn dispatch(sess: &mut Session, inv: &Invocation) -> bool {
    let args: Vec<&str> = inv.tail.iter().map(String::as_str).collect();
    match args.split_first() {
        Some((&"goto", rest)) if !rest.is_empty() => goto(sess, &rest.join(" ")),
        Some((&"show", rest)) if !rest.is_empty() => show(sess, &rest.join(" ")),
        Some((&"spawn", rest)) if !rest.is_empty() => spawn(sess, &rest.join(" ")),
        Some((&"move", rest)) => move_item(sess, rest),
        _ => {
            sess.say("Debug operations: goto <room>, show <item>, spawn <name>, move <item> to <container>.");
            false
        }
    }
}

fn goto(sess: &mut Session, name: &str) -> bool {
    match sess.world.find_by_name(name) {
        Some(room) => {
            sess.enter(room);
            let text = sess.describe_room();
            sess.say(text);
            true
        }
        None => {
            sess.say(format!("No item named \"{name}\"."));
            false
        }
    }
}

fn show(sess: &mut Session, name: &str) -> bool {
    let Some(id) = sess.world.find_by_name(name) else {
        sess.say(format!("No item named \"{name}\"."));
        return false;
    };
    let Some(item) = sess.world.item(id) else {
        return false;
    };
    let container = item
        .container()
        .map(|c| sess.world.name_of(c).to_string())
        .unwrap_or_else(|| "nowhere".to_string());
    let aliases: Vec<&str> = item.aliases().iter().map(String::as_str).collect();
    let text = format!(
        "{} [{}]\n  in: {}\n  visible: {}  holdable: {}  contents: {}\n  aliases: {}",
        item.name(),
        item.id,
        container,
        item.visible(),
        item.holdable,
        item.contents().len(),
        aliases.join(", "),
    );
    sess.say(text);
    true
}

fn spawn(sess: &mut Session, name: &str) -> bool {
    match sess.add_item(ItemConfig::new(name).holdable()) {
        Ok(id) => {
            let room = sess.room();
            sess.world.place(id, room);
            sess.say(format!("Spawned a {name} here."));
            true
        }
        Err(error) => {
            sess.say(format!("Can't spawn that: {error}"));
            false
        }
    }
}

fn move_item(sess: &mut Session, args: &[&str]) -> bool {
    let Some(split) = args.iter().position(|&word| word == "to") else {
        sess.say("Usage: debug move <item> to <container>.");
        return false;
    };
    let item_name = args[..split].join(" ");
    let dest_name = args[split + 1..].join(" ");
    let (Some(item), Some(dest)) = (
        sess.world.find_by_name(&item_name),
        sess.world.find_by_name(&dest_name),
    ) else {
        sess.say("I can't find one of those.");
        return false;
    };
    if sess.world.place(item, dest) {
        sess.say(format!("Moved the {item_name} to the {dest_name}."));
        true
    } else {
        sess.say("It won't fit there.");
        false
    }
}
