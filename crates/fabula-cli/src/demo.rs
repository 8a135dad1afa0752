//! The bundled demo world: the Dusty Parlor.

use fabula_core::{DoorConfig, ItemConfig, PropertyValue, TextSource};
use fabula_engine::{
    Action, ActionChain, Effect, GraphChoice, OptionGraph, OptionNode, Session, Slot, Verb,
};
use fabula_schedule::ScheduledEvent;

/// Build the demo session, player standing in the parlor.
pub fn build() -> Session {
    let mut sess = Session::new();

    let parlor = sess
        .add_item(ItemConfig::new("dusty parlor").with_description(TextSource::cyclic([
            "Dust motes hang in the lamplight. A trapdoor is set into the floorboards.",
            "The lamplight gutters. The trapdoor waits where it always has.",
        ])))
        .expect("demo names are unique");
    let cellar = sess
        .add_item(
            ItemConfig::new("cellar")
                .with_description("Cold air and cobwebs. A ladder leads back up."),
        )
        .expect("demo names are unique");
    sess.add_exit(cellar, "up", "u", parlor);

    let red_ball = sess
        .add_item(
            ItemConfig::new("red ball")
                .holdable()
                .with_size(1)
                .with_description("A bright red rubber ball, slightly sticky."),
        )
        .expect("demo names are unique");
    let blue_ball = sess
        .add_item(
            ItemConfig::new("blue ball")
                .holdable()
                .with_size(1)
                .with_description("A scuffed blue ball that has seen better days."),
        )
        .expect("demo names are unique");

    let window = sess
        .add_item(ItemConfig::new("round window").with_description("Grimy glass, painted shut."))
        .expect("demo names are unique");

    let throw = |sess: &mut Session, ball| {
        sess.add_verb(
            ball,
            Verb::new("throw")
                .with_alias("toss")
                .prepositional("at what")
                .with_success(ActionChain::of(Action::Template(
                    "You throw the {item} at the {other}. It bounces off.".into(),
                ))),
        );
    };
    throw(&mut sess, red_ball);
    throw(&mut sess, blue_ball);

    // Throwing the red ball at the window has consequences.
    sess.add_effect(
        red_ball,
        Some(window),
        "throw",
        Effect::new(
            true,
            ActionChain::of(Action::Say(
                "The glass cracks from corner to corner. Cold air whistles in.".into(),
            )),
        ),
    );

    let cushion = sess
        .add_item(
            ItemConfig::new("cushion")
                .holdable()
                .with_size(2)
                .with_description("Overstuffed and faded."),
        )
        .expect("demo names are unique");
    let chair = sess
        .add_item(
            ItemConfig::new("wicker chair")
                .container(5)
                .with_preposition("in")
                .with_description("It creaks when the house settles."),
        )
        .expect("demo names are unique");

    let trapdoor = sess
        .add_item(
            ItemConfig::new("trapdoor")
                .with_alias("hatch")
                .leads_to(cellar)
                .with_door(DoorConfig::default())
                .with_description("Heavy oak, set flush with the floor."),
        )
        .expect("demo names are unique");

    let pillar = sess
        .add_item(
            ItemConfig::new("marble pillar")
                .with_description("It holds up the ceiling, and it intends to keep doing so."),
        )
        .expect("demo names are unique");
    sess.add_verb(
        pillar,
        Verb::new("take")
            .remote()
            .with_test(|_, _| false)
            .with_failure(ActionChain::of(Action::Say("It's far too big.".into()))),
    );

    let book = sess
        .add_item(
            ItemConfig::new("green book")
                .holdable()
                .with_size(1)
                .with_description(TextSource::paged([
                    "The flyleaf reads: \"To whoever finds the parlor.\"",
                    "The middle pages are water-stained diagrams of the house.",
                    "The last page is a single word: \"below\".",
                ])),
        )
        .expect("demo names are unique");

    let parrot = sess
        .add_item(
            ItemConfig::new("stuffed parrot")
                .with_description("Moth-eaten, but its glass eye follows you."),
        )
        .expect("demo names are unique");
    sess.add_graph(
        OptionGraph::new("parrot-talk", "greet")
            .with_node(
                OptionNode::new("greet", "The parrot tilts its head.")
                    .with_choice(
                        GraphChoice::new("Ask about the trapdoor")
                            .with_response("\"Below! Below!\" it shrieks.")
                            .with_goto("below"),
                    )
                    .with_choice(
                        GraphChoice::new("Compliment its plumage")
                            .with_response("It preens, insufferably.")
                            .once(),
                    )
                    .with_choice(GraphChoice::new("Step away").with_response("It loses interest.")),
            )
            .with_node(OptionNode::new(
                "below",
                "It stares at the floorboards and says nothing more.",
            )),
    )
    .expect("demo graph is valid");
    sess.add_verb(
        parrot,
        Verb::new("talk")
            .with_alias("talk to")
            .with_alias("speak to")
            .remote()
            .with_success(ActionChain::of(Action::Converse("parrot-talk".into()))),
    );
    sess.add_verb(
        parrot,
        Verb::new("poke")
            .with_alias("prod")
            .remote()
            .with_success(ActionChain::of(Action::text(TextSource::cyclic([
                "It wobbles on its perch.",
                "It fixes you with its glass eye.",
                "Sawdust trickles out. You feel bad.",
            ])))),
    );

    let biscuit = sess
        .add_item(
            ItemConfig::new("dry biscuit")
                .holdable()
                .with_size(1)
                .with_property("edible", PropertyValue::Boolean(true))
                .with_description("Decades old, probably."),
        )
        .expect("demo names are unique");
    sess.add_verb(
        biscuit,
        Verb::new("eat")
            .with_test(|sess, inv| {
                inv.item
                    .and_then(|id| sess.world.item(id))
                    .and_then(|item| item.property("edible"))
                    .is_some_and(|edible| edible == &PropertyValue::Boolean(true))
            })
            .with_success(
                ActionChain::of(Action::Consume(Slot::Direct))
                    .then(Action::Template("You eat the {item}. Regret follows.".into())),
            )
            .with_failure(ActionChain::of(Action::Say("Better not.".into()))),
    );

    for id in [
        red_ball, blue_ball, window, cushion, chair, trapdoor, pillar, book, parrot, biscuit,
    ] {
        sess.world.place(id, parlor);
    }

    // The house settles a few turns in.
    sess.add_keyword(
        Verb::new("settling")
            .remote()
            .with_success(ActionChain::of(Action::Say(
                "Somewhere under the floor, the house groans and settles.".into(),
            ))),
    );
    sess.schedule(ScheduledEvent::after("settling", "settling", 4));

    sess.enter(parlor);
    sess
}
