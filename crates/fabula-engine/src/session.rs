//! The game session: one world, one player, one command in flight.

use std::collections::{HashMap, HashSet};

use fabula_core::{AccessMap, GameWorld, ItemConfig, ItemId};
use fabula_schedule::{ScheduledEvent, Scheduler, TurnLog};
use tracing::{debug, warn};

use crate::action::{Action, ActionChain, Slot};
use crate::auto::AutoAction;
use crate::effect::{Effect, EffectTable};
use crate::error::{AuthoringError, EngineResult};
use crate::flow::{Flow, Resolution};
use crate::options::OptionGraph;
use crate::resolver;
use crate::standard;
use crate::verb::{Invocation, Verb, VerbRegistry};

/// Synthesized commands may synthesize further commands; past this depth
/// something is feeding on itself.
const MAX_COMMAND_DEPTH: u32 = 8;

/// How many turns of page output to keep for the history surface.
const TURN_LOG_CAP: usize = 200;

/// A running game: the world, its verbs and effects, the player's position,
/// and the render contract (a page of text plus selectable options).
///
/// `resolve` is the sole player-facing entry point. Only one command is ever
/// in flight: scheduled events run at turn-end, after the active command's
/// chain has finished, and a suspended command parks its continuation in
/// `pending` until `choose` resumes it.
pub struct Session {
    /// The world graph and vocabulary.
    pub world: GameWorld,
    /// Registered verbs and keywords.
    pub verbs: VerbRegistry,
    /// Authored behavior overrides.
    pub effects: EffectTable,
    autos: Vec<AutoAction>,
    graphs: HashMap<String, OptionGraph>,
    graph_choices_taken: HashSet<(String, String, usize)>,
    scheduler: Scheduler,
    log: TurnLog,
    room: ItemId,
    inventory: ItemId,
    page: String,
    option_labels: Vec<String>,
    pending: Option<crate::flow::Prompt>,
    depth: u32,
    turn: u64,
}

impl Session {
    /// A fresh session with the standard verb library and default
    /// auto-actions installed. The player starts nowhere; call [`enter`]
    /// with a starting room before resolving commands.
    ///
    /// [`enter`]: Session::enter
    pub fn new() -> Self {
        let mut world = GameWorld::new();
        let inventory = world
            .create(
                ItemConfig::new("inventory")
                    .hidden()
                    .container(-1)
                    .contents_hidden_from_room(),
            )
            .expect("inventory config is static");
        let room = world.limbo();
        let mut sess = Self {
            world,
            verbs: VerbRegistry::new(),
            effects: EffectTable::new(),
            autos: Vec::new(),
            graphs: HashMap::new(),
            graph_choices_taken: HashSet::new(),
            scheduler: Scheduler::new(),
            log: TurnLog::new(TURN_LOG_CAP),
            room,
            inventory,
            page: String::new(),
            option_labels: Vec::new(),
            pending: None,
            depth: 0,
            turn: 0,
        };
        standard::install(&mut sess);
        sess
    }

    // -----------------------------------------------------------------------
    // Authoring surface
    // -----------------------------------------------------------------------

    /// Create an item and attach the standard verbs its capabilities call
    /// for (examine always; take/drop/put when holdable; open/close/unlock
    /// when doored; enter when it leads somewhere).
    pub fn add_item(&mut self, config: ItemConfig) -> EngineResult<ItemId> {
        let id = self.world.create(config)?;
        standard::attach_defaults(self, id);
        Ok(id)
    }

    /// Register a verb on an item, replacing any previous verb of the same
    /// name; this is how an item overrides a standard verb.
    pub fn add_verb(&mut self, item: ItemId, verb: Verb) {
        self.verbs.register_for(item, verb);
    }

    /// Register a global keyword verb.
    pub fn add_keyword(&mut self, verb: Verb) {
        self.verbs.register_keyword(verb);
    }

    /// Register a movement verb on a room: the direction word, its
    /// abbreviation, and "go <direction>" all relocate the player.
    pub fn add_exit(&mut self, room: ItemId, direction: &str, abbrev: &str, dest: ItemId) {
        let verb = Verb::new(direction)
            .with_alias(abbrev)
            .with_alias(format!("go {direction}"))
            .with_alias(format!("walk {direction}"))
            .remote()
            .movement()
            .with_success(ActionChain::of(Action::RelocatePlayer(Slot::Fixed(dest))));
        self.verbs.register_for(room, verb);
    }

    /// Register a behavior override for (item, other, verb); `other: None`
    /// is the wildcard form matching any partner.
    pub fn add_effect(
        &mut self,
        item: ItemId,
        other: Option<ItemId>,
        verb: impl Into<String>,
        effect: Effect,
    ) {
        self.effects.add(item, other, verb, effect);
    }

    /// Register an option graph after validating its node references.
    pub fn add_graph(&mut self, graph: OptionGraph) -> EngineResult<()> {
        graph.validate()?;
        if self.graphs.contains_key(&graph.name) {
            return Err(AuthoringError::DuplicateGraph(graph.name));
        }
        self.graphs.insert(graph.name.clone(), graph);
        Ok(())
    }

    /// Replace the registered auto-actions.
    pub fn set_auto_actions(&mut self, autos: Vec<AutoAction>) {
        self.autos = autos;
    }

    /// Register a scheduled event.
    pub fn schedule(&mut self, event: ScheduledEvent) {
        self.scheduler.add(event);
    }

    /// Cancel a scheduled event by name.
    pub fn cancel_event(&mut self, name: &str) -> bool {
        self.scheduler.cancel(name)
    }

    /// The scheduler, for inspecting event states.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // -----------------------------------------------------------------------
    // Player surface
    // -----------------------------------------------------------------------

    /// Resolve one typed command. Returns `Complete` with the overall
    /// success flag, or `Suspended` when the command needs a choice first;
    /// the options are then available from [`options`](Session::options) and
    /// resumed with [`choose`](Session::choose).
    ///
    /// Typing a fresh command while a prompt is open abandons the prompt.
    pub fn resolve(&mut self, input: &str) -> Resolution {
        if self.pending.take().is_some() {
            debug!("pending choice abandoned by new input");
            self.option_labels.clear();
        }
        self.page.clear();
        let flow = self.resolve_flow(input);
        self.finish(flow)
    }

    /// Select one of the pending options by index. Out-of-range indexes
    /// leave the prompt standing; calling with no prompt pending fails.
    pub fn choose(&mut self, index: usize) -> Resolution {
        let Some(mut prompt) = self.pending.take() else {
            return Resolution::Complete(false);
        };
        if index >= prompt.options.len() {
            self.pending = Some(prompt);
            return Resolution::Suspended;
        }
        self.option_labels.clear();
        self.page.clear();
        let option = prompt.options.swap_remove(index);
        let flow = (option.resume)(self);
        self.finish(flow)
    }

    /// The current page of narrative text.
    pub fn page(&self) -> &str {
        &self.page
    }

    /// Labels of the pending options, if a command is suspended.
    pub fn options(&self) -> &[String] {
        &self.option_labels
    }

    /// Whether a command is suspended waiting on a choice.
    pub fn suspended(&self) -> bool {
        self.pending.is_some()
    }

    /// Completed turn count.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Page history, one record per completed turn.
    pub fn log(&self) -> &TurnLog {
        &self.log
    }

    // -----------------------------------------------------------------------
    // Pipeline internals
    // -----------------------------------------------------------------------

    fn finish(&mut self, flow: Flow) -> Resolution {
        match flow {
            Flow::Done(result) => {
                self.end_turn();
                Resolution::Complete(result)
            }
            Flow::Awaiting(prompt) => {
                if !prompt.question.is_empty() {
                    self.say(prompt.question.clone());
                }
                self.option_labels = prompt.options.iter().map(|o| o.label.clone()).collect();
                self.pending = Some(prompt);
                Resolution::Suspended
            }
        }
    }

    /// Resolve an input string to a flow. Used recursively by auto-actions
    /// and scheduled events; the depth guard stops runaway synthesis.
    pub(crate) fn resolve_flow(&mut self, input: &str) -> Flow {
        if self.depth >= MAX_COMMAND_DEPTH {
            warn!(%input, "synthesized command depth exceeded");
            return Flow::Done(false);
        }
        self.depth += 1;
        let flow = resolver::resolve_input(self, input);
        self.depth -= 1;
        flow
    }

    /// Run the registered auto-actions for a verb attempt. A triggered
    /// auto-action's synthesized commands run through the full resolver; any
    /// failure (or attempted suspension — implicit actions must stay silent)
    /// aborts the outer command.
    pub(crate) fn run_auto_actions(&mut self, verb: &Verb, inv: &Invocation) -> bool {
        let autos = self.autos.clone();
        for auto in autos {
            if !(auto.condition)(self, verb, inv) {
                continue;
            }
            for input in (auto.inputs)(self, inv) {
                debug!(auto = %auto.name, %input, "running implicit command");
                match self.resolve_flow(&input) {
                    Flow::Done(true) => {}
                    Flow::Done(false) => return false,
                    Flow::Awaiting(_) => {
                        warn!(auto = %auto.name, "implicit command suspended; aborting");
                        return false;
                    }
                }
            }
        }
        true
    }

    fn end_turn(&mut self) {
        if self.depth > 0 {
            return;
        }
        self.turn += 1;
        let inputs = self.scheduler.advance(&self.world);
        for input in inputs {
            debug!(%input, "scheduled event command");
            if let Flow::Awaiting(_) = self.resolve_flow(&input) {
                warn!(%input, "scheduled command suspended; dropped");
            }
        }
        self.log.push(self.turn, self.page.clone());
    }

    // -----------------------------------------------------------------------
    // World access helpers
    // -----------------------------------------------------------------------

    /// Append a line to the current page.
    pub fn say(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if !self.page.is_empty() {
            self.page.push('\n');
        }
        self.page.push_str(&text);
    }

    /// Move the player to a room.
    pub fn enter(&mut self, room: ItemId) {
        self.room = room;
    }

    /// The player's current room.
    pub fn room(&self) -> ItemId {
        self.room
    }

    /// The player's inventory container.
    pub fn inventory_id(&self) -> ItemId {
        self.inventory
    }

    /// Whether the player is holding an item.
    pub fn held(&self, item: ItemId) -> bool {
        self.world.holds(self.inventory, item)
    }

    /// Everything nameable right now: the current room's reachable items
    /// merged with the inventory's, room matches first.
    pub(crate) fn accessible_map(&self) -> AccessMap {
        let mut map = self.world.accessible(self.room);
        for (phrase, ids) in self.world.accessible(self.inventory) {
            let entry = map.entry(phrase).or_default();
            for id in ids {
                if !entry.contains(&id) {
                    entry.push(id);
                }
            }
        }
        map
    }

    /// Narrate the current room: name, description, visible contents, exits.
    pub fn describe_room(&mut self) -> String {
        let room = self.room;
        let name = self.world.name_of(room).to_string();
        let (description, _) = self.world.produce_description(room);
        let mut out = format!("**{name}**\n{description}");

        let contents: Vec<String> = self
            .world
            .item(room)
            .map(|r| r.contents().to_vec())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.world.item(id))
            .filter(|item| item.visible())
            .map(|item| item.name().to_string())
            .collect();
        for name in contents {
            out.push_str(&format!("\nYou see {name} here."));
        }

        let exits = self.verbs.item_verb_names(room, |v| v.movement);
        if !exits.is_empty() {
            out.push_str(&format!("\nExits: {}", exits.join(", ")));
        }
        out
    }

    pub(crate) fn graph(&self, name: &str) -> Option<&OptionGraph> {
        self.graphs.get(name)
    }

    pub(crate) fn graph_choice_selected(&self, graph: &str, node: &str, index: usize) -> bool {
        self.graph_choices_taken
            .contains(&(graph.to_string(), node.to_string(), index))
    }

    pub(crate) fn mark_graph_choice(&mut self, graph: &str, node: &str, index: usize) {
        self.graph_choices_taken
            .insert((graph.to_string(), node.to_string(), index));
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
