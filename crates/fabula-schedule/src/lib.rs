//! Turn-based timed events.
//!
//! The engine is single-threaded and turn-gated: nothing here fires on its
//! own. Once per turn-end the session asks the scheduler to advance, and any
//! event whose moment has come yields the command input it wants executed.
//! Feeding that input through the resolver is the caller's job, which keeps
//! scheduled behavior on exactly the same path as typed commands.

use std::fmt;
use std::rc::Rc;

use fabula_core::GameWorld;
use tracing::debug;

/// A condition over world state that arms a dormant event.
pub type Trigger = Rc<dyn Fn(&GameWorld) -> bool>;

/// Lifecycle of a scheduled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventState {
    /// Waiting for its condition to hold.
    Dormant,
    /// Counting down turns.
    Pending {
        /// Turns left before the event fires.
        turns_left: u64,
    },
    /// Fired; terminal.
    Triggered,
    /// Cancelled before firing; terminal.
    Cancelled,
}

/// A command to run at a future turn, either when a condition first holds or
/// after a fixed countdown. Fires exactly once.
#[derive(Clone)]
pub struct ScheduledEvent {
    /// Name used for cancellation and logging.
    pub name: String,
    state: EventState,
    trigger: Option<Trigger>,
    input: String,
}

impl ScheduledEvent {
    /// An event that fires the first turn `trigger` holds.
    pub fn when(
        name: impl Into<String>,
        input: impl Into<String>,
        trigger: impl Fn(&GameWorld) -> bool + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            state: EventState::Dormant,
            trigger: Some(Rc::new(trigger)),
            input: input.into(),
        }
    }

    /// An event that fires after `turns` turn-ends.
    pub fn after(name: impl Into<String>, input: impl Into<String>, turns: u64) -> Self {
        Self {
            name: name.into(),
            state: EventState::Pending { turns_left: turns },
            trigger: None,
            input: input.into(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &EventState {
        &self.state
    }

    /// The command input this event synthesizes when it fires.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Debug for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledEvent")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

/// Owns scheduled events and advances them once per turn-end.
#[derive(Debug, Default)]
pub struct Scheduler {
    events: Vec<ScheduledEvent>,
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event.
    pub fn add(&mut self, event: ScheduledEvent) {
        self.events.push(event);
    }

    /// Cancel a named event. Terminal: a cancelled event never fires, and
    /// any countdown is discarded. Returns false if no cancellable event by
    /// that name exists.
    pub fn cancel(&mut self, name: &str) -> bool {
        let mut cancelled = false;
        for event in &mut self.events {
            if event.name == name
                && matches!(event.state, EventState::Dormant | EventState::Pending { .. })
            {
                event.state = EventState::Cancelled;
                event.trigger = None;
                cancelled = true;
            }
        }
        cancelled
    }

    /// The state of a named event, if registered.
    pub fn state_of(&self, name: &str) -> Option<&EventState> {
        self.events.iter().find(|e| e.name == name).map(|e| &e.state)
    }

    /// Advance one turn: a dormant event whose condition now holds, or a
    /// pending event whose countdown reaches zero, transitions to Triggered
    /// and yields its input, exactly once.
    pub fn advance(&mut self, world: &GameWorld) -> Vec<String> {
        let mut inputs = Vec::new();
        for event in &mut self.events {
            match &mut event.state {
                EventState::Dormant => {
                    let armed = event.trigger.as_ref().is_some_and(|t| t(world));
                    if armed {
                        debug!(event = %event.name, "dormant event triggered");
                        event.state = EventState::Triggered;
                        inputs.push(event.input.clone());
                    }
                }
                EventState::Pending { turns_left } => {
                    *turns_left = turns_left.saturating_sub(1);
                    if *turns_left == 0 {
                        debug!(event = %event.name, "countdown event triggered");
                        event.state = EventState::Triggered;
                        inputs.push(event.input.clone());
                    }
                }
                EventState::Triggered | EventState::Cancelled => {}
            }
        }
        inputs
    }
}

/// One record of what a turn printed.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    /// The turn number.
    pub turn: u64,
    /// The page text the turn produced.
    pub text: String,
}

/// A capped log of turn output, oldest entries dropped first.
#[derive(Debug, Default)]
pub struct TurnLog {
    records: Vec<TurnRecord>,
    max_records: usize,
}

impl TurnLog {
    /// Create a log keeping at most `max_records` entries (0 = unlimited).
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Vec::new(),
            max_records,
        }
    }

    /// Append a record, trimming the oldest past capacity.
    pub fn push(&mut self, turn: u64, text: impl Into<String>) {
        self.records.push(TurnRecord {
            turn,
            text: text.into(),
        });
        if self.max_records > 0 && self.records.len() > self.max_records {
            let drain = self.records.len() - self.max_records;
            self.records.drain(..drain);
        }
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }

    /// Number of records kept.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_core::ItemConfig;

    #[test]
    fn countdown_fires_once_at_zero() {
        let world = GameWorld::new();
        let mut scheduler = Scheduler::new();
        scheduler.add(ScheduledEvent::after("rumble", "wait", 2));

        assert!(scheduler.advance(&world).is_empty());
        assert_eq!(scheduler.advance(&world), vec!["wait".to_string()]);
        assert!(scheduler.advance(&world).is_empty());
        assert_eq!(scheduler.state_of("rumble"), Some(&EventState::Triggered));
    }

    #[test]
    fn dormant_fires_when_condition_holds() {
        let mut world = GameWorld::new();
        let bell = world.create(ItemConfig::new("bell")).unwrap();
        let mut scheduler = Scheduler::new();
        scheduler.add(ScheduledEvent::when("toll", "look", move |w: &GameWorld| {
            !w.item(bell).unwrap().visible()
        }));

        assert!(scheduler.advance(&world).is_empty());
        world.item_mut(bell).unwrap().set_visible(false);
        assert_eq!(scheduler.advance(&world), vec!["look".to_string()]);
        assert!(scheduler.advance(&world).is_empty());
    }

    #[test]
    fn cancel_is_terminal() {
        let world = GameWorld::new();
        let mut scheduler = Scheduler::new();
        scheduler.add(ScheduledEvent::after("doom", "wait", 1));

        assert!(scheduler.cancel("doom"));
        assert_eq!(scheduler.state_of("doom"), Some(&EventState::Cancelled));
        assert!(scheduler.advance(&world).is_empty());
        // Already-cancelled events cannot be cancelled again
        assert!(!scheduler.cancel("doom"));
    }

    #[test]
    fn cancel_unknown_name_is_false() {
        let mut scheduler = Scheduler::new();
        assert!(!scheduler.cancel("nothing"));
    }

    #[test]
    fn turn_log_caps_entries() {
        let mut log = TurnLog::new(2);
        log.push(1, "first");
        log.push(2, "second");
        log.push(3, "third");
        assert_eq!(log.len(), 2);
        assert_eq!(log.records()[0].turn, 2);
        assert_eq!(log.records()[1].turn, 3);
    }

    #[test]
    fn turn_log_unlimited_when_zero() {
        let mut log = TurnLog::new(0);
        for turn in 0..100 {
            log.push(turn, "tick");
        }
        assert_eq!(log.len(), 100);
    }
}
