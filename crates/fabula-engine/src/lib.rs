//! Command resolution pipeline for Fabula.
//!
//! Free text in, narrated outcome out. The resolver tokenizes player input,
//! matches the longest verb and item phrases against whatever the world
//! graph says is reachable, narrows ambiguous references (asking the player
//! when it must), inserts implicit prerequisite commands, and attempts the
//! verb — whose tests, effects, and action chains decide what actually
//! happens. Suspension is an explicit value: a command either completes
//! with a success flag or parks a continuation behind a set of options.

/// Action chains.
pub mod action;
/// Auto-actions: implicit prerequisite commands.
pub mod auto;
mod debug;
mod disambiguate;
/// The effect table.
pub mod effect;
/// Error types for the command pipeline.
pub mod error;
/// Explicit suspension: flows, prompts, continuations.
pub mod flow;
/// Option graphs (conversations).
pub mod options;
mod resolver;
/// The game session.
pub mod session;
mod standard;
/// Verbs and the verb registry.
pub mod verb;

pub use action::{Action, ActionChain, Slot};
pub use auto::AutoAction;
pub use effect::{Effect, EffectTable};
pub use error::{AuthoringError, EngineResult};
pub use flow::Resolution;
pub use options::{GraphChoice, OptionGraph, OptionNode};
pub use session::Session;
pub use verb::{Invocation, Verb, VerbRegistry};
