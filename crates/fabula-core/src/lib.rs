//! Core world model for Fabula.
//!
//! An interactive-fiction world is an arena of items — rooms, props, doors,
//! carried things — linked by containment ids and indexed by a grow-only
//! vocabulary of names and aliases. This crate owns that model: item
//! definitions and their validation, the ownership graph with its
//! accessibility rules, text production strategies, and the change-tracking
//! snapshot contract. The command pipeline that drives it lives in
//! `fabula-engine`.

/// Authoring errors.
pub mod error;
/// Items and their typed construction.
pub mod item;
/// Change-tracking snapshots.
pub mod snapshot;
/// Text production strategies.
pub mod text;
/// The vocabulary registry.
pub mod vocab;
/// The world graph.
pub mod world;

pub use error::{AuthoringError, CoreResult};
pub use item::{DoorConfig, DoorState, Item, ItemConfig, ItemId, PropertyValue};
pub use snapshot::{ItemSnapshot, WorldSnapshot};
pub use text::TextSource;
pub use vocab::{STOPWORDS, Vocabulary, derive_aliases};
pub use world::{AccessMap, GameWorld};
