//! Error types for the command pipeline.

/// Alias for `Result<T, AuthoringError>`.
pub type EngineResult<T> = Result<T, AuthoringError>;

/// Errors raised by misuse of the engine's authoring API.
///
/// Like the core's authoring errors, these indicate game-definition defects
/// and are raised at registration time. Player mistakes never surface here.
#[derive(Debug, thiserror::Error)]
pub enum AuthoringError {
    /// A world-model authoring error.
    #[error(transparent)]
    Core(#[from] fabula_core::AuthoringError),

    /// An option graph references a node that does not exist.
    #[error("option graph \"{graph}\" references unknown node \"{node}\"")]
    UnknownOptionNode {
        /// The graph containing the dangling reference.
        graph: String,
        /// The missing node id.
        node: String,
    },

    /// An option graph with this name is already registered.
    #[error("an option graph named \"{0}\" already exists")]
    DuplicateGraph(String),
}
