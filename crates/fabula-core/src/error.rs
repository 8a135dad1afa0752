/// Alias for `Result<T, AuthoringError>`.
pub type CoreResult<T> = Result<T, AuthoringError>;

/// Errors raised by misuse of the authoring API.
///
/// These indicate defects in a game definition, not player mistakes, and are
/// raised synchronously at the point of misuse so they surface during
/// development. Player-facing failures never travel through this type; they
/// are narrated into the page buffer with a `false` success flag.
#[derive(Debug, thiserror::Error)]
pub enum AuthoringError {
    /// An item with the same name already exists in this world.
    #[error("an item named \"{0}\" already exists")]
    DuplicateName(String),

    /// An item definition combines fields in a contradictory way.
    #[error("invalid item definition: {0}")]
    InvalidConfig(String),
}
