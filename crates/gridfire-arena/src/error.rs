//! Error types for the arena layer.

/// Errors from arena generation and lookups.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// The requested grid is too small to carry the outer wall ring.
    #[error("arena dimension {0} is too small (minimum 3)")]
    InvalidDimension(usize),

    /// `connected_teleporter` was asked about a non-teleporter coordinate.
    /// This is a caller bug and must fail loudly, never echo the input back.
    #[error("no teleporter at ({0}, {1})")]
    NotATeleporter(i32, i32),

    /// An explicit layout violates a structural invariant.
    #[error("invalid arena layout: {0}")]
    InvalidLayout(String),
}
