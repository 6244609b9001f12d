//! Error types for the persistence hook.

/// Errors a [`PlayerStore`](crate::PlayerStore) can report.
///
/// These never reach the client. The server logs them and carries on
/// with the in-memory record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store can't be reached right now.
    #[error("player store unavailable: {0}")]
    Unavailable(String),

    /// The backing store rejected or failed the operation.
    #[error("player store error: {0}")]
    Backend(String),
}
