//! The error type shared by the ledger, recorder and catalog.

/// Everything a core operation can fail with.
///
/// Each variant maps to a distinct caller-visible outcome; nothing is retried
/// or swallowed inside the core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input, e.g. an empty name or a non-positive amount.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The referenced budget, transaction, category or subscription does not
    /// exist (or has been soft-deleted where that matters).
    #[error("{0} not found")]
    NotFound(String),

    /// A transaction was attempted against a budget that is not active.
    #[error("budget {0} is not active")]
    BudgetNotActive(i64),

    /// Activation was requested for a budget that is already active.
    #[error("budget {0} is already active")]
    AlreadyActive(i64),

    /// Deactivation was requested for a budget that is already inactive.
    #[error("budget {0} is already inactive")]
    AlreadyInactive(i64),

    /// The storage layer failed: connection, constraint violation, or a
    /// stored value that could not be decoded.
    #[error("storage error: {0}")]
    Persistence(#[source] rusqlite::Error),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{what} {id}"))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        tracing::error!(%error, "storage operation failed");
        Self::Persistence(error)
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;
