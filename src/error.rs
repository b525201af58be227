//! Error types for interlinking operations
//!
//! Lookups that find nothing are not errors here: operations return a
//! zero-effect outcome instead. What remains are collaborator failures,
//! invalid requests and invalid link state transitions.

use thiserror::Error;

use crate::links::LinkStatus;

/// Result type alias for interlinking operations
pub type InterlinkResult<T> = Result<T, InterlinkError>;

/// Error types for interlinking operations
#[derive(Debug, Error)]
pub enum InterlinkError {
    /// Link store (SQLite) failure
    #[error("Link store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Content repository failure
    #[error("Content repository error: {0}")]
    Repository(String),

    /// Requested status change is not allowed from the current status
    #[error("Cannot move link {id} from {from} to {to}")]
    InvalidTransition {
        id: i64,
        from: LinkStatus,
        to: LinkStatus,
    },

    /// Caller supplied a request that can never succeed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration could not be built or loaded
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Markup rewriting failed
    #[error("Markup rewrite failed: {0}")]
    Markup(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for InterlinkError {
    fn from(error: anyhow::Error) -> Self {
        // {:#} keeps the context chain
        InterlinkError::Other(format!("{error:#}"))
    }
}

impl InterlinkError {
    /// Wrap a content repository failure.
    pub fn repository(error: anyhow::Error) -> Self {
        InterlinkError::Repository(format!("{error:#}"))
    }

    /// Wrap a markup rewriting failure.
    pub fn markup(error: anyhow::Error) -> Self {
        InterlinkError::Markup(format!("{error:#}"))
    }

    /// Collaborator could not be reached at all; batch runs abort on these.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        match self {
            InterlinkError::Store(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            InterlinkError::Io(_) => true,
            _ => false,
        }
    }

    /// Check if error is transient and the operation may be retried
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            InterlinkError::Store(sqlx::Error::Database(db)) => {
                // SQLITE_BUSY / SQLITE_LOCKED
                matches!(db.code().as_deref(), Some("5") | Some("6"))
            }
            _ => self.is_connectivity(),
        }
    }
}

/// Log a top-level operation with its duration and outcome
#[macro_export]
macro_rules! log_operation {
    ($name:expr, $content:expr, $op:expr) => {{
        let start = std::time::Instant::now();
        let result = $op;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::debug!(
                    operation = $name,
                    content = %$content,
                    duration_ms = duration.as_millis(),
                    "Interlink operation completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    operation = $name,
                    content = %$content,
                    duration_ms = duration.as_millis(),
                    error = %e,
                    "Interlink operation failed"
                );
            }
        }

        result
    }};
}
