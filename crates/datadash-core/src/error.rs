//! Error types shared by the query pipeline and the control generators.

use thiserror::Error;

/// Errors raised by the core query pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A query referenced a field that the schema does not declare.
    #[error("invalid field: '{field}' is not declared in the schema")]
    InvalidField {
        /// The offending field name.
        field: String,
    },

    /// A caller broke the contract of a pure function (e.g. an unclamped page number).
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub fn invalid_field(field: impl Into<String>) -> Self {
        Error::InvalidField {
            field: field.into(),
        }
    }
}

/// Failures reported by a backing store. Never retried by the core.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A statement or lookup failed inside the store.
    #[error("store query failed: {0}")]
    Query(String),

    /// The write conflicts with existing data (e.g. duplicate identity).
    #[error("store conflict: {0}")]
    Conflict(String),

    /// A lock guarding in-process storage was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
