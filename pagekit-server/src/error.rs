//! Domain error taxonomy
//!
//! Every operation in this crate fails with [`Error`]. Its [`ErrorKind`] is a
//! closed set; the HTTP layer maps kinds (never variants) to responses.

use std::time::Duration;

use thiserror::Error;

use crate::decode::DecodeError;
use crate::models::ValidationError;

pub type Result<T> = std::result::Result<T, Error>;

/// Closed classification of every failure the crate can surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Entity does not exist (or vanished under a concurrent delete)
    NotFound,
    /// Unique-key collision
    Conflict,
    /// Malformed or missing input
    Validation,
    /// A consistency rule would be broken by the request
    InvariantViolation,
    /// Timeout or connectivity failure; the same request may succeed later
    Transient,
    /// Everything else
    Internal,
}

impl ErrorKind {
    /// Caller-correctable kinds are not server faults.
    pub fn is_server_fault(self) -> bool {
        matches!(self, Self::Transient | Self::Internal)
    }
}

/// Consistency rules enforced by the invariant engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    /// A home page must be un-homed before it can be deleted
    HomePageDelete,
    /// Reorder id list must be exactly the page's widget set
    ReorderSetMismatch,
}

impl Invariant {
    pub fn message(self) -> &'static str {
        match self {
            Self::HomePageDelete => "cannot delete home page",
            Self::ReorderSetMismatch => "some widgets do not belong to this page",
        }
    }
}

/// Main error type for pagekit-server operations
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{resource} not found")]
    NotFound { resource: &'static str, id: String },

    /// Unique-key collision; message names the violated rule
    #[error("{rule}")]
    Conflict { rule: String },

    #[error("{}", .0.message())]
    Invariant(Invariant),

    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),

    /// `statement_timeout` fired inside Postgres
    #[error("storage statement timed out: {0}")]
    StatementTimeout(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) | Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Invariant(_) => ErrorKind::InvariantViolation,
            Self::Timeout(_) | Self::StatementTimeout(_) | Self::Unavailable(_) => {
                ErrorKind::Transient
            }
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn conflict(rule: impl Into<String>) -> Self {
        Self::Conflict { rule: rule.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
