//! Completion status for RPC calls.
//!
//! Every handler outcome is reported as a [`Status`]: `Ok` for success or
//! `Failure` with a human-readable reason. Statuses are plain values built
//! where they are needed.

use std::fmt;

use crate::error::PvRpcError;

/// Outcome of an RPC lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    Failure { reason: String },
}

impl Status {
    #[inline]
    pub fn ok() -> Self {
        Status::Ok
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Status::Failure {
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    /// Failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Status::Ok => None,
            Status::Failure { reason } => Some(reason),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => f.write_str("OK"),
            Status::Failure { reason } => write!(f, "FAILURE: {}", reason),
        }
    }
}

impl From<&PvRpcError> for Status {
    fn from(err: &PvRpcError) -> Self {
        Status::failure(err.to_string())
    }
}
