use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::mutation::MutationKind;

/// Failure reported by the transport: an HTTP-like status plus the server's detail message.
///
/// A status of `0` means the request never produced a usable response
/// (connection error, timeout, undecodable body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("request failed ({status}): {detail}")]
pub struct ErrorInfo {
    pub status: u16,
    pub detail: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl ErrorInfo {
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
            title: None,
        }
    }

    pub fn connection(detail: impl Display) -> Self {
        Self::new(0, detail.to_string())
    }

    pub fn decode(detail: impl Display) -> Self {
        Self::new(0, format!("unexpected response body: {}", detail))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Problem document returned by the server on error responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemDetail {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Network or server failure
    #[error(transparent)]
    Transport(#[from] ErrorInfo),

    /// The operation was attempted without what it needs (e.g. no selected comment)
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Single-flight collision
    #[error("{kind} already pending for {id}")]
    ConcurrentMutationRejected { id: u64, kind: MutationKind },

    /// Rejected input, checked before the core is involved
    #[error("invalid input: {0}")]
    Validation(String),
}

impl CoreError {
    pub fn precondition(message: impl Display) -> Self {
        CoreError::Precondition(message.to_string())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::Transport(info) => Some(info.status),
            _ => None,
        }
    }
}

/// Human readable summary of a failed status, mirroring the toast titles the web client shows.
pub struct StatusSummary(pub u16);

impl Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let summary = match self.0 {
            400 => "Invalid Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            500 => "Server Error",
            503 => "Service Unavailable",
            0 => "Connection Error",
            _ => "Error",
        };
        write!(f, "{}", summary)
    }
}
