//! Error types for the MediCart API client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when calling the MediCart API.
///
/// The variants separate "the server answered and said no" ([`Rejected`])
/// from "the request never completed" ([`Transport`]); callers pick their
/// fallback behaviour from that distinction.
///
/// [`Rejected`]: ApiError::Rejected
/// [`Transport`]: ApiError::Transport
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server rejected request ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Rejected {
        /// HTTP status returned by the server.
        status: StatusCode,
        /// Message taken from the error body's `detail` field, if any.
        message: Option<String>,
    },

    /// The server answered with success but the body was not what we expected.
    #[error("parse error: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status for rejected requests.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided message for rejected requests.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the server was reached and refused the request.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Error body returned by the API: `{"detail": ...}`.
///
/// `detail` is usually a string, but validation failures carry a list of
/// `{loc, msg, type}` objects.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    /// Error detail payload.
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Flatten `detail` into a human-readable message.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            other => Some(other.to_string()),
        }
    }
}

/// Extract the `detail` message from a raw error body, if it has one.
#[must_use]
pub fn detail_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message())
}
