//! Subcommand implementations.
//!
//! Each command prints its result to stdout; diagnostics go through
//! `tracing` to stderr.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod orders;

use thiserror::Error;

use medicart_client::ClientError;
use medicart_client::api::ApiError;
use medicart_client::checkout::CheckoutError;
use medicart_core::EmailError;

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Login or registration was refused; the message is user-facing.
    #[error("{0}")]
    Auth(String),
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        Self::Client(err.into())
    }
}

impl From<CheckoutError> for CliError {
    fn from(err: CheckoutError) -> Self {
        Self::Client(err.into())
    }
}

impl CliError {
    /// Log the error, reporting unexpected failures to Sentry.
    pub fn report(&self) {
        match self {
            Self::Client(err) => err.report(),
            Self::InvalidEmail(_) | Self::Auth(_) => {
                tracing::warn!(error = %self, "Command failed");
            }
        }
    }
}

/// Result type alias for `CliError`.
pub type Result<T> = std::result::Result<T, CliError>;
