//! Unified error handling with Sentry integration.
//!
//! Each subsystem has its own error enum; [`ClientError`] wraps them so a
//! front-end can hold a single `Result<T, ClientError>`.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Error type for the client library.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local store could not be opened or written.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Remote API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout precondition or submission failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// A command needs a logged-in user.
    #[error("Not logged in")]
    NotLoggedIn,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ClientError {
    /// Whether the error is the user's doing (bad input, missing login)
    /// rather than something worth reporting.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::NotLoggedIn | Self::NotFound(_) | Self::Config(_) => true,
            Self::Checkout(err) => !matches!(err, CheckoutError::Api(_)),
            Self::Api(err) => err.status().is_some_and(|s| s.is_client_error()),
            Self::Store(_) => false,
        }
    }

    /// Log the error, sending it to Sentry unless it is a user error.
    pub fn report(&self) {
        if self.is_user_error() {
            tracing::warn!(error = %self, "Command failed");
        } else {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command failed"
            );
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Set the Sentry user context.
///
/// Call this after a successful login to associate errors with the user.
pub fn set_sentry_user(user_id: Option<&impl ToString>, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: user_id.map(ToString::to_string),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("medicine_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
