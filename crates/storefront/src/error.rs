//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for page actions. Server-side failures
//! are captured to Sentry before being shown to the shopper.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Client-side token storage failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The checkout workflow stopped.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl AppError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Checkout(err) => err.user_message(),
            Self::Config(err) => err.to_string(),
            Self::Session(err) => err.to_string(),
        }
    }

    /// The session was rejected and the logout redirect already happened, so
    /// there is nothing further to show.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::Unauthorized)
                | Self::Checkout(CheckoutError::StepFailed {
                    source: ApiError::Unauthorized,
                    ..
                })
        )
    }

    /// Whether this error should reach Sentry.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_server_error(),
            Self::Checkout(CheckoutError::StepFailed { source, .. }) => {
                !matches!(source, ApiError::Unauthorized)
            }
            Self::Session(_) => true,
            Self::Checkout(_) | Self::Config(_) => false,
        }
    }

    /// Capture server-side failures to Sentry and log them.
    ///
    /// Returns `true` when the error was captured.
    pub fn report(&self) -> bool {
        if !self.is_reportable() {
            tracing::debug!(error = %self, "Action failed");
            return false;
        }

        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Action failed"
        );
        true
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
