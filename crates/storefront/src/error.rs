//! Unified error handling with Sentry integration.
//!
//! Every boundary has its own error enum; `AppError` rolls them up for the
//! front end, sorts them into a small set of [`ErrorKind`]s and produces a
//! message that is safe to show to the shopper.
//!
//! A reply without a structured recommendation is not an error and never
//! reaches this module: the extractor returns `None`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::openai::OpenAiError;
use crate::services::cart::CartError;
use crate::services::session::SessionError;
use crate::shopify::ShopifyError;
use crate::storage::StorageError;

/// How a failure is recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport or HTTP failure. Prior state is kept and a transient
    /// message is shown.
    NetworkFailure,
    /// Credentials or token were rejected. The session is signed out.
    AuthRejected,
    /// The caller broke a precondition (e.g., a variant-less product).
    PreconditionViolation,
    /// Device storage failed.
    Storage,
}

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Chat model request failed.
    #[error("OpenAI error: {0}")]
    OpenAi(#[from] OpenAiError),

    /// Device storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart precondition failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Sign-in, sign-up or recovery failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl AppError {
    /// Classify the error by how it is recovered from.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Shopify(ShopifyError::Unauthorized(_))
            | Self::OpenAi(OpenAiError::Unauthorized(_) | OpenAiError::InvalidKey(_)) => {
                ErrorKind::AuthRejected
            }
            Self::Shopify(_) | Self::OpenAi(_) => ErrorKind::NetworkFailure,
            Self::Session(err) => match err {
                SessionError::Network(_) => ErrorKind::NetworkFailure,
                SessionError::InvalidEmail(_) => ErrorKind::PreconditionViolation,
                SessionError::Rejected(_) | SessionError::SignedOut => ErrorKind::AuthRejected,
            },
            Self::Storage(_) => ErrorKind::Storage,
            Self::Cart(_) | Self::Config(_) => ErrorKind::PreconditionViolation,
        }
    }

    /// Message safe to show the shopper.
    ///
    /// Field-level messages from Shopify are passed through verbatim;
    /// internal details are not.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Session(SessionError::Rejected(message)) => message.clone(),
            Self::Session(SessionError::InvalidEmail(_)) => {
                "Please enter a valid email address.".to_owned()
            }
            Self::Session(SessionError::SignedOut) => "Please sign in to continue.".to_owned(),
            Self::Cart(CartError::EmptyCart) => "Your cart is empty.".to_owned(),
            Self::Cart(_) => "That item can't be added to your cart.".to_owned(),
            Self::OpenAi(_) => {
                "I'm sorry, I encountered an error. Please try again or check your connection."
                    .to_owned()
            }
            Self::Config(err) => err.to_string(),
            Self::Storage(_) => {
                "Couldn't save your changes on this device.".to_owned()
            }
            Self::Shopify(ShopifyError::RateLimited(secs)) => {
                format!("The store is busy. Please try again in {secs} seconds.")
            }
            Self::Shopify(ShopifyError::Unauthorized(_)) => {
                "Your session has expired. Please sign in again.".to_owned()
            }
            Self::Shopify(_) | Self::Session(SessionError::Network(_)) => {
                "Network error. Please check your connection and try again.".to_owned()
            }
        }
    }

    /// Log the error and capture it to Sentry when it is worth reporting.
    ///
    /// Network and storage failures are captured; expected outcomes such as
    /// rejected credentials are only logged.
    pub fn report(&self) {
        match self.kind() {
            ErrorKind::NetworkFailure | ErrorKind::Storage => {
                let event_id = sentry::capture_error(self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Operation failed"
                );
            }
            ErrorKind::AuthRejected | ErrorKind::PreconditionViolation => {
                tracing::warn!(error = %self, "Operation rejected");
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after a successful sign-in to associate errors with the
/// customer.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the customer.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_owned(),
                serde_json::Value::String((*value).to_owned()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(CartError::EmptyCart);
        assert_eq!(err.to_string(), "Cart error: cart is empty");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            AppError::from(ShopifyError::RateLimited(5)).kind(),
            ErrorKind::NetworkFailure
        );
        assert_eq!(
            AppError::from(ShopifyError::Unauthorized("expired".to_owned())).kind(),
            ErrorKind::AuthRejected
        );
        assert_eq!(
            AppError::from(SessionError::Rejected("Unidentified customer".to_owned())).kind(),
            ErrorKind::AuthRejected
        );
        assert_eq!(
            AppError::from(CartError::EmptyCart).kind(),
            ErrorKind::PreconditionViolation
        );
        assert_eq!(
            AppError::from(OpenAiError::EmptyReply).kind(),
            ErrorKind::NetworkFailure
        );
    }

    #[test]
    fn test_user_messages_hide_internals() {
        let err = AppError::from(ShopifyError::Status {
            status: 500,
            body: "stack trace here".to_owned(),
        });
        assert!(!err.user_message().contains("stack trace"));

        let err = AppError::from(SessionError::Rejected(
            "Email has already been taken".to_owned(),
        ));
        assert_eq!(err.user_message(), "Email has already been taken");
    }
}
