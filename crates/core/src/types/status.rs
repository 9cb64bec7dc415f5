//! Status and classification enums shared across components.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Chat message role.
///
/// Serialized in lowercase, matching the chat completion wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendation priority tier attached to a recommended product.
///
/// `1` is essential, `2` recommended, anything from `3` up optional. The model
/// may emit any integer, so the raw value is preserved and only the label is
/// bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(i64);

impl Priority {
    /// Must-have for the shopper's goal.
    pub const ESSENTIAL: Self = Self(1);
    /// Recommended addition.
    pub const RECOMMENDED: Self = Self(2);
    /// Nice-to-have.
    pub const OPTIONAL: Self = Self(3);

    /// Wrap a raw priority value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw value as sent by the model.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Human-readable tier label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self.0 {
            1 => "Essential",
            2 => "Recommended",
            _ => "Optional",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::ESSENTIAL
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Customer authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    SignedOut,
    Authenticating,
    SignedIn,
}

impl AuthState {
    /// Whether a customer is currently signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_labels() {
        assert_eq!(Priority::ESSENTIAL.label(), "Essential");
        assert_eq!(Priority::RECOMMENDED.label(), "Recommended");
        assert_eq!(Priority::OPTIONAL.label(), "Optional");
        assert_eq!(Priority::new(7).label(), "Optional");
    }

    #[test]
    fn test_priority_default_is_essential() {
        assert_eq!(Priority::default(), Priority::ESSENTIAL);
    }

    #[test]
    fn test_priority_orders_by_value() {
        assert!(Priority::ESSENTIAL < Priority::OPTIONAL);
    }

    #[test]
    fn test_message_role_serializes_lowercase() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_auth_state_default_signed_out() {
        assert!(!AuthState::default().is_signed_in());
        assert!(AuthState::SignedIn.is_signed_in());
    }
}
