//! Advisor conversation and recommendation models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shine_core::{ChatMessageId, MessageRole, Priority};

use crate::shopify::Product;

/// One message in an advisor conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Structured recommendation found in an assistant reply.
    pub recommendation: Option<ProductRecommendation>,
}

impl ChatMessage {
    /// A new message stamped with the current time.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: ChatMessageId::generate(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            recommendation: None,
        }
    }

    /// Attach a recommendation.
    #[must_use]
    pub fn with_recommendation(mut self, recommendation: Option<ProductRecommendation>) -> Self {
        self.recommendation = recommendation;
        self
    }
}

/// Products the model recommended in one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecommendation {
    pub recommended_products: Vec<RecommendedProduct>,
    pub reasoning: Option<String>,
    pub customer_goal: Option<String>,
}

impl ProductRecommendation {
    /// Items ordered essential first; ties keep the model's order.
    #[must_use]
    pub fn sorted_by_priority(&self) -> Vec<RecommendedProduct> {
        let mut items = self.recommended_products.clone();
        items.sort_by_key(|item| item.priority);
        items
    }
}

/// A single recommended product as named by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedProduct {
    pub product_title: String,
    pub priority: Priority,
    pub reason: String,
}

/// A recommended item paired with the catalog product it resolved to.
///
/// Unmatched items are kept: the reason is still worth showing even when
/// there is nothing to add to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecommendation {
    pub item: RecommendedProduct,
    pub product: Option<Product>,
}

impl ResolvedRecommendation {
    /// Whether the item can be added to the cart.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.product.is_some()
    }
}
