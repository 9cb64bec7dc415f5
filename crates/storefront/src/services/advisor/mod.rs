//! The shine advisor: catalog-grounded product recommendations over chat.
//!
//! A turn runs:
//!
//! ```text
//! shopper text ─▶ system prompt (catalog) + history ─▶ ChatModel
//!                                                       │
//!        ResolvedRecommendation ◀─ matcher ◀─ extract ◀─┘
//! ```
//!
//! Each turn is a single request and response. Nothing here plans beyond
//! the current reply.

pub mod extract;
pub mod matcher;
pub mod prompt;

use std::future::Future;

use shine_core::MessageRole;
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::models::ChatMessage;
use crate::openai::{OpenAiError, WireMessage};
use crate::services::catalog::CatalogSnapshot;

pub use extract::{ParsedReply, clean_display_text, extract_recommendation, parse_reply};
pub use matcher::{find_match, match_all, resolve};
pub use prompt::{build_grounding_document, build_system_prompt, sanitize_description};

/// First message of every conversation.
pub const GREETING: &str = "Hey there! 👋 I'm here to help you find the right detailing products. What are you looking to clean or protect today?";

/// Shown in place of a reply when the model call fails.
pub const APOLOGY: &str =
    "I'm sorry, I encountered an error. Please try again or check your connection.";

/// A language model that answers a list of messages with text.
pub trait ChatModel: Send + Sync {
    /// Return the reply to the last message.
    fn complete(
        &self,
        messages: Vec<WireMessage>,
    ) -> impl Future<Output = Result<String, OpenAiError>> + Send;
}

/// A canned conversation starter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickQuestion {
    pub title: &'static str,
    pub prompt: &'static str,
}

/// Starters offered before the shopper has typed anything.
pub const QUICK_QUESTIONS: [QuickQuestion; 6] = [
    QuickQuestion {
        title: "First time detailer",
        prompt: "I'm new to car detailing and want to start taking better care of my car. What products should I start with?",
    },
    QuickQuestion {
        title: "Full exterior wash",
        prompt: "I want to do a complete exterior wash and protection for my car. What do I need?",
    },
    QuickQuestion {
        title: "Interior deep clean",
        prompt: "My car's interior is dirty and needs a deep clean. I have leather seats and plastic trim.",
    },
    QuickQuestion {
        title: "Ceramic coating",
        prompt: "I want to apply ceramic coating to my car for long-lasting protection. What products and prep do I need?",
    },
    QuickQuestion {
        title: "Wheel & tire care",
        prompt: "I want to clean my wheels and make my tires look new. What should I use?",
    },
    QuickQuestion {
        title: "Remove scratches",
        prompt: "My car has light scratches and swirl marks. How can I remove them and restore the paint?",
    },
];

/// One advisor conversation.
#[derive(Debug, Clone)]
pub struct AdvisorSession {
    messages: Vec<ChatMessage>,
}

impl Default for AdvisorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisorSession {
    /// A conversation holding only the greeting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::new(MessageRole::Assistant, GREETING)],
        }
    }

    /// Messages in order, greeting first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The most recent message.
    #[must_use]
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Whether the shopper has not said anything yet.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.messages.len() <= 1
    }

    /// Clear the conversation and greet again.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Send the shopper's message and append the reply.
    ///
    /// Blank input is ignored and returns `Ok(None)`. The reply's JSON block
    /// is stripped from its text and attached as a recommendation.
    ///
    /// # Errors
    ///
    /// Returns the model error after appending an apology message.
    #[instrument(skip(self, model, catalog, text), fields(products = catalog.products.len()))]
    pub async fn send<M: ChatModel>(
        &mut self,
        model: &M,
        catalog: &CatalogSnapshot,
        text: &str,
    ) -> Result<Option<&ChatMessage>, OpenAiError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let wire = self.wire_messages(catalog, text);
        self.messages.push(ChatMessage::new(MessageRole::User, text));
        add_breadcrumb("advisor", "Asked advisor", None);

        match model.complete(wire).await {
            Ok(reply) => {
                let parsed = parse_reply(&reply);
                if let Some(recommendation) = &parsed.recommendation {
                    tracing::info!(
                        products = recommendation.recommended_products.len(),
                        "Advisor recommended products"
                    );
                }
                self.messages.push(
                    ChatMessage::new(MessageRole::Assistant, parsed.display_text)
                        .with_recommendation(parsed.recommendation),
                );
                Ok(self.messages.last())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Advisor request failed");
                self.messages
                    .push(ChatMessage::new(MessageRole::Assistant, APOLOGY));
                Err(e)
            }
        }
    }

    /// System prompt, prior history, then the new message.
    fn wire_messages(&self, catalog: &CatalogSnapshot, text: &str) -> Vec<WireMessage> {
        let mut wire = Vec::with_capacity(self.messages.len() + 2);
        wire.push(WireMessage::system(build_system_prompt(&catalog.products)));
        wire.extend(self.messages.iter().map(|m| WireMessage {
            role: m.role,
            content: m.content.clone(),
        }));
        wire.push(WireMessage::user(text));
        wire
    }
}
