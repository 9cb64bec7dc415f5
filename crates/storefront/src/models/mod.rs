//! Domain models for the storefront client.

mod cart;
mod chat;

pub use cart::CartLineItem;
pub use chat::{ChatMessage, ProductRecommendation, RecommendedProduct, ResolvedRecommendation};
