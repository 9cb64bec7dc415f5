//! Shine storefront client library.
//!
//! The client core behind the shine front ends: an in-memory product
//! catalog, a persisted cart, the customer session, and the shine advisor
//! that turns a shopper's request into catalog-grounded recommendations.
//!
//! Everything is an explicitly constructed container; [`state::AppState`]
//! wires one of each together for an application.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod openai;
pub mod services;
pub mod shopify;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support {
    use shine_core::{Price, ProductId, VariantId};

    use crate::shopify::{Product, ProductVariant};

    /// A single-variant product. The variant id is the product id with `01`
    /// appended.
    #[allow(clippy::unwrap_used)]
    pub fn product(id: &str, title: &str, price: &str, compare_at: Option<&str>) -> Product {
        Product {
            id: ProductId::new(format!("gid://shopify/Product/{id}")),
            title: title.to_owned(),
            description: String::new(),
            description_html: String::new(),
            vendor: "Shine".to_owned(),
            product_type: String::new(),
            tags: Vec::new(),
            variants: vec![ProductVariant {
                id: VariantId::new(format!("gid://shopify/ProductVariant/{id}01")),
                title: "Default Title".to_owned(),
                price: Price::parse(price, "USD").unwrap(),
                compare_at_price: compare_at.map(|c| Price::parse(c, "USD").unwrap()),
                sku: None,
                available_for_sale: true,
                quantity_available: None,
            }],
            images: Vec::new(),
        }
    }
}
