//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shine_core::{LineItemId, Price, ProductId, VariantId};

use crate::shopify::{Product, ProductVariant};

/// Variant title Shopify gives single-variant products.
const DEFAULT_VARIANT_TITLE: &str = "Default Title";

/// One row in the cart, tied to exactly one product variant.
///
/// `quantity` is at least 1 for every line held by the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: LineItemId,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub title: String,
    /// `None` for the default variant of single-variant products.
    pub variant_title: Option<String>,
    pub price: Price,
    pub compare_at_price: Option<Price>,
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartLineItem {
    /// A new line at quantity 1.
    #[must_use]
    pub fn new(product: &Product, variant: &ProductVariant) -> Self {
        let variant_title = Some(variant.title.trim())
            .filter(|t| !t.is_empty() && *t != DEFAULT_VARIANT_TITLE)
            .map(str::to_owned);

        Self {
            id: LineItemId::generate(),
            product_id: product.id.clone(),
            variant_id: variant.id.clone(),
            title: product.title.clone(),
            variant_title,
            price: variant.price,
            compare_at_price: variant.compare_at_price,
            image_url: product.featured_image(),
            quantity: 1,
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price.times(self.quantity).amount
    }

    /// `(compare_at − price) × quantity` when discounted, else zero.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        self.compare_at_price
            .map(|compare_at| compare_at.amount - self.price.amount)
            .filter(|diff| *diff > Decimal::ZERO)
            .map_or(Decimal::ZERO, |diff| diff * Decimal::from(self.quantity))
    }
}
