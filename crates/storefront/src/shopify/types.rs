//! Domain types for the Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw wire
//! shapes in `storefront::conversions`. Money is parsed into [`Price`] once
//! at the boundary.

use serde::{Deserialize, Serialize};
use shine_core::{ImageId, Price, ProductId, VariantId};

// =============================================================================
// Money Types
// =============================================================================

/// Monetary amount as Shopify sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Parse into a typed [`Price`].
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the amount or currency is not understood.
    pub fn to_price(&self) -> Result<Price, shine_core::PriceError> {
        Price::parse(&self.amount, &self.currency_code)
    }
}

// =============================================================================
// Image Types
// =============================================================================

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Shopify image ID.
    pub id: Option<ImageId>,
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID (used for cart lines and checkout).
    pub id: VariantId,
    /// Variant title (e.g., "16 oz"). Single-variant products use "Default Title".
    pub title: String,
    /// Current price.
    pub price: Price,
    /// Original price if on sale.
    pub compare_at_price: Option<Price>,
    /// Stock keeping unit.
    pub sku: Option<String>,
    /// Whether the variant can be purchased.
    pub available_for_sale: bool,
    /// Units in stock, when the store exposes inventory.
    pub quantity_available: Option<i64>,
}

/// A catalog product.
///
/// Immutable once fetched; a catalog refresh replaces products wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Shopify product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Plain-text description.
    pub description: String,
    /// HTML description.
    pub description_html: String,
    /// Vendor/brand name.
    pub vendor: String,
    /// Product type (e.g., "Wax").
    pub product_type: String,
    /// Product tags.
    pub tags: Vec<String>,
    /// Variants, in store order. The first one is the default.
    pub variants: Vec<ProductVariant>,
    /// Images, in store order.
    pub images: Vec<Image>,
}

impl Product {
    /// The variant used when none is chosen explicitly.
    #[must_use]
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    /// Find a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// Price of the default variant.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        self.default_variant().map(|v| v.price)
    }

    /// Compare-at price of the default variant.
    #[must_use]
    pub fn compare_at_price(&self) -> Option<Price> {
        self.default_variant().and_then(|v| v.compare_at_price)
    }

    /// Whether the default variant is discounted.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        match (self.compare_at_price(), self.price()) {
            (Some(compare_at), Some(price)) => compare_at.amount > price.amount,
            _ => false,
        }
    }

    /// URL of the first image, with protocol-relative URLs made absolute.
    #[must_use]
    pub fn featured_image(&self) -> Option<String> {
        self.images.first().map(|image| {
            image
                .url
                .strip_prefix("//")
                .map_or_else(|| image.url.clone(), |rest| format!("https://{rest}"))
        })
    }

    /// Case-insensitive check of tags and product type against keywords.
    #[must_use]
    pub fn matches_any_keyword(&self, keywords: &[&str]) -> bool {
        let product_type = self.product_type.to_lowercase();
        std::iter::once(product_type.as_str())
            .chain(self.tags.iter().map(String::as_str))
            .map(str::to_lowercase)
            .any(|value| keywords.iter().any(|k| value.contains(k)))
    }
}

// =============================================================================
// Pagination Types
// =============================================================================

/// Pagination information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Cursor to pass as `after` for the next page.
    pub end_cursor: Option<String>,
}

/// One page of products.
#[derive(Debug, Clone, Default)]
pub struct ProductConnection {
    /// Products on this page.
    pub products: Vec<Product>,
    /// Pagination info.
    pub page_info: PageInfo,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::product;

    #[test]
    fn test_sale_detection() {
        let on_sale = product("p1", "Premium Car Wax", "24.99", Some("29.99"));
        assert!(on_sale.is_on_sale());

        let full_price = product("p2", "Wheel Cleaner", "19.99", None);
        assert!(!full_price.is_on_sale());

        let odd = product("p3", "Clay Bar", "19.99", Some("15.00"));
        assert!(!odd.is_on_sale());
    }

    #[test]
    fn test_featured_image_normalizes_protocol_relative_url() {
        let mut p = product("p1", "Premium Car Wax", "24.99", None);
        p.images.push(Image {
            id: None,
            url: "//cdn.shopify.com/s/files/wax.png".to_owned(),
            alt_text: None,
        });
        assert_eq!(
            p.featured_image().as_deref(),
            Some("https://cdn.shopify.com/s/files/wax.png")
        );
    }

    #[test]
    fn test_featured_image_absent() {
        let p = product("p1", "Premium Car Wax", "24.99", None);
        assert!(p.featured_image().is_none());
    }

    #[test]
    fn test_keyword_matching_uses_tags_and_type() {
        let mut p = product("p1", "Premium Car Wax", "24.99", None);
        p.tags = vec!["Best Seller".to_owned()];
        p.product_type = "Doorbuster Deals".to_owned();

        assert!(p.matches_any_keyword(&["bestseller", "best seller"]));
        assert!(p.matches_any_keyword(&["doorbuster"]));
        assert!(!p.matches_any_keyword(&["just in"]));
    }

    #[test]
    fn test_money_to_price() {
        let money = Money {
            amount: "12.50".to_owned(),
            currency_code: "USD".to_owned(),
        };
        assert_eq!(money.to_price().unwrap().display(), "$12.50");
    }
}
