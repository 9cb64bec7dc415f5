//! Wire shapes of Storefront API responses and their conversion into
//! domain types.

use serde::Deserialize;
use shine_core::{ImageId, ProductId, VariantId};

use crate::shopify::types::{
    Image, Money, PageInfo, Product, ProductConnection, ProductVariant,
};

/// A GraphQL connection (`edges { node }`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
    #[serde(default)]
    pub page_info: PageInfo,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo::default(),
        }
    }
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|edge| edge.node)
    }
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: Connection<RawProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    description_html: String,
    #[serde(default)]
    vendor: String,
    #[serde(default)]
    product_type: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    variants: Connection<RawVariant>,
    #[serde(default)]
    images: Connection<RawImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "priceV2")]
    price: Money,
    #[serde(rename = "compareAtPriceV2")]
    compare_at_price: Option<Money>,
    sku: Option<String>,
    #[serde(default)]
    available_for_sale: bool,
    quantity_available: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImage {
    id: Option<String>,
    url: String,
    alt_text: Option<String>,
}

/// Convert a page of raw products.
pub fn convert_product_connection(raw: Connection<RawProduct>) -> ProductConnection {
    let page_info = raw.page_info.clone();
    ProductConnection {
        products: raw.into_nodes().map(convert_product).collect(),
        page_info,
    }
}

/// Convert one raw product. Variants whose price cannot be parsed are dropped.
pub fn convert_product(raw: RawProduct) -> Product {
    let product_id = raw.id;
    let variants = raw
        .variants
        .into_nodes()
        .filter_map(|v| convert_variant(&product_id, v))
        .collect();

    Product {
        id: ProductId::new(product_id),
        title: raw.title,
        description: raw.description,
        description_html: raw.description_html,
        vendor: raw.vendor,
        product_type: raw.product_type,
        tags: raw.tags,
        variants,
        images: raw.images.into_nodes().map(convert_image).collect(),
    }
}

fn convert_variant(product_id: &str, raw: RawVariant) -> Option<ProductVariant> {
    let price = match raw.price.to_price() {
        Ok(price) => price,
        Err(e) => {
            tracing::warn!(
                product_id,
                variant_id = %raw.id,
                error = %e,
                "Dropping variant with unreadable price"
            );
            return None;
        }
    };

    let compare_at_price = raw.compare_at_price.and_then(|money| {
        money
            .to_price()
            .inspect_err(|e| {
                tracing::warn!(variant_id = %raw.id, error = %e, "Ignoring unreadable compare-at price");
            })
            .ok()
    });

    Some(ProductVariant {
        id: VariantId::new(raw.id),
        title: raw.title,
        price,
        compare_at_price,
        sku: raw.sku.filter(|s| !s.is_empty()),
        available_for_sale: raw.available_for_sale,
        quantity_available: raw.quantity_available,
    })
}

fn convert_image(raw: RawImage) -> Image {
    Image {
        id: raw.id.map(ImageId::new),
        url: raw.url,
        alt_text: raw.alt_text,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const PAGE: &str = r#"{
        "products": {
            "edges": [{
                "cursor": "c1",
                "node": {
                    "id": "gid://shopify/Product/1",
                    "title": "Premium Car Wax",
                    "description": "Deep gloss.",
                    "descriptionHtml": "<p>Deep gloss.</p>",
                    "vendor": "Shine",
                    "productType": "Wax",
                    "tags": ["Best Seller"],
                    "variants": {"edges": [
                        {"node": {
                            "id": "gid://shopify/ProductVariant/11",
                            "title": "Default Title",
                            "priceV2": {"amount": "24.99", "currencyCode": "USD"},
                            "compareAtPriceV2": {"amount": "29.99", "currencyCode": "USD"},
                            "sku": "WAX-16",
                            "availableForSale": true,
                            "quantityAvailable": 12
                        }},
                        {"node": {
                            "id": "gid://shopify/ProductVariant/12",
                            "title": "Gallon",
                            "priceV2": {"amount": "n/a", "currencyCode": "USD"},
                            "compareAtPriceV2": null,
                            "sku": "",
                            "availableForSale": false,
                            "quantityAvailable": null
                        }}
                    ]},
                    "images": {"edges": [
                        {"node": {"id": "gid://shopify/ProductImage/5", "url": "https://cdn.example.com/wax.png", "altText": null}}
                    ]}
                }
            }],
            "pageInfo": {"hasNextPage": true, "endCursor": "c1"}
        }
    }"#;

    #[test]
    fn test_convert_product_page() {
        let data: ProductsData = serde_json::from_str(PAGE).unwrap();
        let page = convert_product_connection(data.products);

        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("c1"));
        assert_eq!(page.products.len(), 1);

        let product = &page.products[0];
        assert_eq!(product.title, "Premium Car Wax");
        assert_eq!(product.product_type, "Wax");
        assert_eq!(product.images.len(), 1);

        // The unreadable "n/a" variant is dropped.
        assert_eq!(product.variants.len(), 1);
        let variant = &product.variants[0];
        assert_eq!(variant.price.amount, Decimal::new(2499, 2));
        assert_eq!(
            variant.compare_at_price.map(|p| p.amount),
            Some(Decimal::new(2999, 2))
        );
        assert_eq!(variant.quantity_available, Some(12));
        assert!(product.is_on_sale());
    }

    #[test]
    fn test_missing_optional_sections_default() {
        let raw = r#"{"products": {"edges": [{"node": {"id": "gid://shopify/Product/2", "title": "Bare"}}]}}"#;
        let data: ProductsData = serde_json::from_str(raw).unwrap();
        let page = convert_product_connection(data.products);

        assert!(!page.page_info.has_next_page);
        assert!(page.products[0].variants.is_empty());
        assert!(page.products[0].tags.is_empty());
    }
}
