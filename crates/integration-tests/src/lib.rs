//! Integration tests for the shine storefront.
//!
//! Every test runs against a [`wiremock::MockServer`] standing in for both
//! the Shopify Storefront API and the chat completions API, so no network
//! access or credentials are needed.
//!
//! ```bash
//! cargo test -p shine-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - catalog pagination, refresh failure and search caching
//! - `customer_session` - sign-in, sign-up and stored token handling
//! - `advisor_flow` - advisor conversation end to end through `AppState`
//! - `cart_persistence` - cart survival across restarts on disk

#![allow(clippy::missing_panics_doc)]

use std::path::Path;
use std::sync::Arc;

use secrecy::SecretString;
use serde_json::{Value, json};
use shine_storefront::config::{OpenAiConfig, ShopifyConfig, StorefrontConfig};
use shine_storefront::openai::OpenAiClient;
use shine_storefront::shopify::{CustomerClient, StorefrontClient};
use shine_storefront::state::AppState;
use shine_storefront::storage::KeyValueStore;
use wiremock::{MockServer, ResponseTemplate};

/// Store domain used in every test.
pub const STORE: &str = "shine-test.myshopify.com";

/// Path the mocked Storefront API answers on.
pub const GRAPHQL_PATH: &str = "/api/graphql.json";

/// Path the mocked chat completions API answers on.
pub const CHAT_PATH: &str = "/v1/chat/completions";

/// Storefront access token sent by the test clients.
pub const STOREFRONT_TOKEN: &str = "test-storefront-token";

// =============================================================================
// Clients
// =============================================================================

/// A Storefront client pointed at `server`.
#[must_use]
pub fn storefront_client(server: &MockServer) -> StorefrontClient {
    StorefrontClient::with_endpoint(
        format!("{}{GRAPHQL_PATH}", server.uri()),
        STORE,
        SecretString::from(STOREFRONT_TOKEN),
    )
}

/// A customer client pointed at `server`.
#[must_use]
pub fn customer_client(server: &MockServer) -> CustomerClient {
    CustomerClient::new(storefront_client(server))
}

/// Configuration whose chat endpoint is `server`.
#[must_use]
pub fn test_config(server: &MockServer, data_dir: &Path) -> StorefrontConfig {
    StorefrontConfig {
        shopify: ShopifyConfig {
            store: STORE.to_owned(),
            api_version: "2024-01".to_owned(),
            storefront_token: SecretString::from(STOREFRONT_TOKEN),
        },
        openai: OpenAiConfig {
            api_key: SecretString::from("sk-test-key"),
            model: "gpt-4o-mini".to_owned(),
            base_url: format!("{}/v1", server.uri()),
            temperature: 0.7,
            max_tokens: 800,
        },
        data_dir: data_dir.to_path_buf(),
        catalog_page_size: 2,
        catalog_max_pages: 5,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Application state wired to `server` for both APIs.
#[must_use]
pub fn app_state(server: &MockServer, store: Arc<dyn KeyValueStore>, data_dir: &Path) -> AppState {
    let config = test_config(server, data_dir);
    let openai = OpenAiClient::new(&config.openai).expect("Failed to build chat client");
    AppState::from_parts(config, store, storefront_client(server), openai)
}

// =============================================================================
// Response Builders
// =============================================================================

/// A `200` GraphQL response wrapping `data`.
#[must_use]
pub fn graphql_ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

/// A product node as the Storefront API returns it.
#[must_use]
pub fn product_node(
    id: u64,
    title: &str,
    price: &str,
    compare_at: Option<&str>,
    product_type: &str,
    tags: &[&str],
) -> Value {
    let compare_at = compare_at.map(|amount| json!({ "amount": amount, "currencyCode": "USD" }));
    json!({
        "id": format!("gid://shopify/Product/{id}"),
        "title": title,
        "description": format!("{title} for a showroom finish."),
        "descriptionHtml": format!("<p>{title} for a showroom finish.</p>"),
        "vendor": "Shine",
        "productType": product_type,
        "tags": tags,
        "variants": {
            "edges": [{
                "node": {
                    "id": format!("gid://shopify/ProductVariant/{id}01"),
                    "title": "Default Title",
                    "priceV2": { "amount": price, "currencyCode": "USD" },
                    "compareAtPriceV2": compare_at,
                    "sku": format!("SKU-{id}"),
                    "availableForSale": true,
                    "quantityAvailable": 12
                }
            }]
        },
        "images": { "edges": [] }
    })
}

/// A `products` connection page.
#[must_use]
pub fn products_page(nodes: Vec<Value>, next_cursor: Option<&str>) -> ResponseTemplate {
    let edges: Vec<Value> = nodes.into_iter().map(|node| json!({ "node": node })).collect();
    graphql_ok(json!({
        "products": {
            "edges": edges,
            "pageInfo": {
                "hasNextPage": next_cursor.is_some(),
                "endCursor": next_cursor
            }
        }
    }))
}

/// A customer as returned by the `customer` query.
#[must_use]
pub fn customer_node(email: &str, first_name: &str, last_name: &str) -> Value {
    json!({
        "id": "gid://shopify/Customer/7001",
        "email": email,
        "firstName": first_name,
        "lastName": last_name,
        "phone": null,
        "acceptsMarketing": false,
        "defaultAddress": null,
        "addresses": { "edges": [] },
        "orders": {
            "edges": [{
                "node": {
                    "id": "gid://shopify/Order/5001",
                    "orderNumber": 1042,
                    "processedAt": "2024-05-01T10:00:00Z",
                    "financialStatus": "PAID",
                    "fulfillmentStatus": "FULFILLED",
                    "totalPrice": { "amount": "54.97", "currencyCode": "USD" },
                    "lineItems": { "edges": [] }
                }
            }]
        }
    })
}

/// A chat completion whose first choice says `content`.
#[must_use]
pub fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
}
