//! Shopify Storefront API client implementation.
//!
//! Sends plain JSON GraphQL bodies with `reqwest` 0.13. Search results are
//! cached using `moka` (5-minute TTL); catalog listing always hits the API.

mod conversions;
pub(crate) mod queries;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use crate::config::ShopifyConfig;
use crate::services::catalog::CatalogSource;
use crate::shopify::types::{Product, ProductConnection};
use crate::shopify::{GraphQLRequest, GraphQLResponse, ShopifyError};

use conversions::{ProductsData, convert_product_connection};

const SEARCH_CACHE_TTL: Duration = Duration::from_secs(300);
const SEARCH_CACHE_CAPACITY: u64 = 500;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Cheap to clone; clones share the HTTP connection pool and search cache.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    store: String,
    access_token: SecretString,
    search_cache: Cache<String, Arc<Vec<Product>>>,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("endpoint", &self.inner.endpoint)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        let endpoint = format!(
            "https://{}/api/{}/graphql.json",
            config.store, config.api_version
        );
        Self::build(endpoint, config.store.clone(), config.storefront_token.clone())
    }

    /// Create a client against an explicit GraphQL endpoint.
    ///
    /// Used to point the client at a proxy or a mock server.
    #[must_use]
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        store: impl Into<String>,
        access_token: SecretString,
    ) -> Self {
        Self::build(endpoint.into(), store.into(), access_token)
    }

    fn build(endpoint: String, store: String, access_token: SecretString) -> Self {
        let search_cache = Cache::builder()
            .max_capacity(SEARCH_CACHE_CAPACITY)
            .time_to_live(SEARCH_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint,
                store,
                access_token,
                search_cache,
            }),
        }
    }

    /// The store domain this client talks to.
    #[must_use]
    pub fn store(&self) -> &str {
        &self.inner.store
    }

    /// Execute a GraphQL document and decode its `data`.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(
                "X-Shopify-Storefront-Access-Token",
                self.inner.access_token.expose_secret(),
            )
            .header("Content-Type", "application/json")
            .json(&GraphQLRequest { query, variables })
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ShopifyError::Unauthorized(format!(
                "Storefront API returned {status}"
            )));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        let response: GraphQLResponse<T> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        response.into_result()
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get one page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        first: u32,
        after: Option<String>,
        query: Option<String>,
    ) -> Result<ProductConnection, ShopifyError> {
        let variables = json!({
            "first": first,
            "after": after,
            "query": query,
        });

        let data: ProductsData = self.execute(queries::GET_PRODUCTS, variables).await?;
        Ok(convert_product_connection(data.products))
    }

    /// Fetch the whole catalog by following pagination cursors.
    ///
    /// Stops after `max_pages` pages even if Shopify reports more.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails; no partial catalog is
    /// returned.
    #[instrument(skip(self))]
    pub async fn fetch_all_products(
        &self,
        page_size: u32,
        max_pages: u32,
    ) -> Result<Vec<Product>, ShopifyError> {
        let mut products = Vec::new();
        let mut cursor: Option<String> = None;

        for page in 1..=max_pages.max(1) {
            let connection = self.get_products(page_size, cursor.take(), None).await?;
            products.extend(connection.products);

            match connection.page_info.end_cursor {
                Some(end) if connection.page_info.has_next_page => cursor = Some(end),
                _ => break,
            }

            if page == max_pages {
                tracing::warn!(max_pages, "Catalog has more pages than the configured limit");
            }
        }

        debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }

    /// Search products by keyword.
    ///
    /// Results are cached per `(query, first)` for five minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_products(
        &self,
        query: &str,
        first: u32,
    ) -> Result<Vec<Product>, ShopifyError> {
        let query = query.trim();
        let cache_key = format!("search:{first}:{}", query.to_lowercase());

        if let Some(hit) = self.inner.search_cache.get(&cache_key).await {
            debug!("Cache hit for search");
            return Ok(hit.as_ref().clone());
        }

        let connection = self
            .get_products(first, None, Some(query.to_owned()))
            .await?;
        let products = Arc::new(connection.products);

        self.inner
            .search_cache
            .insert(cache_key, Arc::clone(&products))
            .await;

        Ok(products.as_ref().clone())
    }
}

impl CatalogSource for StorefrontClient {
    async fn fetch_catalog(
        &self,
        page_size: u32,
        max_pages: u32,
    ) -> Result<Vec<Product>, ShopifyError> {
        self.fetch_all_products(page_size, max_pages).await
    }
}
