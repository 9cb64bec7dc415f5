//! Shopify Storefront API clients.
//!
//! # Architecture
//!
//! - GraphQL documents are plain string constants sent as `{query, variables}`
//!   JSON bodies; user input always travels in `variables`, never spliced
//!   into the document
//! - Shopify is the source of truth for products and customers; the only
//!   local state is the cart and the customer token
//! - Search results are cached in-memory via `moka` (5 minute TTL)
//!
//! # APIs
//!
//! ## Products
//! - Paginated product listing with variants and images
//! - Keyword search
//!
//! ## Customers (classic Storefront customer API)
//! - Account creation, access-token sign-in, password recovery
//! - Customer lookup by access token (profile, addresses, recent orders)
//!
//! # Example
//!
//! ```rust,ignore
//! use shine_storefront::shopify::{CustomerClient, StorefrontClient};
//!
//! let client = StorefrontClient::new(&config.shopify);
//! let page = client.get_products(20, None, None).await?;
//!
//! let customers = CustomerClient::new(client.clone());
//! let token = customers.create_access_token(&email, &password).await?;
//! ```

mod customer;
mod storefront;
pub mod types;

pub use customer::{
    Address, CreatedCustomer, Customer, CustomerAccessToken, CustomerClient, CustomerUserError,
    Order, OrderLineItem,
};
pub use storefront::StorefrontClient;
pub use types::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// First part of the response body.
        body: String,
    },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The access token was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),
}

impl ShopifyError {
    /// Whether this is a transport-level failure (as opposed to Shopify
    /// rejecting the request content).
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::RateLimited(_) | Self::Parse(_)
        )
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    /// Error message.
    #[serde(default)]
    pub message: String,
    /// Source locations in the query.
    #[serde(default)]
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

/// Request body for a GraphQL call.
#[derive(Debug, Serialize)]
pub(crate) struct GraphQLRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

/// Response envelope for a GraphQL call.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

impl<T> GraphQLResponse<T> {
    pub fn into_result(self) -> Result<T, ShopifyError> {
        if let Some(errors) = self.errors
            && !errors.is_empty()
        {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(errors));
        }

        self.data.ok_or_else(|| {
            ShopifyError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_owned(),
                locations: vec![],
                path: vec![],
            }])
        })
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_owned();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}
