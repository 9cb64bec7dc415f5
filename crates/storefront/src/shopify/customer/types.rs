//! Types for the Storefront customer API.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use shine_core::{AddressId, CustomerId, OrderId, Price};

use crate::shopify::Money;

// ─────────────────────────────────────────────────────────────────────────────
// Customer
// ─────────────────────────────────────────────────────────────────────────────

/// An authenticated customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub accepts_marketing: bool,
    pub default_address: Option<Address>,
    pub addresses: Vec<Address>,
    pub orders: Vec<Order>,
}

impl Customer {
    /// Name to greet the customer with, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().filter(|s| !s.is_empty());
        let last = self.last_name.as_deref().filter(|s| !s.is_empty());
        match (first, last) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_owned(),
            (None, None) => self.email.clone(),
        }
    }

    /// Avatar initials: first letters of the name parts, else the first two
    /// characters of the email.
    #[must_use]
    pub fn initials(&self) -> String {
        let initials: String = [&self.first_name, &self.last_name]
            .into_iter()
            .filter_map(|part| part.as_deref().and_then(|s| s.chars().next()))
            .flat_map(char::to_uppercase)
            .collect();

        if initials.is_empty() {
            self.email.chars().take(2).flat_map(char::to_uppercase).collect()
        } else {
            initials
        }
    }
}

/// A customer mailing address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Address {
    /// Multi-line postal format.
    #[must_use]
    pub fn formatted(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        if let Some(line) = &self.address1 {
            lines.push(line.clone());
        }
        if let Some(line) = self.address2.as_ref().filter(|s| !s.is_empty()) {
            lines.push(line.clone());
        }

        let mut locality = String::new();
        if let Some(city) = &self.city {
            locality.push_str(city);
        }
        if let Some(province) = &self.province {
            locality.push_str(", ");
            locality.push_str(province);
        }
        if let Some(zip) = &self.zip {
            locality.push(' ');
            locality.push_str(zip);
        }
        if !locality.is_empty() {
            lines.push(locality);
        }

        if let Some(country) = &self.country {
            lines.push(country.clone());
        }

        lines.join("\n")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders
// ─────────────────────────────────────────────────────────────────────────────

/// A past order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: i64,
    pub processed_at: Option<DateTime<Utc>>,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub total_price: Option<Price>,
    pub line_items: Vec<OrderLineItem>,
}

impl Order {
    /// Order number as shown to customers (e.g., `#AP-1001`).
    #[must_use]
    pub fn formatted_order_number(&self) -> String {
        format!("#AP-{}", self.order_number)
    }

    /// Fulfillment status if known, else financial status, else "Processing".
    #[must_use]
    pub fn status_display(&self) -> String {
        self.fulfillment_status
            .as_deref()
            .or(self.financial_status.as_deref())
            .map_or_else(|| "Processing".to_owned(), capitalize_words)
    }

    /// Number of line items on the order.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.line_items.len()
    }
}

/// One line of a past order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub title: String,
    pub quantity: i64,
}

/// `PARTIALLY_FULFILLED` -> `Partially Fulfilled`.
fn capitalize_words(status: &str) -> String {
    status
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Mutation results
// ─────────────────────────────────────────────────────────────────────────────

/// A customer access token and its absolute expiry.
#[derive(Debug, Clone)]
pub struct CustomerAccessToken {
    pub access_token: SecretString,
    /// Expiry exactly as Shopify sent it (ISO-8601).
    pub expires_at: String,
}

/// A freshly created customer account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCustomer {
    pub id: CustomerId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A field-level error from a customer mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerUserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Join user error messages for display, one per line.
pub(crate) fn join_user_errors(errors: &[CustomerUserError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire shapes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCustomer {
    id: CustomerId,
    #[serde(default)]
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    #[serde(default)]
    accepts_marketing: bool,
    default_address: Option<Address>,
    #[serde(default)]
    addresses: Option<RawConnection<Address>>,
    #[serde(default)]
    orders: Option<RawConnection<RawOrder>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawConnection<T> {
    edges: Vec<RawEdge<T>>,
}

impl<T> RawConnection<T> {
    fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|edge| edge.node)
    }
}

#[derive(Debug, Deserialize)]
struct RawEdge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrder {
    id: OrderId,
    order_number: i64,
    processed_at: Option<String>,
    financial_status: Option<String>,
    fulfillment_status: Option<String>,
    total_price: Option<Money>,
    #[serde(default)]
    line_items: Option<RawConnection<OrderLineItem>>,
}

impl From<RawCustomer> for Customer {
    fn from(raw: RawCustomer) -> Self {
        Self {
            id: raw.id,
            email: raw.email.unwrap_or_default(),
            first_name: raw.first_name,
            last_name: raw.last_name,
            phone: raw.phone,
            accepts_marketing: raw.accepts_marketing,
            default_address: raw.default_address,
            addresses: raw
                .addresses
                .map(|c| c.into_nodes().collect())
                .unwrap_or_default(),
            orders: raw
                .orders
                .map(|c| c.into_nodes().map(Order::from).collect())
                .unwrap_or_default(),
        }
    }
}

impl From<RawOrder> for Order {
    fn from(raw: RawOrder) -> Self {
        let processed_at = raw.processed_at.as_deref().and_then(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .inspect_err(|e| tracing::debug!(value = s, error = %e, "Unreadable order date"))
                .ok()
        });
        let total_price = raw.total_price.and_then(|m| m.to_price().ok());

        Self {
            id: raw.id,
            order_number: raw.order_number,
            processed_at,
            financial_status: raw.financial_status,
            fulfillment_status: raw.fulfillment_status,
            total_price,
            line_items: raw
                .line_items
                .map(|c| c.into_nodes().collect())
                .unwrap_or_default(),
        }
    }
}
