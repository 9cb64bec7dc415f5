//! Local shopping cart.
//!
//! The cart lives on the device. Line items are written to the key-value
//! store after every mutation and read back once at startup; promo state is
//! session-only.
//!
//! # Invariants
//!
//! - At most one line per variant: adding an existing variant bumps its
//!   quantity.
//! - Every line has quantity ≥ 1. Driving a quantity to zero removes the line.
//! - The promo discount is computed when the code is applied and is not
//!   re-derived when the subtotal changes afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use shine_core::{LineItemId, ProductId, VariantId};
use thiserror::Error;
use url::Url;

use crate::error::add_breadcrumb;
use crate::models::CartLineItem;
use crate::shopify::Product;
use crate::storage::{self, KeyValueStore, keys};

/// Errors from cart operations.
///
/// All of these are caller mistakes; network and storage failures never
/// surface from the cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The product has no purchasable variants.
    #[error("product {0} has no variants")]
    NoVariants(ProductId),

    /// The requested variant does not belong to the product.
    #[error("variant {0} is not part of this product")]
    UnknownVariant(VariantId),

    /// No line with this ID is in the cart.
    #[error("cart line {0} not found")]
    LineNotFound(LineItemId),

    /// Checkout was requested with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The checkout URL could not be built from the store domain.
    #[error("invalid checkout URL: {0}")]
    InvalidCheckoutUrl(String),
}

/// Tax, shipping and promo settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartPricing {
    /// Estimated sales tax as a fraction of the subtotal.
    pub tax_rate: Decimal,
    /// Flat shipping fee below the free-shipping threshold.
    pub shipping_fee: Decimal,
    /// Subtotal at which shipping becomes free.
    pub free_shipping_threshold: Decimal,
    /// Promo code (uppercase) to fraction of subtotal.
    pub promo_codes: HashMap<String, Decimal>,
}

impl Default for CartPricing {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(825, 4),
            shipping_fee: Decimal::new(799, 2),
            free_shipping_threshold: Decimal::new(75, 0),
            promo_codes: HashMap::from([
                ("SHINE10".to_owned(), Decimal::new(10, 2)),
                ("GARAGE20".to_owned(), Decimal::new(20, 2)),
                ("FIRST15".to_owned(), Decimal::new(15, 2)),
            ]),
        }
    }
}

/// Computed cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub promo_discount: Decimal,
    pub total: Decimal,
    /// Line savings plus the promo discount.
    pub savings: Decimal,
}

/// The cart state container.
pub struct CartEngine {
    store: Arc<dyn KeyValueStore>,
    pricing: CartPricing,
    items: Vec<CartLineItem>,
    promo_code: Option<String>,
    promo_discount: Decimal,
    is_checking_out: bool,
}

impl std::fmt::Debug for CartEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEngine")
            .field("items", &self.items.len())
            .field("promo_code", &self.promo_code)
            .field("promo_discount", &self.promo_discount)
            .finish_non_exhaustive()
    }
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl CartEngine {
    /// Load the cart persisted in `store`.
    ///
    /// An absent or unreadable saved cart yields an empty cart.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>, pricing: CartPricing) -> Self {
        let mut items: Vec<CartLineItem> =
            storage::load_json(store.as_ref(), keys::CART_ITEMS).unwrap_or_default();
        items.retain(|item| item.quantity > 0);

        tracing::debug!(lines = items.len(), "Loaded cart");

        Self {
            store,
            pricing,
            items,
            promo_code: None,
            promo_discount: Decimal::ZERO,
            is_checking_out: false,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Find a line by ID.
    #[must_use]
    pub fn line(&self, id: LineItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// The applied promo code, uppercased.
    #[must_use]
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    /// Whether a checkout is being prepared.
    #[must_use]
    pub const fn is_checking_out(&self) -> bool {
        self.is_checking_out
    }

    /// Pricing in effect.
    #[must_use]
    pub const fn pricing(&self) -> &CartPricing {
        &self.pricing
    }

    /// Sum of line subtotals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartLineItem::subtotal).sum()
    }

    /// Estimated tax on the subtotal.
    #[must_use]
    pub fn estimated_tax(&self) -> Decimal {
        round_cents(self.subtotal() * self.pricing.tax_rate)
    }

    /// Shipping fee; zero once the subtotal reaches the threshold.
    #[must_use]
    pub fn estimated_shipping(&self) -> Decimal {
        if self.subtotal() >= self.pricing.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.pricing.shipping_fee
        }
    }

    /// Discount locked in when the promo code was applied.
    #[must_use]
    pub const fn promo_discount(&self) -> Decimal {
        self.promo_discount
    }

    /// `subtotal + tax + shipping − promo discount`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.subtotal() + self.estimated_tax() + self.estimated_shipping() - self.promo_discount
    }

    /// Line savings plus the promo discount.
    #[must_use]
    pub fn total_savings(&self) -> Decimal {
        self.items.iter().map(CartLineItem::savings).sum::<Decimal>() + self.promo_discount
    }

    /// Fraction of the way to free shipping, capped at 1.
    #[must_use]
    pub fn free_shipping_progress(&self) -> Decimal {
        if self.pricing.free_shipping_threshold <= Decimal::ZERO {
            return Decimal::ONE;
        }
        (self.subtotal() / self.pricing.free_shipping_threshold).min(Decimal::ONE)
    }

    /// How much more to spend for free shipping (never negative).
    #[must_use]
    pub fn amount_to_free_shipping(&self) -> Decimal {
        (self.pricing.free_shipping_threshold - self.subtotal()).max(Decimal::ZERO)
    }

    /// All totals at once.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            subtotal: self.subtotal(),
            tax: self.estimated_tax(),
            shipping: self.estimated_shipping(),
            promo_discount: self.promo_discount,
            total: self.total(),
            savings: self.total_savings(),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of a product variant.
    ///
    /// Uses the product's first variant when `variant_id` is `None`. If the
    /// variant is already in the cart its quantity goes up by one; otherwise
    /// a new line is appended.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NoVariants` for a product without variants and
    /// `CartError::UnknownVariant` if `variant_id` is not one of its variants.
    pub fn add_to_cart(
        &mut self,
        product: &Product,
        variant_id: Option<&VariantId>,
    ) -> Result<LineItemId, CartError> {
        let variant = match variant_id {
            Some(id) => product
                .variant(id)
                .ok_or_else(|| CartError::UnknownVariant(id.clone()))?,
            None => product
                .default_variant()
                .ok_or_else(|| CartError::NoVariants(product.id.clone()))?,
        };

        let line_id = if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.variant_id == variant.id)
        {
            existing.quantity = existing.quantity.saturating_add(1);
            existing.id
        } else {
            let line = CartLineItem::new(product, variant);
            let id = line.id;
            self.items.push(line);
            id
        };

        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("variant_id", variant.id.as_str())]),
        );
        self.persist();
        Ok(line_id)
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no line has this ID.
    pub fn update_quantity(&mut self, id: LineItemId, quantity: i64) -> Result<(), CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CartError::LineNotFound(id))?;

        if quantity <= 0 {
            self.items.remove(index);
        } else if let Some(item) = self.items.get_mut(index) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }

        self.persist();
        Ok(())
    }

    /// Add one unit to a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no line has this ID.
    pub fn increment(&mut self, id: LineItemId) -> Result<(), CartError> {
        let current = self.line(id).ok_or(CartError::LineNotFound(id))?.quantity;
        self.update_quantity(id, i64::from(current) + 1)
    }

    /// Remove one unit from a line, removing the line at zero.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no line has this ID.
    pub fn decrement(&mut self, id: LineItemId) -> Result<(), CartError> {
        let current = self.line(id).ok_or(CartError::LineNotFound(id))?.quantity;
        self.update_quantity(id, i64::from(current) - 1)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no line has this ID.
    pub fn remove_line(&mut self, id: LineItemId) -> Result<CartLineItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CartError::LineNotFound(id))?;
        let removed = self.items.remove(index);
        self.persist();
        Ok(removed)
    }

    /// Remove every line and the promo code.
    pub fn clear(&mut self) {
        self.items.clear();
        self.promo_code = None;
        self.promo_discount = Decimal::ZERO;
        add_breadcrumb("cart", "Cleared cart", None);
        self.persist();
    }

    /// Apply a promo code to the current subtotal.
    ///
    /// The code is trimmed and uppercased. Unknown codes are kept but give
    /// no discount. Returns the discount amount.
    pub fn apply_promo_code(&mut self, code: &str) -> Decimal {
        let code = code.trim().to_uppercase();
        let rate = self
            .pricing
            .promo_codes
            .get(&code)
            .copied()
            .unwrap_or(Decimal::ZERO);

        self.promo_discount = round_cents(self.subtotal() * rate);
        tracing::debug!(code = %code, discount = %self.promo_discount, "Applied promo code");
        add_breadcrumb("cart", "Applied promo code", Some(&[("code", code.as_str())]));
        self.promo_code = Some(code).filter(|c| !c.is_empty());

        self.promo_discount
    }

    /// Build the checkout redirect for the current cart.
    ///
    /// Returns a Shopify cart permalink
    /// (`https://{store}/cart/{variant}:{qty},...`). Order creation happens
    /// on Shopify's side.
    ///
    /// # Errors
    ///
    /// Returns `CartError::EmptyCart` when there is nothing to buy, or
    /// `CartError::InvalidCheckoutUrl` if `store` is not a valid host.
    pub fn begin_checkout(&mut self, store: &str) -> Result<Url, CartError> {
        if self.items.is_empty() {
            return Err(CartError::EmptyCart);
        }

        self.is_checking_out = true;

        let lines = self
            .items
            .iter()
            .map(|item| format!("{}:{}", item.variant_id.numeric_id(), item.quantity))
            .collect::<Vec<_>>()
            .join(",");
        let result = Url::parse(&format!("https://{store}/cart/{lines}"))
            .map_err(|e| CartError::InvalidCheckoutUrl(e.to_string()));

        add_breadcrumb("cart", "Started checkout", None);
        self.is_checking_out = false;
        result
    }

    fn persist(&self) {
        if let Err(e) = storage::save_json(self.store.as_ref(), keys::CART_ITEMS, &self.items) {
            tracing::warn!(error = %e, "Failed to save cart");
        }
    }
}
