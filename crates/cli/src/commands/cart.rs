//! Cart commands.

use shine_core::{LineItemId, VariantId};
use shine_storefront::error::AppError;
use shine_storefront::services::advisor::find_match;
use shine_storefront::services::cart::CartEngine;
use shine_storefront::services::catalog::CatalogSnapshot;
use shine_storefront::shopify::Product;
use shine_storefront::state::AppState;

/// Print lines and totals.
pub async fn show(state: &AppState) {
    let cart = state.cart().await;
    print_cart(&cart);
}

/// Add a product by ID or title.
pub async fn add(state: &AppState, product: &str, variant: Option<&str>) -> Result<(), AppError> {
    state.refresh_catalog().await?;
    let snapshot = state.catalog().snapshot();

    let Some(found) = lookup(&snapshot, product) else {
        println!("No product matches \"{product}\".");
        return Ok(());
    };

    let variant = variant.map(|v| {
        if v.starts_with("gid://") {
            VariantId::new(v)
        } else {
            VariantId::new(format!("gid://shopify/ProductVariant/{v}"))
        }
    });

    let mut cart = state.cart().await;
    cart.add_to_cart(found, variant.as_ref())?;
    println!("Added {} to your cart.", found.title);
    print_cart(&cart);
    Ok(())
}

/// Set a line's quantity.
pub async fn set_quantity(state: &AppState, line: usize, quantity: i64) -> Result<(), AppError> {
    let mut cart = state.cart().await;
    let Some(id) = line_id(&cart, line) else {
        println!("There is no line {line}.");
        return Ok(());
    };

    cart.update_quantity(id, quantity)?;
    print_cart(&cart);
    Ok(())
}

/// Remove a line.
pub async fn remove(state: &AppState, line: usize) -> Result<(), AppError> {
    let mut cart = state.cart().await;
    let Some(id) = line_id(&cart, line) else {
        println!("There is no line {line}.");
        return Ok(());
    };

    let removed = cart.remove_line(id)?;
    println!("Removed {}.", removed.title);
    print_cart(&cart);
    Ok(())
}

/// Empty the cart.
pub async fn clear(state: &AppState) {
    state.cart().await.clear();
    println!("Your cart is empty.");
}

/// Apply a promo code.
pub async fn promo(state: &AppState, code: &str) {
    let mut cart = state.cart().await;
    let discount = cart.apply_promo_code(code);

    if discount.is_zero() {
        println!("Code {} does not apply to this cart.", code.trim().to_uppercase());
    } else {
        println!("Code applied: -${discount:.2}");
    }
    print_cart(&cart);
}

/// Print the checkout URL.
pub async fn checkout(state: &AppState) -> Result<(), AppError> {
    let mut cart = state.cart().await;
    let url = cart.begin_checkout(state.storefront().store())?;
    println!("Continue to checkout: {url}");
    Ok(())
}

/// Resolve a product by gid, numeric id, or title.
pub fn lookup<'a>(snapshot: &'a CatalogSnapshot, input: &str) -> Option<&'a Product> {
    let input = input.trim();
    snapshot
        .products
        .iter()
        .find(|p| p.id.as_str() == input || p.id.numeric_id() == input)
        .or_else(|| find_match(input, &snapshot.products))
}

fn line_id(cart: &CartEngine, line: usize) -> Option<LineItemId> {
    line.checked_sub(1)
        .and_then(|index| cart.items().get(index))
        .map(|item| item.id)
}

pub fn print_cart(cart: &CartEngine) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for (n, item) in cart.items().iter().enumerate() {
        let variant = item
            .variant_title
            .as_deref()
            .map(|v| format!(" ({v})"))
            .unwrap_or_default();
        println!(
            "{:>3}. {}{variant}  x{}  {}",
            n + 1,
            item.title,
            item.quantity,
            item.price.times(item.quantity)
        );
    }

    let totals = cart.totals();
    println!();
    println!("  Subtotal   ${:.2}", totals.subtotal);
    println!("  Tax        ${:.2}", totals.tax);
    if totals.shipping.is_zero() {
        println!("  Shipping   FREE");
    } else {
        println!(
            "  Shipping   ${:.2}  (${:.2} more for free shipping)",
            totals.shipping,
            cart.amount_to_free_shipping()
        );
    }
    if let Some(code) = cart.promo_code() {
        println!("  Promo {code}  -${:.2}", totals.promo_discount);
    }
    println!("  Total      ${:.2}", totals.total);
    if !totals.savings.is_zero() {
        println!("  You save   ${:.2}", totals.savings);
    }
}
