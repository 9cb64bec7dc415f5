//! Catalog commands.

use shine_storefront::error::AppError;
use shine_storefront::shopify::Product;
use shine_storefront::state::AppState;

use crate::Bucket;

/// Refresh the catalog and report bucket sizes.
pub async fn refresh(state: &AppState) -> Result<(), AppError> {
    let count = state.refresh_catalog().await?;
    let snapshot = state.catalog().snapshot();

    println!("Loaded {count} products");
    println!("  featured:      {}", snapshot.featured.len());
    println!("  doorbusters:   {}", snapshot.doorbusters.len());
    println!("  best sellers:  {}", snapshot.best_sellers.len());
    println!("  new arrivals:  {}", snapshot.new_arrivals.len());
    Ok(())
}

/// List a bucket, optionally narrowed to a product type.
pub async fn list(
    state: &AppState,
    bucket: Bucket,
    product_type: Option<&str>,
) -> Result<(), AppError> {
    state.refresh_catalog().await?;
    let snapshot = state.catalog().snapshot();

    let products = match bucket {
        Bucket::All => &snapshot.products,
        Bucket::Featured => &snapshot.featured,
        Bucket::Doorbusters => &snapshot.doorbusters,
        Bucket::BestSellers => &snapshot.best_sellers,
        Bucket::NewArrivals => &snapshot.new_arrivals,
    };

    let wanted = product_type.map(str::to_lowercase);
    let shown: Vec<&Product> = products
        .iter()
        .filter(|p| {
            wanted
                .as_deref()
                .is_none_or(|t| p.product_type.to_lowercase() == t)
        })
        .collect();

    if shown.is_empty() {
        println!("No products.");
    }
    for product in shown {
        print_product(product);
    }
    Ok(())
}

/// Search the store.
pub async fn search(state: &AppState, query: &str, limit: u32) -> Result<(), AppError> {
    let results = state.storefront().search_products(query, limit).await?;

    if results.is_empty() {
        println!("No products match \"{query}\".");
    }
    for product in &results {
        print_product(product);
    }
    Ok(())
}

pub fn print_product(product: &Product) {
    let price = product
        .price()
        .map_or_else(|| "n/a".to_owned(), |p| p.display());
    let sale = if product.is_on_sale() {
        product
            .compare_at_price()
            .map(|c| format!(" (was {c})"))
            .unwrap_or_default()
    } else {
        String::new()
    };

    println!(
        "{:>14}  {}  {price}{sale}",
        product.id.numeric_id(),
        product.title
    );
}
