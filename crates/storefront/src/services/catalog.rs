//! In-memory product catalog.
//!
//! The catalog is held as an immutable [`CatalogSnapshot`] behind an `Arc`.
//! A refresh builds a complete new snapshot and swaps it in under a short
//! write lock, so readers see either the old or the new state in full.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use shine_core::ProductId;
use tracing::instrument;

use crate::shopify::{Product, ShopifyError};

/// Maximum number of products in the featured bucket.
pub const FEATURED_LIMIT: usize = 6;

const DOORBUSTER_KEYWORDS: &[&str] = &["doorbuster", "door buster", "deal"];
const BEST_SELLER_KEYWORDS: &[&str] = &[
    "best seller",
    "bestseller",
    "best-seller",
    "popular",
    "top rated",
];
const NEW_ARRIVAL_KEYWORDS: &[&str] = &["new", "new arrival", "new-arrival", "just in"];

/// Where the catalog comes from.
pub trait CatalogSource: Send + Sync {
    /// Fetch every product, following pagination up to `max_pages`.
    fn fetch_catalog(
        &self,
        page_size: u32,
        max_pages: u32,
    ) -> impl Future<Output = Result<Vec<Product>, ShopifyError>> + Send;
}

/// A complete, immutable view of the catalog and its display buckets.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub doorbusters: Vec<Product>,
    pub best_sellers: Vec<Product>,
    pub new_arrivals: Vec<Product>,
    pub featured: Vec<Product>,
    /// When the products were fetched; `None` before the first refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    /// Classify `products` into display buckets.
    #[must_use]
    pub fn build(products: Vec<Product>, refreshed_at: Option<DateTime<Utc>>) -> Self {
        let bucket = |keywords: &[&str]| -> Vec<Product> {
            products
                .iter()
                .filter(|p| p.matches_any_keyword(keywords))
                .cloned()
                .collect()
        };

        let doorbusters = bucket(DOORBUSTER_KEYWORDS);
        let best_sellers = bucket(BEST_SELLER_KEYWORDS);
        let new_arrivals = bucket(NEW_ARRIVAL_KEYWORDS);

        let featured = if doorbusters.is_empty() && best_sellers.is_empty() {
            products.iter().take(FEATURED_LIMIT).cloned().collect()
        } else {
            let mut seen: HashSet<ProductId> = HashSet::new();
            doorbusters
                .iter()
                .chain(&best_sellers)
                .filter(|p| seen.insert(p.id.clone()))
                .take(FEATURED_LIMIT)
                .cloned()
                .collect()
        };

        Self {
            products,
            doorbusters,
            best_sellers,
            new_arrivals,
            featured,
            refreshed_at,
        }
    }

    /// Whether no products are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Find a product by ID.
    #[must_use]
    pub fn product_by_id(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Products whose type equals `product_type`, ignoring case.
    #[must_use]
    pub fn products_of_type(&self, product_type: &str) -> Vec<&Product> {
        let wanted = product_type.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.product_type.to_lowercase() == wanted)
            .collect()
    }
}

/// Holder of the current catalog snapshot.
#[derive(Debug)]
pub struct CatalogStore {
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    page_size: u32,
    max_pages: u32,
}

impl CatalogStore {
    /// Create an empty store that fetches `page_size` products per page and
    /// at most `max_pages` pages.
    #[must_use]
    pub fn new(page_size: u32, max_pages: u32) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::default())),
            page_size,
            max_pages,
        }
    }

    /// The current snapshot. Cheap; holds no lock after returning.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the catalog with `products`, recomputing buckets.
    pub fn replace(&self, products: Vec<Product>) {
        let next = Arc::new(CatalogSnapshot::build(products, Some(Utc::now())));
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Fetch the full catalog and swap it in.
    ///
    /// Returns the number of products loaded.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the previous catalog is left untouched.
    #[instrument(skip(self, source))]
    pub async fn refresh<S: CatalogSource>(&self, source: &S) -> Result<usize, ShopifyError> {
        let products = match source.fetch_catalog(self.page_size, self.max_pages).await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(error = %e, "Catalog refresh failed, keeping previous catalog");
                return Err(e);
            }
        };

        let count = products.len();
        self.replace(products);
        tracing::info!(count, "Catalog refreshed");
        Ok(count)
    }

    /// Find a product by ID in the current snapshot.
    #[must_use]
    pub fn product_by_id(&self, id: &ProductId) -> Option<Product> {
        self.snapshot().product_by_id(id).cloned()
    }

    /// Products of a type in the current snapshot.
    #[must_use]
    pub fn products_of_type(&self, product_type: &str) -> Vec<Product> {
        self.snapshot()
            .products_of_type(product_type)
            .into_iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::test_support::product;

    fn tagged(id: &str, title: &str, tags: &[&str]) -> Product {
        let mut p = product(id, title, "10.00", None);
        p.tags = tags.iter().map(|t| (*t).to_owned()).collect();
        p
    }

    struct FakeSource {
        result: Mutex<Option<Result<Vec<Product>, ShopifyError>>>,
    }

    impl FakeSource {
        fn new(result: Result<Vec<Product>, ShopifyError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
            }
        }
    }

    impl CatalogSource for FakeSource {
        async fn fetch_catalog(
            &self,
            _page_size: u32,
            _max_pages: u32,
        ) -> Result<Vec<Product>, ShopifyError> {
            self.result.lock().unwrap().take().unwrap()
        }
    }

    #[test]
    fn test_buckets_match_case_insensitively() {
        let snapshot = CatalogSnapshot::build(
            vec![
                tagged("1", "Foam Cannon", &["DOORBUSTER"]),
                tagged("2", "Car Shampoo", &["Best-Seller"]),
                tagged("3", "Glass Cleaner", &["Just In"]),
                tagged("4", "Tire Shine", &["Weekly Deal", "Top Rated"]),
                tagged("5", "Air Freshener", &[]),
            ],
            None,
        );

        let ids = |products: &[Product]| -> Vec<String> {
            products.iter().map(|p| p.id.numeric_id().to_owned()).collect()
        };

        assert_eq!(ids(&snapshot.doorbusters), ["1", "4"]);
        assert_eq!(ids(&snapshot.best_sellers), ["2", "4"]);
        assert_eq!(ids(&snapshot.new_arrivals), ["3"]);
        // Tire Shine is in both buckets but featured once.
        assert_eq!(ids(&snapshot.featured), ["1", "4", "2"]);
    }

    #[test]
    fn test_product_type_counts_for_buckets() {
        let mut p = product("1", "Clay Bar Kit", "29.99", None);
        p.product_type = "Deal of the Day".to_owned();
        let snapshot = CatalogSnapshot::build(vec![p], None);
        assert_eq!(snapshot.doorbusters.len(), 1);
    }

    #[test]
    fn test_featured_falls_back_to_first_six() {
        let products: Vec<_> = (1..=8)
            .map(|i| tagged(&i.to_string(), &format!("Product {i}"), &["plain"]))
            .collect();
        let snapshot = CatalogSnapshot::build(products, None);

        assert_eq!(snapshot.featured.len(), FEATURED_LIMIT);
        assert_eq!(snapshot.featured.first().unwrap().title, "Product 1");
    }

    #[test]
    fn test_featured_is_capped() {
        let products: Vec<_> = (1..=9)
            .map(|i| tagged(&i.to_string(), &format!("Deal {i}"), &["doorbuster"]))
            .collect();
        let snapshot = CatalogSnapshot::build(products, None);
        assert_eq!(snapshot.featured.len(), FEATURED_LIMIT);
    }

    #[test]
    fn test_lookups() {
        let mut wax = product("1", "Premium Car Wax", "24.99", None);
        wax.product_type = "Wax".to_owned();
        let store = CatalogStore::new(20, 10);
        store.replace(vec![wax.clone(), product("2", "Wheel Cleaner", "19.99", None)]);

        assert_eq!(store.product_by_id(&wax.id), Some(wax));
        assert_eq!(store.products_of_type("wax").len(), 1);
        assert!(store.products_of_type("Soap").is_empty());
    }

    #[tokio::test]
    async fn test_refresh_replaces_catalog() {
        let store = CatalogStore::new(20, 10);
        let source = FakeSource::new(Ok(vec![tagged("1", "Foam Cannon", &["doorbuster"])]));

        let count = store.refresh(&source).await.unwrap();

        assert_eq!(count, 1);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.featured.len(), 1);
        assert!(snapshot.refreshed_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_catalog() {
        let store = CatalogStore::new(20, 10);
        store.replace(vec![product("1", "Premium Car Wax", "24.99", None)]);
        let before = store.snapshot();

        let source = FakeSource::new(Err(ShopifyError::RateLimited(3)));
        assert!(store.refresh(&source).await.is_err());

        let after = store.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.products.len(), 1);
    }
}
