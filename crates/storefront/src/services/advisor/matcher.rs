//! Resolving recommended titles to catalog products.

use std::collections::HashMap;

use crate::models::{ProductRecommendation, ResolvedRecommendation};
use crate::shopify::Product;

/// Find the catalog product a recommended title refers to.
///
/// An exact case-insensitive title match wins. Otherwise the first product,
/// in catalog order, whose title contains the recommended text or is
/// contained in it. Blank titles never match.
#[must_use]
pub fn find_match<'a>(title: &str, catalog: &'a [Product]) -> Option<&'a Product> {
    let wanted = title.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    let lowered: Vec<String> = catalog.iter().map(|p| p.title.to_lowercase()).collect();

    let exact = lowered.iter().position(|candidate| *candidate == wanted);
    let position = exact.or_else(|| {
        lowered.iter().position(|candidate| {
            !candidate.is_empty()
                && (candidate.contains(&wanted) || wanted.contains(candidate.as_str()))
        })
    });

    position.and_then(|i| catalog.get(i))
}

/// Map each recommended title, lowercased, to its catalog product.
///
/// Titles with no match are absent from the map.
#[must_use]
pub fn match_all(
    recommendation: &ProductRecommendation,
    catalog: &[Product],
) -> HashMap<String, Product> {
    recommendation
        .recommended_products
        .iter()
        .filter_map(|item| {
            find_match(&item.product_title, catalog)
                .map(|product| (item.product_title.to_lowercase(), product.clone()))
        })
        .collect()
}

/// Pair every recommended item, in priority order, with its product.
///
/// Unmatched items are kept with no product.
#[must_use]
pub fn resolve(
    recommendation: &ProductRecommendation,
    catalog: &[Product],
) -> Vec<ResolvedRecommendation> {
    let matches = match_all(recommendation, catalog);

    let resolved: Vec<ResolvedRecommendation> = recommendation
        .sorted_by_priority()
        .into_iter()
        .map(|item| {
            let product = matches.get(&item.product_title.to_lowercase()).cloned();
            ResolvedRecommendation { item, product }
        })
        .collect();

    let unmatched = resolved.iter().filter(|r| !r.is_available()).count();
    if unmatched > 0 {
        tracing::debug!(
            unmatched,
            total = resolved.len(),
            "Some recommended products are not in the catalog"
        );
    }

    resolved
}
