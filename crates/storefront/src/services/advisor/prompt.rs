//! Grounding prompt construction.
//!
//! The model only sees products through the text built here, so everything
//! is a pure function of the catalog snapshot: the same catalog always
//! produces the same prompt.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::shopify::Product;

/// Maximum description length, in characters, before truncation.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Sent in place of the product list when the catalog is empty.
pub const EMPTY_CATALOG_NOTICE: &str = "No products currently loaded. Please ask the customer to refresh the app or check back later.";

const PRODUCT_SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
];

/// Reduce a product description to plain, bounded text.
///
/// Tags become spaces, common entities are decoded, whitespace runs are
/// collapsed, and anything over [`MAX_DESCRIPTION_CHARS`] is cut with a
/// trailing `...`.
#[must_use]
pub fn sanitize_description(description: &str) -> String {
    let mut cleaned = HTML_TAG_RE.replace_all(description, " ").into_owned();

    for (entity, replacement) in HTML_ENTITIES {
        cleaned = cleaned.replace(entity, replacement);
    }

    let cleaned = WHITESPACE_RE.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() > MAX_DESCRIPTION_CHARS {
        let mut truncated: String = cleaned.chars().take(MAX_DESCRIPTION_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        cleaned.to_owned()
    }
}

/// Render the catalog section of the system prompt.
#[must_use]
pub fn build_grounding_document(products: &[Product]) -> String {
    if products.is_empty() {
        return EMPTY_CATALOG_NOTICE.to_owned();
    }

    let mut doc = String::from("AVAILABLE PRODUCTS IN OUR CATALOG:\n\n");
    for product in products {
        write_product(&mut doc, product);
    }
    doc
}

fn write_product(doc: &mut String, product: &Product) {
    // Writing to a String cannot fail.
    let _ = writeln!(doc, "{PRODUCT_SEPARATOR}");
    let _ = writeln!(doc, "PRODUCT: {}", product.title);

    if let Some(price) = product.price() {
        let _ = write!(doc, "Price: {price}");
        if product.is_on_sale()
            && let Some(compare_at) = product.compare_at_price()
        {
            let _ = write!(doc, " (Was: {compare_at} - ON SALE)");
        }
        doc.push('\n');
    }

    if !product.product_type.is_empty() {
        let _ = writeln!(doc, "Type: {}", product.product_type);
    }
    if !product.tags.is_empty() {
        let _ = writeln!(doc, "Tags: {}", product.tags.join(", "));
    }

    let source = if product.description.trim().is_empty() {
        &product.description_html
    } else {
        &product.description
    };
    let description = sanitize_description(source);
    if !description.is_empty() {
        let _ = writeln!(doc, "Description: {description}");
    }

    doc.push('\n');
}

/// The full system prompt: persona and rules around the grounding document.
#[must_use]
pub fn build_system_prompt(products: &[Product]) -> String {
    let catalog = build_grounding_document(products);

    format!(
        r#"You are a knowledgeable and friendly employee at a car detailing supply store, helping customers choose the best products for their needs.

YOUR CAPABILITIES:
- Read and understand product titles, descriptions, tags, and types
- Cross-reference products by their tags (for example: wheel_cleaner, acid_free, ceramic_safe, ph_neutral, interior, exterior)
- Match customer needs to the most appropriate products in our catalog

YOUR JOB:
1. Answer product questions clearly and politely
2. Suggest the products whose tags and descriptions best fit the customer's needs
3. If needed, ask ONE short clarifying question before recommending (wheel type, paint condition, interior material)
4. Explain in simple terms WHY each product is recommended
5. ONLY recommend products from the catalog below; never invent products
6. If nothing is a perfect fit, say so honestly and offer the closest available options

CONVERSATION STYLE:
- Helpful and conversational, like a real employee
- Complete sentences with proper grammar
- Concise but informative (2-3 sentences)
- No filler phrases

CLARIFYING QUESTIONS:
If the customer mentions SEVERAL things (such as wheels AND tires), cover all of them in ONE question.
- Wheels: "What type of wheels do you have, stock/OEM or aftermarket?"
- Tires: "Do you prefer a glossy wet look or a more natural matte finish?"
- Interior: "What material are we working with: leather, fabric, vinyl, or plastic?"
- Paint correction: "What's the main issue: swirl marks, light scratches, or heavy oxidation?"
- Protection: "Are you after easy maintenance or maximum durability?"

MATCHING PRODUCTS:
Use product TAGS and DESCRIPTIONS:
- "aftermarket wheels" -> products tagged "safe for all wheels", "ph neutral", "acid free"
- "leather interior" -> products tagged "leather", "interior"
- "matte tire finish" -> products tagged "matte", "natural", "satin"
- "glossy tires" -> products tagged "glossy", "wet look", "shine"
- "ceramic coated car" -> products tagged "ceramic safe", "ph neutral"

{catalog}

WHEN RECOMMENDING PRODUCTS:
Give a brief explanation, then include a JSON block with your recommendations.

Example response:
"For your aftermarket wheels I'd suggest a pH-neutral cleaner that is safe on every finish. For the matte tire look, our natural tire dressing leaves a clean, non-greasy appearance."

```json
{{
  "recommendedProducts": [
    {{
      "productTitle": "EXACT Product Title From Catalog",
      "priority": 1,
      "reason": "pH-neutral formula safe for aftermarket wheels"
    }},
    {{
      "productTitle": "EXACT Product Title From Catalog",
      "priority": 2,
      "reason": "Natural matte finish without greasy residue"
    }}
  ],
  "reasoning": "Why these products work together",
  "customerGoal": "Clean aftermarket wheels and get a matte tire finish"
}}
```

Priority levels: 1 = must-have for their goal, 2 = recommended addition, 3 = nice-to-have optional

IF NO MATCH EXISTS:
Be honest: "I don't have an exact match for that in our current catalog, but the closest option would be [product] because [reason].""#
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::product;

    #[test]
    fn test_sanitize_strips_tags_and_entities() {
        let html = "<p>Safe on&nbsp;<strong>all</strong> wheels &amp; tires.</p>\n\n<p>Won&#39;t stain &quot;chrome&quot; &lt;ever&gt; &apos;ok&apos;</p>";
        assert_eq!(
            sanitize_description(html),
            "Safe on all wheels & tires. Won't stain \"chrome\" <ever> 'ok'"
        );
    }

    #[test]
    fn test_sanitize_truncates_long_text() {
        let long = "a".repeat(MAX_DESCRIPTION_CHARS + 20);
        let cleaned = sanitize_description(&long);
        assert_eq!(cleaned.chars().count(), MAX_DESCRIPTION_CHARS + 3);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let long = "é".repeat(MAX_DESCRIPTION_CHARS + 1);
        let cleaned = sanitize_description(&long);
        assert_eq!(cleaned.chars().count(), MAX_DESCRIPTION_CHARS + 3);
    }

    #[test]
    fn test_sanitize_keeps_short_text() {
        assert_eq!(sanitize_description("  Just   wax.  "), "Just wax.");
        assert_eq!(sanitize_description(""), "");
    }

    #[test]
    fn test_empty_catalog_notice() {
        assert_eq!(build_grounding_document(&[]), EMPTY_CATALOG_NOTICE);
        assert!(build_system_prompt(&[]).contains(EMPTY_CATALOG_NOTICE));
    }

    #[test]
    fn test_grounding_document_lists_product_details() {
        let mut wax = product("1", "Premium Car Wax", "24.99", Some("29.99"));
        wax.product_type = "Wax".to_owned();
        wax.tags = vec!["exterior".to_owned(), "carnauba".to_owned()];
        wax.description_html = "<p>Deep, wet shine.</p>".to_owned();

        let doc = build_grounding_document(&[wax, product("2", "Wheel Cleaner", "19.99", None)]);

        assert!(doc.starts_with("AVAILABLE PRODUCTS IN OUR CATALOG:"));
        assert!(doc.contains("PRODUCT: Premium Car Wax\n"));
        assert!(doc.contains("Price: $24.99 (Was: $29.99 - ON SALE)\n"));
        assert!(doc.contains("Type: Wax\n"));
        assert!(doc.contains("Tags: exterior, carnauba\n"));
        assert!(doc.contains("Description: Deep, wet shine.\n"));
        assert!(doc.contains("PRODUCT: Wheel Cleaner\nPrice: $19.99\n"));
    }

    #[test]
    fn test_compare_at_below_price_is_not_on_sale() {
        let doc = build_grounding_document(&[product("1", "Clay Bar", "20.00", Some("15.00"))]);
        assert!(!doc.contains("ON SALE"));
    }

    #[test]
    fn test_grounding_document_is_deterministic() {
        let products = vec![
            product("1", "Premium Car Wax", "24.99", None),
            product("2", "Wheel Cleaner", "19.99", None),
        ];
        assert_eq!(
            build_grounding_document(&products),
            build_grounding_document(&products)
        );
    }

    #[test]
    fn test_system_prompt_embeds_catalog_and_format() {
        let prompt = build_system_prompt(&[product("1", "Premium Car Wax", "24.99", None)]);
        assert!(prompt.contains("PRODUCT: Premium Car Wax"));
        assert!(prompt.contains("\"recommendedProducts\": ["));
        assert!(prompt.contains("Priority levels: 1 = must-have"));
    }
}
