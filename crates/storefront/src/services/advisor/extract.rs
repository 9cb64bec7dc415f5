//! Recommendation extraction from free-form model replies.
//!
//! The model is asked to end a recommending reply with a JSON block, but the
//! format is not guaranteed. The block is located with three strategies,
//! first hit wins:
//!
//! 1. a fenced block tagged `json`
//! 2. an untagged fenced block containing `recommendedProducts`
//! 3. a bare object found by brace counting from the first `{`, accepted
//!    only when the reply mentions `recommendedProducts` somewhere
//!
//! The brace counter does not understand string literals. A title or reason
//! containing an unbalanced `{` or `}` ends the scan in the wrong place and
//! the block fails to decode. That turn then simply has no recommendation.

use std::ops::Range;

use serde_json::{Map, Value};
use shine_core::Priority;

use crate::models::{ProductRecommendation, RecommendedProduct};

/// Key that marks a recommendation payload.
pub const RECOMMENDATION_MARKER: &str = "recommendedProducts";

/// Title used when an item names no product under any known key.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Reason used when an item gives none.
pub const DEFAULT_REASON: &str = "Recommended for your needs";

/// Keys a product title has been seen under, most preferred first.
const TITLE_KEYS: &[&str] = &[
    "productTitle",
    "product_title",
    "title",
    "name",
    "productName",
];

const TAGGED_FENCE: &str = "```json";
const UNTAGGED_FENCE: &str = "```\n";
const FENCE: &str = "```";

/// How a payload was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    TaggedFence,
    UntaggedFence,
    BraceScan,
}

/// A located payload.
#[derive(Debug)]
struct Located {
    strategy: Strategy,
    /// The JSON text.
    json: Range<usize>,
    /// The whole block, fences included.
    block: Range<usize>,
}

/// A model reply split into what is shown and what was recommended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub display_text: String,
    pub recommendation: Option<ProductRecommendation>,
}

/// Split a reply into display text and an optional recommendation.
#[must_use]
pub fn parse_reply(reply: &str) -> ParsedReply {
    ParsedReply {
        display_text: clean_display_text(reply),
        recommendation: extract_recommendation(reply),
    }
}

/// Find and decode the recommendation payload in a reply.
///
/// Returns `None` when there is no payload or the payload is not valid
/// JSON. Items are never built from a broken document.
#[must_use]
pub fn extract_recommendation(reply: &str) -> Option<ProductRecommendation> {
    let located = locate(reply)?;
    let json = reply.get(located.json)?.trim();

    match serde_json::from_str::<Value>(json) {
        Ok(value) => {
            let recommendation = decode_recommendation(&value);
            match &recommendation {
                Some(r) => tracing::debug!(
                    strategy = ?located.strategy,
                    products = r.recommended_products.len(),
                    "Extracted recommendation"
                ),
                None => tracing::debug!(
                    strategy = ?located.strategy,
                    "Payload has no recommendation list"
                ),
            }
            recommendation
        }
        Err(e) => {
            tracing::debug!(strategy = ?located.strategy, error = %e, "Malformed recommendation payload");
            None
        }
    }
}

/// The reply with its recommendation block removed, trimmed.
///
/// A located block is removed even if it fails to decode, so raw JSON is
/// never shown. A reply without a block is returned unchanged.
#[must_use]
pub fn clean_display_text(reply: &str) -> String {
    let Some(located) = locate(reply) else {
        return reply.to_owned();
    };

    if located.strategy == Strategy::BraceScan
        && !reply
            .get(located.block.clone())
            .is_some_and(|block| block.contains(RECOMMENDATION_MARKER))
    {
        return reply.to_owned();
    }

    let before = reply.get(..located.block.start).unwrap_or_default();
    let after = reply.get(located.block.end..).unwrap_or_default();
    format!("{before}{after}").trim().to_owned()
}

fn locate(reply: &str) -> Option<Located> {
    tagged_fence(reply)
        .or_else(|| untagged_fence(reply))
        .or_else(|| brace_scan(reply))
}

fn tagged_fence(reply: &str) -> Option<Located> {
    fenced(reply, TAGGED_FENCE, Strategy::TaggedFence)
}

fn untagged_fence(reply: &str) -> Option<Located> {
    fenced(reply, UNTAGGED_FENCE, Strategy::UntaggedFence).filter(|located| {
        reply
            .get(located.json.clone())
            .is_some_and(|json| json.contains(RECOMMENDATION_MARKER))
    })
}

/// Content between `opening` and the next closing fence.
fn fenced(reply: &str, opening: &str, strategy: Strategy) -> Option<Located> {
    let open = reply.find(opening)?;
    let content_start = open + opening.len();
    let close = content_start + reply.get(content_start..)?.find(FENCE)?;

    Some(Located {
        strategy,
        json: content_start..close,
        block: open..close + FENCE.len(),
    })
}

/// Depth-counting scan from the first `{`.
///
/// An object that never closes runs to the end of the reply.
fn brace_scan(reply: &str) -> Option<Located> {
    if !reply.contains(RECOMMENDATION_MARKER) {
        return None;
    }

    let start = reply.find('{')?;
    let mut depth = 0usize;
    let mut end = reply.len();

    for (offset, byte) in reply.bytes().enumerate().skip(start) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    end = offset + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    Some(Located {
        strategy: Strategy::BraceScan,
        json: start..end,
        block: start..end,
    })
}

fn decode_recommendation(value: &Value) -> Option<ProductRecommendation> {
    let object = value.as_object()?;
    let items = object.get(RECOMMENDATION_MARKER)?.as_array()?;

    let recommended_products = items
        .iter()
        .map(|item| item.as_object().map(decode_item))
        .collect::<Option<Vec<_>>>()?;

    Some(ProductRecommendation {
        recommended_products,
        reasoning: string_field(object, "reasoning"),
        customer_goal: string_field(object, "customerGoal"),
    })
}

fn decode_item(item: &Map<String, Value>) -> RecommendedProduct {
    let product_title = TITLE_KEYS
        .iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
        .unwrap_or(UNKNOWN_PRODUCT)
        .to_owned();

    let priority = item
        .get("priority")
        .and_then(decode_priority)
        .map_or_else(Priority::default, Priority::new);

    let reason = string_field(item, "reason").unwrap_or_else(|| DEFAULT_REASON.to_owned());

    RecommendedProduct {
        product_title,
        priority,
        reason,
    }
}

/// Accepts integers and integral floats; anything else, strings included,
/// is malformed.
#[allow(clippy::cast_possible_truncation)]
fn decode_priority(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 1e15)
            .map(|f| f as i64)
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_owned)
}
