//! Shine advisor commands.

use std::io::Write as _;

use shine_storefront::error::AppError;
use shine_storefront::services::advisor::QUICK_QUESTIONS;
use shine_storefront::services::cart::CartEngine;
use shine_storefront::state::{AdvisorTurn, AppState};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Ask one question and print the reply.
pub async fn ask(state: &AppState, question: &str) -> Result<(), AppError> {
    load_catalog(state).await;

    if let Some(turn) = state.ask(question).await? {
        print_turn(&turn);
    }
    Ok(())
}

/// Interactive conversation on stdin.
///
/// `/add N` adds recommended item N to the cart, `/reset` starts over and
/// `/quit` leaves.
pub async fn chat(state: &AppState) {
    load_catalog(state).await;

    if let Some(greeting) = state.advisor().await.last_message() {
        println!("advisor> {}", greeting.content);
    }
    println!();
    println!("Try one of these, or type your own question:");
    for (n, question) in QUICK_QUESTIONS.iter().enumerate() {
        println!("  /q{}  {}", n + 1, question.title);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_turn: Option<AdvisorTurn> = None;

    loop {
        print!("you> ");
        let _ = std::io::stdout().flush();

        let Ok(Some(line)) = lines.next_line().await else {
            break;
        };
        let line = line.trim();

        match line {
            "" => {}
            "/quit" | "/exit" => break,
            "/reset" => {
                state.advisor().await.reset();
                last_turn = None;
                println!("advisor> Let's start over. What are you working on?");
            }
            _ if line.starts_with("/add ") => {
                let mut cart = state.cart().await;
                println!(
                    "{}",
                    add_recommended(&mut cart, last_turn.as_ref(), line.trim_start_matches("/add "))
                );
            }
            _ if line.starts_with("/q") => {
                let question = line
                    .trim_start_matches("/q")
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| QUICK_QUESTIONS.get(i));
                match question {
                    Some(q) => {
                        println!("you> {}", q.prompt);
                        last_turn = send(state, q.prompt).await.or(last_turn);
                    }
                    None => println!("Pick a quick question between /q1 and /q{}.", QUICK_QUESTIONS.len()),
                }
            }
            text => last_turn = send(state, text).await.or(last_turn),
        }
    }
}

async fn send(state: &AppState, text: &str) -> Option<AdvisorTurn> {
    match state.ask(text).await {
        Ok(Some(turn)) => {
            print_turn(&turn);
            Some(turn)
        }
        Ok(None) => None,
        Err(e) => {
            e.report();
            if let Some(apology) = state.advisor().await.last_message() {
                println!("advisor> {}", apology.content);
            }
            None
        }
    }
}

/// Add recommended item `choice` (1-based) from the last turn to the cart
/// and return the line to show. Failures are reported, never returned, so
/// the conversation keeps going.
fn add_recommended(cart: &mut CartEngine, turn: Option<&AdvisorTurn>, choice: &str) -> String {
    let item = choice
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| turn.and_then(|t| t.resolved.get(i)));

    let Some(item) = item else {
        return format!("No recommended item {}.", choice.trim());
    };

    let Some(product) = &item.product else {
        return format!("{} isn't available to add to the cart.", item.item.product_title);
    };

    match cart.add_to_cart(product, None) {
        Ok(_) => format!("Added {} to your cart.", product.title),
        Err(e) => {
            let e = AppError::from(e);
            e.report();
            e.user_message()
        }
    }
}

/// The advisor answers from the catalog, so load it first. A failed load
/// still lets the conversation run; the prompt then says nothing is loaded.
async fn load_catalog(state: &AppState) {
    if let Err(e) = state.refresh_catalog().await {
        e.report();
        eprintln!("{}", e.user_message());
    }
}

fn print_turn(turn: &AdvisorTurn) {
    println!("advisor> {}", turn.message.content);

    let Some(recommendation) = &turn.message.recommendation else {
        return;
    };

    println!();
    if let Some(goal) = &recommendation.customer_goal {
        println!("  Goal: {goal}");
    }
    for (n, resolved) in turn.resolved.iter().enumerate() {
        let availability = match &resolved.product {
            Some(product) => product
                .price()
                .map_or_else(String::new, |p| format!("  {p}")),
            None => "  (not available to add to cart)".to_owned(),
        };
        println!(
            "  {}. [{}] {}{availability}",
            n + 1,
            resolved.item.priority.label(),
            resolved.item.product_title
        );
        println!("       {}", resolved.item.reason);
    }
    if let Some(reasoning) = &recommendation.reasoning {
        println!("  {reasoning}");
    }
    println!();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use shine_core::{MessageRole, Priority, ProductId};
    use shine_storefront::models::{ChatMessage, RecommendedProduct, ResolvedRecommendation};
    use shine_storefront::services::cart::CartPricing;
    use shine_storefront::shopify::Product;
    use shine_storefront::storage::MemoryStore;

    use super::*;

    fn turn_with(product: Option<Product>) -> AdvisorTurn {
        AdvisorTurn {
            message: ChatMessage::new(MessageRole::Assistant, "Try this."),
            resolved: vec![ResolvedRecommendation {
                item: RecommendedProduct {
                    product_title: "Foam Cannon".to_owned(),
                    priority: Priority::new(1),
                    reason: "Pre-wash".to_owned(),
                },
                product,
            }],
        }
    }

    fn cart() -> CartEngine {
        CartEngine::load(Arc::new(MemoryStore::new()), CartPricing::default())
    }

    #[test]
    fn test_add_without_variants_reports_and_continues() {
        let product = Product {
            id: ProductId::new("gid://shopify/Product/11"),
            title: "Foam Cannon".to_owned(),
            description: String::new(),
            description_html: String::new(),
            vendor: "Shine".to_owned(),
            product_type: "Tools".to_owned(),
            tags: vec![],
            variants: vec![],
            images: vec![],
        };
        let turn = turn_with(Some(product));
        let mut cart = cart();

        let line = add_recommended(&mut cart, Some(&turn), "1");

        assert_eq!(line, "That item can't be added to your cart.");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_unknown_or_unmatched_item() {
        let turn = turn_with(None);
        let mut cart = cart();

        assert_eq!(
            add_recommended(&mut cart, Some(&turn), "1"),
            "Foam Cannon isn't available to add to the cart."
        );
        assert_eq!(add_recommended(&mut cart, Some(&turn), "4"), "No recommended item 4.");
        assert_eq!(add_recommended(&mut cart, None, " 1 "), "No recommended item 1.");
    }
}
