//! Customer account commands.
//!
//! Passwords are read from the first line of stdin so they never appear in
//! shell history or the process list.

use std::io::{BufRead, Write as _};

use secrecy::SecretString;
use shine_storefront::error::AppError;
use shine_storefront::services::session::NewCustomer;
use shine_storefront::shopify::Customer;
use shine_storefront::state::AppState;

/// Sign in and show the customer.
pub async fn login(state: &AppState, email: &str) -> Result<(), AppError> {
    let password = read_password()?;
    let mut session = state.session().await;

    let customer = session.sign_in(state.customers(), email, &password).await?;
    println!("Welcome back, {}!", customer.display_name());
    Ok(())
}

/// Create an account, then sign in with it.
pub async fn signup(
    state: &AppState,
    email: &str,
    first_name: Option<String>,
    last_name: Option<String>,
    accepts_marketing: bool,
) -> Result<(), AppError> {
    let password = read_password()?;
    let profile = NewCustomer {
        first_name,
        last_name,
        accepts_marketing,
    };
    let mut session = state.session().await;

    let customer = session
        .sign_up(state.customers(), email, &password, profile)
        .await?;
    println!("Welcome, {}! Your account is ready.", customer.display_name());
    Ok(())
}

/// Email a password reset link.
pub async fn recover(state: &AppState, email: &str) -> Result<(), AppError> {
    state
        .session()
        .await
        .recover_password(state.customers(), email)
        .await?;
    println!("If an account exists for {email}, a reset link is on its way.");
    Ok(())
}

/// Sign out.
pub async fn logout(state: &AppState) {
    state.session().await.sign_out();
    println!("Signed out.");
}

/// Restore the stored session and show the customer.
pub async fn whoami(state: &AppState) -> Result<(), AppError> {
    state.restore_session().await?;

    let session = state.session().await;
    match session.customer() {
        Some(customer) => print_customer(customer, session.token_expiry().as_deref()),
        None => println!("Not signed in."),
    }
    Ok(())
}

fn print_customer(customer: &Customer, expiry: Option<&str>) {
    println!("{} [{}]", customer.display_name(), customer.initials());
    println!("  {}", customer.email);
    if let Some(phone) = &customer.phone {
        println!("  {phone}");
    }
    if let Some(address) = &customer.default_address {
        println!();
        for line in address.formatted().lines() {
            println!("  {line}");
        }
    }

    if !customer.orders.is_empty() {
        println!();
        println!("Recent orders:");
        for order in &customer.orders {
            let total = order
                .total_price
                .map(|p| p.display())
                .unwrap_or_default();
            println!(
                "  {}  {}  {} items  {total}",
                order.formatted_order_number(),
                order.status_display(),
                order.item_count()
            );
        }
    }

    if let Some(expiry) = expiry {
        println!();
        println!("Session valid until {expiry}");
    }
}

fn read_password() -> Result<SecretString, AppError> {
    eprint!("Password: ");
    let _ = std::io::stderr().flush();

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| AppError::Storage(e.into()))?;

    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_owned()))
}
