//! Shopify customer API client (classic Storefront customer mutations).
//!
//! # Flow
//!
//! 1. `create_customer()` registers an account (does not sign in)
//! 2. `create_access_token()` exchanges email + password for a token with an
//!    absolute expiry
//! 3. `get_customer()` loads profile, addresses and recent orders for a token
//! 4. `recover_password()` asks Shopify to email a reset link
//!
//! Field-level problems (taken email, bad password) come back as
//! [`ShopifyError::UserError`] with one message per line.
//!
//! # Example
//!
//! ```rust,ignore
//! use shine_storefront::shopify::{CustomerClient, StorefrontClient};
//!
//! let client = CustomerClient::new(StorefrontClient::new(&config.shopify));
//! let token = client.create_access_token(&email, &password).await?;
//! let customer = client.get_customer(&token.access_token).await?;
//! ```

mod types;

pub use types::*;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use shine_core::Email;
use tracing::instrument;

use crate::services::session::CustomerBackend;
use crate::shopify::ShopifyError;
use crate::shopify::storefront::{StorefrontClient, queries};

/// Client for customer account operations.
///
/// Shares transport (endpoint, token, connection pool) with the
/// [`StorefrontClient`] it wraps.
#[derive(Debug, Clone)]
pub struct CustomerClient {
    storefront: StorefrontClient,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserErrorsOnly {
    #[serde(default)]
    customer_user_errors: Vec<CustomerUserError>,
}

fn check_user_errors(errors: &[CustomerUserError]) -> Result<(), ShopifyError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ShopifyError::UserError(join_user_errors(errors)))
    }
}

impl CustomerClient {
    /// Create a customer client on top of a storefront transport.
    #[must_use]
    pub const fn new(storefront: StorefrontClient) -> Self {
        Self { storefront }
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` if Shopify rejects the input, or
    /// another `ShopifyError` if the request fails.
    #[instrument(skip(self, password, first_name, last_name), fields(email = %email))]
    pub async fn create_customer(
        &self,
        email: &Email,
        password: &SecretString,
        first_name: Option<&str>,
        last_name: Option<&str>,
        accepts_marketing: bool,
    ) -> Result<CreatedCustomer, ShopifyError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            customer_create: Option<Payload>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            customer: Option<CreatedCustomer>,
            #[serde(default)]
            customer_user_errors: Vec<CustomerUserError>,
        }

        let variables = json!({
            "input": {
                "email": email.as_str(),
                "password": password.expose_secret(),
                "firstName": first_name,
                "lastName": last_name,
                "acceptsMarketing": accepts_marketing,
            }
        });

        let data: Response = self
            .storefront
            .execute(queries::CUSTOMER_CREATE, variables)
            .await?;

        let payload = data
            .customer_create
            .ok_or_else(|| ShopifyError::UserError("Failed to create account. Please try again.".to_owned()))?;
        check_user_errors(&payload.customer_user_errors)?;

        payload
            .customer
            .ok_or_else(|| ShopifyError::UserError("Failed to create account. Please try again.".to_owned()))
    }

    /// Exchange credentials for a customer access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` for wrong credentials, or another
    /// `ShopifyError` if the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn create_access_token(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<CustomerAccessToken, ShopifyError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            customer_access_token_create: Option<Payload>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            customer_access_token: Option<Token>,
            #[serde(default)]
            customer_user_errors: Vec<CustomerUserError>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Token {
            access_token: String,
            expires_at: String,
        }

        let variables = json!({
            "input": {
                "email": email.as_str(),
                "password": password.expose_secret(),
            }
        });

        let data: Response = self
            .storefront
            .execute(queries::CUSTOMER_ACCESS_TOKEN_CREATE, variables)
            .await?;

        let payload = data
            .customer_access_token_create
            .ok_or_else(|| ShopifyError::UserError("Invalid email or password.".to_owned()))?;
        check_user_errors(&payload.customer_user_errors)?;

        let token = payload
            .customer_access_token
            .ok_or_else(|| ShopifyError::UserError("Invalid email or password.".to_owned()))?;

        Ok(CustomerAccessToken {
            access_token: SecretString::from(token.access_token),
            expires_at: token.expires_at,
        })
    }

    /// Ask Shopify to send a password reset email.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` if Shopify rejects the address, or
    /// another `ShopifyError` if the request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn recover_password(&self, email: &Email) -> Result<(), ShopifyError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            customer_recover: Option<UserErrorsOnly>,
        }

        let data: Response = self
            .storefront
            .execute(queries::CUSTOMER_RECOVER, json!({ "email": email.as_str() }))
            .await?;

        match data.customer_recover {
            Some(payload) => check_user_errors(&payload.customer_user_errors),
            None => Ok(()),
        }
    }

    /// Load the customer for an access token.
    ///
    /// Returns `Ok(None)` when Shopify does not recognise the token (expired
    /// or revoked).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, access_token))]
    pub async fn get_customer(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<Customer>, ShopifyError> {
        #[derive(Deserialize)]
        struct Response {
            customer: Option<RawCustomer>,
        }

        let data: Response = self
            .storefront
            .execute(
                queries::GET_CUSTOMER,
                json!({ "customerAccessToken": access_token.expose_secret() }),
            )
            .await?;

        Ok(data.customer.map(Customer::from))
    }
}

impl CustomerBackend for CustomerClient {
    async fn create_customer(
        &self,
        email: &Email,
        password: &SecretString,
        first_name: Option<&str>,
        last_name: Option<&str>,
        accepts_marketing: bool,
    ) -> Result<CreatedCustomer, ShopifyError> {
        Self::create_customer(self, email, password, first_name, last_name, accepts_marketing)
            .await
    }

    async fn create_access_token(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<CustomerAccessToken, ShopifyError> {
        Self::create_access_token(self, email, password).await
    }

    async fn recover_password(&self, email: &Email) -> Result<(), ShopifyError> {
        Self::recover_password(self, email).await
    }

    async fn get_customer(
        &self,
        access_token: &SecretString,
    ) -> Result<Option<Customer>, ShopifyError> {
        Self::get_customer(self, access_token).await
    }
}
