//! Customer session and token lifecycle.
//!
//! ```text
//! SignedOut ──sign_in/sign_up──▶ Authenticating ──customer loaded──▶ SignedIn
//!     ▲                               │                                 │
//!     └────── rejected / failed ──────┘◀──── sign_out / token rejected ──┘
//! ```
//!
//! The access token and its expiry are kept in device storage. On startup
//! [`SessionStore::restore`] drops an expired token without touching the
//! network and otherwise re-fetches the customer with it.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use shine_core::{AuthState, Email, EmailError};
use thiserror::Error;
use tracing::instrument;

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::shopify::{CreatedCustomer, Customer, CustomerAccessToken, ShopifyError};
use crate::storage::{KeyValueStore, keys};

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The email address is malformed; nothing was sent.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Shopify refused the request. The message is shown to the shopper
    /// verbatim (one line per field error).
    #[error("{0}")]
    Rejected(String),

    /// The request did not complete.
    #[error("network error: {0}")]
    Network(#[source] ShopifyError),

    /// The operation needs a signed-in customer.
    #[error("not signed in")]
    SignedOut,
}

impl From<ShopifyError> for SessionError {
    fn from(err: ShopifyError) -> Self {
        match err {
            ShopifyError::UserError(message) | ShopifyError::Unauthorized(message) => {
                Self::Rejected(message)
            }
            other => Self::Network(other),
        }
    }
}

/// The customer account backend.
pub trait CustomerBackend: Send + Sync {
    /// Register an account.
    fn create_customer(
        &self,
        email: &Email,
        password: &SecretString,
        first_name: Option<&str>,
        last_name: Option<&str>,
        accepts_marketing: bool,
    ) -> impl Future<Output = Result<CreatedCustomer, ShopifyError>> + Send;

    /// Exchange credentials for an access token.
    fn create_access_token(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<CustomerAccessToken, ShopifyError>> + Send;

    /// Send a password reset email.
    fn recover_password(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<(), ShopifyError>> + Send;

    /// Load the customer for a token; `None` if the token is not accepted.
    fn get_customer(
        &self,
        access_token: &SecretString,
    ) -> impl Future<Output = Result<Option<Customer>, ShopifyError>> + Send;
}

/// Optional profile fields for sign-up.
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub accepts_marketing: bool,
}

/// Parse a token expiry timestamp (RFC 3339, with or without fractional
/// seconds).
#[must_use]
pub fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whether an expiry string lies before `now`.
///
/// An unreadable expiry is not treated as expired; the customer fetch that
/// follows decides whether the token still works.
#[must_use]
pub fn is_expired(value: &str, now: DateTime<Utc>) -> bool {
    parse_expiry(value).is_some_and(|expiry| expiry < now)
}

/// The customer session state container.
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    state: AuthState,
    customer: Option<Customer>,
    access_token: Option<SecretString>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .field("customer", &self.customer.as_ref().map(|c| &c.id))
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// A signed-out session backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            state: AuthState::SignedOut,
            customer: None,
            access_token: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> AuthState {
        self.state
    }

    /// Whether a customer is signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.state.is_signed_in()
    }

    /// The signed-in customer.
    #[must_use]
    pub const fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    /// Stored token expiry, as Shopify sent it.
    #[must_use]
    pub fn token_expiry(&self) -> Option<String> {
        self.read_key(keys::TOKEN_EXPIRY)
    }

    /// Resume a stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Network` if the customer could not be fetched;
    /// the stored token is kept for the next attempt.
    pub async fn restore<B: CustomerBackend>(
        &mut self,
        backend: &B,
    ) -> Result<AuthState, SessionError> {
        self.restore_at(backend, Utc::now()).await
    }

    /// [`restore`](Self::restore) with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`restore`](Self::restore).
    #[instrument(skip(self, backend))]
    pub async fn restore_at<B: CustomerBackend>(
        &mut self,
        backend: &B,
        now: DateTime<Utc>,
    ) -> Result<AuthState, SessionError> {
        let (Some(token), Some(expiry)) = (
            self.read_key(keys::ACCESS_TOKEN),
            self.read_key(keys::TOKEN_EXPIRY),
        ) else {
            return Ok(self.state);
        };

        if is_expired(&expiry, now) {
            tracing::info!(expiry = %expiry, "Stored customer token expired");
            self.sign_out();
            return Ok(self.state);
        }

        self.access_token = Some(SecretString::from(token));
        self.load_customer(backend).await
    }

    /// Sign in with email and password.
    ///
    /// A rejected attempt leaves any existing session as it was.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidEmail` before any request for a
    /// malformed address, `SessionError::Rejected` with Shopify's messages
    /// for bad credentials, or `SessionError::Network`.
    #[instrument(skip(self, backend, password))]
    pub async fn sign_in<B: CustomerBackend>(
        &mut self,
        backend: &B,
        email: &str,
        password: &SecretString,
    ) -> Result<&Customer, SessionError> {
        let email = Email::parse(email)?;
        let prior = self.state;
        self.sign_in_with(backend, &email, password, prior).await
    }

    /// Create an account, then sign in with it.
    ///
    /// # Errors
    ///
    /// As for [`sign_in`](Self::sign_in); account creation problems (email
    /// taken, weak password) come back as `SessionError::Rejected`.
    #[instrument(skip(self, backend, password, profile))]
    pub async fn sign_up<B: CustomerBackend>(
        &mut self,
        backend: &B,
        email: &str,
        password: &SecretString,
        profile: NewCustomer,
    ) -> Result<&Customer, SessionError> {
        let parsed = Email::parse(email)?;
        let prior = self.state;
        self.state = AuthState::Authenticating;

        let created = backend
            .create_customer(
                &parsed,
                password,
                profile.first_name.as_deref(),
                profile.last_name.as_deref(),
                profile.accepts_marketing,
            )
            .await;

        if let Err(e) = created {
            self.state = prior;
            return Err(e.into());
        }

        add_breadcrumb("auth", "Created account", None);
        self.sign_in_with(backend, &parsed, password, prior).await
    }

    /// Ask for a password reset email.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidEmail`, `SessionError::Rejected` or
    /// `SessionError::Network`.
    #[instrument(skip(self, backend))]
    pub async fn recover_password<B: CustomerBackend>(
        &self,
        backend: &B,
        email: &str,
    ) -> Result<(), SessionError> {
        let email = Email::parse(email)?;
        backend.recover_password(&email).await?;
        add_breadcrumb("auth", "Requested password reset", None);
        Ok(())
    }

    /// Re-fetch the signed-in customer's details.
    ///
    /// A no-op when there is no token. A token Shopify no longer accepts
    /// signs the session out.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Network` if the request fails.
    #[instrument(skip(self, backend))]
    pub async fn refresh_customer<B: CustomerBackend>(
        &mut self,
        backend: &B,
    ) -> Result<AuthState, SessionError> {
        if self.access_token.is_none() {
            if let Some(token) = self.read_key(keys::ACCESS_TOKEN) {
                self.access_token = Some(SecretString::from(token));
            } else {
                return Ok(self.state);
            }
        }
        self.load_customer(backend).await
    }

    /// Forget the customer and the stored token.
    pub fn sign_out(&mut self) {
        for key in [keys::ACCESS_TOKEN, keys::TOKEN_EXPIRY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove stored session value");
            }
        }

        if self.customer.is_some() {
            add_breadcrumb("auth", "Signed out", None);
        }

        self.customer = None;
        self.access_token = None;
        self.state = AuthState::SignedOut;
        clear_sentry_user();
    }

    async fn sign_in_with<B: CustomerBackend>(
        &mut self,
        backend: &B,
        email: &Email,
        password: &SecretString,
        prior: AuthState,
    ) -> Result<&Customer, SessionError> {
        self.state = AuthState::Authenticating;

        let token = match backend.create_access_token(email, password).await {
            Ok(token) => token,
            Err(e) => {
                self.state = prior;
                return Err(e.into());
            }
        };

        // The new token replaces whoever was signed in before.
        self.save_token(&token);
        self.access_token = Some(token.access_token);
        self.customer = None;

        match self.load_customer(backend).await? {
            AuthState::SignedIn => self
                .customer
                .as_ref()
                .ok_or_else(|| SessionError::Rejected("Invalid email or password.".to_owned())),
            _ => Err(SessionError::Rejected("Invalid email or password.".to_owned())),
        }
    }

    /// Fetch the customer with the held token and settle the state.
    async fn load_customer<B: CustomerBackend>(
        &mut self,
        backend: &B,
    ) -> Result<AuthState, SessionError> {
        let Some(token) = self.access_token.as_ref() else {
            return Ok(self.state);
        };

        let previous = self.state;
        self.state = AuthState::Authenticating;

        match backend.get_customer(token).await {
            Ok(Some(customer)) => {
                set_sentry_user(&customer.id, Some(&customer.email));
                add_breadcrumb("auth", "Signed in", None);
                self.customer = Some(customer);
                self.state = AuthState::SignedIn;
                Ok(self.state)
            }
            Ok(None) => {
                tracing::info!("Customer token rejected, signing out");
                self.sign_out();
                Ok(self.state)
            }
            Err(ShopifyError::Unauthorized(message)) => {
                tracing::info!(%message, "Customer token unauthorized, signing out");
                self.sign_out();
                Ok(self.state)
            }
            Err(e) => {
                // Keep the token; the next attempt may succeed.
                if previous.is_signed_in() && self.customer.is_some() {
                    self.state = AuthState::SignedIn;
                } else {
                    self.customer = None;
                    self.state = AuthState::SignedOut;
                }
                Err(SessionError::Network(e))
            }
        }
    }

    fn save_token(&self, token: &CustomerAccessToken) {
        use secrecy::ExposeSecret;

        let results = [
            self.store
                .set(keys::ACCESS_TOKEN, token.access_token.expose_secret()),
            self.store.set(keys::TOKEN_EXPIRY, &token.expires_at),
        ];
        for result in results {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to store customer token");
            }
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored session value");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeZone;
    use shine_core::CustomerId;

    use super::*;
    use crate::storage::MemoryStore;

    #[derive(Default)]
    struct FakeBackend {
        token_result: Mutex<Option<Result<CustomerAccessToken, ShopifyError>>>,
        create_result: Mutex<Option<Result<CreatedCustomer, ShopifyError>>>,
        customer_result: Mutex<Option<Result<Option<Customer>, ShopifyError>>>,
        customer_calls: AtomicUsize,
        token_calls: AtomicUsize,
        recover_calls: AtomicUsize,
    }

    impl FakeBackend {
        fn with_customer(result: Result<Option<Customer>, ShopifyError>) -> Self {
            let backend = Self::default();
            *backend.customer_result.lock().unwrap() = Some(result);
            backend
        }
    }

    impl CustomerBackend for FakeBackend {
        async fn create_customer(
            &self,
            _email: &Email,
            _password: &SecretString,
            _first_name: Option<&str>,
            _last_name: Option<&str>,
            _accepts_marketing: bool,
        ) -> Result<CreatedCustomer, ShopifyError> {
            self.create_result.lock().unwrap().take().unwrap()
        }

        async fn create_access_token(
            &self,
            _email: &Email,
            _password: &SecretString,
        ) -> Result<CustomerAccessToken, ShopifyError> {
            self.token_calls.fetch_add(1, Ordering::SeqCst);
            self.token_result.lock().unwrap().take().unwrap()
        }

        async fn recover_password(&self, _email: &Email) -> Result<(), ShopifyError> {
            self.recover_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn get_customer(
            &self,
            _access_token: &SecretString,
        ) -> Result<Option<Customer>, ShopifyError> {
            self.customer_calls.fetch_add(1, Ordering::SeqCst);
            self.customer_result.lock().unwrap().take().unwrap()
        }
    }

    fn customer() -> Customer {
        Customer {
            id: CustomerId::new("gid://shopify/Customer/1"),
            email: "sam@example.com".to_owned(),
            first_name: Some("Sam".to_owned()),
            last_name: None,
            phone: None,
            accepts_marketing: false,
            default_address: None,
            addresses: vec![],
            orders: vec![],
        }
    }

    fn token(expires_at: &str) -> CustomerAccessToken {
        CustomerAccessToken {
            access_token: SecretString::from("tok_123".to_owned()),
            expires_at: expires_at.to_owned(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn stored(expiry: &str) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::ACCESS_TOKEN, "tok_123").unwrap();
        store.set(keys::TOKEN_EXPIRY, expiry).unwrap();
        store
    }

    #[test]
    fn test_parse_expiry_formats() {
        assert!(parse_expiry("2025-06-02T12:00:00Z").is_some());
        assert!(parse_expiry("2025-06-02T12:00:00.123Z").is_some());
        assert!(parse_expiry("2025-06-02T12:00:00+02:00").is_some());
        assert!(parse_expiry("next tuesday").is_none());
    }

    #[test]
    fn test_is_expired() {
        assert!(is_expired("2025-05-31T12:00:00Z", now()));
        assert!(!is_expired("2025-06-02T12:00:00.500Z", now()));
        assert!(!is_expired("garbage", now()));
    }

    #[tokio::test]
    async fn test_restore_with_expired_token_makes_no_request() {
        let store = stored("2025-05-01T00:00:00Z");
        let backend = FakeBackend::default();
        let mut session = SessionStore::new(store.clone());

        let state = session.restore_at(&backend, now()).await.unwrap();

        assert_eq!(state, AuthState::SignedOut);
        assert_eq!(backend.customer_calls.load(Ordering::SeqCst), 0);
        assert!(store.get(keys::ACCESS_TOKEN).unwrap().is_none());
        assert!(store.get(keys::TOKEN_EXPIRY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_with_valid_token_signs_in() {
        let store = stored("2025-07-01T00:00:00.000Z");
        let backend = FakeBackend::with_customer(Ok(Some(customer())));
        let mut session = SessionStore::new(store);

        let state = session.restore_at(&backend, now()).await.unwrap();

        assert_eq!(state, AuthState::SignedIn);
        assert_eq!(session.customer().unwrap().display_name(), "Sam");
    }

    #[tokio::test]
    async fn test_restore_with_rejected_token_signs_out() {
        let store = stored("2025-07-01T00:00:00Z");
        let backend = FakeBackend::with_customer(Ok(None));
        let mut session = SessionStore::new(store.clone());

        let state = session.restore_at(&backend, now()).await.unwrap();

        assert_eq!(state, AuthState::SignedOut);
        assert!(store.get(keys::ACCESS_TOKEN).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_network_failure_keeps_token() {
        let store = stored("2025-07-01T00:00:00Z");
        let backend = FakeBackend::with_customer(Err(ShopifyError::RateLimited(1)));
        let mut session = SessionStore::new(store.clone());

        let err = session.restore_at(&backend, now()).await.unwrap_err();

        assert!(matches!(err, SessionError::Network(_)));
        assert_eq!(session.state(), AuthState::SignedOut);
        assert!(store.get(keys::ACCESS_TOKEN).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_restore_without_stored_token() {
        let backend = FakeBackend::default();
        let mut session = SessionStore::new(Arc::new(MemoryStore::new()));

        let state = session.restore_at(&backend, now()).await.unwrap();

        assert_eq!(state, AuthState::SignedOut);
        assert_eq!(backend.customer_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sign_in_stores_token() {
        let store = Arc::new(MemoryStore::new());
        let backend = FakeBackend::with_customer(Ok(Some(customer())));
        *backend.token_result.lock().unwrap() = Some(Ok(token("2025-07-01T00:00:00Z")));
        let mut session = SessionStore::new(store.clone());

        let signed_in = session
            .sign_in(&backend, " sam@example.com ", &SecretString::from("pw".to_owned()))
            .await
            .unwrap();

        assert_eq!(signed_in.email, "sam@example.com");
        assert!(session.is_signed_in());
        assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok_123"));
        assert_eq!(
            session.token_expiry().as_deref(),
            Some("2025-07-01T00:00:00Z")
        );
    }

    #[tokio::test]
    async fn test_sign_in_user_errors_are_passed_through() {
        let backend = FakeBackend::default();
        *backend.token_result.lock().unwrap() = Some(Err(ShopifyError::UserError(
            "Unidentified customer".to_owned(),
        )));
        let mut session = SessionStore::new(Arc::new(MemoryStore::new()));

        let err = session
            .sign_in(&backend, "sam@example.com", &SecretString::from("bad".to_owned()))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Rejected(ref m) if m == "Unidentified customer"));
        assert_eq!(session.state(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_invalid_email_sends_nothing() {
        let backend = FakeBackend::default();
        let mut session = SessionStore::new(Arc::new(MemoryStore::new()));

        let err = session
            .sign_in(&backend, "not-an-email", &SecretString::from("pw".to_owned()))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::InvalidEmail(_)));
        assert_eq!(backend.token_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sign_up_chains_into_sign_in() {
        let backend = FakeBackend::with_customer(Ok(Some(customer())));
        *backend.create_result.lock().unwrap() = Some(Ok(CreatedCustomer {
            id: CustomerId::new("gid://shopify/Customer/1"),
            email: Some("sam@example.com".to_owned()),
            first_name: Some("Sam".to_owned()),
            last_name: None,
        }));
        *backend.token_result.lock().unwrap() = Some(Ok(token("2025-07-01T00:00:00Z")));
        let mut session = SessionStore::new(Arc::new(MemoryStore::new()));

        session
            .sign_up(
                &backend,
                "sam@example.com",
                &SecretString::from("pw".to_owned()),
                NewCustomer {
                    first_name: Some("Sam".to_owned()),
                    ..NewCustomer::default()
                },
            )
            .await
            .unwrap();

        assert!(session.is_signed_in());
        assert_eq!(backend.token_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sign_up_rejected_does_not_sign_in() {
        let backend = FakeBackend::default();
        *backend.create_result.lock().unwrap() = Some(Err(ShopifyError::UserError(
            "Email has already been taken".to_owned(),
        )));
        let mut session = SessionStore::new(Arc::new(MemoryStore::new()));

        let err = session
            .sign_up(
                &backend,
                "sam@example.com",
                &SecretString::from("pw".to_owned()),
                NewCustomer::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Email has already been taken");
        assert_eq!(backend.token_calls.load(Ordering::SeqCst), 0);
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_existing_session() {
        let store = stored("2025-07-01T00:00:00Z");
        let backend = FakeBackend::with_customer(Ok(Some(customer())));
        let mut session = SessionStore::new(store.clone());
        session.restore_at(&backend, now()).await.unwrap();

        *backend.token_result.lock().unwrap() = Some(Err(ShopifyError::UserError(
            "Unidentified customer".to_owned(),
        )));
        let err = session
            .sign_in(&backend, "other@example.com", &SecretString::from("bad".to_owned()))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Rejected(_)));
        assert_eq!(session.state(), AuthState::SignedIn);
        assert_eq!(session.customer().unwrap().email, "sam@example.com");
        assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok_123"));
    }

    #[tokio::test]
    async fn test_sign_in_network_failure_drops_previous_customer() {
        let store = stored("2025-07-01T00:00:00Z");
        let backend = FakeBackend::with_customer(Ok(Some(customer())));
        let mut session = SessionStore::new(store);
        session.restore_at(&backend, now()).await.unwrap();

        *backend.token_result.lock().unwrap() = Some(Ok(token("2025-08-01T00:00:00Z")));
        *backend.customer_result.lock().unwrap() = Some(Err(ShopifyError::RateLimited(2)));
        let err = session
            .sign_in(&backend, "other@example.com", &SecretString::from("pw".to_owned()))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Network(_)));
        assert_eq!(session.state(), AuthState::SignedOut);
        assert!(session.customer().is_none());
    }

    #[tokio::test]
    async fn test_rejected_sign_up_keeps_existing_session() {
        let store = stored("2025-07-01T00:00:00Z");
        let backend = FakeBackend::with_customer(Ok(Some(customer())));
        let mut session = SessionStore::new(store);
        session.restore_at(&backend, now()).await.unwrap();

        *backend.create_result.lock().unwrap() = Some(Err(ShopifyError::UserError(
            "Email has already been taken".to_owned(),
        )));
        session
            .sign_up(
                &backend,
                "sam@example.com",
                &SecretString::from("pw".to_owned()),
                NewCustomer::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(session.state(), AuthState::SignedIn);
        assert!(session.customer().is_some());
    }

    #[tokio::test]
    async fn test_recover_password() {
        let backend = FakeBackend::default();
        let session = SessionStore::new(Arc::new(MemoryStore::new()));

        session
            .recover_password(&backend, "sam@example.com")
            .await
            .unwrap();
        assert_eq!(backend.recover_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_when_signed_out_is_noop() {
        let backend = FakeBackend::default();
        let mut session = SessionStore::new(Arc::new(MemoryStore::new()));

        let state = session.refresh_customer(&backend).await.unwrap();

        assert_eq!(state, AuthState::SignedOut);
        assert_eq!(backend.customer_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_with_revoked_token_signs_out() {
        let store = stored("2025-07-01T00:00:00Z");
        let backend = FakeBackend::with_customer(Ok(Some(customer())));
        let mut session = SessionStore::new(store);
        session.restore_at(&backend, now()).await.unwrap();
        assert!(session.is_signed_in());

        *backend.customer_result.lock().unwrap() = Some(Ok(None));
        let state = session.refresh_customer(&backend).await.unwrap();

        assert_eq!(state, AuthState::SignedOut);
        assert!(session.customer().is_none());
    }

    #[test]
    fn test_sign_out_clears_storage() {
        let store = stored("2025-07-01T00:00:00Z");
        let mut session = SessionStore::new(store.clone());

        session.sign_out();

        assert!(store.is_empty());
        assert_eq!(session.state(), AuthState::SignedOut);
    }
}
