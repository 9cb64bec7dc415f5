//! Application state shared across front-end handlers.

use std::sync::Arc;

use shine_core::AuthState;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::models::{ChatMessage, ResolvedRecommendation};
use crate::openai::OpenAiClient;
use crate::services::advisor::{self, AdvisorSession};
use crate::services::cart::{CartEngine, CartPricing};
use crate::services::catalog::CatalogStore;
use crate::services::session::SessionStore;
use crate::shopify::{CustomerClient, StorefrontClient};
use crate::storage::{FileStore, KeyValueStore};

/// One advisor turn, with its recommendations resolved against the catalog.
#[derive(Debug, Clone)]
pub struct AdvisorTurn {
    pub message: ChatMessage,
    /// Recommended items in priority order, matched or not.
    pub resolved: Vec<ResolvedRecommendation>,
}

/// Application state: one of each client and store.
///
/// Cheaply cloneable via `Arc`. Each mutable store sits behind its own
/// async mutex so mutations are serialized per store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storefront: StorefrontClient,
    customers: CustomerClient,
    openai: OpenAiClient,
    catalog: CatalogStore,
    cart: Mutex<CartEngine>,
    session: Mutex<SessionStore>,
    advisor: Mutex<AdvisorSession>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create the application state, with device storage in
    /// `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the chat
    /// client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.data_dir)?);
        let storefront = StorefrontClient::new(&config.shopify);
        let openai = OpenAiClient::new(&config.openai)?;
        Ok(Self::from_parts(config, store, storefront, openai))
    }

    /// Assemble the state from already-built parts.
    #[must_use]
    pub fn from_parts(
        config: StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
        storefront: StorefrontClient,
        openai: OpenAiClient,
    ) -> Self {
        let catalog = CatalogStore::new(config.catalog_page_size, config.catalog_max_pages);
        let cart = CartEngine::load(Arc::clone(&store), CartPricing::default());
        let session = SessionStore::new(store);
        let customers = CustomerClient::new(storefront.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storefront,
                customers,
                openai,
                catalog,
                cart: Mutex::new(cart),
                session: Mutex::new(session),
                advisor: Mutex::new(AdvisorSession::new()),
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Get a reference to the customer account client.
    #[must_use]
    pub fn customers(&self) -> &CustomerClient {
        &self.inner.customers
    }

    /// Get a reference to the chat completions client.
    #[must_use]
    pub fn openai(&self) -> &OpenAiClient {
        &self.inner.openai
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    /// Lock the cart.
    pub async fn cart(&self) -> MutexGuard<'_, CartEngine> {
        self.inner.cart.lock().await
    }

    /// Lock the customer session.
    pub async fn session(&self) -> MutexGuard<'_, SessionStore> {
        self.inner.session.lock().await
    }

    /// Lock the advisor conversation.
    pub async fn advisor(&self) -> MutexGuard<'_, AdvisorSession> {
        self.inner.advisor.lock().await
    }

    /// Fetch the catalog from Shopify.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the previous catalog is kept.
    pub async fn refresh_catalog(&self) -> Result<usize> {
        Ok(self.inner.catalog.refresh(&self.inner.storefront).await?)
    }

    /// Resume the stored customer session, if it has not expired.
    ///
    /// # Errors
    ///
    /// Returns a session error if the customer could not be fetched.
    pub async fn restore_session(&self) -> Result<AuthState> {
        let mut session = self.session().await;
        Ok(session.restore(&self.inner.customers).await?)
    }

    /// Ask the advisor and resolve its recommendations against the current
    /// catalog. Blank input returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the model error; the conversation then ends with an apology.
    pub async fn ask(&self, text: &str) -> Result<Option<AdvisorTurn>> {
        let catalog = self.inner.catalog.snapshot();
        let mut conversation = self.advisor().await;

        let Some(message) = conversation
            .send(&self.inner.openai, &catalog, text)
            .await?
            .cloned()
        else {
            return Ok(None);
        };

        let resolved = message
            .recommendation
            .as_ref()
            .map(|r| advisor::resolve(r, &catalog.products))
            .unwrap_or_default();

        Ok(Some(AdvisorTurn { message, resolved }))
    }
}
