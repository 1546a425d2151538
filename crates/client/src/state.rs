//! Application state owned by a front-end.

use crate::api::{ApiClient, OrderConfirmation};
use crate::assistant::ChatAssistant;
use crate::auth::AuthSession;
use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::checkout::{CheckoutError, place_order};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::store::{FileStore, PersistentStore};

/// Everything a MediCart front-end works with.
///
/// The cart and session share one store. There is no global state: a
/// front-end creates one `MediCart` and passes it where it is needed.
#[derive(Debug)]
pub struct MediCart {
    config: ClientConfig,
    api: ApiClient,
    store: PersistentStore,
    cart: Cart,
    auth: AuthSession,
    catalog: Catalog,
    assistant: ChatAssistant,
}

impl MediCart {
    /// Open the file store named in `config` and load saved state from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store file exists but cannot be read.
    pub fn open(config: ClientConfig) -> Result<Self> {
        let store = PersistentStore::new(FileStore::open(&config.store_path)?);
        Ok(Self::with_store(config, store))
    }

    /// Load saved state from `store`.
    #[must_use]
    pub fn with_store(config: ClientConfig, store: PersistentStore) -> Self {
        let api = ApiClient::new(&config);
        let cart = Cart::load(store.clone());
        let auth = AuthSession::load(store.clone(), api.clone());
        let catalog = Catalog::new(api.clone(), &config);
        let assistant = ChatAssistant::new(api.clone(), config.ai_chat_enabled);

        tracing::debug!(
            api = %api.base_url(),
            logged_in = auth.is_authenticated(),
            cart_lines = cart.items().len(),
            "MediCart ready"
        );

        Self {
            config,
            api,
            store,
            cart,
            auth,
            catalog,
            assistant,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn store(&self) -> &PersistentStore {
        &self.store
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub const fn auth_mut(&mut self) -> &mut AuthSession {
        &mut self.auth
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub const fn assistant_mut(&mut self) -> &mut ChatAssistant {
        &mut self.assistant
    }

    /// Place an order for the cart. See [`place_order`].
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if the order cannot be placed.
    pub async fn checkout(
        &mut self,
        shipping_address: Option<&str>,
    ) -> std::result::Result<OrderConfirmation, CheckoutError> {
        place_order(&mut self.cart, &self.auth, &self.api, shipping_address).await
    }
}
