//! Storefront client, its builder and the shared request plumbing.

mod http;
#[cfg(test)]
pub(crate) mod mock;
mod scope;

pub use http::{
    build_client, ApiRequest, ApiResponse, FilePart, FormPart, HttpConfig, ReqwestTransport,
    RequestBody, RequestDispatcher, Transport, DEFAULT_BASE_URL, DEFAULT_USER_AGENT,
};
pub use scope::{RequestScope, Scoped};

use crate::api::{CartApi, CategoryApi, FavoriteApi, OrderApi, ProductApi, ReviewApi};
use crate::error::{Error, Result};
use crate::notify::{LogNotifier, Notice, Notifier};
use crate::session::{Session, SessionCell, SessionEvent, SessionStore};
use crate::storage::{MemoryStorage, SessionStorage};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

/// Builder for creating StorefrontClient.
pub struct StorefrontClientBuilder {
    http_config: HttpConfig,
    storage: Option<Arc<dyn SessionStorage>>,
    transport: Option<Arc<dyn Transport>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl std::fmt::Debug for StorefrontClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClientBuilder")
            .field("http_config", &self.http_config)
            .field("storage", &self.storage)
            .field("transport", &self.transport.as_ref().map(|_| "..."))
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl Default for StorefrontClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StorefrontClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            http_config: HttpConfig::default(),
            storage: None,
            transport: None,
            notifier: None,
        }
    }

    /// Set base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.http_config.base_url = url.into();
        self
    }

    /// Set custom user agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.http_config.custom_user_agent = Some(ua.into());
        self
    }

    /// Set connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.connect_timeout = timeout;
        self
    }

    /// Set read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.read_timeout = timeout;
        self
    }

    /// Set the persistent session storage. Defaults to in-memory storage.
    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Replace the HTTP transport. Defaults to reqwest.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set where user notifications go. Defaults to the `log` facade.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build StorefrontClient. The session is rehydrated from storage before this returns.
    pub fn build(self) -> Result<StorefrontClient> {
        // Fail on a bad base URL here rather than on the first request.
        self.http_config.resolve_url("")?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.http_config)?),
        };
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));

        let session = Arc::new(SessionCell::rehydrate(storage));
        let dispatcher = RequestDispatcher::new(transport, self.http_config, session.clone());

        Ok(StorefrontClient {
            inner: Arc::new(ClientInner {
                dispatcher,
                session,
                notifier,
            }),
        })
    }
}

/// Internal client state.
pub(crate) struct ClientInner {
    pub dispatcher: RequestDispatcher,
    pub session: Arc<SessionCell>,
    pub notifier: Arc<dyn Notifier>,
}

impl ClientInner {
    /// Fail unless a session is present.
    pub fn require_auth(&self) -> Result<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(Error::AuthRequired)
        }
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Start a request for an API path.
    pub fn request(&self, method: Method, api: &str) -> Result<ApiRequest> {
        self.dispatcher.request(method, api)
    }

    /// Dispatch and require a success status.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.dispatcher.dispatch(request).await?.error_for_status()
    }

    /// Dispatch and decode a JSON body.
    pub async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.execute(request).await?.json()
    }

    /// Dispatch and ignore the body.
    pub async fn call_unit(&self, request: ApiRequest) -> Result<()> {
        self.execute(request).await.map(|_| ())
    }

    /// GET and decode.
    pub async fn get<T: DeserializeOwned>(&self, api: &str) -> Result<T> {
        self.call(self.request(Method::GET, api)?).await
    }
}

/// Storefront client. Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct StorefrontClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl StorefrontClient {
    /// Create a new client builder.
    pub fn builder() -> StorefrontClientBuilder {
        StorefrontClientBuilder::new()
    }

    /// Get the session store.
    pub fn session(&self) -> SessionStore {
        SessionStore::new(self.inner.clone())
    }

    /// Get the product API.
    pub fn products(&self) -> ProductApi {
        ProductApi::new(self.inner.clone())
    }

    /// Get the category API.
    pub fn categories(&self) -> CategoryApi {
        CategoryApi::new(self.inner.clone())
    }

    /// Get the review API.
    pub fn reviews(&self) -> ReviewApi {
        ReviewApi::new(self.inner.clone())
    }

    /// Get the favorites API.
    pub fn favorites(&self) -> FavoriteApi {
        FavoriteApi::new(self.inner.clone())
    }

    /// Get the cart API.
    pub fn cart(&self) -> CartApi {
        CartApi::new(self.inner.clone())
    }

    /// Get the order API.
    pub fn orders(&self) -> OrderApi {
        OrderApi::new(self.inner.clone())
    }

    /// Get the request dispatcher, for endpoints without a typed wrapper.
    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.inner.dispatcher
    }

    /// Current session snapshot.
    pub fn current_session(&self) -> Session {
        self.inner.session.current()
    }

    /// Check if the client is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.inner.session.is_authenticated()
    }

    /// Watch session snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session.subscribe()
    }

    /// Receive session lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.session.events()
    }

    /// Cached cart item count for the navigation badge; 0 when signed out.
    pub fn cart_badge(&self) -> u32 {
        self.inner.session.cart_count()
    }
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("authenticated", &self.is_authenticated())
            .field("base_url", &self.inner.dispatcher.config().base_url)
            .finish()
    }
}
