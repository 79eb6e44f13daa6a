//! HTTP configuration, transport and the authorizing request dispatcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};
use crate::session::SessionCell;

/// Default storefront API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("storefront/", env!("CARGO_PKG_VERSION"));

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL for API requests.
    pub base_url: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read timeout.
    pub read_timeout: Duration,
    /// Custom user agent.
    pub custom_user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(20),
            custom_user_agent: None,
        }
    }
}

impl HttpConfig {
    /// User agent sent with every request.
    pub fn user_agent(&self) -> &str {
        self.custom_user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Resolve a relative API path to a full URL. Absolute URLs pass through
    /// only when they share the base URL's origin.
    pub fn resolve_url(&self, api: &str) -> Result<Url> {
        let mut base = self.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(Error::Url)?;

        if api.starts_with("http://") || api.starts_with("https://") {
            let url = Url::parse(api).map_err(Error::Url)?;
            if url.origin() != base.origin() {
                return Err(Error::InvalidArgument(format!(
                    "refusing to send a request to {}",
                    url.origin().ascii_serialization()
                )));
            }
            return Ok(url);
        }

        base.join(api.trim_start_matches('/')).map_err(Error::Url)
    }
}

/// A file part of a multipart body.
#[derive(Clone, PartialEq)]
pub struct FilePart {
    pub name: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for FilePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePart")
            .field("name", &self.name)
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One field of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text { name: String, value: String },
    File(FilePart),
}

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// A request ready for the dispatcher.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Add a query parameter. Empty values are skipped.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.query.push((key.to_owned(), value));
        }
        self
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.into()));
    }

    /// Get a header value.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Bearer token attached to this request, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.header_value(AUTHORIZATION.as_str())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    /// Set a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Set a multipart body.
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }
}

/// A received response, whatever its status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as UTF-8 text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Error::Json)
    }

    /// Body as a JSON value: parsed when possible, else the raw text, else null.
    pub fn payload(&self) -> serde_json::Value {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return serde_json::Value::Null;
        }
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|_| serde_json::Value::String(self.text()))
    }

    /// Turn a non-success response into an API error.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::api(self.status.as_u16(), self.payload()))
        }
    }
}

/// Moves requests over the wire.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send a request and return the response, whatever its status.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Build a reqwest client with the given configuration.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .user_agent(config.user_agent())
        .gzip(true)
        .build()
        .map_err(Error::Network)
}

/// Transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let ApiRequest {
            method,
            url,
            headers,
            query,
            body,
        } = request;

        let mut builder = self.client.request(method, url);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)),
        };

        let response = builder.send().await.map_err(Error::Network)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(Error::Network)?;

        Ok(ApiResponse::new(status, bytes.to_vec()))
    }
}

fn multipart_form(parts: Vec<FormPart>) -> reqwest::multipart::Form {
    parts
        .into_iter()
        .fold(reqwest::multipart::Form::new(), |form, part| match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File(file) => form.part(
                file.name,
                reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name),
            ),
        })
}

/// The single request pipeline: attaches the current credential and reacts
/// to credential rejection.
#[derive(Debug)]
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    config: HttpConfig,
    session: Arc<SessionCell>,
}

impl RequestDispatcher {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        config: HttpConfig,
        session: Arc<SessionCell>,
    ) -> Self {
        Self {
            transport,
            config,
            session,
        }
    }

    /// HTTP configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Start a request for an API path.
    pub fn request(&self, method: Method, api: &str) -> Result<ApiRequest> {
        Ok(ApiRequest::new(method, self.config.resolve_url(api)?))
    }

    /// Send a request.
    ///
    /// A stored access token is attached as a bearer credential; without one
    /// the request goes out unmodified. A 401 response tears the session down
    /// once and yields [`Error::Unauthorized`]. Every other response is
    /// returned as received.
    pub async fn dispatch(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        let credential = self.session.credential();
        if let Some(token) = &credential.access {
            request.set_header(AUTHORIZATION.as_str(), format!("Bearer {token}"));
        }

        log::debug!("{} {}", request.method, request.url.path());
        let response = self.transport.send(request).await?;

        if response.status == StatusCode::UNAUTHORIZED {
            if self.session.invalidate_if_current(credential.generation) {
                log::info!("credential rejected; session invalidated");
            } else {
                log::debug!("ignoring 401 issued under a previous session");
            }
            return Err(Error::Unauthorized);
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;
    use crate::models::{AuthPayload, TokenPair, User};
    use crate::session::SessionEvent;
    use crate::storage::{MemoryStorage, SessionStorage, SESSION_KEYS};
    use serde_json::json;
    use std::sync::{mpsc, Mutex};

    fn dispatcher(storage: Arc<MemoryStorage>, transport: Arc<MockTransport>) -> RequestDispatcher {
        let session = Arc::new(SessionCell::rehydrate(storage));
        RequestDispatcher::new(transport, HttpConfig::default(), session)
    }

    fn login(d: &RequestDispatcher) {
        d.session
            .establish(AuthPayload {
                user: User::new(1, "alice"),
                tokens: TokenPair {
                    access: "A".into(),
                    refresh: "R".into(),
                },
            })
            .unwrap();
    }

    #[test]
    fn test_resolve_url() {
        let config = HttpConfig::default();

        let url = config.resolve_url("products/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/products/");

        let url = config.resolve_url("/orders/cart/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/orders/cart/");

        let url = config
            .resolve_url("http://localhost:8000/api/products/?page=2")
            .unwrap();
        assert_eq!(url.query(), Some("page=2"));
    }

    #[test]
    fn test_resolve_url_rejects_other_origins() {
        let config = HttpConfig::default();

        for url in [
            "https://evil.example.com/api/products/?page=2",
            "https://localhost:8000/api/products/",
            "http://localhost:9000/api/products/",
        ] {
            let err = config.resolve_url(url).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{url}");
        }
    }

    #[test]
    fn test_resolve_url_without_trailing_slash() {
        let config = HttpConfig {
            base_url: "https://shop.example.com/api".into(),
            ..Default::default()
        };
        let url = config.resolve_url("products/").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/api/products/");
    }

    #[test]
    fn test_payload_fallbacks() {
        let empty = ApiResponse::new(StatusCode::BAD_REQUEST, Vec::new());
        assert_eq!(empty.payload(), serde_json::Value::Null);

        let text = ApiResponse::new(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(text.payload(), json!("upstream down"));

        let err = ApiResponse::new(StatusCode::BAD_REQUEST, r#"{"error":"Out of stock"}"#)
            .error_for_status()
            .unwrap_err();
        assert_eq!(err.user_message("x"), "Out of stock");
    }

    #[tokio::test]
    async fn test_no_token_no_header() {
        let transport = Arc::new(MockTransport::new());
        transport.on(Method::GET, "/api/products/", 200, json!({"results": []}));
        let d = dispatcher(Arc::new(MemoryStorage::new()), transport.clone());

        let req = d.request(Method::GET, "products/").unwrap();
        d.dispatch(req).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].header_value("Authorization").is_none());
    }

    #[tokio::test]
    async fn test_bearer_attached() {
        let transport = Arc::new(MockTransport::new());
        transport.on(Method::GET, "/api/orders/cart/", 200, json!({"count": 0}));
        let d = dispatcher(Arc::new(MemoryStorage::new()), transport.clone());
        login(&d);

        let req = d.request(Method::GET, "orders/cart/").unwrap();
        d.dispatch(req).await.unwrap();

        assert_eq!(transport.requests()[0].bearer_token(), Some("A"));
    }

    #[tokio::test]
    async fn test_401_tears_down_once() {
        let storage = Arc::new(MemoryStorage::new());
        let transport = Arc::new(MockTransport::new());
        transport.on(Method::GET, "/api/orders/cart/", 401, json!({"detail": "expired"}));
        let d = dispatcher(storage.clone(), transport.clone());
        login(&d);
        let mut events = d.session.events();

        let req = d.request(Method::GET, "orders/cart/").unwrap();
        let err = d.dispatch(req).await.unwrap_err();

        assert!(matches!(err, Error::Unauthorized));
        assert!(!d.session.is_authenticated());
        for key in SESSION_KEYS {
            assert_eq!(storage.get(key).unwrap(), None);
        }
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Invalidated);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stale_401_spares_newer_session() {
        let storage = Arc::new(MemoryStorage::new());
        let transport = Arc::new(MockTransport::new());
        let gate = transport.hold(Method::GET, "/api/orders/", 401, json!({}));
        let d = Arc::new(dispatcher(storage.clone(), transport.clone()));
        login(&d);

        let req = d.request(Method::GET, "orders/").unwrap();
        let in_flight = {
            let d = d.clone();
            tokio::spawn(async move { d.dispatch(req).await })
        };
        while transport.requests().is_empty() {
            tokio::task::yield_now().await;
        }

        d.session.teardown();
        login(&d);
        gate.notify_one();

        let err = in_flight.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
        assert!(d.session.is_authenticated());
        assert_eq!(storage.get("access_token").unwrap().as_deref(), Some("A"));
    }

    /// Storage whose first batch write parks until released.
    #[derive(Debug)]
    struct ParkedWrites {
        inner: MemoryStorage,
        entered: Mutex<Option<mpsc::Sender<()>>>,
        release: Mutex<Option<mpsc::Receiver<()>>>,
    }

    impl SessionStorage for ParkedWrites {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
            if let Some(entered) = self.entered.lock().unwrap().take() {
                entered.send(()).unwrap();
                if let Some(release) = self.release.lock().unwrap().take() {
                    release.recv().unwrap();
                }
            }
            self.inner.set_many(entries)
        }

        fn remove_many(&self, keys: &[&str]) -> Result<()> {
            self.inner.remove_many(keys)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_401_during_login_tears_down_new_session() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let storage = Arc::new(ParkedWrites {
            inner: MemoryStorage::new(),
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(Some(release_rx)),
        });
        let transport = Arc::new(MockTransport::new());
        transport.on(Method::GET, "/api/orders/cart/", 401, json!({}));
        let session = Arc::new(SessionCell::rehydrate(storage.clone()));
        let d = Arc::new(RequestDispatcher::new(
            transport.clone(),
            HttpConfig::default(),
            session.clone(),
        ));

        let login = {
            let session = session.clone();
            std::thread::spawn(move || {
                session
                    .establish(AuthPayload {
                        user: User::new(1, "alice"),
                        tokens: TokenPair {
                            access: "A".into(),
                            refresh: "R".into(),
                        },
                    })
                    .map(|_| ())
            })
        };
        entered_rx.recv().unwrap();

        let in_flight = {
            let d = d.clone();
            tokio::spawn(async move {
                let req = d.request(Method::GET, "orders/cart/")?;
                d.dispatch(req).await
            })
        };
        std::thread::sleep(Duration::from_millis(20));
        release_tx.send(()).unwrap();
        login.join().unwrap().unwrap();

        let err = in_flight.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Unauthorized));
        assert_eq!(transport.requests()[0].bearer_token(), Some("A"));
        assert!(!session.is_authenticated());
        assert_eq!(storage.get("access_token").unwrap(), None);
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let transport = Arc::new(MockTransport::new());
        transport.on(Method::POST, "/api/orders/cart/add/", 400, json!({"error": "Out of stock"}));
        let d = dispatcher(Arc::new(MemoryStorage::new()), transport.clone());
        login(&d);

        let req = d.request(Method::POST, "orders/cart/add/").unwrap();
        let response = d.dispatch(req).await.unwrap();

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(d.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_session() {
        let transport = Arc::new(MockTransport::new());
        let d = dispatcher(Arc::new(MemoryStorage::new()), transport.clone());
        login(&d);

        let req = d.request(Method::GET, "orders/").unwrap();
        let err = d.dispatch(req).await.unwrap_err();

        assert!(err.is_network());
        assert!(d.session.is_authenticated());
    }
}
