//! Scripted transport for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tokio::sync::Notify;

use super::http::{ApiRequest, ApiResponse, Transport};
use crate::error::{Error, Result};

#[derive(Debug)]
struct Route {
    method: Method,
    target: String,
    status: u16,
    body: Vec<u8>,
    once: bool,
    used: bool,
    gate: Option<Arc<Notify>>,
}

impl Route {
    fn matches(&self, request: &ApiRequest, full: &str) -> bool {
        if self.method != request.method || (self.once && self.used) {
            return false;
        }
        if self.target.contains('?') {
            self.target == full
        } else {
            self.target == request.url.path()
        }
    }
}

/// Answers requests from a table of `(method, path)` routes and records
/// everything it receives. Unmatched requests fail like a refused connection.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(
        &self,
        method: Method,
        target: &str,
        status: u16,
        body: serde_json::Value,
        once: bool,
        gate: Option<Arc<Notify>>,
    ) {
        self.routes.lock().unwrap().push(Route {
            method,
            target: target.to_owned(),
            status,
            body: serde_json::to_vec(&body).unwrap(),
            once,
            used: false,
            gate,
        });
    }

    /// Answer every matching request.
    pub fn on(&self, method: Method, target: &str, status: u16, body: serde_json::Value) {
        self.add(method, target, status, body, false, None);
    }

    /// Answer the next matching request only.
    pub fn once(&self, method: Method, target: &str, status: u16, body: serde_json::Value) {
        self.add(method, target, status, body, true, None);
    }

    /// Answer the next matching request only after the returned gate is notified.
    pub fn hold(
        &self,
        method: Method,
        target: &str,
        status: u16,
        body: serde_json::Value,
    ) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.add(method, target, status, body, true, Some(gate.clone()));
        gate
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests received for a path.
    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.path() == path)
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let full = match request.url.query() {
            Some(q) => format!("{}?{}", request.url.path(), q),
            None => request.url.path().to_owned(),
        };
        let full = if request.query.is_empty() {
            full
        } else {
            let extra: Vec<String> = request.query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            let sep = if full.contains('?') { '&' } else { '?' };
            format!("{full}{sep}{}", extra.join("&"))
        };

        let answer = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|r| r.matches(&request, &full))
                .map(|route| {
                    route.used = true;
                    (route.status, route.body.clone(), route.gate.clone())
                })
        };
        self.requests.lock().unwrap().push(request);

        let (status, body, gate) =
            answer.ok_or_else(|| Error::Transport(format!("connection refused: {full}")))?;
        if let Some(gate) = gate {
            gate.notified().await;
        }

        Ok(ApiResponse::new(
            StatusCode::from_u16(status).unwrap(),
            body,
        ))
    }
}
