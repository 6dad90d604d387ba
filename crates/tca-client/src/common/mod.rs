//! Authenticated HTTP transport for the TCA API
//!
//! Provides the session-keyed request primitive used by every API module, uniform
//! error decoding, and the trace/failure-injection hooks used in tests.

pub mod paths;

use crate::error::{EntityKind, Result, TcaError};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Header carrying the session API key, duplicated into `Authorization`
pub const HM_AUTHORIZATION: &str = "x-hm-authorization";
/// API-version marker header
pub const VERSION_HEADER: &str = "Version";
pub const API_VERSION: &str = "2";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a TCA endpoint
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Accept self-signed server certificates
    pub allow_self_signed: bool,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            allow_self_signed: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn allow_self_signed(mut self, allow: bool) -> Self {
        self.allow_self_signed = allow;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("allow_self_signed", &self.allow_self_signed)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Single error body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Array error body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorsResponse {
    pub errors: Vec<ErrorEntry>,
}

/// Decode server error messages: single form first, then the array form,
/// else the raw body.
pub fn decode_error_messages(body: &str) -> Vec<String> {
    if let Ok(single) = serde_json::from_str::<ErrorResponse>(body) {
        if !single.message.is_empty() {
            return vec![single.message];
        }
    }
    if let Ok(many) = serde_json::from_str::<ErrorsResponse>(body) {
        let messages: Vec<String> = many
            .errors
            .into_iter()
            .filter_map(|e| e.message.or(e.error))
            .filter(|m| !m.is_empty())
            .collect();
        if !messages.is_empty() {
            return messages;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed.chars().take(500).collect()]
    }
}

/// Copy of `value` with every password-like field blanked, for logging
pub fn redact(value: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let lowered = k.to_ascii_lowercase();
                    if lowered.contains("password") || lowered.contains("secret") {
                        (k.clone(), Value::String("***".to_string()))
                    } else {
                        (k.clone(), redact(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

/// Run `fut` unless `cancel` trips first
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TcaError::TaskCancelled),
        res = fut => res,
    }
}

/// Session-keyed HTTP transport.
///
/// Safe for concurrent use: the API key sits behind a lock and is only written by
/// [`HttpTransport::authenticate`]; every other field is fixed after construction
/// apart from the test hooks.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    api_key: RwLock<Option<String>>,
    trace: AtomicBool,
    trace_sink: Mutex<Option<Box<dyn Write + Send>>>,
    simulate_failure: AtomicBool,
    failure_conditions: RwLock<Vec<String>>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("authenticated", &self.api_key().is_some())
            .field("trace", &self.trace.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport; no request is made until [`authenticate`](Self::authenticate)
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.allow_self_signed)
            .build()
            .map_err(TcaError::Transport)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username,
            password: config.password,
            api_key: RwLock::new(None),
            trace: AtomicBool::new(false),
            trace_sink: Mutex::new(None),
            simulate_failure: AtomicBool::new(false),
            failure_conditions: RwLock::new(Vec::new()),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path; absolute URLs (policy-link hrefs) pass through
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Current session API key, if authenticated
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install an API key obtained elsewhere
    pub fn set_api_key(&self, key: impl Into<String>) {
        *self.api_key.write().unwrap_or_else(PoisonError::into_inner) = Some(key.into());
    }

    pub fn clear_session(&self) {
        *self.api_key.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Write raw response bodies to the trace sink
    pub fn set_trace(&self, enabled: bool) {
        self.trace.store(enabled, Ordering::Relaxed);
    }

    /// Redirect trace output; without a sink bodies go to `tracing` at trace level
    pub fn set_trace_sink(&self, sink: Box<dyn Write + Send>) {
        *self.trace_sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(sink);
    }

    pub fn set_simulate_failure(&self, enabled: bool) {
        self.simulate_failure.store(enabled, Ordering::Relaxed);
    }

    /// Fail any request whose path contains `fragment` while simulation is on
    pub fn add_failure_condition(&self, fragment: impl Into<String>) {
        self.failure_conditions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(fragment.into());
    }

    pub fn clear_failure_conditions(&self) {
        self.failure_conditions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn simulated_failure(&self, path: &str) -> Option<TcaError> {
        if !self.simulate_failure.load(Ordering::Relaxed) {
            return None;
        }
        let conditions = self
            .failure_conditions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        conditions
            .iter()
            .any(|fragment| path.contains(fragment.as_str()))
            .then(|| TcaError::SimulatedFailure {
                path: path.to_string(),
            })
    }

    fn write_trace(&self, method: &Method, path: &str, body: &str) {
        if !self.trace.load(Ordering::Relaxed) {
            return;
        }
        let mut sink = self.trace_sink.lock().unwrap_or_else(PoisonError::into_inner);
        match sink.as_mut() {
            Some(writer) => {
                if let Err(e) = writeln!(writer, "{}", body) {
                    warn!("Failed to write trace for {} {}: {}", method, path, e);
                }
            }
            None => trace!(target: "tca_client::trace", %method, path, body),
        }
    }

    /// Establish a session and store the returned API key
    pub async fn authenticate(&self, cancel: &CancellationToken) -> Result<()> {
        let path = paths::SESSIONS;
        if let Some(err) = self.simulated_failure(path) {
            return Err(err);
        }
        debug!("Authenticating as {} against {}", self.username, self.base_url);

        let body = serde_json::json!({
            "username": self.username,
            "password": self.password,
        });
        let request = self
            .client
            .post(self.build_url(path))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(VERSION_HEADER, API_VERSION)
            .json(&body);

        let response = cancellable(cancel, async {
            request.send().await.map_err(TcaError::Transport)
        })
        .await?;

        let status = response.status();
        let key = response
            .headers()
            .get(HM_AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = cancellable(cancel, async {
            response.text().await.map_err(TcaError::Transport)
        })
        .await?;
        self.write_trace(&Method::POST, path, &text);

        if status == StatusCode::UNAUTHORIZED {
            return Err(TcaError::AuthFailed(format!(
                "invalid credentials for user {}",
                self.username
            )));
        }
        if !status.is_success() {
            return Err(TcaError::ServerRejected {
                messages: decode_error_messages(&text),
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let key = key.filter(|k| !k.is_empty()).ok_or_else(|| {
            TcaError::AuthFailed(format!("session response carried no {} header", HM_AUTHORIZATION))
        })?;
        self.set_api_key(key);
        debug!("Session established for {}", self.username);
        Ok(())
    }

    /// Issue a request with the session headers and return the raw status and body.
    ///
    /// 404 maps to `NotFound`; any other non-2xx status maps to `ServerRejected`
    /// with messages decoded from the body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<(StatusCode, String)> {
        if let Some(err) = self.simulated_failure(path) {
            debug!("Simulated failure for {} {}", method, path);
            return Err(err);
        }
        if cancel.is_cancelled() {
            return Err(TcaError::TaskCancelled);
        }

        let url = self.build_url(path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(VERSION_HEADER, API_VERSION);
        if let Some(key) = self.api_key() {
            request = request
                .header(AUTHORIZATION, key.as_str())
                .header(HM_AUTHORIZATION, key.as_str());
        }
        if let Some(body) = body {
            trace!(target: "tca_client::request", %method, path, body = %redact(body));
            request = request.json(body);
        }

        let response = cancellable(cancel, async {
            request.send().await.map_err(TcaError::Transport)
        })
        .await?;
        let status = response.status();
        let text = cancellable(cancel, async {
            response.text().await.map_err(TcaError::Transport)
        })
        .await?;
        self.write_trace(&method, path, &text);

        if status == StatusCode::NOT_FOUND {
            return Err(TcaError::not_found(EntityKind::Resource, path));
        }
        if !status.is_success() {
            let messages = decode_error_messages(&text);
            debug!("{} {} rejected with {}: {:?}", method, path, status, messages);
            return Err(TcaError::ServerRejected {
                messages,
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok((status, text))
    }

    /// Make a GET request and decode the JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str, cancel: &CancellationToken) -> Result<T> {
        let (_, text) = self.request(Method::GET, path, None, cancel).await?;
        decode_body(path, &text)
    }

    /// Make a POST request and decode the JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let value = serde_json::to_value(body)?;
        let (_, text) = self.request(Method::POST, path, Some(&value), cancel).await?;
        decode_body(path, &text)
    }

    /// Make a POST request and return the raw body
    pub async fn post_raw<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let value = serde_json::to_value(body)?;
        let (_, text) = self.request(Method::POST, path, Some(&value), cancel).await?;
        Ok(text)
    }

    /// Make a PUT request and decode the JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let value = serde_json::to_value(body)?;
        let (_, text) = self.request(Method::PUT, path, Some(&value), cancel).await?;
        decode_body(path, &text)
    }

    /// Make a DELETE request and return the raw body
    pub async fn delete(&self, path: &str, cancel: &CancellationToken) -> Result<String> {
        let (_, text) = self.request(Method::DELETE, path, None, cancel).await?;
        Ok(text)
    }
}

/// Decode a JSON body, treating an empty body as `null`
pub fn decode_body<T: DeserializeOwned>(path: &str, text: &str) -> Result<T> {
    let source = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(source).map_err(|e| {
        debug!(
            "error decoding response body from {}: {} - Response (first 500 chars): {}",
            path,
            e,
            text.chars().take(500).collect::<String>()
        );
        TcaError::Serialization(e)
    })
}
