use std::sync::Arc;
use std::time::Duration;

use hirelane_auth::MemorySessionStore;
use hirelane_auth::NavigationNotifier;
use hirelane_auth::NoopNavigator;
use hirelane_auth::SessionStore;
use hirelane_auth::TokenNamespace;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::default_client::create_client;
use crate::error::Error;
use crate::error::RefreshFailedReason;
use crate::error::Result;
use crate::refresh::RefreshCoordinator;
use crate::refresh::RefreshTicket;
use crate::wire::extract_access_token;
use crate::wire::fallback_error_body;

/// Default per-attempt deadline, matching the web client's 3 second budget.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(3_000);

/// Path of the token refresh endpoint, relative to the API base.
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh";

/// Per-request knobs for [`Client::request`].
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    /// JSON body; omitted from the wire entirely when `None`.
    pub body: Option<Value>,
    /// Header overrides, applied after the defaults so a caller can replace
    /// `Content-Type`.
    pub headers: Vec<(String, String)>,
    /// Skip bearer attachment. Login, signup, and the refresh call itself
    /// set this so an expired token can never recurse into the refresh
    /// protocol.
    pub skip_auth: bool,
    /// Namespace the request authenticates against.
    pub namespace: TokenNamespace,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json(mut self, body: &impl Serialize) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn namespace(mut self, namespace: TokenNamespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }
}

/// Authenticated request client for the hirelane REST API.
///
/// Cheap to clone; clones share the session store, the transport, and the
/// refresh coordinator, so the single-flight guarantee spans every clone.
#[derive(Clone)]
pub struct Client {
    pub(crate) base_url: String,
    pub(crate) http: reqwest::Client,
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) navigator: Arc<dyn NavigationNotifier>,
    pub(crate) coordinator: Arc<RefreshCoordinator>,
    pub(crate) request_timeout: Duration,
    pub(crate) refresh_path: String,
}

#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    http: Option<reqwest::Client>,
    store: Option<Arc<dyn SessionStore>>,
    navigator: Option<Arc<dyn NavigationNotifier>>,
    request_timeout: Option<Duration>,
    refresh_path: Option<String>,
}

impl ClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn NavigationNotifier>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    pub fn build(self) -> Client {
        let base_url = match self.base_url {
            Some(base_url) => base_url.trim_end_matches('/').to_string(),
            None => panic!("base_url must be provided before building Client"),
        };
        Client {
            base_url,
            http: self.http.unwrap_or_else(create_client),
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemorySessionStore::new())),
            navigator: self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator)),
            coordinator: Arc::new(RefreshCoordinator::default()),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            refresh_path: self
                .refresh_path
                .unwrap_or_else(|| DEFAULT_REFRESH_PATH.to_string()),
        }
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Issues `endpoint` with `options` and decodes the JSON response body.
    ///
    /// A 401 on a protected endpoint triggers the refresh protocol and one
    /// retry with the fresh token; every other failure surfaces directly.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let body = self.request_value(endpoint, options).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// [`request`](Self::request) without the typed decode step.
    pub async fn request_value(&self, endpoint: &str, options: RequestOptions) -> Result<Value> {
        let token = if options.skip_auth {
            None
        } else {
            self.store
                .get(options.namespace)
                .filter(|token| !token.is_empty())
        };

        let response = self.send(endpoint, &options, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED
            || options.skip_auth
            || endpoint == self.refresh_path
        {
            return read_json(response).await;
        }

        debug!(
            endpoint,
            namespace = %options.namespace,
            "401 received, entering token refresh"
        );
        let fresh = self.fresh_token(options.namespace).await?;
        // Exactly one retry: a second 401 falls through read_json as a
        // plain status error.
        let retry = self.send(endpoint, &options, Some(&fresh)).await?;
        read_json(retry).await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.request(
            endpoint,
            RequestOptions {
                method: Method::GET,
                ..options
            },
        )
        .await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: Option<&impl Serialize>,
        options: RequestOptions,
    ) -> Result<T> {
        self.body_request(Method::POST, endpoint, payload, options)
            .await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: Option<&impl Serialize>,
        options: RequestOptions,
    ) -> Result<T> {
        self.body_request(Method::PUT, endpoint, payload, options)
            .await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: Option<&impl Serialize>,
        options: RequestOptions,
    ) -> Result<T> {
        self.body_request(Method::PATCH, endpoint, payload, options)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.request(
            endpoint,
            RequestOptions {
                method: Method::DELETE,
                ..options
            },
        )
        .await
    }

    async fn body_request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&impl Serialize>,
        options: RequestOptions,
    ) -> Result<T> {
        let mut options = RequestOptions { method, ..options };
        if let Some(payload) = payload {
            options.body = Some(serde_json::to_value(payload)?);
        }
        self.request(endpoint, options).await
    }

    /// One attempt on the wire: no refresh handling, no body decoding.
    async fn send(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{endpoint}", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let bearer =
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    Error::InvalidHeader {
                        name: AUTHORIZATION.to_string(),
                    }
                })?;
            headers.insert(AUTHORIZATION, bearer);
        }
        for (name, value) in &options.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| Error::InvalidHeader {
                    name: name.clone(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader {
                    name: name.clone(),
                })?;
            headers.insert(header_name, header_value);
        }

        let mut builder = self
            .http
            .request(options.method.clone(), url)
            .headers(headers)
            .timeout(self.request_timeout);
        if let Some(body) = &options.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        match builder.send().await {
            Ok(response) => Ok(response),
            Err(err) if err.is_timeout() => Err(Error::Timeout {
                endpoint: endpoint.to_string(),
            }),
            Err(err) => Err(Error::Http(err)),
        }
    }

    /// Resolves a fresh access token for `namespace`, either by leading the
    /// refresh cycle or by waiting on the one already in flight.
    async fn fresh_token(&self, namespace: TokenNamespace) -> Result<String> {
        match self.coordinator.begin(namespace) {
            RefreshTicket::Leader => {
                let outcome = self.refresh_access_token(namespace).await;
                if let Ok(token) = &outcome {
                    self.store.set(token, namespace);
                }
                self.coordinator.settle(namespace, &outcome);
                match outcome {
                    Ok(token) => Ok(token),
                    Err(reason) => {
                        warn!(%namespace, %reason, "token refresh failed");
                        self.store.remove(namespace);
                        self.navigator.redirect_to_login();
                        Err(Error::Refresh(reason))
                    }
                }
            }
            RefreshTicket::Waiter(rx) => match rx.await {
                Ok(Ok(token)) => Ok(token),
                Ok(Err(reason)) => Err(Error::Refresh(reason)),
                Err(_) => Err(Error::Refresh(RefreshFailedReason::Transport {
                    message: "refresh cycle dropped before settling".to_string(),
                })),
            },
        }
    }

    /// The refresh call itself. Bearer attachment is skipped; the refresh
    /// credential is the http-only cookie riding the jar.
    async fn refresh_access_token(
        &self,
        namespace: TokenNamespace,
    ) -> std::result::Result<String, RefreshFailedReason> {
        debug!(%namespace, "refreshing access token");
        let options = RequestOptions {
            method: Method::POST,
            skip_auth: true,
            namespace,
            ..RequestOptions::default()
        };

        let response = match self.send(self.refresh_path.as_str(), &options, None).await {
            Ok(response) => response,
            Err(Error::Timeout { .. }) => return Err(RefreshFailedReason::Timeout),
            Err(err) => {
                return Err(RefreshFailedReason::Transport {
                    message: err.to_string(),
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshFailedReason::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|err| RefreshFailedReason::Transport {
                message: err.to_string(),
            })?;
        extract_access_token(&body).ok_or(RefreshFailedReason::MissingAccessToken)
    }
}

/// Decodes a settled response: 2xx bodies parse as JSON (empty bodies decode
/// as null), everything else becomes a status error carrying the server's
/// error body.
async fn read_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if status.is_success() {
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    } else {
        let data = match response.json::<Value>().await {
            Ok(data) => data,
            Err(_) => fallback_error_body(status),
        };
        Err(Error::unexpected_status(status, data))
    }
}
