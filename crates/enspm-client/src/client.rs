//! Main client implementation.
//!
//! Every call goes through [`EnspmClient::send`], which attaches the current
//! bearer token and, on a 401, runs the refresh-and-retry protocol:
//!
//! ```text
//! INIT -> SENT -> SUCCESS | FAILED_OTHER | FAILED_AUTH
//! FAILED_AUTH, attempt 0, refresh token present -> REFRESHING
//! REFRESHING ok   -> RETRY_SENT -> whatever the retry returns (terminal)
//! REFRESHING fail -> session cleared, original 401 returned (terminal)
//! FAILED_AUTH otherwise -> 401 returned (terminal)
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::sync::Mutex;
use url::Url;

use crate::api::{AuthApi, InfoApi, OpportunitiesApi, OrganisationsApi, UsersApi};
use crate::error::{Error, ErrorResponse, Result};
use crate::request::{ApiRequest, Query};
use crate::session::{InMemorySessionStore, Session, SharedSessionStore};
use crate::types::{OpportunityKind, RefreshRequest, RefreshResponse};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// API prefix under the server root.
const API_PREFIX: &str = "api/v1/";

/// Path of the token refresh endpoint, relative to the API prefix.
const REFRESH_PATH: &str = "auth/refresh";

/// Retries allowed after a successful refresh. A 401 on the retry is final.
const MAX_AUTH_RETRIES: u32 = 1;

/// ENSPM Hub API client.
///
/// Provides typed access to the API and owns the refresh-and-retry
/// protocol. Cheap to clone; clones share the session store and the
/// refresh gate.
///
/// # Example
///
/// ```no_run
/// use enspm_client::EnspmClient;
///
/// # async fn example() -> enspm_client::Result<()> {
/// let client = EnspmClient::builder()
///     .base_url("http://localhost:8000")
///     .build()?;
///
/// client.auth().login("ada@enspm.cm", "secret").await?;
/// let me = client.auth().me().await?;
/// println!("{}", me.display_name());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EnspmClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Server root URL.
    pub(crate) base_url: Url,
    /// `<base_url>/api/v1/`.
    pub(crate) api_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
    /// Where tokens and the user snapshot live.
    pub(crate) session: SharedSessionStore,
    /// Serializes refreshes when single-flight is enabled.
    pub(crate) refresh_gate: Option<Mutex<()>>,
}

/// What a 401 handler decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    /// Tokens are fresh; resend once.
    Retry,
    /// Return the original 401.
    GiveUp,
}

impl std::fmt::Debug for EnspmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnspmClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("single_flight", &self.inner.refresh_gate.is_some())
            .finish()
    }
}

impl EnspmClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client pointing to a local development server.
    pub fn localhost() -> Result<Self> {
        Self::builder().base_url("http://127.0.0.1:8000").build()
    }

    /// Get the server root URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The session store this client reads and writes.
    pub fn session_store(&self) -> &SharedSessionStore {
        &self.inner.session
    }

    /// Snapshot of the current session.
    pub async fn session(&self) -> Result<Session> {
        self.inner.session.load().await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the authentication API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the users API.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the organisations API.
    pub fn organisations(&self) -> OrganisationsApi {
        OrganisationsApi::new(self.clone())
    }

    /// Access one of the opportunity boards.
    pub fn opportunities(&self, kind: OpportunityKind) -> OpportunitiesApi {
        OpportunitiesApi::new(self.clone(), kind)
    }

    /// Access the API root document.
    pub fn info(&self) -> InfoApi {
        InfoApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authenticated send
    // ─────────────────────────────────────────────────────────────────────────

    /// Send a request with credential injection and refresh-on-401.
    ///
    /// Returns the response only if it is successful. A 401 is retried at
    /// most once, and only after the refresh endpoint has issued new tokens.
    /// If the refresh itself fails the session is cleared and the original
    /// 401 is returned.
    pub async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let mut attempt = 0;

        loop {
            let session = self.inner.session.load().await?;
            let sent_token = session.access_token().map(str::to_string);

            let response = self.dispatch(request, sent_token.as_deref(), attempt).await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let error = self.extract_error(response).await;
            if status != StatusCode::UNAUTHORIZED || attempt >= MAX_AUTH_RETRIES {
                return Err(error);
            }

            match self.recover(sent_token.as_deref()).await? {
                Recovery::Retry => attempt += 1,
                Recovery::GiveUp => return Err(error),
            }
        }
    }

    /// Exchange the stored refresh token for new tokens.
    ///
    /// On failure the session is cleared and the refresh error is returned.
    pub async fn refresh_session(&self) -> Result<Session> {
        let _guard = match &self.inner.refresh_gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };

        let session = self.inner.session.load().await?;
        let refresh_token = session
            .refresh_token()
            .ok_or_else(|| Error::Auth {
                message: "No refresh token in session".to_string(),
            })?
            .to_string();

        self.apply_refresh(&refresh_token).await
    }

    /// Decide how to handle a 401 for a request that carried `sent_token`.
    async fn recover(&self, sent_token: Option<&str>) -> Result<Recovery> {
        let _guard = match &self.inner.refresh_gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };

        let session = self.inner.session.load().await?;
        let Some(refresh_token) = session.refresh_token().map(str::to_string) else {
            tracing::debug!("Unauthorized with no refresh token, not refreshing");
            return Ok(Recovery::GiveUp);
        };

        if self.inner.refresh_gate.is_some() && session.access_token() != sent_token {
            tracing::debug!("Access token already rotated by a concurrent request");
            return Ok(Recovery::Retry);
        }

        match self.apply_refresh(&refresh_token).await {
            Ok(_) => Ok(Recovery::Retry),
            Err(Error::Session(message)) => Err(Error::Session(message)),
            Err(_) => Ok(Recovery::GiveUp),
        }
    }

    /// Call the refresh endpoint and store the result, or clear the session.
    async fn apply_refresh(&self, refresh_token: &str) -> Result<Session> {
        match self.exchange_refresh_token(refresh_token).await {
            Ok(tokens) => {
                let refresh_token = tokens
                    .refresh_token
                    .unwrap_or_else(|| refresh_token.to_string());
                let session = self
                    .inner
                    .session
                    .set_tokens(tokens.access_token, refresh_token)
                    .await?;
                tracing::info!("Access token refreshed");
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                self.inner.session.clear().await?;
                Err(e)
            }
        }
    }

    /// `POST auth/refresh` without a bearer.
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<RefreshResponse> {
        let url = self.url(REFRESH_PATH)?;
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };

        let response = self
            .inner
            .http
            .post(url)
            .json(&body)
            .timeout(self.inner.timeout)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Put one request on the wire.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
        attempt: u32,
    ) -> Result<reqwest::Response> {
        let mut url = self.url(request.path())?;
        request.query().apply(&mut url);

        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            attempt,
            authenticated = token.is_some(),
            "Sending request"
        );

        let mut builder = self
            .inner
            .http
            .request(request.method().clone(), url)
            .timeout(self.inner.timeout);

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.api_url.join(path).map_err(Error::from)
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.fetch(&ApiRequest::get(path)).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: Query,
    ) -> Result<T> {
        self.fetch(&ApiRequest::get(path).with_query(query)).await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.fetch(&ApiRequest::post(path).with_json(body)?).await
    }

    /// Make a POST request whose response has no body.
    pub(crate) async fn post_no_content<B>(&self, path: &str, body: Option<&B>) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let mut request = ApiRequest::post(path);
        if let Some(body) = body {
            request = request.with_json(body)?;
        }
        self.send(&request).await.map(|_| ())
    }

    /// Make a PATCH request.
    pub(crate) async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.fetch(&ApiRequest::patch(path).with_json(body)?).await
    }

    /// Make a PUT request.
    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.fetch(&ApiRequest::put(path).with_json(body)?).await
    }

    /// Make a DELETE request.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.send(&ApiRequest::delete(path)).await.map(|_| ())
    }

    /// Send and decode a JSON body.
    async fn fetch<T: serde::de::DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.send(request).await?;
        decode_body(response).await
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            decode_body(response).await
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = response.json::<ErrorResponse>().await.ok();
        Error::from_status(status, body)
    }
}

/// Read a success body and decode it.
///
/// Transport failures stay `Error::Http`; a body that is not the expected
/// JSON becomes `Error::Json`.
async fn decode_body<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Builder for creating an EnspmClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    session: Option<SharedSessionStore>,
    timeout: Duration,
    user_agent: Option<String>,
    single_flight_refresh: bool,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            session: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            single_flight_refresh: true,
        }
    }

    /// Set the server root URL (without the `/api/v1` suffix).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the session store. Defaults to a fresh in-memory store.
    pub fn session_store(mut self, store: SharedSessionStore) -> Self {
        self.session = Some(store);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Make concurrent 401s share one refresh (default `true`).
    ///
    /// When disabled, every request that hits a 401 calls the refresh
    /// endpoint on its own and the last response to land wins.
    pub fn single_flight_refresh(mut self, enabled: bool) -> Self {
        self.single_flight_refresh = enabled;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<EnspmClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        let api_url = base_url.join(API_PREFIX)?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("enspm-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder().user_agent(user_agent).build()?;

        let session = self
            .session
            .unwrap_or_else(|| Arc::new(InMemorySessionStore::new()));

        Ok(EnspmClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                api_url,
                timeout: self.timeout,
                session,
                refresh_gate: self.single_flight_refresh.then(|| Mutex::new(())),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
