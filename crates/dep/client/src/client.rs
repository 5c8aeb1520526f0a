//! The authenticated DEP transport.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use dep_core::DepConfig;
use dep_storage::{AuthTokenStore, ConfigStore};

use crate::session::SessionMap;
use crate::{oauth1, DepError, HttpError};

/// Media type of DEP request and response bodies.
pub const MEDIA_TYPE: &str = "application/json;charset=UTF8";

/// Default HTTP User-Agent.
pub const DEFAULT_USER_AGENT: &str = concat!("depgate/", env!("CARGO_PKG_VERSION"));

/// The storage a DEP client reads to talk to Apple: OAuth1 tokens and the
/// per-name config.
pub trait ClientStorage: AuthTokenStore + ConfigStore {}

impl<T: AuthTokenStore + ConfigStore> ClientStorage for T {}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    auth_session_token: String,
}

/// An Apple DEP API client.
///
/// Cheap to clone; clones share the HTTP connection pool and the session
/// token cache.
#[derive(Clone)]
pub struct DepClient<S> {
    store: S,
    http: reqwest::Client,
    sessions: SessionMap,
    user_agent: String,
}

impl<S: ClientStorage> DepClient<S> {
    /// Create a new client reading credentials and config from `store`.
    pub fn new(store: S) -> Self {
        Self::with_http_client(store, reqwest::Client::new())
    }

    /// Create a new client using the provided HTTP client.
    pub fn with_http_client(store: S, http: reqwest::Client) -> Self {
        Self {
            store,
            http,
            sessions: SessionMap::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Override the HTTP User-Agent used on each request.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolve the effective DEP URL for a name and path.
    fn url_for(&self, name: &str, path: &str) -> Result<Url, DepError> {
        let config = self.store.retrieve_config(name)?;
        let base = DepConfig::base_url_or_default(config.as_ref());
        let full = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&full).map_err(|e| DepError::Url(e.to_string()))
    }

    /// The cached session token for a name, fetching one if absent.
    ///
    /// Holding the per-name slot lock across the fetch makes the refresh
    /// single-flight: under N concurrent callers exactly one `/session`
    /// request goes upstream.
    async fn session_token(&self, name: &str) -> Result<String, DepError> {
        let slot = self.sessions.slot(name);
        let mut token = slot.lock().await;
        if let Some(token) = token.as_ref() {
            return Ok(token.clone());
        }
        let fresh = self.fetch_session(name).await?;
        *token = Some(fresh.clone());
        Ok(fresh)
    }

    /// Sign a `GET /session` with the stored OAuth1 credentials and parse
    /// the returned session token.
    async fn fetch_session(&self, name: &str) -> Result<String, DepError> {
        let tokens = self.store.retrieve_auth_tokens(name)?;
        let url = self.url_for(name, "/session")?;
        let authorization = oauth1::authorization_header("GET", &url, &tokens);

        tracing::debug!(name = %name, "requesting new DEP session");

        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DepError::Auth { status: status.as_u16(), body });
        }
        let session: SessionResponse = resp.json().await?;
        Ok(session.auth_session_token)
    }

    /// Execute one DEP API request for a name: JSON in, JSON out, with
    /// transparent session handling. A 401 invalidates the cached session
    /// and is retried exactly once; a second 401 is a credential failure.
    pub(crate) async fn do_request<B, R>(
        &self,
        name: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<R, DepError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url_for(name, path)?;
        let body_bytes = body.map(serde_json::to_vec).transpose()?;

        let mut token = self.session_token(name).await?;
        let mut retried = false;
        loop {
            let mut req = self
                .http
                .request(method.clone(), url.clone())
                .header("X-ADM-Auth-Session", token.as_str())
                .header(USER_AGENT, self.user_agent.as_str())
                .header(ACCEPT, MEDIA_TYPE);
            if let Some(bytes) = &body_bytes {
                req = req.header(CONTENT_TYPE, MEDIA_TYPE).body(bytes.clone());
            }

            let resp = req.send().await?;
            let status = resp.status();

            if status == StatusCode::UNAUTHORIZED {
                let body = resp.text().await.unwrap_or_default();
                if retried {
                    return Err(DepError::Auth { status: status.as_u16(), body });
                }
                tracing::debug!(name = %name, "DEP session rejected; re-authenticating");
                self.sessions.invalidate(name, &token).await;
                token = self.session_token(name).await?;
                retried = true;
                continue;
            }

            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(DepError::Http(HttpError {
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or_default().to_string(),
                    body,
                }));
            }

            return Ok(resp.json().await?);
        }
    }

    /// A body-less GET request.
    pub(crate) async fn get<R: DeserializeOwned>(
        &self,
        name: &str,
        path: &str,
    ) -> Result<R, DepError> {
        self.do_request::<(), R>(name, Method::GET, path, None).await
    }
}
