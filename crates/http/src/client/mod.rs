//! Folio HTTP client
//!
//! Every call goes through [`FolioClient::request`], which injects the stored
//! access token and recovers from `401 Unauthorized` with at most one shared
//! token refresh:
//!
//! 1. A 401 is final if no refresh token is stored, if the failing call is the
//!    refresh call itself, or if the call was already replayed once.
//! 2. Otherwise the call joins the current refresh cycle, or starts one.
//! 3. The leader posts the refresh token to `/auth/refresh-token`. On success
//!    the new access token is stored and every waiting call is replayed with
//!    it. On failure the tokens are cleared, `auth:logout` is published, all
//!    waiting calls fail with the same [`RefreshError`], and the user is sent
//!    to the sign-in path.
//!
//! Any status other than 401 is returned to the caller untouched.

pub mod address;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod navigation;
pub mod portfolio;
pub mod profile;
pub mod session;
pub mod stock;
pub mod subscription;

#[cfg(target_arch = "wasm32")]
pub mod browser;

mod refresh;

use crate::types::{RefreshTokenRequest, RefreshTokenResponse};
use config::ClientConfig;
use credentials::{CredentialStore, KeyValueStorage};
use error::{ClientError, RefreshError};
use navigation::SignInNavigator;
use refresh::{RefreshCoordinator, RefreshTicket};
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use session::{SessionEvent, SessionEvents};
use std::fmt;
use std::sync::Arc;

pub use auth::{REFRESH_TOKEN_PATH, REGISTER_PATH, SIGN_IN_PATH, SIGN_OUT_PATH};

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_USER_AGENT: &str = concat!("folio-client/", env!("CARGO_PKG_VERSION"));

/// Folio API client
///
/// Cheap to clone; clones share credentials, session events and the refresh
/// state, so concurrent calls from any clone take part in the same refresh
/// cycle.
#[derive(Clone)]
pub struct FolioClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    base_url: String,
    config: ClientConfig,
    credentials: CredentialStore,
    events: SessionEvents,
    navigator: Arc<dyn SignInNavigator>,
    refresh: RefreshCoordinator,
}

impl fmt::Debug for FolioClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FolioClient")
            .field("base_url", &self.inner.base_url)
            .field("environment", &self.inner.config.environment)
            .finish_non_exhaustive()
    }
}

impl FolioClient {
    /// Create a client with default collaborators for the target platform
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> FolioClientBuilder {
        FolioClientBuilder::new(config)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    pub fn events(&self) -> &SessionEvents {
        &self.inner.events
    }

    /// Whether a token refresh cycle is currently in flight
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Send a request with the stored bearer token
    ///
    /// Returns the raw response for every status except a 401 that could not
    /// be recovered by a refresh.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AuthenticationFailed`] for a final 401
    /// - [`ClientError::RefreshFailed`] when the shared refresh failed
    /// - [`ClientError::Request`] for transport failures, which are never retried
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let mut token = self.inner.credentials.access_token()?;
        let mut retried = false;

        loop {
            let response = self.dispatch(&method, path, body, token.as_deref()).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            if retried || is_refresh_path(path) {
                debug!(%method, path, retried, "401 is final");
                return Err(ClientError::from_response(response).await);
            }
            if self.inner.credentials.refresh_token()?.is_none() {
                debug!(%method, path, "401 without a refresh token");
                return Err(ClientError::from_response(response).await);
            }

            retried = true;
            token = Some(self.fresh_access_token(token.as_deref()).await?);
            debug!(%method, path, "replaying request with refreshed token");
        }
    }

    /// Send a request and decode a successful JSON body
    ///
    /// # Errors
    ///
    /// Non-2xx statuses become the matching [`ClientError`] variant.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ClientError> {
        let response = self.request(method, path, body).await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(ClientError::from_response(response).await)
        }
    }

    /// Send a request whose successful body is irrelevant
    pub async fn request_empty(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(), ClientError> {
        let response = self.request(method, path, body).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClientError::from_response(response).await)
        }
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response, reqwest::Error> {
        let url = format!("{}{}", self.inner.base_url, path);
        let mut request = self.inner.http.request(method.clone(), url);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        trace!(%method, path, authenticated = token.is_some(), "sending request");
        request.send().await
    }

    /// Obtain an access token newer than `stale`, refreshing at most once
    /// across all concurrent callers
    async fn fresh_access_token(&self, stale: Option<&str>) -> Result<String, ClientError> {
        let credentials = &self.inner.credentials;
        let ticket = self.inner.refresh.enter(|| {
            Ok(credentials
                .access_token()?
                .filter(|current| Some(current.as_str()) != stale))
        })?;

        let outcome = match ticket {
            RefreshTicket::Rotated(token) => return Ok(token),
            RefreshTicket::Wait(rx) => refresh::wait(rx).await,
            RefreshTicket::Lead(lease) => {
                let outcome = self.refresh_access_token().await;
                match &outcome {
                    Ok(_) => {
                        let woken = lease.complete(&outcome);
                        info!(woken, "access token refreshed");
                    }
                    Err(e) => {
                        warn!("token refresh failed, ending session: {e}");
                        self.end_session();
                        let woken = lease.complete(&outcome);
                        debug!(woken, "failed waiting requests");
                        self.inner
                            .navigator
                            .navigate_to_sign_in(&self.inner.config.sign_in_path);
                    }
                }
                outcome
            }
        };

        Ok(outcome?)
    }

    /// The refresh call itself. Never enters the refresh protocol.
    async fn refresh_access_token(&self) -> Result<String, RefreshError> {
        let credentials = &self.inner.credentials;
        let refresh_token = credentials
            .refresh_token()
            .map_err(|e| RefreshError::Storage(e.to_string()))?
            .ok_or(RefreshError::MissingRefreshToken)?;

        let url = format!("{}{}", self.inner.base_url, REFRESH_TOKEN_PATH);
        let mut request = self
            .inner
            .http
            .post(url)
            .json(&RefreshTokenRequest { refresh_token });

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.inner.config.refresh_timeout() {
            request = request.timeout(timeout);
        }

        debug!("requesting new access token");
        let response = request
            .send()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: RefreshTokenResponse = response
            .json()
            .await
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;
        if body.access_token.is_empty() {
            return Err(RefreshError::InvalidResponse("empty access token".into()));
        }

        let rotated = body.refresh_token.as_deref().filter(|t| !t.is_empty());
        credentials
            .rotate(&body.access_token, rotated)
            .map_err(|e| RefreshError::Storage(e.to_string()))?;

        Ok(body.access_token)
    }

    /// Drop the stored tokens and announce the logout
    fn end_session(&self) {
        if let Err(e) = self.inner.credentials.clear_tokens() {
            error!("failed to clear credentials: {e}");
        }
        self.inner.events.publish(SessionEvent::LoggedOut);
    }
}

/// Whether `path` addresses the refresh endpoint, ignoring any query string,
/// fragment or trailing slash
fn is_refresh_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.trim_end_matches('/') == REFRESH_TOKEN_PATH
}

/// Accept a single URL path segment made of ASCII letters, digits, `-`, `_`
/// and `.`
pub(crate) fn path_segment<'a>(what: &str, value: &'a str) -> Result<&'a str, ClientError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(value)
    } else {
        Err(ClientError::InvalidInput(format!("invalid {what} '{value}'")))
    }
}

/// Builder for [`FolioClient`]
pub struct FolioClientBuilder {
    config: ClientConfig,
    credentials: Option<CredentialStore>,
    events: Option<SessionEvents>,
    navigator: Option<Arc<dyn SignInNavigator>>,
}

impl FolioClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            credentials: None,
            events: None,
            navigator: None,
        }
    }

    /// Keep credentials in the given storage backend
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.credentials = Some(CredentialStore::new(storage));
        self
    }

    /// Share an existing credential store
    #[must_use]
    pub fn credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Publish session events on this channel instead of the global one
    #[must_use]
    pub fn events(mut self, events: SessionEvents) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn SignInNavigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<FolioClient, ClientError> {
        let base_url = self.config.validate()?;

        let client_builder = ClientBuilder::new();

        // The browser owns timeouts and the User-Agent header
        #[cfg(not(target_arch = "wasm32"))]
        let client_builder = {
            let mut builder = client_builder.user_agent(
                self.config
                    .user_agent
                    .clone()
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            );
            if let Some(timeout) = self.config.timeout() {
                builder = builder.timeout(timeout);
            }
            builder
        };

        let http = client_builder.build()?;

        debug!(%base_url, environment = %self.config.environment, "building folio client");

        Ok(FolioClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                credentials: self.credentials.unwrap_or_else(default_credentials),
                events: self
                    .events
                    .unwrap_or_else(|| SessionEvents::global().clone()),
                navigator: self.navigator.unwrap_or_else(default_navigator),
                refresh: RefreshCoordinator::default(),
                config: self.config,
            }),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_credentials() -> CredentialStore {
    CredentialStore::in_memory()
}

#[cfg(target_arch = "wasm32")]
fn default_credentials() -> CredentialStore {
    CredentialStore::new(Arc::new(browser::BrowserStorage))
}

#[cfg(not(target_arch = "wasm32"))]
fn default_navigator() -> Arc<dyn SignInNavigator> {
    Arc::new(navigation::LogNavigator)
}

#[cfg(target_arch = "wasm32")]
fn default_navigator() -> Arc<dyn SignInNavigator> {
    Arc::new(browser::BrowserNavigator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_path_variants() {
        assert!(is_refresh_path("/auth/refresh-token"));
        assert!(is_refresh_path("/auth/refresh-token/"));
        assert!(is_refresh_path("/auth/refresh-token?source=web"));
        assert!(is_refresh_path("/auth/refresh-token/?x=1#top"));
        assert!(!is_refresh_path("/auth/refresh-token-v2"));
        assert!(!is_refresh_path("/auth/signin"));
    }
}
