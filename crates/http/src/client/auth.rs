//! Authentication API client methods

use super::credentials::TokenPair;
use super::session::SessionEvent;
use super::{ClientError, FolioClient};
use crate::types::{
    RegisterRequest, RegisterResponse, SignInRequest, SignInResponse, SignOutRequest,
};
use reqwest::Method;

pub const SIGN_IN_PATH: &str = "/auth/signin";
pub const REGISTER_PATH: &str = "/auth/register";
pub const SIGN_OUT_PATH: &str = "/auth/signout";
pub const REFRESH_TOKEN_PATH: &str = "/auth/refresh-token";

impl FolioClient {
    /// Sign in, persist both tokens and the keep-connected choice, then
    /// publish `auth:login`
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<TokenPair, ClientError> {
        let body = serde_json::to_value(request)?;
        let response: SignInResponse = self
            .request_json(Method::POST, SIGN_IN_PATH, Some(&body))
            .await?;

        let tokens = TokenPair {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        };
        self.credentials().store_tokens(&tokens)?;
        self.credentials()
            .set_keep_connected(request.keep_connected)?;

        info!(email = %request.email, "signed in");
        self.events().publish(SessionEvent::LoggedIn);
        Ok(tokens)
    }

    /// Create an account. Only an access token is issued, so the session
    /// cannot be refreshed until the next sign-in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ClientError> {
        let body = serde_json::to_value(request)?;
        let response: RegisterResponse = self
            .request_json(Method::POST, REGISTER_PATH, Some(&body))
            .await?;

        self.credentials().store_access_token(&response.access_token)?;

        info!(email = %request.email, "registered");
        self.events().publish(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Revoke the refresh token server-side and end the local session
    ///
    /// Local credentials are cleared and `auth:logout` is published even when
    /// the server call fails; that failure is still returned.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let result = match self.credentials().refresh_token()? {
            Some(token) => {
                let body = serde_json::to_value(SignOutRequest { token })?;
                self.request_empty(Method::POST, SIGN_OUT_PATH, Some(&body))
                    .await
            }
            None => Ok(()),
        };

        if let Err(e) = &result {
            warn!("server sign-out failed: {e}");
        }

        self.credentials().clear_tokens()?;
        info!("signed out");
        self.events().publish(SessionEvent::LoggedOut);
        result
    }

    /// Whether an access token is currently stored
    pub fn is_authenticated(&self) -> Result<bool, ClientError> {
        Ok(self.credentials().access_token()?.is_some())
    }
}
