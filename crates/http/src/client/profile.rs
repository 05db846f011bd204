//! Profile API client methods

use super::{ClientError, FolioClient};
use crate::types::{Profile, UpdateProfileRequest};
use reqwest::Method;

impl FolioClient {
    /// Get the signed-in user's profile
    pub async fn profile(&self) -> Result<Profile, ClientError> {
        self.request_json(Method::GET, "/users/me", None).await
    }

    /// Update the signed-in user's profile
    pub async fn update_profile(
        &self,
        request: &UpdateProfileRequest,
    ) -> Result<Profile, ClientError> {
        let body = serde_json::to_value(request)?;
        self.request_json(Method::PUT, "/users/me", Some(&body))
            .await
    }
}
