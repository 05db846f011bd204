//! Address book API client methods

use super::{ClientError, FolioClient, path_segment};
use crate::types::{Address, NewAddress};
use reqwest::Method;

impl FolioClient {
    /// List saved addresses
    pub async fn addresses(&self) -> Result<Vec<Address>, ClientError> {
        self.request_json(Method::GET, "/addresses", None).await
    }

    /// Save a new address
    pub async fn add_address(&self, address: &NewAddress) -> Result<Address, ClientError> {
        let body = serde_json::to_value(address)?;
        self.request_json(Method::POST, "/addresses", Some(&body))
            .await
    }

    /// Delete a saved address
    pub async fn delete_address(&self, id: &str) -> Result<(), ClientError> {
        let id = path_segment("address id", id)?;
        self.request_empty(Method::DELETE, &format!("/addresses/{id}"), None)
            .await
    }
}
