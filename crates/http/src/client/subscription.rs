//! Subscription API client methods

use super::{ClientError, FolioClient};
use crate::types::{SubscribeRequest, Subscription};
use folio_core::Plan;
use reqwest::Method;

impl FolioClient {
    /// List the available plans
    pub async fn plans(&self) -> Result<Vec<Plan>, ClientError> {
        self.request_json(Method::GET, "/subscriptions/plans", None)
            .await
    }

    /// The current subscription, or `None` if the user has none
    pub async fn current_subscription(&self) -> Result<Option<Subscription>, ClientError> {
        match self
            .request_json(Method::GET, "/subscriptions/current", None)
            .await
        {
            Ok(subscription) => Ok(Some(subscription)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Subscribe to a plan
    pub async fn subscribe(&self, plan_id: &str) -> Result<Subscription, ClientError> {
        let body = serde_json::to_value(SubscribeRequest {
            plan_id: plan_id.to_string(),
        })?;
        self.request_json(Method::POST, "/subscriptions", Some(&body))
            .await
    }
}
