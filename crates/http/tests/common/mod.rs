//! Shared fixtures for the client integration tests

#![allow(dead_code)]

use folio_http::{
    ClientConfig, CredentialStore, FolioClient, SessionEvents, SignInNavigator, TokenPair,
};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

/// Records every forced navigation instead of performing it
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

impl SignInNavigator for RecordingNavigator {
    fn navigate_to_sign_in(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_string());
    }
}

pub struct Harness {
    pub client: FolioClient,
    pub credentials: CredentialStore,
    pub events: SessionEvents,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn harness(server: &MockServer) -> Harness {
    let credentials = CredentialStore::in_memory();
    let events = SessionEvents::new();
    let navigator = Arc::new(RecordingNavigator::default());

    let client = FolioClient::builder(ClientConfig::new(server.uri()).with_sign_in_path("/"))
        .credentials(credentials.clone())
        .events(events.clone())
        .navigator(navigator.clone())
        .build()
        .unwrap();

    Harness {
        client,
        credentials,
        events,
        navigator,
    }
}

pub fn signed_in(server: &MockServer, access: &str, refresh: &str) -> Harness {
    let harness = harness(server);
    harness
        .credentials
        .store_tokens(&TokenPair {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        })
        .unwrap();
    harness
}

pub async fn requests_to(server: &MockServer, path: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.url.path() == path)
        .collect()
}

pub fn bearer(request: &wiremock::Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
