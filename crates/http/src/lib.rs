//! Folio HTTP client
//!
//! Authenticated access to the Folio dashboard API: bearer-token injection,
//! single-flight token refresh, persisted credentials and session events,
//! plus the typed domain services built on top of them.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod types;

pub use client::{
    FolioClient, FolioClientBuilder,
    config::{ClientConfig, Environment},
    credentials::{CredentialStore, KeyValueStorage, MemoryStorage, TokenPair},
    error::{ClientError, RefreshError},
    navigation::SignInNavigator,
    session::{SessionEvent, SessionEvents},
};
