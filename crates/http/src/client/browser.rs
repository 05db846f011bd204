//! Browser bindings: `localStorage` credentials and `window.location` redirects

use super::credentials::KeyValueStorage;
use super::error::StorageError;
use super::navigation::SignInNavigator;
use web_sys::Storage;

fn local_storage() -> Result<Storage, StorageError> {
    web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("no window".into()))?
        .local_storage()
        .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
        .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
}

/// Credentials kept in the page's `localStorage`
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserStorage;

impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        local_storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))
    }
}

/// Full page navigation through `window.location`
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

impl SignInNavigator for BrowserNavigator {
    fn navigate_to_sign_in(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.location().set_href(path) {
            error!("failed to navigate to {path}: {e:?}");
        }
    }
}
