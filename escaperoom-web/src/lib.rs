//! Browser-side implementations of the escape-room core traits.
//!
//! The UI layer (components, routing, drag-and-drop) lives outside this
//! workspace; these adapters are the whole interface between the core and
//! the browser: `localStorage` as the durable medium and `Date.now()` as
//! the wall clock. The UI owns the instructor polling timer and must
//! clear it on teardown.

use escaperoom_core::{Clock, ProgressStorage};
use gloo::storage::{LocalStorage, Storage};

/// `ProgressStorage` over `window.localStorage`.
pub struct BrowserStorage;

#[derive(Debug, thiserror::Error)]
pub enum BrowserStorageError {
    #[error("localStorage error: {0}")]
    Storage(String),
}

impl ProgressStorage for BrowserStorage {
    type Error = BrowserStorageError;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| BrowserStorageError::Storage(format!("{e:?}")))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        // Fails in private-browsing mode or on quota; the core logs and
        // keeps the in-memory state authoritative.
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| BrowserStorageError::Storage(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        LocalStorage::raw()
            .remove_item(key)
            .map_err(|e| BrowserStorageError::Storage(format!("{e:?}")))
    }
}

/// Wall clock over `Date.now()`; `SystemTime` is unavailable on
/// `wasm32-unknown-unknown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> u64 {
        let now = js_sys::Date::now();
        if now.is_finite() && now >= 0.0 {
            now as u64
        } else {
            0
        }
    }
}

/// Progress store wired to the browser adapters.
#[must_use]
pub fn create_browser_store() -> escaperoom_core::ProgressStore<BrowserStorage, BrowserClock> {
    escaperoom_core::ProgressStore::new(BrowserStorage, BrowserClock)
}

/// Instructor board wired to the browser storage.
#[must_use]
pub fn create_browser_board() -> escaperoom_core::InstructorBoard<BrowserStorage> {
    escaperoom_core::InstructorBoard::new(BrowserStorage)
}
