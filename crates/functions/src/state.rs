//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::FunctionsConfig;
use crate::store::Store;

/// Application state shared across all routes.
///
/// Cheaply cloneable via `Arc`. The store is the same client installed with
/// [`crate::store::init_global`] in the binary; tests pass their own.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: FunctionsConfig,
    store: Arc<Store>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: FunctionsConfig, store: Arc<Store>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the functions configuration.
    #[must_use]
    pub fn config(&self) -> &FunctionsConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }
}
