//! Integration tests for the wardrobe functions host.
//!
//! Each test starts the real HTTP app on an ephemeral port, backed by a fresh
//! in-memory document store, and drives it with `reqwest`.
//!
//! ```bash
//! cargo test -p wardrobe-integration-tests
//! ```

use std::sync::Arc;

use reqwest::{Client, Response};
use serde_json::Value;

use wardrobe_core::{DocumentPath, Fields};
use wardrobe_functions::config::FunctionsConfig;
use wardrobe_functions::store::{DocumentStore, MemoryStore, Store};
use wardrobe_functions::{AppState, app};

/// A running host plus a handle on its store.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub store: MemoryStore,
    pub auth_header: String,
}

impl TestContext {
    /// Start a host on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let config = FunctionsConfig::in_memory();
        let auth_header = config.auth_header.clone();
        let store = MemoryStore::new();
        let state = AppState::new(config.clone(), Arc::new(Store::Memory(store.clone())));

        let listener = tokio::net::TcpListener::bind(config.socket_addr())
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            store,
            auth_header,
        }
    }

    /// Put a fixture document. `value` must be a JSON object.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a document path.
    #[allow(clippy::expect_used)]
    pub async fn put(&self, path: &str, value: Value) {
        let fields = match value {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        let path = DocumentPath::parse(path).expect("fixture path is a document");
        self.store.insert(path, fields).await;
    }

    /// Read a document's fields.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a document path.
    #[allow(clippy::expect_used)]
    pub async fn fields(&self, path: &str) -> Option<Fields> {
        let path = DocumentPath::parse(path).expect("path is a document");
        self.store
            .get(&path)
            .await
            .expect("memory store reads do not fail")
            .map(|doc| doc.fields)
    }

    /// Call `recommendOutfits`, optionally as `uid`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    #[allow(clippy::expect_used)]
    pub async fn recommend(&self, uid: Option<&str>, body: &Value) -> Response {
        let mut request = self
            .client
            .post(format!("{}/recommendOutfits", self.base_url))
            .json(body);
        if let Some(uid) = uid {
            request = request.header(self.auth_header.as_str(), uid);
        }
        request.send().await.expect("Failed to call recommendOutfits")
    }

    /// Deliver a document creation event.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    #[allow(clippy::expect_used)]
    pub async fn document_created(&self, event: &Value) -> Response {
        self.client
            .post(format!("{}/triggers/document.create", self.base_url))
            .json(event)
            .send()
            .await
            .expect("Failed to deliver trigger")
    }
}
