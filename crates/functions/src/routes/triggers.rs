//! Document event triggers.
//!
//! The host posts one event per created document. Only paths matching
//! `users/{uid}/wearLogs/{logId}` are routed; anything else is rejected so a
//! misconfigured subscription shows up as client errors instead of silence.

use std::sync::LazyLock;

use axum::{body::Bytes, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use wardrobe_core::wardrobe::WEAR_LOG_CREATED_PATTERN;
use wardrobe_core::{DocumentPath, Fields, PathPattern, UserId, WearLogId};

use crate::error::{FunctionError, Result};
use crate::handlers::{self, WearLogEvent};
use crate::state::AppState;

#[allow(clippy::expect_used)]
static WEAR_LOG_PATTERN: LazyLock<PathPattern> = LazyLock::new(|| {
    PathPattern::parse(WEAR_LOG_CREATED_PATTERN).expect("wear log pattern is valid")
});

/// Body of a document creation event.
#[derive(Debug, Deserialize)]
pub struct DocumentEvent {
    /// Full path of the created document.
    pub document: String,
    /// Document contents at creation. Anything but an object reads as no
    /// snapshot.
    #[serde(default)]
    pub value: Option<Value>,
}

impl DocumentEvent {
    /// The snapshot as a field map, if it is one.
    fn into_fields(self) -> Option<Fields> {
        match self.value {
            Some(Value::Object(fields)) => Some(fields),
            None | Some(Value::Null) => None,
            Some(other) => {
                warn!(
                    document = %self.document,
                    value = %other,
                    "Ignoring non-object snapshot"
                );
                None
            }
        }
    }
}

/// `POST /triggers/document.create`
pub async fn document_created(State(state): State<AppState>, body: Bytes) -> Result<StatusCode> {
    let event: DocumentEvent = serde_json::from_slice(&body)
        .map_err(|e| FunctionError::InvalidArgument(format!("malformed event: {e}")))?;

    let path = DocumentPath::parse(&event.document)?;
    let params = WEAR_LOG_PATTERN.matches(&path).ok_or_else(|| {
        FunctionError::InvalidArgument(format!("no trigger for document {path}"))
    })?;

    let (Some(uid), Some(log_id)) = (params.get("uid"), params.get("logId")) else {
        return Err(FunctionError::InvalidArgument(format!(
            "no trigger for document {path}"
        )));
    };
    let (uid, log_id) = (UserId::new(uid), WearLogId::new(log_id));
    let fields = event.into_fields();

    let report = handlers::on_wear_log_create(
        state.store(),
        WearLogEvent {
            uid,
            log_id,
            fields,
        },
    )
    .await?;

    debug!(writes = report.writes, "Trigger delivered");
    Ok(StatusCode::NO_CONTENT)
}
