//! Re-run the wear log fan-out for an existing log.
//!
//! Manual redelivery: every run increments the referenced items again.

use tracing::info;

use wardrobe_core::wardrobe;
use wardrobe_core::{UserId, WearLogId};
use wardrobe_functions::handlers::{self, WearLogEvent};
use wardrobe_functions::store::DocumentStore;

use super::{CliError, connect};

/// Replay the fan-out for `users/{uid}/wearLogs/{log_id}`.
///
/// # Errors
///
/// Returns an error if the log does not exist or the commit fails.
pub async fn run(uid: &str, log_id: &str) -> Result<(), CliError> {
    let uid = UserId::new(uid);
    let log_id = WearLogId::new(log_id);
    let path = wardrobe::wear_log_doc(&uid, &log_id)?;

    let store = connect().await?;
    let log = store
        .get(&path)
        .await?
        .ok_or_else(|| CliError::NotFound(path.to_string()))?;

    let report = handlers::on_wear_log_create(
        &store,
        WearLogEvent {
            uid,
            log_id,
            fields: Some(log.fields),
        },
    )
    .await?;

    info!(writes = report.writes, "Replay complete!");
    Ok(())
}
