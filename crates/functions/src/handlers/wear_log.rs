//! Wear log fan-out trigger.
//!
//! Runs once per created `users/{uid}/wearLogs/{logId}` document. Every item
//! the log references gets `wornCount` incremented and `lastWornAt` set to the
//! commit time, all in a single batch: either every update lands or none do.

use tracing::{info, instrument, warn};

use wardrobe_core::wardrobe::{self, Item, WearLog};
use wardrobe_core::{Fields, ItemId, PathError, UserId, WearLogId, WriteBatch};

use crate::error::Result;
use crate::store::DocumentStore;

/// A created wear log, as routed to the trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct WearLogEvent {
    pub uid: UserId,
    pub log_id: WearLogId,
    /// Document contents at creation. `None` when the host sent no snapshot.
    pub fields: Option<Fields>,
}

/// Outcome of one trigger run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Items referenced by the log, duplicates included.
    pub item_ids: Vec<ItemId>,
    /// Updates committed. Zero when nothing was committed.
    pub writes: usize,
}

/// Build the batch for a log: one update per listed id, in list order.
///
/// A repeated id yields one update per occurrence.
///
/// # Errors
///
/// Returns `PathError` if the uid or an item id cannot name a document.
pub fn stage_fanout(
    uid: &UserId,
    item_ids: &[ItemId],
) -> std::result::Result<WriteBatch, PathError> {
    let mut batch = WriteBatch::new();
    for item in item_ids {
        batch.update(wardrobe::item_doc(uid, item)?, Item::wear_updates());
    }
    Ok(batch)
}

/// Handle a wear log creation.
///
/// Logs without a usable `itemIds` list complete without writing anything.
///
/// # Errors
///
/// Returns `FunctionError::Store` if the commit fails, including when a
/// referenced item does not exist. Nothing is applied in that case.
#[instrument(skip_all, fields(uid = %event.uid, log_id = %event.log_id))]
pub async fn on_wear_log_create<S: DocumentStore>(
    store: &S,
    event: WearLogEvent,
) -> Result<FanoutReport> {
    let log = match WearLog::from_fields(event.fields.as_ref()) {
        Ok(log) => log,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed wear log");
            return Ok(FanoutReport::default());
        }
    };

    let Some(item_ids) = log.item_ids else {
        return Ok(FanoutReport::default());
    };

    let batch = stage_fanout(&event.uid, &item_ids)?;
    let writes = if batch.is_empty() {
        0
    } else {
        store.commit(batch).await?.write_count
    };

    info!(uid = %event.uid, item_ids = ?item_ids, "Wear log processed");

    Ok(FanoutReport { item_ids, writes })
}
