//! Load fixture documents from a YAML file.
//!
//! ```yaml
//! users:
//!   u1:
//!     profile: { displayName: Ada }
//!     outfits:
//!       o1: { title: Office, occasion: work, likes: 2, timesUsed: 1 }
//!     items:
//!       shirt: { name: Oxford shirt }
//!     wearLogs:
//!       l1: { itemIds: [shirt] }
//! ```
//!
//! Everything is written in one batch of `Set` writes, so a seed either lands
//! completely or not at all. Seeded wear logs do not fire the fan-out; use
//! `replay-wear-log` for that.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use wardrobe_core::wardrobe::{self, ITEMS, OUTFITS, WEAR_LOGS};
use wardrobe_core::{FieldUpdates, FieldValue, Fields, PathError, UserId, WriteBatch};
use wardrobe_functions::store::DocumentStore;

use super::{CliError, connect};

/// Parsed seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: BTreeMap<String, SeedUser>,
}

/// Documents owned by one user.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUser {
    /// Fields of the `users/{uid}` document itself.
    #[serde(default)]
    pub profile: Option<Fields>,
    #[serde(default)]
    pub outfits: BTreeMap<String, Fields>,
    #[serde(default)]
    pub items: BTreeMap<String, Fields>,
    #[serde(default)]
    pub wear_logs: BTreeMap<String, Fields>,
}

fn as_updates(fields: &Fields) -> FieldUpdates {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), FieldValue::Value(v.clone())))
        .collect()
}

/// Turn a seed file into one batch of `Set` writes.
///
/// # Errors
///
/// Returns `PathError` if a uid or document id cannot name a document.
pub fn build_batch(seed: &SeedFile) -> Result<WriteBatch, PathError> {
    let mut batch = WriteBatch::new();
    for (uid, user) in &seed.users {
        let uid = UserId::new(uid.as_str());
        let user_doc = wardrobe::user_doc(&uid)?;

        if let Some(profile) = &user.profile {
            batch.set(user_doc.clone(), as_updates(profile));
        }
        for (collection, docs) in [
            (OUTFITS, &user.outfits),
            (ITEMS, &user.items),
            (WEAR_LOGS, &user.wear_logs),
        ] {
            let collection = user_doc.collection(collection)?;
            for (id, fields) in docs {
                batch.set(collection.doc(id)?, as_updates(fields));
            }
        }
    }
    Ok(batch)
}

/// Seed the document store from `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the commit fails.
pub async fn run(file_path: &str) -> Result<(), CliError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading seed file");

    // Read and validate before connecting
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: file_path.to_string(),
            source,
        })?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;
    let batch = build_batch(&seed)?;

    if batch.is_empty() {
        info!("Seed file has no documents");
        return Ok(());
    }

    let store = connect().await?;
    let result = store.commit(batch).await?;

    info!(
        users = seed.users.len(),
        documents = result.write_count,
        "Seeding complete!"
    );
    Ok(())
}
