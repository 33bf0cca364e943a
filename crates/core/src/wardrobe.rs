//! Wardrobe documents and their layout in the store.
//!
//! ```text
//! users/{uid}/outfits/{outfitId}   title, occasion, likes, timesUsed
//! users/{uid}/items/{itemId}       wornCount, lastWornAt
//! users/{uid}/wearLogs/{logId}     itemIds
//! ```
//!
//! Documents are schema-flexible, so every reader here is lenient: missing
//! counters read as zero and a missing title reads as empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{
    CollectionPath, Document, DocumentPath, FieldUpdates, FieldValue, Fields, ItemId, OutfitId,
    PathError, UserId, WearLogId,
};

/// Top-level users collection.
pub const USERS: &str = "users";
/// Per-user outfits sub-collection.
pub const OUTFITS: &str = "outfits";
/// Per-user items sub-collection.
pub const ITEMS: &str = "items";
/// Per-user wear logs sub-collection.
pub const WEAR_LOGS: &str = "wearLogs";

/// Document pattern whose creation triggers the wear log fan-out.
pub const WEAR_LOG_CREATED_PATTERN: &str = "users/{uid}/wearLogs/{logId}";

/// Field names as stored.
pub mod field {
    /// Outfit display title.
    pub const TITLE: &str = "title";
    /// Outfit occasion tag.
    pub const OCCASION: &str = "occasion";
    /// Outfit like counter.
    pub const LIKES: &str = "likes";
    /// Outfit usage counter.
    pub const TIMES_USED: &str = "timesUsed";
    /// Item wear counter.
    pub const WORN_COUNT: &str = "wornCount";
    /// Item last wear time.
    pub const LAST_WORN_AT: &str = "lastWornAt";
    /// Wear log item references.
    pub const ITEM_IDS: &str = "itemIds";
}

/// `users/{uid}`
///
/// # Errors
///
/// Returns an error if `uid` is not a valid path segment.
pub fn user_doc(uid: &UserId) -> Result<DocumentPath, PathError> {
    CollectionPath::root(USERS)?.doc(uid.as_str())
}

/// `users/{uid}/outfits`
///
/// # Errors
///
/// Returns an error if `uid` is not a valid path segment.
pub fn outfits(uid: &UserId) -> Result<CollectionPath, PathError> {
    user_doc(uid)?.collection(OUTFITS)
}

/// `users/{uid}/items`
///
/// # Errors
///
/// Returns an error if `uid` is not a valid path segment.
pub fn items(uid: &UserId) -> Result<CollectionPath, PathError> {
    user_doc(uid)?.collection(ITEMS)
}

/// `users/{uid}/items/{itemId}`
///
/// # Errors
///
/// Returns an error if either id is not a valid path segment.
pub fn item_doc(uid: &UserId, item: &ItemId) -> Result<DocumentPath, PathError> {
    items(uid)?.doc(item.as_str())
}

/// `users/{uid}/wearLogs/{logId}`
///
/// # Errors
///
/// Returns an error if either id is not a valid path segment.
pub fn wear_log_doc(uid: &UserId, log: &WearLogId) -> Result<DocumentPath, PathError> {
    user_doc(uid)?.collection(WEAR_LOGS)?.doc(log.as_str())
}

/// An outfit as read for recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: OutfitId,
    pub title: String,
    pub occasion: Option<String>,
    pub likes: i64,
    pub times_used: i64,
}

impl Outfit {
    /// Read an outfit document.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: OutfitId::new(doc.id.clone()),
            title: doc.str_field(field::TITLE).unwrap_or_default().to_owned(),
            occasion: doc.str_field(field::OCCASION).map(str::to_owned),
            likes: doc.counter(field::LIKES),
            times_used: doc.counter(field::TIMES_USED),
        }
    }

    /// Popularity score: `likes + timesUsed`.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.likes.saturating_add(self.times_used)
    }
}

/// An item's wear statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub worn_count: i64,
    pub last_worn_at: Option<String>,
}

impl Item {
    /// Read an item document.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: ItemId::new(doc.id.clone()),
            worn_count: doc.counter(field::WORN_COUNT),
            last_worn_at: doc.str_field(field::LAST_WORN_AT).map(str::to_owned),
        }
    }

    /// Updates recording one wear: bump the counter, stamp the commit time.
    #[must_use]
    pub fn wear_updates() -> FieldUpdates {
        FieldUpdates::from([
            (field::WORN_COUNT.to_owned(), FieldValue::Increment(1)),
            (field::LAST_WORN_AT.to_owned(), FieldValue::ServerTimestamp),
        ])
    }
}

/// Ways a wear log payload can be malformed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WearLogError {
    /// `itemIds` is present but not a list.
    #[error("itemIds must be a list, got {0}")]
    ItemIdsNotAList(Value),
    /// An entry of `itemIds` cannot name a document.
    #[error("itemIds[{index}] is not a usable item id: {value}")]
    InvalidItemId {
        /// Position in the list.
        index: usize,
        /// The offending entry.
        value: Value,
    },
}

/// A wear log as delivered to the creation trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WearLog {
    /// Referenced items in log order, duplicates preserved. `None` when the
    /// field is absent or null.
    pub item_ids: Option<Vec<ItemId>>,
}

impl WearLog {
    /// Read the trigger payload. A missing payload reads as a log without
    /// `itemIds`.
    ///
    /// Integer entries are accepted and used in their decimal form.
    ///
    /// # Errors
    ///
    /// Returns an error if `itemIds` is not a list or holds entries that
    /// cannot be used as a document id.
    pub fn from_fields(fields: Option<&Fields>) -> Result<Self, WearLogError> {
        let raw = match fields.and_then(|f| f.get(field::ITEM_IDS)) {
            None | Some(Value::Null) => return Ok(Self { item_ids: None }),
            Some(Value::Array(raw)) => raw,
            Some(other) => return Err(WearLogError::ItemIdsNotAList(other.clone())),
        };

        let item_ids = raw
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let id = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
                    _ => String::new(),
                };
                if id.is_empty() || id.contains('/') {
                    return Err(WearLogError::InvalidItemId {
                        index,
                        value: value.clone(),
                    });
                }
                Ok(ItemId::new(id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            item_ids: Some(item_ids),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => Fields::new(),
        }
    }

    #[test]
    fn test_paths() {
        let uid = UserId::new("u1");
        assert_eq!(outfits(&uid).unwrap().to_string(), "users/u1/outfits");
        assert_eq!(
            item_doc(&uid, &ItemId::new("hat")).unwrap().to_string(),
            "users/u1/items/hat"
        );
        assert_eq!(
            wear_log_doc(&uid, &WearLogId::new("l1")).unwrap().to_string(),
            "users/u1/wearLogs/l1"
        );
        assert!(outfits(&UserId::new("a/b")).is_err());
    }

    #[test]
    fn test_outfit_defaults_and_score() {
        let doc = Document::new("o1", fields(json!({"occasion": "work", "likes": 2})));
        let outfit = Outfit::from_document(&doc);

        assert_eq!(outfit.id, OutfitId::new("o1"));
        assert_eq!(outfit.title, "");
        assert_eq!(outfit.occasion.as_deref(), Some("work"));
        assert_eq!(outfit.times_used, 0);
        assert_eq!(outfit.score(), 2);
    }

    #[test]
    fn test_outfit_score_counts_whole_float_counters() {
        let doc = Document::new(
            "o1",
            fields(json!({"occasion": "work", "likes": 2.0, "timesUsed": 3})),
        );
        assert_eq!(Outfit::from_document(&doc).score(), 5);
    }

    #[test]
    fn test_item_from_document() {
        let doc = Document::new(
            "shirt",
            fields(json!({"wornCount": 4, "lastWornAt": "2026-10-18T09:30:00.000Z"})),
        );
        let item = Item::from_document(&doc);
        assert_eq!(item.id, ItemId::new("shirt"));
        assert_eq!(item.worn_count, 4);
        assert_eq!(item.last_worn_at.as_deref(), Some("2026-10-18T09:30:00.000Z"));

        let bare = Item::from_document(&Document::new("hat", Fields::new()));
        assert_eq!(bare.worn_count, 0);
        assert!(bare.last_worn_at.is_none());
    }

    #[test]
    fn test_wear_log_absent_item_ids() {
        assert_eq!(WearLog::from_fields(None).unwrap().item_ids, None);
        let null = fields(json!({"itemIds": null}));
        assert_eq!(WearLog::from_fields(Some(&null)).unwrap().item_ids, None);
        let other = fields(json!({"note": "x"}));
        assert_eq!(WearLog::from_fields(Some(&other)).unwrap().item_ids, None);
    }

    #[test]
    fn test_wear_log_keeps_duplicates_in_order() {
        let log = fields(json!({"itemIds": ["a", "b", "a"]}));
        let ids = WearLog::from_fields(Some(&log)).unwrap().item_ids.unwrap();
        let ids: Vec<&str> = ids.iter().map(ItemId::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_wear_log_accepts_integer_ids() {
        let log = fields(json!({"itemIds": [12, "x"]}));
        let ids = WearLog::from_fields(Some(&log)).unwrap().item_ids.unwrap();
        assert_eq!(ids, vec![ItemId::new("12"), ItemId::new("x")]);
    }

    #[test]
    fn test_wear_log_malformed() {
        let not_list = fields(json!({"itemIds": "a"}));
        assert!(matches!(
            WearLog::from_fields(Some(&not_list)),
            Err(WearLogError::ItemIdsNotAList(_))
        ));

        for bad in [json!([{"id": "a"}]), json!([""]), json!(["a/b"]), json!([1.5])] {
            let log = fields(json!({ "itemIds": bad }));
            assert!(matches!(
                WearLog::from_fields(Some(&log)),
                Err(WearLogError::InvalidItemId { index: 0, .. })
            ));
        }
    }

    #[test]
    fn test_wear_updates() {
        let updates = Item::wear_updates();
        assert_eq!(updates.get("wornCount"), Some(&FieldValue::Increment(1)));
        assert_eq!(updates.get("lastWornAt"), Some(&FieldValue::ServerTimestamp));
    }
}
