//! Write primitives shared by all store backends.
//!
//! A [`WriteBatch`] is an ordered list of [`Write`]s committed atomically:
//! either every write lands or none does. Field values may be literal JSON or
//! store-side transforms ([`FieldValue::Increment`],
//! [`FieldValue::ServerTimestamp`]) that are resolved against the document's
//! current state at commit time. [`Write::apply`] is the single definition of
//! those semantics; backends only supply the current document and the commit
//! time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::document::{Fields, counter_value, format_timestamp};
use super::path::DocumentPath;

/// Value written to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Literal value.
    Value(Value),
    /// Add to the current integer value. Missing or non-integer fields are
    /// replaced by the increment itself.
    Increment(i64),
    /// The commit time assigned by the store.
    ServerTimestamp,
}

impl FieldValue {
    /// Resolve against the field's current value.
    #[must_use]
    pub fn resolve(&self, current: Option<&Value>, now: DateTime<Utc>) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Increment(by) => {
                let base = current.and_then(counter_value).unwrap_or(0);
                Value::from(base.saturating_add(*by))
            }
            Self::ServerTimestamp => Value::String(format_timestamp(now)),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Field updates keyed by field name.
pub type FieldUpdates = BTreeMap<String, FieldValue>;

/// A single staged write.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Create or overwrite the document with exactly these fields.
    Set {
        /// Target document.
        path: DocumentPath,
        /// New contents.
        fields: FieldUpdates,
    },
    /// Merge fields into an existing document. Fails if the document does
    /// not exist.
    Update {
        /// Target document.
        path: DocumentPath,
        /// Fields to merge.
        fields: FieldUpdates,
    },
}

impl Write {
    /// Target document of this write.
    #[must_use]
    pub const fn path(&self) -> &DocumentPath {
        match self {
            Self::Set { path, .. } | Self::Update { path, .. } => path,
        }
    }

    /// Compute the document contents after this write.
    ///
    /// Returns `None` when an update targets a document that does not exist.
    #[must_use]
    pub fn apply(&self, current: Option<&Fields>, now: DateTime<Utc>) -> Option<Fields> {
        match self {
            Self::Set { fields, .. } => Some(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.resolve(None, now)))
                    .collect(),
            ),
            Self::Update { fields, .. } => {
                let mut next = current?.clone();
                for (name, value) in fields {
                    let resolved = value.resolve(next.get(name), now);
                    next.insert(name.clone(), resolved);
                }
                Some(next)
            }
        }
    }
}

/// Ordered set of writes committed as one atomic unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    /// Create an empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self { writes: Vec::new() }
    }

    /// Stage a create-or-overwrite of `path`.
    pub fn set(&mut self, path: DocumentPath, fields: FieldUpdates) -> &mut Self {
        self.writes.push(Write::Set { path, fields });
        self
    }

    /// Stage a merge into the existing document at `path`.
    pub fn update(&mut self, path: DocumentPath, fields: FieldUpdates) -> &mut Self {
        self.writes.push(Write::Update { path, fields });
        self
    }

    /// Number of staged writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Staged writes in commit order.
    #[must_use]
    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    /// Consume the batch, returning its writes.
    #[must_use]
    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).single().unwrap()
    }

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => Fields::new(),
        }
    }

    fn path() -> DocumentPath {
        DocumentPath::parse("users/u1/items/shirt").unwrap()
    }

    #[test]
    fn test_increment_adds_to_existing_value() {
        let inc = FieldValue::Increment(1);
        assert_eq!(inc.resolve(Some(&json!(4)), now()), json!(5));
        assert_eq!(inc.resolve(Some(&json!(4.0)), now()), json!(5));
    }

    #[test]
    fn test_increment_replaces_missing_or_non_numeric() {
        let inc = FieldValue::Increment(2);
        assert_eq!(inc.resolve(None, now()), json!(2));
        assert_eq!(inc.resolve(Some(&json!("four")), now()), json!(2));
    }

    #[test]
    fn test_server_timestamp_uses_commit_time() {
        assert_eq!(
            FieldValue::ServerTimestamp.resolve(None, now()),
            json!("2026-10-18T12:00:00.000Z")
        );
    }

    #[test]
    fn test_update_merges_and_keeps_other_fields() {
        let write = Write::Update {
            path: path(),
            fields: FieldUpdates::from([
                ("wornCount".to_string(), FieldValue::Increment(1)),
                ("lastWornAt".to_string(), FieldValue::ServerTimestamp),
            ]),
        };
        let current = fields(json!({"name": "Blue shirt", "wornCount": 3}));

        let next = write.apply(Some(&current), now()).unwrap();

        assert_eq!(next.get("name"), Some(&json!("Blue shirt")));
        assert_eq!(next.get("wornCount"), Some(&json!(4)));
        assert_eq!(
            next.get("lastWornAt"),
            Some(&json!("2026-10-18T12:00:00.000Z"))
        );
    }

    #[test]
    fn test_update_of_missing_document_fails() {
        let write = Write::Update {
            path: path(),
            fields: FieldUpdates::from([("wornCount".to_string(), FieldValue::Increment(1))]),
        };
        assert!(write.apply(None, now()).is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let write = Write::Set {
            path: path(),
            fields: FieldUpdates::from([("wornCount".to_string(), json!(0).into())]),
        };
        let current = fields(json!({"name": "old", "wornCount": 9}));

        let next = write.apply(Some(&current), now()).unwrap();

        assert_eq!(next, fields(json!({"wornCount": 0})));
    }

    #[test]
    fn test_batch_keeps_order() {
        let mut batch = WriteBatch::new();
        assert!(batch.is_empty());
        batch
            .update(path(), FieldUpdates::new())
            .set(DocumentPath::parse("users/u1/items/hat").unwrap(), FieldUpdates::new());

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.writes()[0].path().id(), "shirt");
        assert_eq!(batch.writes()[1].path().id(), "hat");
    }
}
