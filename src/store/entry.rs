//! Persisted key/value record.

use serde::{Deserialize, Serialize};

/// One row of `kv_store`.
///
/// On the wire an entry is the array `[id, key, value]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "(i64, String, String)", from = "(i64, String, String)")]
pub struct Entry {
    /// Assigned by the store, never reused.
    pub id: i64,
    pub key: String,
    pub value: String,
}

impl From<Entry> for (i64, String, String) {
    fn from(entry: Entry) -> Self {
        (entry.id, entry.key, entry.value)
    }
}

impl From<(i64, String, String)> for Entry {
    fn from((id, key, value): (i64, String, String)) -> Self {
        Self { id, key, value }
    }
}
