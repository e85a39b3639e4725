// Ledger world state accessor
//
// Documents are kept raw and normalized on the way out, so a store never
// rejects historic data it already holds.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::error;

use crate::error::StoreError;
use crate::model::{normalize_document, Record};

/// Conditional key-value access to land-asset documents.
///
/// `write` with `expected_version = None` only succeeds when the key is absent;
/// otherwise the stored version must equal `expected_version`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn read(&self, id: &str) -> Result<Record, StoreError>;

    /// Every readable record, ordered by identifier
    async fn read_all(&self) -> Result<Vec<Record>, StoreError>;

    async fn write(
        &self,
        id: &str,
        record: &Record,
        expected_version: Option<u64>,
    ) -> Result<(), StoreError>;

    async fn delete(&self, id: &str, expected_version: u64) -> Result<(), StoreError>;

    /// Store a document as-is unless the key is taken. Returns whether it was inserted.
    async fn insert_raw(&self, id: &str, document: Value) -> Result<bool, StoreError>;
}

/// Raw documents keyed by record identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldState {
    documents: BTreeMap<String, Value>,
}

impl WorldState {
    pub fn from_documents(documents: BTreeMap<String, Value>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &BTreeMap<String, Value> {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Result<Record, StoreError> {
        let document = self
            .documents
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        normalize_document(id, document.clone())
    }

    /// Unreadable documents are logged and left out
    pub fn all(&self) -> Vec<Record> {
        self.documents
            .iter()
            .filter_map(|(id, document)| match normalize_document(id, document.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    error!(record_id = %id, error = %e, "Skipping unreadable ledger document");
                    None
                }
            })
            .collect()
    }

    fn stored_version(&self, id: &str) -> Option<u64> {
        self.documents
            .get(id)
            .map(|doc| doc.get("version").and_then(Value::as_u64).unwrap_or(0))
    }

    fn check_version(&self, id: &str, expected: Option<u64>) -> Result<(), StoreError> {
        let actual = self.stored_version(id);
        if actual == expected {
            Ok(())
        } else {
            Err(StoreError::VersionConflict {
                id: id.to_string(),
                expected: expected.into(),
                actual: actual.into(),
            })
        }
    }

    pub fn put(
        &mut self,
        id: &str,
        record: &Record,
        expected_version: Option<u64>,
    ) -> Result<(), StoreError> {
        self.check_version(id, expected_version)?;
        let document = serde_json::to_value(record)?;
        self.documents.insert(id.to_string(), document);
        Ok(())
    }

    pub fn remove(&mut self, id: &str, expected_version: u64) -> Result<(), StoreError> {
        if !self.documents.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.check_version(id, Some(expected_version))?;
        self.documents.remove(id);
        Ok(())
    }

    pub fn insert_if_absent(&mut self, id: &str, document: Value) -> bool {
        if self.documents.contains_key(id) {
            return false;
        }
        self.documents.insert(id.to_string(), document);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(version: u64) -> Value {
        json!({"ID": "asset1", "version": version, "propertyStatus": "Develop"})
    }

    #[test]
    fn put_enforces_expected_version() {
        let mut state = WorldState::default();
        let mut record = normalize_document("asset1", doc(1)).unwrap();

        state.put("asset1", &record, None).unwrap();
        assert!(matches!(
            state.put("asset1", &record, None),
            Err(StoreError::VersionConflict { .. })
        ));

        record.version = 2;
        state.put("asset1", &record, Some(1)).unwrap();
        assert!(matches!(
            state.put("asset1", &record, Some(1)),
            Err(StoreError::VersionConflict { .. })
        ));
        assert_eq!(state.get("asset1").unwrap().version, 2);
    }

    #[test]
    fn remove_requires_presence_and_version() {
        let mut state = WorldState::default();
        assert!(state.insert_if_absent("asset1", doc(3)));
        assert!(!state.insert_if_absent("asset1", doc(9)));

        assert!(matches!(state.remove("asset9", 0), Err(StoreError::NotFound(_))));
        assert!(matches!(
            state.remove("asset1", 2),
            Err(StoreError::VersionConflict { .. })
        ));
        state.remove("asset1", 3).unwrap();
        assert!(state.documents().is_empty());
    }

    #[test]
    fn unversioned_documents_count_as_version_zero() {
        let mut state = WorldState::default();
        state.insert_if_absent("legacy", json!({"propertyStatus": "Recycled"}));
        let mut record = state.get("legacy").unwrap();
        record.version = 1;
        assert!(state.put("legacy", &record, Some(0)).is_ok());
    }

    #[test]
    fn all_skips_unreadable_documents() {
        let mut state = WorldState::default();
        state.insert_if_absent("good", doc(1));
        state.insert_if_absent("bad", json!(42));
        let records = state.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "asset1");
    }
}
