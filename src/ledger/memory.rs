// In-memory world state

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::ledger::store::{RecordStore, WorldState};
use crate::model::Record;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<WorldState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: WorldState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Copy of the raw documents, for inspection in tests and diagnostics
    pub async fn snapshot(&self) -> WorldState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read(&self, id: &str) -> Result<Record, StoreError> {
        self.state.read().await.get(id)
    }

    async fn read_all(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.state.read().await.all())
    }

    async fn write(
        &self,
        id: &str,
        record: &Record,
        expected_version: Option<u64>,
    ) -> Result<(), StoreError> {
        self.state.write().await.put(id, record, expected_version)
    }

    async fn delete(&self, id: &str, expected_version: u64) -> Result<(), StoreError> {
        self.state.write().await.remove(id, expected_version)
    }

    async fn insert_raw(&self, id: &str, document: Value) -> Result<bool, StoreError> {
        Ok(self.state.write().await.insert_if_absent(id, document))
    }
}
