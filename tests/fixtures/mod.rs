//! Test fixtures - a small land register shaped like real ledger exports
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use land_registry::ledger::{GatewayLimits, LedgerGateway, MemoryStore, RecordStore, WorldState};
use land_registry::query::QueryLimits;
use land_registry::workflow::{AuthorityPolicy, Transition, TransitionOutcome, WorkflowEngine};
use land_registry::{Caller, LedgerMetrics, Record, RegistryService, RetryPolicy, StoreError};

/// Raw documents for asset1..asset5, as they would sit on the ledger
pub fn load_land_assets() -> BTreeMap<String, Value> {
    let json_data = include_str!("land_assets.json");
    serde_json::from_str(json_data).expect("Failed to parse land asset fixture JSON")
}

pub fn land_register() -> MemoryStore {
    MemoryStore::with_state(WorldState::from_documents(load_land_assets()))
}

pub fn caller() -> Caller {
    Caller::new("Org1MSP").unwrap()
}

pub fn deed_payload(memorial: &str) -> Value {
    json!({
        "owners": [{"nameOfOwner": "KWOK WAI KEUNG", "capacity": "BENEFICIAL OWNER"}],
        "memorialNumber": memorial,
        "dateOfInstrument": "2023/09/01",
        "dateOfRegistration": "2023/09/15",
        "consideration": "$8,200,000.00",
        "remarks": "ASSIGNMENT"
    })
}

pub fn incumbrance_payload() -> Value {
    json!({
        "memorialNumber": "UB9200001",
        "dateOfInstrument": "2023/09/01",
        "dateOfRegistration": "2023/09/15",
        "natureOfIncumbrances": "MORTGAGE",
        "inFavourOf": "THE BANK OF EAST ASIA LIMITED",
        "consideration": "ALL MONEYS",
        "remarks": "TO SECURE GENERAL BANKING FACILITIES"
    })
}

pub fn new_asset_payload(id: &str) -> Value {
    json!({
        "ID": id,
        "propertyStatus": "Develop",
        "propertyReferenceNumber": "PRN0100",
        "propertyAddress": "1 QUEEN'S ROAD Central",
        "propertyChineseAddress": "皇后大道中1號",
        "propertyShareOfTheLocation": "1/ 1",
        "propertyHeldInfos": [],
        "propertyRemarks": []
    })
}

/// Retries fast enough for tests to run back to back
pub fn quick_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(10),
        jitter: true,
    }
}

/// A service over `store` behind a gateway with generous limits
pub fn service_over(store: MemoryStore, policy: AuthorityPolicy) -> RegistryService {
    service_with_retry(store, policy, quick_retry(20))
}

pub fn service_with_retry(
    store: MemoryStore,
    policy: AuthorityPolicy,
    retry: RetryPolicy,
) -> RegistryService {
    let metrics = Arc::new(LedgerMetrics::new());
    let limits = GatewayLimits {
        submit_rate_per_second: 10_000,
        submit_burst: 10_000,
        evaluate_cache_ttl: Duration::from_millis(500),
    };
    let gateway = LedgerGateway::new(Arc::new(store), limits, Arc::clone(&metrics));
    RegistryService::new(
        Arc::new(gateway),
        WorkflowEngine::new(policy),
        retry,
        QueryLimits::default(),
        64,
        metrics,
    )
}

/// Holds every write until a permit is released
pub struct GatedStore {
    inner: MemoryStore,
    gate: Arc<Semaphore>,
}

impl GatedStore {
    pub fn new(inner: MemoryStore) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (
            Self {
                inner,
                gate: Arc::clone(&gate),
            },
            gate,
        )
    }
}

#[async_trait]
impl RecordStore for GatedStore {
    async fn read(&self, id: &str) -> Result<Record, StoreError> {
        self.inner.read(id).await
    }

    async fn read_all(&self) -> Result<Vec<Record>, StoreError> {
        self.inner.read_all().await
    }

    async fn write(
        &self,
        id: &str,
        record: &Record,
        expected_version: Option<u64>,
    ) -> Result<(), StoreError> {
        let _permit = self.gate.acquire().await.expect("gate stays open");
        self.inner.write(id, record, expected_version).await
    }

    async fn delete(&self, id: &str, expected_version: u64) -> Result<(), StoreError> {
        let _permit = self.gate.acquire().await.expect("gate stays open");
        self.inner.delete(id, expected_version).await
    }

    async fn insert_raw(&self, id: &str, document: Value) -> Result<bool, StoreError> {
        self.inner.insert_raw(id, document).await
    }
}

/// Append a remark as the next version of `record`
pub fn remark_transition(record: &Record, remark: &str) -> Transition {
    let mut next = record.clone();
    next.version += 1;
    next.property_remarks.push(remark.to_string());
    Transition {
        record_id: record.id.clone(),
        expected_version: Some(record.version),
        outcome: TransitionOutcome::Put(Box::new(next)),
        entry_id: None,
    }
}
