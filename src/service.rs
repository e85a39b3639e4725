// Registry service - read, transition, enqueue
//
// The service is the only caller of the workflow engine. Each mutation reads
// a fresh snapshot, computes the transition and hands it to the job queue;
// version conflicts restart that cycle with backoff.

use chrono::Utc;
use rand::Rng;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::config::{LandRegistryConfig, LedgerBackend};
use crate::error::{StoreError, WorkflowError};
use crate::jobs::{JobHandle, JobOperation, JobQueue, JobStatus};
use crate::ledger::{sample_documents, FileStore, LedgerGateway, MemoryStore, RecordStore};
use crate::model::payload::validate_record_id;
use crate::model::{Caller, Category, DeedDetails, EntryDetails, IncumbranceDetails, Record, Resolution};
use crate::observability::{create_workflow_span, LedgerMetrics, OperationTimer};
use crate::query::{self, Page, Pagination, QueryLimits, RecordFilter, Summary};
use crate::telemetry::generate_correlation_id;
use crate::workflow::{Command, CreateRecord, EntrySelector, RecordPatch, WorkflowEngine};

/// Backoff applied when a transition loses a version race
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(20),
            max_delay: Duration::from_secs(1),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Exponential delay before attempt `attempt + 1`, capped at `max_delay`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        if self.jitter && !delay.is_zero() {
            let millis = delay.as_millis() as u64;
            Duration::from_millis(rand::rng().random_range(0..=millis))
        } else {
            delay
        }
    }
}

pub struct RegistryService {
    store: Arc<dyn RecordStore>,
    queue: Arc<JobQueue>,
    engine: WorkflowEngine,
    retry: RetryPolicy,
    limits: QueryLimits,
    metrics: Arc<LedgerMetrics>,
}

impl std::fmt::Debug for RegistryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryService")
            .field("queue", &self.queue)
            .field("retry", &self.retry)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl RegistryService {
    /// Wire a service over `store`; the job queue worker is spawned on the current runtime
    pub fn new(
        store: Arc<dyn RecordStore>,
        engine: WorkflowEngine,
        retry: RetryPolicy,
        limits: QueryLimits,
        queue_capacity: usize,
        metrics: Arc<LedgerMetrics>,
    ) -> Self {
        let queue = Arc::new(JobQueue::start(
            Arc::clone(&store),
            queue_capacity,
            Arc::clone(&metrics),
        ));
        Self {
            store,
            queue,
            engine,
            retry,
            limits,
            metrics,
        }
    }

    /// Build the configured backend behind a gateway and start the queue
    pub fn from_config(config: &LandRegistryConfig) -> Result<Self, StoreError> {
        let backend: Arc<dyn RecordStore> = match config.ledger.backend {
            LedgerBackend::Memory => Arc::new(MemoryStore::new()),
            LedgerBackend::File => Arc::new(FileStore::open(&config.ledger.path)?),
        };
        let metrics = Arc::new(LedgerMetrics::new());
        let gateway = LedgerGateway::new(backend, config.gateway_limits(), Arc::clone(&metrics));
        info!(backend = ?config.ledger.backend, path = %config.ledger.path.display(), "Ledger opened");

        Ok(Self::new(
            Arc::new(gateway),
            WorkflowEngine::new(config.authority_policy()),
            config.retry_policy(),
            config.query_limits(),
            config.queue.capacity,
            metrics,
        ))
    }

    pub fn metrics(&self) -> &Arc<LedgerMetrics> {
        &self.metrics
    }

    pub fn queue(&self) -> &Arc<JobQueue> {
        &self.queue
    }

    /// Run one command through read, transition and enqueue, retrying on conflict
    pub async fn execute(&self, command: Command, caller: &Caller) -> Result<JobHandle, WorkflowError> {
        let operation = JobOperation::from(&command);
        let correlation_id = generate_correlation_id();
        let span = create_workflow_span(operation.as_str(), command.record_id(), &correlation_id);

        async move {
            let timer = OperationTimer::new(operation.as_str());
            let mut attempt = 1;
            loop {
                match self.attempt(&command, caller, operation).await {
                    Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                        let delay = self.retry.delay_for(attempt);
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Version conflict, retrying from a fresh read"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    result => {
                        timer.finish();
                        if let Err(e) = &result {
                            debug!(attempt, error = %e, "Command rejected");
                        }
                        return result;
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn attempt(
        &self,
        command: &Command,
        caller: &Caller,
        operation: JobOperation,
    ) -> Result<JobHandle, WorkflowError> {
        let snapshot = match self.store.read(command.record_id()).await {
            Ok(record) => Some(record),
            Err(StoreError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };
        let transition = self
            .engine
            .apply(snapshot.as_ref(), command, caller, Utc::now())?;
        self.queue.enqueue(operation, transition).await
    }

    pub async fn create(&self, caller: &Caller, payload: &Value) -> Result<JobHandle, WorkflowError> {
        let command = Command::Create(CreateRecord::from_payload(payload)?);
        self.execute(command, caller).await
    }

    pub async fn get(&self, caller: &Caller, id: &str) -> Result<Record, WorkflowError> {
        validate_record_id("id", id)?;
        debug!(record_id = %id, caller = %caller, "Reading record");
        Ok(self.store.read(id).await?)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        payload: &Value,
    ) -> Result<JobHandle, WorkflowError> {
        validate_record_id("id", id)?;
        let patch = RecordPatch::from_payload(payload)?;
        if patch.id != id {
            return Err(WorkflowError::IdentifierMismatch {
                path: id.to_string(),
                payload: patch.id,
            });
        }
        let command = Command::Update {
            path_id: id.to_string(),
            patch,
        };
        self.execute(command, caller).await
    }

    pub async fn submit_deed(
        &self,
        caller: &Caller,
        id: &str,
        payload: &Value,
    ) -> Result<JobHandle, WorkflowError> {
        validate_record_id("id", id)?;
        let command = Command::SubmitDeed {
            id: id.to_string(),
            details: DeedDetails::from_payload(payload)?,
        };
        self.execute(command, caller).await
    }

    pub async fn submit_incumbrance(
        &self,
        caller: &Caller,
        id: &str,
        payload: &Value,
    ) -> Result<JobHandle, WorkflowError> {
        validate_record_id("id", id)?;
        let command = Command::SubmitIncumbrance {
            id: id.to_string(),
            details: IncumbranceDetails::from_payload(payload)?,
        };
        self.execute(command, caller).await
    }

    /// Approve or reject the pending entry picked by `selector` (an index or an entry id)
    pub async fn resolve(
        &self,
        caller: &Caller,
        id: &str,
        category: Category,
        selector: &str,
        resolution: Resolution,
    ) -> Result<JobHandle, WorkflowError> {
        validate_record_id("id", id)?;
        let command = Command::Resolve {
            id: id.to_string(),
            category,
            selector: EntrySelector::parse(selector),
            resolution,
        };
        self.execute(command, caller).await
    }

    pub async fn approve(
        &self,
        caller: &Caller,
        id: &str,
        category: Category,
        selector: &str,
    ) -> Result<JobHandle, WorkflowError> {
        self.resolve(caller, id, category, selector, Resolution::Approve)
            .await
    }

    pub async fn reject(
        &self,
        caller: &Caller,
        id: &str,
        category: Category,
        selector: &str,
    ) -> Result<JobHandle, WorkflowError> {
        self.resolve(caller, id, category, selector, Resolution::Reject)
            .await
    }

    pub async fn delete(&self, caller: &Caller, id: &str) -> Result<JobHandle, WorkflowError> {
        validate_record_id("id", id)?;
        self.execute(Command::Delete { id: id.to_string() }, caller)
            .await
    }

    pub async fn list(
        &self,
        caller: &Caller,
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Result<Page<Record>, WorkflowError> {
        let page = Pagination::parse(limit, offset, self.limits)?;
        debug!(caller = %caller, limit = page.limit, offset = page.offset, "Listing records");
        let records = self.store.read_all().await?;
        Ok(query::paginate(records, page))
    }

    pub async fn find(
        &self,
        caller: &Caller,
        filter: &RecordFilter,
        limit: Option<&str>,
        offset: Option<&str>,
    ) -> Result<Page<Record>, WorkflowError> {
        let page = Pagination::parse(limit, offset, self.limits)?;
        debug!(caller = %caller, ?filter, "Finding records");
        let records = self.store.read_all().await?;
        Ok(query::find(records, filter, page))
    }

    pub async fn summary(&self, caller: &Caller) -> Result<Summary, WorkflowError> {
        debug!(caller = %caller, "Summarizing records");
        let records = self.store.read_all().await?;
        Ok(Summary::from_records(&records))
    }

    /// Write the sample assets; identifiers already on the ledger are skipped.
    /// Returns how many were inserted.
    pub async fn seed(&self) -> Result<usize, WorkflowError> {
        let mut inserted = 0;
        for (id, document) in sample_documents(Utc::now()) {
            if self.store.insert_raw(&id, document).await? {
                inserted += 1;
            } else {
                debug!(record_id = %id, "Sample asset already present");
            }
        }
        info!(inserted, "Ledger seeded");
        Ok(inserted)
    }

    pub fn job_status(&self, job_id: &Uuid) -> Option<JobStatus> {
        self.queue.status(job_id)
    }

    pub async fn wait(&self, job_id: &Uuid) -> Option<JobStatus> {
        self.queue.wait_for(job_id).await
    }

    /// Stop the queue, draining accepted jobs
    pub async fn shutdown(&self, drain_timeout: Duration) -> Result<(), WorkflowError> {
        let result = self.queue.shutdown(drain_timeout).await;
        self.metrics.log_stats();
        result
    }
}
