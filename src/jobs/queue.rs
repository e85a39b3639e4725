// Asynchronous ledger write queue
//
// Jobs are applied in FIFO order by a single worker task. At most one write
// per record identifier may be queued or running at any time.

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{StoreError, WorkflowError};
use crate::jobs::types::{Job, JobHandle, JobOperation, JobStatus};
use crate::ledger::RecordStore;
use crate::observability::LedgerMetrics;
use crate::workflow::{Transition, TransitionOutcome};

/// Job queued or running for a record
#[derive(Debug, Clone, Copy)]
struct InFlight {
    job_id: Uuid,
    next_version: Option<u64>,
}

pub struct JobQueue {
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    statuses: Arc<DashMap<Uuid, JobStatus>>,
    in_flight: Arc<DashMap<String, InFlight>>,
    settled: Arc<Notify>,
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("jobs", &self.statuses.len())
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl JobQueue {
    /// Spawn the worker on the current tokio runtime
    pub fn start(store: Arc<dyn RecordStore>, capacity: usize, metrics: Arc<LedgerMetrics>) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let statuses = Arc::new(DashMap::new());
        let in_flight = Arc::new(DashMap::new());
        let settled = Arc::new(Notify::new());

        let worker = Worker {
            store,
            statuses: Arc::clone(&statuses),
            in_flight: Arc::clone(&in_flight),
            settled: Arc::clone(&settled),
            metrics,
        };
        let handle = tokio::spawn(worker.run(receiver));

        Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(handle)),
            statuses,
            in_flight,
            settled,
        }
    }

    /// Accept a computed transition for asynchronous application.
    ///
    /// Fails with `VersionConflict` when the record already has a write
    /// waiting, since the transition was computed from a snapshot that the
    /// waiting write will supersede.
    pub async fn enqueue(
        &self,
        operation: JobOperation,
        transition: Transition,
    ) -> Result<JobHandle, WorkflowError> {
        let sender = self
            .sender
            .lock()
            .await
            .clone()
            .ok_or(WorkflowError::QueueClosed)?;

        let handle = JobHandle {
            job_id: Uuid::new_v4(),
            record_id: transition.record_id.clone(),
            operation,
            accepted_at: Utc::now(),
            entry_id: transition.entry_id,
        };

        match self.in_flight.entry(transition.record_id.clone()) {
            Entry::Occupied(queued) => {
                let queued = *queued.get();
                debug!(
                    record_id = %transition.record_id,
                    queued_job = %queued.job_id,
                    "Rejecting write behind an in-flight job"
                );
                return Err(WorkflowError::VersionConflict {
                    id: transition.record_id,
                    expected: transition.expected_version.into(),
                    actual: queued.next_version.into(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(InFlight {
                    job_id: handle.job_id,
                    next_version: transition.next_version(),
                });
            }
        }
        self.statuses.insert(handle.job_id, JobStatus::Queued);

        let job = Job {
            handle: handle.clone(),
            transition,
        };
        if sender.send(job).await.is_err() {
            self.in_flight.remove(&handle.record_id);
            self.statuses.remove(&handle.job_id);
            return Err(WorkflowError::QueueClosed);
        }

        debug!(job_id = %handle.job_id, record_id = %handle.record_id, operation = %handle.operation, "Job queued");
        Ok(handle)
    }

    pub fn status(&self, job_id: &Uuid) -> Option<JobStatus> {
        self.statuses.get(job_id).map(|s| s.value().clone())
    }

    /// Number of jobs not yet completed or failed
    pub fn pending(&self) -> usize {
        self.statuses.iter().filter(|s| !s.value().is_terminal()).count()
    }

    /// Wait until the job reaches a terminal status; `None` for unknown jobs
    pub async fn wait_for(&self, job_id: &Uuid) -> Option<JobStatus> {
        loop {
            let notified = self.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.status(job_id) {
                None => return None,
                Some(status) if status.is_terminal() => return Some(status),
                Some(_) => notified.await,
            }
        }
    }

    /// Wait until every accepted job has settled
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stop accepting jobs and let the worker drain what was already accepted
    pub async fn shutdown(&self, drain_timeout: Duration) -> Result<(), WorkflowError> {
        self.sender.lock().await.take();
        let Some(worker) = self.worker.lock().await.take() else {
            return Ok(());
        };

        match tokio::time::timeout(drain_timeout, worker).await {
            Ok(Ok(())) => {
                info!("Job queue drained");
                Ok(())
            }
            Ok(Err(e)) => Err(WorkflowError::Store(StoreError::Io(std::io::Error::other(e)))),
            Err(_) => {
                warn!(pending = self.pending(), "Job queue did not drain before the timeout");
                Err(WorkflowError::QueueClosed)
            }
        }
    }
}

struct Worker {
    store: Arc<dyn RecordStore>,
    statuses: Arc<DashMap<Uuid, JobStatus>>,
    in_flight: Arc<DashMap<String, InFlight>>,
    settled: Arc<Notify>,
    metrics: Arc<LedgerMetrics>,
}

impl Worker {
    async fn run(self, mut receiver: mpsc::Receiver<Job>) {
        while let Some(job) = receiver.recv().await {
            let job_id = job.handle.job_id;
            self.statuses.insert(job_id, JobStatus::Running);

            let status = match self.apply(&job.transition).await {
                Ok(()) => {
                    self.metrics.record_job_completed();
                    info!(job_id = %job_id, record_id = %job.handle.record_id, operation = %job.handle.operation, "Job completed");
                    JobStatus::Completed {
                        version: job.transition.next_version(),
                    }
                }
                Err(e) => {
                    self.metrics.record_job_failed();
                    warn!(job_id = %job_id, record_id = %job.handle.record_id, error = %e, "Job failed");
                    JobStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            self.in_flight
                .remove_if(&job.handle.record_id, |_, queued| queued.job_id == job_id);
            self.statuses.insert(job_id, status);
            self.settled.notify_waiters();
        }
        debug!("Job worker stopped");
    }

    async fn apply(&self, transition: &Transition) -> Result<(), StoreError> {
        let id = &transition.record_id;
        match (&transition.outcome, transition.expected_version) {
            (TransitionOutcome::Put(record), expected) => {
                self.store.write(id, record, expected).await
            }
            (TransitionOutcome::Remove, Some(expected)) => self.store.delete(id, expected).await,
            (TransitionOutcome::Remove, None) => Err(StoreError::NotFound(id.clone())),
        }
    }
}
