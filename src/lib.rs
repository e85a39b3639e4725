// Land Registry Library - pending-entry workflow over a versioned ledger
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod error;
pub mod jobs;
pub mod ledger;
pub mod model;
pub mod observability;
pub mod query;
pub mod service;
pub mod shutdown;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use config::{LandRegistryConfig, LedgerBackend};
pub use error::{StoreError, WorkflowError};
pub use jobs::{JobHandle, JobOperation, JobQueue, JobStatus};
pub use ledger::{FileStore, LedgerGateway, MemoryStore, RecordStore};
pub use model::{Caller, Category, PropertyStatus, Record, Resolution};
pub use observability::{LedgerMetrics, OperationTimer};
pub use query::{Page, RecordFilter, Summary};
pub use service::{RegistryService, RetryPolicy};
pub use shutdown::ShutdownCoordinator;
pub use telemetry::{generate_correlation_id, init_telemetry};
pub use workflow::{Command, WorkflowEngine};
