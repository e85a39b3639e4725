pub mod queue;
pub mod types;

pub use queue::JobQueue;
pub use types::{Job, JobHandle, JobOperation, JobStatus};
