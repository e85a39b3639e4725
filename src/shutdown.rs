use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::service::RegistryService;

/// Graceful shutdown for the land registry: accepted jobs always land
pub struct ShutdownCoordinator {
    drain_timeout: Duration,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ShutdownCoordinator {
    pub fn new(drain_timeout: Duration) -> Self {
        Self { drain_timeout }
    }

    /// Run `work` until it finishes or Ctrl-C arrives, then drain the job queue.
    /// Returns `None` when interrupted.
    pub async fn run_until_signal<T, F>(&self, service: &RegistryService, work: F) -> Result<Option<T>>
    where
        F: Future<Output = Result<T>>,
    {
        let outcome = tokio::select! {
            result = work => Some(result),
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupt received, draining accepted jobs");
                None
            }
        };
        self.shutdown(service).await?;
        outcome.transpose()
    }

    /// Close the queue and wait for the worker to apply what it accepted
    pub async fn shutdown(&self, service: &RegistryService) -> Result<()> {
        info!(timeout_secs = self.drain_timeout.as_secs(), "Shutting down job queue");
        service
            .shutdown(self.drain_timeout)
            .await
            .map_err(|e| anyhow::anyhow!("Job queue did not shut down cleanly: {e}"))
    }
}
