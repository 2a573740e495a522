//! Bounded compute pool for CPU-heavy kernels
//!
//! The planning core is synchronous CPU work hosted inside a cooperative
//! runtime. Environment generation, risk recomputation, prioritization,
//! allocation and search must never run on the cooperative threads, so they
//! are handed to `spawn_blocking` behind a semaphore that caps concurrent
//! kernels at `max_workers`.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::core::error::{AegisError, Result};

/// Handle to the bounded blocking-task pool
#[derive(Debug, Clone)]
pub struct ComputePool {
    permits: Arc<Semaphore>,
    max_workers: usize,
}

impl ComputePool {
    /// Create a pool admitting at most `max_workers` concurrent kernels
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    /// Create a pool sized to the machine, capped at the configured default
    pub fn for_host() -> Self {
        Self::new(num_cpus::get().min(4))
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Run a CPU-bound closure off the cooperative threads.
    ///
    /// Kernels run to completion once started; cancellation of the awaiting
    /// caller leaves any committed state in place.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AegisError::service_init("compute-pool", e.to_string()))?;
        let result = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            f()
        })
        .await?;
        Ok(result)
    }
}
