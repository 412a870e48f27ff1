//! Admission control: bounds the number of in-flight REST calls a
//! [`super::session::Session`] will allow at once.

use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::cfg::config::RuntimeConfig;

/// Thin wrapper over [`tokio::sync::Semaphore`] sized from
/// [`RuntimeConfig::max_client_threads`]. Acquiring a permit is the first
/// thing every outbound call does; the permit is held for the duration of
/// the request/response round trip.
#[derive(Debug, Clone)]
pub struct Admission {
    inner: Arc<Semaphore>,
}

impl Admission {
    pub fn new(runtime: &RuntimeConfig) -> Self {
        Self {
            inner: Arc::new(Semaphore::new(runtime.max_client_threads as usize)),
        }
    }

    /// Blocks (asynchronously) until a call slot is free. The semaphore is
    /// never closed during normal operation, so this only fails if the
    /// process is shutting down.
    pub async fn acquire(&self) -> SemaphorePermit<'_> {
        self.inner
            .acquire()
            .await
            .expect("admission semaphore is never closed")
    }

    #[cfg(test)]
    pub fn available(&self) -> usize {
        self.inner.available_permits()
    }
}
