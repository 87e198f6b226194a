//! Per-resource availability providers.
//!
//! How availability is actually measured belongs to the resource type's
//! plugin code; the scanner only sees this trait.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::AbortHandle;

use crate::inventory::{AvailabilityType, ResourceId};

/// Provider error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("availability check timed out after {0:?}")]
    Timeout(Duration),
    #[error("availability check failed: {0}")]
    Failed(String),
    #[error("availability check panicked")]
    Panicked,
}

/// Measures the current availability of one resource.
#[async_trait]
pub trait AvailabilityProvider: Send + Sync {
    async fn get_availability(&self, resource_id: ResourceId) -> Result<AvailabilityType, ProviderError>;
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Invoke a provider in its own task, bounded by `timeout`.
///
/// Timeouts and panics come back as errors. Dropping the returned future
/// cancels the provider call.
pub async fn invoke(
    provider: Arc<dyn AvailabilityProvider>,
    resource_id: ResourceId,
    timeout: Duration,
) -> Result<AvailabilityType, ProviderError> {
    let mut task = tokio::spawn(async move { provider.get_availability(resource_id).await });
    let _guard = AbortOnDrop(task.abort_handle());

    match tokio::time::timeout(timeout, &mut task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) if e.is_panic() => Err(ProviderError::Panicked),
        Ok(Err(e)) => Err(ProviderError::Failed(e.to_string())),
        Err(_) => Err(ProviderError::Timeout(timeout)),
    }
}
