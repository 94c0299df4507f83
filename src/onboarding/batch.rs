//! Best-effort batch execution with partial success.

use std::future::Future;

use crate::error::ApiError;
use crate::platform::CreatedEntity;

/// One item that the platform refused or that never reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub label: String,
    pub message: String,
}

/// Result of running one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Ids of created entities, in input order.
    pub succeeded: Vec<u64>,
    pub failed: Vec<ItemFailure>,
}

impl BatchOutcome {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Create `items` one at a time, never letting one failure stop the rest.
///
/// Each creation is awaited before the next starts, so `succeeded` keeps the
/// input order of the items that made it.
pub async fn run_batch<'a, T, L, F, Fut>(items: &'a [T], label: L, mut create: F) -> BatchOutcome
where
    L: Fn(&T) -> String,
    F: FnMut(&'a T) -> Fut,
    Fut: Future<Output = Result<CreatedEntity, ApiError>>,
{
    let mut outcome = BatchOutcome::default();
    for item in items {
        match create(item).await {
            Ok(created) => outcome.succeeded.push(created.id),
            Err(e) => {
                let label = label(item);
                tracing::warn!(item = %label, error = %e, "Batch item failed");
                outcome.failed.push(ItemFailure {
                    label,
                    message: e.to_string(),
                });
            }
        }
    }
    outcome
}
