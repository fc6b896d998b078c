use crate::core::{
    domain::model::{
        DeletionOutcome, DeletionRequest, RunSummary, SpaceDelta, StorageUsage,
        storage::StorageCounters,
    },
    infrastructure::api_client::{ProxmoxApi, decode},
};
use std::time::{Duration, SystemTime};
use tracing::{info, instrument, warn};

/// Pause between two deletions.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);
/// Wait before probing storage again after the last deletion.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(15);

/// Tuning for one cleanup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOptions {
    pub pacing: Duration,
    /// Pool to measure before and after the run, as `(node, storage)`.
    pub watched_storage: Option<(String, String)>,
    pub settle: Duration,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
            watched_storage: None,
            settle: DEFAULT_SETTLE,
        }
    }
}

/// Executes deletion requests one at a time, in order.
///
/// Each request gets exactly one DELETE and exactly one outcome. Failures are
/// recorded and the batch continues; nothing is retried or reordered.
pub struct CleanupService<'a> {
    api: &'a dyn ProxmoxApi,
    options: CleanupOptions,
}

impl<'a> CleanupService<'a> {
    pub fn new(api: &'a dyn ProxmoxApi, options: CleanupOptions) -> Self {
        Self { api, options }
    }

    #[instrument(skip_all, fields(requests = requests.len()))]
    pub async fn execute(&self, requests: Vec<DeletionRequest>) -> RunSummary {
        let started_at = SystemTime::now();
        let storage_before = self.read_watched_storage().await;

        let total = requests.len();
        let mut outcomes = Vec::with_capacity(total);
        for (index, request) in requests.into_iter().enumerate() {
            if index > 0 && !self.options.pacing.is_zero() {
                tokio::time::sleep(self.options.pacing).await;
            }
            outcomes.push(self.delete_one(request, index + 1, total).await);
        }

        let storage_after = if self.options.watched_storage.is_some() && total > 0 {
            if !self.options.settle.is_zero() {
                info!(settle = ?self.options.settle, "waiting for storage to settle");
                tokio::time::sleep(self.options.settle).await;
            }
            self.read_watched_storage().await
        } else {
            storage_before
        };

        let summary = RunSummary {
            started_at,
            finished_at: SystemTime::now(),
            outcomes,
            storage: self
                .options
                .watched_storage
                .as_ref()
                .map(|(_, storage)| storage.clone()),
            storage_before,
            storage_after,
            space: SpaceDelta::between(storage_before, storage_after),
        };
        info!(
            succeeded = summary.success_count(),
            failed = summary.failed_count(),
            space = ?summary.space,
            "cleanup run finished"
        );
        summary
    }

    async fn delete_one(
        &self,
        request: DeletionRequest,
        position: usize,
        total: usize,
    ) -> DeletionOutcome {
        match self.api.delete(&request.path()).await {
            Ok(task) => {
                info!(
                    position,
                    total,
                    target = request.label(),
                    snapshot = request.snapshot(),
                    "snapshot deleted"
                );
                DeletionOutcome::succeeded(request, task)
            }
            Err(error) => {
                warn!(
                    position,
                    total,
                    target = request.label(),
                    snapshot = request.snapshot(),
                    %error,
                    "snapshot deletion failed"
                );
                DeletionOutcome::failed(request, error)
            }
        }
    }

    async fn read_watched_storage(&self) -> Option<StorageUsage> {
        let (node, storage) = self.options.watched_storage.as_ref()?;
        let path = format!("nodes/{node}/storage/{storage}/status");
        match self.api.get(&path).await.and_then(decode::<StorageCounters>) {
            Ok(counters) => Some(counters.usage()),
            Err(error) => {
                warn!(%path, %error, "storage status unavailable");
                None
            }
        }
    }
}
