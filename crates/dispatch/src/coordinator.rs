//! Broadcast coordinator — drives planned batches to completion.
//!
//! Batches run in strictly sequential windows of `PARALLEL_BATCHES`; inside
//! a window they run concurrently and the coordinator waits for every one of
//! them to settle before opening the next window. Outcomes are folded into
//! the summary at the join, on the coordinating task, so no aggregation
//! state is shared between in-flight calls. Once started, a run always
//! executes every planned batch.

use chrono::Utc;

use herald_common::types::{BroadcastMessage, BroadcastSummary, DeliveryRecord};

use crate::planner;
use crate::provider::BatchSender;

/// Number of provider calls allowed in flight at once.
pub const PARALLEL_BATCHES: usize = 5;

/// The recipient directory as the coordinator sees it.
///
/// `Clone + 'static` because the cleanup task outlives the response path.
pub trait RecipientDirectory: Clone + Send + Sync + 'static {
    /// Point-in-time read of every delivery record. The only call in a
    /// broadcast whose failure aborts the run.
    fn snapshot(&self) -> impl Future<Output = anyhow::Result<Vec<DeliveryRecord>>> + Send;

    /// Best-effort removal of every record whose token is in `tokens`.
    fn delete_by_tokens(
        &self,
        tokens: Vec<String>,
    ) -> impl Future<Output = anyhow::Result<u64>> + Send;
}

/// Orchestrates one broadcast run: snapshot → plan → windowed dispatch →
/// summary, with invalid-token cleanup handed off in the background.
#[derive(Clone)]
pub struct BroadcastCoordinator<D, S> {
    directory: D,
    sender: S,
}

impl<D, S> BroadcastCoordinator<D, S>
where
    D: RecipientDirectory,
    S: BatchSender,
{
    pub fn new(directory: D, sender: S) -> Self {
        Self { directory, sender }
    }

    /// Deliver `message` to every recipient in the directory and report the
    /// aggregate result.
    ///
    /// Per-batch failures are absorbed by the sender and show up only as
    /// missing counts; "zero delivered" is a valid, non-error summary.
    pub async fn broadcast(&self, message: &BroadcastMessage) -> anyhow::Result<BroadcastSummary> {
        let snapshot = self.directory.snapshot().await?;
        if snapshot.is_empty() {
            tracing::info!("No recipients registered, nothing to send");
            return Ok(BroadcastSummary::default());
        }

        // One id per run, reused across every batch as an idempotency hint.
        let notification_id = format!("broadcast-{}", Utc::now().timestamp_millis());
        let batches = planner::plan_batches(&snapshot);

        tracing::info!(
            batches = batches.len(),
            users = snapshot.len(),
            notification_id,
            "Starting broadcast"
        );

        let mut summary = BroadcastSummary {
            total_batches: batches.len(),
            total_users: snapshot.len(),
            ..BroadcastSummary::default()
        };
        let mut invalid_tokens: Vec<String> = Vec::new();

        for window in batches.chunks(PARALLEL_BATCHES) {
            let outcomes = futures::future::join_all(window.iter().map(|batch| {
                self.sender
                    .send_batch(&batch.url, &batch.tokens, message, &notification_id)
            }))
            .await;

            for outcome in outcomes {
                summary.successful += outcome.successful;
                summary.rate_limited += outcome.rate_limited;
                summary.invalid += outcome.invalid_tokens.len();
                invalid_tokens.extend(outcome.invalid_tokens);
            }
        }

        if !invalid_tokens.is_empty() {
            self.spawn_cleanup(invalid_tokens);
        }

        tracing::info!(
            successful = summary.successful,
            invalid = summary.invalid,
            rate_limited = summary.rate_limited,
            "Broadcast complete"
        );

        Ok(summary)
    }

    /// Remove invalidated tokens in the background. The response path never
    /// waits on this; a failed cleanup is logged and nothing more.
    fn spawn_cleanup(&self, invalid_tokens: Vec<String>) {
        let directory = self.directory.clone();
        tokio::spawn(async move {
            let invalid = invalid_tokens.len();
            match directory.delete_by_tokens(invalid_tokens).await {
                Ok(removed) => {
                    tracing::info!(invalid, removed, "Cleaned up invalid tokens");
                }
                Err(err) => {
                    tracing::error!(invalid, error = %err, "Invalid token cleanup failed");
                }
            }
        });
    }
}
