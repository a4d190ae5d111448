use std::sync::Arc;
use std::time::Duration;

use derive_new::new;
use eyre::Result;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info_span, instrument, instrument::Instrumented, warn, Instrument};

use overlay_core::{DispatchError, SigningClient};

use crate::estimator::estimate_fee;
use crate::metrics::DispatcherMetrics;
use crate::queue::{QueuedSubmission, SubmissionQueue};

/// Single-threaded consumer for one account's queue.
///
/// Enforces one in-flight transaction per account: the next submission is
/// not touched until the previous one has completed or been re-enqueued.
/// Sequence faults re-enter the queue at the same priority; every other
/// outcome is signalled through the submission's completion channel.
#[derive(new)]
pub struct AccountWorker {
    index: usize,
    client: Arc<dyn SigningClient>,
    queue: Arc<SubmissionQueue>,
    pacing: Duration,
    memo: String,
    max_sequence_retries: Option<u32>,
    metrics: DispatcherMetrics,
}

impl AccountWorker {
    /// Spawn the worker task for this account.
    pub fn spawn(self) -> Instrumented<JoinHandle<Result<()>>> {
        let span = info_span!(
            "AccountWorker",
            account = self.index,
            address = %self.client.address(),
        );
        tokio::spawn(async move { self.run().await }).instrument(span)
    }

    async fn run(self) -> Result<()> {
        loop {
            let item = self.queue.take().await;
            // anti-flood pacing between consecutive submissions
            sleep(self.pacing).await;
            self.process(item).await;
        }
    }

    #[instrument(skip(self, item), fields(
        id = %item.submission.id,
        priority = ?item.submission.priority,
        trace_id = item.submission.trace_id.as_deref(),
    ))]
    async fn process(&self, mut item: QueuedSubmission) {
        let submission = &item.submission;
        let fee = match estimate_fee(
            self.client.as_ref(),
            &submission.gas,
            &submission.messages,
            &self.memo,
        )
        .await
        {
            Ok(fee) => fee,
            Err(err) if err.is_sequence_fault() => {
                debug!("sequence fault during fee estimation, re-enqueueing");
                return self.requeue_or_fail(item, err);
            }
            Err(err) => {
                warn!(error = %err, "fee estimation failed");
                self.metrics.failure.inc();
                self.metrics.pending.dec();
                item.submission.complete(Err(err));
                return;
            }
        };

        match self
            .client
            .sign_and_broadcast_sync(&item.submission.messages, &fee, &self.memo)
            .await
        {
            Ok(hash) => {
                debug!(%hash, "broadcast accepted");
                self.metrics.success.inc();
                self.metrics.pending.dec();
                item.submission.complete(Ok(hash));
            }
            Err(err) if err.is_sequence_fault() => {
                debug!("sequence fault during broadcast, re-enqueueing");
                self.requeue_or_fail(item, err);
            }
            Err(err) => {
                warn!(error = %err, "broadcast failed");
                self.metrics.failure.inc();
                self.metrics.pending.dec();
                item.submission.complete(Err(err));
            }
        }
    }

    /// Re-enqueue a sequence-faulted submission at its original priority
    /// and rank. Retries are unbounded unless a cap is configured; past the
    /// cap the fault is surfaced terminally.
    fn requeue_or_fail(&self, mut item: QueuedSubmission, err: DispatchError) {
        item.submission.sequence_retries += 1;
        if let Some(cap) = self.max_sequence_retries {
            if item.submission.sequence_retries > cap {
                warn!(
                    retries = item.submission.sequence_retries,
                    "sequence retry cap exceeded"
                );
                self.metrics.failure.inc();
                self.metrics.pending.dec();
                item.submission.complete(Err(err));
                return;
            }
        }
        self.metrics.retry.inc();
        self.queue.requeue(item);
    }
}
