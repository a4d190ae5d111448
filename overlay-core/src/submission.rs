use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::{DispatchResult, EncodedMsg};

/// Admission priority of a submission.
///
/// Higher priority is served first; FIFO within a priority. High priority
/// may starve low priority indefinitely, which is intentional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxPriority {
    /// Bulk traffic.
    Low,
    /// Latency-critical traffic; overtakes queued low-priority submissions.
    High,
}

/// How the gas limit of a submission is determined.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GasPolicy {
    /// Simulate the transaction and scale the estimate by the adjustment
    /// factor to cover execution non-determinism.
    Auto {
        /// Multiplier applied to the simulated gas.
        adjustment: f64,
    },
    /// Use the given gas limit without simulating.
    Fixed(u64),
    /// Zero gas and an empty fee; never simulates.
    Zero,
}

/// Gas options resolved for a single submission.
#[derive(Clone, Debug, PartialEq)]
pub struct GasConfig {
    /// Gas limit policy.
    pub policy: GasPolicy,
    /// Price per gas unit in the base denomination.
    pub gas_price: u128,
    /// Base denomination the fee is paid in.
    pub denom: String,
}

/// Sending half of a submission's single-shot completion channel.
pub type CompletionSender = oneshot::Sender<DispatchResult<String>>;
/// Receiving half of a submission's single-shot completion channel.
pub type CompletionReceiver = oneshot::Receiver<DispatchResult<String>>;

/// A single logical unit of outbound work: one future chain transaction.
///
/// Owned by exactly one account queue once enqueued, and exclusively by that
/// account's dispatcher task while mid-flight. The completion channel is
/// signalled at most once; dropping the submission unsignalled closes the
/// channel, which the waiter observes as [`crate::DispatchError::Stopped`].
#[derive(Debug)]
pub struct Submission {
    /// Identifier unique for the process lifetime.
    pub id: String,
    /// Ordered messages forming a single atomic chain transaction.
    pub messages: Vec<EncodedMsg>,
    /// Admission priority.
    pub priority: TxPriority,
    /// Resolved target account (0-based).
    pub account_index: usize,
    /// Gas options for this submission.
    pub gas: GasConfig,
    /// Opaque correlation identifier supplied by the caller.
    pub trace_id: Option<String>,
    /// Sequence-fault retries performed so far.
    pub sequence_retries: u32,
    completion: Option<CompletionSender>,
}

impl Submission {
    /// Create a submission together with the receiving half of its
    /// completion channel.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        messages: Vec<EncodedMsg>,
        priority: TxPriority,
        account_index: usize,
        gas: GasConfig,
        trace_id: Option<String>,
    ) -> (Self, CompletionReceiver) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                id: id.into(),
                messages,
                priority,
                account_index,
                gas,
                trace_id,
                sequence_retries: 0,
                completion: Some(tx),
            },
            rx,
        )
    }

    /// Signal the waiter with the terminal result of this submission.
    ///
    /// Subsequent calls are no-ops; the channel only exists once.
    pub fn complete(&mut self, result: DispatchResult<String>) {
        if let Some(tx) = self.completion.take() {
            // the waiter may have gone away; that is its prerogative
            let _ = tx.send(result);
        }
    }

    /// Whether the completion has already been signalled.
    pub fn is_completed(&self) -> bool {
        self.completion.is_none()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::DispatchError;

    fn gas() -> GasConfig {
        GasConfig {
            policy: GasPolicy::Zero,
            gas_price: 0,
            denom: "aseda".to_string(),
        }
    }

    #[test]
    fn priority_orders_high_above_low() {
        assert!(TxPriority::High > TxPriority::Low);
    }

    #[tokio::test]
    async fn completion_is_signalled_exactly_once() {
        let (mut sub, rx) = Submission::new("1", vec![], TxPriority::Low, 0, gas(), None);
        sub.complete(Ok("HASH".to_string()));
        assert!(sub.is_completed());
        // second signal must be swallowed, not panic or race
        sub.complete(Err(DispatchError::Cancelled));
        assert_eq!(rx.await.unwrap(), Ok("HASH".to_string()));
    }

    #[tokio::test]
    async fn dropping_unsignalled_submission_closes_the_channel() {
        let (sub, rx) = Submission::new("1", vec![], TxPriority::Low, 0, gas(), None);
        drop(sub);
        assert!(rx.await.is_err());
    }
}
