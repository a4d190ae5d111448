use std::sync::Arc;
use std::time::Duration;

use derive_new::new;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, instrument, trace};

use overlay_core::{narrow, DispatchError, DispatchResult, IndexedTx, SigningClient};

/// Polls a broadcast transaction until the node has indexed it or it has
/// failed terminally.
///
/// Callers bound the poll with their own deadline; the poller itself runs
/// until it can classify a terminal outcome.
#[derive(new)]
pub struct InclusionPoller {
    client: Arc<dyn SigningClient>,
    interval: Duration,
}

impl InclusionPoller {
    /// Wait until the transaction behind `hash` is included or fails.
    ///
    /// A transaction indexed with a nonzero code resolves to the narrowed
    /// kind of its raw log, or passes the log through unchanged when no
    /// marker matches. Transport errors stop the poll and surface likewise.
    #[instrument(skip(self), fields(%hash, trace_id))]
    pub async fn wait_for_inclusion(
        &self,
        hash: &str,
        trace_id: Option<&str>,
    ) -> DispatchResult<IndexedTx> {
        loop {
            match self.client.get_tx(hash).await {
                Ok(Some(tx)) if tx.code == 0 => {
                    debug!(height = tx.height, "transaction included");
                    return Ok(tx);
                }
                Ok(Some(tx)) => {
                    debug!(code = tx.code, raw_log = %tx.raw_log, "transaction failed on chain");
                    let err = narrow(&tx.raw_log)
                        .unwrap_or_else(|| DispatchError::Chain(tx.raw_log.clone()));
                    return Err(err);
                }
                Ok(None) => trace!("not yet indexed"),
                // the signing client has already narrowed transport errors
                Err(err) => return Err(err),
            }
            sleep(self.interval).await;
        }
    }

    /// Like [`InclusionPoller::wait_for_inclusion`], bounded by an external
    /// cancellation signal. Firing (or dropping) the signal stops the poll
    /// and surfaces [`DispatchError::Cancelled`].
    pub async fn wait_for_inclusion_cancellable(
        &self,
        hash: &str,
        trace_id: Option<&str>,
        mut cancel: oneshot::Receiver<()>,
    ) -> DispatchResult<IndexedTx> {
        tokio::select! {
            result = self.wait_for_inclusion(hash, trace_id) => result,
            _ = &mut cancel => {
                debug!(%hash, "inclusion poll cancelled");
                Err(DispatchError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{indexed_tx, MockChainClient};

    fn poller(client: Arc<MockChainClient>) -> InclusionPoller {
        InclusionPoller::new(client, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn keeps_polling_while_unindexed_then_resolves() {
        let client = Arc::new(MockChainClient::new("seda1acc0"));
        client.push_get_tx(Ok(None));
        client.push_get_tx(Ok(None));
        client.push_get_tx(Ok(Some(indexed_tx("AB12", 0, ""))));

        let tx = poller(client.clone())
            .wait_for_inclusion("AB12", None)
            .await
            .unwrap();
        assert_eq!(tx.hash, "AB12");
        assert_eq!(client.get_tx_calls(), 3);
    }

    #[tokio::test]
    async fn failed_transactions_resolve_to_the_narrowed_kind() {
        let client = Arc::new(MockChainClient::new("seda1acc0"));
        client.push_get_tx(Ok(Some(indexed_tx(
            "AB12",
            7,
            "failed to execute message; message index: 0: AlreadyCommitted: dr id 0xabc",
        ))));

        let err = poller(client)
            .wait_for_inclusion("AB12", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::AlreadyCommitted(_)));
    }

    #[tokio::test]
    async fn unrecognized_failures_pass_the_raw_log_through() {
        let client = Arc::new(MockChainClient::new("seda1acc0"));
        client.push_get_tx(Ok(Some(indexed_tx("AB12", 11, "out of gas"))));

        let err = poller(client)
            .wait_for_inclusion("AB12", None)
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::Chain("out of gas".to_string()));
    }

    #[tokio::test]
    async fn cancellation_stops_the_poll() {
        let client = Arc::new(MockChainClient::new("seda1acc0"));
        // mock reports the tx as unindexed forever
        let poller = InclusionPoller::new(client, Duration::from_millis(1));
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let _ = cancel_tx.send(());
        let err = poller
            .wait_for_inclusion_cancellable("AB12", None, cancel_rx)
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::Cancelled);
    }

    #[tokio::test]
    async fn transport_errors_stop_the_poll() {
        let client = Arc::new(MockChainClient::new("seda1acc0"));
        client.push_get_tx(Err(DispatchError::Chain("node unreachable".to_string())));

        let err = poller(client.clone())
            .wait_for_inclusion("AB12", None)
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::Chain("node unreachable".to_string()));
        assert_eq!(client.get_tx_calls(), 1);
    }
}
