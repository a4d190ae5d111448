use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use eyre::Result;
use serde::de::DeserializeOwned;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, instrument::Instrumented};

use overlay_core::{
    BlockInfo, Coin, DispatchError, DispatchResult, EncodedMsg, GasConfig, IndexedTx,
    SigningClient, Submission, TxPriority,
};
use overlay_cosmos::{bigint, execute_contract_msg};

use crate::metrics::{DispatchStats, DispatcherMetrics};
use crate::poller::InclusionPoller;
use crate::queue::SubmissionQueue;
use crate::router::RoundRobinRouter;
use crate::worker::AccountWorker;

/// Static configuration of the dispatch facade.
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Core contract address execute messages are sent to.
    pub contract: String,
    /// Memo attached to every transaction.
    pub memo: String,
    /// Pacing delay between submissions per account.
    pub queue_interval: Duration,
    /// Inclusion poll period.
    pub poll_interval: Duration,
    /// Default gas options for submissions that do not carry their own.
    pub gas: GasConfig,
    /// Cap on sequence-fault retries per submission; unbounded when absent.
    pub max_sequence_retries: Option<u32>,
}

/// Per-call submission options.
#[derive(Clone, Debug, Default)]
pub struct SubmitOptions {
    /// Pin the submission to a specific account slot instead of rotating.
    pub force_index: Option<usize>,
    /// Gas options overriding the facade defaults.
    pub gas: Option<GasConfig>,
    /// Opaque correlation identifier.
    pub trace_id: Option<String>,
}

/// Per-account pipeline state: one signing client, one queue, one worker.
pub struct AccountSlot {
    /// Slot position, 0-based.
    pub index: usize,
    /// bech32 address of the slot's identity.
    pub address: String,
    client: Arc<dyn SigningClient>,
    queue: Arc<SubmissionQueue>,
}

/// Public surface of the dispatch core.
///
/// Routes submissions onto per-account priority queues, runs one dispatcher
/// task per account, and exposes the query passthroughs and counters.
pub struct TxDispatcher {
    slots: Vec<AccountSlot>,
    router: RoundRobinRouter,
    metrics: DispatcherMetrics,
    config: DispatchConfig,
    workers: Mutex<Vec<AbortHandle>>,
}

impl Debug for TxDispatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxDispatcher")
            .field("accounts", &self.slots.len())
            .field("config", &self.config)
            .finish()
    }
}

impl TxDispatcher {
    /// Build the facade over one signing client per account.
    ///
    /// Panics if `clients` is empty; settings validation enforces at least
    /// one account.
    pub fn new(
        clients: Vec<Arc<dyn SigningClient>>,
        config: DispatchConfig,
        metrics: DispatcherMetrics,
    ) -> Self {
        assert!(!clients.is_empty(), "at least one account is required");
        let slots: Vec<AccountSlot> = clients
            .into_iter()
            .enumerate()
            .map(|(index, client)| AccountSlot {
                index,
                address: client.address().to_string(),
                client,
                queue: Arc::new(SubmissionQueue::new()),
            })
            .collect();
        let router = RoundRobinRouter::new(slots.len());
        Self {
            slots,
            router,
            metrics,
            config,
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Number of account slots.
    pub fn accounts(&self) -> usize {
        self.slots.len()
    }

    /// Spawn one dispatcher task per account and return their join handles
    /// for supervision. [`TxDispatcher::stop`] aborts them.
    pub fn start(&self) -> Vec<Instrumented<JoinHandle<Result<()>>>> {
        let mut aborts = self.workers.lock().expect("worker registry poisoned");
        let mut handles = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let worker = AccountWorker::new(
                slot.index,
                slot.client.clone(),
                slot.queue.clone(),
                self.config.queue_interval,
                self.config.memo.clone(),
                self.config.max_sequence_retries,
                self.metrics.clone(),
            );
            let handle = worker.spawn();
            aborts.push(handle.inner().abort_handle());
            handles.push(handle);
        }
        info!(accounts = self.slots.len(), "dispatcher started");
        handles
    }

    /// Cancel all dispatcher tasks.
    ///
    /// Queued submissions are not drained; an in-flight submission's waiter
    /// observes the abort as [`DispatchError::Stopped`]. No further
    /// broadcasts occur after this returns.
    pub fn stop(&self) {
        let mut aborts = self.workers.lock().expect("worker registry poisoned");
        for handle in aborts.drain(..) {
            handle.abort();
        }
        info!("dispatcher stopped");
    }

    async fn enqueue(
        &self,
        index: usize,
        id: String,
        messages: Vec<EncodedMsg>,
        priority: TxPriority,
        opts: SubmitOptions,
    ) -> DispatchResult<String> {
        let gas = opts.gas.unwrap_or_else(|| self.config.gas.clone());
        let (submission, rx) = Submission::new(id, messages, priority, index, gas, opts.trace_id);
        debug!(id = %submission.id, account = index, ?priority, "submission enqueued");
        self.metrics.pending.inc();
        self.slots[index].queue.offer(submission);
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Stopped),
        }
    }

    /// Enqueue pre-encoded messages as a single atomic transaction.
    /// Resolves with the hash once the broadcast is accepted into the
    /// mempool, not when it is included in a block.
    pub async fn submit(
        &self,
        id: impl Into<String>,
        messages: Vec<EncodedMsg>,
        priority: TxPriority,
        opts: SubmitOptions,
    ) -> DispatchResult<String> {
        let index = self.router.route(opts.force_index)?;
        self.enqueue(index, id.into(), messages, priority, opts).await
    }

    /// Encode CosmWasm execute payloads against the core contract, with the
    /// routed account as sender and the given funds attached, then submit.
    pub async fn submit_smart(
        &self,
        id: impl Into<String>,
        msgs: &[serde_json::Value],
        priority: TxPriority,
        funds: Option<Vec<Coin>>,
        opts: SubmitOptions,
    ) -> DispatchResult<String> {
        let index = self.router.route(opts.force_index)?;
        let funds = funds.unwrap_or_default();
        let sender = &self.slots[index].address;
        let messages = msgs
            .iter()
            .map(|msg| execute_contract_msg(sender, &self.config.contract, msg, &funds))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DispatchError::Chain(e.to_string()))?;
        self.enqueue(index, id.into(), messages, priority, opts).await
    }

    /// Submit and poll until the transaction is included or fails
    /// terminally. `deadline` bounds the poll; elapsing it surfaces
    /// [`DispatchError::InclusionTimeout`].
    pub async fn submit_and_wait(
        &self,
        id: impl Into<String>,
        messages: Vec<EncodedMsg>,
        priority: TxPriority,
        opts: SubmitOptions,
        deadline: Option<Duration>,
    ) -> DispatchResult<IndexedTx> {
        let index = self.router.route(opts.force_index)?;
        let trace_id = opts.trace_id.clone();
        let hash = self.enqueue(index, id.into(), messages, priority, opts).await?;
        self.wait_for_inclusion(index, &hash, trace_id.as_deref(), deadline)
            .await
    }

    /// The `submit_smart` counterpart of [`TxDispatcher::submit_and_wait`].
    pub async fn submit_smart_and_wait(
        &self,
        id: impl Into<String>,
        msgs: &[serde_json::Value],
        priority: TxPriority,
        funds: Option<Vec<Coin>>,
        opts: SubmitOptions,
        deadline: Option<Duration>,
    ) -> DispatchResult<IndexedTx> {
        let trace_id = opts.trace_id.clone();
        let forced = opts.force_index;
        let hash = self.submit_smart(id, msgs, priority, funds, opts).await?;
        // submit_smart already advanced the router; poll on the slot the
        // hash was broadcast from when pinned, else on slot 0
        let index = forced.unwrap_or(0);
        self.wait_for_inclusion(index, &hash, trace_id.as_deref(), deadline)
            .await
    }

    async fn wait_for_inclusion(
        &self,
        index: usize,
        hash: &str,
        trace_id: Option<&str>,
        deadline: Option<Duration>,
    ) -> DispatchResult<IndexedTx> {
        let poller =
            InclusionPoller::new(self.slots[index].client.clone(), self.config.poll_interval);
        let wait = poller.wait_for_inclusion(hash, trace_id);
        match deadline {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| DispatchError::InclusionTimeout)?,
            None => wait.await,
        }
    }

    async fn raw_query(
        &self,
        query: &serde_json::Value,
        account_index: Option<usize>,
    ) -> DispatchResult<Vec<u8>> {
        let index = account_index.unwrap_or(0);
        let slot = self
            .slots
            .get(index)
            .ok_or(DispatchError::UnknownAccount(index))?;
        let payload =
            serde_json::to_vec(query).map_err(|e| DispatchError::Chain(e.to_string()))?;
        slot.client.smart_query(&self.config.contract, &payload).await
    }

    /// Direct smart query against the core contract; bypasses the queues.
    pub async fn query_contract_smart<T: DeserializeOwned>(
        &self,
        query: &serde_json::Value,
        account_index: Option<usize>,
    ) -> DispatchResult<T> {
        let bytes = self.raw_query(query, account_index).await?;
        bigint::from_slice(&bytes).map_err(|e| DispatchError::Chain(e.to_string()))
    }

    /// Like [`TxDispatcher::query_contract_smart`], but returns the raw
    /// JSON value with integer precision preserved beyond 2^53.
    pub async fn query_contract_smart_big_int(
        &self,
        query: &serde_json::Value,
        account_index: Option<usize>,
    ) -> DispatchResult<serde_json::Value> {
        let bytes = self.raw_query(query, account_index).await?;
        bigint::parse(&bytes).map_err(|e| DispatchError::Chain(e.to_string()))
    }

    /// Block passthrough; latest when `height` is `None`.
    pub async fn get_block(&self, height: Option<u64>) -> DispatchResult<BlockInfo> {
        self.slots[0].client.get_block(height).await
    }

    /// Balance passthrough; the configured base denomination when `denom`
    /// is `None`.
    pub async fn get_balance(
        &self,
        address: &str,
        denom: Option<&str>,
    ) -> DispatchResult<Coin> {
        self.slots[0]
            .client
            .get_balance(address, denom.unwrap_or(&self.config.gas.denom))
            .await
    }

    /// Point-in-time dispatch counters.
    pub fn stats(&self) -> DispatchStats {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{indexed_tx, MockChainClient};
    use overlay_core::{GasPolicy, TxPriority};
    use serde_json::json;

    fn config() -> DispatchConfig {
        DispatchConfig {
            contract: "seda1core".to_string(),
            memo: "Sent from SEDA Overlay".to_string(),
            queue_interval: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
            gas: GasConfig {
                policy: GasPolicy::Zero,
                gas_price: 0,
                denom: "aseda".to_string(),
            },
            max_sequence_retries: None,
        }
    }

    fn dispatcher_with(accounts: usize, config: DispatchConfig) -> (Arc<TxDispatcher>, Vec<Arc<MockChainClient>>) {
        let clients: Vec<Arc<MockChainClient>> = (0..accounts)
            .map(|i| Arc::new(MockChainClient::new(format!("seda1acc{i}"))))
            .collect();
        let dyn_clients: Vec<Arc<dyn SigningClient>> = clients
            .iter()
            .map(|c| c.clone() as Arc<dyn SigningClient>)
            .collect();
        let dispatcher = Arc::new(TxDispatcher::new(
            dyn_clients,
            config,
            DispatcherMetrics::unregistered(),
        ));
        (dispatcher, clients)
    }

    fn msg(id: &str) -> EncodedMsg {
        EncodedMsg::new(format!("/test.Msg{id}"), vec![])
    }

    #[tokio::test]
    async fn submit_resolves_with_the_broadcast_hash() {
        let (dispatcher, clients) = dispatcher_with(1, config());
        dispatcher.start();

        let hash = dispatcher
            .submit("1", vec![msg("1")], TxPriority::High, SubmitOptions::default())
            .await
            .unwrap();
        assert!(hash.starts_with("HASH-"));
        assert_eq!(clients[0].broadcast_calls(), 1);

        let stats = dispatcher.stats();
        assert_eq!(stats.success, 1);
        assert_eq!(stats.pending, 0);
        dispatcher.stop();
    }

    #[tokio::test]
    async fn forced_index_lands_on_that_slot() {
        let (dispatcher, clients) = dispatcher_with(4, config());
        dispatcher.start();

        let opts = SubmitOptions {
            force_index: Some(0),
            ..Default::default()
        };
        dispatcher
            .submit("f", vec![msg("f")], TxPriority::High, opts)
            .await
            .unwrap();

        assert_eq!(clients[0].broadcast_calls(), 1);
        for client in &clients[1..] {
            assert_eq!(client.broadcast_calls(), 0);
        }
        dispatcher.stop();
    }

    #[tokio::test]
    async fn out_of_range_forced_index_is_rejected_without_enqueueing() {
        let (dispatcher, _clients) = dispatcher_with(2, config());
        dispatcher.start();

        let opts = SubmitOptions {
            force_index: Some(5),
            ..Default::default()
        };
        let err = dispatcher
            .submit("x", vec![msg("x")], TxPriority::Low, opts)
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownAccount(5));
        assert_eq!(dispatcher.stats().pending, 0);
        dispatcher.stop();
    }

    #[tokio::test]
    async fn round_robin_spreads_across_accounts() {
        let (dispatcher, clients) = dispatcher_with(2, config());
        dispatcher.start();

        for i in 0..4 {
            dispatcher
                .submit(
                    i.to_string(),
                    vec![msg(&i.to_string())],
                    TxPriority::Low,
                    SubmitOptions::default(),
                )
                .await
                .unwrap();
        }

        assert_eq!(clients[0].broadcast_calls(), 2);
        assert_eq!(clients[1].broadcast_calls(), 2);
        dispatcher.stop();
    }

    #[tokio::test]
    async fn submit_smart_encodes_the_routed_sender() {
        let (dispatcher, clients) = dispatcher_with(1, config());
        dispatcher.start();

        dispatcher
            .submit_smart(
                "s",
                &[json!({ "commit_data_result": { "dr_id": "0xabc" } })],
                TxPriority::High,
                Some(vec![Coin::new("aseda", "5")]),
                SubmitOptions::default(),
            )
            .await
            .unwrap();

        let log = clients[0].broadcast_log();
        assert_eq!(log[0], vec!["/cosmwasm.wasm.v1.MsgExecuteContract".to_string()]);
        dispatcher.stop();
    }

    #[tokio::test]
    async fn submit_and_wait_polls_until_indexed() {
        let (dispatcher, clients) = dispatcher_with(1, config());
        // first poll: not yet indexed; second: included
        clients[0].push_get_tx(Ok(None));
        clients[0].push_get_tx(Ok(Some(indexed_tx("HASH-1", 0, ""))));
        dispatcher.start();

        let tx = dispatcher
            .submit_and_wait(
                "w",
                vec![msg("w")],
                TxPriority::High,
                SubmitOptions::default(),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();
        assert_eq!(tx.code, 0);
        assert_eq!(clients[0].get_tx_calls(), 2);
        dispatcher.stop();
    }

    #[tokio::test]
    async fn submit_and_wait_times_out_against_the_deadline() {
        let (dispatcher, _clients) = dispatcher_with(1, config());
        // mock returns None forever by default
        dispatcher.start();

        let err = dispatcher
            .submit_and_wait(
                "t",
                vec![msg("t")],
                TxPriority::High,
                SubmitOptions::default(),
                Some(Duration::from_millis(20)),
            )
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::InclusionTimeout);
        dispatcher.stop();
    }

    #[tokio::test]
    async fn bigint_query_preserves_precision() {
        let (dispatcher, clients) = dispatcher_with(1, config());
        clients[0].set_query_response(br#"{"balance":1000000000000000000000}"#.to_vec());

        let value = dispatcher
            .query_contract_smart_big_int(&json!({ "get_balance": {} }), None)
            .await
            .unwrap();
        assert_eq!(value["balance"].to_string(), "1000000000000000000000");
    }

    #[tokio::test]
    async fn graceful_stop_keeps_queued_submissions_pending() {
        let mut cfg = config();
        cfg.queue_interval = Duration::from_millis(200);
        let (dispatcher, clients) = dispatcher_with(1, cfg);
        dispatcher.start();

        // five submissions, none of which can broadcast inside the pacing
        // window before stop() lands
        let mut waiters = Vec::new();
        for i in 0..5 {
            let d = dispatcher.clone();
            waiters.push(tokio::spawn(async move {
                d.submit(
                    i.to_string(),
                    vec![EncodedMsg::new("/test.Msg", vec![])],
                    TxPriority::Low,
                    SubmitOptions::default(),
                )
                .await
            }));
        }
        // let the worker pick up the first item into its pacing sleep
        tokio::time::sleep(Duration::from_millis(20)).await;
        dispatcher.stop();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(clients[0].broadcast_calls(), 0, "no further broadcasts");
        assert_eq!(dispatcher.stats().pending, 5, "queued items not drained");
        for waiter in waiters {
            waiter.abort();
        }
    }

    #[tokio::test]
    async fn in_flight_waiter_observes_stop_as_outcome_unknown() {
        let mut cfg = config();
        cfg.queue_interval = Duration::from_millis(200);
        let (dispatcher, clients) = dispatcher_with(1, cfg);
        dispatcher.start();

        let waiter = {
            let d = dispatcher.clone();
            tokio::spawn(async move {
                d.submit(
                    "only",
                    vec![EncodedMsg::new("/test.Msg", vec![])],
                    TxPriority::High,
                    SubmitOptions::default(),
                )
                .await
            })
        };
        // the worker has taken the submission into its pacing sleep
        tokio::time::sleep(Duration::from_millis(20)).await;
        dispatcher.stop();

        assert_eq!(waiter.await.unwrap(), Err(DispatchError::Stopped));
        assert_eq!(clients[0].broadcast_calls(), 0);
    }
}
