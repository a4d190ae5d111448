//! Hand-written mock of the signing client for dispatcher tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use overlay_core::{
    AccountInfo, BlockInfo, Coin, DispatchResult, EncodedMsg, IndexedTx, SigningClient, TxFee,
};

/// Build a minimal indexed transaction for poller and facade tests.
pub(crate) fn indexed_tx(hash: &str, code: u32, raw_log: &str) -> IndexedTx {
    IndexedTx {
        hash: hash.to_string(),
        height: 10,
        code,
        raw_log: raw_log.to_string(),
        gas_wanted: 200_000,
        gas_used: 180_000,
        events: vec![],
    }
}

/// Scriptable signing client that mimics the sequence-cache contract:
/// the cache is populated on demand, bumped after an accepted broadcast,
/// and dropped when a scripted sequence fault is returned.
pub(crate) struct MockChainClient {
    address: String,
    simulate_script: Mutex<VecDeque<DispatchResult<u64>>>,
    broadcast_script: Mutex<VecDeque<DispatchResult<String>>>,
    get_tx_script: Mutex<VecDeque<DispatchResult<Option<IndexedTx>>>>,
    query_response: Mutex<Vec<u8>>,
    cached_account: Mutex<Option<AccountInfo>>,
    account_fetches: AtomicUsize,
    simulate_count: AtomicUsize,
    broadcast_count: AtomicUsize,
    get_tx_count: AtomicUsize,
    broadcast_log: Mutex<Vec<Vec<String>>>,
    hash_counter: AtomicUsize,
}

impl MockChainClient {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            simulate_script: Mutex::new(VecDeque::new()),
            broadcast_script: Mutex::new(VecDeque::new()),
            get_tx_script: Mutex::new(VecDeque::new()),
            query_response: Mutex::new(b"{}".to_vec()),
            cached_account: Mutex::new(None),
            account_fetches: AtomicUsize::new(0),
            simulate_count: AtomicUsize::new(0),
            broadcast_count: AtomicUsize::new(0),
            get_tx_count: AtomicUsize::new(0),
            broadcast_log: Mutex::new(Vec::new()),
            hash_counter: AtomicUsize::new(0),
        }
    }

    pub fn push_simulate(&self, result: DispatchResult<u64>) {
        self.simulate_script.lock().unwrap().push_back(result);
    }

    pub fn push_broadcast(&self, result: DispatchResult<String>) {
        self.broadcast_script.lock().unwrap().push_back(result);
    }

    pub fn push_get_tx(&self, result: DispatchResult<Option<IndexedTx>>) {
        self.get_tx_script.lock().unwrap().push_back(result);
    }

    pub fn set_query_response(&self, bytes: Vec<u8>) {
        *self.query_response.lock().unwrap() = bytes;
    }

    pub fn simulate_calls(&self) -> usize {
        self.simulate_count.load(Ordering::SeqCst)
    }

    pub fn broadcast_calls(&self) -> usize {
        self.broadcast_count.load(Ordering::SeqCst)
    }

    pub fn get_tx_calls(&self) -> usize {
        self.get_tx_count.load(Ordering::SeqCst)
    }

    pub fn account_fetches(&self) -> usize {
        self.account_fetches.load(Ordering::SeqCst)
    }

    pub fn cached_account(&self) -> Option<AccountInfo> {
        *self.cached_account.lock().unwrap()
    }

    /// Type URLs of each broadcast, in broadcast order.
    pub fn broadcast_log(&self) -> Vec<Vec<String>> {
        self.broadcast_log.lock().unwrap().clone()
    }

    fn ensure_account(&self) -> AccountInfo {
        let mut cache = self.cached_account.lock().unwrap();
        if let Some(info) = *cache {
            return info;
        }
        self.account_fetches.fetch_add(1, Ordering::SeqCst);
        let info = AccountInfo {
            account_number: 7,
            sequence: 41,
        };
        *cache = Some(info);
        info
    }

    fn clear_account(&self) {
        *self.cached_account.lock().unwrap() = None;
    }

    fn bump_sequence(&self) {
        if let Some(info) = self.cached_account.lock().unwrap().as_mut() {
            info.sequence += 1;
        }
    }
}

#[async_trait]
impl SigningClient for MockChainClient {
    fn address(&self) -> &str {
        &self.address
    }

    async fn account_info(&self) -> DispatchResult<AccountInfo> {
        Ok(self.ensure_account())
    }

    async fn simulate(&self, _msgs: &[EncodedMsg], _memo: &str) -> DispatchResult<u64> {
        self.ensure_account();
        self.simulate_count.fetch_add(1, Ordering::SeqCst);
        match self.simulate_script.lock().unwrap().pop_front() {
            Some(result) => {
                if matches!(&result, Err(e) if e.is_sequence_fault()) {
                    self.clear_account();
                }
                result
            }
            None => Ok(100_000),
        }
    }

    async fn sign_and_broadcast_sync(
        &self,
        msgs: &[EncodedMsg],
        _fee: &TxFee,
        _memo: &str,
    ) -> DispatchResult<String> {
        self.ensure_account();
        self.broadcast_count.fetch_add(1, Ordering::SeqCst);
        self.broadcast_log
            .lock()
            .unwrap()
            .push(msgs.iter().map(|m| m.type_url.clone()).collect());

        match self.broadcast_script.lock().unwrap().pop_front() {
            Some(Ok(hash)) => {
                self.bump_sequence();
                Ok(hash)
            }
            Some(Err(err)) => {
                if err.is_sequence_fault() {
                    self.clear_account();
                }
                Err(err)
            }
            None => {
                self.bump_sequence();
                let n = self.hash_counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(format!("HASH-{n}"))
            }
        }
    }

    async fn get_tx(&self, _hash: &str) -> DispatchResult<Option<IndexedTx>> {
        self.get_tx_count.fetch_add(1, Ordering::SeqCst);
        match self.get_tx_script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(None),
        }
    }

    async fn smart_query(&self, _contract: &str, _payload: &[u8]) -> DispatchResult<Vec<u8>> {
        Ok(self.query_response.lock().unwrap().clone())
    }

    async fn get_block(&self, height: Option<u64>) -> DispatchResult<BlockInfo> {
        Ok(BlockInfo {
            height: height.unwrap_or(100),
            hash: "AB12".to_string(),
            chain_id: "seda-1".to_string(),
            time: 0,
        })
    }

    async fn get_balance(&self, _address: &str, denom: &str) -> DispatchResult<Coin> {
        Ok(Coin::new(denom, "1000"))
    }
}
