use async_trait::async_trait;

use crate::{AccountInfo, BlockInfo, Coin, DispatchResult, EncodedMsg, IndexedTx, TxFee};

/// Capability handle to the chain's signing primitive for one account.
///
/// Implementations maintain a per-instance sequence cache: the cached
/// sequence is incremented after every accepted broadcast and cleared before
/// any sequence-fault error is propagated, so the next signing operation
/// reloads from chain.
#[async_trait]
pub trait SigningClient: Send + Sync {
    /// The bech32 address of the underlying identity.
    fn address(&self) -> &str;

    /// Account number and next sequence, served from the cache when warm.
    async fn account_info(&self) -> DispatchResult<AccountInfo>;

    /// Dry-run the messages against current chain state and return the
    /// simulated gas consumption (unadjusted).
    async fn simulate(&self, msgs: &[EncodedMsg], memo: &str) -> DispatchResult<u64>;

    /// Sign with the next sequence and broadcast synchronously. Returns the
    /// transaction hash as soon as the node accepts the transaction into its
    /// mempool, before block inclusion.
    async fn sign_and_broadcast_sync(
        &self,
        msgs: &[EncodedMsg],
        fee: &TxFee,
        memo: &str,
    ) -> DispatchResult<String>;

    /// Look up a transaction by hash. `None` means not yet indexed; a
    /// result with nonzero `code` means the transaction failed on chain.
    async fn get_tx(&self, hash: &str) -> DispatchResult<Option<IndexedTx>>;

    /// Execute a CosmWasm smart query against a contract; returns the raw
    /// response bytes (JSON).
    async fn smart_query(&self, contract: &str, payload: &[u8]) -> DispatchResult<Vec<u8>>;

    /// Fetch a block header; latest when `height` is `None`.
    async fn get_block(&self, height: Option<u64>) -> DispatchResult<BlockInfo>;

    /// Fetch the balance of an address in the given denomination.
    async fn get_balance(&self, address: &str, denom: &str) -> DispatchResult<Coin>;
}
