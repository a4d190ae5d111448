use std::fmt::{Debug, Formatter};
use std::sync::Mutex;

use async_trait::async_trait;
use cosmrs::proto::cosmos::base::abci::v1beta1::TxResponse;
use cosmrs::tx::{self, Fee, SignDoc, SignerInfo};
use cosmrs::Any;
use tracing::{debug, instrument, warn};

use overlay_core::{
    narrow, AccountInfo, BlockInfo, Coin, DispatchError, DispatchResult, EncodedMsg, IndexedTx,
    SigningClient, TxEvent, TxEventAttribute, TxFee,
};

use crate::conf::ConnectionConf;
use crate::error::CosmosClientError;
use crate::providers::GrpcProvider;
use crate::signers::Signer;

/// Which pipeline stage an opaque chain error escaped from. Decides the
/// fallback kind when the narrower finds no marker.
#[derive(Clone, Copy, Debug)]
enum Phase {
    Simulate,
    Broadcast,
    Query,
}

impl Phase {
    fn wrap(self, text: String) -> DispatchError {
        match self {
            Phase::Simulate => DispatchError::SimulateFailed(text),
            Phase::Broadcast => DispatchError::BroadcastFailed(text),
            Phase::Query => DispatchError::Chain(text),
        }
    }
}

/// Per-account signing client over the chain's gRPC services.
///
/// Holds the account's sequence cache: present when the most recent
/// broadcast completed without a sequence fault, incremented after every
/// accepted broadcast, and cleared before a sequence-fault error is
/// propagated so the next signing operation reloads from chain.
pub struct CosmosSigningClient {
    provider: GrpcProvider,
    signer: Signer,
    chain_id: String,
    account: Mutex<Option<AccountInfo>>,
}

impl Debug for CosmosSigningClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CosmosSigningClient")
            .field("address", &self.signer.address)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

impl CosmosSigningClient {
    /// Create a signing client for one derived identity.
    pub fn new(conf: ConnectionConf, signer: Signer) -> Self {
        Self {
            chain_id: conf.get_chain_id(),
            provider: GrpcProvider::new(conf),
            signer,
            account: Mutex::new(None),
        }
    }

    /// The underlying query provider.
    pub fn provider(&self) -> &GrpcProvider {
        &self.provider
    }

    /// The cached account info, if the cache is warm.
    pub fn cached_account(&self) -> Option<AccountInfo> {
        *self.account.lock().expect("account cache poisoned")
    }

    fn clear_cached_account(&self) {
        *self.account.lock().expect("account cache poisoned") = None;
    }

    fn bump_sequence(&self) {
        if let Some(info) = self.account.lock().expect("account cache poisoned").as_mut() {
            info.sequence += 1;
        }
    }

    async fn cached_or_fetch_account(&self) -> Result<AccountInfo, CosmosClientError> {
        if let Some(info) = self.cached_account() {
            return Ok(info);
        }
        let base = self.provider.account(&self.signer.address).await?;
        let info = AccountInfo {
            account_number: base.account_number,
            sequence: base.sequence,
        };
        debug!(address = %self.signer.address, sequence = info.sequence, "loaded account info from chain");
        *self.account.lock().expect("account cache poisoned") = Some(info);
        Ok(info)
    }

    /// Narrow an opaque chain error; clears the sequence cache before a
    /// sequence fault is propagated.
    fn fault(&self, text: String, phase: Phase) -> DispatchError {
        match narrow(&text) {
            Some(err) => {
                if err.is_sequence_fault() {
                    warn!(address = %self.signer.address, "sequence fault, dropping cached account info");
                    self.clear_cached_account();
                }
                err
            }
            None => phase.wrap(text),
        }
    }

    fn sign_tx(
        &self,
        msgs: &[EncodedMsg],
        fee: &TxFee,
        memo: &str,
        info: AccountInfo,
    ) -> Result<Vec<u8>, CosmosClientError> {
        let any_msgs: Vec<Any> = msgs
            .iter()
            .map(|msg| Any {
                type_url: msg.type_url.clone(),
                value: msg.value.clone(),
            })
            .collect();

        let body = tx::Body::new(any_msgs, memo, 0u32);
        let key = self.signer.signing_key()?;
        let signer_info = SignerInfo::single_direct(Some(key.public_key()), info.sequence);
        let auth_info = signer_info.auth_info(to_cosmrs_fee(fee)?);

        let chain_id = self.chain_id.parse::<cosmrs::tendermint::chain::Id>()?;
        let sign_doc = SignDoc::new(&body, &auth_info, &chain_id, info.account_number)?;
        let raw = sign_doc.sign(&key)?;

        Ok(raw.to_bytes()?)
    }
}

fn to_cosmrs_fee(fee: &TxFee) -> Result<Fee, CosmosClientError> {
    let amount = fee
        .amount
        .iter()
        .map(|coin| -> Result<cosmrs::Coin, CosmosClientError> {
            Ok(cosmrs::Coin {
                denom: coin.denom.parse().map_err(CosmosClientError::CosmosReport)?,
                amount: coin.amount.parse::<u128>()?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Fee {
        amount,
        gas_limit: fee.gas_limit.into(),
        payer: None,
        granter: None,
    })
}

fn indexed_tx_from_response(response: TxResponse) -> IndexedTx {
    let events = response
        .logs
        .iter()
        .flat_map(|log| {
            log.events.iter().map(|event| TxEvent {
                typ: event.r#type.clone(),
                attributes: event
                    .attributes
                    .iter()
                    .map(|attr| TxEventAttribute {
                        key: attr.key.clone(),
                        value: attr.value.clone(),
                    })
                    .collect(),
            })
        })
        .collect();

    IndexedTx {
        hash: response.txhash,
        height: response.height as u64,
        code: response.code,
        raw_log: response.raw_log,
        gas_wanted: response.gas_wanted as u64,
        gas_used: response.gas_used as u64,
        events,
    }
}

#[async_trait]
impl SigningClient for CosmosSigningClient {
    fn address(&self) -> &str {
        &self.signer.address
    }

    async fn account_info(&self) -> DispatchResult<AccountInfo> {
        self.cached_or_fetch_account()
            .await
            .map_err(|e| self.fault(e.to_string(), Phase::Query))
    }

    #[instrument(skip(self, msgs), fields(address = %self.signer.address))]
    async fn simulate(&self, msgs: &[EncodedMsg], memo: &str) -> DispatchResult<u64> {
        let info = self
            .cached_or_fetch_account()
            .await
            .map_err(|e| self.fault(e.to_string(), Phase::Simulate))?;
        let tx_bytes = self
            .sign_tx(msgs, &TxFee::simulation(), memo, info)
            .map_err(|e| self.fault(e.to_string(), Phase::Simulate))?;

        let gas_info = self
            .provider
            .simulate_tx(tx_bytes)
            .await
            .map_err(|e| self.fault(e.to_string(), Phase::Simulate))?;

        Ok(gas_info.gas_used)
    }

    #[instrument(skip(self, msgs, fee), fields(address = %self.signer.address))]
    async fn sign_and_broadcast_sync(
        &self,
        msgs: &[EncodedMsg],
        fee: &TxFee,
        memo: &str,
    ) -> DispatchResult<String> {
        let info = self
            .cached_or_fetch_account()
            .await
            .map_err(|e| self.fault(e.to_string(), Phase::Broadcast))?;
        let tx_bytes = self
            .sign_tx(msgs, fee, memo, info)
            .map_err(|e| self.fault(e.to_string(), Phase::Broadcast))?;

        let response = self
            .provider
            .broadcast_tx_sync(tx_bytes)
            .await
            .map_err(|e| self.fault(e.to_string(), Phase::Broadcast))?;

        if response.code != 0 {
            // mempool rejection; the raw log carries the chain error
            return Err(self.fault(response.raw_log, Phase::Broadcast));
        }

        self.bump_sequence();
        debug!(hash = %response.txhash, "broadcast accepted");
        Ok(response.txhash)
    }

    async fn get_tx(&self, hash: &str) -> DispatchResult<Option<IndexedTx>> {
        let response = self
            .provider
            .get_tx(hash)
            .await
            .map_err(|e| self.fault(e.to_string(), Phase::Query))?;
        Ok(response.map(indexed_tx_from_response))
    }

    async fn smart_query(&self, contract: &str, payload: &[u8]) -> DispatchResult<Vec<u8>> {
        self.provider
            .smart_contract_state(contract, payload.to_vec())
            .await
            .map_err(|e| self.fault(e.to_string(), Phase::Query))
    }

    async fn get_block(&self, height: Option<u64>) -> DispatchResult<BlockInfo> {
        self.provider
            .block(height)
            .await
            .map_err(|e| self.fault(e.to_string(), Phase::Query))
    }

    async fn get_balance(&self, address: &str, denom: &str) -> DispatchResult<Coin> {
        self.provider
            .balance(address, denom)
            .await
            .map_err(|e| self.fault(e.to_string(), Phase::Query))
    }
}
