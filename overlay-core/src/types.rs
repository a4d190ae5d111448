use serde::{Deserialize, Serialize};

/// A protobuf-encoded chain message together with its type URL.
///
/// The payload bytes are carried bit-exact from the encoder to the signer;
/// the dispatch pipeline never re-encodes them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedMsg {
    /// Fully qualified protobuf type URL, e.g. `/cosmwasm.wasm.v1.MsgExecuteContract`.
    pub type_url: String,
    /// Encoded message body.
    pub value: Vec<u8>,
}

impl EncodedMsg {
    /// Create a new encoded message.
    pub fn new(type_url: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            type_url: type_url.into(),
            value,
        }
    }
}

/// An amount of tokens in the base denomination.
///
/// Amounts are integer strings; the base denomination has no fractional
/// representation on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination, e.g. `aseda`.
    pub denom: String,
    /// Integer amount in base units.
    pub amount: String,
}

impl Coin {
    /// Create a new coin amount.
    pub fn new(denom: impl Into<String>, amount: impl ToString) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.to_string(),
        }
    }
}

/// Concrete fee attached to a signed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxFee {
    /// Gas limit for execution.
    pub gas_limit: u64,
    /// Fee amount; empty for zero-fee transactions.
    pub amount: Vec<Coin>,
}

impl TxFee {
    /// The fee used when signing a transaction for simulation only.
    pub fn simulation() -> Self {
        Self {
            gas_limit: 0,
            amount: vec![],
        }
    }
}

/// On-chain signing identity of an account: its number and next sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountInfo {
    /// Account number assigned by the chain.
    pub account_number: u64,
    /// Next expected sequence number.
    pub sequence: u64,
}

/// A transaction that has been included in a block and indexed by the node.
#[derive(Clone, Debug)]
pub struct IndexedTx {
    /// Transaction hash (upper-case hex).
    pub hash: String,
    /// Height of the including block.
    pub height: u64,
    /// Execution result code; `0` means success.
    pub code: u32,
    /// Raw log emitted by the chain; carries the contract error on failure.
    pub raw_log: String,
    /// Gas requested.
    pub gas_wanted: u64,
    /// Gas consumed.
    pub gas_used: u64,
    /// Events emitted during execution.
    pub events: Vec<TxEvent>,
}

/// An event emitted by a transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxEvent {
    /// Event type.
    #[serde(rename = "type")]
    pub typ: String,
    /// Event attributes.
    pub attributes: Vec<TxEventAttribute>,
}

/// A single key/value attribute of a transaction event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxEventAttribute {
    /// Attribute key.
    pub key: String,
    /// Attribute value.
    pub value: String,
}

/// Block header data surfaced by the block passthrough.
#[derive(Clone, Debug)]
pub struct BlockInfo {
    /// Block height.
    pub height: u64,
    /// Block hash (upper-case hex).
    pub hash: String,
    /// Chain identifier from the header.
    pub chain_id: String,
    /// Header time, Unix seconds.
    pub time: i64,
}
