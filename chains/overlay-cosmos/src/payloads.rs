use cosmrs::proto::cosmos::base::v1beta1::Coin as ProtoCoin;
use cosmrs::proto::cosmwasm::wasm::v1::MsgExecuteContract;
use cosmrs::proto::traits::Message;

use overlay_core::{Coin, EncodedMsg};

use crate::error::CosmosClientError;

/// Type URL of a CosmWasm execute message.
pub const MSG_EXECUTE_CONTRACT_TYPE_URL: &str = "/cosmwasm.wasm.v1.MsgExecuteContract";
/// Type URL of a CosmWasm execute response.
pub const MSG_EXECUTE_CONTRACT_RESPONSE_TYPE_URL: &str =
    "/cosmwasm.wasm.v1.MsgExecuteContractResponse";
/// Type URL of the chain staking message.
pub const MSG_STAKE_TYPE_URL: &str = "/sedachain.core.v1.MsgStake";
/// Type URL of the chain staking response.
pub const MSG_STAKE_RESPONSE_TYPE_URL: &str = "/sedachain.core.v1.MsgStakeResponse";
/// Type URL of the chain unstaking message.
pub const MSG_UNSTAKE_TYPE_URL: &str = "/sedachain.core.v1.MsgUnstake";
/// Type URL of the chain unstaking response.
pub const MSG_UNSTAKE_RESPONSE_TYPE_URL: &str = "/sedachain.core.v1.MsgUnstakeResponse";
/// Type URL of the chain withdraw message.
pub const MSG_WITHDRAW_TYPE_URL: &str = "/sedachain.core.v1.MsgWithdraw";
/// Type URL of the chain withdraw response.
pub const MSG_WITHDRAW_RESPONSE_TYPE_URL: &str = "/sedachain.core.v1.MsgWithdrawResponse";

/// `/sedachain.core.v1.MsgStake`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgStake {
    /// Staker address.
    #[prost(string, tag = "1")]
    pub sender: ::prost::alloc::string::String,
    /// Stake amount in the base denomination.
    #[prost(message, optional, tag = "2")]
    pub amount: ::core::option::Option<ProtoCoin>,
}

/// `/sedachain.core.v1.MsgStakeResponse`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgStakeResponse {}

/// `/sedachain.core.v1.MsgUnstake`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgUnstake {
    /// Staker address.
    #[prost(string, tag = "1")]
    pub sender: ::prost::alloc::string::String,
    /// Amount to unstake in the base denomination.
    #[prost(message, optional, tag = "2")]
    pub amount: ::core::option::Option<ProtoCoin>,
}

/// `/sedachain.core.v1.MsgUnstakeResponse`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgUnstakeResponse {}

/// `/sedachain.core.v1.MsgWithdraw`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgWithdraw {
    /// Staker address.
    #[prost(string, tag = "1")]
    pub sender: ::prost::alloc::string::String,
    /// Amount to withdraw in the base denomination.
    #[prost(message, optional, tag = "2")]
    pub amount: ::core::option::Option<ProtoCoin>,
}

/// `/sedachain.core.v1.MsgWithdrawResponse`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgWithdrawResponse {}

/// `/sedachain.wasm_storage.v1.QueryCoreContractRegistryRequest`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryCoreContractRegistryRequest {}

/// `/sedachain.wasm_storage.v1.QueryCoreContractRegistryResponse`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryCoreContractRegistryResponse {
    /// Address of the registered core contract.
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
}

fn to_proto_coin(coin: &Coin) -> ProtoCoin {
    ProtoCoin {
        denom: coin.denom.clone(),
        amount: coin.amount.clone(),
    }
}

/// Encode a CosmWasm execute message. `msg` is the contract-specific execute
/// payload, serialized as UTF-8 JSON bytes.
pub fn execute_contract_msg(
    sender: &str,
    contract: &str,
    msg: &serde_json::Value,
    funds: &[Coin],
) -> Result<EncodedMsg, CosmosClientError> {
    let msg = MsgExecuteContract {
        sender: sender.to_string(),
        contract: contract.to_string(),
        msg: serde_json::to_vec(msg)?,
        funds: funds.iter().map(to_proto_coin).collect(),
    };
    Ok(EncodedMsg::new(
        MSG_EXECUTE_CONTRACT_TYPE_URL,
        msg.encode_to_vec(),
    ))
}

/// Encode a stake message for the chain's core module.
pub fn stake_msg(sender: &str, amount: &Coin) -> EncodedMsg {
    let msg = MsgStake {
        sender: sender.to_string(),
        amount: Some(to_proto_coin(amount)),
    };
    EncodedMsg::new(MSG_STAKE_TYPE_URL, msg.encode_to_vec())
}

/// Encode an unstake message for the chain's core module.
pub fn unstake_msg(sender: &str, amount: &Coin) -> EncodedMsg {
    let msg = MsgUnstake {
        sender: sender.to_string(),
        amount: Some(to_proto_coin(amount)),
    };
    EncodedMsg::new(MSG_UNSTAKE_TYPE_URL, msg.encode_to_vec())
}

/// Encode a withdraw message for the chain's core module.
pub fn withdraw_msg(sender: &str, amount: &Coin) -> EncodedMsg {
    let msg = MsgWithdraw {
        sender: sender.to_string(),
        amount: Some(to_proto_coin(amount)),
    };
    EncodedMsg::new(MSG_WITHDRAW_TYPE_URL, msg.encode_to_vec())
}
