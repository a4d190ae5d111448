use cosmrs::proto::cosmos::auth::v1beta1::{
    query_client::QueryClient as AuthQueryClient, BaseAccount, QueryAccountRequest,
};
use cosmrs::proto::cosmos::bank::v1beta1::{
    query_client::QueryClient as BankQueryClient, QueryBalanceRequest,
};
use cosmrs::proto::cosmos::base::abci::v1beta1::{GasInfo, TxResponse};
use cosmrs::proto::cosmos::base::tendermint::v1beta1::{
    service_client::ServiceClient as TendermintServiceClient, GetBlockByHeightRequest,
    GetLatestBlockRequest,
};
use cosmrs::proto::cosmos::tx::v1beta1::{
    service_client::ServiceClient as TxServiceClient, BroadcastMode, BroadcastTxRequest,
    GetTxRequest, SimulateRequest,
};
use cosmrs::proto::cosmwasm::wasm::v1::{
    query_client::QueryClient as WasmQueryClient, QuerySmartContractStateRequest,
};
use cosmrs::proto::traits::Message;
use tonic::codegen::http::uri::PathAndQuery;
use tracing::debug;

use overlay_core::{BlockInfo, Coin};

use crate::conf::ConnectionConf;
use crate::error::CosmosClientError;
use crate::payloads::{QueryCoreContractRegistryRequest, QueryCoreContractRegistryResponse};

/// gRPC path of the chain registry query resolving the core contract.
const CORE_CONTRACT_REGISTRY_PATH: &str = "/sedachain.wasm_storage.v1.Query/CoreContractRegistry";

/// Thin gRPC provider over the node's query and tx services.
///
/// Connections are established per call; the endpoint is taken from the
/// connection configuration.
#[derive(Debug, Clone)]
pub struct GrpcProvider {
    conf: ConnectionConf,
}

impl GrpcProvider {
    /// Create a provider for the configured endpoint.
    pub fn new(conf: ConnectionConf) -> Self {
        Self { conf }
    }

    fn endpoint(&self) -> String {
        self.conf.get_rpc_url()
    }

    /// Query the base account backing `address`.
    pub async fn account(&self, address: &str) -> Result<BaseAccount, CosmosClientError> {
        let mut client = AuthQueryClient::connect(self.endpoint()).await?;
        let request = tonic::Request::new(QueryAccountRequest {
            address: address.to_string(),
        });

        let response = client.account(request).await?.into_inner();
        let any = response
            .account
            .ok_or(CosmosClientError::MissingField("account"))?;

        Ok(BaseAccount::decode(any.value.as_slice())?)
    }

    /// Dry-run a signed transaction and return the node's gas estimate.
    pub async fn simulate_tx(&self, tx_bytes: Vec<u8>) -> Result<GasInfo, CosmosClientError> {
        let mut client = TxServiceClient::connect(self.endpoint()).await?;
        let request = tonic::Request::new(SimulateRequest {
            tx_bytes,
            ..Default::default()
        });

        let response = client.simulate(request).await?.into_inner();
        response
            .gas_info
            .ok_or(CosmosClientError::MissingField("gas_info"))
    }

    /// Broadcast a signed transaction in sync mode: returns once the node
    /// has accepted it into its mempool.
    pub async fn broadcast_tx_sync(
        &self,
        tx_bytes: Vec<u8>,
    ) -> Result<TxResponse, CosmosClientError> {
        let mut client = TxServiceClient::connect(self.endpoint()).await?;
        let request = tonic::Request::new(BroadcastTxRequest {
            tx_bytes,
            mode: BroadcastMode::Sync as i32,
        });

        let response = client.broadcast_tx(request).await?.into_inner();
        response
            .tx_response
            .ok_or(CosmosClientError::MissingField("tx_response"))
    }

    /// Look up a transaction by hash. `None` means the node has not indexed
    /// it yet.
    pub async fn get_tx(&self, hash: &str) -> Result<Option<TxResponse>, CosmosClientError> {
        let mut client = TxServiceClient::connect(self.endpoint()).await?;
        let request = tonic::Request::new(GetTxRequest {
            hash: hash.to_string(),
        });

        match client.get_tx(request).await {
            Ok(response) => Ok(response.into_inner().tx_response),
            Err(status) if status.code() == tonic::Code::NotFound => Ok(None),
            Err(status) => Err(status.into()),
        }
    }

    /// Fetch a block header; latest when `height` is `None`.
    pub async fn block(&self, height: Option<u64>) -> Result<BlockInfo, CosmosClientError> {
        let mut client = TendermintServiceClient::connect(self.endpoint()).await?;

        #[allow(deprecated)]
        let (block_id, block) = match height {
            Some(height) => {
                let request = tonic::Request::new(GetBlockByHeightRequest {
                    height: height as i64,
                });
                let response = client.get_block_by_height(request).await?.into_inner();
                (response.block_id, response.block)
            }
            None => {
                let request = tonic::Request::new(GetLatestBlockRequest {});
                let response = client.get_latest_block(request).await?.into_inner();
                (response.block_id, response.block)
            }
        };

        let header = block
            .ok_or(CosmosClientError::MissingField("block"))?
            .header
            .ok_or(CosmosClientError::MissingField("header"))?;
        let hash = block_id
            .map(|id| hex::encode_upper(id.hash))
            .unwrap_or_default();

        Ok(BlockInfo {
            height: header.height as u64,
            hash,
            chain_id: header.chain_id,
            time: header.time.map(|t| t.seconds).unwrap_or_default(),
        })
    }

    /// Fetch the balance of `address` in `denom`.
    pub async fn balance(&self, address: &str, denom: &str) -> Result<Coin, CosmosClientError> {
        let mut client = BankQueryClient::connect(self.endpoint()).await?;
        let request = tonic::Request::new(QueryBalanceRequest {
            address: address.to_string(),
            denom: denom.to_string(),
        });

        let response = client.balance(request).await?.into_inner();
        let balance = response
            .balance
            .ok_or(CosmosClientError::MissingField("balance"))?;

        Ok(Coin {
            denom: balance.denom,
            amount: balance.amount,
        })
    }

    /// Execute a CosmWasm smart query against `contract`; `query_data` is
    /// the UTF-8 JSON payload. Returns the raw JSON response bytes.
    pub async fn smart_contract_state(
        &self,
        contract: &str,
        query_data: Vec<u8>,
    ) -> Result<Vec<u8>, CosmosClientError> {
        let mut client = WasmQueryClient::connect(self.endpoint()).await?;
        let request = tonic::Request::new(QuerySmartContractStateRequest {
            address: contract.to_string(),
            query_data,
        });

        let response = client.smart_contract_state(request).await?.into_inner();
        Ok(response.data)
    }

    /// Resolve the core contract address through the chain registry query.
    pub async fn core_contract_registry(&self) -> Result<String, CosmosClientError> {
        let channel = tonic::transport::Endpoint::from_shared(self.endpoint())?
            .connect()
            .await?;
        let mut grpc = tonic::client::Grpc::new(channel);
        grpc.ready().await?;

        let codec: tonic::codec::ProstCodec<
            QueryCoreContractRegistryRequest,
            QueryCoreContractRegistryResponse,
        > = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static(CORE_CONTRACT_REGISTRY_PATH);
        let response = grpc
            .unary(
                tonic::Request::new(QueryCoreContractRegistryRequest {}),
                path,
                codec,
            )
            .await?
            .into_inner();

        if response.address.is_empty() {
            return Err(CosmosClientError::NoCoreContract);
        }
        debug!(address = %response.address, "resolved core contract from chain registry");
        Ok(response.address)
    }
}
