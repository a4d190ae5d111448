use cosmrs::proto::prost;

/// Errors specific to the Cosmos backend.
///
/// These are transport- and encoding-level failures; they are flattened to
/// strings at the `SigningClient` boundary where the error narrower decides
/// whether a message maps onto a typed domain kind.
#[derive(Debug, thiserror::Error)]
pub enum CosmosClientError {
    /// bech32 error
    #[error("{0}")]
    Bech32(#[from] bech32::Error),
    /// HD derivation error
    #[error("{0}")]
    Bip32(#[from] cosmrs::bip32::Error),
    /// gRPC error
    #[error("{0}")]
    Grpc(#[from] tonic::Status),
    /// Cosmos error
    #[error("{0}")]
    Cosmos(#[from] cosmrs::Error),
    /// Cosmos error report
    #[error("{0}")]
    CosmosReport(#[from] cosmrs::ErrorReport),
    /// Tendermint error
    #[error("{0}")]
    Tendermint(#[from] cosmrs::tendermint::Error),
    /// Tonic transport error
    #[error("{0}")]
    Transport(#[from] tonic::transport::Error),
    /// Prost decoding error
    #[error("{0}")]
    Prost(#[from] prost::DecodeError),
    /// JSON codec error
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// A fee amount was not a valid base-denomination integer.
    #[error("invalid fee amount: {0}")]
    InvalidAmount(#[from] std::num::ParseIntError),
    /// A response was missing a field the protocol requires.
    #[error("malformed response: missing {0}")]
    MissingField(&'static str),
    /// The chain registry has no core contract registered.
    #[error("no core contract registered on chain")]
    NoCoreContract,
    /// Digest length mismatch when forming an address.
    #[error("could not form address: {0}")]
    Address(String),
}
