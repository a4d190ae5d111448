/// Typed errors surfaced by the dispatch pipeline.
///
/// Chain and contract failures arrive as opaque strings; [`narrow`] is the
/// sole place where those strings become kinds. Variants that carry a
/// `String` keep the original message for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The locally cached sequence number drifted from the chain.
    #[error("{0}")]
    IncorrectAccountSequence(String),
    /// The contract rejected a commit that was already made.
    #[error("{0}")]
    AlreadyCommitted(String),
    /// The contract rejected a reveal that was already made.
    #[error("{0}")]
    AlreadyRevealed(String),
    /// The reveal hash does not match the commitment.
    #[error("{0}")]
    RevealMismatch(String),
    /// The data request entered its reveal phase; commits are closed.
    #[error("{0}")]
    RevealStarted(String),
    /// The data request is past its deadline.
    #[error("{0}")]
    DataRequestExpired(String),
    /// The data request is absent from contract state.
    #[error("{0}")]
    DataRequestNotFound(String),
    /// Gas simulation failed for a non-sequence reason.
    #[error("gas simulation failed: {0}")]
    SimulateFailed(String),
    /// The mempool or transport rejected the broadcast for a non-sequence reason.
    #[error("broadcast failed: {0}")]
    BroadcastFailed(String),
    /// The inclusion deadline elapsed before the transaction was indexed.
    #[error("transaction was not included before the deadline")]
    InclusionTimeout,
    /// The caller cancelled the operation.
    #[error("cancelled")]
    Cancelled,
    /// The dispatcher stopped before the submission completed; the outcome
    /// on chain is unknown.
    #[error("dispatcher stopped; submission outcome unknown")]
    Stopped,
    /// The requested account index does not exist.
    #[error("unknown account index {0}")]
    UnknownAccount(usize),
    /// A chain or transport error that matched no known kind.
    #[error("{0}")]
    Chain(String),
}

impl DispatchError {
    /// Whether this error is a sequence fault the dispatcher recovers from
    /// by clearing the cache and re-enqueueing.
    pub fn is_sequence_fault(&self) -> bool {
        matches!(self, DispatchError::IncorrectAccountSequence(_))
    }
}

/// Convenience result alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Marker substrings signalling sequence drift. Both spellings occur in the
/// wild depending on the SDK module that rejects the transaction.
const SEQUENCE_MARKERS: [&str; 2] = ["incorrect account sequence", "account sequence mismatch"];

/// Whether an error message signals sequence drift.
pub fn is_sequence_fault(message: &str) -> bool {
    SEQUENCE_MARKERS.iter().any(|m| message.contains(m))
}

/// Map an opaque chain error message onto the closed error taxonomy.
///
/// The marker substrings are a wire contract with the on-chain contract
/// layer and the order of checks is fixed. `None` means the message matched
/// no known kind and must be passed through unchanged.
pub fn narrow(message: &str) -> Option<DispatchError> {
    let owned = || message.to_string();
    if message.contains("AlreadyCommitted") {
        return Some(DispatchError::AlreadyCommitted(owned()));
    }
    if message.contains("RevealMismatch") {
        return Some(DispatchError::RevealMismatch(owned()));
    }
    if message.contains("AlreadyRevealed") {
        return Some(DispatchError::AlreadyRevealed(owned()));
    }
    if message.contains("DataRequestExpired") {
        return Some(DispatchError::DataRequestExpired(owned()));
    }
    if message.contains("RevealStarted") {
        return Some(DispatchError::RevealStarted(owned()));
    }
    if message.contains("not found: execute wasm contract failed") {
        return Some(DispatchError::DataRequestNotFound(owned()));
    }
    if is_sequence_fault(message) {
        return Some(DispatchError::IncorrectAccountSequence(owned()));
    }
    None
}
