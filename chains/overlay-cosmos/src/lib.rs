//! Cosmos backend for the overlay dispatch pipeline.
//!
//! Wraps the chain's signing and query primitives behind the
//! `overlay_core::SigningClient` capability: HD-derived signer identities,
//! tonic gRPC providers, a sequence-caching signing client, protobuf
//! payload builders, and a big-integer-safe smart-query codec.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Big-integer-safe JSON codec for smart-query responses
pub mod bigint;

mod client;
mod conf;
mod error;
mod payloads;
mod providers;
mod signers;

pub use self::{client::*, conf::*, error::*, payloads::*, providers::*, signers::*};
