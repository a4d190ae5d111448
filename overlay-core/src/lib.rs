//! Chain-agnostic core of the overlay transaction dispatch pipeline.
//!
//! This crate holds the domain model shared by the dispatcher and the chain
//! backends: submissions and their priorities, gas policy, fee and account
//! structures, the typed error taxonomy, and the `SigningClient` capability
//! the dispatcher is written against.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
mod submission;
mod types;

pub use client::*;
pub use error::*;
pub use submission::*;
pub use types::*;
