//! The dispatcher delivers smart-contract messages to the chain on behalf
//! of the locally derived accounts, with strict per-account sequence
//! ordering and priority-aware admission.

use eyre::Result;

use dispatcher::Dispatcher;
use overlay_base::agent_main;

#[tokio::main]
async fn main() -> Result<()> {
    agent_main::<Dispatcher>().await
}
