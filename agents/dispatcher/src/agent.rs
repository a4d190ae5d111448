use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result;
use tokio::task::JoinHandle;
use tracing::{info, instrument::Instrumented};

use overlay_base::{
    run_all,
    settings::{Settings, CONTRACT_AUTO},
    BaseAgent, CoreMetrics, OverlayAgentCore,
};
use overlay_core::SigningClient;
use overlay_cosmos::{CosmosSigningClient, GrpcProvider, SignerSet};

use crate::dispatch::{DispatchConfig, TxDispatcher};
use crate::metrics::DispatcherMetrics;

/// The dispatcher agent: a signer set derived at startup, one signing
/// client and dispatcher task per account, and the dispatch facade.
#[derive(Debug)]
pub struct Dispatcher {
    dispatcher: Arc<TxDispatcher>,
    core: OverlayAgentCore,
}

impl AsRef<OverlayAgentCore> for Dispatcher {
    fn as_ref(&self) -> &OverlayAgentCore {
        &self.core
    }
}

impl Dispatcher {
    /// The dispatch facade, for embedding the agent in a larger process.
    pub fn dispatcher(&self) -> &Arc<TxDispatcher> {
        &self.dispatcher
    }
}

#[async_trait]
impl BaseAgent for Dispatcher {
    const AGENT_NAME: &'static str = "dispatcher";

    type Settings = Settings;

    async fn from_settings(settings: Self::Settings, metrics: Arc<CoreMetrics>) -> Result<Self>
    where
        Self: Sized,
    {
        let conf = settings.connection_conf()?;

        let signers = SignerSet::derive(&settings.mnemonic, &settings.prefix, settings.account_amounts)?;
        let clients: Vec<Arc<dyn SigningClient>> = signers
            .iter()
            .map(|signer| {
                Arc::new(CosmosSigningClient::new(conf.clone(), signer.clone()))
                    as Arc<dyn SigningClient>
            })
            .collect();

        let contract = if settings.contract == CONTRACT_AUTO {
            let address = GrpcProvider::new(conf.clone())
                .core_contract_registry()
                .await?;
            info!(%address, "resolved core contract");
            address
        } else {
            settings.contract.clone()
        };

        let config = DispatchConfig {
            contract,
            memo: settings.memo.clone(),
            queue_interval: settings.queue_interval(),
            poll_interval: settings.poll_interval(),
            gas: settings.gas_config()?,
            max_sequence_retries: settings.max_sequence_retries,
        };
        let dispatcher = Arc::new(TxDispatcher::new(
            clients,
            config,
            DispatcherMetrics::new(&metrics)?,
        ));

        Ok(Self {
            dispatcher,
            core: OverlayAgentCore { metrics, settings },
        })
    }

    fn run(&self) -> Instrumented<JoinHandle<Result<()>>> {
        run_all(self.dispatcher.start())
    }

    async fn shutdown(&self) {
        self.dispatcher.stop();
    }
}
