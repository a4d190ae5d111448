use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::env;

/// Load a settings object from the config locations.
///
/// Configs are loaded in the following precedence order:
///
/// 1. The file `./config/{RUN_ENV}/{agent}` (any supported extension),
///    where `RUN_ENV` defaults to `default`.
/// 2. Configuration env vars with the prefix `SEDA_BASE` shared by all
///    agents in an environment.
/// 3. Configuration env vars with the prefix `SEDA_<AGENT>` for this
///    specific agent.
pub(crate) fn load_settings_object<T: DeserializeOwned>(agent_prefix: &str) -> eyre::Result<T> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "default".into());
    let prefix = format!("SEDA_{}", agent_prefix).to_ascii_uppercase();

    let config = Config::builder()
        .add_source(
            File::with_name(&format!(
                "./config/{}/{}",
                run_env,
                agent_prefix.to_lowercase()
            ))
            .required(false),
        )
        .add_source(Environment::with_prefix("SEDA_BASE").separator("_"))
        .add_source(Environment::with_prefix(&prefix).separator("_"))
        .build()?;

    Ok(config.try_deserialize()?)
}
