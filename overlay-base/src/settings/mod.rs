//! Agent settings, loaded from config files and `SEDA_`-prefixed
//! environment variables.

use std::time::Duration;

use eyre::{bail, Context, Result};
use serde::{Deserialize, Deserializer};

use overlay_core::{GasConfig, GasPolicy};
use overlay_cosmos::ConnectionConf;

mod loader;
pub(crate) use loader::load_settings_object;

/// Configuration for the tracing subscriber
pub mod trace;
use trace::TracingConfig;

/// Sentinel contract value asking for resolution through the chain registry.
pub const CONTRACT_AUTO: &str = "auto";

fn default_contract() -> String {
    CONTRACT_AUTO.to_string()
}

fn default_account_amounts() -> usize {
    1
}

fn default_gas_adjustment_factor() -> f64 {
    1.8
}

fn default_gas_price() -> String {
    "10000000000".to_string()
}

fn default_memo() -> String {
    "Sent from SEDA Overlay".to_string()
}

fn default_queue_interval() -> u64 {
    200
}

fn default_transaction_poll_interval() -> u64 {
    2000
}

fn default_http_redirect_ttl_ms() -> u64 {
    30_000
}

fn default_prefix() -> String {
    "seda".to_string()
}

fn default_denom() -> String {
    "aseda".to_string()
}

/// How the gas limit of outbound transactions is determined: `auto`,
/// `zero`, or an explicit limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GasSetting {
    /// Simulate and scale by the adjustment factor.
    #[default]
    Auto,
    /// Zero gas and an empty fee.
    Zero,
    /// Explicit gas limit.
    Fixed(u64),
}

impl<'de> Deserialize<'de> for GasSetting {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        struct GasVisitor;

        impl serde::de::Visitor<'_> for GasVisitor {
            type Value = GasSetting;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("`auto`, `zero`, or a gas limit")
            }

            fn visit_u64<E: serde::de::Error>(self, gas: u64) -> Result<Self::Value, E> {
                Ok(GasSetting::Fixed(gas))
            }

            fn visit_i64<E: serde::de::Error>(self, gas: i64) -> Result<Self::Value, E> {
                u64::try_from(gas)
                    .map(GasSetting::Fixed)
                    .map_err(|_| E::custom("gas limit must not be negative"))
            }

            fn visit_str<E: serde::de::Error>(self, s: &str) -> Result<Self::Value, E> {
                match s {
                    "auto" => Ok(GasSetting::Auto),
                    "zero" => Ok(GasSetting::Zero),
                    other => other
                        .parse::<u64>()
                        .map(GasSetting::Fixed)
                        .map_err(|_| E::custom(format!("invalid gas setting `{other}`"))),
                }
            }
        }

        de.deserialize_any(GasVisitor)
    }
}

/// Settings shared by overlay agents.
///
/// Integer-valued options that arrive via env vars are declared as strings
/// and parsed at use, like the rest of the knobs here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Node endpoint URL.
    pub rpc: String,
    /// Chain identifier.
    pub chain_id: String,
    /// BIP-39 mnemonic the signer set is derived from.
    pub mnemonic: String,
    /// Core contract address, or `auto` to resolve through the chain
    /// registry at startup.
    #[serde(default = "default_contract")]
    pub contract: String,
    /// Number of accounts to derive and dispatch over (N >= 1).
    #[serde(default = "default_account_amounts")]
    pub account_amounts: usize,
    /// Gas limit policy.
    #[serde(default)]
    pub gas: GasSetting,
    /// Multiplier applied to simulated gas.
    #[serde(default = "default_gas_adjustment_factor")]
    pub gas_adjustment_factor: f64,
    /// Price per gas unit, integer string in the base denomination.
    #[serde(default = "default_gas_price")]
    pub gas_price: String,
    /// Memo attached to every transaction.
    #[serde(default = "default_memo")]
    pub memo: String,
    /// Pacing delay between submissions per account, milliseconds.
    #[serde(default = "default_queue_interval")]
    pub queue_interval: u64,
    /// Inclusion poll period, milliseconds.
    #[serde(default = "default_transaction_poll_interval")]
    pub transaction_poll_interval: u64,
    /// Whether the HTTP adapter may follow redirects.
    #[serde(default)]
    pub follow_http_redirects: bool,
    /// How long a followed redirect stays pinned, milliseconds.
    #[serde(default = "default_http_redirect_ttl_ms")]
    pub http_redirect_ttl_ms: u64,
    /// Cap on sequence-fault retries per submission; unbounded when absent.
    #[serde(default)]
    pub max_sequence_retries: Option<u32>,
    /// bech32 human-readable prefix for addresses.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Base denomination.
    #[serde(default = "default_denom")]
    pub denom: String,
    /// Port the Prometheus scrape endpoint listens on; disabled when absent.
    #[serde(default)]
    pub metrics_port: Option<u16>,
    /// Tracing configuration.
    #[serde(default)]
    pub tracing: TracingConfig,
}

impl AsRef<Settings> for Settings {
    fn as_ref(&self) -> &Settings {
        self
    }
}

impl Settings {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.account_amounts < 1 {
            bail!("accountAmounts must be at least 1");
        }
        self.gas_price
            .parse::<u128>()
            .wrap_err("gasPrice must be an integer string in the base denomination")?;
        if self.gas_adjustment_factor <= 0.0 {
            bail!("gasAdjustmentFactor must be positive");
        }
        Ok(())
    }

    /// The chain connection configuration these settings describe.
    pub fn connection_conf(&self) -> Result<ConnectionConf> {
        ConnectionConf::new(
            self.rpc.clone(),
            self.chain_id.clone(),
            self.prefix.clone(),
            self.denom.clone(),
            self.follow_http_redirects,
            Duration::from_millis(self.http_redirect_ttl_ms),
        )
        .wrap_err("invalid connection configuration")
    }

    /// The per-submission gas defaults these settings describe.
    pub fn gas_config(&self) -> Result<GasConfig> {
        let policy = match self.gas {
            GasSetting::Auto => GasPolicy::Auto {
                adjustment: self.gas_adjustment_factor,
            },
            GasSetting::Zero => GasPolicy::Zero,
            GasSetting::Fixed(gas) => GasPolicy::Fixed(gas),
        };
        Ok(GasConfig {
            policy,
            gas_price: self
                .gas_price
                .parse()
                .wrap_err("gasPrice must be an integer string")?,
            denom: self.denom.clone(),
        })
    }

    /// Pacing delay between submissions per account.
    pub fn queue_interval(&self) -> Duration {
        Duration::from_millis(self.queue_interval)
    }

    /// Inclusion poll period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.transaction_poll_interval)
    }
}
