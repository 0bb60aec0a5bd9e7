use alloy::primitives::Address;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::entity::{Token, TokenRegistry, DEFAULT_DECIMALS};
use crate::evm::client::ConfirmationPolicy;
use crate::interactor::swap_interactor::{CheckOrder, GasPolicy, SwapPolicy};

/// Application settings, read from an optional `swap.toml` and overridden by
/// `SWAP__`-prefixed environment variables (`SWAP__RPC_URL`,
/// `SWAP__WALLET__MODE`, `SWAP__TOKENS__GT__ADDRESS`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub rpc_url: String,
    pub swap_contract: Address,
    pub wallet: WalletSettings,
    #[serde(default)]
    pub tokens: BTreeMap<String, TokenSettings>,
    #[serde(default)]
    pub swap: SwapSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WalletSettings {
    /// Accounts are managed and signed for by the node.
    Node,
    /// A local key signs in-process.
    PrivateKey { private_key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenSettings {
    pub address: Address,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SwapSettings {
    pub check_order: CheckOrder,
    /// `None` leaves the gas limit to the provider.
    pub gas_margin_percent: Option<u64>,
    pub poll_interval_ms: u64,
    pub confirmation_timeout_secs: u64,
    pub approval_timeout_secs: u64,
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self {
            check_order: CheckOrder::default(),
            gas_margin_percent: Some(20),
            poll_interval_ms: 2_000,
            confirmation_timeout_secs: 180,
            approval_timeout_secs: 120,
        }
    }
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

impl Settings {
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("swap").required(false))
            .add_source(
                Environment::with_prefix("SWAP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to read configuration")?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config
            .try_deserialize()
            .context("Invalid configuration")?;
        if settings.tokens.is_empty() {
            anyhow::bail!("No tokens configured; add a [tokens] table or SWAP__TOKENS__* variables");
        }
        Ok(settings)
    }

    /// Token symbols are upper-cased; users may type them in any case.
    pub fn token_registry(&self) -> TokenRegistry {
        TokenRegistry::new(self.tokens.iter().map(|(symbol, token)| Token {
            symbol: symbol.to_uppercase(),
            address: token.address,
            default_decimals: token.decimals,
        }))
    }

    pub fn swap_policy(&self) -> SwapPolicy {
        SwapPolicy {
            check_order: self.swap.check_order,
            gas: match self.swap.gas_margin_percent {
                Some(margin_percent) => GasPolicy::EstimateWithMargin { margin_percent },
                None => GasPolicy::ProviderDefault,
            },
            confirmation: ConfirmationPolicy {
                poll_interval: Duration::from_millis(self.swap.poll_interval_ms),
                timeout: Duration::from_secs(self.swap.confirmation_timeout_secs),
            },
        }
    }

    pub fn approval_timeout(&self) -> Duration {
        Duration::from_secs(self.swap.approval_timeout_secs)
    }
}
