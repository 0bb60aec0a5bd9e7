pub mod commands;
pub mod di;
pub mod entity;
pub mod evm;
pub mod interactor;
pub mod presenter;
pub mod router;
pub mod settings;
pub mod utils;
pub mod view;

#[cfg(test)]
mod testutils;

use anyhow::{Context, Result};
use reqwest::Url;
use std::sync::Arc;
use teloxide::{dispatching::dialogue::InMemStorage, Bot};

// Re-export commonly used items
pub use commands::BotCommands;
pub use di::ServiceContainer;
pub use entity::*;
pub use evm::{NodeWalletProvider, PrivateKeyWalletProvider, WalletProvider};
pub use router::{Router, TelegramRouter};
pub use settings::{Settings, WalletSettings};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the wallet provider selected by the `wallet.mode` setting.
pub fn create_wallet_provider(settings: &Settings) -> Result<Arc<dyn WalletProvider>> {
    let rpc_url: Url = settings
        .rpc_url
        .parse()
        .with_context(|| format!("Invalid RPC URL: {}", settings.rpc_url))?;

    let provider: Arc<dyn WalletProvider> = match &settings.wallet {
        WalletSettings::Node => Arc::new(NodeWalletProvider::new(rpc_url, settings.swap_contract)),
        WalletSettings::PrivateKey { private_key } => Arc::new(PrivateKeyWalletProvider::new(
            rpc_url,
            settings.swap_contract,
            private_key.clone(),
        )),
    };

    Ok(provider)
}

/// Wire settings into the router, the shared services and the dialogue storage.
pub fn create_application(
    bot: Bot,
    settings: &Settings,
) -> Result<(
    TelegramRouter,
    Bot,
    Arc<ServiceContainer>,
    Arc<InMemStorage<State>>,
)> {
    let wallet_provider = create_wallet_provider(settings)?;
    let services = Arc::new(ServiceContainer::new(
        settings.token_registry(),
        settings.swap_policy(),
        wallet_provider,
        settings.approval_timeout(),
    ));

    let router = TelegramRouter::new(services.clone());
    let storage = InMemStorage::<State>::new();

    Ok((router, bot, services, storage))
}
