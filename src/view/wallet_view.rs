use crate::entity::SwapError;
use alloy::primitives::Address;
use anyhow::Result;
use async_trait::async_trait;
use teloxide::{prelude::*, types::ParseMode, Bot};

#[async_trait]
pub trait WalletView: Send + Sync {
    async fn display_connecting(&self) -> Result<()>;
    async fn display_connected(&self, account: Address) -> Result<()>;
    async fn display_error(&self, error: &SwapError) -> Result<()>;
}

pub struct TelegramWalletView {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramWalletView {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl WalletView for TelegramWalletView {
    async fn display_connecting(&self) -> Result<()> {
        self.bot
            .send_message(self.chat_id, "Connecting wallet...")
            .await?;

        Ok(())
    }

    async fn display_connected(&self, account: Address) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "✅ Wallet connected\n\nAccount: <code>{}</code>\n\n\
                    Pick tokens with /from and /to, then set an /amount.",
                    account
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;

        Ok(())
    }

    async fn display_error(&self, error: &SwapError) -> Result<()> {
        let text = match error {
            SwapError::UserRejected => "❌ Connection was rejected by the wallet.".to_string(),
            SwapError::WalletUnavailable => {
                "❌ No wallet provider is reachable. Check the RPC endpoint.".to_string()
            }
            other => format!("❌ Wallet connection failed: {}", other),
        };
        self.bot.send_message(self.chat_id, text).await?;

        Ok(())
    }
}
