use crate::entity::{
    ExchangeRate, SwapError, SwapIntent, SwapReceipt, Token, TokenBalance, TokenRegistry,
    TokenSide,
};
use crate::interactor::swap_interactor::ApprovalPrompt;
use crate::utils;
use crate::view::approval::{approval_callback, ApprovalRegistry};
use alloy::primitives::{Address, TxHash};
use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
    Bot,
};

#[async_trait]
pub trait SwapView: ApprovalPrompt + Send + Sync {
    async fn display_tokens(&self, tokens: &TokenRegistry) -> Result<()>;
    async fn display_token_choice(&self, side: TokenSide, tokens: &TokenRegistry) -> Result<()>;
    async fn display_token_selected(
        &self,
        side: TokenSide,
        symbol: &str,
        balance: Option<&TokenBalance>,
    ) -> Result<()>;
    async fn display_amount_prompt(&self) -> Result<()>;
    async fn display_amount_set(&self, amount: &str, symbol: Option<&str>) -> Result<()>;
    async fn display_rate(&self, rate: &ExchangeRate) -> Result<()>;
    async fn display_rate_prompt(&self, from: &str, to: &str) -> Result<()>;
    async fn display_rate_updated(&self, rate: &ExchangeRate) -> Result<()>;
    async fn display_approved(&self, symbol: &str, amount: &str, hash: TxHash) -> Result<()>;
    async fn display_swap_started(&self, intent: &SwapIntent) -> Result<()>;
    async fn display_swap_receipt(&self, receipt: &SwapReceipt) -> Result<()>;
    async fn display_withdrawn(&self, symbol: &str, amount: &str, hash: TxHash) -> Result<()>;
    async fn display_owner(&self, owner: Address, account: Option<Address>) -> Result<()>;
    async fn display_usage(&self, usage: &str) -> Result<()>;
    async fn display_error(&self, error: &SwapError) -> Result<()>;
}

pub struct TelegramSwapView {
    bot: Bot,
    chat_id: ChatId,
    approvals: Arc<ApprovalRegistry>,
    approval_timeout: Duration,
}

impl TelegramSwapView {
    pub fn new(
        bot: Bot,
        chat_id: ChatId,
        approvals: Arc<ApprovalRegistry>,
        approval_timeout: Duration,
    ) -> Self {
        Self {
            bot,
            chat_id,
            approvals,
            approval_timeout,
        }
    }

    async fn send_html(&self, text: String) -> Result<()> {
        self.bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}

pub fn token_keyboard(side: TokenSide, tokens: &TokenRegistry) -> InlineKeyboardMarkup {
    let buttons: Vec<InlineKeyboardButton> = tokens
        .symbols()
        .map(|symbol| {
            InlineKeyboardButton::callback(symbol, format!("{}:{}", side.as_str(), symbol))
        })
        .collect();

    InlineKeyboardMarkup::new(buttons.chunks(3).map(|row| row.to_vec()))
}

/// User-facing text for a failed action.
pub fn error_message(error: &SwapError) -> String {
    match error {
        SwapError::WalletUnavailable => {
            "❌ No wallet connected. Use /connect first.".to_string()
        }
        SwapError::RateNotSet { from, to } => format!(
            "❌ Exchange rate not set for {} → {}. The contract owner can set it with /setrate.",
            from, to
        ),
        SwapError::InsufficientAllowance { token } => format!(
            "❌ Swap cancelled: the swap contract is not allowed to spend enough {}.",
            token
        ),
        SwapError::InsufficientBalance { token, .. } => {
            format!("❌ Insufficient {} balance for this swap.", token)
        }
        SwapError::TransactionReverted(reason) => format!("❌ Transaction failed: {}", reason),
        SwapError::IncompleteIntent => {
            "❌ Select both tokens with /from and /to and enter an /amount first.".to_string()
        }
        SwapError::ConfirmationTimeout(hash) => format!(
            "⏳ Transaction {} is still pending. It may confirm later.",
            hash
        ),
        other => format!("❌ {}", other),
    }
}

#[async_trait]
impl ApprovalPrompt for TelegramSwapView {
    async fn confirm_approval(&self, token: &Token, amount: &str) -> bool {
        let (id, answer) = self.approvals.register();
        let keyboard = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("✅ Approve", approval_callback(id, true)),
            InlineKeyboardButton::callback("✖️ Cancel", approval_callback(id, false)),
        ]]);

        let sent = self
            .bot
            .send_message(
                self.chat_id,
                format!(
                    "The swap contract needs permission to spend {} {}.\nApprove?",
                    amount, token.symbol
                ),
            )
            .reply_markup(keyboard)
            .await;
        if let Err(e) = sent {
            warn!("Failed to send approval prompt: {}", e);
            self.approvals.discard(id);
            return false;
        }

        match tokio::time::timeout(self.approval_timeout, answer).await {
            Ok(Ok(approved)) => approved,
            _ => {
                info!("Approval prompt {} expired", id);
                self.approvals.discard(id);
                false
            }
        }
    }
}

#[async_trait]
impl SwapView for TelegramSwapView {
    async fn display_tokens(&self, tokens: &TokenRegistry) -> Result<()> {
        let lines: Vec<String> = tokens
            .iter()
            .map(|token| format!("<b>{}</b> <code>{}</code>", token.symbol, token.address))
            .collect();
        self.send_html(format!("Available tokens:\n\n{}", lines.join("\n")))
            .await
    }

    async fn display_token_choice(&self, side: TokenSide, tokens: &TokenRegistry) -> Result<()> {
        let prompt = match side {
            TokenSide::From => "Which token do you want to swap from?",
            TokenSide::To => "Which token do you want to receive?",
        };
        self.bot
            .send_message(self.chat_id, prompt)
            .reply_markup(token_keyboard(side, tokens))
            .await?;

        Ok(())
    }

    async fn display_token_selected(
        &self,
        side: TokenSide,
        symbol: &str,
        balance: Option<&TokenBalance>,
    ) -> Result<()> {
        let mut text = format!("Swap {}: <b>{}</b>", side.as_str(), symbol);
        if let Some(balance) = balance {
            text.push_str(&format!("\nYour balance: {} {}", balance.formatted, symbol));
        }
        self.send_html(text).await
    }

    async fn display_amount_prompt(&self) -> Result<()> {
        self.bot
            .send_message(self.chat_id, "Enter the amount to swap:")
            .await?;

        Ok(())
    }

    async fn display_amount_set(&self, amount: &str, symbol: Option<&str>) -> Result<()> {
        let text = match symbol {
            Some(symbol) => format!("Amount set: {} {}", amount, symbol),
            None => format!("Amount set: {}", amount),
        };
        self.bot.send_message(self.chat_id, text).await?;

        Ok(())
    }

    async fn display_rate(&self, rate: &ExchangeRate) -> Result<()> {
        let text = if rate.is_set() {
            format!("Exchange rate: {}", rate)
        } else {
            format!("Exchange rate for {} → {} is not set.", rate.from, rate.to)
        };
        self.bot.send_message(self.chat_id, text).await?;

        Ok(())
    }

    async fn display_rate_prompt(&self, from: &str, to: &str) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                format!("Enter the new rate (how many {} for 1 {}):", to, from),
            )
            .await?;

        Ok(())
    }

    async fn display_rate_updated(&self, rate: &ExchangeRate) -> Result<()> {
        self.bot
            .send_message(self.chat_id, format!("✅ Exchange rate updated: {}", rate))
            .await?;

        Ok(())
    }

    async fn display_approved(&self, symbol: &str, amount: &str, hash: TxHash) -> Result<()> {
        self.send_html(format!(
            "✅ Approved {} {} for the swap contract\nTx: <code>{}</code>",
            amount, symbol, hash
        ))
        .await
    }

    async fn display_swap_started(&self, intent: &SwapIntent) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "Swapping {} {} → {}...",
                    intent.amount, intent.from_token, intent.to_token
                ),
            )
            .await?;

        Ok(())
    }

    async fn display_swap_receipt(&self, receipt: &SwapReceipt) -> Result<()> {
        let mut text = format!(
            "✅ Swap successful!\n\nSent: {} {}\n",
            receipt.amount_in_display, receipt.source_token
        );
        if let Some(out) = &receipt.amount_out_display {
            text.push_str(&format!("Received: {} {}\n", out, receipt.target_token));
        }
        text.push_str(&format!("Rate: {}\n", receipt.rate));
        text.push_str(&format!("Tx: <code>{}</code>", receipt.tx_hash));
        if let Some(block) = receipt.block_number {
            text.push_str(&format!("\nBlock: {}", block));
        }
        text.push_str(&format!(
            "\n{}",
            receipt.confirmed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        self.send_html(text).await
    }

    async fn display_withdrawn(&self, symbol: &str, amount: &str, hash: TxHash) -> Result<()> {
        self.send_html(format!(
            "✅ Withdrew {} {} from the swap contract\nTx: <code>{}</code>",
            amount, symbol, hash
        ))
        .await
    }

    async fn display_owner(&self, owner: Address, account: Option<Address>) -> Result<()> {
        let mut text = format!(
            "Swap contract owner: <code>{}</code>",
            utils::shorten_address(&owner)
        );
        if account == Some(owner) {
            text.push_str("\nThe connected wallet is the owner.");
        }
        self.send_html(text).await
    }

    async fn display_usage(&self, usage: &str) -> Result<()> {
        self.bot.send_message(self.chat_id, usage).await?;

        Ok(())
    }

    async fn display_error(&self, error: &SwapError) -> Result<()> {
        self.bot
            .send_message(self.chat_id, error_message(error))
            .await?;

        Ok(())
    }
}
