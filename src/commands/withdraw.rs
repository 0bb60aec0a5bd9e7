use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{spawn_flow, swap_presenter, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::presenter::swap_presenter::SwapPresenter;
use crate::utils;

const USAGE: &str = "Usage: /withdraw <token> <amount>, e.g. /withdraw ET 100";

pub struct WithdrawCommand;

impl CommandHandler for WithdrawCommand {
    fn command_name() -> &'static str {
        "withdraw"
    }

    fn description() -> &'static str {
        "withdraw tokens held by the swap contract (owner only)"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let chat_id = msg.chat.id;
        let args = utils::command_args(msg.text().unwrap_or(""));
        let presenter = swap_presenter(bot, chat_id, &services);

        let (symbol, amount) = match args.as_slice() {
            [symbol, amount] => (symbol.to_string(), amount.to_string()),
            _ => return presenter.show_usage(USAGE).await,
        };

        info!(
            "Withdraw {} {} requested by Telegram ID: {}",
            amount, symbol, telegram_id
        );
        spawn_flow("withdraw", chat_id, async move {
            presenter.withdraw(chat_id.0, &symbol, &amount).await
        });

        Ok(())
    }
}

pub struct OwnerCommand;

impl CommandHandler for OwnerCommand {
    fn command_name() -> &'static str {
        "owner"
    }

    fn description() -> &'static str {
        "show the swap contract owner"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let chat_id = msg.chat.id;
        swap_presenter(bot, chat_id, &services)
            .show_owner(chat_id.0)
            .await
    }
}
