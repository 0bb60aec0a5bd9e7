use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{spawn_flow, swap_presenter, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::presenter::swap_presenter::SwapPresenter;
use crate::utils;

const USAGE: &str = "Usage: /approve <token> <amount>, e.g. /approve GT 10";

pub struct ApproveCommand;

impl CommandHandler for ApproveCommand {
    fn command_name() -> &'static str {
        "approve"
    }

    fn description() -> &'static str {
        "approve the swap contract to spend a token"
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
            "Approve {} {} requested by Telegram ID: {}",
            amount, symbol, telegram_id
        );
        spawn_flow("approve", chat_id, async move {
            presenter.approve(chat_id.0, &symbol, &amount).await
        });

        Ok(())
    }
}
