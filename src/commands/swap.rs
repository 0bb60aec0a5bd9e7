use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{spawn_flow, swap_presenter, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::presenter::swap_presenter::SwapPresenter;

pub struct SwapCommand;

impl CommandHandler for SwapCommand {
    fn command_name() -> &'static str {
        "swap"
    }

    fn description() -> &'static str {
        "swap the selected tokens at the contract's rate"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        start_swap(bot, msg.chat.id, telegram_id, services);
        Ok(())
    }
}

pub fn start_swap(bot: Bot, chat_id: ChatId, telegram_id: i64, services: Arc<ServiceContainer>) {
    info!("Swap requested by Telegram ID: {}", telegram_id);

    let presenter = swap_presenter(bot, chat_id, &services);
    spawn_flow("swap", chat_id, async move { presenter.swap(chat_id.0).await });
}
