use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{swap_presenter, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::entity::State;
use crate::presenter::swap_presenter::SwapPresenter;
use crate::utils;

pub struct AmountCommand;

impl CommandHandler for AmountCommand {
    fn command_name() -> &'static str {
        "amount"
    }

    fn description() -> &'static str {
        "set the amount to swap"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _telegram_id: i64,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let chat_id = msg.chat.id;
        let args = utils::command_args(msg.text().unwrap_or(""));
        let presenter = swap_presenter(bot, chat_id, &services);

        match args.first() {
            Some(amount) => {
                presenter.set_amount(chat_id.0, amount).await?;
            }
            None => {
                if let Some(dialogue) = dialogue {
                    dialogue.update(State::AwaitingAmount).await?;
                }
                presenter.prompt_amount().await?;
            }
        }

        Ok(())
    }
}

pub async fn receive_amount(
    bot: Bot,
    msg: Message,
    dialogue: MyDialogue,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    let chat_id = msg.chat.id;
    let presenter = swap_presenter(bot, chat_id, &services);

    match msg.text() {
        Some(text) => {
            // Stay in the dialogue until a valid amount arrives
            if presenter.set_amount(chat_id.0, text).await? {
                dialogue.update(State::Start).await?;
            }
        }
        None => presenter.prompt_amount().await?,
    }

    Ok(())
}
