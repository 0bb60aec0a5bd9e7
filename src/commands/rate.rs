use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{spawn_flow, swap_presenter, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::entity::State;
use crate::presenter::swap_presenter::SwapPresenter;
use crate::utils;

pub struct RateCommand;

impl CommandHandler for RateCommand {
    fn command_name() -> &'static str {
        "rate"
    }

    fn description() -> &'static str {
        "show the exchange rate of the selected pair"
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
            .show_rate(chat_id.0)
            .await
    }
}

pub struct SetRateCommand;

impl CommandHandler for SetRateCommand {
    fn command_name() -> &'static str {
        "setrate"
    }

    fn description() -> &'static str {
        "set the exchange rate of the selected pair (owner only)"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let chat_id = msg.chat.id;
        let args = utils::command_args(msg.text().unwrap_or(""));

        match args.first() {
            Some(rate) => {
                info!("Set rate {} requested by Telegram ID: {}", rate, telegram_id);
                submit_rate(bot, chat_id, rate.to_string(), services);
            }
            None => {
                let presenter = swap_presenter(bot, chat_id, &services);
                if presenter.prompt_rate(chat_id.0).await? {
                    if let Some(dialogue) = dialogue {
                        dialogue.update(State::AwaitingNewRate).await?;
                    }
                }
            }
        }

        Ok(())
    }
}

pub async fn receive_new_rate(
    bot: Bot,
    msg: Message,
    dialogue: MyDialogue,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    dialogue.update(State::Start).await?;

    if let Some(text) = msg.text() {
        submit_rate(bot, msg.chat.id, text.trim().to_string(), services);
    }

    Ok(())
}

fn submit_rate(bot: Bot, chat_id: ChatId, rate: String, services: Arc<ServiceContainer>) {
    let presenter = swap_presenter(bot, chat_id, &services);
    spawn_flow("set rate", chat_id, async move {
        presenter.set_rate(chat_id.0, &rate).await
    });
}
