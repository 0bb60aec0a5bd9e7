use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{swap_presenter, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::entity::TokenSide;
use crate::presenter::swap_presenter::SwapPresenter;
use crate::utils;

pub struct TokensCommand;

impl CommandHandler for TokensCommand {
    fn command_name() -> &'static str {
        "tokens"
    }

    fn description() -> &'static str {
        "list the configured tokens"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        swap_presenter(bot, msg.chat.id, &services)
            .show_tokens()
            .await
    }
}

pub struct FromCommand;

impl CommandHandler for FromCommand {
    fn command_name() -> &'static str {
        "from"
    }

    fn description() -> &'static str {
        "choose the token to swap from"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        select(bot, msg, telegram_id, TokenSide::From, services).await
    }
}

pub struct ToCommand;

impl CommandHandler for ToCommand {
    fn command_name() -> &'static str {
        "to"
    }

    fn description() -> &'static str {
        "choose the token to receive"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        select(bot, msg, telegram_id, TokenSide::To, services).await
    }
}

// "/from GT" selects directly, a bare "/from" shows the token keyboard
async fn select(
    bot: Bot,
    msg: Message,
    telegram_id: i64,
    side: TokenSide,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    let chat_id = msg.chat.id;
    let args = utils::command_args(msg.text().unwrap_or(""));
    let presenter = swap_presenter(bot, chat_id, &services);

    match args.first() {
        Some(symbol) => {
            info!(
                "Token selection {} {} from Telegram ID: {}",
                side.as_str(),
                symbol,
                telegram_id
            );
            presenter.select_token(chat_id.0, side, symbol).await
        }
        None => presenter.choose_token(side).await,
    }
}
