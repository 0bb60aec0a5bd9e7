use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use crate::commands::{help, swap, swap_presenter, wallet, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::entity::{State, TokenSide};
use crate::presenter::swap_presenter::SwapPresenter;
use crate::view::approval::parse_approval_callback;

// Main callback handler function
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dialogue: MyDialogue,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    // Extract the callback data
    let callback_data = match q.data.clone() {
        Some(data) => data,
        None => return Ok(()),
    };

    // Get the chat ID
    let chat_id = match q.message {
        Some(ref msg) => msg.chat().id,
        None => return Ok(()),
    };

    // Get user's Telegram ID
    let telegram_id = q.from.id.0 as i64;

    info!(
        "Received callback: {} from user {}",
        callback_data, telegram_id
    );

    // Approval answers are delivered to the flow waiting on them
    if let Some((id, approved)) = parse_approval_callback(&callback_data) {
        let delivered = services.approvals().resolve(id, approved);
        let notice = match (delivered, approved) {
            (false, _) => "This approval request has expired.",
            (true, true) => "Approval confirmed",
            (true, false) => "Approval declined",
        };
        if let Err(err) = bot.answer_callback_query(q.id.clone()).text(notice).await {
            info!("Failed to answer callback query: {}", err);
        }
        return Ok(());
    }

    // Acknowledge the callback query to stop loading animation
    if let Err(err) = bot.answer_callback_query(q.id.clone()).await {
        info!("Failed to answer callback query: {}", err);
    }

    let presenter = swap_presenter(bot.clone(), chat_id, &services);

    if let Some((side, symbol)) = callback_data.split_once(':') {
        // Token picked from the selection keyboard
        if let Some(side) = TokenSide::parse(side) {
            presenter.select_token(chat_id.0, side, symbol).await?;
        }
        return Ok(());
    }

    match callback_data.as_str() {
        "connect" => wallet::connect(bot, chat_id, telegram_id, services),
        "tokens" => presenter.show_tokens().await?,
        "from" => presenter.choose_token(TokenSide::From).await?,
        "to" => presenter.choose_token(TokenSide::To).await?,
        "amount" => {
            dialogue.update(State::AwaitingAmount).await?;
            presenter.prompt_amount().await?;
        }
        "rate" => presenter.show_rate(chat_id.0).await?,
        "swap" => swap::start_swap(bot, chat_id, telegram_id, services),
        "owner" => presenter.show_owner(chat_id.0).await?,
        "help" => {
            if let Some(message) = q.regular_message() {
                help::HelpCommand::execute(
                    bot,
                    message.clone(),
                    telegram_id,
                    Some(dialogue),
                    services,
                )
                .await?;
            }
        }
        other => {
            bot.send_message(chat_id, format!("Unknown action: {}", other))
                .await?;
        }
    }

    Ok(())
}
