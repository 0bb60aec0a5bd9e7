use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::{prelude::*, types::ParseMode};

use super::{ui, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::entity::State;

pub struct StartCommand;

impl CommandHandler for StartCommand {
    fn command_name() -> &'static str {
        "start"
    }

    fn description() -> &'static str {
        "start the bot and show the main menu"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let chat_id = msg.chat.id;

        info!("Start command received from Telegram ID: {}", telegram_id);

        if let Some(dialogue) = dialogue {
            dialogue.update(State::Start).await?;
        }

        let session = services.sessions().session(chat_id.0);
        let status = match session.account() {
            Some(account) => format!("Connected wallet: <code>{}</code>", account),
            None => "No wallet connected yet. Press <b>Connect</b> to start.".to_string(),
        };

        bot.send_message(
            chat_id,
            format!(
                "<b>Welcome to the Token Swap Bot!</b>\n\n\
                Swap ERC-20 tokens at the rates set on the swap contract.\n\n{}",
                status
            ),
        )
        .parse_mode(ParseMode::Html)
        .reply_markup(ui::create_main_menu_keyboard())
        .await?;

        Ok(())
    }
}
