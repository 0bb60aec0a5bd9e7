use super::{BotCommands, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands as _;

pub struct HelpCommand;

impl CommandHandler for HelpCommand {
    fn command_name() -> &'static str {
        "help"
    }

    fn description() -> &'static str {
        "display this help message"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        _services: Arc<ServiceContainer>,
    ) -> Result<()> {
        bot.send_message(
            msg.chat.id,
            format!(
                "{}\n\nA swap: /connect, pick /from and /to, set an /amount, check the /rate, then /swap. \
                If the swap contract needs permission to spend your tokens you will be asked to approve first.",
                BotCommands::descriptions()
            ),
        )
        .await?;

        Ok(())
    }
}
