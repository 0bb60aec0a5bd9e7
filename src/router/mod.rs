use async_trait::async_trait;
use std::sync::Arc;
use teloxide::{
    dispatching::dialogue::InMemStorage, dispatching::UpdateHandler, prelude::*,
};

use crate::commands::{
    self, amount::receive_amount, callback::handle_callback, rate::receive_new_rate,
    BotCommands, MyDialogue,
};
use crate::di::ServiceContainer;
use crate::entity::State;

// Base router trait
#[async_trait]
pub trait Router: Send + Sync {
    fn setup_handlers(&self) -> UpdateHandler<anyhow::Error>;
}

// Command router implementation
pub struct TelegramRouter {
    services: Arc<ServiceContainer>,
}

impl TelegramRouter {
    pub fn new(services: Arc<ServiceContainer>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Router for TelegramRouter {
    fn setup_handlers(&self) -> UpdateHandler<anyhow::Error> {
        use dptree::case;
        use teloxide::dispatching::UpdateFilterExt;

        let services_for_commands = self.services.clone();
        let services_for_amount = self.services.clone();
        let services_for_rate = self.services.clone();
        let services_for_callbacks = self.services.clone();

        // Use BotCommands enum with teloxide's command filter
        let command_handler = teloxide::filter_command::<BotCommands, _>().endpoint(
            move |bot: Bot, msg: Message, cmd: BotCommands, dialogue: MyDialogue| {
                let services = services_for_commands.clone();
                async move { commands::dispatch_command(bot, msg, cmd, dialogue, services).await }
            },
        );

        let message_handler = Update::filter_message().branch(command_handler).branch(
            dptree::entry()
                .branch(case![State::AwaitingAmount].endpoint(
                    move |bot: Bot, msg: Message, dialogue: MyDialogue| {
                        let services = services_for_amount.clone();
                        async move { receive_amount(bot, msg, dialogue, services).await }
                    },
                ))
                .branch(case![State::AwaitingNewRate].endpoint(
                    move |bot: Bot, msg: Message, dialogue: MyDialogue| {
                        let services = services_for_rate.clone();
                        async move { receive_new_rate(bot, msg, dialogue, services).await }
                    },
                )),
        );

        // Add callback query handler for our buttons
        let callback_handler = Update::filter_callback_query().endpoint(
            move |bot: Bot, q: CallbackQuery, dialogue: MyDialogue| {
                let services = services_for_callbacks.clone();
                async move { handle_callback(bot, q, dialogue, services).await }
            },
        );

        teloxide::dispatching::dialogue::enter::<Update, InMemStorage<State>, State, _>()
            .branch(message_handler)
            .branch(callback_handler)
    }
}
