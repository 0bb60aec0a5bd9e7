use anyhow::Result;
use log::error;
use std::future::Future;
use std::sync::Arc;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::*};

use crate::di::ServiceContainer;
use crate::entity::State;
use crate::interactor::swap_interactor::SwapInteractor;
use crate::presenter::swap_presenter::SwapPresenterImpl;
use crate::view::swap_view::TelegramSwapView;
use teloxide::dispatching::dialogue::Dialogue;

pub mod amount;
pub mod approve;
pub mod callback;
pub mod help;
pub mod rate;
pub mod start;
pub mod swap;
pub mod tokens;
pub mod ui;
pub mod wallet;
pub mod withdraw;

pub type MyDialogue = Dialogue<State, InMemStorage<State>>;

/// Trait that defines a command handler
pub trait CommandHandler {
    /// The command name in lowercase
    fn command_name() -> &'static str;

    /// The command description for help
    fn description() -> &'static str;

    /// Execute the command
    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()>;
}

/// Register all command handlers in the command system
pub fn register_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            start::StartCommand::command_name(),
            start::StartCommand::description(),
        ),
        (
            wallet::ConnectCommand::command_name(),
            wallet::ConnectCommand::description(),
        ),
        (
            tokens::TokensCommand::command_name(),
            tokens::TokensCommand::description(),
        ),
        (
            tokens::FromCommand::command_name(),
            tokens::FromCommand::description(),
        ),
        (
            tokens::ToCommand::command_name(),
            tokens::ToCommand::description(),
        ),
        (
            amount::AmountCommand::command_name(),
            amount::AmountCommand::description(),
        ),
        (
            rate::RateCommand::command_name(),
            rate::RateCommand::description(),
        ),
        (
            rate::SetRateCommand::command_name(),
            rate::SetRateCommand::description(),
        ),
        (
            approve::ApproveCommand::command_name(),
            approve::ApproveCommand::description(),
        ),
        (
            swap::SwapCommand::command_name(),
            swap::SwapCommand::description(),
        ),
        (
            withdraw::WithdrawCommand::command_name(),
            withdraw::WithdrawCommand::description(),
        ),
        (
            withdraw::OwnerCommand::command_name(),
            withdraw::OwnerCommand::description(),
        ),
        (
            help::HelpCommand::command_name(),
            help::HelpCommand::description(),
        ),
    ]
}

/// Bot Commands enum for teloxide command filter
#[derive(teloxide::utils::command::BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum BotCommands {
    #[command(description = "start the bot and show the main menu")]
    Start,
    #[command(description = "connect your wallet")]
    Connect,
    #[command(description = "list the configured tokens")]
    Tokens,
    #[command(description = "choose the token to swap from, e.g. /from GT")]
    From(String),
    #[command(description = "choose the token to receive, e.g. /to ET")]
    To(String),
    #[command(description = "set the amount to swap, e.g. /amount 10")]
    Amount(String),
    #[command(description = "show the exchange rate of the selected pair")]
    Rate,
    #[command(description = "set the exchange rate of the selected pair (owner only)")]
    SetRate(String),
    #[command(description = "approve the swap contract to spend a token, e.g. /approve GT 10")]
    Approve(String),
    #[command(description = "swap the selected tokens")]
    Swap,
    #[command(description = "withdraw tokens held by the swap contract (owner only)")]
    Withdraw(String),
    #[command(description = "show the swap contract owner")]
    Owner,
    #[command(description = "display this help message")]
    Help,
}

/// Route a parsed command to its handler.
pub async fn dispatch_command(
    bot: Bot,
    msg: Message,
    cmd: BotCommands,
    dialogue: MyDialogue,
    services: Arc<ServiceContainer>,
) -> Result<()> {
    let telegram_id = msg.from.as_ref().map_or(0, |user| user.id.0 as i64);
    let dialogue = Some(dialogue);

    match cmd {
        BotCommands::Start => {
            start::StartCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::Connect => {
            wallet::ConnectCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::Tokens => {
            tokens::TokensCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::From(_) => {
            tokens::FromCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::To(_) => {
            tokens::ToCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::Amount(_) => {
            amount::AmountCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::Rate => {
            rate::RateCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::SetRate(_) => {
            rate::SetRateCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::Approve(_) => {
            approve::ApproveCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::Swap => {
            swap::SwapCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::Withdraw(_) => {
            withdraw::WithdrawCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::Owner => {
            withdraw::OwnerCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
        BotCommands::Help => {
            help::HelpCommand::execute(bot, msg, telegram_id, dialogue, services).await
        }
    }
}

pub(crate) type TelegramSwapPresenter = SwapPresenterImpl<dyn SwapInteractor, TelegramSwapView>;

pub(crate) fn swap_presenter(
    bot: Bot,
    chat_id: ChatId,
    services: &ServiceContainer,
) -> TelegramSwapPresenter {
    let view = Arc::new(TelegramSwapView::new(
        bot,
        chat_id,
        services.approvals(),
        services.approval_timeout(),
    ));
    SwapPresenterImpl::new(services.swap_interactor(), view, services.sessions())
}

/// Run a flow that waits on the chain or on an approval button outside the
/// update handler. Updates of one chat are handled in order, so awaiting here
/// would hold back the callback that answers the approval prompt.
pub(crate) fn spawn_flow<F>(name: &'static str, chat_id: ChatId, flow: F)
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = flow.await {
            error!("{} flow for chat {} failed: {}", name, chat_id, e);
        }
    });
}
