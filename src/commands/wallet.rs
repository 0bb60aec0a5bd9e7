use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::{spawn_flow, CommandHandler, MyDialogue};
use crate::di::ServiceContainer;
use crate::presenter::wallet_presenter::{WalletPresenter, WalletPresenterImpl};
use crate::view::wallet_view::TelegramWalletView;

pub struct ConnectCommand;

impl CommandHandler for ConnectCommand {
    fn command_name() -> &'static str {
        "connect"
    }

    fn description() -> &'static str {
        "connect your wallet"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        telegram_id: i64,
        _dialogue: Option<MyDialogue>,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        connect(bot, msg.chat.id, telegram_id, services);
        Ok(())
    }
}

pub fn connect(bot: Bot, chat_id: ChatId, telegram_id: i64, services: Arc<ServiceContainer>) {
    info!("Connect requested by Telegram ID: {}", telegram_id);

    let interactor = services.wallet_interactor();
    let view = Arc::new(TelegramWalletView::new(bot, chat_id));
    let presenter = WalletPresenterImpl::new(interactor, view);

    spawn_flow("connect", chat_id, async move {
        presenter.connect(chat_id.0).await
    });
}
