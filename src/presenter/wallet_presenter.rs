use crate::interactor::wallet_interactor::WalletInteractor;
use crate::view::wallet_view::WalletView;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait WalletPresenter: Send + Sync {
    async fn connect(&self, chat_id: i64) -> Result<()>;
}

pub struct WalletPresenterImpl<I: ?Sized, V> {
    interactor: Arc<I>,
    view: Arc<V>,
}

impl<I, V> WalletPresenterImpl<I, V>
where
    I: WalletInteractor + ?Sized,
    V: WalletView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>) -> Self {
        Self { interactor, view }
    }
}

#[async_trait]
impl<I, V> WalletPresenter for WalletPresenterImpl<I, V>
where
    I: WalletInteractor + ?Sized,
    V: WalletView + Send + Sync,
{
    async fn connect(&self, chat_id: i64) -> Result<()> {
        self.view.display_connecting().await?;

        match self.interactor.connect(chat_id).await {
            Ok(account) => self.view.display_connected(account).await,
            Err(e) => self.view.display_error(&e).await,
        }
    }
}
