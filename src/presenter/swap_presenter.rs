use crate::entity::{SessionStore, TokenSide};
use crate::evm::units;
use crate::interactor::swap_interactor::SwapInteractor;
use crate::utils;
use crate::view::swap_view::SwapView;
use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;

#[async_trait]
pub trait SwapPresenter: Send + Sync {
    async fn show_tokens(&self) -> Result<()>;
    async fn choose_token(&self, side: TokenSide) -> Result<()>;
    async fn select_token(&self, chat_id: i64, side: TokenSide, symbol: &str) -> Result<()>;
    async fn prompt_amount(&self) -> Result<()>;
    /// Returns false when the amount was rejected and the user should retry.
    async fn set_amount(&self, chat_id: i64, amount: &str) -> Result<bool>;
    async fn show_rate(&self, chat_id: i64) -> Result<()>;
    /// Returns false when no token pair is selected yet.
    async fn prompt_rate(&self, chat_id: i64) -> Result<bool>;
    async fn set_rate(&self, chat_id: i64, rate: &str) -> Result<()>;
    async fn approve(&self, chat_id: i64, symbol: &str, amount: &str) -> Result<()>;
    async fn swap(&self, chat_id: i64) -> Result<()>;
    async fn withdraw(&self, chat_id: i64, symbol: &str, amount: &str) -> Result<()>;
    async fn show_owner(&self, chat_id: i64) -> Result<()>;
    async fn show_usage(&self, usage: &str) -> Result<()>;
}

pub struct SwapPresenterImpl<I: ?Sized, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    sessions: Arc<SessionStore>,
}

impl<I, V> SwapPresenterImpl<I, V>
where
    I: SwapInteractor + ?Sized,
    V: SwapView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>, sessions: Arc<SessionStore>) -> Self {
        Self {
            interactor,
            view,
            sessions,
        }
    }

    async fn require_pair(&self, chat_id: i64) -> Result<Option<(String, String)>> {
        let form = self.sessions.form(chat_id);
        match form.pair() {
            Some((from, to)) => Ok(Some((from.to_string(), to.to_string()))),
            None => {
                self.view
                    .display_usage("Select a token pair with /from and /to first.")
                    .await?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl<I, V> SwapPresenter for SwapPresenterImpl<I, V>
where
    I: SwapInteractor + ?Sized,
    V: SwapView + Send + Sync,
{
    async fn show_tokens(&self) -> Result<()> {
        self.view.display_tokens(self.interactor.tokens()).await
    }

    async fn choose_token(&self, side: TokenSide) -> Result<()> {
        self.view
            .display_token_choice(side, self.interactor.tokens())
            .await
    }

    async fn select_token(&self, chat_id: i64, side: TokenSide, symbol: &str) -> Result<()> {
        let symbol = utils::normalize_symbol(symbol);
        if let Err(e) = self.interactor.tokens().get(&symbol) {
            return self.view.display_error(&e).await;
        }

        self.sessions
            .update_form(chat_id, |form| side.apply(form, &symbol));
        info!("Chat {} selected {} token {}", chat_id, side.as_str(), symbol);

        // Only the token being spent has its balance shown
        let session = self.sessions.session(chat_id);
        let balance = if side == TokenSide::From && session.is_connected() {
            match self.interactor.token_balance(&session, &symbol).await {
                Ok(balance) => Some(balance),
                Err(e) => {
                    warn!("Could not read {} balance: {}", symbol, e);
                    None
                }
            }
        } else {
            None
        };

        self.view
            .display_token_selected(side, &symbol, balance.as_ref())
            .await
    }

    async fn prompt_amount(&self) -> Result<()> {
        self.view.display_amount_prompt().await
    }

    async fn set_amount(&self, chat_id: i64, amount: &str) -> Result<bool> {
        let amount = match units::validate_amount(amount) {
            Ok(amount) => amount.to_string(),
            Err(e) => {
                self.view.display_error(&e).await?;
                return Ok(false);
            }
        };

        let form = self
            .sessions
            .update_form(chat_id, |form| form.amount = Some(amount.clone()));
        self.view
            .display_amount_set(&amount, form.from_token.as_deref())
            .await?;
        Ok(true)
    }

    async fn show_rate(&self, chat_id: i64) -> Result<()> {
        let Some((from, to)) = self.require_pair(chat_id).await? else {
            return Ok(());
        };

        let session = self.sessions.session(chat_id);
        match self.interactor.get_rate(&session, &from, &to).await {
            Ok(rate) => self.view.display_rate(&rate).await,
            Err(e) => self.view.display_error(&e).await,
        }
    }

    async fn prompt_rate(&self, chat_id: i64) -> Result<bool> {
        match self.require_pair(chat_id).await? {
            Some((from, to)) => {
                self.view.display_rate_prompt(&from, &to).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_rate(&self, chat_id: i64, rate: &str) -> Result<()> {
        let Some((from, to)) = self.require_pair(chat_id).await? else {
            return Ok(());
        };

        let session = self.sessions.session(chat_id);
        match self.interactor.set_rate(&session, &from, &to, rate).await {
            Ok(rate) => self.view.display_rate_updated(&rate).await,
            Err(e) => self.view.display_error(&e).await,
        }
    }

    async fn approve(&self, chat_id: i64, symbol: &str, amount: &str) -> Result<()> {
        let symbol = utils::normalize_symbol(symbol);
        let session = self.sessions.session(chat_id);

        match self.interactor.approve(&session, &symbol, amount).await {
            Ok(hash) => self.view.display_approved(&symbol, amount.trim(), hash).await,
            Err(e) => self.view.display_error(&e).await,
        }
    }

    async fn swap(&self, chat_id: i64) -> Result<()> {
        let session = self.sessions.session(chat_id);
        let intent = match self.sessions.form(chat_id).intent(self.interactor.tokens()) {
            Ok(intent) => intent,
            Err(e) => return self.view.display_error(&e).await,
        };

        self.view.display_swap_started(&intent).await?;
        match self
            .interactor
            .execute_swap(&session, &intent, self.view.as_ref())
            .await
        {
            Ok(receipt) => self.view.display_swap_receipt(&receipt).await,
            Err(e) => self.view.display_error(&e).await,
        }
    }

    async fn withdraw(&self, chat_id: i64, symbol: &str, amount: &str) -> Result<()> {
        let symbol = utils::normalize_symbol(symbol);
        let session = self.sessions.session(chat_id);

        match self
            .interactor
            .withdraw_token(&session, &symbol, amount)
            .await
        {
            Ok(hash) => {
                self.view
                    .display_withdrawn(&symbol, amount.trim(), hash)
                    .await
            }
            Err(e) => self.view.display_error(&e).await,
        }
    }

    async fn show_owner(&self, chat_id: i64) -> Result<()> {
        let session = self.sessions.session(chat_id);
        match self.interactor.contract_owner(&session).await {
            Ok(owner) => self.view.display_owner(owner, session.account()).await,
            Err(e) => self.view.display_error(&e).await,
        }
    }

    async fn show_usage(&self, usage: &str) -> Result<()> {
        self.view.display_usage(usage).await
    }
}
