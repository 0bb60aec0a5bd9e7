use crate::entity::{Session, SessionStore, SwapError};
use crate::evm::wallet::WalletProvider;
use alloy::primitives::Address;
use async_trait::async_trait;
use log::{error, info};
use std::sync::Arc;

#[async_trait]
pub trait WalletInteractor: Send + Sync {
    /// Request an account from the wallet provider and bind it to the chat.
    async fn connect(&self, chat_id: i64) -> Result<Address, SwapError>;

    fn session(&self, chat_id: i64) -> Arc<Session>;
}

pub struct WalletInteractorImpl {
    provider: Arc<dyn WalletProvider>,
    sessions: Arc<SessionStore>,
}

impl WalletInteractorImpl {
    pub fn new(provider: Arc<dyn WalletProvider>, sessions: Arc<SessionStore>) -> Self {
        Self { provider, sessions }
    }
}

#[async_trait]
impl WalletInteractor for WalletInteractorImpl {
    async fn connect(&self, chat_id: i64) -> Result<Address, SwapError> {
        let (account, signer) = self.provider.connect().await.map_err(|e| {
            error!("Wallet connection for chat {} failed: {}", chat_id, e);
            e
        })?;

        // A fresh session drops any decimals cached for the previous account.
        self.sessions
            .replace_session(chat_id, Session::connected(account, signer));
        info!("Chat {} connected as {}", chat_id, account);
        Ok(account)
    }

    fn session(&self, chat_id: i64) -> Arc<Session> {
        self.sessions.session(chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SigningHandle;
    use crate::testutils::{MockChain, ACCOUNT};

    struct FixedWallet(Result<(), SwapError>);

    #[async_trait]
    impl WalletProvider for FixedWallet {
        async fn connect(&self) -> Result<(Address, SigningHandle), SwapError> {
            self.0.clone()?;
            let chain: SigningHandle = MockChain::shared();
            Ok((ACCOUNT, chain))
        }
    }

    fn interactor(wallet: FixedWallet) -> WalletInteractorImpl {
        WalletInteractorImpl::new(Arc::new(wallet), Arc::new(SessionStore::new()))
    }

    #[tokio::test]
    async fn connect_binds_account_to_chat() {
        let interactor = interactor(FixedWallet(Ok(())));
        assert!(!interactor.session(7).is_connected());

        let account = interactor.connect(7).await.unwrap();

        assert_eq!(account, ACCOUNT);
        assert_eq!(interactor.session(7).account(), Some(ACCOUNT));
        assert!(!interactor.session(8).is_connected());
    }

    #[tokio::test]
    async fn rejected_connection_leaves_session_disconnected() {
        let interactor = interactor(FixedWallet(Err(SwapError::UserRejected)));

        assert_eq!(interactor.connect(7).await, Err(SwapError::UserRejected));
        assert!(!interactor.session(7).is_connected());
    }

    #[tokio::test]
    async fn reconnecting_clears_cached_decimals() {
        let interactor = interactor(FixedWallet(Ok(())));
        interactor.connect(7).await.unwrap();
        interactor.session(7).cache_decimals("GT", 6);

        interactor.connect(7).await.unwrap();

        assert_eq!(interactor.session(7).cached_decimals("GT"), None);
    }
}
