use std::sync::Arc;
use std::time::Duration;

use crate::entity::{SessionStore, TokenRegistry};
use crate::evm::wallet::WalletProvider;
use crate::interactor::swap_interactor::{SwapInteractor, SwapInteractorImpl, SwapPolicy};
use crate::interactor::wallet_interactor::{WalletInteractor, WalletInteractorImpl};
use crate::view::approval::ApprovalRegistry;

/// ServiceContainer provides access to core application dependencies
pub struct ServiceContainer {
    // Per-chat state
    sessions: Arc<SessionStore>,
    approvals: Arc<ApprovalRegistry>,

    // Interactors
    swap_interactor: Arc<dyn SwapInteractor>,
    wallet_interactor: Arc<dyn WalletInteractor>,

    // Configuration
    approval_timeout: Duration,
}

impl ServiceContainer {
    pub fn new(
        tokens: TokenRegistry,
        policy: SwapPolicy,
        wallet_provider: Arc<dyn WalletProvider>,
        approval_timeout: Duration,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new());

        let swap_interactor =
            Arc::new(SwapInteractorImpl::new(tokens, policy)) as Arc<dyn SwapInteractor>;
        let wallet_interactor =
            Arc::new(WalletInteractorImpl::new(wallet_provider, sessions.clone()))
                as Arc<dyn WalletInteractor>;

        Self {
            sessions,
            approvals: Arc::new(ApprovalRegistry::new()),
            swap_interactor,
            wallet_interactor,
            approval_timeout,
        }
    }

    // Accessor methods

    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }

    pub fn approvals(&self) -> Arc<ApprovalRegistry> {
        self.approvals.clone()
    }

    pub fn swap_interactor(&self) -> Arc<dyn SwapInteractor> {
        self.swap_interactor.clone()
    }

    pub fn wallet_interactor(&self) -> Arc<dyn WalletInteractor> {
        self.wallet_interactor.clone()
    }

    pub fn approval_timeout(&self) -> Duration {
        self.approval_timeout
    }
}
