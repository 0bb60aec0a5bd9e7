use crate::entity::{
    AllowanceOutcome, ExchangeRate, Session, SigningHandle, SwapError, SwapIntent, SwapReceipt,
    SwapStage, Token, TokenBalance, TokenRegistry,
};
use crate::evm::client::{wait_for_confirmation, ConfirmationPolicy};
use crate::evm::units::{self, RATE_DECIMALS};
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use chrono::Utc;
use log::{error, info, warn};
use serde::Deserialize;
use uuid::Uuid;

/// Asks the user whether the swap contract may spend `amount` of `token`.
#[async_trait]
pub trait ApprovalPrompt: Send + Sync {
    async fn confirm_approval(&self, token: &Token, amount: &str) -> bool;
}

/// Order of the two pre-swap checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOrder {
    /// Balance is checked first, so an underfunded swap never sends an approval.
    #[default]
    BalanceFirst,
    AllowanceFirst,
}

/// Gas limit handling for the swap transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPolicy {
    /// Leave the gas limit to the provider's own estimation.
    ProviderDefault,
    /// Estimate first, then submit with `estimate * (100 + margin_percent) / 100`.
    EstimateWithMargin { margin_percent: u64 },
}

impl Default for GasPolicy {
    fn default() -> Self {
        GasPolicy::EstimateWithMargin { margin_percent: 20 }
    }
}

impl GasPolicy {
    /// Gas limit to submit with, or `None` to leave it to the provider.
    /// `estimate` is only awaited under a margin policy.
    pub async fn gas_limit<F>(&self, estimate: F) -> Result<Option<u64>, SwapError>
    where
        F: std::future::Future<Output = Result<u64, SwapError>>,
    {
        match self {
            GasPolicy::ProviderDefault => Ok(None),
            GasPolicy::EstimateWithMargin { margin_percent } => {
                let estimate = estimate.await?;
                let limit = with_margin(estimate, *margin_percent);
                info!("Estimated swap gas: {} (limit {})", estimate, limit);
                Ok(Some(limit))
            }
        }
    }
}

fn with_margin(estimate: u64, margin_percent: u64) -> u64 {
    estimate.saturating_mul(100u64.saturating_add(margin_percent)) / 100
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwapPolicy {
    pub check_order: CheckOrder,
    pub gas: GasPolicy,
    pub confirmation: ConfirmationPolicy,
}

#[async_trait]
pub trait SwapInteractor: Send + Sync {
    fn tokens(&self) -> &TokenRegistry;

    async fn get_decimals(&self, session: &Session, symbol: &str) -> Result<u8, SwapError>;

    async fn get_rate(
        &self,
        session: &Session,
        from: &str,
        to: &str,
    ) -> Result<ExchangeRate, SwapError>;

    async fn set_rate(
        &self,
        session: &Session,
        from: &str,
        to: &str,
        new_rate: &str,
    ) -> Result<ExchangeRate, SwapError>;

    async fn ensure_allowance(
        &self,
        session: &Session,
        symbol: &str,
        amount: U256,
        prompt: &dyn ApprovalPrompt,
    ) -> Result<AllowanceOutcome, SwapError>;

    async fn ensure_balance(
        &self,
        session: &Session,
        symbol: &str,
        amount: U256,
    ) -> Result<U256, SwapError>;

    async fn approve(&self, session: &Session, symbol: &str, amount: &str)
        -> Result<TxHash, SwapError>;

    async fn token_balance(&self, session: &Session, symbol: &str)
        -> Result<TokenBalance, SwapError>;

    async fn execute_swap(
        &self,
        session: &Session,
        intent: &SwapIntent,
        prompt: &dyn ApprovalPrompt,
    ) -> Result<SwapReceipt, SwapError>;

    async fn withdraw_token(
        &self,
        session: &Session,
        symbol: &str,
        amount: &str,
    ) -> Result<TxHash, SwapError>;

    async fn contract_owner(&self, session: &Session) -> Result<Address, SwapError>;
}

pub struct SwapInteractorImpl {
    tokens: TokenRegistry,
    policy: SwapPolicy,
}

impl SwapInteractorImpl {
    pub fn new(tokens: TokenRegistry, policy: SwapPolicy) -> Self {
        Self { tokens, policy }
    }

    async fn read_rate(
        &self,
        signer: &SigningHandle,
        from: &Token,
        to: &Token,
    ) -> Result<ExchangeRate, SwapError> {
        let raw = signer
            .exchange_rate(from.address, to.address)
            .await
            .map_err(|e| {
                error!(
                    "Failed to fetch exchange rate {} -> {}: {}",
                    from.symbol, to.symbol, e
                );
                e
            })?;
        let rate = ExchangeRate::new(&from.symbol, &to.symbol, raw);
        info!("Exchange rate {} (raw {})", rate, raw);
        Ok(rate)
    }

    async fn submit_approval(
        &self,
        signer: &SigningHandle,
        token: &Token,
        amount: U256,
    ) -> Result<TxHash, SwapError> {
        let spender = signer.swap_contract();
        info!("Approving {} {} for {}", amount, token.symbol, spender);

        let pending = signer.approve(token.address, spender, amount).await?;
        wait_for_confirmation(signer.as_ref(), pending, self.policy.confirmation).await?;

        info!("Approval of {} confirmed: {}", token.symbol, pending.hash);
        Ok(pending.hash)
    }

    async fn run_swap(
        &self,
        session: &Session,
        signer: &SigningHandle,
        intent: &SwapIntent,
        prompt: &dyn ApprovalPrompt,
        stages: &mut Stages,
    ) -> Result<SwapReceipt, SwapError> {
        let from = self.tokens.get(&intent.from_token)?;
        let to = self.tokens.get(&intent.to_token)?;
        let from_decimals = self.get_decimals(session, &from.symbol).await?;
        let to_decimals = self.get_decimals(session, &to.symbol).await?;

        let rate = self.read_rate(signer, from, to).await?;
        if !rate.is_set() {
            return Err(SwapError::RateNotSet {
                from: from.symbol.clone(),
                to: to.symbol.clone(),
            });
        }
        stages.advance(SwapStage::RateChecked);

        let amount = units::parse_amount(&intent.amount, from_decimals)
            .and_then(units::require_positive)?;

        match self.policy.check_order {
            CheckOrder::BalanceFirst => {
                self.ensure_balance(session, &from.symbol, amount).await?;
                stages.advance(SwapStage::BalanceChecked);
                self.ensure_allowance(session, &from.symbol, amount, prompt)
                    .await?;
                stages.advance(SwapStage::AllowanceChecked);
            }
            CheckOrder::AllowanceFirst => {
                self.ensure_allowance(session, &from.symbol, amount, prompt)
                    .await?;
                stages.advance(SwapStage::AllowanceChecked);
                self.ensure_balance(session, &from.symbol, amount).await?;
                stages.advance(SwapStage::BalanceChecked);
            }
        }

        let gas_limit = self
            .policy
            .gas
            .gas_limit(signer.estimate_swap_gas(from.address, to.address, amount))
            .await?;

        let pending = signer
            .swap(from.address, to.address, amount, gas_limit)
            .await?;
        stages.advance(SwapStage::Submitted(pending.hash));

        let confirmed =
            wait_for_confirmation(signer.as_ref(), pending, self.policy.confirmation).await?;
        stages.advance(SwapStage::Confirmed);

        let amount_out = confirmed.swap_event.as_ref().map(|event| event.amount_out);

        // Refresh for display; the swap already succeeded, so a failed read
        // falls back to the rate seen before submission.
        let rate = match self.read_rate(signer, from, to).await {
            Ok(refreshed) => refreshed,
            Err(_) => rate,
        };

        Ok(SwapReceipt {
            source_token: from.symbol.clone(),
            target_token: to.symbol.clone(),
            amount_in: amount,
            amount_in_display: units::format_amount(amount, from_decimals),
            amount_out,
            amount_out_display: amount_out.map(|out| units::format_amount(out, to_decimals)),
            tx_hash: confirmed.hash,
            block_number: confirmed.block_number,
            rate,
            stages: stages.history.clone(),
            confirmed_at: Utc::now(),
        })
    }
}

/// Stage history of one swap attempt.
struct Stages {
    id: Uuid,
    history: Vec<SwapStage>,
}

impl Stages {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            history: vec![SwapStage::Idle],
        }
    }

    fn advance(&mut self, stage: SwapStage) {
        info!("Swap attempt {}: {}", self.id, stage);
        self.history.push(stage);
    }
}

#[async_trait]
impl SwapInteractor for SwapInteractorImpl {
    fn tokens(&self) -> &TokenRegistry {
        &self.tokens
    }

    async fn get_decimals(&self, session: &Session, symbol: &str) -> Result<u8, SwapError> {
        let (_, signer) = session.signer()?;
        let token = self.tokens.get(symbol)?;

        if let Some(decimals) = session.cached_decimals(symbol) {
            return Ok(decimals);
        }

        let decimals = match signer.decimals(token.address).await {
            Ok(decimals) => decimals,
            Err(e) => {
                warn!(
                    "decimals() failed for {}: {}. Using default {}",
                    symbol, e, token.default_decimals
                );
                token.default_decimals
            }
        };

        session.cache_decimals(symbol, decimals);
        Ok(decimals)
    }

    async fn get_rate(
        &self,
        session: &Session,
        from: &str,
        to: &str,
    ) -> Result<ExchangeRate, SwapError> {
        let (_, signer) = session.signer()?;
        let from = self.tokens.get(from)?;
        let to = self.tokens.get(to)?;
        self.read_rate(signer, from, to).await
    }

    async fn set_rate(
        &self,
        session: &Session,
        from: &str,
        to: &str,
        new_rate: &str,
    ) -> Result<ExchangeRate, SwapError> {
        let (_, signer) = session.signer()?;
        let from = self.tokens.get(from)?;
        let to = self.tokens.get(to)?;
        let raw =
            units::parse_amount(new_rate, RATE_DECIMALS).and_then(units::require_positive)?;

        info!(
            "Setting exchange rate {} -> {} to {} (raw {})",
            from.symbol, to.symbol, new_rate, raw
        );
        let pending = signer
            .set_exchange_rate(from.address, to.address, raw)
            .await
            .map_err(|e| {
                error!("Failed to set exchange rate: {}", e);
                e
            })?;
        wait_for_confirmation(signer.as_ref(), pending, self.policy.confirmation).await?;

        self.read_rate(signer, from, to).await
    }

    async fn ensure_allowance(
        &self,
        session: &Session,
        symbol: &str,
        amount: U256,
        prompt: &dyn ApprovalPrompt,
    ) -> Result<AllowanceOutcome, SwapError> {
        let (account, signer) = session.signer()?;
        let token = self.tokens.get(symbol)?;

        let current = signer
            .allowance(token.address, account, signer.swap_contract())
            .await?;
        if current >= amount {
            return Ok(AllowanceOutcome::AlreadySufficient);
        }

        let decimals = self.get_decimals(session, symbol).await?;
        let display = units::format_amount(amount, decimals);
        info!(
            "Allowance for {} is {}, {} required",
            symbol,
            units::format_amount(current, decimals),
            display
        );

        if !prompt.confirm_approval(token, &display).await {
            info!("Approval of {} {} declined", display, symbol);
            return Err(SwapError::InsufficientAllowance {
                token: symbol.to_string(),
            });
        }

        let hash = self.submit_approval(signer, token, amount).await?;
        Ok(AllowanceOutcome::Approved(hash))
    }

    async fn ensure_balance(
        &self,
        session: &Session,
        symbol: &str,
        amount: U256,
    ) -> Result<U256, SwapError> {
        let (account, signer) = session.signer()?;
        let token = self.tokens.get(symbol)?;

        let available = signer.balance_of(token.address, account).await?;
        if available < amount {
            return Err(SwapError::InsufficientBalance {
                token: symbol.to_string(),
                required: amount,
                available,
            });
        }
        Ok(available)
    }

    async fn approve(
        &self,
        session: &Session,
        symbol: &str,
        amount: &str,
    ) -> Result<TxHash, SwapError> {
        let (_, signer) = session.signer()?;
        let token = self.tokens.get(symbol)?;
        let decimals = self.get_decimals(session, symbol).await?;
        let amount =
            units::parse_amount(amount, decimals).and_then(units::require_positive)?;

        self.submit_approval(signer, token, amount)
            .await
            .map_err(|e| {
                error!("Approval of {} failed: {}", symbol, e);
                e
            })
    }

    async fn token_balance(
        &self,
        session: &Session,
        symbol: &str,
    ) -> Result<TokenBalance, SwapError> {
        let (account, signer) = session.signer()?;
        let token = self.tokens.get(symbol)?;

        let raw = signer.balance_of(token.address, account).await?;
        let decimals = self.get_decimals(session, symbol).await?;

        Ok(TokenBalance {
            symbol: symbol.to_string(),
            raw,
            decimals,
            formatted: units::format_amount(raw, decimals),
        })
    }

    async fn execute_swap(
        &self,
        session: &Session,
        intent: &SwapIntent,
        prompt: &dyn ApprovalPrompt,
    ) -> Result<SwapReceipt, SwapError> {
        let (account, signer) = session.signer()?;
        let _guard = session.try_begin_swap().map_err(|e| {
            warn!("Swap rejected for {}: another swap is in flight", account);
            e
        })?;

        let mut stages = Stages::new();
        info!(
            "Swap attempt {}: {} {} -> {} for {}",
            stages.id, intent.amount, intent.from_token, intent.to_token, account
        );

        match self
            .run_swap(session, signer, intent, prompt, &mut stages)
            .await
        {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                stages.advance(SwapStage::Failed(e.tag()));
                error!("Swap attempt {} failed: {}", stages.id, e);
                Err(e)
            }
        }
    }

    async fn withdraw_token(
        &self,
        session: &Session,
        symbol: &str,
        amount: &str,
    ) -> Result<TxHash, SwapError> {
        let (_, signer) = session.signer()?;
        let token = self.tokens.get(symbol)?;
        let decimals = self.get_decimals(session, symbol).await?;
        let amount =
            units::parse_amount(amount, decimals).and_then(units::require_positive)?;

        info!("Withdrawing {} {} from the swap contract", amount, symbol);
        let pending = signer
            .withdraw_token(token.address, amount)
            .await
            .map_err(|e| {
                error!("Withdrawal of {} failed: {}", symbol, e);
                e
            })?;
        wait_for_confirmation(signer.as_ref(), pending, self.policy.confirmation).await?;
        Ok(pending.hash)
    }

    async fn contract_owner(&self, session: &Session) -> Result<Address, SwapError> {
        let (_, signer) = session.signer()?;
        signer.owner().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SessionStore;
    use crate::testutils::{
        connected_session, ether, registry, Call, GatedPrompt, MockChain, ScriptedPrompt,
        ACCOUNT, SWAP_CONTRACT, TOKEN_A, TOKEN_B,
    };
    use std::sync::Arc;
    use std::time::Duration;

    fn policy(check_order: CheckOrder) -> SwapPolicy {
        SwapPolicy {
            check_order,
            gas: GasPolicy::default(),
            confirmation: ConfirmationPolicy {
                poll_interval: Duration::from_millis(1),
                timeout: Duration::from_millis(100),
            },
        }
    }

    fn interactor() -> SwapInteractorImpl {
        SwapInteractorImpl::new(registry(), policy(CheckOrder::BalanceFirst))
    }

    fn intent(amount: &str) -> SwapIntent {
        SwapIntent::new("GT", "ET", amount, &registry()).unwrap()
    }

    /// Rate 2.0 for GT -> ET, 100 GT balance, no allowance.
    fn funded_chain() -> Arc<MockChain> {
        let chain = MockChain::shared();
        chain.set_rate(TOKEN_A, TOKEN_B, ether(2));
        chain.set_balance(TOKEN_A, ACCOUNT, ether(100));
        chain
    }

    #[tokio::test]
    async fn swap_with_rate_two_submits_scaled_amount() {
        let chain = funded_chain();
        chain.set_allowance(TOKEN_A, ACCOUNT, ether(1000));
        let session = connected_session(&chain);
        let prompt = ScriptedPrompt::answering(false);

        let receipt = interactor()
            .execute_swap(&session, &intent("10"), &prompt)
            .await
            .unwrap();

        assert_eq!(
            chain.submissions(),
            vec![Call::Swap {
                from: TOKEN_A,
                to: TOKEN_B,
                amount: ether(10),
                gas_limit: Some(120_000),
            }]
        );
        assert_eq!(receipt.amount_in, ether(10));
        assert_eq!(receipt.amount_out, Some(ether(20)));
        assert_eq!(receipt.amount_out_display.as_deref(), Some("20.0"));
        assert_eq!(receipt.rate.raw, ether(2));
        assert_eq!(receipt.rate.display(), "2.000000");
        assert_eq!(prompt.times_asked(), 0);
        assert_eq!(receipt.stages.first(), Some(&SwapStage::Idle));
        assert_eq!(receipt.stages.last(), Some(&SwapStage::Confirmed));
        assert!(!session.swap_in_flight());
    }

    #[tokio::test]
    async fn unset_rate_aborts_before_any_transaction() {
        let chain = MockChain::shared();
        chain.set_balance(TOKEN_A, ACCOUNT, ether(100));
        chain.set_allowance(TOKEN_A, ACCOUNT, ether(100));
        let session = connected_session(&chain);
        let interactor = interactor();

        let rate = interactor.get_rate(&session, "ET", "GT").await.unwrap();
        assert!(rate.raw.is_zero());
        assert!(!rate.is_set());

        let err = interactor
            .execute_swap(&session, &intent("10"), &ScriptedPrompt::answering(true))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SwapError::RateNotSet {
                from: "GT".to_string(),
                to: "ET".to_string()
            }
        );
        assert!(chain.submissions().is_empty());
    }

    #[tokio::test]
    async fn low_allowance_approves_exactly_the_amount() {
        let chain = funded_chain();
        chain.set_allowance(TOKEN_A, ACCOUNT, ether(3));
        let session = connected_session(&chain);
        let prompt = ScriptedPrompt::answering(true);

        interactor()
            .execute_swap(&session, &intent("10"), &prompt)
            .await
            .unwrap();

        let submissions = chain.submissions();
        assert_eq!(
            submissions[0],
            Call::Approve {
                token: TOKEN_A,
                spender: SWAP_CONTRACT,
                amount: ether(10),
            }
        );
        assert!(matches!(submissions[1], Call::Swap { amount, .. } if amount == ether(10)));
        assert_eq!(prompt.times_asked(), 1);
    }

    #[tokio::test]
    async fn declined_approval_submits_nothing() {
        let chain = funded_chain();
        let session = connected_session(&chain);

        let err = interactor()
            .execute_swap(&session, &intent("10"), &ScriptedPrompt::answering(false))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SwapError::InsufficientAllowance {
                token: "GT".to_string()
            }
        );
        assert!(chain.submissions().is_empty());
    }

    #[tokio::test]
    async fn insufficient_balance_aborts_regardless_of_allowance() {
        for allowance in [U256::ZERO, ether(1000)] {
            let chain = MockChain::shared();
            chain.set_rate(TOKEN_A, TOKEN_B, ether(2));
            chain.set_balance(TOKEN_A, ACCOUNT, ether(5));
            chain.set_allowance(TOKEN_A, ACCOUNT, allowance);
            let session = connected_session(&chain);
            let prompt = ScriptedPrompt::answering(true);

            let err = interactor()
                .execute_swap(&session, &intent("10"), &prompt)
                .await
                .unwrap_err();

            assert_eq!(
                err,
                SwapError::InsufficientBalance {
                    token: "GT".to_string(),
                    required: ether(10),
                    available: ether(5),
                }
            );
            assert!(chain.submissions().is_empty());
            assert_eq!(prompt.times_asked(), 0);
        }
    }

    #[tokio::test]
    async fn allowance_first_policy_approves_before_balance_check() {
        let chain = MockChain::shared();
        chain.set_rate(TOKEN_A, TOKEN_B, ether(2));
        chain.set_balance(TOKEN_A, ACCOUNT, ether(5));
        let session = connected_session(&chain);
        let interactor = SwapInteractorImpl::new(registry(), policy(CheckOrder::AllowanceFirst));

        let err = interactor
            .execute_swap(&session, &intent("10"), &ScriptedPrompt::answering(true))
            .await
            .unwrap_err();

        assert!(matches!(err, SwapError::InsufficientBalance { .. }));
        assert!(matches!(
            chain.submissions().as_slice(),
            [Call::Approve { .. }]
        ));
    }

    #[tokio::test]
    async fn every_operation_needs_a_wallet() {
        let session = Session::disconnected();
        let interactor = interactor();
        let prompt = ScriptedPrompt::answering(true);
        let unavailable = Some(SwapError::WalletUnavailable);

        assert_eq!(interactor.get_decimals(&session, "GT").await.err(), unavailable);
        assert_eq!(interactor.get_rate(&session, "GT", "ET").await.err(), unavailable);
        assert_eq!(
            interactor.set_rate(&session, "GT", "ET", "2").await.err(),
            unavailable
        );
        assert_eq!(
            interactor
                .ensure_allowance(&session, "GT", ether(1), &prompt)
                .await
                .err(),
            unavailable
        );
        assert_eq!(
            interactor.ensure_balance(&session, "GT", ether(1)).await.err(),
            unavailable
        );
        assert_eq!(interactor.approve(&session, "GT", "1").await.err(), unavailable);
        assert_eq!(interactor.token_balance(&session, "GT").await.err(), unavailable);
        assert_eq!(
            interactor
                .execute_swap(&session, &intent("1"), &prompt)
                .await
                .err(),
            unavailable
        );
        assert_eq!(
            interactor.withdraw_token(&session, "GT", "1").await.err(),
            unavailable
        );
        assert_eq!(interactor.contract_owner(&session).await.err(), unavailable);
        assert_eq!(prompt.times_asked(), 0);
    }

    #[tokio::test]
    async fn reverting_decimals_falls_back_to_default_and_is_cached() {
        let chain = MockChain::shared();
        chain.set_decimals(
            TOKEN_A,
            Err(SwapError::TransactionReverted("no decimals".to_string())),
        );
        let session = connected_session(&chain);
        let interactor = interactor();

        assert_eq!(interactor.get_decimals(&session, "GT").await, Ok(18));
        assert_eq!(interactor.get_decimals(&session, "GT").await, Ok(18));

        let lookups = chain
            .calls()
            .into_iter()
            .filter(|call| *call == Call::Decimals(TOKEN_A))
            .count();
        assert_eq!(lookups, 1);
    }

    #[tokio::test]
    async fn decimals_of_the_from_token_scale_the_amount() {
        let chain = funded_chain();
        chain.set_decimals(TOKEN_A, Ok(6));
        chain.set_balance(TOKEN_A, ACCOUNT, U256::from(50_000_000u64));
        chain.set_allowance(TOKEN_A, ACCOUNT, U256::from(50_000_000u64));
        let session = connected_session(&chain);

        let receipt = interactor()
            .execute_swap(&session, &intent("12.5"), &ScriptedPrompt::answering(false))
            .await
            .unwrap();

        assert_eq!(receipt.amount_in, U256::from(12_500_000u64));
        assert_eq!(receipt.amount_in_display, "12.5");
    }

    #[tokio::test]
    async fn concurrent_swaps_on_one_session_are_rejected() {
        let chain = funded_chain();
        let session = Arc::new(connected_session(&chain));
        let interactor = Arc::new(interactor());
        let gate = Arc::new(GatedPrompt::default());

        let first = {
            let (session, interactor, gate) = (session.clone(), interactor.clone(), gate.clone());
            tokio::spawn(async move {
                interactor
                    .execute_swap(&session, &intent("10"), gate.as_ref())
                    .await
            })
        };
        gate.entered.notified().await;

        let second = interactor
            .execute_swap(&session, &intent("10"), &ScriptedPrompt::answering(true))
            .await;
        assert_eq!(second.err(), Some(SwapError::SwapInProgress));

        gate.release.notify_one();
        assert!(first.await.unwrap().is_ok());

        let swaps = chain
            .submissions()
            .into_iter()
            .filter(|call| matches!(call, Call::Swap { .. }))
            .count();
        assert_eq!(swaps, 1);
        assert!(!session.swap_in_flight());
    }

    #[tokio::test]
    async fn reconnecting_does_not_release_a_running_swap() {
        let chain = funded_chain();
        let store = SessionStore::new();
        let session = store.replace_session(1, connected_session(&chain));
        let interactor = Arc::new(interactor());
        let gate = Arc::new(GatedPrompt::default());

        let first = {
            let (session, interactor, gate) = (session.clone(), interactor.clone(), gate.clone());
            tokio::spawn(async move {
                interactor
                    .execute_swap(&session, &intent("10"), gate.as_ref())
                    .await
            })
        };
        gate.entered.notified().await;

        let reconnected = store.replace_session(1, connected_session(&chain));
        let second = interactor
            .execute_swap(&reconnected, &intent("10"), &ScriptedPrompt::answering(true))
            .await;
        assert_eq!(second.err(), Some(SwapError::SwapInProgress));

        gate.release.notify_one();
        assert!(first.await.unwrap().is_ok());

        let swaps = chain
            .submissions()
            .into_iter()
            .filter(|call| matches!(call, Call::Swap { .. }))
            .count();
        assert_eq!(swaps, 1);
        assert!(!reconnected.swap_in_flight());
    }

    #[tokio::test]
    async fn provider_default_gas_skips_estimation() {
        let chain = funded_chain();
        chain.set_allowance(TOKEN_A, ACCOUNT, ether(10));
        let session = connected_session(&chain);
        let interactor = SwapInteractorImpl::new(
            registry(),
            SwapPolicy {
                gas: GasPolicy::ProviderDefault,
                ..policy(CheckOrder::BalanceFirst)
            },
        );

        interactor
            .execute_swap(&session, &intent("10"), &ScriptedPrompt::answering(false))
            .await
            .unwrap();

        assert!(!chain
            .calls()
            .iter()
            .any(|call| matches!(call, Call::EstimateSwapGas(..))));
        assert!(matches!(
            chain.submissions().as_slice(),
            [Call::Swap { gas_limit: None, .. }]
        ));
    }

    #[test]
    fn gas_margin_saturates_instead_of_overflowing() {
        assert_eq!(with_margin(100_000, 20), 120_000);
        assert_eq!(with_margin(100_000, 0), 100_000);
        assert_eq!(with_margin(100_000, u64::MAX), u64::MAX / 100);
        assert_eq!(with_margin(u64::MAX, 20), u64::MAX / 100);
    }

    #[tokio::test]
    async fn zero_amounts_are_refused_before_submission() {
        let chain = funded_chain();
        let session = connected_session(&chain);
        let interactor = interactor();

        for result in [
            interactor.approve(&session, "GT", "0.0").await,
            interactor.withdraw_token(&session, "GT", "0").await,
        ] {
            assert!(matches!(result, Err(SwapError::InvalidAmount(_))));
        }
        assert!(matches!(
            interactor.set_rate(&session, "GT", "ET", "0").await,
            Err(SwapError::InvalidAmount(_))
        ));
        assert!(chain.submissions().is_empty());
    }

    #[tokio::test]
    async fn reverted_swap_is_reported_and_releases_the_session() {
        let chain = funded_chain();
        chain.set_allowance(TOKEN_A, ACCOUNT, ether(10));
        chain.fail_next_submission(SwapError::TransactionReverted(
            "Token allowance too low".to_string(),
        ));
        let session = connected_session(&chain);

        let err = interactor()
            .execute_swap(&session, &intent("10"), &ScriptedPrompt::answering(false))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SwapError::TransactionReverted("Token allowance too low".to_string())
        );
        assert!(!session.swap_in_flight());
    }

    #[tokio::test]
    async fn set_rate_waits_for_confirmation_and_rereads() {
        let chain = MockChain::shared();
        chain.set_pending_polls(2);
        let session = connected_session(&chain);

        let rate = interactor()
            .set_rate(&session, "GT", "ET", "2.5")
            .await
            .unwrap();

        assert_eq!(
            chain.submissions(),
            vec![Call::SetExchangeRate(
                TOKEN_A,
                TOKEN_B,
                U256::from(2_500_000_000_000_000_000u128)
            )]
        );
        assert_eq!(rate.display(), "2.500000");
        assert_eq!(chain.status_polls(), 3);
    }

    #[tokio::test]
    async fn set_rate_revert_is_surfaced_verbatim() {
        let chain = MockChain::shared();
        chain.fail_next_submission(SwapError::TransactionReverted(
            "OwnableUnauthorizedAccount".to_string(),
        ));
        let session = connected_session(&chain);

        let err = interactor()
            .set_rate(&session, "GT", "ET", "2")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SwapError::TransactionReverted("OwnableUnauthorizedAccount".to_string())
        );
    }

    #[tokio::test]
    async fn withdraw_and_balance_use_token_decimals() {
        let chain = MockChain::shared();
        chain.set_balance(TOKEN_B, ACCOUNT, ether(3) / U256::from(2u64));
        let session = connected_session(&chain);
        let interactor = interactor();

        let balance = interactor.token_balance(&session, "ET").await.unwrap();
        assert_eq!(balance.formatted, "1.5");

        interactor
            .withdraw_token(&session, "ET", "100")
            .await
            .unwrap();
        assert_eq!(
            chain.submissions(),
            vec![Call::WithdrawToken(TOKEN_B, ether(100))]
        );
    }
}
