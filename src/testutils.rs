//! In-memory chain and prompt doubles shared by the unit tests.
use alloy::primitives::{address, Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::entity::{
    ConfirmedTransaction, PendingTransaction, Session, SwapError, SwapEvent, Token,
    TokenRegistry, TxStatus, DEFAULT_DECIMALS,
};
use crate::evm::client::ChainClient;
use crate::interactor::swap_interactor::ApprovalPrompt;

pub const ACCOUNT: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const OWNER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const SWAP_CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const TOKEN_A: Address = address!("7873a7923350E60eFF9cE2673C2b713C992Db3E1");
pub const TOKEN_B: Address = address!("3BCe90B2d61432351321acAb9777f17E6f11e720");

pub fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

pub fn registry() -> TokenRegistry {
    TokenRegistry::new([
        Token {
            symbol: "GT".to_string(),
            address: TOKEN_A,
            default_decimals: DEFAULT_DECIMALS,
        },
        Token {
            symbol: "ET".to_string(),
            address: TOKEN_B,
            default_decimals: DEFAULT_DECIMALS,
        },
    ])
}

pub fn connected_session(chain: &Arc<MockChain>) -> Session {
    Session::connected(ACCOUNT, chain.clone())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Decimals(Address),
    BalanceOf(Address, Address),
    Allowance(Address, Address, Address),
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    ExchangeRate(Address, Address),
    SetExchangeRate(Address, Address, U256),
    EstimateSwapGas(Address, Address, U256),
    Swap {
        from: Address,
        to: Address,
        amount: U256,
        gas_limit: Option<u64>,
    },
    WithdrawToken(Address, U256),
    Owner,
    TransactionStatus(TxHash),
}

impl Call {
    pub fn is_submission(&self) -> bool {
        matches!(
            self,
            Call::Approve { .. }
                | Call::SetExchangeRate(..)
                | Call::Swap { .. }
                | Call::WithdrawToken(..)
        )
    }
}

#[derive(Default)]
struct MockState {
    decimals: HashMap<Address, Result<u8, SwapError>>,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address), U256>,
    rates: HashMap<(Address, Address), U256>,
    gas_estimate: u64,
    pending_polls: usize,
    status_polls: usize,
    confirmation_failure: Option<String>,
    submission_error: Option<SwapError>,
    swap_events: HashMap<TxHash, SwapEvent>,
    next_tx: u8,
    calls: Vec<Call>,
}

/// Chain double: reads come from configured maps, submissions are recorded
/// and confirmed on the next status poll unless configured otherwise.
pub struct MockChain {
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                gas_estimate: 100_000,
                ..MockState::default()
            }),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn set_rate(&self, from: Address, to: Address, rate: U256) {
        self.state().rates.insert((from, to), rate);
    }

    pub fn set_balance(&self, token: Address, owner: Address, amount: U256) {
        self.state().balances.insert((token, owner), amount);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, amount: U256) {
        self.state().allowances.insert((token, owner), amount);
    }

    pub fn set_decimals(&self, token: Address, decimals: Result<u8, SwapError>) {
        self.state().decimals.insert(token, decimals);
    }

    pub fn set_pending_polls(&self, polls: usize) {
        self.state().pending_polls = polls;
    }

    pub fn fail_confirmations(&self, reason: &str) {
        self.state().confirmation_failure = Some(reason.to_string());
    }

    pub fn fail_next_submission(&self, error: SwapError) {
        self.state().submission_error = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn submissions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(Call::is_submission)
            .collect()
    }

    pub fn status_polls(&self) -> usize {
        self.state().status_polls
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn submit(&self, call: Call) -> Result<PendingTransaction, SwapError> {
        let mut state = self.state();
        state.calls.push(call.clone());
        if let Some(error) = state.submission_error.take() {
            return Err(error);
        }

        state.next_tx += 1;
        let hash = TxHash::with_last_byte(state.next_tx);

        match call {
            Call::Approve { token, amount, .. } => {
                state.allowances.insert((token, ACCOUNT), amount);
            }
            Call::SetExchangeRate(from, to, rate) => {
                state.rates.insert((from, to), rate);
            }
            Call::Swap {
                from, to, amount, ..
            } => {
                let rate = state.rates.get(&(from, to)).copied().unwrap_or_default();
                state.swap_events.insert(
                    hash,
                    SwapEvent {
                        user: ACCOUNT,
                        from_token: from,
                        to_token: to,
                        amount_in: amount,
                        amount_out: amount * rate / ether(1),
                    },
                );
            }
            _ => {}
        }

        Ok(PendingTransaction { hash })
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn swap_contract(&self) -> Address {
        SWAP_CONTRACT
    }

    async fn decimals(&self, token: Address) -> Result<u8, SwapError> {
        let mut state = self.state();
        state.calls.push(Call::Decimals(token));
        state
            .decimals
            .get(&token)
            .cloned()
            .unwrap_or(Ok(DEFAULT_DECIMALS))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, SwapError> {
        let mut state = self.state();
        state.calls.push(Call::BalanceOf(token, owner));
        Ok(state
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default())
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, SwapError> {
        let mut state = self.state();
        state.calls.push(Call::Allowance(token, owner, spender));
        Ok(state
            .allowances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default())
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<PendingTransaction, SwapError> {
        self.submit(Call::Approve {
            token,
            spender,
            amount,
        })
    }

    async fn exchange_rate(&self, from: Address, to: Address) -> Result<U256, SwapError> {
        let mut state = self.state();
        state.calls.push(Call::ExchangeRate(from, to));
        Ok(state.rates.get(&(from, to)).copied().unwrap_or_default())
    }

    async fn set_exchange_rate(
        &self,
        from: Address,
        to: Address,
        rate: U256,
    ) -> Result<PendingTransaction, SwapError> {
        self.submit(Call::SetExchangeRate(from, to, rate))
    }

    async fn estimate_swap_gas(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<u64, SwapError> {
        let mut state = self.state();
        state.calls.push(Call::EstimateSwapGas(from, to, amount));
        Ok(state.gas_estimate)
    }

    async fn swap(
        &self,
        from: Address,
        to: Address,
        amount: U256,
        gas_limit: Option<u64>,
    ) -> Result<PendingTransaction, SwapError> {
        self.submit(Call::Swap {
            from,
            to,
            amount,
            gas_limit,
        })
    }

    async fn withdraw_token(
        &self,
        token: Address,
        amount: U256,
    ) -> Result<PendingTransaction, SwapError> {
        self.submit(Call::WithdrawToken(token, amount))
    }

    async fn owner(&self) -> Result<Address, SwapError> {
        self.state().calls.push(Call::Owner);
        Ok(OWNER)
    }

    async fn transaction_status(&self, hash: TxHash) -> Result<TxStatus, SwapError> {
        let mut state = self.state();
        state.calls.push(Call::TransactionStatus(hash));
        state.status_polls += 1;

        if state.pending_polls > 0 {
            state.pending_polls = state.pending_polls.saturating_sub(1);
            return Ok(TxStatus::Pending);
        }
        if let Some(reason) = state.confirmation_failure.clone() {
            return Ok(TxStatus::Failed(reason));
        }

        Ok(TxStatus::Confirmed(ConfirmedTransaction {
            hash,
            block_number: Some(1),
            swap_event: state.swap_events.get(&hash).cloned(),
        }))
    }
}

/// Prompt that always gives the same answer and remembers what it was asked.
pub struct ScriptedPrompt {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn times_asked(&self) -> usize {
        self.asked.lock().unwrap().len()
    }
}

#[async_trait]
impl ApprovalPrompt for ScriptedPrompt {
    async fn confirm_approval(&self, token: &Token, amount: &str) -> bool {
        self.asked
            .lock()
            .unwrap()
            .push(format!("{} {}", amount, token.symbol));
        self.answer
    }
}

/// Prompt that parks the caller until released, to hold a swap mid-flight.
#[derive(Default)]
pub struct GatedPrompt {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl ApprovalPrompt for GatedPrompt {
    async fn confirm_approval(&self, _token: &Token, _amount: &str) -> bool {
        self.entered.notify_one();
        self.release.notified().await;
        true
    }
}
