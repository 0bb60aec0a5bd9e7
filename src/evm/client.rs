use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionReceipt;
use async_trait::async_trait;
use log::{debug, info};
use std::time::Duration;

use crate::entity::{ConfirmedTransaction, PendingTransaction, SwapError, SwapEvent, TxStatus};
use crate::evm::contracts::{ITokenSwap, IERC20};
use crate::evm::errors::{from_contract_error, from_rpc_error};

/// Every chain read and transaction the bot performs for a connected wallet.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the deployed swap contract (the allowance spender).
    fn swap_contract(&self) -> Address;

    async fn decimals(&self, token: Address) -> Result<u8, SwapError>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, SwapError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, SwapError>;

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<PendingTransaction, SwapError>;

    async fn exchange_rate(&self, from: Address, to: Address) -> Result<U256, SwapError>;

    async fn set_exchange_rate(
        &self,
        from: Address,
        to: Address,
        rate: U256,
    ) -> Result<PendingTransaction, SwapError>;

    async fn estimate_swap_gas(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<u64, SwapError>;

    async fn swap(
        &self,
        from: Address,
        to: Address,
        amount: U256,
        gas_limit: Option<u64>,
    ) -> Result<PendingTransaction, SwapError>;

    async fn withdraw_token(
        &self,
        token: Address,
        amount: U256,
    ) -> Result<PendingTransaction, SwapError>;

    async fn owner(&self) -> Result<Address, SwapError>;

    /// One poll of a submitted transaction.
    async fn transaction_status(&self, hash: TxHash) -> Result<TxStatus, SwapError>;
}

/// `ChainClient` backed by an alloy provider. Transactions are sent with
/// `from` set to the connected account; signing happens either in the
/// provider's wallet filler or in the node.
pub struct AlloyChainClient {
    provider: DynProvider,
    account: Address,
    swap_contract: Address,
}

impl AlloyChainClient {
    pub fn new(provider: DynProvider, account: Address, swap_contract: Address) -> Self {
        Self {
            provider,
            account,
            swap_contract,
        }
    }

    fn token(&self, address: Address) -> IERC20::IERC20Instance<DynProvider> {
        IERC20::new(address, self.provider.clone())
    }

    fn exchange(&self) -> ITokenSwap::ITokenSwapInstance<DynProvider> {
        ITokenSwap::new(self.swap_contract, self.provider.clone())
    }

    fn swap_event(&self, receipt: &TransactionReceipt) -> Option<SwapEvent> {
        receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.inner.address == self.swap_contract)
            .find_map(|log| {
                let event = log.log_decode::<ITokenSwap::Swap>().ok()?.inner.data;
                Some(SwapEvent {
                    user: event.user,
                    from_token: event.fromToken,
                    to_token: event.toToken,
                    amount_in: event.amountIn,
                    amount_out: event.amountOut,
                })
            })
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    fn swap_contract(&self) -> Address {
        self.swap_contract
    }

    async fn decimals(&self, token: Address) -> Result<u8, SwapError> {
        let contract = self.token(token);
        contract.decimals().call().await.map_err(from_contract_error)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, SwapError> {
        let contract = self.token(token);
        let balance = contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(from_contract_error)?;
        debug!("Balance of {} in {}: {}", owner, token, balance);
        Ok(balance)
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, SwapError> {
        let contract = self.token(token);
        let allowance = contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(from_contract_error)?;
        debug!("Allowance of {} for {} in {}: {}", owner, spender, token, allowance);
        Ok(allowance)
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<PendingTransaction, SwapError> {
        let contract = self.token(token);
        let pending = contract
            .approve(spender, amount)
            .from(self.account)
            .send()
            .await
            .map_err(from_contract_error)?;
        info!("Approval transaction sent: {}", pending.tx_hash());
        Ok(PendingTransaction {
            hash: *pending.tx_hash(),
        })
    }

    async fn exchange_rate(&self, from: Address, to: Address) -> Result<U256, SwapError> {
        let contract = self.exchange();
        contract
            .getExchangeRate(from, to)
            .call()
            .await
            .map_err(from_contract_error)
    }

    async fn set_exchange_rate(
        &self,
        from: Address,
        to: Address,
        rate: U256,
    ) -> Result<PendingTransaction, SwapError> {
        let contract = self.exchange();
        let pending = contract
            .setExchangeRate(from, to, rate)
            .from(self.account)
            .send()
            .await
            .map_err(from_contract_error)?;
        info!("Rate update transaction sent: {}", pending.tx_hash());
        Ok(PendingTransaction {
            hash: *pending.tx_hash(),
        })
    }

    async fn estimate_swap_gas(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<u64, SwapError> {
        let contract = self.exchange();
        contract
            .swap(from, to, amount)
            .from(self.account)
            .estimate_gas()
            .await
            .map_err(from_contract_error)
    }

    async fn swap(
        &self,
        from: Address,
        to: Address,
        amount: U256,
        gas_limit: Option<u64>,
    ) -> Result<PendingTransaction, SwapError> {
        let contract = self.exchange();
        let mut call = contract.swap(from, to, amount).from(self.account);
        if let Some(gas) = gas_limit {
            call = call.gas(gas);
        }

        let pending = call.send().await.map_err(from_contract_error)?;
        info!("Swap transaction sent: {}", pending.tx_hash());
        Ok(PendingTransaction {
            hash: *pending.tx_hash(),
        })
    }

    async fn withdraw_token(
        &self,
        token: Address,
        amount: U256,
    ) -> Result<PendingTransaction, SwapError> {
        let contract = self.exchange();
        let pending = contract
            .withdrawToken(token, amount)
            .from(self.account)
            .send()
            .await
            .map_err(from_contract_error)?;
        info!("Withdrawal transaction sent: {}", pending.tx_hash());
        Ok(PendingTransaction {
            hash: *pending.tx_hash(),
        })
    }

    async fn owner(&self) -> Result<Address, SwapError> {
        let contract = self.exchange();
        contract.owner().call().await.map_err(from_contract_error)
    }

    async fn transaction_status(&self, hash: TxHash) -> Result<TxStatus, SwapError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(from_rpc_error)?;

        Ok(match receipt {
            None => TxStatus::Pending,
            Some(receipt) if receipt.status() => TxStatus::Confirmed(ConfirmedTransaction {
                hash,
                block_number: receipt.block_number,
                swap_event: self.swap_event(&receipt),
            }),
            Some(receipt) => TxStatus::Failed(format!(
                "transaction {} reverted in block {}",
                hash,
                receipt
                    .block_number
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".to_string())
            )),
        })
    }
}

/// How long and how often to poll for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(180),
        }
    }
}

/// Poll until the transaction has one confirmation, fails, or the policy's
/// timeout passes. A timed-out transaction may still be mined later.
pub async fn wait_for_confirmation(
    client: &dyn ChainClient,
    pending: PendingTransaction,
    policy: ConfirmationPolicy,
) -> Result<ConfirmedTransaction, SwapError> {
    let deadline = tokio::time::Instant::now() + policy.timeout;

    loop {
        match client.transaction_status(pending.hash).await? {
            TxStatus::Confirmed(confirmed) => {
                info!(
                    "Transaction {} confirmed in block {:?}",
                    confirmed.hash, confirmed.block_number
                );
                return Ok(confirmed);
            }
            TxStatus::Failed(reason) => return Err(SwapError::TransactionReverted(reason)),
            TxStatus::Pending => {}
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(SwapError::ConfirmationTimeout(pending.hash));
        }
        tokio::time::sleep(policy.poll_interval).await;
    }
}
