use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use log::{info, warn};
use reqwest::Url;
use std::sync::Arc;

use crate::entity::{SigningHandle, SwapError};
use crate::evm::client::AlloyChainClient;
use crate::evm::errors::{METHOD_NOT_FOUND_CODE, USER_REJECTED_CODE};

/// Source of a connected account and the handle that signs for it.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn connect(&self) -> Result<(Address, SigningHandle), SwapError>;
}

/// Wallet held by the node behind the RPC endpoint (a dev node or a signer
/// proxy). Accounts are requested with `eth_requestAccounts`, falling back to
/// `eth_accounts` for nodes that do not implement the request method.
pub struct NodeWalletProvider {
    rpc_url: Url,
    swap_contract: Address,
}

impl NodeWalletProvider {
    pub fn new(rpc_url: Url, swap_contract: Address) -> Self {
        Self {
            rpc_url,
            swap_contract,
        }
    }
}

#[async_trait]
impl WalletProvider for NodeWalletProvider {
    async fn connect(&self) -> Result<(Address, SigningHandle), SwapError> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());

        let requested = provider
            .raw_request::<_, Vec<Address>>(
                "eth_requestAccounts".into(),
                Vec::<serde_json::Value>::new(),
            )
            .await;

        let accounts = match requested {
            Ok(accounts) => accounts,
            Err(e) if error_code(&e) == Some(METHOD_NOT_FOUND_CODE) => {
                info!("eth_requestAccounts not supported, falling back to eth_accounts");
                provider.get_accounts().await.map_err(connect_failure)?
            }
            Err(e) => return Err(connect_failure(e)),
        };

        let account = match accounts.first() {
            Some(account) => *account,
            None => {
                warn!("Node at {} exposed no accounts", self.rpc_url);
                return Err(SwapError::UserRejected);
            }
        };

        info!("Connected node account {}", account);
        let signer: SigningHandle = Arc::new(AlloyChainClient::new(
            provider.erased(),
            account,
            self.swap_contract,
        ));
        Ok((account, signer))
    }
}

/// Wallet backed by a local private key; transactions are signed in-process.
pub struct PrivateKeyWalletProvider {
    rpc_url: Url,
    swap_contract: Address,
    private_key: String,
}

impl PrivateKeyWalletProvider {
    pub fn new(rpc_url: Url, swap_contract: Address, private_key: String) -> Self {
        Self {
            rpc_url,
            swap_contract,
            private_key,
        }
    }
}

#[async_trait]
impl WalletProvider for PrivateKeyWalletProvider {
    async fn connect(&self) -> Result<(Address, SigningHandle), SwapError> {
        let key: PrivateKeySigner = self.private_key.trim().parse().map_err(|e| {
            warn!("Configured private key is unusable: {}", e);
            SwapError::WalletUnavailable
        })?;
        let account = key.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(key))
            .connect_http(self.rpc_url.clone());

        let chain_id = provider.get_chain_id().await.map_err(connect_failure)?;
        info!("Connected key account {} on chain {}", account, chain_id);

        let signer: SigningHandle = Arc::new(AlloyChainClient::new(
            provider.erased(),
            account,
            self.swap_contract,
        ));
        Ok((account, signer))
    }
}

fn error_code(err: &RpcError<TransportErrorKind>) -> Option<i64> {
    err.as_error_resp().map(|payload| payload.code)
}

/// Failures while connecting: a refusal from the wallet is `UserRejected`,
/// an endpoint that cannot be reached is `WalletUnavailable`.
pub fn connect_failure(err: RpcError<TransportErrorKind>) -> SwapError {
    match err.as_error_resp() {
        Some(payload) if payload.code == USER_REJECTED_CODE => SwapError::UserRejected,
        Some(payload) => SwapError::NetworkError(payload.message.to_string()),
        None => {
            warn!("Wallet endpoint unreachable: {}", err);
            SwapError::WalletUnavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;

    fn response(code: i64, message: &'static str) -> RpcError<TransportErrorKind> {
        RpcError::ErrorResp(ErrorPayload {
            code,
            message: message.into(),
            data: None,
        })
    }

    #[test]
    fn rejection_and_unreachable_endpoint() {
        assert_eq!(
            connect_failure(response(USER_REJECTED_CODE, "User rejected the request.")),
            SwapError::UserRejected
        );
        assert_eq!(
            connect_failure(TransportErrorKind::custom_str("connection refused")),
            SwapError::WalletUnavailable
        );
        assert_eq!(
            connect_failure(response(-32002, "Request already pending")),
            SwapError::NetworkError("Request already pending".to_string())
        );
    }

    #[tokio::test]
    async fn malformed_private_key_is_unavailable() {
        let provider = PrivateKeyWalletProvider::new(
            "http://127.0.0.1:1".parse().unwrap(),
            Address::ZERO,
            "not-a-key".to_string(),
        );

        assert_eq!(
            provider.connect().await.err(),
            Some(SwapError::WalletUnavailable)
        );
    }

    #[test]
    fn method_not_found_is_detected() {
        assert_eq!(
            error_code(&response(METHOD_NOT_FOUND_CODE, "Method not found")),
            Some(METHOD_NOT_FOUND_CODE)
        );
        assert_eq!(
            error_code(&TransportErrorKind::custom_str("timeout")),
            None
        );
    }
}
