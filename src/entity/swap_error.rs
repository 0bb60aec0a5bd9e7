use alloy::primitives::{TxHash, U256};

/// Every way a user action against the swap contract can end early.
///
/// Nothing here is fatal to the process: an error ends the current attempt and
/// leaves the session intact for a retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwapError {
    #[error("Wallet is not connected or no wallet provider is available")]
    WalletUnavailable,

    #[error("Wallet connection was rejected")]
    UserRejected,

    #[error("Exchange rate not set for {from} -> {to}")]
    RateNotSet { from: String, to: String },

    #[error("Insufficient allowance for {token}")]
    InsufficientAllowance { token: String },

    #[error("Insufficient {token} balance: required {required}, available {available}")]
    InsufficientBalance {
        token: String,
        required: U256,
        available: U256,
    },

    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Select both tokens and enter an amount first")]
    IncompleteIntent,

    #[error("Another swap is already in progress for this wallet")]
    SwapInProgress,

    #[error("Transaction {0} was not confirmed in time")]
    ConfirmationTimeout(TxHash),
}

impl SwapError {
    /// Short machine-friendly tag, used in logs and as the failure reason of a
    /// swap attempt.
    pub fn tag(&self) -> &'static str {
        match self {
            SwapError::WalletUnavailable => "wallet_unavailable",
            SwapError::UserRejected => "user_rejected",
            SwapError::RateNotSet { .. } => "rate_not_set",
            SwapError::InsufficientAllowance { .. } => "insufficient_allowance",
            SwapError::InsufficientBalance { .. } => "insufficient_balance",
            SwapError::TransactionReverted(_) => "transaction_reverted",
            SwapError::NetworkError(_) => "network_error",
            SwapError::UnknownToken(_) => "unknown_token",
            SwapError::InvalidAmount(_) => "invalid_amount",
            SwapError::IncompleteIntent => "incomplete_intent",
            SwapError::SwapInProgress => "swap_in_progress",
            SwapError::ConfirmationTimeout(_) => "confirmation_timeout",
        }
    }
}
