use alloy::primitives::{TxHash, U256};
use chrono::{DateTime, Utc};

use super::ExchangeRate;

/// Stages of one swap attempt. `Confirmed` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapStage {
    Idle,
    RateChecked,
    AllowanceChecked,
    BalanceChecked,
    Submitted(TxHash),
    Confirmed,
    Failed(&'static str),
}

impl std::fmt::Display for SwapStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapStage::Idle => write!(f, "IDLE"),
            SwapStage::RateChecked => write!(f, "RATE_CHECKED"),
            SwapStage::AllowanceChecked => write!(f, "ALLOWANCE_CHECKED"),
            SwapStage::BalanceChecked => write!(f, "BALANCE_CHECKED"),
            SwapStage::Submitted(hash) => write!(f, "SUBMITTED({})", hash),
            SwapStage::Confirmed => write!(f, "CONFIRMED"),
            SwapStage::Failed(reason) => write!(f, "FAILED({})", reason),
        }
    }
}

/// What `ensure_allowance` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowanceOutcome {
    AlreadySufficient,
    Approved(TxHash),
}

/// Outcome of a confirmed swap, as shown to the user.
#[derive(Debug, Clone)]
pub struct SwapReceipt {
    pub source_token: String,
    pub target_token: String,
    pub amount_in: U256,
    pub amount_in_display: String,
    pub amount_out: Option<U256>,
    pub amount_out_display: Option<String>,
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub rate: ExchangeRate,
    pub stages: Vec<SwapStage>,
    pub confirmed_at: DateTime<Utc>,
}
