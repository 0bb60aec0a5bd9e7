use alloy::primitives::{Address, TxHash, U256};

/// A transaction that has been accepted by the provider but not yet mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TxHash,
}

/// `Swap` event emitted by the swap contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapEvent {
    pub user: Address,
    pub from_token: Address,
    pub to_token: Address,
    pub amount_in: U256,
    pub amount_out: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTransaction {
    pub hash: TxHash,
    pub block_number: Option<u64>,
    pub swap_event: Option<SwapEvent>,
}

/// Result of a single status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    Confirmed(ConfirmedTransaction),
    Failed(String),
}
