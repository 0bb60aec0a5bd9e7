pub mod client;
pub mod contracts;
pub mod errors;
pub mod units;
pub mod wallet;

pub use client::{wait_for_confirmation, AlloyChainClient, ChainClient, ConfirmationPolicy};
pub use wallet::{NodeWalletProvider, PrivateKeyWalletProvider, WalletProvider};
