pub mod swap_presenter;
pub mod wallet_presenter;
