pub mod approval;
pub mod swap_view;
pub mod wallet_view;
