pub mod swap_interactor;
pub mod wallet_interactor;
