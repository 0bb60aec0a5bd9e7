mod exchange_rate;
mod session;
mod state;
mod swap_error;
mod swap_intent;
mod swap_result;
mod token;
mod transaction;

pub use exchange_rate::ExchangeRate;
pub use session::{Session, SessionStore, SigningHandle, SwapGuard};
pub use state::State;
pub use swap_error::SwapError;
pub use swap_intent::{SwapForm, SwapIntent, TokenSide};
pub use swap_result::{AllowanceOutcome, SwapReceipt, SwapStage};
pub use token::{Token, TokenBalance, TokenRegistry, DEFAULT_DECIMALS};
pub use transaction::{ConfirmedTransaction, PendingTransaction, SwapEvent, TxStatus};
