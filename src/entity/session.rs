use alloy::primitives::Address;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{SwapError, SwapForm};
use crate::evm::client::ChainClient;

/// Handle through which every read and transaction of a connected wallet goes.
pub type SigningHandle = Arc<dyn ChainClient>;

/// Connection state of one wallet.
///
/// Account and signer are set together when a connection succeeds and are
/// never cleared; reconnecting produces a fresh `Session` that inherits the
/// chat's in-flight swap flag.
pub struct Session {
    account: Option<Address>,
    signer: Option<SigningHandle>,
    decimals: Mutex<HashMap<String, u8>>,
    swap_in_flight: Arc<AtomicBool>,
}

impl Session {
    pub fn disconnected() -> Self {
        Self {
            account: None,
            signer: None,
            decimals: Mutex::new(HashMap::new()),
            swap_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn connected(account: Address, signer: SigningHandle) -> Self {
        Self {
            account: Some(account),
            signer: Some(signer),
            ..Self::disconnected()
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some() && self.signer.is_some()
    }

    /// Account and signing handle, or `WalletUnavailable` before `/connect`.
    pub fn signer(&self) -> Result<(Address, &SigningHandle), SwapError> {
        match (self.account, self.signer.as_ref()) {
            (Some(account), Some(signer)) => Ok((account, signer)),
            _ => Err(SwapError::WalletUnavailable),
        }
    }

    pub fn cached_decimals(&self, symbol: &str) -> Option<u8> {
        self.decimals_cache().get(symbol).copied()
    }

    pub fn cache_decimals(&self, symbol: &str, decimals: u8) {
        self.decimals_cache().insert(symbol.to_string(), decimals);
    }

    /// Claim the session for one swap attempt. The claim is released when the
    /// returned guard is dropped.
    pub fn try_begin_swap(&self) -> Result<SwapGuard<'_>, SwapError> {
        self.swap_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SwapError::SwapInProgress)?;
        Ok(SwapGuard { session: self })
    }

    pub fn swap_in_flight(&self) -> bool {
        self.swap_in_flight.load(Ordering::Acquire)
    }

    fn decimals_cache(&self) -> MutexGuard<'_, HashMap<String, u8>> {
        self.decimals.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::disconnected()
    }
}

pub struct SwapGuard<'a> {
    session: &'a Session,
}

impl Drop for SwapGuard<'_> {
    fn drop(&mut self) {
        self.session.swap_in_flight.store(false, Ordering::Release);
    }
}

struct ChatState {
    session: Arc<Session>,
    form: SwapForm,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            session: Arc::new(Session::disconnected()),
            form: SwapForm::default(),
        }
    }
}

/// Per-chat sessions and form fields, kept in memory only.
#[derive(Default)]
pub struct SessionStore {
    chats: Mutex<HashMap<i64, ChatState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, chat_id: i64) -> Arc<Session> {
        self.chats().entry(chat_id).or_default().session.clone()
    }

    /// Install a new session for the chat. A swap still running on the old
    /// session keeps blocking swaps on the new one.
    pub fn replace_session(&self, chat_id: i64, mut session: Session) -> Arc<Session> {
        let mut chats = self.chats();
        let chat = chats.entry(chat_id).or_default();
        session.swap_in_flight = chat.session.swap_in_flight.clone();
        let session = Arc::new(session);
        chat.session = session.clone();
        session
    }

    pub fn form(&self, chat_id: i64) -> SwapForm {
        self.chats().entry(chat_id).or_default().form.clone()
    }

    pub fn update_form<F>(&self, chat_id: i64, update: F) -> SwapForm
    where
        F: FnOnce(&mut SwapForm),
    {
        let mut chats = self.chats();
        let form = &mut chats.entry(chat_id).or_default().form;
        update(form);
        form.clone()
    }

    fn chats(&self) -> MutexGuard<'_, HashMap<i64, ChatState>> {
        self.chats.lock().unwrap_or_else(|e| e.into_inner())
    }
}
