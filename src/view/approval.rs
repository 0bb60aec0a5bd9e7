use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;
use uuid::Uuid;

const CALLBACK_PREFIX: &str = "approve";

/// Approval prompts waiting for a button press, keyed by prompt id.
#[derive(Default)]
pub struct ApprovalRegistry {
    pending: Mutex<HashMap<Uuid, oneshot::Sender<bool>>>,
}

impl ApprovalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self) -> (Uuid, oneshot::Receiver<bool>) {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.pending().insert(id, tx);
        (id, rx)
    }

    /// Deliver an answer. Returns false when the prompt is unknown or expired.
    pub fn resolve(&self, id: Uuid, approved: bool) -> bool {
        match self.pending().remove(&id) {
            Some(tx) => tx.send(approved).is_ok(),
            None => false,
        }
    }

    pub fn discard(&self, id: Uuid) {
        self.pending().remove(&id);
    }

    pub fn len(&self) -> usize {
        self.pending().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<Uuid, oneshot::Sender<bool>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub fn approval_callback(id: Uuid, approved: bool) -> String {
    let answer = if approved { "yes" } else { "no" };
    format!("{}:{}:{}", CALLBACK_PREFIX, answer, id)
}

pub fn parse_approval_callback(data: &str) -> Option<(Uuid, bool)> {
    let mut parts = data.splitn(3, ':');
    if parts.next()? != CALLBACK_PREFIX {
        return None;
    }
    let approved = match parts.next()? {
        "yes" => true,
        "no" => false,
        _ => return None,
    };
    let id = Uuid::parse_str(parts.next()?).ok()?;
    Some((id, approved))
}
