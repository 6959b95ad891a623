//! In-memory session registry.
//!
//! One authoritative map from account id to live client handle, plus the
//! per-account locks that serialize mutating operations and the in-flight
//! authentication state. Entirely rebuilt empty on process restart —
//! accounts then revert to "not connected" and resume from their stored
//! session blob on the next connect.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use {
    telegate_mtproto::{ClientHandle, CodeToken},
    tokio::sync::Mutex,
};

/// How far an in-flight authentication has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    /// A verification code was sent; waiting for `verify_code`.
    CodeSent,
    /// The code was accepted but 2FA is pending; waiting for
    /// `verify_password`.
    PasswordNeeded,
}

/// Correlation state for one account's in-flight authentication.
struct PendingAuth {
    token: Arc<CodeToken>,
    stage: AuthStage,
    password_hint: Option<String>,
}

/// Registry of live connections and pending authentications.
///
/// Interior maps use `std::sync::RwLock` and are never held across an
/// `.await`; the per-account mutexes are `tokio::sync::Mutex` because they
/// guard whole multi-step operations.
#[derive(Default)]
pub struct SessionRegistry {
    clients: RwLock<HashMap<i64, Arc<dyn ClientHandle>>>,
    locks: RwLock<HashMap<i64, Arc<Mutex<()>>>>,
    pending: RwLock<HashMap<i64, PendingAuth>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The per-account lock, created lazily on first use and retained for
    /// the life of the process. Account id space is bounded by stored rows,
    /// so entries are never evicted.
    #[must_use]
    pub fn lock_for(&self, account_id: i64) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().unwrap().get(&account_id) {
            return Arc::clone(lock);
        }
        let mut locks = self.locks.write().unwrap();
        Arc::clone(locks.entry(account_id).or_default())
    }

    #[must_use]
    pub fn contains(&self, account_id: i64) -> bool {
        self.clients.read().unwrap().contains_key(&account_id)
    }

    #[must_use]
    pub fn get(&self, account_id: i64) -> Option<Arc<dyn ClientHandle>> {
        self.clients.read().unwrap().get(&account_id).cloned()
    }

    /// Insert a handle only if the slot is free; returns whether the insert
    /// happened. Callers translate `false` into `ALREADY_CONNECTED`.
    #[must_use]
    pub fn insert(&self, account_id: i64, handle: Arc<dyn ClientHandle>) -> bool {
        let mut clients = self.clients.write().unwrap();
        match clients.entry(account_id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(handle);
                true
            }
        }
    }

    /// Remove and return the handle, if any.
    pub fn remove(&self, account_id: i64) -> Option<Arc<dyn ClientHandle>> {
        self.clients.write().unwrap().remove(&account_id)
    }

    /// Account ids with a live handle.
    #[must_use]
    pub fn connected_accounts(&self) -> Vec<i64> {
        self.clients.read().unwrap().keys().copied().collect()
    }

    /// Record a freshly issued code token; resets the stage to
    /// [`AuthStage::CodeSent`].
    pub fn set_pending_auth(&self, account_id: i64, token: CodeToken) {
        self.pending.write().unwrap().insert(
            account_id,
            PendingAuth {
                token: Arc::new(token),
                stage: AuthStage::CodeSent,
                password_hint: None,
            },
        );
    }

    /// Advance an in-flight authentication to the password stage, caching
    /// the best-effort hint alongside it.
    pub fn advance_to_password(&self, account_id: i64, password_hint: Option<String>) {
        if let Some(pending) = self.pending.write().unwrap().get_mut(&account_id) {
            pending.stage = AuthStage::PasswordNeeded;
            pending.password_hint = password_hint;
        }
    }

    #[must_use]
    pub fn pending_stage(&self, account_id: i64) -> Option<AuthStage> {
        self.pending
            .read()
            .unwrap()
            .get(&account_id)
            .map(|p| p.stage)
    }

    #[must_use]
    pub fn code_token(&self, account_id: i64) -> Option<Arc<CodeToken>> {
        self.pending
            .read()
            .unwrap()
            .get(&account_id)
            .map(|p| Arc::clone(&p.token))
    }

    #[must_use]
    pub fn password_hint(&self, account_id: i64) -> Option<String> {
        self.pending
            .read()
            .unwrap()
            .get(&account_id)
            .and_then(|p| p.password_hint.clone())
    }

    pub fn clear_pending_auth(&self, account_id: i64) {
        self.pending.write().unwrap().remove(&account_id);
    }

    /// Remove every handle and all pending state, returning the handles so
    /// shutdown can close them. The registry is empty afterwards regardless
    /// of what the caller does with them.
    pub fn drain(&self) -> Vec<(i64, Arc<dyn ClientHandle>)> {
        self.pending.write().unwrap().clear();
        self.clients.write().unwrap().drain().collect()
    }
}
