//! Persistence-bridge traits consumed by the session layer.

use {async_trait::async_trait, telegate_mtproto::SessionBlob};

use crate::{
    error::Result,
    model::{Account, AccountPatch, NewAccount},
};

/// CRUD plus session mutators for account records.
///
/// Reads are keyed by (owner id, account id) so ownership checks live inside
/// the store; the session mutators are keyed by account id alone because the
/// session layer has already resolved the account when it calls them.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create a record, enforcing (owner, phone) uniqueness.
    async fn create(&self, account: NewAccount) -> Result<Account>;

    /// Fetch one account owned by `user_id`.
    async fn get(&self, user_id: i64, account_id: i64) -> Result<Account>;

    /// List a user's accounts with offset/limit pagination.
    async fn list(&self, user_id: i64, skip: usize, limit: usize) -> Result<Vec<Account>>;

    /// Apply a partial update.
    async fn update(&self, user_id: i64, account_id: i64, patch: AccountPatch) -> Result<Account>;

    /// Delete the record. The caller is responsible for tearing down any
    /// live connection for the account.
    async fn delete(&self, user_id: i64, account_id: i64) -> Result<()>;

    /// Store a freshly exported session blob and mark the account connected.
    async fn update_session(&self, account_id: i64, session: SessionBlob) -> Result<()>;

    /// Drop the stored session blob and mark the account disconnected.
    async fn clear_session(&self, account_id: i64) -> Result<()>;

    /// Flip the connectivity flag without touching the session blob.
    async fn set_connected(&self, account_id: i64, connected: bool) -> Result<()>;
}

/// Minimal user lookup: the session layer only needs to know whether the
/// requesting user is still active.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn is_active(&self, user_id: i64) -> Result<bool>;
}
