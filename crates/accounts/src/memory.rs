//! In-memory reference stores.
//!
//! Back the demo CLI and the test suites; a relational implementation plugs
//! in behind the same traits without the session layer noticing.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicI64, Ordering},
};

use {
    async_trait::async_trait,
    chrono::Utc,
    telegate_mtproto::SessionBlob,
    tokio::sync::RwLock,
};

use crate::{
    error::{Error, Result},
    model::{Account, AccountPatch, NewAccount},
    store::{AccountStore, UserStore},
};

/// Hash-map backed [`AccountStore`].
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<i64, Account>>,
    next_id: AtomicI64,
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.user_id == account.user_id && a.phone == account.phone)
        {
            return Err(Error::already_exists(account.phone));
        }

        let now = Utc::now();
        let record = Account {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id: account.user_id,
            phone: account.phone,
            credentials: account.credentials,
            session: None,
            name: account.name,
            connected: false,
            last_activity: None,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, user_id: i64, account_id: i64) -> Result<Account> {
        let accounts = self.accounts.read().await;
        accounts
            .get(&account_id)
            .filter(|a| a.user_id == user_id)
            .cloned()
            .ok_or(Error::AccountNotFound)
    }

    async fn list(&self, user_id: i64, skip: usize, limit: usize) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        let mut owned: Vec<Account> = accounts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by_key(|a| a.id);
        Ok(owned.into_iter().skip(skip).take(limit).collect())
    }

    async fn update(&self, user_id: i64, account_id: i64, patch: AccountPatch) -> Result<Account> {
        let mut accounts = self.accounts.write().await;

        if let Some(phone) = &patch.phone {
            if accounts
                .values()
                .any(|a| a.id != account_id && a.user_id == user_id && &a.phone == phone)
            {
                return Err(Error::already_exists(phone.clone()));
            }
        }

        let account = accounts
            .get_mut(&account_id)
            .filter(|a| a.user_id == user_id)
            .ok_or(Error::AccountNotFound)?;

        if let Some(phone) = patch.phone {
            account.phone = phone;
        }
        if let Some(credentials) = patch.credentials {
            account.credentials = credentials;
        }
        if let Some(name) = patch.name {
            account.name = name;
        }
        account.touch();
        Ok(account.clone())
    }

    async fn delete(&self, user_id: i64, account_id: i64) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        match accounts.get(&account_id) {
            Some(a) if a.user_id == user_id => {
                accounts.remove(&account_id);
                Ok(())
            }
            _ => Err(Error::AccountNotFound),
        }
    }

    async fn update_session(&self, account_id: i64, session: SessionBlob) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&account_id).ok_or(Error::AccountNotFound)?;
        account.session = Some(session);
        account.connected = true;
        account.touch();
        Ok(())
    }

    async fn clear_session(&self, account_id: i64) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&account_id).ok_or(Error::AccountNotFound)?;
        account.session = None;
        account.connected = false;
        account.touch();
        Ok(())
    }

    async fn set_connected(&self, account_id: i64, connected: bool) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&account_id).ok_or(Error::AccountNotFound)?;
        account.connected = connected;
        account.touch();
        Ok(())
    }
}

/// Hash-map backed [`UserStore`].
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<i64, bool>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user record with the given active flag.
    pub async fn insert(&self, user_id: i64, active: bool) {
        self.users.write().await.insert(user_id, active);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn is_active(&self, user_id: i64) -> Result<bool> {
        let users = self.users.read().await;
        users.get(&user_id).copied().ok_or(Error::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, telegate_mtproto::ApiCredentials};

    fn new_account(user_id: i64, phone: &str) -> NewAccount {
        NewAccount {
            user_id,
            phone: phone.into(),
            credentials: ApiCredentials::new(12345, "0123456789abcdef"),
            name: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryAccountStore::new();
        let a = store.create(new_account(1, "+10000000001")).await.unwrap();
        let b = store.create(new_account(1, "+10000000002")).await.unwrap();
        assert!(b.id > a.id);
        assert!(!a.connected);
        assert!(a.session.is_none());
    }

    #[tokio::test]
    async fn duplicate_phone_same_owner_is_rejected() {
        let store = MemoryAccountStore::new();
        store.create(new_account(1, "+10000000001")).await.unwrap();
        let err = store
            .create(new_account(1, "+10000000001"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ACCOUNT_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn same_phone_different_owner_is_allowed() {
        let store = MemoryAccountStore::new();
        store.create(new_account(1, "+10000000001")).await.unwrap();
        assert!(store.create(new_account(2, "+10000000001")).await.is_ok());
    }

    #[tokio::test]
    async fn get_enforces_ownership() {
        let store = MemoryAccountStore::new();
        let account = store.create(new_account(1, "+10000000001")).await.unwrap();
        assert!(store.get(1, account.id).await.is_ok());
        let err = store.get(2, account.id).await.unwrap_err();
        assert_eq!(err.code(), "ACCOUNT_NOT_FOUND");
    }

    #[tokio::test]
    async fn list_paginates_in_id_order() {
        let store = MemoryAccountStore::new();
        for i in 0..5 {
            store
                .create(new_account(1, &format!("+1000000000{i}")))
                .await
                .unwrap();
        }
        store.create(new_account(2, "+19999999999")).await.unwrap();

        let page = store.list(1, 1, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(page[0].id < page[1].id);
        assert!(page.iter().all(|a| a.user_id == 1));
    }

    #[tokio::test]
    async fn update_session_sets_blob_and_connects() {
        let store = MemoryAccountStore::new();
        let account = store.create(new_account(1, "+10000000001")).await.unwrap();

        store
            .update_session(account.id, SessionBlob::new("blob-1"))
            .await
            .unwrap();
        let reloaded = store.get(1, account.id).await.unwrap();
        assert!(reloaded.connected);
        assert_eq!(reloaded.session, Some(SessionBlob::new("blob-1")));
        assert!(reloaded.last_activity.is_some());
    }

    #[tokio::test]
    async fn clear_session_drops_blob_and_disconnects() {
        let store = MemoryAccountStore::new();
        let account = store.create(new_account(1, "+10000000001")).await.unwrap();
        store
            .update_session(account.id, SessionBlob::new("blob-1"))
            .await
            .unwrap();

        store.clear_session(account.id).await.unwrap();
        let reloaded = store.get(1, account.id).await.unwrap();
        assert!(!reloaded.connected);
        assert!(reloaded.session.is_none());
    }

    #[tokio::test]
    async fn set_connected_leaves_session_untouched() {
        let store = MemoryAccountStore::new();
        let account = store.create(new_account(1, "+10000000001")).await.unwrap();
        store
            .update_session(account.id, SessionBlob::new("blob-1"))
            .await
            .unwrap();

        store.set_connected(account.id, false).await.unwrap();
        let reloaded = store.get(1, account.id).await.unwrap();
        assert!(!reloaded.connected);
        assert_eq!(reloaded.session, Some(SessionBlob::new("blob-1")));
    }

    #[tokio::test]
    async fn update_patch_respects_uniqueness() {
        let store = MemoryAccountStore::new();
        store.create(new_account(1, "+10000000001")).await.unwrap();
        let b = store.create(new_account(1, "+10000000002")).await.unwrap();

        let err = store
            .update(
                1,
                b.id,
                AccountPatch {
                    phone: Some("+10000000001".into()),
                    ..AccountPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ACCOUNT_ALREADY_EXISTS");

        let renamed = store
            .update(
                1,
                b.id,
                AccountPatch {
                    name: Some(Some("work".into())),
                    ..AccountPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name.as_deref(), Some("work"));
    }

    #[tokio::test]
    async fn user_store_tracks_active_flag() {
        let users = MemoryUserStore::new();
        users.insert(1, true).await;
        users.insert(2, false).await;

        assert!(users.is_active(1).await.unwrap());
        assert!(!users.is_active(2).await.unwrap());
        assert!(matches!(
            users.is_active(99).await.unwrap_err(),
            Error::UserNotFound
        ));
    }
}
