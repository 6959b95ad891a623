//! Account record types.

use {
    chrono::{DateTime, Utc},
    telegate_mtproto::{ApiCredentials, SessionBlob},
};

/// Connectivity status derived from the stored flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Online,
    Offline,
}

impl AccountStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

/// A stored Telegram account record, owned by exactly one user.
///
/// The session blob is set and cleared only by the session layer; everything
/// else is plain CRUD data. The (owner, phone) pair is unique per store.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub phone: String,
    pub credentials: ApiCredentials,
    pub session: Option<SessionBlob>,
    pub name: Option<String>,
    pub connected: bool,
    pub last_activity: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    #[must_use]
    pub fn status(&self) -> AccountStatus {
        if self.connected {
            AccountStatus::Online
        } else {
            AccountStatus::Offline
        }
    }

    /// Refresh the last-activity marker; called on every state change.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.last_activity = Some(now);
        self.updated_at = now;
    }
}

/// Payload for creating an account record.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: i64,
    pub phone: String,
    pub credentials: ApiCredentials,
    pub name: Option<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub phone: Option<String>,
    pub credentials: Option<ApiCredentials>,
    pub name: Option<Option<String>>,
}
