//! Shared fixtures: a scripted connector double and a wired-up manager.

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicU32, Ordering},
};

use async_trait::async_trait;

use {
    telegate_accounts::{Account, AccountStore, MemoryAccountStore, MemoryUserStore, NewAccount},
    telegate_mtproto::{
        ApiCredentials, ClientHandle, CodeToken, Connector, DialogsQuery, Error, Result,
        SessionBlob, SignIn,
        entities::{RawDialog, RawDialogFilter, RawUser},
    },
    telegate_sessions::{SessionManager, SessionRegistry},
};

pub const USER_ID: i64 = 1;
pub const PHONE: &str = "+10000000001";
pub const CODE: &str = "13579";
pub const PASSWORD: &str = "hunter2";

/// Behavior knobs for the scripted connector.
#[derive(Clone)]
pub struct Script {
    /// RPC name the initial connect fails with.
    pub connect_error: Option<&'static str>,
    /// RPC name the send-code step fails with.
    pub send_code_error: Option<&'static str>,
    /// Whether a provided session blob resumes as an authorized session.
    pub resume_authorizes: bool,
    pub two_factor: bool,
    pub hint: Option<String>,
    pub hint_fails: bool,
    /// Every code submission reports `PHONE_CODE_EXPIRED`.
    pub code_expired: bool,
    pub sign_out_fails: bool,
    pub close_fails: bool,
    pub me: RawUser,
    pub dialogs: Vec<RawDialog>,
    pub filters: Vec<RawDialogFilter>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            connect_error: None,
            send_code_error: None,
            resume_authorizes: true,
            two_factor: false,
            hint: None,
            hint_fails: false,
            code_expired: false,
            sign_out_fails: false,
            close_fails: false,
            me: RawUser {
                id: 777,
                first_name: Some("Test".into()),
                phone: Some(PHONE.into()),
                ..RawUser::default()
            },
            dialogs: Vec::new(),
            filters: Vec::new(),
        }
    }
}

/// One scripted live connection.
pub struct FakeClient {
    script: Script,
    pub authorized: AtomicBool,
    pub closed: AtomicBool,
    pub signed_out: AtomicBool,
    password_pending: AtomicBool,
    exports: AtomicU32,
}

impl FakeClient {
    fn new(script: Script, authorized: bool) -> Self {
        Self {
            script,
            authorized: AtomicBool::new(authorized),
            closed: AtomicBool::new(false),
            signed_out: AtomicBool::new(false),
            password_pending: AtomicBool::new(false),
            exports: AtomicU32::new(0),
        }
    }
}

fn rpc_code(name: &str) -> i32 {
    if name.starts_with("FLOOD_WAIT") { 420 } else { 400 }
}

#[async_trait]
impl ClientHandle for FakeClient {
    async fn is_authorized(&self) -> Result<bool> {
        Ok(self.authorized.load(Ordering::SeqCst))
    }

    async fn request_code(&self, phone: &str) -> Result<CodeToken> {
        if let Some(name) = self.script.send_code_error {
            return Err(Error::rpc(rpc_code(name), name));
        }
        Ok(CodeToken::new(format!("hash:{phone}")))
    }

    async fn sign_in(&self, token: &CodeToken, code: &str) -> Result<SignIn> {
        let hash = token
            .downcast_ref::<String>()
            .ok_or_else(|| Error::client("foreign code token"))?;
        assert!(hash.starts_with("hash:"), "unexpected correlation token");

        if self.script.code_expired {
            return Err(Error::rpc(400, "PHONE_CODE_EXPIRED"));
        }
        if code != CODE {
            return Err(Error::rpc(400, "PHONE_CODE_INVALID"));
        }
        if self.script.two_factor {
            self.password_pending.store(true, Ordering::SeqCst);
            return Ok(SignIn::PasswordRequired);
        }
        self.authorized.store(true, Ordering::SeqCst);
        Ok(SignIn::Authorized)
    }

    async fn check_password(&self, password: &str) -> Result<()> {
        if !self.password_pending.load(Ordering::SeqCst) {
            return Err(Error::client("no pending two-factor challenge"));
        }
        if password != PASSWORD {
            return Err(Error::rpc(400, "PASSWORD_HASH_INVALID"));
        }
        self.password_pending.store(false, Ordering::SeqCst);
        self.authorized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn password_hint(&self) -> Result<Option<String>> {
        if self.script.hint_fails {
            return Err(Error::client("account.getPassword failed"));
        }
        Ok(self.script.hint.clone())
    }

    async fn export_session(&self) -> Result<SessionBlob> {
        let n = self.exports.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SessionBlob::new(format!("session-{n}")))
    }

    async fn me(&self) -> Result<RawUser> {
        Ok(self.script.me.clone())
    }

    async fn dialogs(&self, query: &DialogsQuery) -> Result<Vec<RawDialog>> {
        Ok(self
            .script
            .dialogs
            .iter()
            .filter(|d| query.archived || d.folder_id != Some(1))
            .take(query.fetch_count())
            .cloned()
            .collect())
    }

    async fn dialog_filters(&self) -> Result<Vec<RawDialogFilter>> {
        Ok(self.script.filters.clone())
    }

    async fn sign_out(&self) -> Result<()> {
        if self.script.sign_out_fails {
            return Err(Error::client("telegram unreachable"));
        }
        self.signed_out.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        if self.script.close_fails {
            return Err(Error::client("close failed"));
        }
        Ok(())
    }
}

/// Connector double producing [`FakeClient`] handles.
pub struct ScriptedConnector {
    script: Mutex<Script>,
    pub connects: AtomicU32,
    last: Mutex<Option<Arc<FakeClient>>>,
}

impl ScriptedConnector {
    pub fn new(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            connects: AtomicU32::new(0),
            last: Mutex::new(None),
        }
    }

    /// The most recently produced client, for state assertions.
    pub fn last_client(&self) -> Arc<FakeClient> {
        self.last
            .lock()
            .unwrap()
            .clone()
            .expect("no client was connected")
    }

    /// Adjust behavior for subsequent connects.
    pub fn rescript(&self, update: impl FnOnce(&mut Script)) {
        update(&mut self.script.lock().unwrap());
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(
        &self,
        _account_id: i64,
        _credentials: &ApiCredentials,
        session: Option<&SessionBlob>,
    ) -> Result<Arc<dyn ClientHandle>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap().clone();
        if let Some(name) = script.connect_error {
            return Err(Error::rpc(rpc_code(name), name));
        }

        let authorized = session.is_some() && script.resume_authorizes;
        let client = Arc::new(FakeClient::new(script, authorized));
        *self.last.lock().unwrap() = Some(Arc::clone(&client));
        Ok(client)
    }
}

/// A fully wired manager over in-memory stores and the scripted connector.
pub struct TestEnv {
    pub manager: SessionManager,
    pub registry: Arc<SessionRegistry>,
    pub connector: Arc<ScriptedConnector>,
    pub accounts: Arc<MemoryAccountStore>,
    pub users: Arc<MemoryUserStore>,
    pub account_id: i64,
}

impl TestEnv {
    pub async fn account(&self) -> Account {
        self.accounts.get(USER_ID, self.account_id).await.unwrap()
    }

    /// Simulate a process restart with a previously stored session: the blob
    /// is in the store, but no live handle exists.
    pub async fn seed_stored_session(&self, blob: &str) {
        self.accounts
            .update_session(self.account_id, SessionBlob::new(blob))
            .await
            .unwrap();
        self.accounts
            .set_connected(self.account_id, false)
            .await
            .unwrap();
    }
}

pub async fn env_with(script: Script) -> TestEnv {
    let accounts = Arc::new(MemoryAccountStore::new());
    let users = Arc::new(MemoryUserStore::new());
    users.insert(USER_ID, true).await;

    let account = accounts
        .create(NewAccount {
            user_id: USER_ID,
            phone: PHONE.into(),
            credentials: ApiCredentials::new(12345, "0123456789abcdef"),
            name: Some("primary".into()),
        })
        .await
        .unwrap();

    let registry = Arc::new(SessionRegistry::new());
    let connector = Arc::new(ScriptedConnector::new(script));
    let manager = SessionManager::new(
        Arc::clone(&registry),
        Arc::clone(&connector) as Arc<dyn Connector>,
        Arc::clone(&accounts) as Arc<dyn AccountStore>,
        Arc::clone(&users) as Arc<dyn telegate_accounts::UserStore>,
    );

    TestEnv {
        manager,
        registry,
        connector,
        accounts,
        users,
        account_id: account.id,
    }
}

pub async fn env() -> TestEnv {
    env_with(Script::default()).await
}

/// Add a second account for the same user, for cross-account isolation tests.
pub async fn add_account(env: &TestEnv, phone: &str) -> i64 {
    env.accounts
        .create(NewAccount {
            user_id: USER_ID,
            phone: phone.into(),
            credentials: ApiCredentials::new(12345, "0123456789abcdef"),
            name: None,
        })
        .await
        .unwrap()
        .id
}
