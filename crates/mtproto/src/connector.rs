//! Connector and client-handle traits.
//!
//! The session layer drives authentication and reads exclusively through
//! these traits; swapping the MTProto library, or standing in a scripted
//! double for tests, means implementing them and nothing else.

use std::{any::Any, fmt, sync::Arc};

use {async_trait::async_trait, secrecy::SecretString};

use crate::{
    entities::{RawDialog, RawDialogFilter, RawUser},
    error::Result,
};

/// Telegram API credential pair for one account.
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_id: i32,
    pub api_hash: SecretString,
}

impl ApiCredentials {
    #[must_use]
    pub fn new(api_id: i32, api_hash: impl Into<String>) -> Self {
        Self {
            api_id,
            api_hash: SecretString::new(api_hash.into()),
        }
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // api_hash is a secret; never include it.
        f.debug_struct("ApiCredentials")
            .field("api_id", &self.api_id)
            .finish_non_exhaustive()
    }
}

/// Opaque, exported session credential.
///
/// Allows resuming a previously authorized connection without a new
/// interactive login. Treated as a secret: `Debug` is redacted and the crate
/// never logs the contents.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionBlob(String);

impl SessionBlob {
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionBlob(…{} bytes)", self.0.len())
    }
}

/// Correlation token issued when a verification code is sent.
///
/// Wraps whatever the underlying library uses to tie a submitted code back
/// to the send-code request (Telegram's `phone_code_hash`). Opaque to the
/// session layer, which only stores it and hands it back to
/// [`ClientHandle::sign_in`].
pub struct CodeToken(Box<dyn Any + Send + Sync>);

impl CodeToken {
    #[must_use]
    pub fn new<T: Any + Send + Sync>(inner: T) -> Self {
        Self(Box::new(inner))
    }

    /// Recover the connector-specific payload. Returns `None` when the token
    /// was issued by a different connector implementation.
    #[must_use]
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for CodeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CodeToken(..)")
    }
}

/// Outcome of submitting a verification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignIn {
    /// The session is fully authorized.
    Authorized,
    /// The account has two-factor auth enabled; a password must follow.
    PasswordRequired,
}

/// Window and filter parameters for a dialogs fetch.
#[derive(Debug, Clone, Copy)]
pub struct DialogsQuery {
    pub limit: usize,
    pub offset: usize,
    /// Include archived dialogs (folder 1) in the result.
    pub archived: bool,
}

impl Default for DialogsQuery {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
            archived: false,
        }
    }
}

impl DialogsQuery {
    /// How many raw dialogs a connector needs to produce so the caller can
    /// slice the window and still detect whether more remain.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.offset.saturating_add(self.limit).saturating_add(1)
    }
}

/// Factory for live client connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a connection for `account_id`, resuming from a previously
    /// exported session blob when one is given, or starting a fresh
    /// anonymous session otherwise.
    async fn connect(
        &self,
        account_id: i64,
        credentials: &ApiCredentials,
        session: Option<&SessionBlob>,
    ) -> Result<Arc<dyn ClientHandle>>;
}

/// A live (or resumed) protocol session for one account.
#[async_trait]
pub trait ClientHandle: Send + Sync {
    /// Whether the connection already carries a valid authorization.
    async fn is_authorized(&self) -> Result<bool>;

    /// Ask Telegram to send a verification code to `phone`.
    async fn request_code(&self, phone: &str) -> Result<CodeToken>;

    /// Submit the received code together with its correlation token.
    async fn sign_in(&self, token: &CodeToken, code: &str) -> Result<SignIn>;

    /// Complete a two-factor login. Only valid after [`ClientHandle::sign_in`]
    /// returned [`SignIn::PasswordRequired`].
    async fn check_password(&self, password: &str) -> Result<()>;

    /// The account owner's 2FA password hint, when one is set. Only
    /// meaningful after [`SignIn::PasswordRequired`].
    async fn password_hint(&self) -> Result<Option<String>>;

    /// Export the current authorization as an opaque blob for persistence.
    async fn export_session(&self) -> Result<SessionBlob>;

    /// The authorized user's own profile.
    async fn me(&self) -> Result<RawUser>;

    /// Conversations visible to the account, newest first. Connectors apply
    /// the archive filter and fetch at least [`DialogsQuery::fetch_count`]
    /// entries when available; window slicing is the caller's job.
    async fn dialogs(&self, query: &DialogsQuery) -> Result<Vec<RawDialog>>;

    /// The account's configured dialog filters, excluding the implicit
    /// "all chats" folder.
    async fn dialog_filters(&self) -> Result<Vec<RawDialogFilter>>;

    /// Invalidate the authorization with Telegram (remote logout).
    async fn sign_out(&self) -> Result<()>;

    /// Close the underlying connection, leaving the authorization valid.
    async fn close(&self) -> Result<()>;
}
