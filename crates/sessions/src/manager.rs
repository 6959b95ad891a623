//! The authentication state machine.
//!
//! [`SessionManager`] owns the full per-account lifecycle: connect,
//! verify-code, verify-password, disconnect, logout, the authorized read
//! paths, and process-shutdown drain. All collaborators are injected at
//! construction and shared via `Arc`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use {
    telegate_accounts::{Account, AccountStore, UserStore},
    telegate_mtproto::{ClientHandle, Connector, DialogsQuery, SignIn},
    telegate_projections::{
        DialogsPage, Folder, Profile, project_dialogs, project_folders, project_profile,
    },
};

use crate::{
    error::{AuthError, ServiceError},
    registry::{AuthStage, SessionRegistry},
    status::{CodeOutcome, ConnectOutcome, DisconnectOutcome, LogoutOutcome, PasswordOutcome},
};

/// Per-account session lifecycle service.
pub struct SessionManager {
    registry: Arc<SessionRegistry>,
    connector: Arc<dyn Connector>,
    accounts: Arc<dyn AccountStore>,
    users: Arc<dyn UserStore>,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        registry: Arc<SessionRegistry>,
        connector: Arc<dyn Connector>,
        accounts: Arc<dyn AccountStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            registry,
            connector,
            accounts,
            users,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Resolve the account after confirming the requesting user is active.
    async fn load_account(&self, user_id: i64, account_id: i64) -> Result<Account, ServiceError> {
        if !self.users.is_active(user_id).await? {
            return Err(ServiceError::UserInactive);
        }
        Ok(self.accounts.get(user_id, account_id).await?)
    }

    /// Begin connecting an account.
    ///
    /// Resumes from the stored session blob when present; otherwise starts a
    /// fresh anonymous session and requests a verification code.
    pub async fn connect(
        &self,
        user_id: i64,
        account_id: i64,
    ) -> Result<ConnectOutcome, ServiceError> {
        let account = self.load_account(user_id, account_id).await?;
        let lock = self.registry.lock_for(account_id);
        let _guard = lock.lock().await;

        if self.registry.contains(account_id) {
            return Err(AuthError::AlreadyConnected.into());
        }

        debug!(account_id, resuming = account.session.is_some(), "connecting");
        let handle = self
            .connector
            .connect(account_id, &account.credentials, account.session.as_ref())
            .await
            .map_err(AuthError::from)?;

        if handle.is_authorized().await.map_err(AuthError::from)? {
            if !self.registry.insert(account_id, Arc::clone(&handle)) {
                // Unreachable while the account lock is held.
                return Err(AuthError::AlreadyConnected.into());
            }
            if let Err(e) = self.accounts.set_connected(account_id, true).await {
                warn!(account_id, error = %e, "failed to persist connected status");
            }
            info!(account_id, "session resumed; already authorized");
            return Ok(ConnectOutcome::Online);
        }

        // Fresh or invalidated session: start the interactive flow. Sending
        // the code can fail (bad phone, flood wait); close the half-open
        // connection then so a corrected retry does not hit
        // ALREADY_CONNECTED.
        match handle.request_code(&account.phone).await {
            Ok(token) => {
                if !self.registry.insert(account_id, Arc::clone(&handle)) {
                    return Err(AuthError::AlreadyConnected.into());
                }
                self.registry.set_pending_auth(account_id, token);
                info!(account_id, "verification code sent");
                Ok(ConnectOutcome::CodeRequired)
            }
            Err(e) => {
                if let Err(close_err) = handle.close().await {
                    debug!(account_id, error = %close_err, "error closing half-open connection");
                }
                Err(AuthError::from(e).into())
            }
        }
    }

    /// Submit the verification code for an in-flight authentication.
    pub async fn verify_code(
        &self,
        user_id: i64,
        account_id: i64,
        code: &str,
    ) -> Result<CodeOutcome, ServiceError> {
        self.load_account(user_id, account_id).await?;
        let lock = self.registry.lock_for(account_id);
        let _guard = lock.lock().await;

        let handle = self
            .registry
            .get(account_id)
            .ok_or(AuthError::NotConnected)?;
        let token = self.registry.code_token(account_id).ok_or_else(|| {
            AuthError::remote("no verification code was requested for this account")
        })?;

        match handle.sign_in(&token, code).await {
            Ok(SignIn::Authorized) => {
                let session = handle.export_session().await.map_err(AuthError::from)?;
                self.accounts.update_session(account_id, session).await?;
                self.registry.clear_pending_auth(account_id);
                info!(account_id, "code accepted; session authorized");
                Ok(CodeOutcome::Connected)
            }
            Ok(SignIn::PasswordRequired) => {
                // The hint is a courtesy; failing to fetch it must not fail
                // the step.
                let password_hint = match handle.password_hint().await {
                    Ok(hint) => hint,
                    Err(e) => {
                        warn!(account_id, error = %e, "password hint lookup failed");
                        None
                    }
                };
                self.registry
                    .advance_to_password(account_id, password_hint.clone());
                info!(account_id, "two-factor password required");
                Ok(CodeOutcome::PasswordRequired { password_hint })
            }
            Err(e) => {
                let err = AuthError::from(e);
                if matches!(err, AuthError::ExpiredCode) {
                    // A lapsed code cannot be retried; require a fresh
                    // connect/send-code cycle rather than leaving stale
                    // correlation state behind.
                    self.registry.clear_pending_auth(account_id);
                }
                Err(err.into())
            }
        }
    }

    /// Complete a two-factor authentication.
    pub async fn verify_password(
        &self,
        user_id: i64,
        account_id: i64,
        password: &str,
    ) -> Result<PasswordOutcome, ServiceError> {
        self.load_account(user_id, account_id).await?;
        let lock = self.registry.lock_for(account_id);
        let _guard = lock.lock().await;

        let handle = self
            .registry
            .get(account_id)
            .ok_or(AuthError::NotConnected)?;

        // Registry stage decides "wrong step" — never the shape of an error
        // message. Without a successful verify_code there is nothing to
        // submit a password to.
        if self.registry.pending_stage(account_id) != Some(AuthStage::PasswordNeeded) {
            return Err(AuthError::NotConnected.into());
        }

        handle
            .check_password(password)
            .await
            .map_err(AuthError::from)?;

        let session = handle.export_session().await.map_err(AuthError::from)?;
        self.accounts.update_session(account_id, session).await?;
        self.registry.clear_pending_auth(account_id);
        info!(account_id, "two-factor password accepted; session authorized");
        Ok(PasswordOutcome::Online)
    }

    /// Close the connection but keep the stored session blob, so a later
    /// `connect` can resume without re-authentication.
    pub async fn disconnect(
        &self,
        user_id: i64,
        account_id: i64,
    ) -> Result<DisconnectOutcome, ServiceError> {
        self.load_account(user_id, account_id).await?;
        let lock = self.registry.lock_for(account_id);
        let _guard = lock.lock().await;

        let handle = self
            .registry
            .remove(account_id)
            .ok_or(AuthError::NotConnected)?;

        if let Err(e) = handle.close().await {
            warn!(account_id, error = %e, "error closing connection during disconnect");
        }
        if let Err(e) = self.accounts.set_connected(account_id, false).await {
            warn!(account_id, error = %e, "failed to persist disconnected status");
        }
        info!(account_id, "disconnected; stored session retained");
        Ok(DisconnectOutcome::Disconnected)
    }

    /// Invalidate the session remotely (best-effort) and clear all local
    /// state. Never fails once the account is resolved: after this call the
    /// account is logged out as far as this service is concerned.
    pub async fn logout(
        &self,
        user_id: i64,
        account_id: i64,
    ) -> Result<LogoutOutcome, ServiceError> {
        self.load_account(user_id, account_id).await?;
        let lock = self.registry.lock_for(account_id);
        let _guard = lock.lock().await;

        if let Some(handle) = self.registry.remove(account_id) {
            if let Err(e) = handle.sign_out().await {
                warn!(account_id, error = %e, "remote sign-out failed; clearing local state anyway");
            }
            if let Err(e) = handle.close().await {
                debug!(account_id, error = %e, "error closing connection during logout");
            }
        }
        self.registry.clear_pending_auth(account_id);
        if let Err(e) = self.accounts.clear_session(account_id).await {
            warn!(account_id, error = %e, "failed to clear stored session");
        }
        info!(account_id, "logged out");
        Ok(LogoutOutcome::LoggedOut)
    }

    /// Fetch a live, authorized handle for the read paths.
    ///
    /// Reads deliberately skip the account lock; a disconnect or logout
    /// racing underneath surfaces as `NOT_CONNECTED`, never a crash.
    async fn authorized_handle(
        &self,
        account_id: i64,
    ) -> Result<Arc<dyn ClientHandle>, ServiceError> {
        let handle = self
            .registry
            .get(account_id)
            .ok_or(AuthError::NotConnected)?;
        if !handle.is_authorized().await.map_err(AuthError::from)? {
            return Err(AuthError::NotConnected.into());
        }
        Ok(handle)
    }

    /// The account's own profile.
    pub async fn profile(&self, user_id: i64, account_id: i64) -> Result<Profile, ServiceError> {
        self.load_account(user_id, account_id).await?;
        let handle = self.authorized_handle(account_id).await?;
        let me = handle.me().await.map_err(AuthError::from)?;
        Ok(project_profile(&me))
    }

    /// A page of the account's dialogs.
    pub async fn dialogs(
        &self,
        user_id: i64,
        account_id: i64,
        query: DialogsQuery,
    ) -> Result<DialogsPage, ServiceError> {
        self.load_account(user_id, account_id).await?;
        let handle = self.authorized_handle(account_id).await?;
        let raw = handle.dialogs(&query).await.map_err(AuthError::from)?;
        Ok(project_dialogs(&raw, query.limit, query.offset))
    }

    /// The account's dialog folders, including the synthetic "All chats".
    pub async fn folders(&self, user_id: i64, account_id: i64) -> Result<Vec<Folder>, ServiceError> {
        self.load_account(user_id, account_id).await?;
        let handle = self.authorized_handle(account_id).await?;
        let raw = handle.dialog_filters().await.map_err(AuthError::from)?;
        Ok(project_folders(&raw))
    }

    /// Close every live connection and clear the registry. Individual close
    /// failures are logged, never raised.
    pub async fn shutdown(&self) {
        let handles = self.registry.drain();
        info!(count = handles.len(), "draining live connections");
        for (account_id, handle) in handles {
            if let Err(e) = handle.close().await {
                warn!(account_id, error = %e, "error closing connection during shutdown");
            }
        }
    }
}
