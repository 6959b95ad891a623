//! Caller-facing error taxonomy.
//!
//! Client-library failures are translated here, at exactly one boundary
//! (`From<telegate_mtproto::Error>`), into a closed set of codes. Raw RPC
//! names are matched structurally — never by inspecting error message text —
//! and anything unrecognized degrades to `REMOTE_ERROR` with the original
//! diagnostic preserved.

use std::time::Duration;

use thiserror::Error;

use telegate_mtproto::Error as MtprotoError;

/// Authentication state machine errors, one per external error code.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The registry already holds a live handle for this account.
    #[error("client already connected for this account")]
    AlreadyConnected,

    /// Telegram rejected the api_id/api_hash pair.
    #[error("invalid api_id/api_hash")]
    InvalidApiCredentials,

    /// Telegram rejected the account's phone number.
    #[error("invalid phone number")]
    PhoneNumberInvalid,

    /// Rate limited; the caller must not retry before `retry_after`.
    #[error("flood wait: retry after {retry_after:?}")]
    FloodWait { retry_after: Duration },

    /// The submitted verification code was wrong.
    #[error("invalid verification code")]
    InvalidCode,

    /// The verification code lapsed; a fresh connect cycle is required.
    #[error("verification code expired")]
    ExpiredCode,

    /// The submitted two-factor password was wrong.
    #[error("invalid two-factor password")]
    InvalidPassword,

    /// No live (or no authorized) connection for this account.
    #[error("no active connection for this account")]
    NotConnected,

    /// Catch-all for unrecognized underlying failures.
    #[error("remote error: {message}")]
    Remote { message: String },
}

impl AuthError {
    #[must_use]
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Stable SCREAMING_SNAKE code for external consumers.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyConnected => "ALREADY_CONNECTED",
            Self::InvalidApiCredentials => "INVALID_API_CREDENTIALS",
            Self::PhoneNumberInvalid => "PHONE_NUMBER_INVALID",
            Self::FloodWait { .. } => "FLOOD_WAIT",
            Self::InvalidCode => "INVALID_CODE",
            Self::ExpiredCode => "EXPIRED_CODE",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::NotConnected => "NOT_CONNECTED",
            Self::Remote { .. } => "REMOTE_ERROR",
        }
    }

    /// Mandatory backoff before the caller may retry, for `FLOOD_WAIT`.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::FloodWait { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<MtprotoError> for AuthError {
    fn from(e: MtprotoError) -> Self {
        if let Some(seconds) = e.flood_wait_seconds() {
            return Self::FloodWait {
                retry_after: Duration::from_secs(seconds),
            };
        }
        if e.is("API_ID_INVALID") {
            Self::InvalidApiCredentials
        } else if e.is("PHONE_NUMBER_INVALID") {
            Self::PhoneNumberInvalid
        } else if e.is("PHONE_CODE_INVALID") || e.is("PHONE_CODE_EMPTY") {
            Self::InvalidCode
        } else if e.is("PHONE_CODE_EXPIRED") {
            Self::ExpiredCode
        } else if e.is("PASSWORD_HASH_INVALID") {
            Self::InvalidPassword
        } else if e.is("AUTH_KEY_UNREGISTERED") {
            // The authorization vanished underneath us (revoked session or a
            // racing logout); callers see the same thing as "not connected".
            Self::NotConnected
        } else {
            Self::Remote {
                message: e.to_string(),
            }
        }
    }
}

/// Errors for the full service surface: the auth taxonomy plus collaborator
/// failures (account/user stores), which keep their own codes.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] telegate_accounts::Error),

    /// The requesting user exists but is deactivated.
    #[error("user is inactive")]
    UserInactive,
}

impl ServiceError {
    /// Stable SCREAMING_SNAKE code for external consumers.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth(e) => e.code(),
            Self::Store(e) => e.code(),
            Self::UserInactive => "USER_INACTIVE",
        }
    }

    /// Mandatory backoff, for `FLOOD_WAIT` failures.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Auth(e) => e.retry_after(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpc(code: i32, name: &str) -> MtprotoError {
        MtprotoError::rpc(code, name)
    }

    #[test]
    fn flood_wait_carries_retry_after() {
        let err = AuthError::from(rpc(420, "FLOOD_WAIT_33"));
        assert_eq!(err.code(), "FLOOD_WAIT");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(33)));
    }

    #[test]
    fn rpc_names_map_to_taxonomy_codes() {
        for (name, code) in [
            ("API_ID_INVALID", "INVALID_API_CREDENTIALS"),
            ("PHONE_NUMBER_INVALID", "PHONE_NUMBER_INVALID"),
            ("PHONE_CODE_INVALID", "INVALID_CODE"),
            ("PHONE_CODE_EMPTY", "INVALID_CODE"),
            ("PHONE_CODE_EXPIRED", "EXPIRED_CODE"),
            ("PASSWORD_HASH_INVALID", "INVALID_PASSWORD"),
            ("AUTH_KEY_UNREGISTERED", "NOT_CONNECTED"),
        ] {
            assert_eq!(AuthError::from(rpc(400, name)).code(), code, "{name}");
        }
    }

    #[test]
    fn unrecognized_failures_become_remote_error() {
        let err = AuthError::from(rpc(500, "INTERDC_2_CALL_ERROR"));
        assert_eq!(err.code(), "REMOTE_ERROR");
        match err {
            AuthError::Remote { message } => assert!(message.contains("INTERDC_2_CALL_ERROR")),
            other => panic!("expected Remote, got {other:?}"),
        }

        let io = AuthError::from(MtprotoError::client("connection reset by peer"));
        assert_eq!(io.code(), "REMOTE_ERROR");
    }

    #[test]
    fn service_error_code_passthrough() {
        let err = ServiceError::from(AuthError::NotConnected);
        assert_eq!(err.code(), "NOT_CONNECTED");
        assert_eq!(err.retry_after(), None);

        let store = ServiceError::from(telegate_accounts::Error::AccountNotFound);
        assert_eq!(store.code(), "ACCOUNT_NOT_FOUND");
        assert_eq!(ServiceError::UserInactive.code(), "USER_INACTIVE");
    }
}
