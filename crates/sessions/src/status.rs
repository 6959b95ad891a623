//! Operation outcomes and their wire literals.
//!
//! External consumers key on the `status` string of each response; the
//! literals here are load-bearing and must not change.

use serde::Serialize;

/// Outcome of `connect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectOutcome {
    /// The stored session was still authorized; no interactive step needed.
    Online,
    /// A verification code was sent to the account's phone.
    CodeRequired,
}

impl ConnectOutcome {
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::CodeRequired => "code_required",
        }
    }
}

/// Outcome of `verify_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CodeOutcome {
    /// The code was accepted and the session is authorized.
    Connected,
    /// The account has two-factor auth enabled.
    PasswordRequired {
        #[serde(rename = "passwordHint", skip_serializing_if = "Option::is_none")]
        password_hint: Option<String>,
    },
}

impl CodeOutcome {
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::PasswordRequired { .. } => "password_required",
        }
    }
}

/// Outcome of `verify_password`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PasswordOutcome {
    Online,
}

impl PasswordOutcome {
    #[must_use]
    pub fn status(&self) -> &'static str {
        "online"
    }
}

/// Outcome of `disconnect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DisconnectOutcome {
    Disconnected,
}

impl DisconnectOutcome {
    #[must_use]
    pub fn status(&self) -> &'static str {
        "disconnected"
    }
}

/// Outcome of `logout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LogoutOutcome {
    LoggedOut,
}

impl LogoutOutcome {
    #[must_use]
    pub fn status(&self) -> &'static str {
        "logged_out"
    }
}
