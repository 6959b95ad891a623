//! Error types crossing the client boundary.
//!
//! Telegram reports failures as flat string codes like `FLOOD_WAIT_30` or
//! `PHONE_CODE_INVALID`. [`RpcError`] keeps that classification intact
//! (name, HTTP-like code, numeric suffix) so the session layer can map it
//! into its caller-facing taxonomy without ever seeing library types.

use thiserror::Error;

/// Crate-wide result type for client-boundary operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error returned by Telegram's servers in response to an RPC call.
///
/// Numeric suffixes are stripped from the name and placed in
/// [`RpcError::value`]: `FLOOD_WAIT_30` becomes
/// `RpcError { code: 420, name: "FLOOD_WAIT", value: Some(30) }`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("rpc {code}: {name}")]
pub struct RpcError {
    /// HTTP-like status code.
    pub code: i32,
    /// Error name in SCREAMING_SNAKE_CASE with the numeric suffix removed.
    pub name: String,
    /// Numeric suffix extracted from the name, if any.
    pub value: Option<u32>,
}

impl RpcError {
    /// Parse a raw Telegram error message like `"FLOOD_WAIT_30"`.
    #[must_use]
    pub fn parse(code: i32, message: &str) -> Self {
        if let Some(idx) = message.rfind('_') {
            let suffix = &message[idx + 1..];
            if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(value) = suffix.parse::<u32>() {
                    return Self {
                        code,
                        name: message[..idx].to_string(),
                        value: Some(value),
                    };
                }
            }
        }
        Self {
            code,
            name: message.to_string(),
            value: None,
        }
    }

    /// Match on the error name, with an optional `'*'` prefix or suffix
    /// wildcard: `is("FLOOD_WAIT")`, `is("PHONE_CODE_*")`, `is("*_INVALID")`.
    #[must_use]
    pub fn is(&self, pattern: &str) -> bool {
        if let Some(prefix) = pattern.strip_suffix('*') {
            self.name.starts_with(prefix)
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            self.name.ends_with(suffix)
        } else {
            self.name == pattern
        }
    }

    /// The flood-wait duration in seconds, if this is a `FLOOD_WAIT` error.
    #[must_use]
    pub fn flood_wait_seconds(&self) -> Option<u64> {
        if self.name == "FLOOD_WAIT" {
            self.value.map(u64::from)
        } else {
            None
        }
    }
}

/// The error type returned from every [`crate::ClientHandle`] method.
#[derive(Debug, Error)]
pub enum Error {
    /// Telegram rejected the request.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Network or I/O failure while talking to Telegram.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other client-library failure, with its diagnostic text.
    #[error("client error: {message}")]
    Client { message: String },
}

impl Error {
    #[must_use]
    pub fn client(message: impl Into<String>) -> Self {
        Self::Client {
            message: message.into(),
        }
    }

    /// Shorthand for constructing an RPC error, mostly useful in tests and
    /// connector doubles.
    #[must_use]
    pub fn rpc(code: i32, message: &str) -> Self {
        Self::Rpc(RpcError::parse(code, message))
    }

    /// The underlying RPC classification, if any.
    #[must_use]
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            Self::Rpc(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` if this is the named RPC error (supports wildcards).
    #[must_use]
    pub fn is(&self, pattern: &str) -> bool {
        self.as_rpc().is_some_and(|e| e.is(pattern))
    }

    /// If this is a `FLOOD_WAIT` error, how many seconds to back off.
    #[must_use]
    pub fn flood_wait_seconds(&self) -> Option<u64> {
        self.as_rpc().and_then(RpcError::flood_wait_seconds)
    }
}
