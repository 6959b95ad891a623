//! Store errors, named after the original service's caller-facing codes.

use thiserror::Error;

/// Crate-wide result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors shared by every [`crate::AccountStore`] implementation.
#[derive(Debug, Error)]
pub enum Error {
    /// No account with that id belongs to the requesting user.
    #[error("account not found")]
    AccountNotFound,

    /// The (owner, phone) pair is already taken.
    #[error("account with phone {phone} already exists")]
    AccountAlreadyExists { phone: String },

    /// No user record with that id.
    #[error("user not found")]
    UserNotFound,

    /// Wrapped failure from the backing store.
    #[error("store operation failed: {context}: {source}")]
    Backend {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn already_exists(phone: impl Into<String>) -> Self {
        Self::AccountAlreadyExists {
            phone: phone.into(),
        }
    }

    #[must_use]
    pub fn backend(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Stable SCREAMING_SNAKE code for external consumers.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::AccountAlreadyExists { .. } => "ACCOUNT_ALREADY_EXISTS",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::Backend { .. } => "DATABASE_ERROR",
        }
    }
}
