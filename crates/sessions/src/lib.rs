//! Per-account session lifecycle management.
//!
//! [`SessionRegistry`] is the single in-memory authority over live client
//! handles, per-account locks, and pending-authentication state.
//! [`SessionManager`] drives the authentication state machine over it:
//!
//! ```text
//! NO_CLIENT → CONNECTING → (AUTHORIZED | CODE_REQUIRED)
//!                              → (AUTHORIZED | PASSWORD_REQUIRED) → AUTHORIZED
//! ```
//!
//! plus `DISCONNECTED` (connection closed, stored session retained) and
//! `LOGGED_OUT` (connection closed, stored session cleared). Every mutating
//! operation on one account id is serialized by that account's lock;
//! operations on distinct accounts run fully in parallel.
//!
//! Both the registry and the manager are plain service objects constructed
//! once at process start and shared via `Arc` — no globals, no lazy
//! singletons.

pub mod error;
pub mod manager;
pub mod registry;
pub mod status;

pub use {
    error::{AuthError, ServiceError},
    manager::SessionManager,
    registry::{AuthStage, SessionRegistry},
    status::{CodeOutcome, ConnectOutcome, DisconnectOutcome, LogoutOutcome, PasswordOutcome},
};
