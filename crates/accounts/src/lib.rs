//! Account domain model and persistence bridge.
//!
//! The session layer reads and mutates account records exclusively through
//! [`AccountStore`] and [`UserStore`]; the relational implementation lives
//! with the host application. [`MemoryAccountStore`] is the in-process
//! reference implementation used by tests and the demo CLI.

pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use {
    error::{Error, Result},
    memory::{MemoryAccountStore, MemoryUserStore},
    model::{Account, AccountPatch, AccountStatus, NewAccount},
    store::{AccountStore, UserStore},
};
