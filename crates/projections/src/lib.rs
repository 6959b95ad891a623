//! Read projections: stable response shapes for external consumers.
//!
//! Pure functions from the raw entity model to versioned serde structs with
//! camelCase wire names. Nothing here touches the network or the stores, and
//! a malformed entity never fails a projection — unresolvable peers degrade
//! to the `unknown` dialog type instead.

pub mod dialog;
pub mod folder;
pub mod profile;

use chrono::{DateTime, Utc};

pub use {
    dialog::{Dialog, DialogEntity, DialogKind, DialogsPage, LastMessage, project_dialog, project_dialogs},
    folder::{Folder, project_folders},
    profile::{PhotoRef, Presence, Profile, project_profile},
};

/// Epoch seconds → UTC timestamp, clamping malformed values to the epoch.
pub(crate) fn datetime(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
