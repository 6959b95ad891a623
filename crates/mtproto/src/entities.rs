//! Raw protocol entity model.
//!
//! Neutral mirrors of the Telegram schema objects the projection layer needs.
//! Connectors translate library types into these; nothing here is
//! serialized or persisted.

/// Profile photo reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPhoto {
    pub photo_id: i64,
    pub dc_id: i32,
    pub has_video: bool,
}

/// Online presence as reported by Telegram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawUserStatus {
    /// Currently online; `expires` is when the status lapses (epoch seconds).
    Online { expires: i64 },
    /// Offline since `was_online` (epoch seconds).
    Offline { was_online: i64 },
    Recently,
    LastWeek,
    LastMonth,
}

/// A Telegram user or bot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawUser {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    /// Bio text; only populated when a full-profile fetch succeeded.
    pub about: Option<String>,
    pub lang_code: Option<String>,
    pub bot: bool,
    pub verified: bool,
    pub premium: bool,
    pub restricted: bool,
    pub contact: bool,
    pub mutual_contact: bool,
    pub photo: Option<RawPhoto>,
    pub status: Option<RawUserStatus>,
}

/// A small (non-channel) group chat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGroup {
    pub id: i64,
    pub title: String,
    pub participants_count: i32,
    /// Creation date, epoch seconds.
    pub date: i64,
    pub creator: bool,
    pub admin: bool,
    pub photo: Option<RawPhoto>,
}

/// A broadcast channel or megagroup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawChannel {
    pub id: i64,
    pub title: String,
    pub username: Option<String>,
    pub participants_count: Option<i32>,
    /// Join/creation date, epoch seconds.
    pub date: i64,
    pub creator: bool,
    pub admin: bool,
    pub broadcast: bool,
    pub megagroup: bool,
    pub verified: bool,
    pub scam: bool,
    pub fake: bool,
    pub has_geo: bool,
    pub slowmode_enabled: bool,
    pub photo: Option<RawPhoto>,
}

/// The entity a dialog points at.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEntity {
    User(RawUser),
    Group(RawGroup),
    Channel(RawChannel),
}

impl RawEntity {
    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            Self::User(u) => u.id,
            Self::Group(g) => g.id,
            Self::Channel(c) => c.id,
        }
    }
}

/// Summary of the newest message in a dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMessage {
    pub id: i32,
    pub text: Option<String>,
    /// Sent date, epoch seconds.
    pub date: i64,
    pub from_id: Option<i64>,
    pub outgoing: bool,
    pub mentioned: bool,
    pub media_unread: bool,
    pub silent: bool,
}

/// One conversation as listed by the dialogs call.
///
/// `entity` is `None` when the peer could not be resolved (forbidden or
/// deleted chats); projections must still produce a record for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDialog {
    pub peer_id: i64,
    /// Last-activity date, epoch seconds (newest message date when known).
    pub date: i64,
    pub unread_count: i32,
    pub unread_mentions_count: i32,
    pub unread_reactions_count: i32,
    pub pinned: bool,
    pub muted: bool,
    /// Telegram folder id; `Some(1)` is the archive.
    pub folder_id: Option<i32>,
    pub entity: Option<RawEntity>,
    pub last_message: Option<RawMessage>,
}

/// A dialog filter ("folder") as configured by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDialogFilter {
    pub id: i32,
    pub title: String,
    pub emoticon: Option<String>,
    pub pinned_peers: Vec<i64>,
    pub include_peers: Vec<i64>,
    pub exclude_peers: Vec<i64>,
    pub contacts: bool,
    pub non_contacts: bool,
    pub groups: bool,
    pub broadcasts: bool,
    pub bots: bool,
    pub exclude_muted: bool,
    pub exclude_read: bool,
    pub exclude_archived: bool,
}
