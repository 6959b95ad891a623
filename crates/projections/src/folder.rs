//! Dialog folder projection.

use {serde::Serialize, telegate_mtproto::entities::RawDialogFilter};

/// One dialog folder with its filter criteria.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: i32,
    pub title: String,
    pub is_default: bool,
    pub emoji: Option<String>,
    pub pinned_dialog_ids: Vec<String>,
    pub included_chat_ids: Vec<String>,
    pub excluded_chat_ids: Vec<String>,
    pub contacts: bool,
    pub non_contacts: bool,
    pub groups: bool,
    pub broadcasts: bool,
    pub bots: bool,
    pub exclude_muted: bool,
    pub exclude_read: bool,
    pub exclude_archived: bool,
}

/// The implicit folder Telegram never enumerates explicitly.
fn all_chats() -> Folder {
    Folder {
        id: 0,
        title: "All chats".into(),
        is_default: true,
        emoji: None,
        pinned_dialog_ids: Vec::new(),
        included_chat_ids: Vec::new(),
        excluded_chat_ids: Vec::new(),
        contacts: false,
        non_contacts: false,
        groups: false,
        broadcasts: false,
        bots: false,
        exclude_muted: false,
        exclude_read: false,
        exclude_archived: false,
    }
}

fn ids(peers: &[i64]) -> Vec<String> {
    peers.iter().map(i64::to_string).collect()
}

fn project_folder(raw: &RawDialogFilter) -> Folder {
    Folder {
        id: raw.id,
        title: raw.title.clone(),
        is_default: false,
        emoji: raw.emoticon.clone(),
        pinned_dialog_ids: ids(&raw.pinned_peers),
        included_chat_ids: ids(&raw.include_peers),
        excluded_chat_ids: ids(&raw.exclude_peers),
        contacts: raw.contacts,
        non_contacts: raw.non_contacts,
        groups: raw.groups,
        broadcasts: raw.broadcasts,
        bots: raw.bots,
        exclude_muted: raw.exclude_muted,
        exclude_read: raw.exclude_read,
        exclude_archived: raw.exclude_archived,
    }
}

/// Map the configured filters, always prepending the synthetic
/// "All chats" folder with id 0.
#[must_use]
pub fn project_folders(raw: &[RawDialogFilter]) -> Vec<Folder> {
    let mut folders = Vec::with_capacity(raw.len() + 1);
    folders.push(all_chats());
    folders.extend(raw.iter().map(project_folder));
    folders
}
