//! Dialog list projection.

use {
    chrono::{DateTime, Utc},
    serde::Serialize,
    telegate_mtproto::entities::{RawChannel, RawDialog, RawEntity, RawGroup, RawMessage, RawUser},
};

use crate::{
    datetime,
    profile::{PhotoRef, Presence},
};

/// Telegram's folder id for the archive.
const ARCHIVE_FOLDER_ID: i32 = 1;

/// Discriminated conversation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DialogKind {
    User,
    Bot,
    Group,
    Channel,
    Megagroup,
    /// The peer could not be resolved; the record is still emitted so
    /// consumers degrade gracefully instead of receiving an error.
    Unknown,
}

/// Newest-message summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    pub id: i32,
    pub text: Option<String>,
    pub date: DateTime<Utc>,
    pub from_id: Option<i64>,
    pub out: bool,
    pub mentioned: bool,
    pub media_unread: bool,
    pub silent: bool,
}

impl From<&RawMessage> for LastMessage {
    fn from(message: &RawMessage) -> Self {
        Self {
            id: message.id,
            text: message.text.clone(),
            date: datetime(message.date),
            from_id: message.from_id,
            out: message.outgoing,
            mentioned: message.mentioned,
            media_unread: message.media_unread,
            silent: message.silent,
        }
    }
}

/// User/bot peer details.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub is_bot: bool,
    pub is_verified: bool,
    pub is_premium: bool,
    pub is_contact: bool,
    pub is_mutual_contact: bool,
    pub photo: Option<PhotoRef>,
    pub status: Option<Presence>,
}

/// Small-group peer details.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupEntity {
    pub title: String,
    pub participants_count: i32,
    pub created_date: Option<DateTime<Utc>>,
    pub is_creator: bool,
    pub is_admin: bool,
    pub photo: Option<PhotoRef>,
}

/// Channel/megagroup peer details.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelEntity {
    pub title: String,
    pub username: Option<String>,
    pub participants_count: Option<i32>,
    pub created_date: Option<DateTime<Utc>>,
    pub is_creator: bool,
    pub is_admin: bool,
    pub is_broadcast: bool,
    pub is_verified: bool,
    pub is_scam: bool,
    pub is_fake: bool,
    pub has_geo: bool,
    pub slowmode_enabled: bool,
    pub photo: Option<PhotoRef>,
}

/// Type-discriminated peer payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DialogEntity {
    User(UserEntity),
    Group(GroupEntity),
    Channel(ChannelEntity),
}

/// One projected conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialog {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DialogKind,
    pub date: DateTime<Utc>,
    pub unread_count: i32,
    pub unread_mentions_count: i32,
    pub unread_reactions_count: i32,
    pub is_archived: bool,
    pub is_pinned: bool,
    pub is_muted: bool,
    pub folder_id: Option<i32>,
    pub last_message: Option<LastMessage>,
    pub entity: Option<DialogEntity>,
}

/// Windowed dialog list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogsPage {
    /// Number of dialogs visible in the fetched window.
    pub total: usize,
    pub has_more: bool,
    pub dialogs: Vec<Dialog>,
}

fn user_kind(user: &RawUser) -> DialogKind {
    if user.bot { DialogKind::Bot } else { DialogKind::User }
}

fn channel_kind(channel: &RawChannel) -> DialogKind {
    if channel.megagroup {
        DialogKind::Megagroup
    } else {
        DialogKind::Channel
    }
}

fn user_display_name(user: &RawUser) -> String {
    let full = match (&user.first_name, &user.last_name) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (Some(first), None) => first.clone(),
        (None, Some(last)) => last.clone(),
        (None, None) => String::new(),
    };
    if !full.is_empty() {
        return full;
    }
    user.username
        .clone()
        .or_else(|| user.phone.clone())
        .unwrap_or_else(|| "Unknown".into())
}

fn project_user_entity(user: &RawUser) -> UserEntity {
    UserEntity {
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        phone: user.phone.clone(),
        is_bot: user.bot,
        is_verified: user.verified,
        is_premium: user.premium,
        is_contact: user.contact,
        is_mutual_contact: user.mutual_contact,
        photo: user.photo.as_ref().map(PhotoRef::from),
        status: user.status.map(Presence::from),
    }
}

fn project_group_entity(group: &RawGroup) -> GroupEntity {
    GroupEntity {
        title: group.title.clone(),
        participants_count: group.participants_count,
        created_date: (group.date > 0).then(|| datetime(group.date)),
        is_creator: group.creator,
        is_admin: group.admin,
        photo: group.photo.as_ref().map(PhotoRef::from),
    }
}

fn project_channel_entity(channel: &RawChannel) -> ChannelEntity {
    ChannelEntity {
        title: channel.title.clone(),
        username: channel.username.clone(),
        participants_count: channel.participants_count,
        created_date: (channel.date > 0).then(|| datetime(channel.date)),
        is_creator: channel.creator,
        is_admin: channel.admin,
        is_broadcast: channel.broadcast,
        is_verified: channel.verified,
        is_scam: channel.scam,
        is_fake: channel.fake,
        has_geo: channel.has_geo,
        slowmode_enabled: channel.slowmode_enabled,
        photo: channel.photo.as_ref().map(PhotoRef::from),
    }
}

/// Map one raw dialog. Never fails: unresolvable peers come out as
/// [`DialogKind::Unknown`] with no entity payload.
#[must_use]
pub fn project_dialog(raw: &RawDialog) -> Dialog {
    let (kind, name, entity) = match &raw.entity {
        Some(RawEntity::User(user)) => (
            user_kind(user),
            user_display_name(user),
            Some(DialogEntity::User(project_user_entity(user))),
        ),
        Some(RawEntity::Group(group)) => (
            DialogKind::Group,
            group.title.clone(),
            Some(DialogEntity::Group(project_group_entity(group))),
        ),
        Some(RawEntity::Channel(channel)) => (
            channel_kind(channel),
            channel.title.clone(),
            Some(DialogEntity::Channel(project_channel_entity(channel))),
        ),
        None => (DialogKind::Unknown, "Unknown".into(), None),
    };

    Dialog {
        id: raw.peer_id.to_string(),
        name,
        kind,
        date: datetime(raw.date),
        unread_count: raw.unread_count,
        unread_mentions_count: raw.unread_mentions_count,
        unread_reactions_count: raw.unread_reactions_count,
        is_archived: raw.folder_id == Some(ARCHIVE_FOLDER_ID),
        is_pinned: raw.pinned,
        is_muted: raw.muted,
        folder_id: raw.folder_id,
        last_message: raw.last_message.as_ref().map(LastMessage::from),
        entity,
    }
}

/// Slice the raw window into a page, reporting whether more remain.
#[must_use]
pub fn project_dialogs(raw: &[RawDialog], limit: usize, offset: usize) -> DialogsPage {
    let dialogs: Vec<Dialog> = raw
        .iter()
        .skip(offset)
        .take(limit)
        .map(project_dialog)
        .collect();
    DialogsPage {
        total: raw.len(),
        has_more: raw.len() > offset.saturating_add(limit),
        dialogs,
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        rstest::rstest,
        telegate_mtproto::entities::{RawMessage, RawUserStatus},
    };

    fn user_dialog(bot: bool) -> RawDialog {
        RawDialog {
            peer_id: 1001,
            date: 1_700_000_100,
            unread_count: 3,
            unread_mentions_count: 1,
            pinned: true,
            entity: Some(RawEntity::User(RawUser {
                id: 1001,
                first_name: Some("Ada".into()),
                last_name: Some("Lovelace".into()),
                bot,
                status: Some(RawUserStatus::Recently),
                ..RawUser::default()
            })),
            last_message: Some(RawMessage {
                id: 7,
                text: Some("hi".into()),
                date: 1_700_000_100,
                from_id: Some(1001),
                outgoing: false,
                mentioned: true,
                ..RawMessage::default()
            }),
            ..RawDialog::default()
        }
    }

    fn channel_dialog(megagroup: bool) -> RawDialog {
        RawDialog {
            peer_id: 2002,
            entity: Some(RawEntity::Channel(RawChannel {
                id: 2002,
                title: "News".into(),
                broadcast: !megagroup,
                megagroup,
                ..RawChannel::default()
            })),
            ..RawDialog::default()
        }
    }

    #[rstest]
    #[case::user(user_dialog(false), DialogKind::User)]
    #[case::bot(user_dialog(true), DialogKind::Bot)]
    #[case::channel(channel_dialog(false), DialogKind::Channel)]
    #[case::megagroup(channel_dialog(true), DialogKind::Megagroup)]
    fn discriminates_dialog_kind(#[case] raw: RawDialog, #[case] expected: DialogKind) {
        assert_eq!(project_dialog(&raw).kind, expected);
    }

    #[test]
    fn group_dialog_projects_group_payload() {
        let raw = RawDialog {
            peer_id: 3003,
            entity: Some(RawEntity::Group(RawGroup {
                id: 3003,
                title: "Book club".into(),
                participants_count: 12,
                date: 1_600_000_000,
                creator: true,
                ..RawGroup::default()
            })),
            ..RawDialog::default()
        };
        let dialog = project_dialog(&raw);
        assert_eq!(dialog.kind, DialogKind::Group);
        assert_eq!(dialog.name, "Book club");
        match dialog.entity {
            Some(DialogEntity::Group(g)) => {
                assert_eq!(g.participants_count, 12);
                assert!(g.is_creator);
                assert!(g.created_date.is_some());
            }
            other => panic!("expected group entity, got {other:?}"),
        }
    }

    #[test]
    fn unresolvable_peer_becomes_unknown_not_an_error() {
        let raw = RawDialog {
            peer_id: 404,
            unread_count: 5,
            ..RawDialog::default()
        };
        let dialog = project_dialog(&raw);
        assert_eq!(dialog.kind, DialogKind::Unknown);
        assert_eq!(dialog.id, "404");
        assert!(dialog.entity.is_none());
        assert_eq!(dialog.unread_count, 5);

        let json = serde_json::to_value(&dialog).unwrap();
        assert_eq!(json["type"], "unknown");
    }

    #[test]
    fn archive_folder_sets_archived_flag() {
        let mut raw = user_dialog(false);
        raw.folder_id = Some(1);
        let dialog = project_dialog(&raw);
        assert!(dialog.is_archived);

        raw.folder_id = Some(3);
        assert!(!project_dialog(&raw).is_archived);
    }

    #[test]
    fn user_display_name_falls_back() {
        let mut user = RawUser {
            id: 5,
            ..RawUser::default()
        };
        assert_eq!(user_display_name(&user), "Unknown");
        user.phone = Some("+1555".into());
        assert_eq!(user_display_name(&user), "+1555");
        user.username = Some("ada".into());
        assert_eq!(user_display_name(&user), "ada");
        user.first_name = Some("Ada".into());
        assert_eq!(user_display_name(&user), "Ada");
    }

    #[test]
    fn last_message_summary_is_projected() {
        let dialog = project_dialog(&user_dialog(false));
        let message = dialog.last_message.expect("last message");
        assert_eq!(message.id, 7);
        assert_eq!(message.text.as_deref(), Some("hi"));
        assert!(message.mentioned);
        assert!(!message.out);
        assert_eq!(message.date.timestamp(), 1_700_000_100);
    }

    #[test]
    fn page_slices_window_and_reports_has_more() {
        let raw: Vec<RawDialog> = (0..5)
            .map(|i| RawDialog {
                peer_id: i,
                ..RawDialog::default()
            })
            .collect();

        let page = project_dialogs(&raw, 2, 1);
        assert_eq!(page.total, 5);
        assert!(page.has_more);
        assert_eq!(page.dialogs.len(), 2);
        assert_eq!(page.dialogs[0].id, "1");

        let tail = project_dialogs(&raw, 10, 3);
        assert!(!tail.has_more);
        assert_eq!(tail.dialogs.len(), 2);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::to_value(project_dialog(&user_dialog(false))).unwrap();
        assert!(json.get("unreadMentionsCount").is_some());
        assert!(json.get("isPinned").is_some());
        assert!(json.get("lastMessage").is_some());
        assert_eq!(json["entity"]["firstName"], "Ada");
        assert_eq!(json["lastMessage"]["mediaUnread"], false);
    }
}
