//! Production connector backed by the `layer-client` MTProto library.
//!
//! This is the only module in the workspace that names library types. Each
//! account gets its own session file under the connector's session
//! directory; the opaque [`SessionBlob`] handed to the account store is the
//! base64 encoding of that file, so the relational store stays the single
//! source of truth and the file is just the library's working copy.
//!
//! Flood waits are surfaced to the caller as errors ([`NoRetries`]); the
//! session layer decides backoff policy, never this module.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use {
    async_trait::async_trait,
    base64::{Engine as _, engine::general_purpose::STANDARD as BASE64},
    chrono::Utc,
    layer_client::{
        BinaryFileBackend, Client, Config, InvocationError, LoginToken, NoRetries, PasswordToken,
        SignInError,
    },
    layer_tl_types as tl,
    secrecy::ExposeSecret,
    tracing::debug,
};

use crate::{
    connector::{ApiCredentials, ClientHandle, CodeToken, Connector, DialogsQuery, SessionBlob, SignIn},
    entities::{
        RawChannel, RawDialog, RawDialogFilter, RawEntity, RawGroup, RawMessage, RawPhoto, RawUser,
        RawUserStatus,
    },
    error::{Error, Result, RpcError},
};

/// Telegram caps `messages.getDialogs` at 500 entries per call.
const MAX_DIALOG_FETCH: usize = 500;

/// Connector producing [`layer_client::Client`]-backed handles.
pub struct LayerConnector {
    session_dir: PathBuf,
}

impl LayerConnector {
    /// `session_dir` receives one `<account_id>.session` working file per
    /// connected account.
    #[must_use]
    pub fn new(session_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_dir: session_dir.into(),
        }
    }

    fn session_path(&self, account_id: i64) -> PathBuf {
        self.session_dir.join(format!("{account_id}.session"))
    }
}

#[async_trait]
impl Connector for LayerConnector {
    async fn connect(
        &self,
        account_id: i64,
        credentials: &ApiCredentials,
        session: Option<&SessionBlob>,
    ) -> Result<Arc<dyn ClientHandle>> {
        let path = self.session_path(account_id);
        tokio::fs::create_dir_all(&self.session_dir).await?;

        // Seed the working file from the stored blob, or make sure a stale
        // file from an earlier run cannot resurrect a logged-out session.
        match session {
            Some(blob) => {
                let bytes = decode_blob(blob)?;
                tokio::fs::write(&path, bytes).await?;
            }
            None => match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            },
        }

        let (client, _shutdown) = Client::connect(Config {
            api_id: credentials.api_id,
            api_hash: credentials.api_hash.expose_secret().clone(),
            retry_policy: Arc::new(NoRetries),
            session_backend: Arc::new(BinaryFileBackend::new(path.clone())),
            ..Config::default()
        })
        .await
        .map_err(map_invocation)?;

        Ok(Arc::new(LayerHandle {
            client,
            session_path: path,
            password: Mutex::new(None),
        }))
    }
}

/// One live `layer-client` connection.
struct LayerHandle {
    client: Client,
    session_path: PathBuf,
    /// 2FA challenge returned by `sign_in`, consumed by `check_password`.
    /// Telegram issues one SRP challenge per code round, so a failed
    /// password attempt requires a fresh code cycle.
    password: Mutex<Option<PasswordToken>>,
}

#[async_trait]
impl ClientHandle for LayerHandle {
    async fn is_authorized(&self) -> Result<bool> {
        self.client.is_authorized().await.map_err(map_invocation)
    }

    async fn request_code(&self, phone: &str) -> Result<CodeToken> {
        let token = self
            .client
            .request_login_code(phone)
            .await
            .map_err(map_invocation)?;
        Ok(CodeToken::new(token))
    }

    async fn sign_in(&self, token: &CodeToken, code: &str) -> Result<SignIn> {
        let login = token
            .downcast_ref::<LoginToken>()
            .ok_or_else(|| Error::client("code token was not issued by this connector"))?;

        match self.client.sign_in(login, code).await {
            Ok(_) => Ok(SignIn::Authorized),
            Err(SignInError::PasswordRequired(challenge)) => {
                *self.password.lock().unwrap() = Some(*challenge);
                Ok(SignIn::PasswordRequired)
            }
            // The library collapses PHONE_CODE_* rejections into one case;
            // re-surface it under the canonical RPC name.
            Err(SignInError::InvalidCode) => Err(Error::rpc(400, "PHONE_CODE_INVALID")),
            Err(SignInError::SignUpRequired) => Err(Error::client(
                "phone number has no Telegram account; sign up via an official client first",
            )),
            Err(SignInError::Other(e)) => Err(map_invocation(e)),
        }
    }

    async fn check_password(&self, password: &str) -> Result<()> {
        let challenge = self
            .password
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| Error::client("no pending two-factor challenge"))?;
        self.client
            .check_password(challenge, password.as_bytes())
            .await
            .map_err(map_invocation)?;
        Ok(())
    }

    async fn password_hint(&self) -> Result<Option<String>> {
        Ok(self
            .password
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|challenge| challenge.hint().map(str::to_owned)))
    }

    async fn export_session(&self) -> Result<SessionBlob> {
        self.client.save_session().await.map_err(map_invocation)?;
        let bytes = tokio::fs::read(&self.session_path).await?;
        Ok(SessionBlob::new(BASE64.encode(bytes)))
    }

    async fn me(&self) -> Result<RawUser> {
        let user = self.client.get_me().await.map_err(map_invocation)?;
        let mut raw = map_user(&user);

        // The bio lives on the full-profile object; losing it should not
        // fail the whole profile read.
        match self
            .client
            .invoke(&tl::functions::users::GetFullUser {
                id: tl::enums::InputUser::UserSelf,
            })
            .await
        {
            Ok(tl::enums::users::UserFull::UserFull(full)) => {
                let tl::enums::UserFull::UserFull(inner) = full.full_user;
                raw.about = inner.about;
            }
            Err(e) => debug!(error = %e, "full profile fetch failed; omitting bio"),
        }

        Ok(raw)
    }

    async fn dialogs(&self, query: &DialogsQuery) -> Result<Vec<RawDialog>> {
        let fetch = query.fetch_count().min(MAX_DIALOG_FETCH);
        let dialogs = self
            .client
            .get_dialogs(fetch as i32)
            .await
            .map_err(map_invocation)?;

        let now = Utc::now().timestamp();
        Ok(dialogs
            .into_iter()
            .filter_map(|d| map_dialog(d, now))
            .filter(|d| query.archived || d.folder_id != Some(1))
            .collect())
    }

    async fn dialog_filters(&self) -> Result<Vec<RawDialogFilter>> {
        let filters = match self
            .client
            .invoke(&tl::functions::messages::GetDialogFilters {})
            .await
            .map_err(map_invocation)?
        {
            tl::enums::messages::DialogFilters::DialogFilters(result) => result.filters,
        };

        Ok(filters.into_iter().filter_map(map_dialog_filter).collect())
    }

    async fn sign_out(&self) -> Result<()> {
        self.client.sign_out().await.map_err(map_invocation)?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // The library tears the TCP connection down when the last clone of
        // the client drops; there is no separate disconnect call. Persist
        // nothing here: the caller owns session export explicitly.
        debug!("releasing layer client handle");
        Ok(())
    }
}

// ── Error translation ───────────────────────────────────────────────────────

fn map_invocation(e: InvocationError) -> Error {
    match e {
        InvocationError::Rpc(rpc) => Error::Rpc(RpcError {
            code: rpc.code,
            name: rpc.name,
            value: rpc.value,
        }),
        InvocationError::Io(io) => Error::Io(io),
        other => Error::client(other.to_string()),
    }
}

// ── Entity translation ──────────────────────────────────────────────────────

fn decode_blob(blob: &SessionBlob) -> Result<Vec<u8>> {
    BASE64
        .decode(blob.as_str())
        .map_err(|_| Error::client("stored session blob is not valid base64"))
}

fn map_user(user: &tl::types::User) -> RawUser {
    RawUser {
        id: user.id,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        phone: user.phone.clone(),
        about: None,
        lang_code: user.lang_code.clone(),
        bot: user.bot,
        verified: user.verified,
        premium: user.premium,
        restricted: user.restricted,
        contact: user.contact,
        mutual_contact: user.mutual_contact,
        photo: user.photo.as_ref().and_then(map_user_photo),
        status: user.status.as_ref().and_then(map_status),
    }
}

fn map_user_photo(photo: &tl::enums::UserProfilePhoto) -> Option<RawPhoto> {
    match photo {
        tl::enums::UserProfilePhoto::UserProfilePhoto(p) => Some(RawPhoto {
            photo_id: p.photo_id,
            dc_id: p.dc_id,
            has_video: p.has_video,
        }),
        tl::enums::UserProfilePhoto::Empty => None,
    }
}

fn map_chat_photo(photo: &tl::enums::ChatPhoto) -> Option<RawPhoto> {
    match photo {
        tl::enums::ChatPhoto::ChatPhoto(p) => Some(RawPhoto {
            photo_id: p.photo_id,
            dc_id: p.dc_id,
            has_video: p.has_video,
        }),
        tl::enums::ChatPhoto::Empty => None,
    }
}

fn map_status(status: &tl::enums::UserStatus) -> Option<RawUserStatus> {
    match status {
        tl::enums::UserStatus::Online(s) => Some(RawUserStatus::Online {
            expires: i64::from(s.expires),
        }),
        tl::enums::UserStatus::Offline(s) => Some(RawUserStatus::Offline {
            was_online: i64::from(s.was_online),
        }),
        tl::enums::UserStatus::Recently { .. } => Some(RawUserStatus::Recently),
        tl::enums::UserStatus::LastWeek { .. } => Some(RawUserStatus::LastWeek),
        tl::enums::UserStatus::LastMonth { .. } => Some(RawUserStatus::LastMonth),
        tl::enums::UserStatus::Empty => None,
    }
}

fn map_entity(
    entity: Option<&tl::enums::User>,
    chat: Option<&tl::enums::Chat>,
) -> Option<RawEntity> {
    if let Some(tl::enums::User::User(u)) = entity {
        return Some(RawEntity::User(map_user(u)));
    }
    match chat? {
        tl::enums::Chat::Chat(c) => Some(RawEntity::Group(RawGroup {
            id: c.id,
            title: c.title.clone(),
            participants_count: c.participants_count,
            date: i64::from(c.date),
            creator: c.creator,
            admin: c.admin_rights.is_some(),
            photo: map_chat_photo(&c.photo),
        })),
        tl::enums::Chat::Channel(c) => Some(RawEntity::Channel(RawChannel {
            id: c.id,
            title: c.title.clone(),
            username: c.username.clone(),
            participants_count: c.participants_count,
            date: i64::from(c.date),
            creator: c.creator,
            admin: c.admin_rights.is_some(),
            broadcast: c.broadcast,
            megagroup: c.megagroup,
            verified: c.verified,
            scam: c.scam,
            fake: c.fake,
            has_geo: c.has_geo,
            slowmode_enabled: c.slowmode_enabled,
            photo: map_chat_photo(&c.photo),
        })),
        // Forbidden, empty and deleted chats carry no usable detail; the
        // projection layer renders them as `unknown`.
        _ => None,
    }
}

fn map_message(message: &tl::enums::Message) -> Option<RawMessage> {
    match message {
        tl::enums::Message::Message(m) => Some(RawMessage {
            id: m.id,
            text: if m.message.is_empty() {
                None
            } else {
                Some(m.message.clone())
            },
            date: i64::from(m.date),
            from_id: m.from_id.as_ref().map(peer_id),
            outgoing: m.out,
            mentioned: m.mentioned,
            media_unread: m.media_unread,
            silent: m.silent,
        }),
        tl::enums::Message::Service(m) => Some(RawMessage {
            id: m.id,
            text: None,
            date: i64::from(m.date),
            from_id: m.from_id.as_ref().map(peer_id),
            outgoing: m.out,
            mentioned: m.mentioned,
            media_unread: m.media_unread,
            silent: false,
        }),
        tl::enums::Message::Empty(_) => None,
    }
}

fn peer_id(peer: &tl::enums::Peer) -> i64 {
    match peer {
        tl::enums::Peer::User(p) => p.user_id,
        tl::enums::Peer::Chat(p) => p.chat_id,
        tl::enums::Peer::Channel(p) => p.channel_id,
    }
}

fn input_peer_id(peer: &tl::enums::InputPeer) -> Option<i64> {
    match peer {
        tl::enums::InputPeer::User(p) => Some(p.user_id),
        tl::enums::InputPeer::Chat(p) => Some(p.chat_id),
        tl::enums::InputPeer::Channel(p) => Some(p.channel_id),
        _ => None,
    }
}

fn map_dialog(dialog: layer_client::Dialog, now: i64) -> Option<RawDialog> {
    let tl::enums::Dialog::Dialog(d) = dialog.raw else {
        // dialogFolder rows describe the archive pseudo-dialog itself.
        return None;
    };

    let muted = match &d.notify_settings {
        tl::enums::PeerNotifySettings::PeerNotifySettings(s) => {
            s.mute_until.is_some_and(|until| i64::from(until) > now)
        }
    };

    let last_message = dialog.message.as_ref().and_then(map_message);

    Some(RawDialog {
        peer_id: peer_id(&d.peer),
        date: last_message.as_ref().map_or(0, |m| m.date),
        unread_count: d.unread_count,
        unread_mentions_count: d.unread_mentions_count,
        unread_reactions_count: d.unread_reactions_count,
        pinned: d.pinned,
        muted,
        folder_id: d.folder_id,
        entity: map_entity(dialog.entity.as_ref(), dialog.chat.as_ref()),
        last_message,
    })
}

fn map_dialog_filter(filter: tl::enums::DialogFilter) -> Option<RawDialogFilter> {
    match filter {
        tl::enums::DialogFilter::DialogFilter(f) => {
            let tl::enums::TextWithEntities::TextWithEntities(title) = f.title;
            Some(RawDialogFilter {
                id: f.id,
                title: title.text,
                emoticon: f.emoticon,
                pinned_peers: f.pinned_peers.iter().filter_map(input_peer_id).collect(),
                include_peers: f.include_peers.iter().filter_map(input_peer_id).collect(),
                exclude_peers: f.exclude_peers.iter().filter_map(input_peer_id).collect(),
                contacts: f.contacts,
                non_contacts: f.non_contacts,
                groups: f.groups,
                broadcasts: f.broadcasts,
                bots: f.bots,
                exclude_muted: f.exclude_muted,
                exclude_read: f.exclude_read,
                exclude_archived: f.exclude_archived,
            })
        }
        // The implicit "all chats" folder is synthesized by the projection
        // layer; chatlist folders carry no filter flags worth projecting.
        _ => None,
    }
}
