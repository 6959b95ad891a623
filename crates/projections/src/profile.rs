//! Own-profile projection.

use {
    chrono::{DateTime, Utc},
    serde::Serialize,
    telegate_mtproto::entities::{RawPhoto, RawUser, RawUserStatus},
};

use crate::datetime;

/// Profile photo reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRef {
    pub photo_id: String,
    pub dc_id: i32,
    pub has_video: bool,
}

impl From<&RawPhoto> for PhotoRef {
    fn from(photo: &RawPhoto) -> Self {
        Self {
            photo_id: photo.photo_id.to_string(),
            dc_id: photo.dc_id,
            has_video: photo.has_video,
        }
    }
}

/// Presence status; `wasOnline` is emitted only for `offline`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Presence {
    Online,
    Offline {
        #[serde(rename = "wasOnline")]
        was_online: DateTime<Utc>,
    },
    Recently,
    LastWeek,
    LastMonth,
}

impl From<RawUserStatus> for Presence {
    fn from(status: RawUserStatus) -> Self {
        match status {
            RawUserStatus::Online { .. } => Self::Online,
            RawUserStatus::Offline { was_online } => Self::Offline {
                was_online: datetime(was_online),
            },
            RawUserStatus::Recently => Self::Recently,
            RawUserStatus::LastWeek => Self::LastWeek,
            RawUserStatus::LastMonth => Self::LastMonth,
        }
    }
}

/// The authorized account's own profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: String,
    pub bio: Option<String>,
    pub is_bot: bool,
    pub is_verified: bool,
    pub is_premium: bool,
    pub is_restricted: bool,
    pub lang_code: Option<String>,
    pub photo: Option<PhotoRef>,
    pub status: Option<Presence>,
}

/// Map a raw user to the profile shape.
#[must_use]
pub fn project_profile(user: &RawUser) -> Profile {
    Profile {
        id: user.id.to_string(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        phone: user.phone.clone().unwrap_or_default(),
        bio: user.about.clone(),
        is_bot: user.bot,
        is_verified: user.verified,
        is_premium: user.premium,
        is_restricted: user.restricted,
        lang_code: user.lang_code.clone(),
        photo: user.photo.as_ref().map(PhotoRef::from),
        status: user.status.map(Presence::from),
    }
}
