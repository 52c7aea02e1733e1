use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::macros::string_enum;
use super::{PrayerRequest, SmallGroup};
use crate::photo::PhotoPosition;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
    #[serde(rename_all = "snake_case")]
    pub enum MemberRole {
        Pastor => "pastor",
        Leader => "leader",
        #[default]
        SubLeader => "sub_leader",
    }
}

impl MemberRole {
    /// Primary sort key among members: pastor < leader < sub_leader.
    pub fn priority(&self) -> u8 {
        match self {
            MemberRole::Pastor => 0,
            MemberRole::Leader => 1,
            MemberRole::SubLeader => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MemberRole::Pastor => "교역자",
            MemberRole::Leader => "다락방장",
            MemberRole::SubLeader => "순장",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub small_group_id: Uuid,
    pub name: String,
    pub role: MemberRole,
    pub photo_url: Option<String>,
    pub photo_position: PhotoPosition,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_group: Option<SmallGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prayer_requests: Option<Vec<PrayerRequest>>,
}

impl Member {
    /// Prayer requests are kept oldest first, so the "latest" shown on a card is entry #1.
    pub fn first_prayer_request(&self) -> Option<&PrayerRequest> {
        self.prayer_requests.as_ref().and_then(|requests| requests.first())
    }

    pub fn prayer_request_count(&self) -> usize {
        self.prayer_requests.as_ref().map_or(0, Vec::len)
    }

    pub fn group_name(&self) -> Option<&str> {
        self.small_group.as_ref().map(|group| group.name.as_str())
    }
}

// Database row type that matches the members table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberRow {
    pub id: Uuid,
    pub small_group_id: Uuid,
    pub name: String,
    pub role: MemberRole,
    pub photo_url: Option<String>,
    pub photo_position: Json<PhotoPosition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Self {
            id: row.id,
            small_group_id: row.small_group_id,
            name: row.name,
            role: row.role,
            photo_url: row.photo_url,
            photo_position: row.photo_position.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
            small_group: None,
            prayer_requests: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemberInput {
    pub small_group_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub role: MemberRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMemberInput {
    pub small_group_id: Uuid,
    pub name: String,
    pub role: MemberRole,
    #[serde(default)]
    pub photo_position: Option<PhotoPosition>,
}

/// Validated values written by the member repository. A `None` position
/// keeps the stored one on update and the centered default on insert.
#[derive(Debug, Clone)]
pub struct MemberInput {
    pub small_group_id: Uuid,
    pub name: String,
    pub role: MemberRole,
    pub photo_position: Option<PhotoPosition>,
}

impl CreateMemberInput {
    pub fn validate(self) -> Result<MemberInput, String> {
        Ok(MemberInput {
            small_group_id: self.small_group_id,
            name: normalize_member_name(&self.name).ok_or("name must not be empty")?,
            role: self.role,
            photo_position: None,
        })
    }
}

impl UpdateMemberInput {
    pub fn validate(self) -> Result<MemberInput, String> {
        if let Some(position) = &self.photo_position {
            position.validate()?;
        }
        Ok(MemberInput {
            small_group_id: self.small_group_id,
            name: normalize_member_name(&self.name).ok_or("name must not be empty")?,
            role: self.role,
            photo_position: self.photo_position.map(|position| position.normalized()),
        })
    }
}

pub fn normalize_member_name(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}
