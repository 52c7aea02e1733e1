use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::ordering::{NameCollator, group_by_group};
use super::recent::{RecentSet, compute_recent};
use crate::database::models::{Member, MemberRole, PrayerRequest, SmallGroup};
use crate::photo::PhotoPosition;

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Everything a member card shows, flattened for the client.
#[derive(Debug, Clone, Serialize)]
pub struct MemberCard {
    pub id: Uuid,
    pub small_group_id: Uuid,
    pub group_name: Option<String>,
    pub name: String,
    pub role: MemberRole,
    pub role_label: &'static str,
    pub photo_url: Option<String>,
    pub photo_position: PhotoPosition,
    pub photo_style: Option<String>,
    pub is_recent: bool,
    pub updated_at: DateTime<Utc>,
    pub updated_label: String,
    pub first_prayer_request: Option<PrayerRequest>,
    pub prayer_request_count: usize,
}

impl MemberCard {
    fn build(
        member: &Member,
        recent: &RecentSet,
        photo_urls: &HashMap<Uuid, String>,
        now: DateTime<Utc>,
    ) -> Self {
        let photo_url = photo_urls.get(&member.id).cloned();
        let photo_style = photo_url
            .as_ref()
            .map(|_| member.photo_position.background_style().to_css());

        Self {
            id: member.id,
            small_group_id: member.small_group_id,
            group_name: member.group_name().map(str::to_string),
            name: member.name.clone(),
            role: member.role,
            role_label: member.role.label(),
            photo_url,
            photo_position: member.photo_position,
            photo_style,
            is_recent: recent.is_recent_id(member),
            updated_at: member.updated_at,
            updated_label: relative_label(member.updated_at, now),
            first_prayer_request: member.first_prayer_request().cloned(),
            prayer_request_count: member.prayer_request_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub group: SmallGroup,
    pub members: Vec<MemberCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryView {
    pub recent: Vec<MemberCard>,
    pub sections: Vec<SectionView>,
    pub generated_at: DateTime<Utc>,
}

/// Build the home screen: the recently-updated strip plus one section per group.
///
/// `photo_urls` maps member ids to already-resolved display URLs; members
/// missing from it render with the placeholder.
pub fn build_directory(
    members: &[Member],
    groups: &[SmallGroup],
    now: DateTime<Utc>,
    collator: &NameCollator,
    photo_urls: &HashMap<Uuid, String>,
) -> DirectoryView {
    let recent_members = compute_recent(members, now);
    let recent_set = RecentSet::from_members(&recent_members);

    let recent = recent_members
        .iter()
        .map(|member| MemberCard::build(member, &recent_set, photo_urls, now))
        .collect();

    let sections = group_by_group(members, groups, collator)
        .into_iter()
        .map(|section| SectionView {
            group: section.group.clone(),
            members: section
                .members
                .iter()
                .map(|member| MemberCard::build(member, &recent_set, photo_urls, now))
                .collect(),
        })
        .collect();

    DirectoryView {
        recent,
        sections,
        generated_at: now,
    }
}

/// Korean "last updated" text: 오늘, 어제, N일 전, 1주 전, then a month/day date.
///
/// Days are whole 24-hour periods since the update; timestamps in the future
/// count as today.
pub fn relative_label(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - updated_at).num_days().max(0);
    match days {
        0 => "오늘".to_string(),
        1 => "어제".to_string(),
        2..=6 => format!("{}일 전", days),
        7..=13 => "1주 전".to_string(),
        _ => {
            let local = match FixedOffset::east_opt(KST_OFFSET_SECS) {
                Some(offset) => updated_at.with_timezone(&offset).date_naive(),
                None => updated_at.date_naive(),
            };
            format!("{}월 {}일", local.month(), local.day())
        }
    }
}
