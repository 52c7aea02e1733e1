use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::database::models::Member;

pub const RECENT_WINDOW_DAYS: i64 = 14;

pub fn recent_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(RECENT_WINDOW_DAYS)
}

/// Members updated within the last fourteen days (boundary included), newest first.
pub fn compute_recent(members: &[Member], now: DateTime<Utc>) -> Vec<&Member> {
    let cutoff = recent_cutoff(now);
    let mut recent: Vec<&Member> = members
        .iter()
        .filter(|member| member.updated_at >= cutoff)
        .collect();
    recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    recent
}

/// Membership lookup for the "recently updated" badge.
#[derive(Debug, Clone, Default)]
pub struct RecentSet {
    ids: HashSet<Uuid>,
}

impl RecentSet {
    pub fn from_members(recent: &[&Member]) -> Self {
        Self {
            ids: recent.iter().map(|member| member.id).collect(),
        }
    }

    pub fn is_recent_id(&self, member: &Member) -> bool {
        self.ids.contains(&member.id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
