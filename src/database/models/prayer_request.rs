use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PrayerRequest {
    pub id: Uuid,
    pub member_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerRequestInput {
    pub content: String,
}

impl PrayerRequestInput {
    pub fn normalized_content(&self) -> Option<String> {
        let content = self.content.trim();
        (!content.is_empty()).then(|| content.to_string())
    }
}

/// Oldest first, so the first entry is "entry #1".
pub fn sort_for_display(requests: &mut [PrayerRequest]) {
    requests.sort_by_key(|request| request.created_at);
}
