use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named subdivision ("다락방") that every member belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SmallGroup {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>, // TIMESTAMPTZ
    pub updated_at: DateTime<Utc>, // TIMESTAMPTZ
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmallGroupInput {
    pub name: String,
}

impl SmallGroupInput {
    /// Trimmed name, or `None` when nothing is left.
    pub fn normalized_name(&self) -> Option<String> {
        let name = self.name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}
