use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingHistoryEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub novel_id: Uuid,
    pub chapter_id: Uuid,
    pub chapter_title: Option<String>,
    pub novel_title: Option<String>,
    pub novel_cover: Option<String>,
    pub last_read: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Last-read position plus the display fields copied into the entry.
pub struct HistoryEntry {
    pub novel_id: Uuid,
    pub chapter_id: Uuid,
    pub chapter_title: Option<String>,
    pub novel_title: Option<String>,
    pub novel_cover: Option<String>,
}
