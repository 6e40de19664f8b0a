use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub novel_id: Uuid,
    pub chapter_number: i32,
    pub title: String,
    pub content: String,
    pub views: i64,
    pub published_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewChapter {
    pub novel_id: Uuid,
    pub chapter_number: i32,
    pub title: String,
    pub content: String,
    pub views: i64,
    pub published_date: DateTime<Utc>,
}

#[derive(Default, Debug)]
pub struct ChapterChanges {
    pub novel_id: Option<Uuid>,
    pub chapter_number: Option<i32>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub views: Option<i64>,
    pub published_date: Option<DateTime<Utc>>,
}
