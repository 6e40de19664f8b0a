use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::UnknownVariant;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NovelStatus {
    #[default]
    Ongoing,
    Completed,
    Hiatus,
}

impl NovelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NovelStatus::Ongoing => "ongoing",
            NovelStatus::Completed => "completed",
            NovelStatus::Hiatus => "hiatus",
        }
    }
}

impl FromStr for NovelStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ongoing" => Ok(NovelStatus::Ongoing),
            "completed" => Ok(NovelStatus::Completed),
            "hiatus" => Ok(NovelStatus::Hiatus),
            other => Err(UnknownVariant {
                kind: "novel status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for NovelStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Novel {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub cover_image: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: NovelStatus,
    pub views: i64,
    pub likes: i64,
    pub favorited_by: Vec<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Novel {
    /// Flips `user_id`'s membership in the favorite set and keeps `likes` in step.
    /// Returns whether the user now favors the novel.
    pub fn toggle_favorite(&mut self, user_id: Uuid) -> bool {
        match self.favorited_by.iter().position(|id| *id == user_id) {
            Some(index) => {
                self.favorited_by.remove(index);
                self.likes = (self.likes - 1).max(0);
                false
            }
            None => {
                self.favorited_by.push(user_id);
                self.likes += 1;
                true
            }
        }
    }
}

pub struct NewNovel {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub cover_image: Option<String>,
    pub status: NovelStatus,
    pub views: i64,
    pub created_by: Option<Uuid>,
}

#[derive(Default, Debug)]
pub struct NovelChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genres: Option<Vec<String>>,
    pub cover_image: Option<String>,
    pub status: Option<NovelStatus>,
    pub views: Option<i64>,
}

#[derive(Default, Debug)]
pub struct NovelFilter {
    pub genre: Option<String>,
    pub status: Option<NovelStatus>,
    pub limit: Option<i64>,
    pub offset: i64,
}
