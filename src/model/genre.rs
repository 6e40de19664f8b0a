use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewGenre {
    pub name: String,
    pub slug: String,
    pub description: String,
}

#[derive(Default, Debug)]
pub struct GenreChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// Lowercase ASCII words joined by single hyphens, e.g. `martial-arts`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}
