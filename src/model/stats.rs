#[derive(sqlx::FromRow, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopNovel {
    pub title: String,
    pub author: Option<String>,
    pub genres: Vec<String>,
    pub views: i64,
}

/// Catalogue snapshot handed to the chat assistant as grounding context.
#[derive(serde::Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_novels: i64,
    pub total_views: i64,
    pub genres: Vec<String>,
    pub top_novels: Vec<TopNovel>,
}
