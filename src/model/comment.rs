use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const DEFAULT_REPORT_REASON: &str = "No reason provided";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentReport {
    pub user_id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl CommentReport {
    pub fn new(user_id: Uuid, reason: Option<String>) -> Self {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REPORT_REASON.to_string());

        CommentReport {
            user_id,
            reason,
            created_at: Utc::now(),
        }
    }

    /// Two reports are the same entry when the same user reports for the same reason.
    fn same_entry(&self, other: &CommentReport) -> bool {
        self.user_id == other.user_id && self.reason == other.reason
    }
}

/// Stored comment. Whether it is reported is derived from `reports`, never stored separately.
#[derive(sqlx::FromRow, serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub novel_id: Uuid,
    pub chapter_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
    pub content: String,
    pub rating: i32,
    pub likes: Vec<Uuid>,
    #[sqlx(json)]
    pub reports: Vec<CommentReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_reported(&self) -> bool {
        !self.reports.is_empty()
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    /// Returns `false` when the user had already liked the comment.
    pub fn like(&mut self, user_id: Uuid) -> bool {
        if self.is_liked_by(user_id) {
            return false;
        }

        self.likes.push(user_id);
        true
    }

    /// Returns `false` when the user had not liked the comment.
    pub fn unlike(&mut self, user_id: Uuid) -> bool {
        let before = self.likes.len();
        self.likes.retain(|id| *id != user_id);

        self.likes.len() != before
    }

    /// Returns `false` when an equal report was already filed.
    pub fn report(&mut self, report: CommentReport) -> bool {
        if self.reports.iter().any(|r| r.same_entry(&report)) {
            return false;
        }

        self.reports.push(report);
        true
    }

    pub fn clear_reports(&mut self) {
        self.reports.clear();
    }
}

/// Wire shape of a comment, including the derived `reported` flag.
#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub reported: bool,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        let reported = comment.is_reported();

        CommentView { comment, reported }
    }
}

pub struct NewComment {
    pub novel_id: Uuid,
    pub chapter_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
    pub content: String,
    pub rating: i32,
}

#[derive(Default, Debug)]
pub struct CommentChanges {
    pub content: Option<String>,
    pub rating: Option<i32>,
}
