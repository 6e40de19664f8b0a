mod chapter;
mod comment;
mod genre;
mod novel;
mod reading_history;
mod stats;
mod user;

pub use chapter::{Chapter, ChapterChanges, NewChapter};
pub use comment::{
    Comment, CommentChanges, CommentReport, CommentView, DEFAULT_REPORT_REASON, NewComment,
};
pub use genre::{Genre, GenreChanges, NewGenre, is_valid_slug};
pub use novel::{NewNovel, Novel, NovelChanges, NovelFilter, NovelStatus};
pub use reading_history::{HistoryEntry, ReadingHistoryEntry};
pub use stats::{PlatformStats, TopNovel};
pub use user::{
    CurrentUser, ExternalProfile, NewUser, Role, User, UserChanges, UserEntity, generate_username,
};

/// A stored enum column held a value this build does not know.
#[derive(thiserror::Error, Debug)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub deleted_count: u64,
}

impl DeleteResponse {
    pub fn new(deleted_count: u64, what: &str) -> Self {
        DeleteResponse {
            message: format!("{} {} deleted", deleted_count, what),
            deleted_count,
        }
    }

    pub fn scoped(deleted_count: u64, what: &str, scope: &str) -> Self {
        DeleteResponse {
            message: format!("{} {} deleted for {}", deleted_count, what, scope),
            deleted_count,
        }
    }
}
