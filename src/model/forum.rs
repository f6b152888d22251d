use serde::{Deserialize, Serialize};

use super::common::Id;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    pub up: u64,
    pub down: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl Votes {
    pub fn record(&mut self, direction: VoteDirection) {
        match direction {
            VoteDirection::Up => self.up += 1,
            VoteDirection::Down => self.down += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeratorWarning {
    pub moderator_id: String,
    pub reason: Option<String>,
}

/// Document `forum_threads/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumThread {
    #[serde(default)]
    pub thread_id: Id,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub votes: Votes,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<ModeratorWarning>,
}

impl ForumThread {
    pub fn matches_title(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForumThreadRequest {
    pub title: String,
    pub content: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateThreadRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

/// Document in `forum_threads/{id}/comments`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumComment {
    #[serde(default)]
    pub comment_id: Id,
    pub content: String,
    pub created_by: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForumCommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForumSearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    pub vote: VoteDirection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub reason: String,
}

/// Document in `forum_threads/{id}/reports`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadReport {
    #[serde(default)]
    pub report_id: Id,
    pub reason: String,
    pub reported_by: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Lock,
    Unlock,
    Delete,
    Warn,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerateThreadRequest {
    pub action: ModerationAction,
    pub reason: Option<String>,
}
