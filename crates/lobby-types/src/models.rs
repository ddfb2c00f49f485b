use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message. Immutable once created; only deletion changes the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_name: String,
}

/// A news post as read back from storage.
///
/// `nickname` and `avatar` come from a left join on the author's profile and
/// are null when the post has no author or the author has no profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_id: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}

/// One profile per `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: String,
    pub nickname: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}
