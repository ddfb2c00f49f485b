use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, NewsPost, Profile};

// -- Chat --

/// Body of `POST /chat`. Every field is optional; defaults are applied by the handler.
#[derive(Debug, Default, Deserialize)]
pub struct SendMessageRequest {
    pub text: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: ChatMessage,
}

// -- News --

#[derive(Debug, Default, Deserialize)]
pub struct CreateNewsRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Inline image payload, usually a `data:` URL.
    pub image: Option<String>,
    pub author_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewsListResponse {
    pub news: Vec<NewsPost>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewsResponse {
    pub news: NewsPost,
}

// -- Profiles --

#[derive(Debug, Default, Deserialize)]
pub struct UpsertProfileRequest {
    pub user_id: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

// -- Shared --

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
