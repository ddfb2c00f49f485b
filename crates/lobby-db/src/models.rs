/// Database row types. Timestamps stay as the stored text; the API layer
/// parses them. Distinct from lobby-types models to keep the DB layer independent.

pub struct MessageRow {
    pub id: i64,
    pub text: String,
    pub timestamp: String,
    pub user_name: String,
}

pub struct NewsRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: String,
    pub author_id: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}

pub struct ProfileRow {
    pub id: i64,
    pub user_id: String,
    pub nickname: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
}
