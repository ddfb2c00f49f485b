//! `/news`: posts listed newest first, joined with the author's profile.

use axum::http::{Method, StatusCode};
use tracing::info;

use lobby_db::models::NewsRow;
use lobby_db::{Database, DbConnection, queries};
use lobby_types::api::{CreateNewsRequest, NewsListResponse, NewsResponse, SuccessResponse};
use lobby_types::models::NewsPost;

use crate::error::HandlerError;
use crate::request::{CorsPolicy, HandlerRequest, HandlerResponse, id_param};
use crate::time::parse_timestamp;

pub const CORS: CorsPolicy = CorsPolicy {
    allow_methods: "GET, POST, DELETE, OPTIONS",
    allow_headers: "Content-Type",
};

/// Inline images of this many characters or more are dropped, not rejected.
pub const MAX_IMAGE_LEN: usize = 500_000;

pub fn handle(db: &Database, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
    match req.method {
        Method::OPTIONS => Ok(HandlerResponse::preflight(&CORS)),
        Method::GET => db.with_conn(|conn| get_news(conn, req)),
        Method::POST => db.with_conn(|conn| create_news(conn, req)),
        Method::DELETE => db.with_conn(|conn| delete_news(conn, req)),
        _ => HandlerResponse::method_not_allowed(),
    }
}

fn get_news(conn: &DbConnection, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
    let id = match id_param(req, "News") {
        Ok(id) => id,
        Err(message) => return HandlerResponse::error(StatusCode::BAD_REQUEST, &message),
    };

    let Some(id) = id else {
        let news = queries::list_news(conn)?.into_iter().map(post_from_row).collect();
        return HandlerResponse::json(StatusCode::OK, &NewsListResponse { news });
    };

    match queries::get_news(conn, id)? {
        Some(row) => HandlerResponse::json(StatusCode::OK, &NewsResponse { news: post_from_row(row) }),
        None => HandlerResponse::error(StatusCode::NOT_FOUND, "News not found"),
    }
}

fn create_news(conn: &DbConnection, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
    let body: CreateNewsRequest = req.json_body()?;
    let title = body.title.unwrap_or_default();
    let content = body.content.unwrap_or_default();
    let image_url = accept_image(body.image);
    let author_id = body.author_id.filter(|a| !a.is_empty());

    let row = queries::insert_news(conn, &title, &content, image_url.as_deref(), author_id.as_deref())?;
    info!("News post {} created", row.id);

    HandlerResponse::json(StatusCode::CREATED, &NewsResponse { news: post_from_row(row) })
}

fn delete_news(conn: &DbConnection, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
    let id = match id_param(req, "News") {
        Ok(Some(id)) => id,
        Ok(None) => return HandlerResponse::error(StatusCode::BAD_REQUEST, "News ID required"),
        Err(message) => return HandlerResponse::error(StatusCode::BAD_REQUEST, &message),
    };

    let removed = queries::delete_news(conn, id)?;
    info!("News post {} deleted ({} row(s))", id, removed);

    HandlerResponse::json(StatusCode::OK, &SuccessResponse { success: true })
}

fn accept_image(image: Option<String>) -> Option<String> {
    let image = image.filter(|i| !i.is_empty())?;
    let len = image.chars().count();
    if len >= MAX_IMAGE_LEN {
        info!("Dropping inline image of {} chars (limit {})", len, MAX_IMAGE_LEN);
        return None;
    }
    Some(image)
}

fn post_from_row(row: NewsRow) -> NewsPost {
    NewsPost {
        created_at: parse_timestamp(&row.created_at, row.id),
        id: row.id,
        title: row.title,
        content: row.content,
        image_url: row.image_url,
        author_id: row.author_id,
        nickname: row.nickname,
        avatar: row.avatar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile;
    use crate::testing::{body_json, temp_db, unreachable_db};
    use serde_json::json;

    fn create(db: &Database, body: serde_json::Value) -> NewsPost {
        let resp = handle(db, &HandlerRequest::new(Method::POST).with_body(body.to_string())).unwrap();
        assert_eq!(resp.status, StatusCode::CREATED);
        let parsed: NewsResponse = serde_json::from_str(&resp.body).unwrap();
        parsed.news
    }

    fn list(db: &Database) -> Vec<NewsPost> {
        let resp = handle(db, &HandlerRequest::new(Method::GET)).unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        let parsed: NewsListResponse = serde_json::from_str(&resp.body).unwrap();
        parsed.news
    }

    #[test]
    fn list_is_newest_first_and_single_get_round_trips() {
        let (_dir, db) = temp_db();
        let older = create(&db, json!({"title": "Old", "content": "a"}));
        let newer = create(&db, json!({"title": "New", "content": "b", "image": "data:image/png;base64,AA=="}));

        assert_eq!(list(&db), vec![newer.clone(), older.clone()]);

        let resp = handle(&db, &HandlerRequest::new(Method::GET).with_query("id", older.id.to_string())).unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        let single: NewsResponse = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(single.news, older);
        assert_eq!(newer.image_url.as_deref(), Some("data:image/png;base64,AA=="));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (_dir, db) = temp_db();

        let resp = handle(&db, &HandlerRequest::new(Method::GET).with_query("id", "77")).unwrap();
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        assert_eq!(body_json(&resp)["error"], "News not found");
    }

    #[test]
    fn oversized_image_is_dropped_silently() {
        let (_dir, db) = temp_db();
        let huge = "x".repeat(MAX_IMAGE_LEN);
        let just_under = "y".repeat(MAX_IMAGE_LEN - 1);

        let post = create(&db, json!({"title": "Big", "content": "pic", "image": huge}));
        assert_eq!(post.title, "Big");
        assert_eq!(post.content, "pic");
        assert!(post.image_url.is_none());

        let post = create(&db, json!({"title": "Fits", "content": "pic", "image": just_under}));
        assert_eq!(post.image_url.map(|i| i.len()), Some(MAX_IMAGE_LEN - 1));
    }

    #[test]
    fn author_profile_is_joined() {
        let (_dir, db) = temp_db();
        let upsert = HandlerRequest::new(Method::POST)
            .with_body(json!({"user_id": "u1", "nickname": "Alice", "avatar": "a.png"}).to_string());
        profile::handle(&db, &upsert).unwrap();

        let authored = create(&db, json!({"title": "t", "content": "c", "author_id": "u1"}));
        assert_eq!(authored.nickname.as_deref(), Some("Alice"));
        assert_eq!(authored.avatar.as_deref(), Some("a.png"));

        let anonymous = create(&db, json!({"title": "t", "content": "c"}));
        assert!(anonymous.author_id.is_none());
        let json = serde_json::to_value(&anonymous).unwrap();
        assert!(json["nickname"].is_null());
        assert!(json["avatar"].is_null());
    }

    #[test]
    fn delete_flow() {
        let (_dir, db) = temp_db();
        let post = create(&db, json!({"title": "t", "content": "c"}));

        let resp = handle(&db, &HandlerRequest::new(Method::DELETE)).unwrap();
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&resp)["error"], "News ID required");

        for _ in 0..2 {
            let resp = handle(&db, &HandlerRequest::new(Method::DELETE).with_query("id", post.id.to_string())).unwrap();
            assert_eq!(resp.status, StatusCode::OK);
            assert_eq!(body_json(&resp)["success"], true);
        }
        assert!(list(&db).is_empty());
    }

    #[test]
    fn options_skips_the_database() {
        let (_dir, db) = unreachable_db();

        let resp = handle(&db, &HandlerRequest::new(Method::OPTIONS)).unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        assert!(resp.body.is_empty());
        assert_eq!(resp.headers[axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }
}
