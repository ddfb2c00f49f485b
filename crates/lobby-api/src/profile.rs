//! `/profile`: one profile per `user_id`, written with upsert semantics.

use axum::http::{Method, StatusCode};
use tracing::info;

use lobby_db::models::ProfileRow;
use lobby_db::{Database, DbConnection, queries};
use lobby_types::api::{ProfileResponse, UpsertProfileRequest};
use lobby_types::models::Profile;

use crate::error::HandlerError;
use crate::request::{CorsPolicy, HandlerRequest, HandlerResponse};
use crate::time::parse_timestamp;

// PUT is advertised to browsers but not served.
pub const CORS: CorsPolicy = CorsPolicy {
    allow_methods: "GET, POST, PUT, OPTIONS",
    allow_headers: "Content-Type, X-User-Id",
};

pub fn handle(db: &Database, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
    match req.method {
        Method::OPTIONS => Ok(HandlerResponse::preflight(&CORS)),
        Method::GET => db.with_conn(|conn| get_profile(conn, req)),
        Method::POST => db.with_conn(|conn| upsert_profile(conn, req)),
        _ => HandlerResponse::method_not_allowed(),
    }
}

fn get_profile(conn: &DbConnection, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
    let Some(user_id) = req.query_param("user_id") else {
        return HandlerResponse::error(StatusCode::BAD_REQUEST, "user_id required");
    };

    match queries::get_profile(conn, user_id)? {
        Some(row) => HandlerResponse::json(
            StatusCode::OK,
            &ProfileResponse {
                profile: profile_from_row(row),
            },
        ),
        None => HandlerResponse::error(StatusCode::NOT_FOUND, "Profile not found"),
    }
}

/// Insert or overwrite. Answers 201 either way.
fn upsert_profile(conn: &DbConnection, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
    let body: UpsertProfileRequest = req.json_body()?;

    let user_id = body.user_id.filter(|u| !u.is_empty());
    let nickname = body.nickname.filter(|n| !n.is_empty());
    let (Some(user_id), Some(nickname)) = (user_id, nickname) else {
        return HandlerResponse::error(StatusCode::BAD_REQUEST, "user_id and nickname required");
    };
    let avatar = body.avatar.filter(|a| !a.is_empty());
    let bio = body.bio.filter(|b| !b.is_empty());

    let row = queries::upsert_profile(conn, &user_id, &nickname, avatar.as_deref(), bio.as_deref())?;
    info!("Profile {} saved for user {}", row.id, row.user_id);

    HandlerResponse::json(
        StatusCode::CREATED,
        &ProfileResponse {
            profile: profile_from_row(row),
        },
    )
}

fn profile_from_row(row: ProfileRow) -> Profile {
    Profile {
        created_at: parse_timestamp(&row.created_at, row.id),
        id: row.id,
        user_id: row.user_id,
        nickname: row.nickname,
        avatar: row.avatar,
        bio: row.bio,
    }
}
