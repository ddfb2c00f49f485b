//! `/chat`: a flat list of messages, oldest first.

use axum::http::{Method, StatusCode};
use tracing::info;

use lobby_db::models::MessageRow;
use lobby_db::{Database, DbConnection, queries};
use lobby_types::api::{MessageListResponse, MessageResponse, SendMessageRequest, SuccessResponse};
use lobby_types::models::ChatMessage;

use crate::error::HandlerError;
use crate::request::{CorsPolicy, HandlerRequest, HandlerResponse, id_param};
use crate::time::parse_timestamp;

pub const CORS: CorsPolicy = CorsPolicy {
    allow_methods: "GET, POST, DELETE, OPTIONS",
    allow_headers: "Content-Type, X-User-Id",
};

/// Author name stored when a message arrives without one.
pub const DEFAULT_USER_NAME: &str = "Anonymous";

pub fn handle(db: &Database, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
    match req.method {
        Method::OPTIONS => Ok(HandlerResponse::preflight(&CORS)),
        Method::GET => db.with_conn(list_messages),
        Method::POST => db.with_conn(|conn| send_message(conn, req)),
        Method::DELETE => db.with_conn(|conn| delete_message(conn, req)),
        _ => HandlerResponse::method_not_allowed(),
    }
}

fn list_messages(conn: &DbConnection) -> Result<HandlerResponse, HandlerError> {
    let messages = queries::list_messages(conn)?
        .into_iter()
        .map(message_from_row)
        .collect();

    HandlerResponse::json(StatusCode::OK, &MessageListResponse { messages })
}

fn send_message(conn: &DbConnection, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
    let body: SendMessageRequest = req.json_body()?;
    let text = body.text.unwrap_or_default();
    let user_name = body.user_name.unwrap_or_else(|| DEFAULT_USER_NAME.to_string());

    let row = queries::insert_message(conn, &text, &user_name)?;
    info!("Message {} posted by {}", row.id, row.user_name);

    HandlerResponse::json(
        StatusCode::CREATED,
        &MessageResponse {
            message: message_from_row(row),
        },
    )
}

fn delete_message(conn: &DbConnection, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
    let id = match id_param(req, "Message") {
        Ok(Some(id)) => id,
        Ok(None) => return HandlerResponse::error(StatusCode::BAD_REQUEST, "Message ID required"),
        Err(message) => return HandlerResponse::error(StatusCode::BAD_REQUEST, &message),
    };

    // Deleting an id that does not exist still counts as success.
    let removed = queries::delete_message(conn, id)?;
    info!("Message {} deleted ({} row(s))", id, removed);

    HandlerResponse::json(StatusCode::OK, &SuccessResponse { success: true })
}

fn message_from_row(row: MessageRow) -> ChatMessage {
    ChatMessage {
        timestamp: parse_timestamp(&row.timestamp, row.id),
        id: row.id,
        text: row.text,
        user_name: row.user_name,
    }
}
