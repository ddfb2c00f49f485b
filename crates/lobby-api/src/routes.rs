use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::{any, post},
};

use lobby_db::Database;
use lobby_types::api::ErrorResponse;

use crate::error::HandlerError;
use crate::function::{self, Function, FunctionEvent};
use crate::request::{HandlerRequest, HandlerResponse};

/// Body limit for every route except `/news`.
const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

pub fn router(db: Database) -> Router {
    let state: AppState = Arc::new(AppStateInner { db });

    Router::new()
        .route("/chat", any(chat))
        // Unbounded: an oversized inline image is dropped by the handler, the post is still stored.
        .route("/news", any(news).layer(DefaultBodyLimit::disable()))
        .route("/profile", any(profile))
        .route("/functions/{name}", post(invoke_function))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(map_response(allow_any_origin))
        .with_state(state)
}

/// Extractor rejections bypass the handlers; give them the CORS header too.
async fn allow_any_origin(mut response: Response) -> Response {
    response
        .headers_mut()
        .entry(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .or_insert(HeaderValue::from_static("*"));
    response
}

async fn chat(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Result<HandlerResponse, HandlerError> {
    dispatch(state, Function::Chat, request(method, headers, query, body)).await
}

async fn news(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Result<HandlerResponse, HandlerError> {
    dispatch(state, Function::News, request(method, headers, query, body)).await
}

async fn profile(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Result<HandlerResponse, HandlerError> {
    dispatch(state, Function::Profile, request(method, headers, query, body)).await
}

/// POST /functions/{name} — invoke a handler with a serverless-style event document.
async fn invoke_function(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(event): Json<FunctionEvent>,
) -> Result<Response, HandlerError> {
    let function = match name.parse::<Function>() {
        Ok(function) => function,
        Err(e) => {
            return Ok((StatusCode::NOT_FOUND, Json(ErrorResponse::new(e.to_string()))).into_response());
        }
    };

    // rusqlite is blocking; keep it off the async workers
    let result = tokio::task::spawn_blocking(move || function::invoke(&state.db, function, event)).await??;

    Ok(Json(result).into_response())
}

fn request(method: Method, headers: HeaderMap, query: HashMap<String, String>, body: String) -> HandlerRequest {
    HandlerRequest {
        method,
        headers,
        query,
        body: (!body.is_empty()).then_some(body),
    }
}

async fn dispatch(
    state: AppState,
    function: Function,
    req: HandlerRequest,
) -> Result<HandlerResponse, HandlerError> {
    tokio::task::spawn_blocking(move || function.handle(&state.db, &req)).await?
}
