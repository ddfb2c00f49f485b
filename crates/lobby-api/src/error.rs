use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Infrastructure failures. Client mistakes never end up here; they are
/// answered directly with a 4xx [`HandlerResponse`](crate::request::HandlerResponse).
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("database error: {0:#}")]
    Database(#[from] anyhow::Error),

    #[error("malformed request body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("handler task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// No error envelope: the failure is logged and the caller sees a bare 500.
impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        error!("{}", self);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
