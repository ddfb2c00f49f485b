use std::collections::HashMap;

use axum::{
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use lobby_types::api::ErrorResponse;

use crate::error::HandlerError;

/// Preflight allow-lists advertised by one handler.
#[derive(Debug, Clone, Copy)]
pub struct CorsPolicy {
    pub allow_methods: &'static str,
    pub allow_headers: &'static str,
}

/// Browsers may cache a preflight answer for a day.
pub const PREFLIGHT_MAX_AGE: &str = "86400";

/// Everything a handler gets to see of an incoming request.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
}

impl HandlerRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            query: HashMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// A query parameter, with an empty value counted as absent.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Decode the JSON body. A missing or blank body decodes as `T::default()`.
    pub fn json_body<T: DeserializeOwned + Default>(&self) -> Result<T, HandlerError> {
        match self.body.as_deref().map(str::trim) {
            None | Some("") => Ok(T::default()),
            Some(raw) => Ok(serde_json::from_str(raw)?),
        }
    }
}

/// What a handler answers. Always carries `Access-Control-Allow-Origin: *`.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl HandlerResponse {
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, HandlerError> {
        let mut headers = cors_headers();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            status,
            headers,
            body: serde_json::to_string(value)?,
        })
    }

    pub fn error(status: StatusCode, message: &str) -> Result<Self, HandlerError> {
        Self::json(status, &ErrorResponse::new(message))
    }

    pub fn method_not_allowed() -> Result<Self, HandlerError> {
        Self::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }

    /// Answer to an OPTIONS request. Empty body, never touches the database.
    pub fn preflight(policy: &CorsPolicy) -> Self {
        let mut headers = cors_headers();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(policy.allow_methods),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(policy.allow_headers),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE),
        );

        Self {
            status: StatusCode::OK,
            headers,
            body: String::new(),
        }
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers
}

/// Parse an `id` query parameter.
///
/// `Ok(None)` when absent; `Err` carries the 400 message when it is not an integer.
pub(crate) fn id_param(req: &HandlerRequest, what: &str) -> Result<Option<i64>, String> {
    match req.query_param("id") {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{what} ID must be an integer")),
    }
}
