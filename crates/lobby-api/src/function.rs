//! Cloud-function style invocation: an event document in, a result document out.
//!
//! This is the same request/response contract as the HTTP routes, shaped the
//! way serverless platforms hand requests to a function.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn};
use uuid::Uuid;

use lobby_db::Database;

use crate::error::HandlerError;
use crate::request::{HandlerRequest, HandlerResponse};
use crate::{chat, news, profile};

/// The three deployable functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Chat,
    News,
    Profile,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::News => "news",
            Self::Profile => "profile",
        }
    }

    pub fn handle(self, db: &Database, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
        match self {
            Self::Chat => chat::handle(db, req),
            Self::News => news::handle(db, req),
            Self::Profile => profile::handle(db, req),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown function '{0}'")]
pub struct UnknownFunction(pub String);

impl FromStr for Function {
    type Err = UnknownFunction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "news" => Ok(Self::News),
            "profile" => Ok(Self::Profile),
            other => Err(UnknownFunction(other.to_string())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    /// Defaults to GET when the platform leaves it out.
    pub http_method: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub query_string_parameters: Option<HashMap<String, String>>,
    pub body: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResult {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// Per-invocation metadata, attached to every log line of the invocation.
#[derive(Debug, Clone)]
pub struct FunctionContext {
    pub request_id: Uuid,
    pub function_name: &'static str,
}

impl FunctionContext {
    pub fn new(function: Function) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            function_name: function.name(),
        }
    }
}

/// Run one invocation. Blocking: call from a blocking thread.
pub fn invoke(
    db: &Database,
    function: Function,
    event: FunctionEvent,
) -> Result<FunctionResult, HandlerError> {
    let ctx = FunctionContext::new(function);
    let span = info_span!("function", request_id = %ctx.request_id, function_name = ctx.function_name);
    let _enter = span.enter();

    let method_name = event.http_method.as_deref().unwrap_or("GET").to_ascii_uppercase();
    debug!("Invoking with {}", method_name);

    let response = match Method::from_bytes(method_name.as_bytes()) {
        Ok(method) => function.handle(db, &request_from_event(method, event))?,
        Err(_) => HandlerResponse::method_not_allowed()?,
    };

    Ok(result_from_response(response))
}

fn request_from_event(method: Method, event: FunctionEvent) -> HandlerRequest {
    let mut headers = HeaderMap::new();
    for (name, value) in event.headers.unwrap_or_default() {
        match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!("Skipping invalid event header '{}'", name),
        }
    }

    HandlerRequest {
        method,
        headers,
        query: event.query_string_parameters.unwrap_or_default(),
        body: event.body,
    }
}

fn result_from_response(response: HandlerResponse) -> FunctionResult {
    let headers = response
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (canonical_header_name(name.as_str()), v.to_string()))
        })
        .collect();

    FunctionResult {
        status_code: response.status.as_u16(),
        headers,
        body: response.body,
        is_base64_encoded: false,
    }
}

/// `access-control-allow-origin` -> `Access-Control-Allow-Origin`.
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
