//! Stateless HTTP request builder and response parser for the portal API.
//!
//! # Design
//! `PortalClient` holds only the two base URLs and carries no mutable state
//! between calls. Each endpoint is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller (usually `PortalApi`) executes the HTTP round-trip in between,
//! keeping this module deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{Credentials, HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AssignmentSummary, ChatMessage, ErrorEnvelope, UserCode, UserRecord, UserUpdate};

const CHAT_PATH: &str = "/api/v1/chat/message";

/// Fields of the update envelope that may hold the updated record, in
/// priority order.
const UPDATED_RECORD_FIELDS: [&str; 3] = ["usuario", "user", "data"];

/// Synchronous, stateless client for the portal API.
///
/// `origin` hosts the chat endpoint; `api_base_url` is the prefix of every
/// user endpoint (normally `{origin}/api/v1`).
#[derive(Debug, Clone)]
pub struct PortalClient {
    origin: String,
    api_base_url: String,
}

impl PortalClient {
    pub fn new(origin: &str, api_base_url: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client whose user endpoints live under `{origin}/api/v1`.
    pub fn from_origin(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self::new(origin, &format!("{origin}/api/v1"))
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn build_send_chat_message(&self, text: &str) -> Result<HttpRequest, ApiError> {
        if text.trim().is_empty() {
            return Err(ApiError::InvalidInput("chat message must not be empty".to_string()));
        }
        let body = serde_json::to_string(&ChatMessage {
            message: text.to_string(),
        })
        .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{CHAT_PATH}", self.origin),
            headers: json_content_type(),
            body: Some(body),
            credentials: Credentials::Omit,
        })
    }

    pub fn build_get_current_user(&self) -> HttpRequest {
        self.authenticated_get(format!("{}/usuario/logado", self.api_base_url))
    }

    pub fn build_list_all_users(&self) -> HttpRequest {
        self.authenticated_get(format!("{}/usuario", self.api_base_url))
    }

    pub fn build_list_students_for_teacher(&self, teacher: UserCode) -> HttpRequest {
        self.authenticated_get(format!("{}/usuario/professor/{teacher}/alunos", self.api_base_url))
    }

    pub fn build_auto_assign_students(&self, teacher: UserCode) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/usuario/professor/{teacher}/associar-alunos", self.api_base_url),
            headers: json_content_type(),
            body: None,
            credentials: Credentials::Include,
        }
    }

    pub fn build_update_user(&self, user: UserCode, update: &UserUpdate) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(update).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut headers = json_content_type();
        headers.push(("accept".to_string(), "application/json".to_string()));
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}/usuario/{user}", self.api_base_url),
            headers,
            body: Some(body),
            credentials: Credentials::Include,
        })
    }

    /// Extract the bot reply. The status code is not consulted: the envelope
    /// alone decides whether the reply is usable.
    pub fn parse_send_chat_message(&self, response: HttpResponse) -> Result<String, ApiError> {
        let envelope: Option<Value> = serde_json::from_str(&response.body).ok();
        tracing::debug!(status = response.status, envelope = %response.body, "chat backend replied");

        let envelope = envelope.ok_or_else(|| ApiError::InvalidResponse("chat reply is not JSON".to_string()))?;
        match envelope.get("message").and_then(Value::as_str) {
            Some(message) if !message.is_empty() => Ok(message.to_string()),
            _ => Err(ApiError::InvalidResponse("chat reply has no message".to_string())),
        }
    }

    pub fn parse_get_current_user(&self, response: HttpResponse) -> Result<UserRecord, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_list_all_users(&self, response: HttpResponse) -> Result<Vec<UserRecord>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// A 404 means the teacher has no students yet and yields an empty list.
    pub fn parse_list_students_for_teacher(&self, response: HttpResponse) -> Result<Vec<UserRecord>, ApiError> {
        if response.status == 404 {
            tracing::debug!("no students linked to teacher");
            return Ok(Vec::new());
        }
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_auto_assign_students(&self, response: HttpResponse) -> Result<AssignmentSummary, ApiError> {
        if !response.is_success() {
            let reason = failure_reason(&response, "failed to assign students");
            tracing::warn!(status = response.status, %reason, "student assignment rejected");
            return Err(ApiError::AssignmentError { reason });
        }
        decode(&response.body)
    }

    /// The body is decoded leniently on both paths: an unparsable success
    /// body resolves to an empty object rather than an error.
    pub fn parse_update_user(&self, response: HttpResponse) -> Result<UserRecord, ApiError> {
        if !response.is_success() {
            let reason = failure_reason(&response, "failed to update user");
            tracing::warn!(status = response.status, %reason, "user update rejected");
            return Err(ApiError::UpdateError { reason });
        }
        let envelope: Value =
            serde_json::from_str(&response.body).unwrap_or_else(|_| Value::Object(Default::default()));
        Ok(UserRecord(resolve_updated_record(envelope)))
    }

    fn authenticated_get(&self, path: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
            credentials: Credentials::Include,
        }
    }
}

fn json_content_type() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

/// Map non-2xx status codes to `ApiError::HttpError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    tracing::warn!(status = response.status, "backend returned non-success status");
    Err(ApiError::HttpError {
        status: response.status,
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// The envelope's `erro` when present and non-empty, otherwise a message
/// built from `prefix` and the status. Never fails.
fn failure_reason(response: &HttpResponse, prefix: &str) -> String {
    let envelope: ErrorEnvelope = serde_json::from_str(&response.body).unwrap_or_default();
    match envelope.erro {
        Some(erro) if !erro.is_empty() => erro,
        _ => format!("{prefix}: HTTP {}", response.status),
    }
}

/// First truthy value among `usuario`, `user` and `data`, else the envelope.
fn resolve_updated_record(mut envelope: Value) -> Value {
    for field in UPDATED_RECORD_FIELDS {
        if envelope.get(field).is_some_and(is_truthy) {
            return envelope[field].take();
        }
    }
    envelope
}

/// JSON truthiness: null, false, zero and the empty string are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
