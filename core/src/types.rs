//! Envelope DTOs for the portal API.
//!
//! # Design
//! The backend does not publish a fixed schema for user records, so records
//! stay as `serde_json::Value` behind thin transparent newtypes. Accessors
//! read the field names the backend uses today (`cod_usuario`, `nome`,
//! `email`) without rejecting records that lack them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Numeric identifier of a user, teacher or student.
pub type UserCode = u64;

/// Request and reply envelope of the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub message: String,
}

/// A user or student record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct UserRecord(pub Value);

impl UserRecord {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn code(&self) -> Option<UserCode> {
        self.field("cod_usuario").and_then(Value::as_u64)
    }

    pub fn name(&self) -> Option<&str> {
        self.field("nome").and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.field("email").and_then(Value::as_str)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

/// Summary returned after students were assigned to a teacher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AssignmentSummary(pub Value);

impl AssignmentSummary {
    pub fn message(&self) -> Option<&str> {
        self.0.get("mensagem").and_then(Value::as_str)
    }

    /// Students listed in the summary; empty when the backend sent none.
    pub fn students(&self) -> Vec<UserRecord> {
        self.0
            .get("alunos")
            .and_then(Value::as_array)
            .map(|alunos| alunos.iter().cloned().map(UserRecord).collect())
            .unwrap_or_default()
    }
}

/// Partial update of a user. Fields left as `None` are omitted from the JSON
/// body and stay unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Best-effort error body. Decoding falls back to `Default` when the body is
/// not the expected shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub erro: Option<String>,
}
