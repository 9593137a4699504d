//! Remote create boundary.

use crate::model::scope::Scope;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Payload of one outbound create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateNoteRequest {
    pub scope: Scope,
    pub text: String,
}

/// Success payload. `id` is the canonical identifier when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateNoteResponse {
    #[serde(default)]
    pub id: Option<String>,
}

impl CreateNoteResponse {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }

    /// Canonical id exactly as sent, ignoring blank values.
    pub fn canonical_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }
}

/// Any outcome of a create call other than success.
///
/// All variants are handled the same way by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Non-success HTTP status.
    Status(u16),
    /// Connection, timeout or other transport fault.
    Transport(String),
    /// Success status with a body that could not be decoded.
    MalformedBody(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "remote rejected create with status {code}"),
            Self::Transport(message) => write!(f, "remote create transport failure: {message}"),
            Self::MalformedBody(message) => write!(f, "remote create returned malformed body: {message}"),
        }
    }
}

impl Error for RemoteError {}

/// Remote collaborator that accepts note creations.
pub trait RemoteNotes {
    /// Issues exactly one create request.
    fn create_note(
        &self,
        request: CreateNoteRequest,
    ) -> impl Future<Output = RemoteResult<CreateNoteResponse>>;
}
