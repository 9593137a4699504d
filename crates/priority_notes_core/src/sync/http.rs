//! HTTP implementation of the remote create boundary.

use super::remote::{CreateNoteRequest, CreateNoteResponse, RemoteError, RemoteNotes, RemoteResult};
use log::debug;
use std::time::Duration;

/// Posts create requests as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpRemoteNotes {
    client: reqwest::Client,
    create_url: String,
}

impl HttpRemoteNotes {
    /// Builds a client whose requests time out after `timeout`.
    pub fn new(create_url: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        Ok(Self::with_client(client, create_url))
    }

    pub fn with_client(client: reqwest::Client, create_url: impl Into<String>) -> Self {
        Self {
            client,
            create_url: create_url.into(),
        }
    }

    pub fn create_url(&self) -> &str {
        &self.create_url
    }
}

impl RemoteNotes for HttpRemoteNotes {
    async fn create_note(&self, request: CreateNoteRequest) -> RemoteResult<CreateNoteResponse> {
        let response = self
            .client
            .post(&self.create_url)
            .json(&request)
            .send()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        let status = response.status();
        debug!(
            "event=remote_create module=sync status_code={} scope={}",
            status.as_u16(),
            request.scope
        );
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        serde_json::from_slice::<CreateNoteResponse>(&body)
            .map_err(|err| RemoteError::MalformedBody(err.to_string()))
    }
}
