use lyricstudio_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid backend URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Failed to decode response body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    #[error("{resource} not found")]
    NotFound { resource: String, project_id: String },

    #[error("Backend returned {status} for {url}")]
    Status { status: u16, url: String },
}

impl From<RemoteError> for CoreError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound { project_id, .. } => Self::ProjectNotFound { id: project_id },
            other => Self::Backend {
                reason: other.to_string(),
            },
        }
    }
}
