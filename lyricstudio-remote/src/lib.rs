mod error;

pub use error::RemoteError;

use async_trait::async_trait;
use lyricstudio_core::{
    AudioMetadata, CoreError, LyricLine, LyricsDocument, Project, ProjectDraft, ProjectStore,
    RemoteConfig,
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const LOG_TARGET: &str = "lyricstudio::remote";

/// Body of a lyrics save; borrows the lines instead of cloning them
#[derive(Serialize)]
struct SaveLyricsBody<'a> {
    lines: &'a [LyricLine],
}

/// Project backend reached over HTTP
pub struct HttpProjectStore {
    client: ClientWithMiddleware,
    base_url: String,
}

impl HttpProjectStore {
    /// Create a client for the backend at `config.base_url` with the
    /// configured timeout and retry count.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s) or the HTTP client
    /// cannot be created.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RemoteError::InvalidBaseUrl {
                url: config.base_url.clone(),
            });
        }

        // Base client with timeout
        let base_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("LyricStudio/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Wrap with retry middleware (exponential backoff)
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, base_url })
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn projects_url(&self) -> String {
        format!("{}/projects", self.base_url)
    }

    fn project_url(&self, id: &str) -> String {
        format!("{}/projects/{}", self.base_url, urlencoding::encode(id))
    }

    fn lyrics_url(&self, project_id: &str) -> String {
        format!("{}/lyrics", self.project_url(project_id))
    }

    fn audio_metadata_url(&self, project_id: &str) -> String {
        format!("{}/audio/metadata", self.project_url(project_id))
    }

    /// Map non-success statuses to errors
    fn check_status(
        response: reqwest::Response,
        resource: &str,
        project_id: &str,
    ) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        debug!(target: LOG_TARGET, "{} {}", status, response.url());

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound {
                resource: resource.to_string(),
                project_id: project_id.to_string(),
            });
        }

        if !status.is_success() {
            warn!(target: LOG_TARGET, "Backend returned status {status} for {}", response.url());
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
        project_id: &str,
    ) -> Result<T, RemoteError> {
        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response, resource, project_id)?;
        response.json().await.map_err(RemoteError::Decode)
    }
}

#[async_trait]
impl ProjectStore for HttpProjectStore {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get_project(&self, id: &str) -> Result<Project, CoreError> {
        debug!(target: LOG_TARGET, "Fetching project {id}");
        Ok(self.get_json(&self.project_url(id), "Project", id).await?)
    }

    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, CoreError> {
        info!(target: LOG_TARGET, "Creating project {:?}", draft.name);
        let response = self
            .client
            .post(self.projects_url())
            .json(draft)
            .send()
            .await
            .map_err(RemoteError::from)?;
        let response = Self::check_status(response, "Projects endpoint", "")?;
        let project: Project = response.json().await.map_err(RemoteError::Decode)?;
        info!(target: LOG_TARGET, "Created project {}", project.id);
        Ok(project)
    }

    async fn update_project(&self, id: &str, draft: &ProjectDraft) -> Result<Project, CoreError> {
        let response = self
            .client
            .put(self.project_url(id))
            .json(draft)
            .send()
            .await
            .map_err(RemoteError::from)?;
        let response = Self::check_status(response, "Project", id)?;
        Ok(response.json().await.map_err(RemoteError::Decode)?)
    }

    async fn delete_project(&self, id: &str) -> Result<(), CoreError> {
        info!(target: LOG_TARGET, "Deleting project {id}");
        let response = self
            .client
            .delete(self.project_url(id))
            .send()
            .await
            .map_err(RemoteError::from)?;
        Self::check_status(response, "Project", id)?;
        Ok(())
    }

    async fn load_lyrics(&self, project_id: &str) -> Result<Vec<LyricLine>, CoreError> {
        let result = self
            .get_json::<LyricsDocument>(&self.lyrics_url(project_id), "Lyrics", project_id)
            .await;
        let doc = match result {
            Ok(doc) => doc,
            // Nothing saved for this project yet
            Err(RemoteError::NotFound { .. }) => {
                debug!(target: LOG_TARGET, "No lyrics saved for project {project_id}");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        info!(
            target: LOG_TARGET,
            "Loaded {} lines for project {project_id}",
            doc.lines.len()
        );
        Ok(doc.lines)
    }

    async fn save_lyrics(&self, project_id: &str, lines: &[LyricLine]) -> Result<(), CoreError> {
        let response = self
            .client
            .post(self.lyrics_url(project_id))
            .json(&SaveLyricsBody { lines })
            .send()
            .await
            .map_err(RemoteError::from)?;
        Self::check_status(response, "Lyrics", project_id)?;
        debug!(target: LOG_TARGET, "Saved {} lines for project {project_id}", lines.len());
        Ok(())
    }

    async fn audio_metadata(&self, project_id: &str) -> Result<AudioMetadata, CoreError> {
        Ok(self
            .get_json(&self.audio_metadata_url(project_id), "Audio metadata", project_id)
            .await?)
    }
}
