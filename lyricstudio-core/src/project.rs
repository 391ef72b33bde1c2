use crate::error::Result;
use crate::line::LyricLine;
use crate::playback::AudioMetadata;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields sent when creating or renaming a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Lyrics payload exchanged with the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricsDocument {
    pub lines: Vec<LyricLine>,
}

/// Storage for projects, their lyrics and audio metadata.
///
/// Saves are last-write-wins; implementations do not merge.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &'static str;

    async fn get_project(&self, id: &str) -> Result<Project>;

    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project>;

    async fn update_project(&self, id: &str, draft: &ProjectDraft) -> Result<Project>;

    async fn delete_project(&self, id: &str) -> Result<()>;

    /// Lyrics saved for the project, empty if none were saved yet
    async fn load_lyrics(&self, project_id: &str) -> Result<Vec<LyricLine>>;

    /// Replace the project's lyrics with `lines`
    async fn save_lyrics(&self, project_id: &str, lines: &[LyricLine]) -> Result<()>;

    async fn audio_metadata(&self, project_id: &str) -> Result<AudioMetadata>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::LineId;

    #[test]
    fn test_lyrics_document_json_shape() {
        let doc = LyricsDocument {
            lines: vec![
                LyricLine::new(LineId(1), "a", Some(1.5)),
                LyricLine::new(LineId(2), "b", None),
            ],
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            r#"{"lines":[{"id":1,"text":"a","timestamp":1.5},{"id":2,"text":"b"}]}"#
        );
        let back: LyricsDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_project_optional_timestamps() {
        let project: Project = serde_json::from_str(r#"{"id":"p1","name":"Demo"}"#).unwrap();
        assert_eq!(project.id, "p1");
        assert!(project.created_at.is_none());

        let project: Project = serde_json::from_str(
            r#"{"id":"p1","name":"Demo","created_at":"2024-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(
            project.created_at.map(|t| t.to_rfc3339()),
            Some("2024-03-01T12:00:00+00:00".to_string())
        );
    }
}
