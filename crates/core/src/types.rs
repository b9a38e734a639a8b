use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub videos: Vec<VideoSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub content: String,
    pub word_count: u64,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub title: String,
    pub summary_text: String,
    #[serde(default)]
    pub key_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default)]
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PdfRequest {
    pub video_id: String,
    pub include_summary: bool,
    pub include_quiz: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PdfFile {
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexRequest {
    pub video_id: String,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub video_id: String,
    pub title: String,
    #[serde(default, alias = "channel_name")]
    pub channel_title: String,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationList {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    pub script: String,
    pub word_count: u64,
    pub estimated_duration_minutes: u32,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Slides {
    pub title: String,
    pub filename: String,
    pub slide_count: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageUrls {
    pub small: String,
    pub full: String,
    #[serde(default)]
    pub regular: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageAsset {
    pub id: String,
    pub urls: ImageUrls,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attribution: String,
}

/// Body shared by the voice and video generators. A 2xx response may still
/// carry `success: false`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaResult {
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A successfully generated audio or video file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub filename: String,
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoiceCatalog {
    pub voices: Vec<Voice>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoStatus {
    pub available: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub auth_provider: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthGrant {
    pub access_token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Server-generated downloadable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Pdf,
    Slides,
    Voice,
    Video,
}

impl ArtifactKind {
    pub fn download_path(&self, filename: &str) -> String {
        let prefix = match self {
            ArtifactKind::Pdf => "/api/pdf/download",
            ArtifactKind::Slides => "/api/content/slides/download",
            ArtifactKind::Voice => "/api/content/voice/download",
            ArtifactKind::Video => "/api/content/video/download",
        };
        format!("{prefix}/{filename}")
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::Pdf => "pdf",
            ArtifactKind::Slides => "slides",
            ArtifactKind::Voice => "voice",
            ArtifactKind::Video => "video",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub filename: String,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, filename: impl Into<String>) -> Self {
        Self {
            kind,
            filename: filename.into(),
        }
    }

    pub fn download_path(&self) -> String {
        self.kind.download_path(&self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_accepts_backend_channel_field() {
        let rec: Recommendation = serde_json::from_value(serde_json::json!({
            "video_id": "abc",
            "title": "Rust ownership",
            "channel_name": "Ferris",
            "similarity_score": 0.91,
            "thumbnail_url": ""
        }))
        .unwrap();
        assert_eq!(rec.channel_title, "Ferris");
    }

    #[test]
    fn artifact_paths_follow_backend_routes() {
        assert_eq!(
            Artifact::new(ArtifactKind::Pdf, "notes_abc.pdf").download_path(),
            "/api/pdf/download/notes_abc.pdf"
        );
        assert_eq!(
            ArtifactKind::Slides.download_path("deck.pptx"),
            "/api/content/slides/download/deck.pptx"
        );
        assert_eq!(
            ArtifactKind::Video.download_path("video_abc.mp4"),
            "/api/content/video/download/video_abc.mp4"
        );
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut user = UserProfile {
            id: 1,
            email: "kumar@example.com".into(),
            full_name: None,
            avatar_url: None,
            auth_provider: "local".into(),
            is_admin: false,
        };
        assert_eq!(user.display_name(), "kumar@example.com");
        user.full_name = Some("Kumar G".into());
        assert_eq!(user.display_name(), "Kumar G");
    }
}
