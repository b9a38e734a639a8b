//! Typed access to the TubeMentor backend.
//!
//! [`Backend`] is the seam every controller talks through; [`ApiClient`] is
//! the reqwest implementation. No retries and no caching: one call, one
//! request.

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::{
    config::ClientConfig,
    error::{ApiError, Result},
    types::{
        Artifact, AuthGrant, Credentials, ImageAsset, IndexRequest, MediaResult, PdfFile,
        PdfRequest, Quiz, RecommendationList, Script, SearchRequest, SearchResponse,
        SignupForm, Slides, Summary, Transcript, UserProfile, VideoStatus, VoiceCatalog,
    },
};

#[async_trait]
pub trait Backend: Send + Sync {
    /// Token attached as `Authorization: Bearer` to subsequent calls.
    fn set_bearer(&self, token: Option<String>);

    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse>;
    async fn semantic_search(&self, query: &str, k: u32) -> Result<RecommendationList>;
    async fn transcript(&self, video_id: &str, language: &str) -> Result<Transcript>;
    async fn summary(&self, video_id: &str) -> Result<Summary>;
    async fn quiz(&self, video_id: &str, num_questions: u32) -> Result<Quiz>;
    async fn pdf(&self, req: &PdfRequest) -> Result<PdfFile>;
    async fn index_video(&self, req: &IndexRequest) -> Result<()>;
    async fn similar_videos(&self, video_id: &str, k: u32) -> Result<RecommendationList>;

    async fn script(&self, video_id: &str, duration_minutes: u32) -> Result<Script>;
    async fn slides(&self, video_id: &str) -> Result<Slides>;
    async fn images(&self, video_id: &str) -> Result<Vec<ImageAsset>>;
    async fn voice(&self, video_id: &str, voice_id: Option<&str>) -> Result<MediaResult>;
    async fn video(
        &self,
        video_id: &str,
        include_audio: bool,
        voice_id: Option<&str>,
    ) -> Result<MediaResult>;
    async fn voices(&self) -> Result<VoiceCatalog>;
    async fn video_status(&self) -> Result<VideoStatus>;

    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant>;
    async fn signup(&self, form: &SignupForm) -> Result<AuthGrant>;
    async fn google(&self, access_token: &str) -> Result<AuthGrant>;
    async fn current_user(&self, token: &str) -> Result<UserProfile>;
}

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    bearer: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            bearer: RwLock::new(None),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    /// Absolute link for a generated file, suitable for a browser or a
    /// download manager.
    pub fn download_url(&self, artifact: &Artifact) -> Url {
        let path = artifact.download_path();
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        self.endpoint(&segments)
    }

    pub async fn download(&self, artifact: &Artifact) -> Result<Vec<u8>> {
        let url = self.download_url(artifact);
        debug!(%url, "downloading artifact");
        let response = self.authorized(self.http.get(url)).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn bearer(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, path = url.path(), "backend request");
        self.authorized(self.http.request(method, url))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        read_json(response).await
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        detail: extract_detail(&body),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Pulls the user-facing message out of an error body.
///
/// The backend answers `{"detail": "..."}` for handled errors and
/// `{"detail": [{"msg": "..."}, ...]}` for request validation failures.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(items) => items
            .first()?
            .get("msg")?
            .as_str()
            .map(str::to_string),
        _ => None,
    }
}

#[async_trait]
impl Backend for ApiClient {
    fn set_bearer(&self, token: Option<String>) {
        *self
            .bearer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse> {
        self.send(self.request(Method::POST, &["api", "search", ""]).json(req)).await
    }

    async fn semantic_search(&self, query: &str, k: u32) -> Result<RecommendationList> {
        self.send(
            self.request(Method::GET, &["api", "recommendations", "search"])
                .query(&[("q", query.to_string()), ("k", k.to_string())]),
        )
        .await
    }

    async fn transcript(&self, video_id: &str, language: &str) -> Result<Transcript> {
        self.send(
            self.request(Method::POST, &["api", "transcript", ""])
                .json(&json!({ "video_id": video_id, "language": language })),
        )
        .await
    }

    async fn summary(&self, video_id: &str) -> Result<Summary> {
        self.send(
            self.request(Method::POST, &["api", "summary", ""])
                .json(&json!({ "video_id": video_id })),
        )
        .await
    }

    async fn quiz(&self, video_id: &str, num_questions: u32) -> Result<Quiz> {
        self.send(
            self.request(Method::POST, &["api", "quiz", ""])
                .json(&json!({ "video_id": video_id, "num_questions": num_questions })),
        )
        .await
    }

    async fn pdf(&self, req: &PdfRequest) -> Result<PdfFile> {
        self.send(self.request(Method::POST, &["api", "pdf", ""]).json(req))
            .await
    }

    async fn index_video(&self, req: &IndexRequest) -> Result<()> {
        let _: Value = self
            .send(
                self.request(Method::POST, &["api", "recommendations", "index"])
                    .json(req),
            )
            .await?;
        Ok(())
    }

    async fn similar_videos(&self, video_id: &str, k: u32) -> Result<RecommendationList> {
        self.send(
            self.request(
                Method::GET,
                &["api", "recommendations", "similar", video_id],
            )
            .query(&[("k", k)]),
        )
        .await
    }

    async fn script(&self, video_id: &str, duration_minutes: u32) -> Result<Script> {
        self.send(
            self.request(Method::POST, &["api", "content", "script", "from-video"])
                .json(&json!({ "video_id": video_id, "duration": duration_minutes })),
        )
        .await
    }

    async fn slides(&self, video_id: &str) -> Result<Slides> {
        self.send(
            self.request(Method::POST, &["api", "content", "slides"])
                .json(&json!({ "video_id": video_id })),
        )
        .await
    }

    async fn images(&self, video_id: &str) -> Result<Vec<ImageAsset>> {
        self.send(self.request(
            Method::GET,
            &["api", "content", "images", "for-video", video_id],
        ))
        .await
    }

    async fn voice(&self, video_id: &str, voice_id: Option<&str>) -> Result<MediaResult> {
        let mut builder = self.request(
            Method::POST,
            &["api", "content", "voice", "from-script", video_id],
        );
        if let Some(voice_id) = voice_id {
            builder = builder.query(&[("voice_id", voice_id)]);
        }
        self.send(builder).await
    }

    async fn video(
        &self,
        video_id: &str,
        include_audio: bool,
        voice_id: Option<&str>,
    ) -> Result<MediaResult> {
        let mut builder = self
            .request(
                Method::POST,
                &["api", "content", "video", "generate", video_id],
            )
            .query(&[("include_audio", include_audio)]);
        if let Some(voice_id) = voice_id {
            builder = builder.query(&[("voice_id", voice_id)]);
        }
        self.send(builder).await
    }

    async fn voices(&self) -> Result<VoiceCatalog> {
        self.send(self.request(Method::GET, &["api", "content", "voice", "voices"]))
            .await
    }

    async fn video_status(&self) -> Result<VideoStatus> {
        self.send(self.request(Method::GET, &["api", "content", "video", "status"]))
            .await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant> {
        self.send(
            self.request(Method::POST, &["api", "auth", "login"])
                .json(credentials),
        )
        .await
    }

    async fn signup(&self, form: &SignupForm) -> Result<AuthGrant> {
        self.send(self.request(Method::POST, &["api", "auth", "signup"]).json(form))
            .await
    }

    async fn google(&self, access_token: &str) -> Result<AuthGrant> {
        self.send(
            self.request(Method::POST, &["api", "auth", "google"])
                .json(&json!({ "access_token": access_token })),
        )
        .await
    }

    async fn current_user(&self, token: &str) -> Result<UserProfile> {
        let url = self.endpoint(&["api", "auth", "me"]);
        debug!(path = url.path(), "validating session token");
        self.send(self.http.get(url).bearer_auth(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArtifactKind;

    #[test]
    fn detail_from_string_body() {
        assert_eq!(
            extract_detail(r#"{"detail":"Invalid email or password"}"#).as_deref(),
            Some("Invalid email or password")
        );
    }

    #[test]
    fn detail_from_validation_body() {
        let body = r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error"}]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("value is not a valid email address")
        );
    }

    #[test]
    fn detail_missing_or_unparsable() {
        assert_eq!(extract_detail("Internal Server Error"), None);
        assert_eq!(extract_detail(r#"{"message":"nope"}"#), None);
    }

    #[test]
    fn endpoint_keeps_base_prefix_and_trailing_slash() {
        let client = ApiClient::new(Url::parse("https://tubementor.dev/backend/").unwrap());
        assert_eq!(
            client.endpoint(&["api", "search", ""]).as_str(),
            "https://tubementor.dev/backend/api/search/"
        );
        assert_eq!(
            client
                .download_url(&Artifact::new(ArtifactKind::Pdf, "notes.pdf"))
                .as_str(),
            "https://tubementor.dev/backend/api/pdf/download/notes.pdf"
        );
    }
}
