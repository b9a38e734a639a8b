//! In-memory backend for controller tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    api::Backend,
    error::{ApiError, Result},
    types::{
        AuthGrant, Credentials, ImageAsset, IndexRequest, MediaResult, PdfFile, PdfRequest, Quiz,
        RecommendationList, Script, SearchRequest, SearchResponse, SignupForm, Slides, Summary,
        Transcript, UserProfile, VideoStatus, VoiceCatalog,
    },
};

/// Answers each operation with a canned JSON body or error and records the
/// order operations were called in.
#[derive(Default)]
pub struct FakeBackend {
    replies: Mutex<HashMap<&'static str, std::result::Result<Value, ApiError>>>,
    calls: Mutex<Vec<&'static str>>,
    held: Mutex<HashSet<&'static str>>,
    bearer: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, op: &'static str, body: Value) {
        self.replies.lock().unwrap().insert(op, Ok(body));
    }

    pub fn fail(&self, op: &'static str, err: ApiError) {
        self.replies.lock().unwrap().insert(op, Err(err));
    }

    /// Makes `op` never answer.
    pub fn hang(&self, op: &'static str) {
        self.held.lock().unwrap().insert(op);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn bearer(&self) -> Option<String> {
        self.bearer.lock().unwrap().clone()
    }

    async fn reply<T: DeserializeOwned>(&self, op: &'static str) -> Result<T> {
        self.calls.lock().unwrap().push(op);
        let held = self.held.lock().unwrap().contains(op);
        if held {
            std::future::pending::<()>().await;
        }
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(op)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::Transport(format!("no reply scripted for {op}"))))?;
        Ok(serde_json::from_value(reply)?)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn set_bearer(&self, token: Option<String>) {
        *self.bearer.lock().unwrap() = token;
    }

    async fn search(&self, _req: &SearchRequest) -> Result<SearchResponse> {
        self.reply("search").await
    }

    async fn semantic_search(&self, _query: &str, _k: u32) -> Result<RecommendationList> {
        self.reply("semantic_search").await
    }

    async fn transcript(&self, _video_id: &str, _language: &str) -> Result<Transcript> {
        self.reply("transcript").await
    }

    async fn summary(&self, _video_id: &str) -> Result<Summary> {
        self.reply("summary").await
    }

    async fn quiz(&self, _video_id: &str, _num_questions: u32) -> Result<Quiz> {
        self.reply("quiz").await
    }

    async fn pdf(&self, _req: &PdfRequest) -> Result<PdfFile> {
        self.reply("pdf").await
    }

    async fn index_video(&self, _req: &IndexRequest) -> Result<()> {
        let _: Value = self.reply("index_video").await?;
        Ok(())
    }

    async fn similar_videos(&self, _video_id: &str, _k: u32) -> Result<RecommendationList> {
        self.reply("similar_videos").await
    }

    async fn script(&self, _video_id: &str, _duration_minutes: u32) -> Result<Script> {
        self.reply("script").await
    }

    async fn slides(&self, _video_id: &str) -> Result<Slides> {
        self.reply("slides").await
    }

    async fn images(&self, _video_id: &str) -> Result<Vec<ImageAsset>> {
        self.reply("images").await
    }

    async fn voice(&self, _video_id: &str, _voice_id: Option<&str>) -> Result<MediaResult> {
        self.reply("voice").await
    }

    async fn video(
        &self,
        _video_id: &str,
        _include_audio: bool,
        _voice_id: Option<&str>,
    ) -> Result<MediaResult> {
        self.reply("video").await
    }

    async fn voices(&self) -> Result<VoiceCatalog> {
        self.reply("voices").await
    }

    async fn video_status(&self) -> Result<VideoStatus> {
        self.reply("video_status").await
    }

    async fn login(&self, _credentials: &Credentials) -> Result<AuthGrant> {
        self.reply("login").await
    }

    async fn signup(&self, _form: &SignupForm) -> Result<AuthGrant> {
        self.reply("signup").await
    }

    async fn google(&self, _access_token: &str) -> Result<AuthGrant> {
        self.reply("google").await
    }

    async fn current_user(&self, _token: &str) -> Result<UserProfile> {
        self.reply("current_user").await
    }
}
