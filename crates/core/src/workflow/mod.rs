//! Request/completion plumbing shared by the page controllers.
//!
//! Controllers never touch the network. They hand out [`Envelope`]s, the
//! host runs each one through [`dispatch`] (concurrently, in any order) and
//! feeds the [`Completion`] back through [`Controller::apply`]. Every
//! envelope is stamped with the [`ViewId`] of the controller instance that
//! asked for it; a completion whose view has gone away is dropped, which is
//! how a late response after navigation becomes a no-op.

pub mod tools;
pub mod video;

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    api::Backend,
    error::Result,
    types::{
        IndexRequest, PdfFile, PdfRequest, Quiz, Recommendation, SearchRequest, Summary,
        Transcript, VideoSummary,
    },
};

pub use tools::{ContentTools, ToolKind, ToolOptions, ToolOutput, ToolRequest, ToolResponse};
pub use video::{Tab, VideoWorkflow};

/// Identity of one mounted controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A prerequisite check failed; nothing was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Blocked {
    #[error("Please enter a search term")]
    EmptyQuery,
    #[error("Search query must be at least 2 characters")]
    QueryTooShort,
    #[error("Transcript is not loaded yet")]
    TranscriptRequired,
    #[error("Generate a summary first")]
    SummaryRequired,
    #[error("Generate a summary or quiz first")]
    SummaryOrQuizRequired,
    #[error("Already in progress")]
    InFlight,
}

#[derive(Debug, Clone)]
pub enum Request {
    Search(SearchRequest),
    SemanticSearch { query: String, k: u32 },
    Transcript { video_id: String, language: String },
    Similar { video_id: String, k: u32 },
    Index(IndexRequest),
    Summary { video_id: String },
    Quiz { video_id: String, num_questions: u32 },
    Pdf(PdfRequest),
    Tool(ToolRequest),
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Search(Result<Vec<VideoSummary>>),
    SemanticSearch(Result<Vec<Recommendation>>),
    Transcript(Result<Transcript>),
    Similar(Result<Vec<Recommendation>>),
    Indexed(Result<()>),
    Summary(Result<Summary>),
    Quiz(Result<Quiz>),
    Pdf(Result<PdfFile>),
    Tool(ToolKind, Result<ToolResponse>),
}

#[derive(Debug, Clone)]
pub struct Envelope {
    pub view: ViewId,
    pub request: Request,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub view: ViewId,
    pub outcome: Outcome,
}

/// A view that consumes completions.
pub trait Controller {
    fn view_id(&self) -> ViewId;

    /// Stores a completion's result and returns any follow-up requests.
    fn apply(&mut self, completion: Completion) -> Vec<Envelope>;
}

/// Runs one request against the backend.
pub async fn dispatch<B: Backend + ?Sized>(backend: &B, envelope: Envelope) -> Completion {
    let Envelope { view, request } = envelope;
    let outcome = match request {
        Request::Search(req) => Outcome::Search(backend.search(&req).await.map(|r| r.videos)),
        Request::SemanticSearch { query, k } => Outcome::SemanticSearch(
            backend
                .semantic_search(&query, k)
                .await
                .map(|r| r.recommendations),
        ),
        Request::Transcript { video_id, language } => {
            Outcome::Transcript(backend.transcript(&video_id, &language).await)
        }
        Request::Similar { video_id, k } => Outcome::Similar(
            backend
                .similar_videos(&video_id, k)
                .await
                .map(|r| r.recommendations),
        ),
        Request::Index(req) => Outcome::Indexed(backend.index_video(&req).await),
        Request::Summary { video_id } => Outcome::Summary(backend.summary(&video_id).await),
        Request::Quiz {
            video_id,
            num_questions,
        } => Outcome::Quiz(backend.quiz(&video_id, num_questions).await),
        Request::Pdf(req) => Outcome::Pdf(backend.pdf(&req).await),
        Request::Tool(req) => {
            let kind = req.kind();
            Outcome::Tool(kind, tools::run(backend, req).await)
        }
    };
    Completion { view, outcome }
}

/// Runs one request and applies its completion, handing back the follow-ups
/// unsent so the host can report the result before they finish.
pub async fn step<B, C>(backend: &B, controller: &mut C, envelope: Envelope) -> Vec<Envelope>
where
    B: Backend + ?Sized,
    C: Controller,
{
    let completion = dispatch(backend, envelope).await;
    controller.apply(completion)
}

/// Executes `pending` and every follow-up concurrently until nothing is in
/// flight, applying completions to `controller` as they arrive.
pub async fn settle<B, C>(backend: Arc<B>, controller: &mut C, pending: Vec<Envelope>)
where
    B: Backend + ?Sized + 'static,
    C: Controller,
{
    let mut in_flight = JoinSet::new();
    let spawn = |set: &mut JoinSet<Completion>, envelope: Envelope| {
        let backend = Arc::clone(&backend);
        set.spawn(async move { dispatch(backend.as_ref(), envelope).await });
    };

    for envelope in pending {
        spawn(&mut in_flight, envelope);
    }

    while let Some(joined) = in_flight.join_next().await {
        match joined {
            Ok(completion) => {
                let follow_ups = controller.apply(completion);
                if !follow_ups.is_empty() {
                    debug!(count = follow_ups.len(), "scheduling follow-up requests");
                }
                for envelope in follow_ups {
                    spawn(&mut in_flight, envelope);
                }
            }
            Err(e) => warn!(error = %e, "request task did not complete"),
        }
    }
}
