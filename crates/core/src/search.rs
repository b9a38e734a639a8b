//! Home page search.

use tracing::debug;

use crate::{
    action::ActionState,
    notice::{Notice, Notices},
    types::{Recommendation, SearchRequest, VideoSummary},
    workflow::{Blocked, Completion, Controller, Envelope, Outcome, Request, ViewId},
};

pub const DEFAULT_MAX_RESULTS: u32 = 12;
pub const SEMANTIC_RESULTS: u32 = 10;

#[derive(Debug)]
pub struct SearchPage {
    view: ViewId,
    query: String,
    max_results: u32,
    results: ActionState<Vec<VideoSummary>>,
    semantic: ActionState<Vec<Recommendation>>,
    notices: Notices,
}

impl Default for SearchPage {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESULTS)
    }
}

impl SearchPage {
    pub fn new(max_results: u32) -> Self {
        Self {
            view: ViewId::new(),
            query: String::new(),
            max_results,
            results: ActionState::Idle,
            semantic: ActionState::Idle,
            notices: Notices::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &ActionState<Vec<VideoSummary>> {
        &self.results
    }

    pub fn semantic(&self) -> &ActionState<Vec<Recommendation>> {
        &self.semantic
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub fn submit(&mut self, query: &str) -> Result<Envelope, Blocked> {
        let query = self.accept(query, 1)?;
        if self.results.is_loading() {
            return Err(Blocked::InFlight);
        }
        self.results.start();
        Ok(self.envelope(Request::Search(SearchRequest {
            query,
            max_results: self.max_results,
        })))
    }

    /// Searches videos already indexed for recommendations by meaning
    /// rather than keywords.
    pub fn submit_semantic(&mut self, query: &str) -> Result<Envelope, Blocked> {
        let query = self.accept(query, 2)?;
        if self.semantic.is_loading() {
            return Err(Blocked::InFlight);
        }
        self.semantic.start();
        Ok(self.envelope(Request::SemanticSearch {
            query,
            k: SEMANTIC_RESULTS,
        }))
    }

    fn accept(&mut self, query: &str, min_chars: usize) -> Result<String, Blocked> {
        let trimmed = query.trim();
        let blocked = if trimmed.is_empty() {
            Some(Blocked::EmptyQuery)
        } else if trimmed.chars().count() < min_chars {
            Some(Blocked::QueryTooShort)
        } else {
            None
        };
        if let Some(blocked) = blocked {
            self.notices.push(Notice::error(blocked.to_string()));
            return Err(blocked);
        }
        self.query = trimmed.to_string();
        Ok(self.query.clone())
    }

    fn envelope(&self, request: Request) -> Envelope {
        Envelope {
            view: self.view,
            request,
        }
    }
}

impl Controller for SearchPage {
    fn view_id(&self) -> ViewId {
        self.view
    }

    fn apply(&mut self, completion: Completion) -> Vec<Envelope> {
        if completion.view != self.view {
            return Vec::new();
        }
        match completion.outcome {
            Outcome::Search(Ok(videos)) => {
                if videos.is_empty() {
                    self.notices.push(Notice::info("No videos found"));
                }
                self.results.succeed(videos);
            }
            Outcome::Search(Err(err)) => {
                let message = err.user_message("Search failed. Please try again.");
                self.notices.push(Notice::error(message.clone()));
                self.results.fail(message);
            }
            Outcome::SemanticSearch(Ok(hits)) => self.semantic.succeed(hits),
            Outcome::SemanticSearch(Err(err)) => {
                let message = err.user_message("Semantic search failed");
                self.notices.push(Notice::error(message.clone()));
                self.semantic.fail(message);
            }
            _ => debug!("search page ignores video completions"),
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{error::ApiError, testing::FakeBackend, workflow::settle};

    #[test]
    fn blank_query_sends_nothing() {
        let mut page = SearchPage::default();
        assert_eq!(page.submit("   ").unwrap_err(), Blocked::EmptyQuery);
        assert_eq!(
            page.notices().drain(),
            vec![Notice::error("Please enter a search term")]
        );
        assert!(page.results().is_idle());
    }

    #[test]
    fn semantic_needs_two_characters() {
        let mut page = SearchPage::default();
        assert_eq!(page.submit_semantic("x").unwrap_err(), Blocked::QueryTooShort);
    }

    #[tokio::test]
    async fn stores_hits() {
        let backend = Arc::new(FakeBackend::new());
        backend.respond(
            "search",
            json!({
                "query": "rust",
                "total_results": 1,
                "videos": [{
                    "video_id": "abc",
                    "title": "Rust in 100 seconds",
                    "thumbnail_url": "https://i.ytimg.com/vi/abc/hq.jpg",
                    "channel_name": "Fireship",
                    "published_at": "2021-01-01T00:00:00Z",
                    "description": "Fast."
                }]
            }),
        );
        let mut page = SearchPage::default();
        let envelope = page.submit("  rust ").unwrap();
        assert_eq!(page.query(), "rust");

        settle(backend, &mut page, vec![envelope]).await;
        assert_eq!(page.results().value().unwrap()[0].video_id, "abc");
    }

    #[tokio::test]
    async fn failure_surfaces_detail() {
        let backend = Arc::new(FakeBackend::new());
        backend.fail(
            "search",
            ApiError::Status {
                status: 403,
                detail: Some("YouTube API quota exceeded".into()),
            },
        );
        let mut page = SearchPage::default();
        let envelope = page.submit("rust").unwrap();
        settle(backend, &mut page, vec![envelope]).await;
        assert_eq!(
            page.notices().drain(),
            vec![Notice::error("YouTube API quota exceeded")]
        );
    }
}
