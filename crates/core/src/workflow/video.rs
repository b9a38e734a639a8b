//! Video detail page: transcript, summary, quiz, PDF, recommendations and
//! the content-tools panel for a single video.

use tracing::{debug, info, warn};

use crate::{
    action::ActionState,
    notice::{Notice, Notices},
    quiz::QuizSession,
    types::{
        Artifact, ArtifactKind, IndexRequest, PdfRequest, Recommendation, Summary, Transcript,
    },
    workflow::{
        Blocked, Completion, ContentTools, Controller, Envelope, Outcome, Request, ToolKind,
        ViewId,
    },
};

pub const TRANSCRIPT_LANGUAGE: &str = "en";
pub const QUIZ_QUESTIONS: u32 = 5;
pub const RECOMMENDATION_COUNT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Transcript,
    Summary,
    Quiz,
    Tools,
}

#[derive(Debug)]
pub struct VideoWorkflow {
    view: ViewId,
    video_id: String,
    tab: Tab,
    transcript: ActionState<Transcript>,
    summary: ActionState<Summary>,
    quiz: ActionState<QuizSession>,
    pdf: ActionState<Artifact>,
    recommendations: ActionState<Vec<Recommendation>>,
    indexing: ActionState<()>,
    tools: ContentTools,
    notices: Notices,
}

impl VideoWorkflow {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            view: ViewId::new(),
            video_id: video_id.into(),
            tab: Tab::default(),
            transcript: ActionState::Idle,
            summary: ActionState::Idle,
            quiz: ActionState::Idle,
            pdf: ActionState::Idle,
            recommendations: ActionState::Idle,
            indexing: ActionState::Idle,
            tools: ContentTools::default(),
            notices: Notices::default(),
        }
    }

    /// Mounts the page: builds the controller and its first request.
    pub fn open(video_id: impl Into<String>) -> (Self, Envelope) {
        let mut workflow = Self::new(video_id);
        let first = workflow.activate();
        (workflow, first)
    }

    /// Starts loading the transcript.
    pub fn activate(&mut self) -> Envelope {
        self.transcript.start();
        self.envelope(Request::Transcript {
            video_id: self.video_id.clone(),
            language: TRANSCRIPT_LANGUAGE.to_string(),
        })
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn transcript(&self) -> &ActionState<Transcript> {
        &self.transcript
    }

    pub fn summary(&self) -> &ActionState<Summary> {
        &self.summary
    }

    pub fn quiz(&self) -> &ActionState<QuizSession> {
        &self.quiz
    }

    pub fn quiz_mut(&mut self) -> Option<&mut QuizSession> {
        self.quiz.value_mut()
    }

    pub fn pdf(&self) -> &ActionState<Artifact> {
        &self.pdf
    }

    pub fn recommendations(&self) -> &ActionState<Vec<Recommendation>> {
        &self.recommendations
    }

    pub fn indexing(&self) -> &ActionState<()> {
        &self.indexing
    }

    pub fn tools(&self) -> &ContentTools {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ContentTools {
        &mut self.tools
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub fn generate_summary(&mut self) -> Result<Envelope, Blocked> {
        self.require(self.transcript.value().is_some(), Blocked::TranscriptRequired)?;
        self.tab = Tab::Summary;
        begin(&mut self.summary)?;
        Ok(self.envelope(Request::Summary {
            video_id: self.video_id.clone(),
        }))
    }

    pub fn generate_quiz(&mut self) -> Result<Envelope, Blocked> {
        self.require(self.transcript.value().is_some(), Blocked::TranscriptRequired)?;
        self.tab = Tab::Quiz;
        begin(&mut self.quiz)?;
        Ok(self.envelope(Request::Quiz {
            video_id: self.video_id.clone(),
            num_questions: QUIZ_QUESTIONS,
        }))
    }

    pub fn generate_pdf(&mut self) -> Result<Envelope, Blocked> {
        let include_summary = self.summary.value().is_some();
        let include_quiz = self.quiz.value().is_some();
        self.require(include_summary || include_quiz, Blocked::SummaryOrQuizRequired)?;
        begin(&mut self.pdf)?;
        Ok(self.envelope(Request::Pdf(PdfRequest {
            video_id: self.video_id.clone(),
            include_summary,
            include_quiz,
        })))
    }

    /// Opens the tools tab on `tool` and starts generating it.
    pub fn select_tool(&mut self, tool: ToolKind) -> Result<Envelope, Blocked> {
        let summary_ready = self.summary.value().is_some();
        if summary_ready {
            self.tab = Tab::Tools;
        }
        let request = self
            .tools
            .select(tool, &self.video_id, summary_ready, &mut self.notices)?;
        Ok(self.envelope(Request::Tool(request)))
    }

    fn require(&mut self, met: bool, blocked: Blocked) -> Result<(), Blocked> {
        if met {
            return Ok(());
        }
        self.notices.push(Notice::error(blocked.to_string()));
        Err(blocked)
    }

    fn envelope(&self, request: Request) -> Envelope {
        Envelope {
            view: self.view,
            request,
        }
    }

    fn similar(&self) -> Envelope {
        self.envelope(Request::Similar {
            video_id: self.video_id.clone(),
            k: RECOMMENDATION_COUNT,
        })
    }

    fn report(&mut self, err: &crate::error::ApiError, fallback: &str) -> String {
        let message = err.user_message(fallback);
        self.notices.push(Notice::error(message.clone()));
        message
    }
}

fn begin<T>(state: &mut ActionState<T>) -> Result<(), Blocked> {
    if state.is_loading() {
        return Err(Blocked::InFlight);
    }
    state.start();
    Ok(())
}

impl Controller for VideoWorkflow {
    fn view_id(&self) -> ViewId {
        self.view
    }

    fn apply(&mut self, completion: Completion) -> Vec<Envelope> {
        if completion.view != self.view {
            debug!(view = %completion.view, "dropping completion for another view");
            return Vec::new();
        }

        match completion.outcome {
            Outcome::Transcript(Ok(transcript)) => {
                self.transcript.succeed(transcript);
                // Not indexed yet is the common case; the lookup is best-effort.
                return vec![self.similar()];
            }
            Outcome::Transcript(Err(err)) => {
                let message = self.report(&err, "Failed to load transcript");
                self.transcript.fail(message);
            }
            Outcome::Similar(Ok(mut recommendations)) => {
                recommendations.retain(|r| r.video_id != self.video_id);
                self.recommendations.succeed(recommendations);
            }
            Outcome::Similar(Err(err)) => {
                debug!(video_id = %self.video_id, error = %err, "recommendations not available");
                self.recommendations.fail(err.to_string());
            }
            Outcome::Summary(Ok(summary)) => {
                let index = IndexRequest {
                    video_id: self.video_id.clone(),
                    title: if summary.title.trim().is_empty() {
                        self.video_id.clone()
                    } else {
                        summary.title.clone()
                    },
                    summary: summary.summary_text.clone(),
                };
                self.summary.succeed(summary);
                self.notices.push(Notice::success("Summary generated!"));
                self.indexing.start();
                return vec![self.envelope(Request::Index(index))];
            }
            Outcome::Summary(Err(err)) => {
                let message = self.report(&err, "Failed to generate summary");
                self.summary.fail(message);
            }
            Outcome::Indexed(Ok(())) => {
                info!(video_id = %self.video_id, "video indexed for recommendations");
                self.indexing.succeed(());
                return vec![self.similar()];
            }
            Outcome::Indexed(Err(err)) => {
                warn!(video_id = %self.video_id, error = %err, "indexing failed");
                self.indexing.fail(err.to_string());
            }
            Outcome::Quiz(Ok(quiz)) => {
                self.quiz.succeed(QuizSession::new(quiz));
                self.notices.push(Notice::success("Quiz generated!"));
            }
            Outcome::Quiz(Err(err)) => {
                let message = self.report(&err, "Failed to generate quiz");
                self.quiz.fail(message);
            }
            Outcome::Pdf(Ok(file)) => {
                self.pdf
                    .succeed(Artifact::new(ArtifactKind::Pdf, file.file_name));
                self.notices.push(Notice::success("PDF ready to download"));
            }
            Outcome::Pdf(Err(err)) => {
                let message = self.report(&err, "Failed to generate PDF");
                self.pdf.fail(message);
            }
            Outcome::Tool(tool, result) => {
                self.tools.apply(tool, result, &mut self.notices);
            }
            Outcome::Search(_) | Outcome::SemanticSearch(_) => {
                debug!("video page ignores search completions");
            }
        }
        Vec::new()
    }
}
