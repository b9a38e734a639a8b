use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use iced::{Subscription, Task, Theme, time};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use tubementor_core::{
    ApiClient, CallbackState, ClientConfig, Completion, Controller, Envelope, FileTokenStore,
    MemoryTokenStore, Notice, OAuthCallback, SearchPage, SessionController, Tab, TokenStore,
    ToolKind, VideoWorkflow, dispatch,
    oauth::{REDIRECT_DELAY, authorize_url},
    types::{Artifact, SignupForm, UserProfile},
    workflow::{Blocked, tools::DEFAULT_SCRIPT_MINUTES},
};

use crate::toast::Toasts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Search,
    Video,
    SignIn,
    Callback,
}

#[derive(Debug, Default)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub signup: bool,
    pub busy: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    Navigate(Screen),
    Tick(Instant),

    QueryChanged(String),
    Search,
    SemanticSearch,

    OpenVideo(String),
    Back,
    SelectTab(Tab),
    GenerateSummary,
    GenerateQuiz,
    GeneratePdf,
    SelectOption(usize, String),
    Reveal(usize),
    SelectTool(ToolKind),
    MinutesChanged(String),
    VoiceChanged(String),
    IncludeAudio(bool),
    Download(Artifact),
    Downloaded(Result<PathBuf, String>),
    Completed(Completion),

    EmailChanged(String),
    PasswordChanged(String),
    NameChanged(String),
    ToggleSignup,
    SubmitAuth,
    AuthFinished(Result<UserProfile, String>),
    Hydrated(Option<UserProfile>),
    Logout,

    OpenGoogle,
    CallbackInputChanged(String),
    CompleteOAuth,
    OAuthFinished(CallbackState, Option<UserProfile>),
}

pub struct App {
    pub config: ClientConfig,
    api: Arc<ApiClient>,
    session: Arc<Mutex<SessionController>>,
    pub user: Option<UserProfile>,
    pub screen: Screen,
    pub query: String,
    pub search: SearchPage,
    pub video: Option<VideoWorkflow>,
    pub minutes_input: String,
    pub voice_input: String,
    pub auth: AuthForm,
    pub google_url: Option<String>,
    pub callback_input: String,
    pub callback: Option<CallbackState>,
    pub toasts: Toasts,
}

impl App {
    pub fn new(config: ClientConfig) -> (Self, Task<Message>) {
        let store: Box<dyn TokenStore> = match FileTokenStore::from_dir(config.token_dir.as_deref())
        {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!(error = %e, "no token directory, session will not persist");
                Box::new(MemoryTokenStore::default())
            }
        };

        let app = Self {
            api: Arc::new(ApiClient::from_config(&config)),
            session: Arc::new(Mutex::new(SessionController::new(store))),
            config,
            user: None,
            screen: Screen::Search,
            query: String::new(),
            search: SearchPage::default(),
            video: None,
            minutes_input: DEFAULT_SCRIPT_MINUTES.to_string(),
            voice_input: String::new(),
            auth: AuthForm::default(),
            google_url: None,
            callback_input: String::new(),
            callback: None,
            toasts: Toasts::default(),
        };
        let hydrate = app.hydrate();
        (app, hydrate)
    }

    pub fn title(&self) -> String {
        match (&self.screen, &self.video) {
            (Screen::Video, Some(page)) => match page.summary().value() {
                Some(summary) if !summary.title.is_empty() => {
                    format!("{} - TubeMentor", summary.title)
                }
                _ => format!("{} - TubeMentor", page.video_id()),
            },
            _ => "TubeMentor".to_string(),
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.toasts.is_empty() {
            Subscription::none()
        } else {
            time::every(Duration::from_millis(500)).map(Message::Tick)
        }
    }

    fn hydrate(&self) -> Task<Message> {
        let api = Arc::clone(&self.api);
        let session = Arc::clone(&self.session);
        Task::perform(
            async move {
                let mut session = session.lock().await;
                if let Err(e) = session.hydrate(api.as_ref()).await {
                    warn!(error = %e, "could not read saved session");
                }
                session.user().cloned()
            },
            Message::Hydrated,
        )
    }

    /// Sends each request on its own task; completions come back as
    /// [`Message::Completed`].
    fn run(&self, envelopes: Vec<Envelope>) -> Task<Message> {
        Task::batch(envelopes.into_iter().map(|envelope| {
            let api = Arc::clone(&self.api);
            Task::perform(
                async move { dispatch(api.as_ref(), envelope).await },
                Message::Completed,
            )
        }))
    }

    fn start(&mut self, result: Result<Envelope, Blocked>) -> Task<Message> {
        let task = match result {
            Ok(envelope) => self.run(vec![envelope]),
            Err(blocked) => {
                debug!(%blocked, "action refused");
                Task::none()
            }
        };
        self.collect_notices();
        task
    }

    fn on_video(
        &mut self,
        action: impl FnOnce(&mut VideoWorkflow) -> Result<Envelope, Blocked>,
    ) -> Task<Message> {
        match self.video.as_mut() {
            Some(page) => {
                let result = action(page);
                self.start(result)
            }
            None => Task::none(),
        }
    }

    fn collect_notices(&mut self) {
        let now = Instant::now();
        self.toasts.absorb(self.search.notices(), now);
        if let Some(page) = self.video.as_mut() {
            self.toasts.absorb(page.notices(), now);
        }
    }

    fn toast(&mut self, notice: Notice) {
        self.toasts.push(notice, Instant::now());
    }

    fn leave_video(&mut self) {
        if let Some(page) = self.video.take() {
            debug!(view = %page.view_id(), "video page closed");
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(screen) => {
                if screen != Screen::Video {
                    self.leave_video();
                }
                self.screen = screen;
                Task::none()
            }
            Message::Tick(now) => {
                self.toasts.expire(now);
                Task::none()
            }

            Message::QueryChanged(query) => {
                self.query = query;
                Task::none()
            }
            Message::Search => {
                let result = self.search.submit(&self.query);
                self.start(result)
            }
            Message::SemanticSearch => {
                let result = self.search.submit_semantic(&self.query);
                self.start(result)
            }

            Message::OpenVideo(video_id) => {
                let (page, first) = VideoWorkflow::open(video_id);
                self.video = Some(page);
                self.minutes_input = DEFAULT_SCRIPT_MINUTES.to_string();
                self.voice_input.clear();
                self.screen = Screen::Video;
                self.run(vec![first])
            }
            Message::Back => self.update(Message::Navigate(Screen::Search)),
            Message::SelectTab(tab) => {
                if let Some(page) = self.video.as_mut() {
                    page.set_tab(tab);
                }
                Task::none()
            }
            Message::GenerateSummary => self.on_video(VideoWorkflow::generate_summary),
            Message::GenerateQuiz => self.on_video(VideoWorkflow::generate_quiz),
            Message::GeneratePdf => self.on_video(VideoWorkflow::generate_pdf),
            Message::SelectOption(index, option) => {
                if let Some(quiz) = self.video.as_mut().and_then(VideoWorkflow::quiz_mut) {
                    quiz.select(index, option);
                }
                Task::none()
            }
            Message::Reveal(index) => {
                if let Some(quiz) = self.video.as_mut().and_then(VideoWorkflow::quiz_mut) {
                    quiz.reveal(index);
                }
                Task::none()
            }
            Message::SelectTool(tool) => self.on_video(|page| page.select_tool(tool)),
            Message::MinutesChanged(input) => {
                let input: String = input.chars().filter(char::is_ascii_digit).take(2).collect();
                if let (Some(page), Ok(minutes)) = (self.video.as_mut(), input.parse::<u32>()) {
                    page.tools_mut().options_mut().script_minutes = minutes.max(1);
                }
                self.minutes_input = input;
                Task::none()
            }
            Message::VoiceChanged(input) => {
                if let Some(page) = self.video.as_mut() {
                    let voice = input.trim();
                    page.tools_mut().options_mut().voice_id =
                        (!voice.is_empty()).then(|| voice.to_string());
                }
                self.voice_input = input;
                Task::none()
            }
            Message::IncludeAudio(include) => {
                if let Some(page) = self.video.as_mut() {
                    page.tools_mut().options_mut().include_audio = include;
                }
                Task::none()
            }
            Message::Download(artifact) => {
                let api = Arc::clone(&self.api);
                let dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));
                Task::perform(save_artifact(api, artifact, dir), Message::Downloaded)
            }
            Message::Downloaded(Ok(path)) => {
                info!(path = %path.display(), "download saved");
                self.toast(Notice::success(format!("Saved to {}", path.display())));
                Task::none()
            }
            Message::Downloaded(Err(message)) => {
                self.toast(Notice::error(message));
                Task::none()
            }
            Message::Completed(completion) => {
                let follow_ups = if completion.view == self.search.view_id() {
                    self.search.apply(completion)
                } else if let Some(page) = self
                    .video
                    .as_mut()
                    .filter(|page| page.view_id() == completion.view)
                {
                    page.apply(completion)
                } else {
                    debug!(view = %completion.view, "completion for a closed view dropped");
                    Vec::new()
                };
                self.collect_notices();
                self.run(follow_ups)
            }

            Message::EmailChanged(email) => {
                self.auth.email = email;
                Task::none()
            }
            Message::PasswordChanged(password) => {
                self.auth.password = password;
                Task::none()
            }
            Message::NameChanged(name) => {
                self.auth.full_name = name;
                Task::none()
            }
            Message::ToggleSignup => {
                self.auth.signup = !self.auth.signup;
                self.auth.error = None;
                Task::none()
            }
            Message::SubmitAuth => self.submit_auth(),
            Message::AuthFinished(result) => {
                self.auth.busy = false;
                match result {
                    Ok(user) => {
                        self.auth.password.clear();
                        self.auth.error = None;
                        self.toast(Notice::success(format!("Welcome, {}", user.display_name())));
                        self.user = Some(user);
                        self.screen = Screen::Search;
                    }
                    Err(message) => self.auth.error = Some(message),
                }
                Task::none()
            }
            Message::Hydrated(user) => {
                self.user = user;
                Task::none()
            }
            Message::Logout => {
                let logged_out = match self.session.try_lock() {
                    Ok(mut session) => {
                        if let Err(e) = session.logout(self.api.as_ref()) {
                            warn!(error = %e, "could not remove saved token");
                        }
                        true
                    }
                    Err(_) => false,
                };
                if logged_out {
                    self.user = None;
                } else {
                    self.toast(Notice::info("Please wait for sign-in to finish"));
                }
                Task::none()
            }

            Message::OpenGoogle => match authorize_url(&self.config) {
                Ok(url) => {
                    let url = url.to_string();
                    self.google_url = Some(url.clone());
                    self.callback = None;
                    self.callback_input.clear();
                    self.screen = Screen::Callback;
                    self.toast(Notice::info("Sign-in link copied, open it in your browser"));
                    iced::clipboard::write(url)
                }
                Err(e) => {
                    self.toast(Notice::error(e.to_string()));
                    Task::none()
                }
            },
            Message::CallbackInputChanged(input) => {
                self.callback_input = input;
                Task::none()
            }
            Message::CompleteOAuth => {
                if self.callback == Some(CallbackState::Processing) {
                    return Task::none();
                }
                self.callback = Some(CallbackState::Processing);
                let api = Arc::clone(&self.api);
                let session = Arc::clone(&self.session);
                let fragment = self.callback_input.clone();
                Task::perform(
                    async move {
                        let mut session = session.lock().await;
                        let mut callback = OAuthCallback::new();
                        let state = callback
                            .complete(&fragment, &mut session, api.as_ref())
                            .await
                            .clone();
                        (state, session.user().cloned())
                    },
                    |(state, user)| Message::OAuthFinished(state, user),
                )
            }
            Message::OAuthFinished(state, user) => {
                let succeeded = state == CallbackState::Success;
                self.callback = Some(state);
                if succeeded {
                    self.user = user;
                    Task::perform(tokio::time::sleep(REDIRECT_DELAY), |_| {
                        Message::Navigate(Screen::Search)
                    })
                } else {
                    Task::none()
                }
            }
        }
    }

    fn submit_auth(&mut self) -> Task<Message> {
        if self.auth.busy {
            return Task::none();
        }
        self.auth.busy = true;
        self.auth.error = None;

        let api = Arc::clone(&self.api);
        let session = Arc::clone(&self.session);
        let email = self.auth.email.trim().to_string();
        let password = self.auth.password.clone();
        let signup = self.auth.signup.then(|| SignupForm {
            email: email.clone(),
            password: password.clone(),
            full_name: Some(self.auth.full_name.trim().to_string()).filter(|n| !n.is_empty()),
        });

        Task::perform(
            async move {
                let mut session = session.lock().await;
                let result = match signup {
                    Some(form) => session.signup(api.as_ref(), form).await,
                    None => session.login(api.as_ref(), &email, &password).await,
                };
                match result {
                    Ok(user) => Ok(user.clone()),
                    Err(e) => Err(e.to_string()),
                }
            },
            Message::AuthFinished,
        )
    }
}

async fn save_artifact(
    api: Arc<ApiClient>,
    artifact: Artifact,
    dir: PathBuf,
) -> Result<PathBuf, String> {
    let bytes = api
        .download(&artifact)
        .await
        .map_err(|e| e.user_message("Download failed"))?;
    let path = dir.join(&artifact.filename);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| format!("Could not save {}: {e}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use tubementor_core::{
        NoticeLevel,
        types::Transcript,
        workflow::Outcome,
    };

    use super::*;

    fn app() -> App {
        let config = ClientConfig {
            token_dir: None,
            ..ClientConfig::default()
        };
        App::new(config).0
    }

    fn toast_messages(app: &App) -> Vec<String> {
        app.toasts.iter().map(|n| n.message.clone()).collect()
    }

    #[test]
    fn blank_search_shows_toast() {
        let mut app = app();
        let _ = app.update(Message::Search);
        assert_eq!(toast_messages(&app), vec!["Please enter a search term"]);
        assert!(app.search.results().is_idle());
    }

    #[test]
    fn completion_after_leaving_video_is_dropped() {
        let mut app = app();
        let _ = app.update(Message::OpenVideo("abc".into()));
        let view = app.video.as_ref().map(|page| page.view_id()).unwrap();

        let _ = app.update(Message::Back);
        let _ = app.update(Message::Completed(Completion {
            view,
            outcome: Outcome::Transcript(Ok(Transcript {
                content: "late".into(),
                word_count: 1,
                language: "en".into(),
            })),
        }));

        assert!(app.video.is_none());
        assert_eq!(app.screen, Screen::Search);
        assert!(app.toasts.is_empty());
    }

    #[test]
    fn tool_without_summary_is_refused() {
        let mut app = app();
        let _ = app.update(Message::OpenVideo("abc".into()));
        let _ = app.update(Message::SelectTool(ToolKind::Slides));

        assert_eq!(toast_messages(&app), vec!["Generate a summary first"]);
        assert!(app.toasts.iter().all(|n| n.level == NoticeLevel::Error));
    }

    #[test]
    fn minutes_input_keeps_digits() {
        let mut app = app();
        let _ = app.update(Message::OpenVideo("abc".into()));
        let _ = app.update(Message::MinutesChanged("1a5x".into()));

        assert_eq!(app.minutes_input, "15");
        let minutes = app
            .video
            .as_ref()
            .map(|page| page.tools().options().script_minutes);
        assert_eq!(minutes, Some(15));
    }

    #[test]
    fn google_without_client_id_toasts_error() {
        let mut app = app();
        app.config.google_client_id = None;
        let _ = app.update(Message::OpenGoogle);

        assert_eq!(app.screen, Screen::Search);
        assert!(app.toasts.iter().any(|n| n.is_error()));
    }
}
