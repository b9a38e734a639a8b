use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tubementor_core::{
    ApiClient, ClientConfig, FileTokenStore, SessionController, ToolKind, types::ArtifactKind,
};

mod auth;
mod study;
mod ui;

#[derive(Parser)]
#[command(name = "tubementor")]
#[command(about = "Study YouTube videos with transcripts, AI summaries, quizzes and generated content")]
struct Cli {
    /// Backend base URL (overrides TUBEMENTOR_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search YouTube for educational videos
    Search {
        query: Vec<String>,

        /// Number of results to request
        #[arg(short = 'n', long, default_value_t = 12)]
        max_results: u32,

        /// Search already-indexed videos by meaning instead of keywords
        #[arg(long)]
        semantic: bool,
    },

    /// Load a video's transcript and recommendations, optionally generating more
    Video {
        video_id: String,

        /// Print the full transcript
        #[arg(long)]
        transcript: bool,

        #[arg(long)]
        summary: bool,

        #[arg(long)]
        quiz: bool,

        /// Build a study PDF (needs --summary or --quiz)
        #[arg(long)]
        pdf: bool,

        /// Where to save the PDF
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Take a quiz on a video interactively
    Quiz { video_id: String },

    /// Generate learning content from a video's summary
    Tool {
        video_id: String,

        /// script, slides, images, voice or video
        tool: ToolKind,

        /// Target length of the narration script
        #[arg(long, default_value_t = 10)]
        minutes: u32,

        /// ElevenLabs voice for narration
        #[arg(long)]
        voice_id: Option<String>,

        /// Add narration to the generated video
        #[arg(long)]
        include_audio: bool,

        /// Save the generated file here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download a previously generated file
    Download {
        kind: DownloadKind,
        filename: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List narration voices
    Voices,

    /// Check whether video generation is available
    Status,

    Login {
        email: String,

        /// Read from a prompt when omitted
        #[arg(long)]
        password: Option<String>,
    },

    Signup {
        email: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },

    /// Print the Google sign-in URL
    OauthUrl,

    /// Finish Google sign-in with the redirect URL or its fragment
    OauthCallback { fragment: String },

    Logout,

    /// Show the signed-in user
    Whoami,
}

#[derive(Clone, Copy, ValueEnum)]
enum DownloadKind {
    Pdf,
    Slides,
    Voice,
    Video,
}

impl From<DownloadKind> for ArtifactKind {
    fn from(kind: DownloadKind) -> Self {
        match kind {
            DownloadKind::Pdf => ArtifactKind::Pdf,
            DownloadKind::Slides => ArtifactKind::Slides,
            DownloadKind::Voice => ArtifactKind::Voice,
            DownloadKind::Video => ArtifactKind::Video,
        }
    }
}

/// Everything a command needs: config, one shared client and the session.
pub struct App {
    pub config: ClientConfig,
    pub api: Arc<ApiClient>,
    pub session: SessionController,
}

impl App {
    fn new(config: ClientConfig) -> Result<Self> {
        let store = FileTokenStore::from_dir(config.token_dir.as_deref())
            .context("no config directory for the session token; set TUBEMENTOR_TOKEN_DIR")?;
        Ok(Self {
            api: Arc::new(ApiClient::from_config(&config)),
            session: SessionController::new(Box::new(store)),
            config,
        })
    }

    /// Restores a saved login so protected calls carry the bearer token.
    async fn hydrate(&mut self) -> Result<()> {
        self.session
            .hydrate(self.api.as_ref())
            .await
            .context("failed to read the saved session")
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    let mut app = App::new(config)?;

    match cli.command {
        Command::OauthUrl => return auth::oauth_url(&app),
        Command::Logout => return auth::logout(&mut app),
        _ => app.hydrate().await?,
    }

    match cli.command {
        Command::Search {
            query,
            max_results,
            semantic,
        } => study::search(&app, &query.join(" "), max_results, semantic).await,
        Command::Video {
            video_id,
            transcript,
            summary,
            quiz,
            pdf,
            output,
        } => {
            let steps = study::VideoSteps {
                transcript,
                summary,
                quiz,
                pdf,
            };
            study::video(&app, &video_id, steps, output).await
        }
        Command::Quiz { video_id } => study::quiz(&app, &video_id).await,
        Command::Tool {
            video_id,
            tool,
            minutes,
            voice_id,
            include_audio,
            output,
        } => {
            let options = tubementor_core::workflow::ToolOptions {
                script_minutes: minutes,
                voice_id,
                include_audio,
            };
            study::tool(&app, &video_id, tool, options, output).await
        }
        Command::Download {
            kind,
            filename,
            output,
        } => study::download(&app, kind.into(), &filename, output).await,
        Command::Voices => study::voices(&app).await,
        Command::Status => study::status(&app).await,
        Command::Login { email, password } => auth::login(&mut app, &email, password).await,
        Command::Signup {
            email,
            name,
            password,
        } => auth::signup(&mut app, &email, name, password).await,
        Command::OauthCallback { fragment } => auth::oauth_callback(&mut app, &fragment).await,
        Command::Whoami => auth::whoami(&app),
        Command::OauthUrl | Command::Logout => Ok(()),
    }
}
