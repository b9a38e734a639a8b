use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context as _, Result, bail};
use console::{Term, style};
use tokio::fs;
use tracing::{debug, warn};
use tubementor_core::{
    Backend, SearchPage, ToolKind, VideoWorkflow,
    format::{
        format_question, format_recommendations, format_search_results, format_summary,
        format_tool_output, format_transcript,
    },
    settle, step,
    types::{Artifact, ArtifactKind},
    workflow::ToolOptions,
};

use crate::{App, ui};

/// How long the CLI waits on background follow-ups (indexing, the
/// recommendation refresh) before moving on without them.
const FOLLOW_UP_WAIT: Duration = Duration::from_secs(20);

pub struct VideoSteps {
    pub transcript: bool,
    pub summary: bool,
    pub quiz: bool,
    pub pdf: bool,
}

pub async fn search(app: &App, query: &str, max_results: u32, semantic: bool) -> Result<()> {
    let mut page = SearchPage::new(max_results);
    let envelope = if semantic {
        page.submit_semantic(query)?
    } else {
        page.submit(query)?
    };

    let start = Instant::now();
    let pb = ui::create_spinner(&format!("Searching for \"{}\"...", page.query()));
    settle(Arc::clone(&app.api), &mut page, vec![envelope]).await;

    if semantic {
        let count = page.semantic().value().map_or(0, Vec::len);
        ui::finish(&pb, page.semantic(), &format!("{count} matches"), start.elapsed())?;
        ui::flush_notices(page.notices(), true);
        if let Some(hits) = page.semantic().value() {
            println!("{}", format_recommendations(hits));
        }
    } else {
        let count = page.results().value().map_or(0, Vec::len);
        ui::finish(&pb, page.results(), &format!("{count} videos"), start.elapsed())?;
        ui::flush_notices(page.notices(), true);
        if let Some(videos) = page.results().value() {
            print!("{}", format_search_results(videos));
        }
    }
    Ok(())
}

/// Mounts the video page and waits for the transcript and first
/// recommendations.
async fn open_video(app: &App, video_id: &str) -> Result<VideoWorkflow> {
    let (mut page, first) = VideoWorkflow::open(video_id);

    let start = Instant::now();
    let pb = ui::create_spinner("Loading transcript...");
    settle(Arc::clone(&app.api), &mut page, vec![first]).await;

    let words = page.transcript().value().map_or(0, |t| t.word_count);
    ui::finish(
        &pb,
        page.transcript(),
        &format!("Transcript loaded: {words} words"),
        start.elapsed(),
    )?;
    ui::flush_notices(page.notices(), true);
    Ok(page)
}

async fn summarize(app: &App, page: &mut VideoWorkflow) -> Result<()> {
    let envelope = page.generate_summary()?;
    let start = Instant::now();
    let pb = ui::create_spinner("Generating summary...");
    let follow_ups = step(app.api.as_ref(), page, envelope).await;
    ui::finish(&pb, page.summary(), "Summary generated", start.elapsed())?;
    ui::flush_notices(page.notices(), true);

    let settled = tokio::time::timeout(
        FOLLOW_UP_WAIT,
        settle(Arc::clone(&app.api), page, follow_ups),
    )
    .await;
    if settled.is_err() {
        warn!("indexing did not finish, continuing without refreshed recommendations");
    }
    ui::flush_notices(page.notices(), true);
    Ok(())
}

async fn make_quiz(app: &App, page: &mut VideoWorkflow) -> Result<()> {
    let envelope = page.generate_quiz()?;
    let start = Instant::now();
    let pb = ui::create_spinner("Generating quiz...");
    settle(Arc::clone(&app.api), page, vec![envelope]).await;
    ui::finish(&pb, page.quiz(), "Quiz generated", start.elapsed())?;
    ui::flush_notices(page.notices(), true);
    Ok(())
}

pub async fn video(
    app: &App,
    video_id: &str,
    steps: VideoSteps,
    output: Option<PathBuf>,
) -> Result<()> {
    ui::header("Video");
    let mut page = open_video(app, video_id).await?;

    if steps.summary {
        summarize(app, &mut page).await?;
    }
    if steps.quiz {
        make_quiz(app, &mut page).await?;
    }
    if steps.pdf {
        let envelope = page.generate_pdf()?;
        let start = Instant::now();
        let pb = ui::create_spinner("Building PDF...");
        settle(Arc::clone(&app.api), &mut page, vec![envelope]).await;
        ui::finish(&pb, page.pdf(), "PDF ready", start.elapsed())?;
        ui::flush_notices(page.notices(), true);
    }

    ui::rule();

    if steps.transcript {
        if let Some(transcript) = page.transcript().value() {
            println!("{}", format_transcript(transcript));
        }
    }
    if let Some(summary) = page.summary().value() {
        println!("{}", format_summary(summary));
    }
    if let Some(quiz) = page.quiz_mut() {
        println!("{}\n", style("Quiz (answer key)").bold());
        for i in 0..quiz.len() {
            quiz.reveal(i);
            println!("{}", format_question(quiz, i));
        }
    }
    match page.recommendations().value() {
        Some(recommendations) if !recommendations.is_empty() => {
            println!("{}\n", style("Related videos").bold());
            println!("{}\n", format_recommendations(recommendations));
        }
        _ => debug!("no recommendations to show"),
    }

    if let Some(artifact) = page.pdf().value() {
        save_artifact(app, artifact, output.as_deref()).await?;
    }
    Ok(())
}

/// Quiz in the terminal: pick an option by letter or number, or press
/// Enter to reveal the answer without guessing.
pub async fn quiz(app: &App, video_id: &str) -> Result<()> {
    ui::header("Quiz");
    let mut page = open_video(app, video_id).await?;
    make_quiz(app, &mut page).await?;
    ui::rule();

    let term = Term::stdout();
    let Some(session) = page.quiz_mut() else {
        bail!("No quiz available for this video");
    };

    for i in 0..session.len() {
        println!("{}", format_question(session, i));
        let options = session
            .question(i)
            .map(|q| q.options.clone())
            .unwrap_or_default();

        term.write_str(&format!("{} ", style("Your answer (Enter to reveal):").dim()))?;
        let line = term.read_line().context("failed to read answer")?;
        if let Some(option) = pick_option(&options, &line) {
            session.select(i, option);
        }
        session.reveal(i);

        let correct = session.is_correct(i) == Some(true);
        println!(
            "\n{}",
            if correct {
                style("Correct!").green().bold()
            } else {
                style("Not quite.").red().bold()
            }
        );
        println!("{}", format_question(session, i));
        ui::rule();
    }

    println!(
        "{} {}\n",
        style("Score:").dim(),
        style(session.score()).cyan().bold()
    );
    Ok(())
}

/// Maps `b`, `B` or `2` to the second option.
fn pick_option(options: &[String], input: &str) -> Option<String> {
    let input = input.trim();
    let mut chars = input.chars();
    let first = chars.next()?;
    if chars.next().is_some() && input.parse::<usize>().is_err() {
        return None;
    }
    let index = if first.is_ascii_alphabetic() {
        (first.to_ascii_lowercase() as u8).checked_sub(b'a')? as usize
    } else {
        input.parse::<usize>().ok()?.checked_sub(1)?
    };
    options.get(index).cloned()
}

pub async fn tool(
    app: &App,
    video_id: &str,
    tool: ToolKind,
    options: ToolOptions,
    output: Option<PathBuf>,
) -> Result<()> {
    ui::header(tool.label());
    let mut page = open_video(app, video_id).await?;
    summarize(app, &mut page).await?;

    *page.tools_mut().options_mut() = options;
    let envelope = page.select_tool(tool)?;
    let start = Instant::now();
    let pb = ui::create_spinner(&format!("Generating {}...", tool.label().to_lowercase()));
    settle(Arc::clone(&app.api), &mut page, vec![envelope]).await;
    ui::finish(&pb, page.tools().state(tool), "Done", start.elapsed())?;
    ui::flush_notices(page.notices(), true);
    ui::rule();

    let Some((_, state)) = page.tools().visible() else {
        return Ok(());
    };
    if let Some(result) = state.value() {
        println!("{}", format_tool_output(result));
        if let Some(artifact) = result.artifact() {
            println!(
                "{} {}",
                style("Download:").dim(),
                style(app.api.download_url(&artifact)).cyan()
            );
            if output.is_some() {
                save_artifact(app, &artifact, output.as_deref()).await?;
            }
        }
    }
    Ok(())
}

pub async fn download(
    app: &App,
    kind: ArtifactKind,
    filename: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    save_artifact(app, &Artifact::new(kind, filename), output.as_deref()).await
}

async fn save_artifact(app: &App, artifact: &Artifact, output: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    let pb = ui::create_spinner(&format!("Downloading {}...", artifact.filename));
    let bytes = match app.api.download(artifact).await {
        Ok(bytes) => bytes,
        Err(e) => {
            pb.finish_and_clear();
            let message = if e.is_not_found() {
                format!("{} {} not found on the server", artifact.kind.name(), artifact.filename)
            } else {
                e.user_message("Download failed")
            };
            bail!(message);
        }
    };

    let path = output.map_or_else(|| PathBuf::from(&artifact.filename), Path::to_path_buf);
    fs::write(&path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    pb.finish_with_message(format!(
        "{} Saved {} {}",
        style("✓").green().bold(),
        style(path.display()).cyan(),
        style(format!("[{}]", ui::format_elapsed(start.elapsed()))).dim()
    ));
    Ok(())
}

pub async fn voices(app: &App) -> Result<()> {
    let catalog = app
        .api
        .voices()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load voices")))?;
    for voice in catalog.voices {
        let availability = if voice.available {
            style("available").green()
        } else {
            style("unavailable").dim()
        };
        let category = voice.category.as_deref().unwrap_or("-");
        println!(
            "{:<24} {:<24} {:<12} {}",
            voice.voice_id, voice.name, category, availability
        );
    }
    Ok(())
}

pub async fn status(app: &App) -> Result<()> {
    let status = app
        .api
        .video_status()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to check video status")))?;
    let marker = if status.available {
        style("✓").green().bold()
    } else {
        style("✗").red().bold()
    };
    println!("{} {}", marker, status.message);
    Ok(())
}
