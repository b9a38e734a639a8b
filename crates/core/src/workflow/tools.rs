//! Content-tools panel: five generators that all build on a video summary.

use crate::{
    action::ActionState,
    api::Backend,
    error::{ApiError, Result},
    notice::{Notice, Notices},
    types::{Artifact, ArtifactKind, ImageAsset, MediaFile, MediaResult, Script, Slides},
    workflow::Blocked,
};

pub const DEFAULT_SCRIPT_MINUTES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Script,
    Slides,
    Images,
    Voice,
    Video,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Script,
        ToolKind::Slides,
        ToolKind::Images,
        ToolKind::Voice,
        ToolKind::Video,
    ];

    fn index(self) -> usize {
        match self {
            ToolKind::Script => 0,
            ToolKind::Slides => 1,
            ToolKind::Images => 2,
            ToolKind::Voice => 3,
            ToolKind::Video => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Script => "Script",
            ToolKind::Slides => "Slides",
            ToolKind::Images => "Images",
            ToolKind::Voice => "Voice",
            ToolKind::Video => "Video",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            ToolKind::Script => "Failed to generate script",
            ToolKind::Slides => "Failed to generate slides",
            ToolKind::Images => "Failed to fetch images",
            ToolKind::Voice => "Voice generation failed",
            ToolKind::Video => "Video generation failed",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            ToolKind::Script => "Script generated",
            ToolKind::Slides => "Slides ready to download",
            ToolKind::Images => "Images found",
            ToolKind::Voice => "Voice narration ready",
            ToolKind::Video => "Video ready to download",
        }
    }
}

impl std::str::FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tool '{s}'"))
    }
}

#[derive(Debug, Clone)]
pub enum ToolRequest {
    Script { video_id: String, duration_minutes: u32 },
    Slides { video_id: String },
    Images { video_id: String },
    Voice { video_id: String, voice_id: Option<String> },
    Video {
        video_id: String,
        include_audio: bool,
        voice_id: Option<String>,
    },
}

impl ToolRequest {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolRequest::Script { .. } => ToolKind::Script,
            ToolRequest::Slides { .. } => ToolKind::Slides,
            ToolRequest::Images { .. } => ToolKind::Images,
            ToolRequest::Voice { .. } => ToolKind::Voice,
            ToolRequest::Video { .. } => ToolKind::Video,
        }
    }
}

/// Body as the backend sent it.
#[derive(Debug, Clone)]
pub enum ToolResponse {
    Script(Script),
    Slides(Slides),
    Images(Vec<ImageAsset>),
    Voice(MediaResult),
    Video(MediaResult),
}

/// What a panel renders after a successful generation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Script(Script),
    Slides(Slides),
    Images(Vec<ImageAsset>),
    Voice(MediaFile),
    Video(MediaFile),
}

impl ToolOutput {
    /// Downloadable file produced by this tool, if it produced one.
    pub fn artifact(&self) -> Option<Artifact> {
        match self {
            ToolOutput::Slides(slides) => {
                Some(Artifact::new(ArtifactKind::Slides, &slides.filename))
            }
            ToolOutput::Voice(file) => Some(Artifact::new(ArtifactKind::Voice, &file.filename)),
            ToolOutput::Video(file) => Some(Artifact::new(ArtifactKind::Video, &file.filename)),
            ToolOutput::Script(_) | ToolOutput::Images(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolOptions {
    pub script_minutes: u32,
    pub voice_id: Option<String>,
    pub include_audio: bool,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            script_minutes: DEFAULT_SCRIPT_MINUTES,
            voice_id: None,
            include_audio: false,
        }
    }
}

pub(crate) async fn run<B: Backend + ?Sized>(
    backend: &B,
    req: ToolRequest,
) -> Result<ToolResponse> {
    match req {
        ToolRequest::Script {
            video_id,
            duration_minutes,
        } => backend
            .script(&video_id, duration_minutes)
            .await
            .map(ToolResponse::Script),
        ToolRequest::Slides { video_id } => {
            backend.slides(&video_id).await.map(ToolResponse::Slides)
        }
        ToolRequest::Images { video_id } => {
            backend.images(&video_id).await.map(ToolResponse::Images)
        }
        ToolRequest::Voice { video_id, voice_id } => backend
            .voice(&video_id, voice_id.as_deref())
            .await
            .map(ToolResponse::Voice),
        ToolRequest::Video {
            video_id,
            include_audio,
            voice_id,
        } => backend
            .video(&video_id, include_audio, voice_id.as_deref())
            .await
            .map(ToolResponse::Video),
    }
}

/// Turns a `success` flag inside a 2xx body into a proper result.
fn media_file(result: MediaResult, kind: ToolKind) -> Result<MediaFile> {
    if !result.success {
        return Err(ApiError::Domain(
            result
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| kind.failure_message().to_string()),
        ));
    }
    let filename = result
        .filename
        .ok_or_else(|| ApiError::Decode(format!("{} response has no filename", kind.label())))?;
    Ok(MediaFile {
        filename,
        duration_seconds: result.duration_seconds,
    })
}

#[derive(Debug)]
pub struct ContentTools {
    active: Option<ToolKind>,
    states: [ActionState<ToolOutput>; 5],
    options: ToolOptions,
}

impl Default for ContentTools {
    fn default() -> Self {
        Self {
            active: None,
            states: std::array::from_fn(|_| ActionState::Idle),
            options: ToolOptions::default(),
        }
    }
}

impl ContentTools {
    pub fn active(&self) -> Option<ToolKind> {
        self.active
    }

    pub fn state(&self, tool: ToolKind) -> &ActionState<ToolOutput> {
        &self.states[tool.index()]
    }

    pub fn options(&self) -> &ToolOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ToolOptions {
        &mut self.options
    }

    /// The only result a host should draw: the active tool's.
    pub fn visible(&self) -> Option<(ToolKind, &ActionState<ToolOutput>)> {
        self.active.map(|tool| (tool, self.state(tool)))
    }

    /// Switches the panel to `tool` and starts its generation.
    ///
    /// Anything already running for another tool keeps running.
    pub fn select(
        &mut self,
        tool: ToolKind,
        video_id: &str,
        summary_ready: bool,
        notices: &mut Notices,
    ) -> std::result::Result<ToolRequest, Blocked> {
        if !summary_ready {
            notices.push(Notice::error(Blocked::SummaryRequired.to_string()));
            return Err(Blocked::SummaryRequired);
        }
        self.active = Some(tool);

        let state = &mut self.states[tool.index()];
        if state.is_loading() {
            return Err(Blocked::InFlight);
        }
        state.start();

        let video_id = video_id.to_string();
        Ok(match tool {
            ToolKind::Script => ToolRequest::Script {
                video_id,
                duration_minutes: self.options.script_minutes,
            },
            ToolKind::Slides => ToolRequest::Slides { video_id },
            ToolKind::Images => ToolRequest::Images { video_id },
            ToolKind::Voice => ToolRequest::Voice {
                video_id,
                voice_id: self.options.voice_id.clone(),
            },
            ToolKind::Video => ToolRequest::Video {
                video_id,
                include_audio: self.options.include_audio,
                // narration voice only matters when audio is requested
                voice_id: self
                    .options
                    .voice_id
                    .clone()
                    .filter(|_| self.options.include_audio),
            },
        })
    }

    /// Stores a result regardless of which tab is active now.
    pub fn apply(&mut self, tool: ToolKind, result: Result<ToolResponse>, notices: &mut Notices) {
        let output = result.and_then(|response| match response {
            ToolResponse::Script(script) => Ok(ToolOutput::Script(script)),
            ToolResponse::Slides(slides) => Ok(ToolOutput::Slides(slides)),
            ToolResponse::Images(images) => Ok(ToolOutput::Images(images)),
            ToolResponse::Voice(media) => media_file(media, ToolKind::Voice).map(ToolOutput::Voice),
            ToolResponse::Video(media) => media_file(media, ToolKind::Video).map(ToolOutput::Video),
        });

        let state = &mut self.states[tool.index()];
        match output {
            Ok(output) => {
                state.succeed(output);
                notices.push(Notice::success(tool.success_message()));
            }
            Err(err) => {
                let message = err.user_message(tool.failure_message());
                tracing::warn!(tool = tool.label(), error = %err, "content generation failed");
                state.fail(message.clone());
                notices.push(Notice::error(message));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slides() -> Slides {
        Slides {
            title: "Ownership".into(),
            filename: "ownership.pptx".into(),
            slide_count: 7,
        }
    }

    #[test]
    fn blocked_without_summary() {
        let mut tools = ContentTools::default();
        let mut notices = Notices::default();
        let err = tools
            .select(ToolKind::Slides, "vid", false, &mut notices)
            .unwrap_err();
        assert_eq!(err, Blocked::SummaryRequired);
        assert_eq!(tools.active(), None);
        assert!(tools.state(ToolKind::Slides).is_idle());
        assert_eq!(notices.drain(), vec![Notice::error("Generate a summary first")]);
    }

    #[test]
    fn result_lands_even_after_switching_tabs() {
        let mut tools = ContentTools::default();
        let mut notices = Notices::default();

        tools.select(ToolKind::Slides, "vid", true, &mut notices).unwrap();
        tools.select(ToolKind::Script, "vid", true, &mut notices).unwrap();
        assert_eq!(tools.active(), Some(ToolKind::Script));

        tools.apply(ToolKind::Slides, Ok(ToolResponse::Slides(slides())), &mut notices);

        assert_eq!(
            tools.state(ToolKind::Slides).value(),
            Some(&ToolOutput::Slides(slides()))
        );
        let (visible, state) = tools.visible().unwrap();
        assert_eq!(visible, ToolKind::Script);
        assert!(state.is_loading());
    }

    #[test]
    fn voice_success_false_is_a_domain_failure() {
        let mut tools = ContentTools::default();
        let mut notices = Notices::default();
        tools.select(ToolKind::Voice, "vid", true, &mut notices).unwrap();

        tools.apply(
            ToolKind::Voice,
            Ok(ToolResponse::Voice(MediaResult {
                success: false,
                filename: None,
                duration_seconds: None,
                error: Some("ElevenLabs API key not configured".into()),
            })),
            &mut notices,
        );

        assert_eq!(
            tools.state(ToolKind::Voice).error(),
            Some("ElevenLabs API key not configured")
        );
        assert_eq!(
            notices.drain(),
            vec![Notice::error("ElevenLabs API key not configured")]
        );
    }

    #[test]
    fn video_failure_without_message_uses_generic_text() {
        let mut tools = ContentTools::default();
        let mut notices = Notices::default();
        tools.select(ToolKind::Video, "vid", true, &mut notices).unwrap();
        tools.apply(
            ToolKind::Video,
            Ok(ToolResponse::Video(MediaResult {
                success: false,
                filename: None,
                duration_seconds: None,
                error: None,
            })),
            &mut notices,
        );
        assert_eq!(tools.state(ToolKind::Video).error(), Some("Video generation failed"));
    }

    #[test]
    fn video_voice_follows_include_audio() {
        let mut tools = ContentTools::default();
        let mut notices = Notices::default();
        tools.options_mut().voice_id = Some("rachel".into());

        let silent = tools.select(ToolKind::Video, "vid", true, &mut notices).unwrap();
        assert!(matches!(silent, ToolRequest::Video { voice_id: None, .. }));

        tools.apply(
            ToolKind::Video,
            Err(ApiError::Status {
                status: 500,
                detail: None,
            }),
            &mut notices,
        );
        tools.options_mut().include_audio = true;
        let narrated = tools.select(ToolKind::Video, "vid", true, &mut notices).unwrap();
        match narrated {
            ToolRequest::Video {
                include_audio,
                voice_id,
                ..
            } => {
                assert!(include_audio);
                assert_eq!(voice_id.as_deref(), Some("rachel"));
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn successful_video_exposes_download() {
        let mut tools = ContentTools::default();
        let mut notices = Notices::default();
        let req = tools.select(ToolKind::Video, "vid", true, &mut notices).unwrap();
        assert!(matches!(req, ToolRequest::Video { include_audio: false, .. }));

        tools.apply(
            ToolKind::Video,
            Ok(ToolResponse::Video(MediaResult {
                success: true,
                filename: Some("video_vid.mp4".into()),
                duration_seconds: Some(42.0),
                error: None,
            })),
            &mut notices,
        );
        let artifact = tools.state(ToolKind::Video).value().unwrap().artifact().unwrap();
        assert_eq!(artifact.download_path(), "/api/content/video/download/video_vid.mp4");
    }

    #[test]
    fn second_click_while_loading_sends_nothing() {
        let mut tools = ContentTools::default();
        let mut notices = Notices::default();
        tools.select(ToolKind::Images, "vid", true, &mut notices).unwrap();
        assert_eq!(
            tools.select(ToolKind::Images, "vid", true, &mut notices).unwrap_err(),
            Blocked::InFlight
        );
    }

    #[test]
    fn tool_names_parse_case_insensitively() {
        assert_eq!("voice".parse::<ToolKind>().unwrap(), ToolKind::Voice);
        assert_eq!("SLIDES".parse::<ToolKind>().unwrap(), ToolKind::Slides);
        assert!("podcast".parse::<ToolKind>().is_err());
    }
}
