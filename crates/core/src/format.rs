use crate::{
    quiz::{QuestionState, QuizSession},
    types::{Recommendation, Summary, Transcript, VideoSummary},
    workflow::ToolOutput,
};

/// Format seconds as MM:SS
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub fn format_search_results(videos: &[VideoSummary]) -> String {
    let mut output = String::new();
    for (i, video) in videos.iter().enumerate() {
        output.push_str(&format!("{:>2}. {}\n", i + 1, video.title));
        output.push_str(&format!("    {} | {}\n", video.channel_name, video.video_id));
    }
    output
}

pub fn format_transcript(transcript: &Transcript) -> String {
    format!(
        "**Words:** {} | **Language:** {}\n\n{}\n",
        transcript.word_count,
        transcript.language,
        transcript.content.trim()
    )
}

pub fn format_summary(summary: &Summary) -> String {
    let mut output = String::new();
    if !summary.title.is_empty() {
        output.push_str(&format!("# {}\n\n", summary.title));
    }
    output.push_str(summary.summary_text.trim());
    output.push_str("\n\n");

    if !summary.key_topics.is_empty() {
        output.push_str("## Key topics\n\n");
        for topic in &summary.key_topics {
            output.push_str(&format!("• {}\n", topic));
        }
    }
    output
}

/// One question with its options. Once revealed, marks the correct answer
/// and the learner's pick.
pub fn format_question(session: &QuizSession, index: usize) -> String {
    let Some(question) = session.question(index) else {
        return String::new();
    };
    let state = session.state(index).cloned().unwrap_or_default();

    let mut output = format!("Q{}. {}\n", index + 1, question.question);
    for option in &question.options {
        let picked = state.selection() == Some(option.as_str());
        let marker = match &state {
            QuestionState::Revealed(_) if *option == question.correct_answer => "✓",
            QuestionState::Revealed(_) if picked => "✗",
            _ if picked => "›",
            _ => " ",
        };
        output.push_str(&format!("  {} {}\n", marker, option));
    }
    if state.is_revealed() && !question.explanation.is_empty() {
        output.push_str(&format!("\n  {}\n", question.explanation));
    }
    output
}

pub fn format_recommendations(recommendations: &[Recommendation]) -> String {
    recommendations
        .iter()
        .map(|rec| {
            format!(
                "{:>3.0}%  {} ({}) [{}]",
                rec.similarity_score * 100.0,
                rec.title,
                rec.channel_title,
                rec.video_id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_tool_output(output: &ToolOutput) -> String {
    match output {
        ToolOutput::Script(script) => {
            let mut text = String::new();
            if let Some(title) = &script.title {
                text.push_str(&format!("# {}\n\n", title));
            }
            text.push_str(&format!(
                "**Words:** {} | **Estimated:** {} min\n\n{}\n",
                script.word_count,
                script.estimated_duration_minutes,
                script.script.trim()
            ));
            text
        }
        ToolOutput::Slides(slides) => format!(
            "{} ({} slides)\nFile: {}\n",
            slides.title, slides.slide_count, slides.filename
        ),
        ToolOutput::Images(images) => images
            .iter()
            .map(|image| {
                let caption = if image.description.is_empty() {
                    image.id.as_str()
                } else {
                    image.description.as_str()
                };
                format!("• {} {}\n  {}", caption, image.attribution, image.urls.full)
            })
            .collect::<Vec<_>>()
            .join("\n"),
        ToolOutput::Voice(file) | ToolOutput::Video(file) => match file.duration_seconds {
            Some(seconds) => format!("File: {} ({})\n", file.filename, format_duration(seconds)),
            None => format!("File: {}\n", file.filename),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Quiz, QuizQuestion};

    fn session() -> QuizSession {
        QuizSession::new(Quiz {
            title: "Ownership".into(),
            questions: vec![QuizQuestion {
                question: "Who frees the value?".into(),
                options: vec!["A) The owner".into(), "B) The borrower".into()],
                correct_answer: "A) The owner".into(),
                explanation: "Drop runs when the owner goes out of scope.".into(),
            }],
        })
    }

    #[test]
    fn duration_rounds_to_seconds() {
        assert_eq!(format_duration(125.6), "02:06");
        assert_eq!(format_duration(-3.0), "00:00");
    }

    #[test]
    fn revealed_question_marks_answer_and_pick() {
        let mut quiz = session();
        quiz.select(0, "B) The borrower");
        quiz.reveal(0);

        let text = format_question(&quiz, 0);
        assert!(text.contains("✓ A) The owner"));
        assert!(text.contains("✗ B) The borrower"));
        assert!(text.contains("Drop runs"));
    }

    #[test]
    fn unrevealed_question_hides_explanation() {
        let mut quiz = session();
        quiz.select(0, "A) The owner");
        let text = format_question(&quiz, 0);
        assert!(text.contains("› A) The owner"));
        assert!(!text.contains("✓"));
        assert!(!text.contains("Drop runs"));
    }

    #[test]
    fn similarity_as_percent() {
        let text = format_recommendations(&[Recommendation {
            video_id: "xyz".into(),
            title: "Lifetimes".into(),
            channel_title: "Rust Channel".into(),
            similarity_score: 0.873,
        }]);
        assert_eq!(text, " 87%  Lifetimes (Rust Channel) [xyz]");
    }
}
