use iced::{
    Element, Length,
    widget::{
        Column, Space, button, checkbox, column, container, row, rule, scrollable, text,
        text_input,
    },
};
use tubementor_core::{
    ActionState, CallbackState, NoticeLevel, QuestionState, Tab, ToolKind, VideoWorkflow,
    format::{format_summary, format_tool_output},
};

use crate::app::{App, Message, Screen};

pub fn view(app: &App) -> Element<'_, Message> {
    let body = match app.screen {
        Screen::Search => search(app),
        Screen::Video => match &app.video {
            Some(page) => video(app, page),
            None => search(app),
        },
        Screen::SignIn => sign_in(app),
        Screen::Callback => callback(app),
    };

    column![header(app), rule::horizontal(1), body, toasts(app)]
        .spacing(12)
        .padding(16)
        .into()
}

fn header(app: &App) -> Element<'_, Message> {
    let account: Element<'_, Message> = match &app.user {
        Some(user) => row![
            text(user.display_name()),
            button(text("Sign out"))
                .style(button::secondary)
                .on_press(Message::Logout),
        ]
        .spacing(8)
        .into(),
        None => button(text("Sign in"))
            .on_press(Message::Navigate(Screen::SignIn))
            .into(),
    };

    row![
        button(text("TubeMentor").size(24))
            .style(button::text)
            .on_press(Message::Navigate(Screen::Search)),
        Space::new().width(Length::Fill),
        account,
    ]
    .spacing(8)
    .into()
}

fn toasts(app: &App) -> Element<'_, Message> {
    let mut list = Column::new().spacing(4);
    for notice in app.toasts.iter() {
        let marker = match notice.level {
            NoticeLevel::Success => "✓",
            NoticeLevel::Info => "•",
            NoticeLevel::Error => "✗",
        };
        list = list.push(text(format!("{marker} {}", notice.message)));
    }
    list.into()
}

/// Placeholder text for an action that has not produced a value yet.
fn pending<T>(state: &ActionState<T>, loading: &'static str) -> Option<Element<'static, Message>> {
    match state {
        ActionState::Loading { previous: None } => Some(text(loading).into()),
        ActionState::Error {
            message,
            previous: None,
        } => Some(text(message.clone()).into()),
        _ => None,
    }
}

fn search(app: &App) -> Element<'_, Message> {
    let busy = app.search.results().is_loading();
    let controls = row![
        text_input("Search educational videos...", &app.query)
            .on_input(Message::QueryChanged)
            .on_submit(Message::Search),
        button(text("Search")).on_press_maybe((!busy).then_some(Message::Search)),
        button(text("Search my library"))
            .style(button::secondary)
            .on_press(Message::SemanticSearch),
    ]
    .spacing(8);

    let mut results = Column::new().spacing(6);
    if let Some(placeholder) = pending(app.search.results(), "Searching...") {
        results = results.push(placeholder);
    }
    for video in app.search.results().value().into_iter().flatten() {
        results = results.push(
            button(column![
                text(&video.title).size(16),
                text(&video.channel_name).size(12),
            ])
            .width(Length::Fill)
            .style(button::secondary)
            .on_press(Message::OpenVideo(video.video_id.clone())),
        );
    }

    if let Some(hits) = app.search.semantic().value().filter(|hits| !hits.is_empty()) {
        results = results.push(text("From your library").size(18));
        for hit in hits {
            results = results.push(
                button(text(format!(
                    "{:.0}%  {}",
                    hit.similarity_score * 100.0,
                    hit.title
                )))
                .width(Length::Fill)
                .style(button::text)
                .on_press(Message::OpenVideo(hit.video_id.clone())),
            );
        }
    }

    column![controls, scrollable(results).height(Length::Fill)]
        .spacing(12)
        .into()
}

fn video<'a>(app: &'a App, page: &'a VideoWorkflow) -> Element<'a, Message> {
    let title = page
        .summary()
        .value()
        .map(|s| s.title.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or(page.video_id());

    let mut tabs = row![].spacing(6);
    for (tab, label) in [
        (Tab::Transcript, "Transcript"),
        (Tab::Summary, "Summary"),
        (Tab::Quiz, "Quiz"),
        (Tab::Tools, "Tools"),
    ] {
        let style = if page.tab() == tab {
            button::primary
        } else {
            button::secondary
        };
        tabs = tabs.push(button(text(label)).style(style).on_press(Message::SelectTab(tab)));
    }

    let mut actions = row![
        button(text("Back"))
            .style(button::secondary)
            .on_press(Message::Back),
        text(title).size(20),
        Space::new().width(Length::Fill),
        button(text("Export PDF")).on_press_maybe(
            (!page.pdf().is_loading()).then_some(Message::GeneratePdf)
        ),
    ]
    .spacing(8);
    if let Some(artifact) = page.pdf().value() {
        actions = actions.push(
            button(text("Download PDF"))
                .style(button::success)
                .on_press(Message::Download(artifact.clone())),
        );
    }

    let body = match page.tab() {
        Tab::Transcript => transcript_tab(page),
        Tab::Summary => summary_tab(page),
        Tab::Quiz => quiz_tab(page),
        Tab::Tools => tools_tab(app, page),
    };

    let main = column![actions, tabs, scrollable(body).height(Length::Fill)]
        .spacing(10)
        .width(Length::FillPortion(3));

    row![main, recommendations(page)].spacing(16).into()
}

fn transcript_tab(page: &VideoWorkflow) -> Element<'_, Message> {
    if let Some(placeholder) = pending(page.transcript(), "Loading transcript...") {
        return placeholder;
    }
    match page.transcript().value() {
        Some(transcript) => column![
            text(format!("{} words", transcript.word_count)).size(12),
            text(&transcript.content),
        ]
        .spacing(8)
        .into(),
        None => text("").into(),
    }
}

fn summary_tab(page: &VideoWorkflow) -> Element<'_, Message> {
    let generate = button(text("Generate summary"))
        .on_press_maybe((!page.summary().is_loading()).then_some(Message::GenerateSummary));

    let mut content = column![generate].spacing(10);
    if let Some(placeholder) = pending(page.summary(), "Summarizing...") {
        content = content.push(placeholder);
    }
    if let Some(summary) = page.summary().value() {
        content = content.push(text(format_summary(summary)));
    }
    content.into()
}

fn quiz_tab(page: &VideoWorkflow) -> Element<'_, Message> {
    let generate = button(text("Generate quiz"))
        .on_press_maybe((!page.quiz().is_loading()).then_some(Message::GenerateQuiz));

    let mut content = column![generate].spacing(14);
    if let Some(placeholder) = pending(page.quiz(), "Writing questions...") {
        content = content.push(placeholder);
    }
    let Some(session) = page.quiz().value() else {
        return content.into();
    };

    for (index, question) in session.quiz().questions.iter().enumerate() {
        let state = session.state(index).cloned().unwrap_or_default();
        let revealed = state.is_revealed();

        let mut block = column![text(format!("{}. {}", index + 1, question.question)).size(16)]
            .spacing(4);
        for option in &question.options {
            let picked = state.selection() == Some(option.as_str());
            let style = match &state {
                QuestionState::Revealed(_) if *option == question.correct_answer => button::success,
                QuestionState::Revealed(_) if picked => button::danger,
                _ if picked => button::primary,
                _ => button::secondary,
            };
            block = block.push(
                button(text(option))
                    .width(Length::Fill)
                    .style(style)
                    .on_press_maybe(
                        (!revealed).then(|| Message::SelectOption(index, option.clone())),
                    ),
            );
        }
        if revealed {
            if !question.explanation.is_empty() {
                block = block.push(text(&question.explanation).size(13));
            }
        } else {
            block = block.push(
                button(text("Show answer"))
                    .style(button::text)
                    .on_press(Message::Reveal(index)),
            );
        }
        content = content.push(block);
    }

    content
        .push(text(format!("Score: {}", session.score())).size(18))
        .into()
}

fn tools_tab<'a>(app: &'a App, page: &'a VideoWorkflow) -> Element<'a, Message> {
    let tools = page.tools();
    let mut picker = row![].spacing(6);
    for tool in ToolKind::ALL {
        let style = if tools.active() == Some(tool) {
            button::primary
        } else {
            button::secondary
        };
        let label = if tools.state(tool).is_loading() {
            format!("{}…", tool.label())
        } else {
            tool.label().to_string()
        };
        picker = picker.push(button(text(label)).style(style).on_press(Message::SelectTool(tool)));
    }

    let options = row![
        text("Script minutes"),
        text_input("10", &app.minutes_input)
            .on_input(Message::MinutesChanged)
            .width(Length::Fixed(60.0)),
        text("Voice id"),
        text_input("default", &app.voice_input)
            .on_input(Message::VoiceChanged)
            .width(Length::Fixed(180.0)),
        checkbox(tools.options().include_audio)
            .label("Video with narration")
            .on_toggle(Message::IncludeAudio),
    ]
    .spacing(8);

    let mut content = column![picker, options].spacing(12);
    if let Some((tool, state)) = tools.visible() {
        if let Some(placeholder) = pending(state, "Generating...") {
            content = content.push(placeholder);
        }
        if let Some(output) = state.value() {
            content = content.push(text(tool.label()).size(18));
            content = content.push(text(format_tool_output(output)));
            if let Some(artifact) = output.artifact() {
                content = content.push(
                    button(text(format!("Download {}", artifact.filename)))
                        .style(button::success)
                        .on_press(Message::Download(artifact)),
                );
            }
        }
    } else if page.summary().value().is_none() {
        content = content.push(text("Generate a summary to unlock the tools.").size(13));
    }
    content.into()
}

fn recommendations(page: &VideoWorkflow) -> Element<'_, Message> {
    let mut list = column![text("Related videos").size(16)].spacing(6);
    match page.recommendations().value() {
        Some(items) if !items.is_empty() => {
            for item in items {
                list = list.push(
                    button(column![
                        text(&item.title).size(14),
                        text(format!(
                            "{} · {:.0}% match",
                            item.channel_title,
                            item.similarity_score * 100.0
                        ))
                        .size(11),
                    ])
                    .width(Length::Fill)
                    .style(button::text)
                    .on_press(Message::OpenVideo(item.video_id.clone())),
                );
            }
        }
        _ => list = list.push(text("Summarize videos to build recommendations.").size(12)),
    }
    container(scrollable(list))
        .width(Length::FillPortion(1))
        .into()
}

fn sign_in(app: &App) -> Element<'_, Message> {
    let form = &app.auth;
    let submit_label = if form.signup { "Create account" } else { "Sign in" };

    let mut content = column![
        text(if form.signup { "Create an account" } else { "Welcome back" }).size(22),
        text_input("Email", &form.email).on_input(Message::EmailChanged),
        text_input("Password", &form.password)
            .secure(true)
            .on_input(Message::PasswordChanged)
            .on_submit(Message::SubmitAuth),
    ]
    .spacing(10)
    .max_width(420);

    if form.signup {
        content = content.push(
            text_input("Full name (optional)", &form.full_name).on_input(Message::NameChanged),
        );
    }
    if let Some(error) = &form.error {
        content = content.push(text(error));
    }

    content = content
        .push(
            button(text(submit_label))
                .on_press_maybe((!form.busy).then_some(Message::SubmitAuth)),
        )
        .push(
            button(text("Continue with Google"))
                .style(button::secondary)
                .on_press(Message::OpenGoogle),
        )
        .push(
            button(text(if form.signup {
                "Already have an account? Sign in"
            } else {
                "No account yet? Sign up"
            }))
            .style(button::text)
            .on_press(Message::ToggleSignup),
        );

    container(content).center_x(Length::Fill).into()
}

fn callback(app: &App) -> Element<'_, Message> {
    let mut content = column![text("Sign in with Google").size(22)]
        .spacing(10)
        .max_width(560);

    if let Some(url) = &app.google_url {
        content = content
            .push(text("Open this link in your browser (it is on your clipboard):").size(13))
            .push(text(url).size(11));
    }

    content = content.push(
        text_input("Paste the address you were redirected to", &app.callback_input)
            .on_input(Message::CallbackInputChanged)
            .on_submit(Message::CompleteOAuth),
    );

    let status: Element<'_, Message> = match &app.callback {
        None => button(text("Finish sign-in"))
            .on_press(Message::CompleteOAuth)
            .into(),
        Some(CallbackState::Processing) => text("Completing sign-in...").into(),
        Some(CallbackState::Success) => text("Signed in! Taking you home...").into(),
        Some(CallbackState::Error(message)) => column![
            text(format!("Sign-in failed: {message}")),
            button(text("Try again")).on_press(Message::OpenGoogle),
        ]
        .spacing(8)
        .into(),
    };

    container(content.push(status)).center_x(Length::Fill).into()
}
