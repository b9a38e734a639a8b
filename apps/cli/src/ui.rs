use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tubementor_core::{ActionState, Notice, NoticeLevel, Notices};

pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Closes a spinner with a ✓ line, or clears it and hands back the error
/// when `state` settled on a failure.
pub fn finish<T>(
    pb: &ProgressBar,
    state: &ActionState<T>,
    done: &str,
    elapsed: Duration,
) -> anyhow::Result<()> {
    if let Some(message) = state.error() {
        pb.finish_and_clear();
        anyhow::bail!("{message}");
    }
    pb.finish_with_message(format!(
        "{} {} {}",
        style("✓").green().bold(),
        done,
        style(format!("[{}]", format_elapsed(elapsed))).dim()
    ));
    Ok(())
}

pub fn print_notice(notice: &Notice) {
    let marker = match notice.level {
        NoticeLevel::Success => style("✓").green().bold(),
        NoticeLevel::Info => style("•").cyan().bold(),
        NoticeLevel::Error => style("✗").red().bold(),
    };
    eprintln!("{} {}", marker, notice.message);
}

/// Flushes queued notices to stderr. With `spinner_reported`, success and
/// error notices are dropped since the spinner line already showed them.
pub fn flush_notices(notices: &mut Notices, spinner_reported: bool) {
    for notice in notices.drain() {
        if !spinner_reported || notice.level == NoticeLevel::Info {
            print_notice(&notice);
        }
    }
}

pub fn header(title: &str) {
    println!(
        "\n{}  {}\n",
        style("tubementor").cyan().bold(),
        style(title).dim()
    );
}

pub fn rule() {
    println!("{}", style("─".repeat(60)).dim());
}
