use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tubementor_core::ClientConfig;

mod app;
mod toast;
mod view;

use app::App;

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(api_url = %config.api_url, "starting tubementor desktop");

    iced::application(move || App::new(config.clone()), App::update, view::view)
        .title(App::title)
        .theme(App::theme)
        .subscription(App::subscription)
        .window_size((1100.0, 760.0))
        .run()
}
