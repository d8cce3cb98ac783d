use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use querylens::config::{Command, CommandLineArgs, Config};
use querylens::{AppState, handlers};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Load configuration first
    let args = CommandLineArgs::parse();
    let config = Config::load(&args)?;

    // Initialize logging; stdout is reserved for reports
    let log_filter = tracing_subscriber::EnvFilter::new(&config.logging.level);
    let registry = tracing_subscriber::registry().with(log_filter);

    // The guard flushes the file writer on drop, so it lives until main returns
    let _guard = if let Some(log_file) = &config.logging.file {
        let log_path = std::path::Path::new(log_file);
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let log_dir = log_path
            .parent()
            .and_then(|p| p.to_str())
            .filter(|p| !p.is_empty())
            .unwrap_or("logs");
        let file_name = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("querylens.log");
        // Rolling appender adds the date suffix
        let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);

        let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
        Some(guard)
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
        None
    };

    tracing::debug!(
        "Configuration loaded: service={} timeout={}s color={}",
        config.service.base_url,
        config.service.timeout_secs,
        config.display.color
    );

    let state = AppState::new(&config);

    let succeeded = match &args.command {
        Command::Analyze { input, json, formatted } => {
            handlers::analyze::run(&state, input, *json, *formatted).await?
        },
        Command::Suggest { input } => handlers::suggest::run(&state, input).await?,
        Command::Interactive => {
            handlers::interactive::run(&state).await?;
            true
        },
        Command::Samples => {
            handlers::samples::run(&state);
            true
        },
    };

    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
