mod cli;
mod commands;
mod error;

use crate::cli::{Cli, Command, LineCommand, ProjectCommand};
use crate::commands::Context;
use crate::error::Result;
use clap::Parser;
use lyricstudio_core::{CoreError, ProjectStore, StudioConfig};
use lyricstudio_remote::HttpProjectStore;
use std::fs::File;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();

    // Check config for logging.enabled before full config load
    let file_logging_enabled = check_file_logging_enabled();
    init_tracing(file_logging_enabled);

    // Load config or create template on first run
    let config = match StudioConfig::load_or_create() {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            info!("Created config template at {}, using defaults", path.display());
            StudioConfig::default()
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let ctx = Context::new(config, cli.session);
    if let Err(e) = run(&ctx, cli.command) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Import { file } => commands::import(ctx, &file),
        Command::Paste { file } => commands::paste(ctx, &file),
        Command::List => commands::list(ctx),
        Command::Line(line) => match line {
            LineCommand::Add { text, at, after } => commands::add_line(ctx, &text, at, after).map(|_| ()),
            LineCommand::Edit { id, text, at, clear } => commands::edit_line(ctx, id, text, at, clear),
            LineCommand::Delete { id } => commands::delete_line(ctx, id),
            LineCommand::Move { id, index } => commands::move_line(ctx, id, index),
        },
        Command::Export {
            out,
            legacy_name,
            stdout,
        } => commands::export(ctx, out.as_deref(), legacy_name, stdout).map(|_| ()),
        Command::Cues { duration, vertical } => commands::cues(ctx, duration, vertical).map(|_| ()),
        Command::Active { at } => commands::active(ctx, at).map(|_| ()),
        Command::Check => commands::check(ctx),
        Command::Project(project) => run_remote(ctx, RemoteCommand::Project(project)),
        Command::Pull { project } => run_remote(ctx, RemoteCommand::Pull { project }),
        Command::Push { project } => run_remote(ctx, RemoteCommand::Push { project }),
        Command::Watch { project } => run_remote(ctx, RemoteCommand::Watch { project }),
    }
}

/// Commands that talk to the project backend
enum RemoteCommand {
    Project(ProjectCommand),
    Pull { project: String },
    Push { project: Option<String> },
    Watch { project: Option<String> },
}

fn run_remote(ctx: &Context, command: RemoteCommand) -> Result<()> {
    let store: Arc<dyn ProjectStore> = Arc::new(HttpProjectStore::new(&ctx.config.remote)?);
    info!("Using project backend at {}", ctx.config.remote.base_url);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        match command {
            RemoteCommand::Project(ProjectCommand::Create { name }) => {
                commands::create_project(ctx, store.as_ref(), &name).await
            }
            RemoteCommand::Project(ProjectCommand::Show { id }) => commands::show_project(store.as_ref(), &id).await,
            RemoteCommand::Project(ProjectCommand::Rename { id, name }) => {
                commands::rename_project(store.as_ref(), &id, &name).await
            }
            RemoteCommand::Project(ProjectCommand::Delete { id }) => {
                commands::delete_project(ctx, store.as_ref(), &id).await
            }
            RemoteCommand::Pull { project } => commands::pull(ctx, store.as_ref(), &project).await,
            RemoteCommand::Push { project } => commands::push(ctx, store.as_ref(), project.as_deref()).await,
            RemoteCommand::Watch { project } => {
                // Set up Ctrl+C handler to trigger graceful shutdown
                let cancel_token = CancellationToken::new();
                let ctrlc_token = cancel_token.clone();
                if let Err(e) = ctrlc::set_handler(move || {
                    info!("Received Ctrl+C, shutting down gracefully...");
                    ctrlc_token.cancel();
                }) {
                    warn!("Failed to set Ctrl+C handler: {e}");
                }

                commands::watch(ctx, store, project.as_deref(), cancel_token).await
            }
        }
    })
}

fn check_file_logging_enabled() -> bool {
    // Minimal structs to parse just the logging.enabled field
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }
    #[derive(serde::Deserialize, Default)]
    struct PartialLoggingConfig {
        #[serde(default)]
        enabled: bool,
    }

    let config_path = StudioConfig::config_path();
    let Ok(content) = std::fs::read_to_string(&config_path) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing with stderr output and optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest_retry=warn"));

    // Logs go to stderr so command output can be piped
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path = lyricstudio_core::paths::log_file_path();

        // Create config directory if needed
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
