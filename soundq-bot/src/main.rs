//! SoundQ console front end - Main entry point
//!
//! Runs the sound command against an in-memory session queue, reading chat
//! lines from stdin and printing bot messages to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use soundq_bot::confirm::Choice;
use soundq_bot::config::BotSettings;
use soundq_bot::library::SoundLibrary;
use soundq_bot::queue::{QueueService, SessionQueue};
use soundq_bot::resolver::{CatalogBackend, ChainBackend, LocalFileBackend, ResolverBackend};
use soundq_bot::track::Requester;
use soundq_bot::transport::{parse_command_line, ConsoleCommand, ConsoleTransport, Transport};
use soundq_bot::{CommandReport, Invocation, SoundCommand};
use soundq_common::config::{resolve_sounds_folder, TomlConfig};
use soundq_common::events::EventBus;
use soundq_common::human_time::format_track_time;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for soundq
#[derive(Parser, Debug)]
#[command(name = "soundq")]
#[command(about = "Console front end for the SoundQ sound command")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "SOUNDQ_CONFIG")]
    config: Option<PathBuf>,

    /// Folder containing local sounds
    #[arg(short, long)]
    sounds_folder: Option<PathBuf>,

    /// Longest accepted track in seconds (0 = no limit)
    #[arg(long)]
    max_seconds: Option<u64>,

    /// TOML catalog of remote tracks; enables remote queries
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Issue commands as a DJ
    #[arg(long)]
    dj: bool,

    /// Display name of the console user
    #[arg(long, default_value = "console")]
    user: String,

    /// Guild the console session belongs to
    #[arg(long, default_value = "1")]
    guild_id: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "soundq_bot={0},soundq_common={0}",
                    config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting SoundQ (git {}, {} build)",
        env!("SOUNDQ_GIT_HASH"),
        env!("SOUNDQ_BUILD_PROFILE")
    );

    let sounds_folder = resolve_sounds_folder(args.sounds_folder.as_deref(), &config);
    info!("Sounds folder: {}", sounds_folder.display());

    let mut settings = BotSettings::from_toml(&config);
    if let Some(max_seconds) = args.max_seconds {
        settings = settings.with_max_seconds(max_seconds);
    }

    let mut backends: Vec<Arc<dyn ResolverBackend>> = vec![Arc::new(LocalFileBackend::new())];
    if let Some(catalog_path) = args.catalog.as_ref().or(config.catalog.as_ref()) {
        let catalog = CatalogBackend::load_file(catalog_path, settings.search_prefix.clone())
            .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
        backends.push(Arc::new(catalog));
        settings = settings.with_remote_queries(true);
    }
    info!(
        max_duration_ms = ?settings.policy.max_duration_ms(),
        remote_queries = settings.allow_remote_queries,
        "Sound command configured"
    );

    let events = Arc::new(EventBus::default());
    spawn_event_logger(&events);

    let shutdown = CancellationToken::new();
    let command = Arc::new(
        SoundCommand::new(
            settings,
            SoundLibrary::new(sounds_folder),
            Arc::new(ChainBackend::new(backends)),
            events.clone(),
        )
        .with_shutdown(shutdown.clone()),
    );

    let queue = Arc::new(SessionQueue::new(args.guild_id));
    let transport = Arc::new(ConsoleTransport::stdout());
    let requester = if args.dj {
        Requester::new(1, args.user.clone()).dj()
    } else {
        Requester::new(1, args.user.clone())
    };
    let prefix = command.settings().prefix.clone();

    let mut running: Vec<JoinHandle<CommandReport>> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        };
        let Some(line) = line else {
            info!("Input closed, shutting down");
            break;
        };

        running.retain(|handle| !handle.is_finished());

        match parse_command_line(&line, &prefix) {
            ConsoleCommand::Sound(sound_args) => {
                running.push(command.spawn(Invocation {
                    guild_id: args.guild_id,
                    requester: requester.clone(),
                    args: sound_args,
                    queue: queue.clone(),
                    transport: transport.clone(),
                }));
            }
            ConsoleCommand::Load => answer(&transport, Choice::Load),
            ConsoleCommand::Cancel => answer(&transport, Choice::Cancel),
            ConsoleCommand::Pause => {
                if !queue.set_paused(true).await {
                    warn!("Nothing is playing");
                }
            }
            ConsoleCommand::Skip => {
                queue.advance().await;
            }
            ConsoleCommand::Queue => {
                if let Err(e) = transport.send(&render_queue(&queue).await).await {
                    warn!(error = %e, "Could not print queue");
                }
            }
            ConsoleCommand::Quit => break,
            ConsoleCommand::Empty => {}
            ConsoleCommand::Unknown(text) => warn!("Unknown input: {}", text),
        }
    }

    // Open prompts settle as declined so their commands can finish
    shutdown.cancel();
    for handle in running {
        match handle.await {
            Ok(report) => debug!(?report, "Command finished"),
            Err(e) => warn!(error = %e, "Command task failed"),
        }
    }

    info!("Shutdown complete");
    Ok(())
}

fn answer(transport: &ConsoleTransport, choice: Choice) {
    if !transport.answer(choice) {
        warn!("No open prompt to answer");
    }
}

async fn render_queue(queue: &SessionQueue) -> String {
    let entries = queue.entries().await;
    if entries.is_empty() {
        return "Queue is empty.".to_string();
    }

    let paused = queue.is_paused().await;
    let mut text = format!("Queue ({} entries):", queue.len().await);
    for (i, entry) in entries.iter().enumerate() {
        let marker = match (i, paused) {
            (0, true) => " [paused]",
            (0, false) => " [playing]",
            _ => "",
        };
        text.push_str(&format!(
            "\n{}. {} (`{}`) requested by {}{}",
            i + 1,
            entry.track.title,
            format_track_time(entry.track.duration_ms),
            entry.requester.name,
            marker
        ));
    }
    text
}

/// Log every pipeline event as JSON at debug level
fn spawn_event_logger(events: &EventBus) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => debug!(event = %json, "Sound event"),
                    Err(e) => warn!(error = %e, "Could not serialize event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event logger lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
