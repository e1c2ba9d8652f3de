mod error;
mod playback;

use crate::error::{CliError, Result};
use crate::playback::SimulatedPlayback;
use clap::{Parser, Subcommand};
use lyricsync_core::{
    concat_lines, spawn_ticker, CoreError, LyricsDocument, LyricsSession, LyricsSyncConfig,
    ScrollMode, SessionEvent,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "lyricsync", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/lyricsync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a lyrics file and print the resulting document.
    Parse(ParseArgs),
    /// Simulate playback of a lyrics file and log what the engine does.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct ParseArgs {
    /// LRC or plain-text lyrics file.
    file: PathBuf,

    /// Print the document as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Print only the text of these line indices, as exported for sharing.
    #[arg(long, value_delimiter = ',')]
    select: Vec<usize>,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// LRC or plain-text lyrics file.
    file: PathBuf,

    /// Per-track lyrics offset in milliseconds (positive shows lines earlier).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset_ms: i64,

    /// Start playback at this position in milliseconds.
    #[arg(long, default_value_t = 0)]
    start_ms: u64,

    /// Tap this line once playback starts, seeking to it.
    #[arg(long)]
    tap: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(LyricsSyncConfig::config_path);
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| check_file_logging_enabled(&config_path).then(lyricsync_core::log_path));
    init_tracing(log_file.as_deref());

    let config = match LyricsSyncConfig::load_or_create_at(&config_path) {
        Ok(config) => config,
        Err(CoreError::ConfigParseError(e)) => {
            error!("Config at {} has syntax errors: {e}", config_path.display());
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.cmd, &config) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cmd: Command, config: &LyricsSyncConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    match cmd {
        Command::Parse(args) => runtime.block_on(cmd_parse(args, config)),
        Command::Play(args) => runtime.block_on(cmd_play(args, config)),
    }
}

fn read_lyrics(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::ReadLyrics {
        path: path.to_path_buf(),
        source,
    })
}

async fn cmd_parse(args: ParseArgs, config: &LyricsSyncConfig) -> Result<()> {
    let raw = read_lyrics(&args.file)?;

    // Romanization runs in the background; a stopped player is enough
    let playback = Arc::new(SimulatedPlayback::new(Duration::ZERO, Duration::ZERO));
    let session = LyricsSession::new(config, playback);
    session.load_lyrics(&raw).await;
    session.romanization_idle().await;
    let document = session.document().await;

    if !args.select.is_empty() {
        if let Some(&index) = args.select.iter().find(|i| **i >= document.lines.len()) {
            return Err(CliError::LineOutOfRange {
                index,
                len: document.lines.len(),
            });
        }
        println!("{}", concat_lines(&document, args.select));
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&document.snapshot())?);
    } else {
        print_document(&document);
    }
    Ok(())
}

fn print_document(document: &LyricsDocument) {
    let meta = &document.metadata;
    if let (Some(artist), Some(title)) = (&meta.artist, &meta.title) {
        println!("{artist} - {title}");
    }
    println!("mode: {:?}, {} lines", document.mode, document.lines.len());

    for (index, line) in document.lines.iter().enumerate() {
        if line.is_sentinel() {
            println!("{index:>4}  [ -- ]");
            continue;
        }
        if document.mode.is_synced() {
            println!("{index:>4}  [{}] {}", format_ms(line.start_time_ms), line.text);
        } else {
            println!("{index:>4}  {}", line.text);
        }
        if let Some(romanized) = line.romanized_text() {
            println!("            {romanized}");
        }
    }
}

fn format_ms(ms: i64) -> String {
    let ms = ms.max(0);
    format!("{:02}:{:02}.{:02}", ms / 60_000, (ms / 1000) % 60, (ms % 1000) / 10)
}

async fn cmd_play(args: PlayArgs, config: &LyricsSyncConfig) -> Result<()> {
    let raw = read_lyrics(&args.file)?;
    let document = lyricsync_core::parse(&raw);
    let length = SimulatedPlayback::track_length(&document);

    let playback = Arc::new(SimulatedPlayback::new(
        Duration::from_millis(args.start_ms),
        length,
    ));
    let session = LyricsSession::new(config, playback.clone());
    session.set_lyrics_offset(args.offset_ms).await;

    // Subscribe before loading so the first events are not missed
    let events = tokio::spawn(log_session_events(Arc::clone(&session), session.subscribe()));
    session.set_document(document).await;

    // Create shared cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    let ticker = spawn_ticker(
        Arc::clone(&session),
        config.scroll.tick_interval(),
        cancel_token.clone(),
    );

    if let Some(index) = args.tap {
        tokio::time::sleep(config.scroll.tick_interval() * 2).await;
        if let Err(e) = session.tap_line(index).await {
            warn!("Tap on line {index} failed: {e}");
        }
    }

    info!("Playing {} ({}s)", args.file.display(), length.as_secs());
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            () = tokio::time::sleep(Duration::from_millis(250)) => {
                if playback.is_finished().await {
                    info!("Reached end of track");
                    cancel_token.cancel();
                    break;
                }
            }
        }
    }

    if let Err(e) = ticker.await {
        warn!("Ticker task failed: {e}");
    }
    drop(session);
    events.abort();
    Ok(())
}

/// Log session events as they happen
async fn log_session_events(
    session: Arc<LyricsSession>,
    mut rx: broadcast::Receiver<SessionEvent>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => match event {
                SessionEvent::DocumentLoaded {
                    mode, line_count, ..
                } => {
                    info!("Lyrics loaded: {:?}, {} lines", mode, line_count);
                }
                SessionEvent::LineChanged { index, .. } => {
                    let document = session.document().await;
                    match index.and_then(|i| document.line(i)) {
                        Some(line) if line.is_sentinel() => info!("[ -- ]"),
                        Some(line) => match line.romanized_text() {
                            Some(romanized) => info!("> {} ({})", line.text, romanized),
                            None => info!("> {}", line.text),
                        },
                        None => debug!("No current line"),
                    }
                }
                SessionEvent::Scroll(intent) => {
                    let label = match intent.mode {
                        ScrollMode::Initial => "initial",
                        ScrollMode::AutoFollow => "follow",
                        ScrollMode::FastSeek => "fast-seek",
                    };
                    debug!(
                        "Scroll {} to line {} over {}ms",
                        label,
                        intent.target_index,
                        intent.duration.as_millis()
                    );
                }
                SessionEvent::RomanizationReady { index, .. } => {
                    debug!("Romanized line {}", index);
                }
                SessionEvent::SeekRequested { position_ms } => {
                    info!("Seek to {}", format_ms(position_ms));
                }
                SessionEvent::SelectionChanged(change) => {
                    info!("Selection: {:?}", change);
                }
            },
            Err(broadcast::error::RecvError::Closed) => {
                break;
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Event logger lagged, skipped {} events", n);
            }
        }
    }
}

/// Read just `logging.enabled` so tracing can start before the full config
/// is loaded and validated.
fn check_file_logging_enabled(config_path: &Path) -> bool {
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

    let Ok(content) = std::fs::read_to_string(config_path) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing with console output and optional file logging
fn init_tracing(log_file: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer();

    if let Some(log_path) = log_file {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(log_path) {
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
