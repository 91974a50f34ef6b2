//! xfade - crossfade a playlist of WAV files
//!
//! Plays each input through the crossfade stage the way a player would on
//! automatic track changes (or manual ones, with `--manual-change-after`)
//! and writes the resulting stream to a single WAV file.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use xfade_common::config::{self, LoggingConfig};
use xfade_fx::playlist::{PlaylistRunner, Sink, DEFAULT_CHUNK_MS};
use xfade_fx::wav::{self, WavSink};
use xfade_fx::{Crossfade, Effect};

/// Command-line arguments for xfade
#[derive(Parser, Debug)]
#[command(name = "xfade")]
#[command(about = "Crossfade a playlist of WAV files into one stream")]
#[command(version)]
struct Args {
    /// Input WAV files, played in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output WAV file (32-bit float)
    #[arg(short, long)]
    output: PathBuf,

    /// Configuration file
    #[arg(short, long, env = "XFADE_CONFIG")]
    config: Option<PathBuf>,

    /// Chunk size pushed through the stage per call, in milliseconds
    #[arg(long, default_value_t = DEFAULT_CHUNK_MS)]
    chunk_ms: u32,

    /// Skip to the next track after this many seconds (manual change)
    #[arg(long, value_name = "SECONDS")]
    manual_change_after: Option<f64>,

    /// Override a crossfade setting, e.g. `--set length=8`
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logging settings live in the config file, so report its source
    // once the subscriber is installed
    let (config, source) =
        config::load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging)?;
    match source.fallback_notice() {
        Some(notice) => warn!("{}", notice),
        None => debug!("Loaded config from {:?}", source),
    }

    info!(
        "xfade {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let mut settings = config.crossfade;
    for item in &args.overrides {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", item))?;
        settings
            .set(key.trim(), value)
            .with_context(|| format!("Invalid override '{}'", item))?;
    }
    info!("Crossfade settings: {:?}", settings);

    let tracks = args
        .inputs
        .iter()
        .map(|path| {
            wav::read_track(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let effect = Crossfade::new(settings);
    info!("Running {} (order {}) over {} tracks", effect.name(), effect.order(), tracks.len());

    let mut runner = PlaylistRunner::new(effect)
        .with_chunk_ms(args.chunk_ms)
        .with_manual_change_after(args.manual_change_after);
    let mut sink = WavSink::new(&args.output);

    let stats = runner.run(&tracks, &mut sink).context("Playback failed")?;
    sink.close()
        .with_context(|| format!("Failed to finalize {}", args.output.display()))?;

    info!(
        "Wrote {} frames to {} ({} manual changes, peak delay {}ms)",
        stats.frames_out,
        args.output.display(),
        stats.manual_changes,
        stats.max_delay_ms
    );
    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. With a log file configured,
/// output goes there instead of stderr.
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = file_layer
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}
