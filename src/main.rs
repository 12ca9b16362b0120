use anyhow::{Context, Result};
use clap::Parser;
use soundwatch::{
    Config, FileSource, HapticActuator, MemoryTranscript, RemoteClassifier, SessionConfig,
    SessionController, TranscriptSink,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "soundwatch", about = "Ambient sound awareness pipeline")]
struct Args {
    /// Config file path (extension resolved by the loader)
    #[arg(long, default_value = "config/soundwatch")]
    config: String,

    /// WAV file to run a session against
    #[arg(long)]
    input: Option<String>,

    /// Submit captured clips to the remote classifier
    #[arg(long)]
    classify: bool,
}

/// Actuator that logs pulses instead of vibrating hardware.
struct LogActuator;

impl HapticActuator for LogActuator {
    fn pulse(&self, duration: Duration) {
        info!("Haptic pulse: {}ms", duration.as_millis());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let cfg = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            info!("No config file loaded ({}); using defaults", e);
            Config::default()
        }
    };

    info!("{} v0.1.0", cfg.service.name);

    let Some(input) = args.input else {
        info!("No --input WAV given; nothing to monitor");
        return Ok(());
    };

    let source = FileSource::open(&input).context("Failed to open input file")?;
    let run_secs = source.duration_seconds.ceil() as u64 + 1;

    let session_config = SessionConfig {
        enable_remote_classification: args.classify,
        ..SessionConfig::default()
    };

    let transcript = Arc::new(MemoryTranscript::new());

    let mut controller = SessionController::new(session_config, Box::new(source))
        .with_transcript(Arc::clone(&transcript) as Arc<dyn TranscriptSink>)
        .with_actuator(Arc::new(LogActuator));

    if args.classify {
        controller =
            controller.with_classifier(Arc::new(RemoteClassifier::from_config(&cfg.classifier)));
    }

    controller.start().await?;
    info!("Monitoring {} for {}s", input, run_secs);
    tokio::time::sleep(Duration::from_secs(run_secs)).await;
    controller.stop().await?;

    let entries = transcript.entries();
    info!("Session ended: {} transcript entries", entries.len());
    for entry in entries {
        info!("{:?}: {}", entry.kind, entry.text);
    }

    Ok(())
}
