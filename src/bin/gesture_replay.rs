use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

use gesture_cue::classify::RecordedClassifier;
use gesture_cue::config::Config;
use gesture_cue::effect::LogPresenter;
use gesture_cue::replay::{read_recording, replay};
use gesture_cue::session::GestureSession;

#[derive(Parser, Debug)]
#[command(name = "gesture_replay", about = "Replay recorded classifier output through the debouncer")]
struct Cli {
    /// JSON Lines 形式の記録
    recording: PathBuf,

    /// 設定ファイル
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// debounce.confidence_threshold を上書き
    #[arg(long)]
    threshold: Option<f32>,

    /// debounce.cooldown_ms を上書き
    #[arg(long)]
    cooldown_ms: Option<u64>,

    /// sampler.interval_ms を上書き
    #[arg(long)]
    interval_ms: Option<u64>,

    /// 対象要素なしとして再生（クラス変更は無効、音は鳴らす）
    #[arg(long)]
    no_target: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_cue=info,gesture_replay=info".into()),
        )
        .init();

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(threshold) = cli.threshold {
        config.debounce.confidence_threshold = threshold;
    }
    if let Some(cooldown_ms) = cli.cooldown_ms {
        config.debounce.cooldown_ms = cooldown_ms;
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.sampler.interval_ms = interval_ms;
    }
    config.validate().context("Invalid config")?;

    let file = File::open(&cli.recording)
        .with_context(|| format!("Failed to open {}", cli.recording.display()))?;
    let frames = read_recording(BufReader::new(file))
        .with_context(|| format!("Failed to read {}", cli.recording.display()))?;
    info!("{} frames from {}", frames.len(), cli.recording.display());

    let presenter = if cli.no_target {
        LogPresenter::without_target()
    } else {
        LogPresenter::new()
    };
    let mut session = GestureSession::from_config(&config, RecordedClassifier, presenter);
    let events = replay(&mut session, &frames);

    for event in &events {
        println!("{:>8} ms  {}", event.timestamp, event.label);
    }
    println!(
        "{} gestures, final state: {}",
        events.len(),
        session.current_label()
    );

    Ok(())
}
