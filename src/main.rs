use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use gesture_cue::camera::OpenCvCamera;
use gesture_cue::classify::{LatestPose, PoseClassifier, ThreadedClassifier};
use gesture_cue::config::Config;
use gesture_cue::effect::LogPresenter;
use gesture_cue::render::skeleton::KEYPOINT_THRESHOLD;
use gesture_cue::render::WindowPresenter;
use gesture_cue::session::{GestureSession, SessionClock};

/// カメラ画像をウィンドウに表示する倍率
const WINDOW_SCALE: usize = 4;

#[derive(Parser, Debug)]
#[command(name = "gesture_cue", about = "Webcam pose gestures to sound and display cues")]
struct Cli {
    /// 設定ファイル
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// ウィンドウを開かずログだけ出す
    #[arg(long)]
    headless: bool,

    /// 対象要素なしとして動かす（クラス変更は無効、音は鳴らす）
    #[arg(long, requires = "headless")]
    no_target: bool,

    /// バージョンを表示して終了
    #[arg(long)]
    version: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("gesture_cue {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_cue=info".into()),
        )
        .init();

    info!("gesture_cue {} starting", env!("GIT_VERSION"));

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    config.validate().context("Invalid config")?;
    info!(
        "threshold={} cooldown={}ms interval={}ms, {} bindings",
        config.debounce.confidence_threshold,
        config.debounce.cooldown_ms,
        config.sampler.interval_ms,
        config.bindings.len()
    );

    let mut camera = OpenCvCamera::from_config(&config.camera)?;
    let classifier = PoseClassifier::from_config(&config.model)?;
    let latest_pose = classifier.latest_pose();
    let classifier =
        ThreadedClassifier::spawn(classifier, Duration::from_millis(config.sampler.timeout_ms));

    if cli.headless {
        let presenter = if cli.no_target {
            LogPresenter::without_target()
        } else {
            LogPresenter::new()
        };
        let session = GestureSession::from_config(&config, classifier, presenter);
        return run_headless(&mut camera, session);
    }

    let (width, height) = camera.resolution();
    let presenter = WindowPresenter::new(
        "Gesture Cue",
        width as usize * WINDOW_SCALE,
        height as usize * WINDOW_SCALE,
    )?;
    let session = GestureSession::from_config(&config, classifier, presenter);
    run_window(&mut camera, session, latest_pose, config.debug.draw_pose)
}

fn run_headless(
    camera: &mut OpenCvCamera,
    mut session: GestureSession<ThreadedClassifier<opencv::core::Mat>, LogPresenter>,
) -> Result<()> {
    info!("Running headless, Ctrl+C to stop");
    let clock = SessionClock::start();
    loop {
        let frame = match camera.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("{:#}", e);
                std::thread::sleep(Duration::from_millis(10));
                continue;
            }
        };
        session.tick(clock.now_ms(), &frame);
    }
}

fn run_window(
    camera: &mut OpenCvCamera,
    mut session: GestureSession<ThreadedClassifier<opencv::core::Mat>, WindowPresenter>,
    latest_pose: LatestPose,
    draw_pose: bool,
) -> Result<()> {
    info!("Press ESC to exit");
    let clock = SessionClock::start();
    while session.presenter().is_open() {
        let frame = match camera.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("{:#}", e);
                // ウィンドウは応答させ続ける
                session.presenter_mut().update()?;
                continue;
            }
        };

        session.presenter_mut().draw_frame(&frame)?;
        session.tick(clock.now_ms(), &frame);

        if draw_pose {
            if let Some(pose) = latest_pose.get() {
                session.presenter_mut().draw_pose(&pose, KEYPOINT_THRESHOLD);
            }
        }

        session.presenter_mut().update()?;
    }

    info!("Window closed");
    Ok(())
}
