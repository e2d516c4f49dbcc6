//! CampusPulse Hero Demo
//!
//! Replays a scripted visit against a live stage:
//! - Both actors cycle poses and breathe
//! - The visitor hovers, clicks, then signs up
//! - Every render effect is logged as it happens
//!
//! Usage: `hero-demo [--post <url>] [--poses <dir>]`
//!
//! Without `--post` submissions are recorded in memory. Without `--poses`
//! a small built-in pose set is used.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pulse_core::{Actor, Rect, Viewport};
use pulse_motion::{JsonDirAssets, PoseLibrary, SharedPoses};
use pulse_stage::{CloseReason, Effect, Stage, StageConfig, StageDriver, StageInput};
use pulse_waitlist::{
    OptionalFields, RecordingBackend, WaitlistBackend, WaitlistForm, WebhookBackend,
    WebhookConfig,
};

struct Args {
    post: Option<String>,
    poses: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        post: None,
        poses: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--post" => args.post = Some(iter.next().ok_or("--post needs a URL")?),
            "--poses" => args.poses = Some(iter.next().ok_or("--poses needs a directory")?),
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(args)
}

fn builtin_poses() -> Vec<Value> {
    (0..7)
        .map(|i| {
            json!({
                "nm": format!("pose{}", i + 1),
                "layers": [{
                    "ks": { "p": { "a": 1, "k": [
                        { "t": 0, "s": [640, 360 + i * 4, 0] },
                        { "t": 12, "s": [640, 372 + i * 4, 0] }
                    ] } }
                }]
            })
        })
        .collect()
}

fn pose_library(dir: Option<&str>) -> Result<PoseLibrary, Box<dyn std::error::Error>> {
    let Some(dir) = dir else {
        return Ok(PoseLibrary::new(SharedPoses::new(builtin_poses())));
    };

    let mut files: Vec<String> = std::fs::read_dir(Path::new(dir))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".json"))
        .collect();
    files.sort();
    info!(dir, poses = files.len(), "loading pose files");
    Ok(PoseLibrary::new(JsonDirAssets::new(dir, files)))
}

fn script() -> Vec<(u64, StageInput)> {
    let viewport = Viewport::new(1280.0, 720.0);
    let anchors = [
        Rect::new(260.0, 300.0, 240.0, 320.0),
        Rect::new(780.0, 300.0, 240.0, 320.0),
    ];
    let form = WaitlistForm::new("Ada Obi", "ada@ui.edu.ng", "University of Ibadan")
        .with_optional(OptionalFields {
            year: "300L".into(),
            role: "student".into(),
            ..OptionalFields::default()
        });

    vec![
        (0, StageInput::Layout { viewport, anchors }),
        (800, StageInput::PointerEnter(Actor::Left)),
        (2_600, StageInput::Activate(Actor::Left)),
        (3_200, StageInput::PointerLeave(Actor::Left)),
        (3_400, StageInput::PointerEnter(Actor::Right)),
        (3_500, StageInput::Activate(Actor::Right)),
        (4_100, StageInput::PointerLeave(Actor::Right)),
        (5_000, StageInput::OpenModal),
        (5_600, StageInput::ToggleOptional),
        (6_500, StageInput::Submit(form)),
        (11_000, StageInput::CloseModal(CloseReason::SuccessClose)),
    ]
}

fn describe(effect: &Effect) {
    match effect {
        Effect::PoseChanged { actor, index } => {
            tracing::debug!(%actor, index, "pose")
        }
        Effect::Burst(burst) => info!(
            burst = burst.id,
            source = ?burst.source,
            x = burst.origin.x,
            y = burst.origin.y,
            particles = burst.style.particles,
            "burst"
        ),
        Effect::BubbleChanged(active) => info!(?active, "bubble"),
        Effect::ModalChanged { open } => info!(open, "modal"),
        Effect::OptionalPanelChanged { shown } => info!(shown, "optional fields"),
        Effect::SubmissionChanged(state) => info!(?state, "submission"),
        Effect::CelebrationStarted => info!("celebration started"),
        Effect::CelebrationFinished { completed } => info!(completed, "celebration finished"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = parse_args()?;

    let backend: Arc<dyn WaitlistBackend> = match &args.post {
        Some(url) => {
            info!(endpoint = %url, "posting submissions");
            Arc::new(WebhookBackend::new(WebhookConfig::new(url.clone()))?)
        }
        None => Arc::new(RecordingBackend::new()),
    };

    let library = Arc::new(pose_library(args.poses.as_deref())?);
    library.warm()?;

    let mut stage = Stage::new(StageConfig::default(), library)?;
    stage.mount()?;

    let (effects_tx, mut effects_rx) = mpsc::channel(256);
    let (inputs_tx, mut inputs_rx) = mpsc::channel(32);
    let mut driver = StageDriver::new(stage, backend).with_effects(effects_tx);

    let printer = tokio::spawn(async move {
        let mut seen = 0usize;
        while let Some(effect) = effects_rx.recv().await {
            describe(&effect);
            seen += 1;
        }
        seen
    });

    let visitor = tokio::spawn(async move {
        let mut elapsed = 0;
        for (at, input) in script() {
            tokio::time::sleep(Duration::from_millis(at - elapsed)).await;
            elapsed = at;
            if inputs_tx.send(input).await.is_err() {
                break;
            }
        }
    });

    driver.run_for(Duration::from_secs(12), &mut inputs_rx).await?;
    driver.settle().await;
    visitor.abort();

    let stats = driver.stage().stats().clone();
    let released = driver.stage_mut().unmount();
    drop(driver);

    match printer.await {
        Ok(seen) => info!(
            effects = seen,
            poses = stats.pose_changes,
            bursts = stats.bursts_fired,
            refused = stats.bursts_refused,
            celebrations = stats.celebrations,
            released,
            "visit finished"
        ),
        Err(err) => warn!(%err, "effect printer failed"),
    }
    Ok(())
}
