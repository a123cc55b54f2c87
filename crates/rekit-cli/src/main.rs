//! Headless rekit driver.
//!
//! Loads a level, then runs the scene update on the main thread while a
//! second thread renders into a recording surface, the same split a windowed
//! front end uses.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use rekit_core::config::GameConfig;
use rekit_core::level::{Level, LevelScript};
use rekit_core::prototype::PrototypeRegistry;
use rekit_core::render::RecordingSurface;
use rekit_core::scene::Scene;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Runs a rekit level headless on a logic and a render thread")]
struct Cli {
    /// Level description (JSON).
    #[arg(value_name = "LEVEL")]
    level: PathBuf,

    /// Game configuration (JSON). Defaults are used when absent.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for randomized spawn options.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of logic frames to run.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Target logic frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Record per-entity update timings and log them once per second.
    #[arg(long)]
    profile: bool,

    /// Restart the level instead of exiting when an entity update fails.
    #[arg(long)]
    restart_on_error: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn load_config(path: Option<&PathBuf>, profile: bool) -> Result<GameConfig> {
    let mut config = match path {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if profile {
        config.scene.profile_updates = true;
    }
    Ok(config)
}

/// Renders until `stop` is raised, returning the number of frames drawn.
fn spawn_renderer(scene: Arc<Scene>, stop: Arc<AtomicBool>, fps: u32) -> Result<thread::JoinHandle<u64>> {
    let period = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    thread::Builder::new()
        .name("render".into())
        .spawn(move || {
            let mut surface = RecordingSurface::new();
            let mut frames = 0u64;
            while !stop.load(Ordering::Acquire) {
                surface.clear();
                scene.render(&mut surface);
                frames += 1;
                if frames % u64::from(fps.max(1)) == 0 {
                    debug!(frames, draw_calls = surface.len(), "rendered");
                }
                thread::sleep(period);
            }
            frames
        })
        .context("spawning render thread")
}

fn log_timings(scene: &Scene) {
    for (kind, spent) in scene.take_update_timings() {
        info!(kind, ?spent, "update time");
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Arc::new(load_config(cli.config.as_ref(), cli.profile)?);
    let level = Level::from_path(&cli.level)
        .with_context(|| format!("loading level {}", cli.level.display()))?;
    info!(level = %level.name, spawns = level.spawns.len(), seed = cli.seed, "starting");

    let focus = level.focus;
    let registry = PrototypeRegistry::with_defaults(Arc::clone(&config), cli.seed);
    let scene = Arc::new(Scene::new(
        config.scene.clone(),
        Box::new(LevelScript::new(level, registry)),
    ));
    scene.set_focus(focus);

    let stop = Arc::new(AtomicBool::new(false));
    let renderer = spawn_renderer(Arc::clone(&scene), Arc::clone(&stop), cli.fps)?;

    let period = Duration::from_secs_f64(1.0 / f64::from(cli.fps.max(1)));
    let mut last = Instant::now();
    let mut outcome: Result<()> = Ok(());
    for frame in 0..cli.frames {
        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f32();
        last = now;

        if let Err(err) = scene.update(delta) {
            if cli.restart_on_error {
                error!(frame, %err, "update failed, restarting level");
                scene.restart();
            } else {
                outcome = Err(err).with_context(|| format!("frame {frame}"));
                break;
            }
        }

        if cli.profile && frame % u64::from(cli.fps.max(1)) == 0 {
            log_timings(&scene);
        }

        if let Some(rest) = period.checked_sub(now.elapsed()) {
            thread::sleep(rest);
        }
    }

    stop.store(true, Ordering::Release);
    let rendered = renderer
        .join()
        .map_err(|_| anyhow::anyhow!("render thread panicked"))?;
    info!(
        entities = scene.entity_count(),
        overlays = scene.overlay_count(),
        rendered,
        "finished"
    );
    outcome
}
