use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use cityscape_common::CityConfig;
use cityscape_input::{ControlAction, PointerLook};
use cityscape_procgen::{GeometryCatalog, PlacementKind, PlacementPlanner};
use cityscape_render::{DebugTextRenderer, RecordingScene, RenderView, Renderer};
use cityscape_stream::StreamController;
use cityscape_tools::StreamInspector;
use clap::{Parser, Subcommand};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cityscape-cli", about = "Headless driver for the city section streamer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML or JSON config file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the effective configuration as YAML
    Config,
    /// Plan one section and print its placement map
    Plan {
        /// RNG seed (overrides the config)
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Stream the city headlessly for a number of frames
    Run {
        /// Number of frames to simulate
        #[arg(short, long, default_value_t = 3000)]
        frames: u64,
        /// Simulated frame rate
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
        fps: u32,
        /// RNG seed (overrides the config)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Override a tunable parameter, e.g. `--set zoom_speed=4`
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<ControlAction>,
        /// Pointer offset `x,y` in [-0.5, 0.5] steering the camera
        #[arg(long, value_parser = parse_pointer, allow_hyphen_values = true)]
        pointer: Option<Vec2>,
        /// Print an inspector summary every N frames (0 disables)
        #[arg(long, default_value_t = 600)]
        report_every: u64,
        /// Dump the final scene with the debug renderer
        #[arg(long)]
        dump: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("cityscape-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", cityscape_render::crate_info());
            println!("procgen: {}", cityscape_procgen::crate_info());
            println!("stream: {}", cityscape_stream::crate_info());
            println!("tools: {}", cityscape_tools::crate_info());
        }
        Commands::Config => {
            let config = load_config(cli.config.as_deref(), None)?;
            print!("{}", config.to_yaml()?);
        }
        Commands::Plan { seed } => {
            let config = load_config(cli.config.as_deref(), seed)?;
            let mut rng = StdRng::seed_from_u64(config.seed);
            let catalog = GeometryCatalog::build(&config, &mut rng);
            let plan = PlacementPlanner::new(&config, &catalog).plan(&mut rng);

            println!(
                "Plan: seed={} grid={}x{} lattice={} corner={} skipped={}",
                config.seed,
                config.grid_divisions,
                config.grid_divisions,
                plan.count(PlacementKind::Lattice),
                plan.count(PlacementKind::Corner),
                plan.corner_skips
            );
            println!("{}", StreamInspector::placement_map(&plan));
        }
        Commands::Run {
            frames,
            fps,
            seed,
            overrides,
            pointer,
            report_every,
            dump,
        } => {
            let mut config = load_config(cli.config.as_deref(), seed)?;
            for action in &overrides {
                action.apply(&mut config);
            }
            config.validate().context("invalid configuration after overrides")?;
            tracing::info!(
                seed = config.seed,
                frames,
                fps,
                zoom_speed = config.zoom_speed,
                overrides = overrides.len(),
                "streaming"
            );

            let mut controller = StreamController::new(config);
            let mut scene = RecordingScene::new();
            let mut state = controller.start(&mut scene);
            if let Some(offset) = pointer {
                PointerLook { offset }.apply(&mut state.camera, &controller.config().camera);
                tracing::debug!(x = offset.x, y = offset.y, "pointer look applied");
            }

            let frame = Duration::from_secs_f64(1.0 / f64::from(fps));
            let mut generated = 0;
            let mut evicted = 0;
            for i in 1..=frames {
                let report = controller.step(&mut state, frame.mul_f64(i as f64), &mut scene);
                generated += usize::from(report.generated.is_some());
                evicted += report.evicted.len();
                if report_every > 0 && i % report_every == 0 {
                    println!("{}", StreamInspector::summary(&controller, &state));
                }
            }

            println!("Run complete: frames={frames} generated={generated} evicted={evicted}");
            println!("{}", StreamInspector::summary(&controller, &state));
            for info in StreamInspector::sections(&state) {
                println!("  {info}");
            }
            if dump {
                let view = RenderView::from(&state.camera);
                print!("{}", DebugTextRenderer::new().render(&scene, &view));
            }

            let removed = controller.teardown(&mut state, &mut scene);
            tracing::info!(
                removed,
                pooled = controller.pool_stats().pooled,
                attached = scene.node_count(),
                "scene torn down"
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> anyhow::Result<CityConfig> {
    let mut config = match path {
        Some(path) => CityConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CityConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

fn parse_pointer(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid pointer component {v:?}: {e}"))
    };
    Ok(Vec2::new(parse(x)?, parse(y)?))
}
