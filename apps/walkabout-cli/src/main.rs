use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use walkabout_common::Rgba;
use walkabout_input::InputState;
use walkabout_render::{SoftwareCanvas, image_file};
use walkabout_scheduler::{DemoConfig, Game, ManualClock, Scheduler, SystemClock};
use walkabout_tools::GameInspector;

#[derive(Parser)]
#[command(name = "walkabout-cli", about = "Headless walkabout runner")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Demo config file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the game loop without a window
    Run {
        /// Number of ticks to run
        #[arg(short, long, default_value = "120")]
        ticks: u64,
        /// Held keys per segment, e.g. "d:30,d+ShiftLeft:30,:10". Keys are joined
        /// with '+', an empty key list means nothing held.
        #[arg(short, long, default_value = "")]
        script: String,
        /// Pace ticks in real time instead of as fast as possible
        #[arg(long)]
        realtime: bool,
        /// Write the last frame as an image; the extension picks the format (.png, .ppm)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print every item's screen placement after the run
        #[arg(long)]
        items: bool,
    },
    /// Print the effective config as YAML
    Config,
}

/// One stretch of scripted input.
#[derive(Debug, Clone, PartialEq)]
struct Segment {
    keys: Vec<String>,
    ticks: u64,
}

/// Parse `keys:ticks` segments separated by commas.
fn parse_script(script: &str) -> anyhow::Result<Vec<Segment>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let (keys, ticks) = segment
                .rsplit_once(':')
                .with_context(|| format!("segment {segment:?} is missing ':<ticks>'"))?;
            let ticks = ticks
                .trim()
                .parse()
                .with_context(|| format!("segment {segment:?} has a bad tick count"))?;
            let keys = keys
                .split('+')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_owned)
                .collect();
            Ok(Segment { keys, ticks })
        })
        .collect()
}

/// Keys to hold at `tick`; the last segment keeps applying once the script runs out.
fn keys_at(segments: &[Segment], tick: u64) -> &[String] {
    let mut start = 0;
    for segment in segments {
        if tick < start + segment.ticks {
            return &segment.keys;
        }
        start += segment.ticks;
    }
    segments.last().map_or(&[][..], |s| s.keys.as_slice())
}

/// `RUST_LOG` when set, otherwise `debug` or `info` depending on `--verbose`.
fn log_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DemoConfig> {
    match path {
        Some(path) => DemoConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(DemoConfig::default()),
    }
}

fn run(
    config: &DemoConfig,
    ticks: u64,
    script: &str,
    realtime: bool,
    out: Option<&PathBuf>,
    show_items: bool,
) -> anyhow::Result<()> {
    let segments = parse_script(script)?;
    let mut game = Game::from_config(config)?;
    let mut canvas = SoftwareCanvas::new(config.viewport.width, config.viewport.height);
    game.prepare_surface(&mut canvas);

    let rate = config.fixed_rate()?;
    let mut input = InputState::new();
    let mut tick = 0u64;
    let mut step = |now: Duration| {
        input.clear();
        for key in keys_at(&segments, tick) {
            input.press(key.as_str());
        }
        let report = game.run_tick(now, &input, &mut canvas);
        tracing::debug!(
            tick = report.tick,
            animation = report.animation,
            frame = report.frame_index,
            "tick"
        );
        tick += 1;
        ControlFlow::Continue(())
    };
    let ran = if realtime {
        Scheduler::new(SystemClock::new(), rate).run(Some(ticks), &mut step)
    } else {
        Scheduler::new(ManualClock::new(), rate).run(Some(ticks), &mut step)
    };

    println!("Ran {ran} ticks");
    println!("{}", GameInspector::summary(&game));
    if show_items {
        for info in GameInspector::items(
            game.world(),
            (game.viewport().width, game.viewport().height),
            game.camera_offset(),
        ) {
            println!("  {info}");
        }
    }

    if let Some(path) = out {
        image_file::save_image(canvas.image(), Rgba::WHITE, path)
            .with_context(|| format!("writing frame to {}", path.display()))?;
        println!("Frame written to {}", path.display());
    }

    let failures = game.stats().draw_failures;
    if failures > 0 {
        tracing::warn!(failures, "player sprite was not drawn on some ticks");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("walkabout-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "tick rate: {} Hz, viewport: {}x{}",
                config.tick_rate_hz, config.viewport.width, config.viewport.height
            );
            println!(
                "movement: speed={} sprint x{}",
                config.movement.speed, config.movement.sprint_multiplier
            );
            println!(
                "sprite: {} animations, sheet={}",
                config.sprite.animations.len(),
                config
                    .sprite
                    .sheet
                    .as_ref()
                    .map_or("<placeholder>".to_string(), |p| p.display().to_string())
            );
            println!("items: {}", config.items.len());
        }
        Commands::Run {
            ticks,
            script,
            realtime,
            out,
            items,
        } => run(&config, ticks, &script, realtime, out.as_ref(), items)?,
        Commands::Config => print!("{}", config.to_yaml()?),
    }

    Ok(())
}
