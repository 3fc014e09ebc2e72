//! Streakfield entry point
//!
//! Default action writes the OGP preview (SVG + PNG). `simulate` runs the
//! animated scene headless and prints lifecycle counters.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use streakfield::Settings;
use streakfield::ogp::{self, ChromiumRasterizer, Rasterizer, SeedSource};
use streakfield::renderer::FrameBuffers;
use streakfield::sim::{Scene, TickInput, tick};

/// Seeded starfield / light streak generator
#[derive(Parser)]
#[command(name = "streakfield")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings JSON (defaults are used for missing fields)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(flatten)]
    ogp: OgpArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct OgpArgs {
    /// Seed token (overrides the git commit lookup)
    #[arg(long)]
    commit: Option<String>,

    /// Directory for the generated files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Only write the SVG
    #[arg(long)]
    no_raster: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the animated scene without a window
    Simulate {
        /// Number of ticks
        #[arg(short, long, default_value = "3600")]
        ticks: u32,

        /// Seconds per tick
        #[arg(short, long, default_value = "0.016666668")]
        delta: f32,

        /// Seed token for the star cloud
        #[arg(long)]
        commit: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let settings = match &cli.settings {
        Some(path) => Settings::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Settings::default(),
    };

    match cli.command {
        Some(Commands::Simulate {
            ticks,
            delta,
            commit,
        }) => simulate(&settings, ticks, delta, commit.as_deref()),
        None => export_ogp(&settings, &cli.ogp),
    }
}

fn export_ogp(settings: &Settings, args: &OgpArgs) -> Result<bool> {
    log::info!("Generating OGP image...");

    let seed = ogp::resolve_seed(args.commit.as_deref());
    if seed.source == SeedSource::Fallback {
        log::info!("No commit available, seeding with `{}`", seed.token);
    }

    let chromium = ChromiumRasterizer::from_settings(&settings.ogp);
    let rasterizer: Option<&dyn Rasterizer> = if args.no_raster { None } else { Some(&chromium) };

    let report = ogp::export(&settings.ogp, &seed.token, &args.out_dir, rasterizer)
        .context("generating OGP image")?;

    println!("SVG: {}", report.svg_path.display());
    if report.png_written {
        println!("PNG: {}", report.png_path.display());
    }
    println!("Stars: {}", report.star_count);
    println!("Size: {}x{}px", report.width, report.height);
    println!("Commit: {}", report.token);

    // Skipping rasterization on request is not a failure
    Ok(report.png_written || args.no_raster)
}

fn simulate(settings: &Settings, ticks: u32, delta: f32, commit: Option<&str>) -> Result<bool> {
    let seed = ogp::resolve_seed(commit);
    let mut scene = Scene::new(settings, &seed.token).context("building scene")?;
    let input = TickInput::default();

    let mut max_streak_vertices = 0;
    for _ in 0..ticks {
        tick(&mut scene, &input, delta);
        scene.drain_events();
        let frame = FrameBuffers::build(&scene, 16.0 / 9.0);
        let vertices: usize = frame.streaks.iter().map(|m| m.vertices.len()).sum();
        max_streak_vertices = max_streak_vertices.max(vertices);
    }

    let stats = scene.stats;
    let live = scene.pool.live();
    scene.teardown();

    println!("Ticks: {} ({:.1}s simulated)", ticks, scene.time);
    println!("Stars: {}", scene.star_cloud.len());
    println!(
        "Streaks: spawned {}, skipped {}, retired {}, live at end {}",
        stats.spawned, stats.skipped, stats.retired, live
    );
    println!("Peak live: {} / {}", stats.peak_live, scene.pool.capacity());
    println!("Peak streak vertices: {}", max_streak_vertices);
    println!(
        "Rotation: ({:.3}, {:.3}, {:.3})",
        scene.rotation.x, scene.rotation.y, scene.rotation.z
    );
    Ok(scene.pool.acquired() == scene.pool.released())
}
