//! Ball Pit entry point
//!
//! Loads settings, builds the world and runs the frame loop into the encoder.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;

use ball_pit::platform::{EncoderSink, KeyPressStop, Scheduler};
use ball_pit::renderer::{FrameBuffer, RenderSink};
use ball_pit::sim::World;
use ball_pit::{InteractionPolicy, Settings};

#[derive(Parser, Debug)]
#[command(version, about = "Deterministic 2D ball physics rendered to video")]
struct Args {
    /// JSON settings file; missing fields take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Contact policy: bounce, suction or fuse
    #[arg(long, value_parser = parse_policy)]
    policy: Option<InteractionPolicy>,

    /// RNG seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,

    /// Run length in seconds of video
    #[arg(long)]
    seconds: Option<u32>,

    /// Output video file
    #[arg(long)]
    output: Option<String>,

    /// Rasterize frames but do not start the encoder
    #[arg(long)]
    no_record: bool,

    /// Force gravity on or off
    #[arg(long)]
    gravity: Option<bool>,
}

fn parse_policy(s: &str) -> Result<InteractionPolicy, String> {
    InteractionPolicy::from_str(s).ok_or_else(|| format!("unknown policy `{s}` (bounce, suction, fuse)"))
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    if let Some(policy) = args.policy {
        settings.apply_policy(policy);
    }
    if let Some(gravity) = args.gravity {
        settings.gravity.enabled = gravity;
    }
    if let Some(seconds) = args.seconds {
        settings.duration_secs = seconds;
    }
    if let Some(output) = &args.output {
        settings.output.output = output.clone();
    }
    if args.no_record {
        settings.output.record = false;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let settings = load_settings(&args)?;

    let seed = settings.seed.unwrap_or_else(time_seed);
    log::info!(
        "Ball Pit starting: {} bodies, {} policy, gravity {}, seed {}",
        settings.population,
        settings.policy.as_str(),
        if settings.gravity.enabled { "on" } else { "off" },
        seed
    );

    let mut sink: Box<dyn RenderSink> = if settings.output.record {
        Box::new(EncoderSink::spawn(&settings).context("failed to start the video encoder")?)
    } else {
        Box::new(FrameBuffer::new(settings.width, settings.height, settings.background))
    };

    let scheduler = Scheduler::new(&settings);
    let mut world = World::new(settings, seed).context("failed to set up the simulation")?;
    let mut stop = KeyPressStop::stdin();
    log::info!("Press Enter to stop early");

    scheduler
        .run(&mut world, &mut sink, &mut stop)
        .context("frame loop failed")?;
    Ok(())
}
