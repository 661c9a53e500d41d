mod config;
mod core;
mod error;
mod genome;
mod phenotype;
mod render;
mod types;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::SceneConfig,
    core::Bacterium,
    genome::{Appearance, Genotype},
    phenotype::Phenotype,
    types::{Facing, Vec2},
    ui::Direction,
};

const DEFAULT_LOG_FILE: &str = "bacteria.log";

#[derive(Parser)]
#[command(name = "bacteria")]
#[command(version)]
#[command(about = "Swim a single bacterium whose body and stats grow from its genes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal session (default)
    Play {
        #[command(flatten)]
        scene: SceneArgs,

        /// Log destination; the terminal itself is taken by the UI
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Print the synthesized phenotype and appearance as YAML
    Inspect {
        #[command(flatten)]
        scene: SceneArgs,
    },

    /// Run headless ticks with a constant input set
    Simulate {
        #[command(flatten)]
        scene: SceneArgs,

        /// Number of ticks to run
        #[arg(short, long, default_value = "600")]
        ticks: u64,

        /// Directions held for every tick, e.g. `right,up`
        #[arg(short, long, value_enum, value_delimiter = ',')]
        input: Vec<Direction>,
    },
}

#[derive(Args, Default)]
struct SceneArgs {
    /// Scene file (YAML) with `arena` and `genes` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the `size` gene
    #[arg(long)]
    size: Option<f64>,

    /// Override the `eccentricity` gene
    #[arg(long)]
    eccentricity: Option<f64>,

    /// Start from a randomly sampled genotype
    #[arg(long)]
    random: bool,

    /// Seed for `--random`
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct InspectReport {
    phenotype: Phenotype,
    appearance: Appearance,
}

#[derive(Serialize)]
struct SimulationReport {
    ticks: u64,
    position: Vec2,
    velocity: Vec2,
    facing: Facing,
    speed_cap: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Play {
        scene: SceneArgs::default(),
        log_file: None,
    });

    match command {
        Commands::Play { scene, log_file } => {
            let log_file = log_file.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
            init_tracing(Some(&log_file))?;
            let bacterium = spawn(&scene)?;
            info!("starting interactive session");
            ui::run(bacterium)?;
        }
        Commands::Inspect { scene } => {
            init_tracing(None)?;
            let bacterium = spawn(&scene)?;
            let report = InspectReport {
                phenotype: bacterium.phenotype,
                appearance: bacterium.appearance,
            };
            print!("{}", serde_yaml::to_string(&report)?);
        }
        Commands::Simulate {
            scene,
            ticks,
            input,
        } => {
            init_tracing(None)?;
            let mut bacterium = spawn(&scene)?;
            let position = bacterium.run(ui::flags_from(&input), ticks);
            let report = SimulationReport {
                ticks: bacterium.ticks(),
                position,
                velocity: bacterium.kinematics.vel,
                facing: bacterium.kinematics.facing,
                speed_cap: bacterium.kinematics.max_speed(),
            };
            print!("{}", serde_yaml::to_string(&report)?);
        }
    }

    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|err| anyhow!(err))
}

/// Layers genes as random sample, then scene file, then command line flags.
fn load_scene(args: &SceneArgs) -> Result<SceneConfig> {
    let mut scene = match &args.config {
        Some(path) => SceneConfig::from_file(path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => SceneConfig::default(),
    };

    let base = if args.random {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Genotype::random(&mut rng)
    } else {
        Genotype::default()
    };
    let flags = Genotype {
        size: args.size,
        eccentricity: args.eccentricity,
        ..Genotype::default()
    };
    scene.genes = base.overlay(scene.genes).overlay(flags);
    Ok(scene)
}

fn spawn(args: &SceneArgs) -> Result<Bacterium> {
    let scene = load_scene(args)?;
    Bacterium::new(&scene.genes, scene.arena).map_err(|err| {
        warn!(%err, "genotype rejected");
        err.into()
    })
}
