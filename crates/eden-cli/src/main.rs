use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eden_core::boundary::classify;
use eden_core::config::EdenConfig;
use eden_core::ensemble::{estimate_mean_radii, growth_curve};
use eden_core::metrics::LatticeSnapshot;
use eden_core::radius::estimate_radii;
use eden_core::rng::create_rng;
use eden_core::simulation::Simulation;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eden")]
#[command(about = "Eden growth model simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow one cluster and write its frontier, interior and radii
    Run {
        /// Path to config file (JSON). Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file for the snapshot (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Average inscribed/circumscribed radii over `trials` independent runs
    Ensemble {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Ensemble estimates for every epoch count up to `epochs`
    Curve {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn load_config(path: Option<&Path>) -> Result<EdenConfig> {
    let config = match path {
        Some(path) => {
            let file = File::open(path).context("failed to open config file")?;
            let reader = BufReader::new(file);
            let config: EdenConfig =
                serde_json::from_reader(reader).context("failed to parse config")?;
            tracing::info!(path = %path.display(), "loaded config");
            config
        }
        None => EdenConfig::default(),
    };
    config.validate().context("Config validation error")?;
    Ok(config)
}

fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).context("failed to create output directory")?;
            }
            let file = File::create(path).context("failed to create output file")?;
            serde_json::to_writer_pretty(file, value).context("failed to write output")?;
            tracing::info!(path = %path.display(), "results saved");
        }
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn run_snapshot(config: &EdenConfig) -> Result<LatticeSnapshot> {
    let simulation = Simulation::new(config.growth(), create_rng(config.seed))
        .context("invalid growth parameters")?;
    let lattice = simulation.run();
    let boundary = classify(&lattice);
    let radii = estimate_radii(&lattice, config.epochs, config.precision)
        .context("radius estimation failed")?;
    tracing::info!(
        frontier = boundary.frontier.len(),
        interior = boundary.interior.len(),
        inscribed = radii.inscribed,
        circumscribed = radii.circumscribed,
        "cluster classified"
    );
    Ok(LatticeSnapshot::new(
        config,
        lattice.half_extent(),
        boundary,
        radii,
    ))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("eden_cli=info,eden_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = EdenConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Run { config, out } => {
            let config = load_config(config.as_deref())?;
            tracing::info!(
                epochs = config.epochs,
                probability = config.probability,
                seed = config.seed,
                "growing cluster"
            );
            let snapshot = run_snapshot(&config)?;
            write_json(&snapshot, out.as_deref())?;
        }
        Commands::Ensemble { config, out } => {
            let config = load_config(config.as_deref())?;
            let summary = estimate_mean_radii(&config).context("ensemble estimate failed")?;
            write_json(&summary, out.as_deref())?;
        }
        Commands::Curve { config, out } => {
            let config = load_config(config.as_deref())?;
            let curve = growth_curve(&config).context("growth curve failed")?;
            write_json(&curve, out.as_deref())?;
        }
    }
    Ok(())
}
