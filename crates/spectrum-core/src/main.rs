//! Spectrum CLI
//!
//! Loads a world file, runs ticks, and writes history, stats and a final
//! snapshot.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use spectrum_core::config::{default_config_toml, SpectrumConfig};
use spectrum_core::events::EventLogger;
use spectrum_core::output::{build_snapshot, write_snapshot, write_stats, StatsCollector};
use spectrum_core::persistence::{HistoryRecorder, MemoryHistory, MemoryPersistence};
use spectrum_core::setup::WorldFile;
use spectrum_core::Spectrum;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "spectrum")]
#[command(about = "Runs the spectrum movement and zone simulation")]
struct Args {
    /// World file (identities, headings, zones, items)
    #[arg(long)]
    world: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 10)]
    ticks: u64,

    /// Wall-clock milliseconds between ticks, overriding `tick.interval_ms`; 0 runs back to back
    #[arg(long)]
    interval_ms: Option<u64>,

    /// JSONL history log, appended to
    #[arg(long)]
    events: Option<PathBuf>,

    /// Where to write the final snapshot
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Where to write run statistics
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", default_config_toml());
        return Ok(());
    }

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => SpectrumConfig::from_file(path)?,
        None => SpectrumConfig::default(),
    };
    let world = match &args.world {
        Some(path) => WorldFile::load(path)?,
        None => WorldFile::default(),
    };
    let history: Arc<dyn HistoryRecorder> = match &args.events {
        Some(path) => Arc::new(EventLogger::append(path)?),
        None => Arc::new(MemoryHistory::new()),
    };

    let interval_ms = args.interval_ms.unwrap_or(config.tick.interval_ms);
    let spectrum = Spectrum::new(
        config,
        Arc::new(MemoryPersistence::new()),
        Arc::new(world.directory()),
        history,
    )?;
    world.populate(&spectrum)?;

    tracing::info!("Running {} ticks", args.ticks);
    let mut collector = StatsCollector::new();

    if interval_ms == 0 {
        for _ in 0..args.ticks {
            collector.record_tick(&spectrum.run_tick()?);
        }
    } else {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        while collector.ticks() < args.ticks {
            tokio::select! {
                _ = interval.tick() => {
                    collector.record_tick(&spectrum.run_tick()?);
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted after {} ticks", collector.ticks());
                    break;
                }
            }
        }
    }

    let snapshot = build_snapshot(&spectrum)?;
    if let Some(path) = &args.snapshot {
        write_snapshot(&snapshot, path)?;
        tracing::info!("Wrote snapshot to {:?}", path);
    }
    let stats = collector.generate_stats(Some(&snapshot));
    if let Some(path) = &args.stats {
        write_stats(&stats, path)?;
        tracing::info!("Wrote stats to {:?}", path);
    }

    tracing::info!(
        "Simulation complete. Ran {} ticks, {} moves, {} items claimed.",
        stats.total_ticks,
        stats.total_moved,
        stats.items_awarded
    );
    Ok(())
}
