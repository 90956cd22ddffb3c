//! Cache model CLI.
//!
//! This binary drives a cache with an access stream and prints its statistics. It supports:
//! 1. **Random traffic:** A seeded stream of reads and writes over a hot working set.
//! 2. **Trace replay:** A recorded JSON trace of `{ address, op, value }` entries.
//!
//! Either mode can run against a zero-filling next level (the default) or a functional
//! block memory (`--memory`), and accepts a JSON cache configuration (`--config`).

use clap::{Args, Parser, Subcommand};
use std::{fs, process};
use tracing_subscriber::EnvFilter;

use cachesim_core::cache::CacheStore;
use cachesim_core::config::CacheConfig;
use cachesim_core::memory::{BackingStore, BlockMemory};
use cachesim_core::sim::{self, Simulator, TraceEntry, TrafficConfig, TrafficGenerator};

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Set-associative write-back cache model",
    long_about = "Drive a set-associative cache with random traffic or a recorded trace.\n\nExamples:\n  cachesim random --accesses 100000 --seed 7\n  cachesim trace traces/loop.json --memory\n  cachesim --config small.json random"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON cache configuration (defaults to 128 sets x 4 ways x 64-byte blocks).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Back the cache with a functional block memory instead of zero-filled fetches.
    #[arg(long, global = true)]
    memory: bool,

    /// Log filter (overrides RUST_LOG), e.g. `debug` or `cachesim_core=trace`.
    #[arg(long, global = true)]
    log: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run seeded random traffic.
    Random {
        /// Number of accesses.
        #[arg(short, long, default_value_t = 100_000)]
        accesses: usize,

        /// RNG seed.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        /// Fraction of accesses that are writes.
        #[arg(long, default_value_t = 0.3)]
        write_ratio: f64,

        /// Fraction of accesses that target the hot working set.
        #[arg(long, default_value_t = 0.9)]
        hot_ratio: f64,

        /// Number of hot blocks.
        #[arg(long, default_value_t = 1024)]
        hot_blocks: usize,
    },

    /// Replay a JSON trace file.
    Trace {
        /// Trace path.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.common.log.as_deref());

    let config = load_config(cli.common.config.as_deref());
    let block_bytes = match config.geometry() {
        Ok(geometry) => geometry.block_bytes,
        Err(e) => {
            eprintln!("Invalid cache configuration: {e}");
            process::exit(1);
        }
    };

    let entries: Box<dyn Iterator<Item = TraceEntry>> = match cli.command {
        Commands::Random {
            accesses,
            seed,
            write_ratio,
            hot_ratio,
            hot_blocks,
        } => {
            let traffic = TrafficConfig {
                seed,
                write_ratio,
                hot_ratio,
                hot_blocks,
                block_bytes: u32::try_from(block_bytes).unwrap_or(u32::MAX),
            };
            Box::new(TrafficGenerator::new(&traffic).take(accesses))
        }
        Commands::Trace { path } => {
            let trace = sim::load_trace(&path).unwrap_or_else(|e| {
                eprintln!("Error loading trace {path}: {e}");
                process::exit(1);
            });
            Box::new(trace.into_iter())
        }
    };

    if cli.common.memory {
        let memory = BlockMemory::new(block_bytes);
        let mut simulator = Simulator::new(build_cache(&config, memory));
        report(&mut simulator, entries);
        println!(
            "  memory: {} fetches, {} write-backs, {} resident blocks",
            simulator.cache.memory().fetches(),
            simulator.cache.memory().write_backs(),
            simulator.cache.memory().resident_blocks()
        );
    } else {
        let mut simulator = Simulator::new(build_cache(&config, cachesim_core::memory::ZeroFill));
        report(&mut simulator, entries);
    }
}

/// Installs the `tracing` subscriber. `--log` wins over `RUST_LOG`; the default is `warn`.
fn init_logging(filter: Option<&str>) {
    let filter = filter
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads the configuration file, or returns the default geometry.
fn load_config(path: Option<&str>) -> CacheConfig {
    let Some(path) = path else {
        return CacheConfig::default();
    };
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config {path}: {e}");
        process::exit(1);
    });
    CacheConfig::from_json(&text).unwrap_or_else(|e| {
        eprintln!("Error in config {path}: {e}");
        process::exit(1);
    })
}

fn build_cache<M: BackingStore>(config: &CacheConfig, memory: M) -> CacheStore<M> {
    CacheStore::with_memory(config, memory).unwrap_or_else(|e| {
        eprintln!("Invalid cache configuration: {e}");
        process::exit(1);
    })
}

/// Replays `entries`, flushes the cache and prints the statistics.
fn report<M: BackingStore>(
    simulator: &mut Simulator<M>,
    entries: Box<dyn Iterator<Item = TraceEntry>>,
) {
    let geometry = *simulator.cache.geometry();
    println!(
        "Cache: {} sets x {} ways x {} B blocks ({} KiB)",
        geometry.sets,
        geometry.ways,
        geometry.block_bytes,
        geometry.capacity_bytes() / 1024
    );

    let summary = simulator.run(entries);
    let flushed = simulator.cache.flush();

    println!("{}", summary.stats);
    println!("  read mismatches: {}", summary.mismatches);
    println!("  dirty blocks flushed at exit: {flushed}");
}
