//! SwingScan CLI: scan, demo, and thresholds commands.
//!
//! Commands:
//! - `scan`: screen a universe JSON file
//! - `demo`: screen a deterministic synthetic universe
//! - `thresholds`: print the thresholds a regime resolves to

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use swingscan_core::thresholds::resolve;
use swingscan_core::{AdaptiveThresholds, MarketRegime, ScreenOutcome, SnapshotSummary};
use swingscan_runner::{
    fetch_universe, run_screen, snapshot_sink, write_exports, FetchLockRegistry, FileSource,
    RunSettings, SyntheticSource, UniverseSource,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "swingscan",
    about = "SwingScan: multi-phase momentum screener for swing entries"
)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Base log level when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a universe JSON file.
    Scan {
        /// Universe file: { "benchmark": {...}, "stocks": [...] }.
        #[arg(long)]
        universe: PathBuf,

        /// Path to a TOML settings file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write screen.json, screen.csv and report.md here.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Credential the data fetch is serialized under.
        #[arg(long, default_value = "local-file")]
        credential: String,

        /// Rows printed in the summary table.
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Screen a synthetic universe.
    Demo {
        #[arg(long, default_value_t = 60)]
        symbols: usize,

        #[arg(long, default_value_t = 300)]
        bars: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Path to a TOML settings file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write screen.json, screen.csv and report.md here.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Rows printed in the summary table.
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Print the thresholds a regime resolves to, as JSON.
    Thresholds {
        #[arg(long, value_enum)]
        regime: RegimeArg,

        /// Path to a TOML settings file whose overrides are applied.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RegimeArg {
    Bull,
    Bear,
    Sideways,
}

impl From<RegimeArg> for MarketRegime {
    fn from(arg: RegimeArg) -> Self {
        match arg {
            RegimeArg::Bull => MarketRegime::Bull,
            RegimeArg::Bear => MarketRegime::Bear,
            RegimeArg::Sideways => MarketRegime::Sideways,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);

    match cli.command {
        Commands::Scan {
            universe,
            config,
            output,
            credential,
            top,
        } => {
            let source = FileSource::new(universe).with_credential(credential);
            run_scan_cmd(&source, config.as_deref(), output.as_deref(), top)
        }
        Commands::Demo {
            symbols,
            bars,
            seed,
            config,
            output,
            top,
        } => {
            let source = SyntheticSource {
                n_symbols: symbols,
                n_bars: bars,
                seed,
            };
            run_scan_cmd(&source, config.as_deref(), output.as_deref(), top)
        }
        Commands::Thresholds { regime, config } => run_thresholds_cmd(regime, config.as_deref()),
    }
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    // a second init (tests, embedding) is not an error
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

fn load_settings(path: Option<&Path>) -> Result<RunSettings> {
    match path {
        Some(p) => RunSettings::from_file(p)
            .with_context(|| format!("failed to load settings from {}", p.display())),
        None => Ok(RunSettings::default()),
    }
}

fn run_scan_cmd(
    source: &dyn UniverseSource,
    config: Option<&Path>,
    output: Option<&Path>,
    top: usize,
) -> Result<()> {
    let settings = load_settings(config)?;
    let locks = FetchLockRegistry::new(settings.fetch.stale_after());
    let universe = fetch_universe(source, &locks, &settings.fetch)?;
    info!(stocks = universe.stocks.len(), "universe ready");

    let mut run = run_screen(&universe, &settings, snapshot_sink(&settings))?;
    print_summary(&run.outcome, top);

    if let Some(dir) = output {
        let written = write_exports(&run.outcome, dir)?;
        for path in written {
            println!("Wrote {}", path.display());
        }
    }

    run.wait_for_snapshot();
    Ok(())
}

fn run_thresholds_cmd(regime: RegimeArg, config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    let thresholds = resolve(
        regime.into(),
        Some(&settings.screener),
        &AdaptiveThresholds::reference(),
    );
    println!("{}", serde_json::to_string_pretty(&thresholds)?);
    Ok(())
}

fn print_summary(outcome: &ScreenOutcome, top: usize) {
    let r = &outcome.regime;
    let f = &outcome.funnel;
    let c = &outcome.signal_counts;

    println!();
    println!("=== Momentum Screen ===");
    println!("Regime:         {} ({})", r.regime, r.description);
    println!("Screened:       {}", f.total);
    println!(
        "Funnel:         P1 {} > P2 {} > P3 {} > P4 {} > P5 {}",
        f.phase1, f.phase2, f.phase3, f.phase4, f.phase5
    );
    println!(
        "Signals:        STRONG_BUY {}  BUY {}  WATCH {}  NEUTRAL {}  AVOID {}",
        c.strong_buy, c.buy, c.watch, c.neutral, c.avoid
    );
    println!("Digest:         {}", outcome.digest());

    let summary = SnapshotSummary::from_outcome(outcome, top);
    if summary.top.is_empty() {
        println!();
        return;
    }
    println!();
    println!(
        "{:<12} {:<24} {:<11} {:>5} {:>10} {:>10} {:>10} {:>6}",
        "Symbol", "Sector", "Signal", "Score", "Entry", "Stop", "Target", "R:R"
    );
    for e in &summary.top {
        let sector: String = e.sector.chars().take(24).collect();
        println!(
            "{:<12} {:<24} {:<11} {:>5} {:>10.2} {:>10.2} {:>10.2} {:>6.2}",
            e.symbol,
            sector,
            e.signal.label(),
            e.overall_score,
            e.entry_price,
            e.stop_loss,
            e.target,
            e.risk_reward_ratio
        );
    }
    println!();
}
