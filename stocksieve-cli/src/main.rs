//! StockSieve CLI — scan, select, and filter commands.
//!
//! Commands:
//! - `scan` — run the breakout screen over a directory of `.day` files
//! - `select` — pick the top candidate from a snapshot JSON (optionally
//!   merged with `.day`-derived and CSV-derived partial records)
//! - `filter` — keep only eligible A-share records from a snapshot JSON
//!
//! This layer only wires files to the runner; every algorithmic decision
//! lives in `stocksieve-core`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use stocksieve_core::classify::filter_a_shares;
use stocksieve_core::lookup::SymbolTable;
use stocksieve_core::scoring::{assess_risk, select_diversified, select_top, select_top_n};
use stocksieve_runner::{
    decode_snapshots, load_csv_snapshots, load_day_dir, load_snapshot, merge_sources,
    records_json, run_breakout_scan, scan_report_json, selection_json, write_artifact,
};

#[derive(Parser)]
#[command(name = "stocksieve", about = "StockSieve CLI — A-share candidate screener")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the breakout screen over a directory tree of .day files.
    Scan {
        /// Data directory (contains sh/ and sz/ subtrees, or flat .day files).
        data_dir: PathBuf,

        /// Keep only the N best signals.
        #[arg(long)]
        top: Option<usize>,

        /// Write the scan report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Pick the top candidate from a cross-sectional snapshot.
    Select {
        /// Snapshot JSON array of stock records.
        snapshot: PathBuf,

        /// Directory of .day files merged in as a lower-precedence source.
        #[arg(long)]
        day_dir: Option<PathBuf>,

        /// Directory of <code>_daily.csv feeds merged in below the snapshot.
        #[arg(long)]
        feed_dir: Option<PathBuf>,

        /// Symbol table TOML for .day snapshot decoding.
        #[arg(long)]
        symbols: Option<PathBuf>,

        /// Drop non-A-share records before scoring.
        #[arg(long, default_value_t = false)]
        a_shares_only: bool,

        /// Return the N best candidates instead of a single pick.
        #[arg(long)]
        top_n: Option<usize>,

        /// Build an industry-diversified portfolio (N per industry).
        #[arg(long, conflicts_with = "top_n")]
        diversified: Option<usize>,

        /// Write the result here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Keep only eligible A-share records from a snapshot JSON.
    Filter {
        /// Snapshot JSON array of stock records.
        input: PathBuf,

        /// Filtered output path.
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scan {
            data_dir,
            top,
            output,
        } => cmd_scan(data_dir, top, output),
        Commands::Select {
            snapshot,
            day_dir,
            feed_dir,
            symbols,
            a_shares_only,
            top_n,
            diversified,
            output,
        } => cmd_select(
            snapshot,
            day_dir,
            feed_dir,
            symbols,
            a_shares_only,
            top_n,
            diversified,
            output,
        ),
        Commands::Filter { input, output } => cmd_filter(input, output),
    }
}

fn emit(output: Option<PathBuf>, json: &str) -> Result<()> {
    match output {
        Some(path) => {
            write_artifact(&path, json)?;
            eprintln!("wrote {}", path.display());
            Ok(())
        }
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn load_table(symbols: Option<PathBuf>) -> Result<SymbolTable> {
    match symbols {
        Some(path) => SymbolTable::from_file(&path)
            .with_context(|| format!("load symbol table {}", path.display())),
        None => Ok(SymbolTable::default_cn()),
    }
}

fn cmd_scan(data_dir: PathBuf, top: Option<usize>, output: Option<PathBuf>) -> Result<()> {
    let files = load_day_dir(&data_dir)?;
    let report = run_breakout_scan(&files, top);
    if report.is_empty_result() {
        eprintln!(
            "no breakout candidates today ({} scanned, {} skipped)",
            report.scanned,
            report.skipped.len()
        );
    }
    emit(output, &scan_report_json(&report)?)
}

#[allow(clippy::too_many_arguments)]
fn cmd_select(
    snapshot: PathBuf,
    day_dir: Option<PathBuf>,
    feed_dir: Option<PathBuf>,
    symbols: Option<PathBuf>,
    a_shares_only: bool,
    top_n: Option<usize>,
    diversified: Option<usize>,
    output: Option<PathBuf>,
) -> Result<()> {
    // Precedence: scraped snapshot first, CSV feed partials below it,
    // .day-derived partials last.
    let mut sources = vec![load_snapshot(&snapshot)?];
    if let Some(dir) = feed_dir {
        sources.push(load_csv_snapshots(&dir)?);
    }
    if let Some(dir) = day_dir {
        let table = load_table(symbols)?;
        sources.push(decode_snapshots(&load_day_dir(&dir)?, &table));
    }
    let (mut records, _coverage) = merge_sources(sources);

    if a_shares_only {
        let (kept, report) = filter_a_shares(records);
        tracing::info!(kept = report.kept, dropped = report.dropped, "A-share filter applied");
        records = kept;
    }

    if let Some(per_industry) = diversified {
        let portfolio = select_diversified(&records, per_industry);
        return emit(output, &records_json(&portfolio)?);
    }
    if let Some(n) = top_n {
        let picks = select_top_n(&records, n);
        return emit(output, &records_json(&picks)?);
    }

    match select_top(&records) {
        Some(pick) => {
            let risk = assess_risk(&pick.record);
            tracing::info!(
                code = %pick.record.code,
                score = pick.score,
                risk = ?risk.level,
                "candidate selected"
            );
            emit(output, &selection_json(&pick)?)
        }
        None => bail!("no usable records in the snapshot universe"),
    }
}

fn cmd_filter(input: PathBuf, output: PathBuf) -> Result<()> {
    let records = load_snapshot(&input)?;
    let (kept, report) = filter_a_shares(records);
    eprintln!(
        "kept {} of {} records ({} dropped)",
        report.kept, report.total, report.dropped
    );
    write_artifact(&output, &records_json(&kept)?)?;
    eprintln!("wrote {}", output.display());
    Ok(())
}
