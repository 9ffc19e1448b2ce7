//! StockSieve Runner — batch orchestration over the core components.
//!
//! This crate builds on `stocksieve-core` to provide:
//! - `.day` directory scanning and tabular CSV feed loading
//! - Rayon-parallel per-symbol screening with per-symbol failure isolation
//! - Snapshot loading, sentinel sanitizing, and multi-source reconciliation
//! - JSON export of ranked results
//!
//! Scheduling policies toward third parties (rate-limit delays for any
//! network enrichment) belong to callers further out; nothing here sleeps,
//! fetches, or blocks beyond local file I/O.

pub mod batch;
pub mod export;
pub mod loader;
pub mod snapshot;

pub use batch::{decode_snapshots, run_breakout_scan, ScanReport, SkipReason, SkippedSymbol};
pub use export::{records_json, scan_report_json, selection_json, signals_json, write_artifact};
pub use loader::{
    csv_snapshot, find_day_files, load_csv_snapshots, load_daily_csv, load_day_dir, read_day_file,
    DayFile, LoadError,
};
pub use snapshot::{load_snapshot, merge_sources};
