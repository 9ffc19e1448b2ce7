//! Parallel per-symbol screening.
//!
//! Symbols are independent until the final ranking, so the batch fans out
//! with rayon and merges only at the end. One symbol's failure never aborts
//! the batch: it is recorded, logged, and excluded.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use stocksieve_core::decode::{decode_latest, decode_series, qualified_code, DecodeError};
use stocksieve_core::domain::{CanonicalStockRecord, Signal};
use stocksieve_core::indicators::{augment, MIN_HISTORY_BARS};
use stocksieve_core::lookup::SymbolTable;
use stocksieve_core::strategy::{evaluate_breakout, rank_signals};

use crate::loader::DayFile;

/// Why a symbol produced no signal attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Zero decodable records in the buffer.
    EmptyDataset,
    /// A record's date field was malformed.
    InvalidDate,
    /// Fewer raw bars than the widest indicator window.
    InsufficientHistory { have: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyDataset => write!(f, "no decodable records"),
            SkipReason::InvalidDate => write!(f, "malformed date field"),
            SkipReason::InsufficientHistory { have } => {
                write!(f, "only {have} bars, need {MIN_HISTORY_BARS}")
            }
        }
    }
}

impl From<&DecodeError> for SkipReason {
    fn from(err: &DecodeError) -> Self {
        match err {
            DecodeError::EmptyDataset { .. } => SkipReason::EmptyDataset,
            DecodeError::InvalidDate { .. } => SkipReason::InvalidDate,
        }
    }
}

/// One skipped symbol with its reason, kept for diagnosability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub code: String,
    pub reason: SkipReason,
}

/// Outcome of a breakout scan over a symbol universe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// Signals ranked by score descending (stable).
    pub signals: Vec<Signal>,
    pub skipped: Vec<SkippedSymbol>,
    pub scanned: usize,
}

impl ScanReport {
    /// The whole universe produced nothing usable.
    pub fn is_empty_result(&self) -> bool {
        self.signals.is_empty()
    }
}

fn scan_one(file: &DayFile) -> Result<Option<Signal>, SkipReason> {
    let series = decode_series(&file.bytes, &file.stem).map_err(|e| SkipReason::from(&e))?;
    if series.len() < MIN_HISTORY_BARS {
        return Err(SkipReason::InsufficientHistory { have: series.len() });
    }
    let rows = augment(&series);
    Ok(evaluate_breakout(series.symbol(), &rows))
}

/// Run the breakout screen over a set of `.day` buffers.
///
/// Per-symbol decode, indicator computation and rule evaluation run in
/// parallel; the ranked merge at the end is the only cross-symbol step, so
/// the result is deterministic regardless of thread interleaving.
pub fn run_breakout_scan(files: &[DayFile], top: Option<usize>) -> ScanReport {
    let outcomes: Vec<(String, Result<Option<Signal>, SkipReason>)> = files
        .par_iter()
        .map(|file| (qualified_code(&file.stem), scan_one(file)))
        .collect();

    let mut report = ScanReport {
        scanned: files.len(),
        ..ScanReport::default()
    };
    for (code, outcome) in outcomes {
        match outcome {
            Ok(Some(signal)) => report.signals.push(signal),
            Ok(None) => {}
            Err(reason) => {
                tracing::warn!(code = %code, reason = %reason, "symbol skipped");
                report.skipped.push(SkippedSymbol { code, reason });
            }
        }
    }

    rank_signals(&mut report.signals);
    if let Some(n) = top {
        report.signals.truncate(n);
    }
    tracing::info!(
        scanned = report.scanned,
        signals = report.signals.len(),
        skipped = report.skipped.len(),
        "breakout scan complete"
    );
    report
}

/// Decode the latest record of every buffer into snapshot records.
///
/// Failures are logged and excluded, same isolation as the scan path.
pub fn decode_snapshots(files: &[DayFile], table: &SymbolTable) -> Vec<CanonicalStockRecord> {
    let mut records = Vec::with_capacity(files.len());
    let outcomes: Vec<Result<CanonicalStockRecord, (String, DecodeError)>> = files
        .par_iter()
        .map(|file| {
            decode_latest(&file.bytes, &file.stem, table)
                .map_err(|err| (qualified_code(&file.stem), err))
        })
        .collect();
    for outcome in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err((code, err)) => {
                tracing::warn!(code = %code, error = %err, "snapshot decode skipped");
            }
        }
    }
    records
}
