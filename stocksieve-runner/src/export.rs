//! Result export — ranked JSON artifacts for the serving layer.
//!
//! Field names and 2-decimal rounding are part of the output contract and
//! must reproduce bit-for-bit; everything here serializes the already-rounded
//! core types without reformatting numbers.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use stocksieve_core::domain::Signal;
use stocksieve_core::scoring::ScoreRecord;

use crate::batch::ScanReport;

/// Serialize the ranked signal list to pretty JSON.
pub fn signals_json(signals: &[Signal]) -> Result<String> {
    serde_json::to_string_pretty(signals).context("serialize signals to JSON")
}

/// Serialize the full scan report (signals plus skip diagnostics).
pub fn scan_report_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("serialize scan report to JSON")
}

/// Serialize the snapshot selection (a single top pick).
pub fn selection_json(pick: &ScoreRecord) -> Result<String> {
    serde_json::to_string_pretty(pick).context("serialize selection to JSON")
}

/// Serialize any record list (filter output, merged universes).
pub fn records_json<T: Serialize>(records: &[T]) -> Result<String> {
    serde_json::to_string_pretty(records).context("serialize records to JSON")
}

/// Write an artifact, creating parent directories as needed.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir {}", parent.display()))?;
        }
    }
    std::fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
