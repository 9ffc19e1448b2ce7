//! Input plumbing — `.day` directory scanning and tabular CSV feeds.
//!
//! The feed vendors lay daily files out as `<root>/sh/lday/*.day` and
//! `<root>/sz/lday/*.day`; flat directories of `.day` files are accepted
//! too. CSV feeds follow the upstream tabular daily schema
//! (`ts_code,trade_date,open,high,low,close,pre_close,change,pct_chg,vol,amount`),
//! newest-first or oldest-first — series construction reorders either way.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use stocksieve_core::domain::{CanonicalStockRecord, RawBar, TimeSeries};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("no .day files under {0}")]
    NoDayFiles(String),
    #[error("parse CSV {path}: {source}")]
    Csv { path: String, source: csv::Error },
    #[error("bad trade_date {value} in {path}")]
    BadTradeDate { path: String, value: String },
    #[error("empty CSV feed {0}")]
    EmptyFeed(String),
}

fn io_err(path: &Path, source: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// One `.day` file, read into memory.
#[derive(Debug, Clone)]
pub struct DayFile {
    /// Filename stem, e.g. `sh600519`.
    pub stem: String,
    pub bytes: Vec<u8>,
}

fn collect_day_paths(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    for entry in fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_day_paths(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "day") {
            out.push(path);
        }
    }
    Ok(())
}

/// Find every `.day` file under `root`, recursively, in a stable order.
pub fn find_day_files(root: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut paths = Vec::new();
    collect_day_paths(root, &mut paths)?;
    if paths.is_empty() {
        return Err(LoadError::NoDayFiles(root.display().to_string()));
    }
    paths.sort();
    Ok(paths)
}

/// Read a `.day` file into a (stem, bytes) pair.
pub fn read_day_file(path: &Path) -> Result<DayFile, LoadError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(DayFile { stem, bytes })
}

/// Load every `.day` file under `root`.
pub fn load_day_dir(root: &Path) -> Result<Vec<DayFile>, LoadError> {
    find_day_files(root)?
        .iter()
        .map(|path| read_day_file(path))
        .collect()
}

/// One row of the tabular daily feed.
#[derive(Debug, Deserialize)]
struct DailyRow {
    #[serde(default)]
    ts_code: Option<String>,
    trade_date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    pre_close: Option<f64>,
    #[serde(default)]
    #[allow(dead_code)]
    change: Option<f64>,
    #[serde(default)]
    pct_chg: Option<f64>,
    vol: f64,
    #[serde(default)]
    amount: Option<f64>,
}

fn parse_trade_date(value: &str) -> Option<NaiveDate> {
    let compact: String = value.chars().filter(|c| *c != '-').collect();
    NaiveDate::parse_from_str(&compact, "%Y%m%d").ok()
}

/// Load one symbol's tabular daily feed into a series.
///
/// `code` overrides the file's `ts_code` column as the series symbol when
/// given (the caller usually derives it from the filename).
pub fn load_daily_csv(path: &Path, code: Option<&str>) -> Result<TimeSeries, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Csv {
        path: path.display().to_string(),
        source,
    })?;

    let mut symbol = code.map(String::from);
    let mut bars = Vec::new();
    for row in reader.deserialize::<DailyRow>() {
        let row = row.map_err(|source| LoadError::Csv {
            path: path.display().to_string(),
            source,
        })?;
        let date = parse_trade_date(&row.trade_date).ok_or_else(|| LoadError::BadTradeDate {
            path: path.display().to_string(),
            value: row.trade_date.clone(),
        })?;
        if symbol.is_none() {
            symbol = row.ts_code.clone();
        }
        bars.push(RawBar {
            date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            prev_close: row.pre_close.unwrap_or(0.0),
            volume: row.vol,
            amount: row.amount.unwrap_or(0.0),
        });
    }
    if bars.is_empty() {
        return Err(LoadError::EmptyFeed(path.display().to_string()));
    }

    let symbol = symbol.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().replace('_', "."))
            .unwrap_or_default()
    });
    Ok(TimeSeries::from_bars(symbol, bars))
}

/// Partial snapshot record from the latest row of a tabular feed.
///
/// The feed reports the day's move as a percentage, so both change fields
/// carry `pct_chg` — that is what the upstream integration does, and the
/// reconciler treats this source accordingly.
pub fn csv_snapshot(series: &TimeSeries, pct_chg: Option<f64>) -> Option<CanonicalStockRecord> {
    let latest = series.latest()?;
    let mut record = CanonicalStockRecord::empty(series.symbol());
    record.price = Some(latest.close);
    record.price_change = pct_chg.or(Some(latest.change_percent()));
    record.change_percent = record.price_change;
    record.volume = Some(latest.volume);
    record.amount = Some(latest.amount);
    record.date = Some(latest.date);
    Some(record)
}

/// Load a directory of `<code>_daily.csv` feeds as snapshot records.
pub fn load_csv_snapshots(dir: &Path) -> Result<Vec<CanonicalStockRecord>, LoadError> {
    let mut records = Vec::new();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    for path in paths {
        match load_daily_csv(&path, None) {
            Ok(series) => {
                if let Some(record) = csv_snapshot(&series, None) {
                    records.push(record);
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping CSV feed");
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn day_files_are_found_in_sh_sz_subtrees() {
        let dir = tempfile::tempdir().unwrap();
        let sh = dir.path().join("sh/lday");
        let sz = dir.path().join("sz/lday");
        fs::create_dir_all(&sh).unwrap();
        fs::create_dir_all(&sz).unwrap();
        fs::write(sh.join("sh600519.day"), [0u8; 32]).unwrap();
        fs::write(sz.join("sz000858.day"), [0u8; 64]).unwrap();
        fs::write(sz.join("notes.txt"), b"ignore me").unwrap();

        let files = load_day_dir(dir.path()).unwrap();
        let stems: Vec<_> = files.iter().map(|f| f.stem.as_str()).collect();
        assert_eq!(stems, vec!["sh600519", "sz000858"]);
        assert_eq!(files[1].bytes.len(), 64);
    }

    #[test]
    fn empty_tree_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_day_dir(dir.path()),
            Err(LoadError::NoDayFiles(_))
        ));
    }

    fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        writeln!(
            f,
            "ts_code,trade_date,open,high,low,close,pre_close,change,pct_chg,vol,amount"
        )
        .unwrap();
        write!(f, "{body}").unwrap();
        path
    }

    #[test]
    fn csv_feed_loads_newest_first_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "600519_SH_daily.csv",
            "600519.SH,20240104,12.0,12.5,11.8,12.2,12.0,0.2,1.67,30000,366000\n\
             600519.SH,20240103,11.8,12.1,11.7,12.0,11.8,0.2,1.69,28000,336000\n\
             600519.SH,20240102,11.5,11.9,11.4,11.8,11.5,0.3,2.61,25000,295000\n",
        );

        let series = load_daily_csv(&path, None).unwrap();
        assert_eq!(series.symbol(), "600519.SH");
        assert_eq!(series.len(), 3);
        // Reordered oldest-first.
        assert_eq!(
            series.bars()[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(series.latest().unwrap().close, 12.2);
    }

    #[test]
    fn csv_snapshot_uses_latest_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "000858_SZ_daily.csv",
            "000858.SZ,2024-01-03,140.0,142.0,139.0,141.0,140.0,1.0,0.71,9000,1269000\n",
        );
        let series = load_daily_csv(&path, None).unwrap();
        let record = csv_snapshot(&series, None).unwrap();
        assert_eq!(record.code, "000858.SZ");
        assert_eq!(record.price, Some(141.0));
        assert_eq!(record.volume, Some(9000.0));
        // Percent change mirrored into both change fields.
        assert_eq!(record.price_change, record.change_percent);
        assert_eq!(record.pe, None);
    }

    #[test]
    fn bad_trade_date_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "x_daily.csv",
            "600519.SH,notadate,1,1,1,1,1,0,0,1,1\n",
        );
        assert!(matches!(
            load_daily_csv(&path, None),
            Err(LoadError::BadTradeDate { .. })
        ));
    }
}
