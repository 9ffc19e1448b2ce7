//! Binary `.day` record decoding.
//!
//! The daily feed stores one 32-byte little-endian record per trading day:
//!
//! ```text
//! 00..04  i32  date as YYYYMMDD
//! 04..08  i32  open  × 1000
//! 08..12  i32  high  × 1000
//! 12..16  i32  low   × 1000
//! 16..20  i32  close × 1000
//! 20..24  f32  amount (currency units)
//! 24..28  i32  volume (lots)
//! 28..32  i32  previous close × 1000
//! ```
//!
//! A trailing partial record (< 32 bytes) is silently excluded. Files are
//! named `<sh|sz><6-digit-code>.day`; the 2-letter prefix selects the market
//! qualifier.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{round2, CanonicalStockRecord, RawBar, TimeSeries};
use crate::lookup::SymbolTable;

/// Fixed on-disk record size in bytes.
pub const RECORD_SIZE: usize = 32;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The buffer holds zero complete records.
    #[error("no decodable records in buffer ({len} bytes)")]
    EmptyDataset { len: usize },
    /// A record's date field is not a valid YYYYMMDD calendar day.
    #[error("invalid date field {value} at record {index}")]
    InvalidDate { index: usize, value: i32 },
}

/// Market qualifier derived from the filename prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
    Shanghai,
    Shenzhen,
}

impl Market {
    fn suffix(self) -> &'static str {
        match self {
            Market::Shanghai => "SH",
            Market::Shenzhen => "SZ",
        }
    }
}

/// Split a filename stem like `sh600519` into bare digits and market.
///
/// Stems without a recognized prefix are used unqualified.
pub fn parse_stem(stem: &str) -> (&str, Option<Market>) {
    if let Some(digits) = stem.strip_prefix("sh") {
        (digits, Some(Market::Shanghai))
    } else if let Some(digits) = stem.strip_prefix("sz") {
        (digits, Some(Market::Shenzhen))
    } else {
        (stem, None)
    }
}

/// Market-qualified code for a filename stem (`sh600519` → `600519.SH`).
pub fn qualified_code(stem: &str) -> String {
    match parse_stem(stem) {
        (digits, Some(market)) => format!("{digits}.{}", market.suffix()),
        (digits, None) => digits.to_string(),
    }
}

/// One record's raw fields, prices still ×1000.
struct DayRecord {
    date: i32,
    open: i32,
    high: i32,
    low: i32,
    close: i32,
    amount: f32,
    volume: i32,
    prev_close: i32,
}

fn read_i32(chunk: &[u8], offset: usize) -> i32 {
    let bytes: [u8; 4] = chunk[offset..offset + 4]
        .try_into()
        .unwrap_or([0, 0, 0, 0]);
    i32::from_le_bytes(bytes)
}

fn read_f32(chunk: &[u8], offset: usize) -> f32 {
    let bytes: [u8; 4] = chunk[offset..offset + 4]
        .try_into()
        .unwrap_or([0, 0, 0, 0]);
    f32::from_le_bytes(bytes)
}

fn decode_record(chunk: &[u8]) -> DayRecord {
    DayRecord {
        date: read_i32(chunk, 0),
        open: read_i32(chunk, 4),
        high: read_i32(chunk, 8),
        low: read_i32(chunk, 12),
        close: read_i32(chunk, 16),
        amount: read_f32(chunk, 20),
        volume: read_i32(chunk, 24),
        prev_close: read_i32(chunk, 28),
    }
}

fn parse_date(value: i32) -> Option<NaiveDate> {
    let year = value / 10_000;
    let month = (value / 100 % 100) as u32;
    let day = (value % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn to_bar(record: &DayRecord, date: NaiveDate) -> RawBar {
    RawBar {
        date,
        open: f64::from(record.open) / 1000.0,
        high: f64::from(record.high) / 1000.0,
        low: f64::from(record.low) / 1000.0,
        close: f64::from(record.close) / 1000.0,
        prev_close: f64::from(record.prev_close) / 1000.0,
        volume: f64::from(record.volume),
        amount: f64::from(record.amount),
    }
}

/// Number of complete records in a buffer.
pub fn record_count(buf: &[u8]) -> usize {
    buf.len() / RECORD_SIZE
}

/// Decode the full bar history for the time-series path.
///
/// Fails with [`DecodeError::EmptyDataset`] when the buffer holds zero
/// complete records and with [`DecodeError::InvalidDate`] when any record's
/// date field is malformed. Either failure is fatal to this one symbol only;
/// the batch layer catches and excludes it.
pub fn decode_series(buf: &[u8], stem: &str) -> Result<TimeSeries, DecodeError> {
    let count = record_count(buf);
    if count == 0 {
        return Err(DecodeError::EmptyDataset { len: buf.len() });
    }

    let mut bars = Vec::with_capacity(count);
    for (index, chunk) in buf.chunks_exact(RECORD_SIZE).enumerate() {
        let record = decode_record(chunk);
        let date = parse_date(record.date).ok_or(DecodeError::InvalidDate {
            index,
            value: record.date,
        })?;
        bars.push(to_bar(&record, date));
    }
    Ok(TimeSeries::from_bars(qualified_code(stem), bars))
}

/// Decode only the chronologically latest record into a snapshot record.
///
/// Descriptive fields come from the injected `table`; a miss falls back to
/// the qualified code as display name with an unknown industry — never an
/// error. A malformed date maps to an unknown date for the same reason.
/// Price fields are rounded to 2 decimal places per the output contract.
pub fn decode_latest(
    buf: &[u8],
    stem: &str,
    table: &SymbolTable,
) -> Result<CanonicalStockRecord, DecodeError> {
    let count = record_count(buf);
    if count == 0 {
        return Err(DecodeError::EmptyDataset { len: buf.len() });
    }

    let start = (count - 1) * RECORD_SIZE;
    let record = decode_record(&buf[start..start + RECORD_SIZE]);

    let close = f64::from(record.close) / 1000.0;
    let prev_close = f64::from(record.prev_close) / 1000.0;
    let price_change = close - prev_close;
    let change_percent = if prev_close == 0.0 {
        0.0
    } else {
        price_change / prev_close * 100.0
    };

    let (digits, _) = parse_stem(stem);
    let code = qualified_code(stem);
    let (name, industry) = match table.get(digits) {
        Some(info) => (info.name.clone(), Some(info.industry.clone())),
        None => (code.clone(), None),
    };

    Ok(CanonicalStockRecord {
        code,
        name: Some(name),
        industry,
        price: Some(round2(close)),
        price_change: Some(round2(price_change)),
        change_percent: Some(round2(change_percent)),
        pe: None,
        pb: None,
        roe: None,
        turnover_rate: None,
        volume: Some(f64::from(record.volume)),
        amount: Some(f64::from(record.amount)),
        market_cap: None,
        date: parse_date(record.date),
    })
}
