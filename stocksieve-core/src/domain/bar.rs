//! RawBar and TimeSeries — the per-symbol market data units.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OHLCV bar for a single symbol on a single trading day.
///
/// Prices are already converted to currency units (the binary feed stores
/// them ×1000). Immutable once decoded — nothing downstream mutates bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub prev_close: f64,
    /// Volume in lots (手).
    pub volume: f64,
    /// Turnover in currency units.
    pub amount: f64,
}

impl RawBar {
    /// Close-over-previous-close change in percent.
    ///
    /// Defined as exactly `0.0` when `prev_close` is zero — a fresh listing
    /// or a placeholder record must not divide by zero.
    pub fn change_percent(&self) -> f64 {
        if self.prev_close == 0.0 {
            0.0
        } else {
            (self.close - self.prev_close) / self.prev_close * 100.0
        }
    }
}

/// Ordered per-symbol bar history.
///
/// Invariant: strictly increasing by date, no duplicate dates. The invariant
/// is established at construction (sort + dedup, last write for a date wins)
/// and preserved by `merge`, so rolling computations can assume it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    symbol: String,
    bars: Vec<RawBar>,
}

impl TimeSeries {
    /// Build a series from bars in any order.
    ///
    /// Bars are sorted by date; when two bars share a date the later one in
    /// the input wins.
    pub fn from_bars(symbol: impl Into<String>, bars: Vec<RawBar>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, RawBar> = BTreeMap::new();
        for bar in bars {
            by_date.insert(bar.date, bar);
        }
        Self {
            symbol: symbol.into(),
            bars: by_date.into_values().collect(),
        }
    }

    /// Merge another ingestion run into this series, deduplicated by date.
    /// The incoming run's bar wins for a shared date.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = RawBar>) {
        let mut by_date: BTreeMap<NaiveDate, RawBar> = self
            .bars
            .drain(..)
            .map(|bar| (bar.date, bar))
            .collect();
        for bar in incoming {
            by_date.insert(bar.date, bar);
        }
        self.bars = by_date.into_values().collect();
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[RawBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The chronologically latest bar, if any.
    pub fn latest(&self) -> Option<&RawBar> {
        self.bars.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: NaiveDate, close: f64) -> RawBar {
        RawBar {
            date,
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            prev_close: close - 0.5,
            volume: 1000.0,
            amount: 1_000_000.0,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn from_bars_sorts_by_date() {
        let series = TimeSeries::from_bars(
            "600519.SH",
            vec![bar(day(3), 12.0), bar(day(1), 10.0), bar(day(2), 11.0)],
        );
        let dates: Vec<_> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
    }

    #[test]
    fn duplicate_dates_last_write_wins() {
        let series = TimeSeries::from_bars(
            "600519.SH",
            vec![bar(day(1), 10.0), bar(day(2), 11.0), bar(day(1), 99.0)],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].close, 99.0);
    }

    #[test]
    fn merge_overwrites_shared_dates() {
        let mut series = TimeSeries::from_bars("600519.SH", vec![bar(day(1), 10.0), bar(day(2), 11.0)]);
        series.merge(vec![bar(day(2), 20.0), bar(day(3), 12.0)]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.bars()[1].close, 20.0);
        assert_eq!(series.latest().unwrap().date, day(3));
    }

    #[test]
    fn change_percent_guards_zero_prev_close() {
        let mut b = bar(day(1), 10.0);
        b.prev_close = 0.0;
        assert_eq!(b.change_percent(), 0.0);

        b.prev_close = 8.0;
        assert!((b.change_percent() - 25.0).abs() < 1e-10);
    }

    #[test]
    fn serialization_roundtrip() {
        let series = TimeSeries::from_bars("000858.SZ", vec![bar(day(1), 10.0)]);
        let json = serde_json::to_string(&series).unwrap();
        let deser: TimeSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(deser.symbol(), "000858.SZ");
        assert_eq!(deser.bars(), series.bars());
    }
}
