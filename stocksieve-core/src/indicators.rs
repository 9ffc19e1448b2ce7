//! Rolling technical indicators over a bar history.
//!
//! Windows are trailing and inclusive of the current bar. A row is emitted
//! only when every indicator has a full window, so the first augmented row
//! sits at index 59 of the raw history (MA60 is the widest window) and a
//! symbol needs at least 60 raw bars before any row exists.

use serde::{Deserialize, Serialize};

use crate::domain::{RawBar, TimeSeries};

/// Widest trailing window; also the minimum usable history length.
pub const MIN_HISTORY_BARS: usize = 60;

const MA_SHORT: usize = 5;
const MA_MID: usize = 20;
const MA_LONG: usize = 60;
const BAND_WINDOW: usize = 20;

/// One bar augmented with its rolling statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedBar {
    pub bar: RawBar,
    pub ma5: f64,
    pub ma20: f64,
    pub ma60: f64,
    pub volume_ma5: f64,
    pub volume_ma20: f64,
    /// Trailing 20-bar max of high, inclusive of this bar's own high.
    pub upper_band: f64,
    /// Trailing 20-bar min of low, inclusive of this bar's own low.
    pub lower_band: f64,
    /// Fractional close-over-previous-bar-close delta.
    pub change: f64,
}

fn mean(values: impl Iterator<Item = f64>, window: usize) -> f64 {
    values.sum::<f64>() / window as f64
}

/// Augment a series with rolling indicators, dropping warm-up rows.
///
/// The ordering invariant of [`TimeSeries`] must hold (it does by
/// construction); windows index backwards from each bar.
pub fn augment(series: &TimeSeries) -> Vec<AugmentedBar> {
    let bars = series.bars();
    if bars.len() < MIN_HISTORY_BARS {
        return Vec::new();
    }

    let mut rows = Vec::with_capacity(bars.len() - MIN_HISTORY_BARS + 1);
    for t in (MIN_HISTORY_BARS - 1)..bars.len() {
        let window = |n: usize| &bars[t + 1 - n..=t];

        let upper_band = window(BAND_WINDOW)
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);
        let lower_band = window(BAND_WINDOW)
            .iter()
            .map(|b| b.low)
            .fold(f64::INFINITY, f64::min);

        rows.push(AugmentedBar {
            bar: bars[t].clone(),
            ma5: mean(window(MA_SHORT).iter().map(|b| b.close), MA_SHORT),
            ma20: mean(window(MA_MID).iter().map(|b| b.close), MA_MID),
            ma60: mean(window(MA_LONG).iter().map(|b| b.close), MA_LONG),
            volume_ma5: mean(window(MA_SHORT).iter().map(|b| b.volume), MA_SHORT),
            volume_ma20: mean(window(MA_MID).iter().map(|b| b.volume), MA_MID),
            upper_band,
            lower_band,
            change: bars[t].close / bars[t - 1].close - 1.0,
        });
    }
    rows
}
