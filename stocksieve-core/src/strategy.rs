//! Breakout rule evaluation and signal ranking.
//!
//! Single-shot, stateless: the rule looks only at the latest augmented bar.
//! All four conditions must hold; otherwise nothing is emitted (which is not
//! an error — most symbols most days produce no signal).

use std::cmp::Ordering;

use crate::domain::{round2, Signal};
use crate::indicators::AugmentedBar;

/// Evaluate the breakout rule on the latest augmented bar.
///
/// Conditions, all required:
/// 1. volume > 2 × VOLUME_MA20 (volume surge)
/// 2. close > UPPER_BAND (above the trailing 20-bar high; the band includes
///    the current bar's own high — see the regression test below, which pins
///    that inherited semantics exactly)
/// 3. MA5 > MA20 > MA60 (strict bullish alignment)
/// 4. close > open (bar closed up)
///
/// Emits a [`Signal`] with all derived values rounded to 2 decimal places,
/// `None` otherwise. An empty row set (insufficient history) emits `None`.
pub fn evaluate_breakout(code: &str, rows: &[AugmentedBar]) -> Option<Signal> {
    let latest = rows.last()?;
    let bar = &latest.bar;

    let volume_surge = bar.volume > latest.volume_ma20 * 2.0;
    let price_breakout = bar.close > latest.upper_band;
    let trend_aligned = latest.ma5 > latest.ma20 && latest.ma20 > latest.ma60;
    let closed_up = bar.close > bar.open;

    if !(volume_surge && price_breakout && trend_aligned && closed_up) {
        return None;
    }

    let volume_ratio = bar.volume / latest.volume_ma20;
    let breakout_strength = (bar.close - latest.upper_band) / latest.upper_band * 100.0;

    Some(Signal {
        code: code.to_string(),
        signal_date: bar.date,
        close_price: bar.close,
        breakout_level: latest.upper_band,
        volume_ratio: round2(volume_ratio),
        breakout_strength: round2(breakout_strength),
        score: round2(volume_ratio + breakout_strength),
    })
}

/// Sort signals by score descending; ties keep their original relative
/// order. Consumers take the full list or truncate to the top entry.
pub fn rank_signals(signals: &mut [Signal]) {
    signals.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
