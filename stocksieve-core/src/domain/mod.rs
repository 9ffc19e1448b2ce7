//! Domain types — bars, series, canonical records, signals.

pub mod bar;
pub mod record;
pub mod signal;

pub use bar::{RawBar, TimeSeries};
pub use record::CanonicalStockRecord;
pub use signal::Signal;

/// Round to 2 decimal places.
///
/// Part of the output contract for signals and decoded snapshots.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_basics() {
        assert_eq!(round2(2.345), 2.35);
        assert_eq!(round2(-2.345), -2.35);
        assert_eq!(round2(10.0), 10.0);
        assert_eq!(round2(0.004), 0.0);
    }
}
