//! Signal — an immutable breakout event for one symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Emitted only when every breakout condition holds on the latest bar.
///
/// Numeric fields are rounded to 2 decimal places at construction; the
/// rounding is part of the output contract and must stay reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub code: String,
    pub signal_date: NaiveDate,
    pub close_price: f64,
    pub breakout_level: f64,
    pub volume_ratio: f64,
    pub breakout_strength: f64,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_contract_names() {
        let signal = Signal {
            code: "600519.SH".into(),
            signal_date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            close_price: 110.0,
            breakout_level: 100.0,
            volume_ratio: 2.5,
            breakout_strength: 10.0,
            score: 12.5,
        };
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["signalDate"], "2024-05-17");
        assert_eq!(json["closePrice"], 110.0);
        assert_eq!(json["breakoutLevel"], 100.0);
        assert_eq!(json["volumeRatio"], 2.5);
        assert_eq!(json["breakoutStrength"], 10.0);
        assert_eq!(json["score"], 12.5);
    }
}
