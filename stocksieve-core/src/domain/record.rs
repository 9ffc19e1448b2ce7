//! CanonicalStockRecord — the reconciled per-symbol snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Legacy feeds use these strings (and bare zeros) to mean "missing".
const UNKNOWN_NAMES: [&str; 2] = ["未知股票", "未知"];
const UNKNOWN_INDUSTRIES: [&str; 2] = ["未知", "未知行业"];

/// Single reconciled representation of a symbol's snapshot attributes.
///
/// `None` is the one missing-value representation in the whole system; a
/// present zero is a legitimate value. Upstream feeds that abuse `0` /
/// `"未知"` as sentinels are mapped through [`sanitize_legacy`] once at the
/// ingestion boundary.
///
/// `code` is market-qualified (e.g. `600519.SH`) and is the primary key of
/// every merge operation.
///
/// [`sanitize_legacy`]: CanonicalStockRecord::sanitize_legacy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalStockRecord {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub price_change: Option<f64>,
    #[serde(default)]
    pub change_percent: Option<f64>,
    #[serde(default)]
    pub pe: Option<f64>,
    #[serde(default)]
    pub pb: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub turnover_rate: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl CanonicalStockRecord {
    /// A record with nothing known but its key.
    pub fn empty(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    /// Map legacy sentinels onto `None`.
    ///
    /// Upstream JSON uses `0` for unknown pe/pb/roe/turnover/price/volume/
    /// amount/market-cap and `"未知"`-style strings for unknown name/industry.
    /// `price_change`/`change_percent` are left alone — zero is a legitimate
    /// flat day.
    pub fn sanitize_legacy(mut self) -> Self {
        fn drop_zero(field: &mut Option<f64>) {
            if *field == Some(0.0) {
                *field = None;
            }
        }
        drop_zero(&mut self.price);
        drop_zero(&mut self.pe);
        drop_zero(&mut self.pb);
        drop_zero(&mut self.roe);
        drop_zero(&mut self.turnover_rate);
        drop_zero(&mut self.volume);
        drop_zero(&mut self.amount);
        drop_zero(&mut self.market_cap);

        if let Some(name) = &self.name {
            if name.is_empty() || UNKNOWN_NAMES.contains(&name.as_str()) {
                self.name = None;
            }
        }
        if let Some(industry) = &self.industry {
            if industry.is_empty() || UNKNOWN_INDUSTRIES.contains(&industry.as_str()) {
                self.industry = None;
            }
        }
        self
    }

    /// Fill every unknown field of `self` from `other`, leaving known fields
    /// untouched. This is the single merge step of precedence-based
    /// reconciliation: applying it source-by-source in precedence order gives
    /// first-known-wins per field.
    pub fn fill_missing_from(&mut self, other: &Self) {
        fn fill<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if dst.is_none() {
                *dst = src.clone();
            }
        }
        fill(&mut self.name, &other.name);
        fill(&mut self.industry, &other.industry);
        fill(&mut self.price, &other.price);
        fill(&mut self.price_change, &other.price_change);
        fill(&mut self.change_percent, &other.change_percent);
        fill(&mut self.pe, &other.pe);
        fill(&mut self.pb, &other.pb);
        fill(&mut self.roe, &other.roe);
        fill(&mut self.turnover_rate, &other.turnover_rate);
        fill(&mut self.volume, &other.volume);
        fill(&mut self.amount, &other.amount);
        fill(&mut self.market_cap, &other.market_cap);
        fill(&mut self.date, &other.date);
    }
}
