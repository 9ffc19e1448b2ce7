//! Snapshot-path orchestration — load, sanitize, reconcile, select.

use std::path::Path;

use anyhow::{Context, Result};

use stocksieve_core::domain::CanonicalStockRecord;
use stocksieve_core::reconcile::{key_by_code, reconcile, CoverageReport};

/// Load a snapshot JSON array and map legacy sentinels to unknown.
///
/// Accepts both the canonical form (nulls / absent fields for unknown) and
/// the legacy form (`0` / `"未知"` sentinels).
pub fn load_snapshot(path: &Path) -> Result<Vec<CanonicalStockRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read snapshot {}", path.display()))?;
    let records: Vec<CanonicalStockRecord> = serde_json::from_str(&content)
        .with_context(|| format!("parse snapshot {}", path.display()))?;
    Ok(records
        .into_iter()
        .map(CanonicalStockRecord::sanitize_legacy)
        .collect())
}

/// Merge snapshot sources in precedence order (highest first) back into a
/// flat record list, with a coverage report for diagnostics.
///
/// Typical ordering: scraped fundamentals, then feed-derived partials, then
/// a static default map as the last fallback.
pub fn merge_sources(
    sources: Vec<Vec<CanonicalStockRecord>>,
) -> (Vec<CanonicalStockRecord>, CoverageReport) {
    let keyed: Vec<_> = sources.into_iter().map(key_by_code).collect();
    let merged: Vec<CanonicalStockRecord> = reconcile(&keyed).into_values().collect();
    let report = stocksieve_core::reconcile::coverage_report(merged.iter());
    tracing::info!(
        records = report.total,
        industry_known = report.industry,
        price_known = report.price,
        "sources reconciled"
    );
    (merged, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_and_sanitizes_legacy_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock_data.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"[
                {{"code":"600519.SH","name":"贵州茅台","industry":"酿酒行业",
                  "price":1688.0,"priceChange":12.5,"changePercent":0.75,
                  "pe":30.2,"roe":24.0,"turnoverRate":0.3,"volume":31415.0,
                  "amount":5.2e9,"marketCap":21000.0,"pb":8.1}},
                {{"code":"000001.SZ","name":"000001.SZ","industry":"未知行业",
                  "price":0,"pe":0,"roe":0}}
            ]"#
        )
        .unwrap();

        let records = load_snapshot(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pe, Some(30.2));
        // Legacy sentinels mapped to unknown.
        assert_eq!(records[1].industry, None);
        assert_eq!(records[1].price, None);
        assert_eq!(records[1].pe, None);
    }

    #[test]
    fn merge_sources_applies_precedence() {
        let mut scraped = CanonicalStockRecord::empty("600519.SH");
        scraped.pe = Some(30.2);
        scraped.industry = Some("酿酒行业".into());

        let mut feed = CanonicalStockRecord::empty("600519.SH");
        feed.price = Some(1688.0);
        feed.industry = Some("白酒".into()); // loses to the scraped value

        let (merged, report) = merge_sources(vec![vec![scraped], vec![feed]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].industry.as_deref(), Some("酿酒行业"));
        assert_eq!(merged[0].price, Some(1688.0));
        assert_eq!(report.total, 1);
        assert_eq!(report.industry, 1);
    }
}
