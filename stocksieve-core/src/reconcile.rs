//! Precedence-based reconciliation of multi-source snapshot records.
//!
//! Sources are ordered by the caller, highest precedence first. For every
//! field independently the merged record takes the first known value in
//! precedence order; a field all sources leave unknown stays unknown. A
//! lower-precedence unknown can never erase a higher-precedence known value,
//! and re-merging a merged set with itself is a no-op.

use std::collections::BTreeMap;

use crate::domain::CanonicalStockRecord;

/// One source's records, keyed by market-qualified code.
pub type SourceSet = BTreeMap<String, CanonicalStockRecord>;

/// Key a flat record list by code. Within one source a later record for the
/// same code wins, matching the upstream accumulation behavior.
pub fn key_by_code(records: impl IntoIterator<Item = CanonicalStockRecord>) -> SourceSet {
    let mut keyed = SourceSet::new();
    for record in records {
        keyed.insert(record.code.clone(), record);
    }
    keyed
}

/// Merge sources field-by-field, first known value wins.
///
/// `sources` is ordered highest precedence first. The result holds one
/// record per code seen in any source.
pub fn reconcile(sources: &[SourceSet]) -> SourceSet {
    let mut merged = SourceSet::new();
    for source in sources {
        for (code, record) in source {
            merged
                .entry(code.clone())
                .and_modify(|existing| existing.fill_missing_from(record))
                .or_insert_with(|| record.clone());
        }
    }
    merged
}

/// Per-field known-value coverage over a record set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    pub total: usize,
    pub name: usize,
    pub industry: usize,
    pub price: usize,
    pub change_percent: usize,
    pub volume: usize,
    pub pe: usize,
    pub market_cap: usize,
}

impl CoverageReport {
    pub fn pct(&self, known: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            known as f64 / self.total as f64 * 100.0
        }
    }
}

/// Count known values per field, for post-merge quality diagnostics.
pub fn coverage_report<'a>(
    records: impl IntoIterator<Item = &'a CanonicalStockRecord>,
) -> CoverageReport {
    let mut report = CoverageReport::default();
    for record in records {
        report.total += 1;
        report.name += usize::from(record.name.is_some());
        report.industry += usize::from(record.industry.is_some());
        report.price += usize::from(record.price.is_some());
        report.change_percent += usize::from(record.change_percent.is_some());
        report.volume += usize::from(record.volume.is_some());
        report.pe += usize::from(record.pe.is_some());
        report.market_cap += usize::from(record.market_cap.is_some());
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, industry: Option<&str>, pe: Option<f64>) -> CanonicalStockRecord {
        let mut r = CanonicalStockRecord::empty(code);
        r.industry = industry.map(String::from);
        r.pe = pe;
        r
    }

    #[test]
    fn higher_precedence_known_value_wins() {
        let high = key_by_code(vec![record("600036.SH", Some("银行"), None)]);
        let low = key_by_code(vec![record("600036.SH", Some("保险"), Some(6.0))]);

        let merged = reconcile(&[high, low]);
        let out = &merged["600036.SH"];
        assert_eq!(out.industry.as_deref(), Some("银行"));
        // pe was unknown upstream, adopted from the lower source.
        assert_eq!(out.pe, Some(6.0));
    }

    #[test]
    fn unknown_in_higher_source_adopts_lower_known_value() {
        // Same pair in the opposite precedence order.
        let high = key_by_code(vec![record("600036.SH", None, None)]);
        let low = key_by_code(vec![record("600036.SH", Some("银行"), None)]);

        let merged = reconcile(&[high, low]);
        assert_eq!(merged["600036.SH"].industry.as_deref(), Some("银行"));
    }

    #[test]
    fn all_unknown_stays_unknown() {
        let a = key_by_code(vec![record("600036.SH", None, None)]);
        let b = key_by_code(vec![record("600036.SH", None, None)]);
        let merged = reconcile(&[a, b]);
        assert_eq!(merged["600036.SH"].industry, None);
    }

    #[test]
    fn merge_is_idempotent() {
        let high = key_by_code(vec![record("600036.SH", Some("银行"), None)]);
        let low = key_by_code(vec![record("600036.SH", None, Some(6.0))]);

        let merged = reconcile(&[high, low]);
        let again = reconcile(&[merged.clone(), merged.clone()]);
        assert_eq!(again, merged);
    }

    #[test]
    fn disjoint_codes_are_all_kept() {
        let a = key_by_code(vec![record("600036.SH", Some("银行"), None)]);
        let b = key_by_code(vec![record("000001.SZ", Some("银行"), None)]);
        let merged = reconcile(&[a, b]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn later_duplicate_within_one_source_wins() {
        let keyed = key_by_code(vec![
            record("600036.SH", Some("保险"), None),
            record("600036.SH", Some("银行"), None),
        ]);
        assert_eq!(keyed["600036.SH"].industry.as_deref(), Some("银行"));
    }

    #[test]
    fn coverage_counts_known_fields() {
        let mut full = record("600036.SH", Some("银行"), Some(6.0));
        full.name = Some("招商银行".into());
        full.price = Some(33.0);
        let sparse = record("000001.SZ", None, None);

        let report = coverage_report([&full, &sparse]);
        assert_eq!(report.total, 2);
        assert_eq!(report.industry, 1);
        assert_eq!(report.pe, 1);
        assert_eq!(report.price, 1);
        assert_eq!(report.pct(report.industry), 50.0);
    }
}
