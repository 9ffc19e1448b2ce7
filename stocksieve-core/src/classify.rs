//! A-share eligibility classification.
//!
//! Decides whether a (code, name, industry) tuple is a tradable A-share or
//! one of the fund/index/bond instruments that carry A-share-like codes.

use crate::domain::CanonicalStockRecord;

/// Industry keywords that mark fund/index/bond instruments.
const NON_A_SHARE_KEYWORDS: [&str; 4] = ["ETF", "指数", "基金", "债券"];

/// Is this tuple an eligible A-share?
///
/// The code must be one of:
/// - `600xxx.SH` / `601xxx.SH` / `603xxx.SH` (Shanghai main board / STAR)
/// - `000xxx.SZ` / `001xxx.SZ` / `002xxx.SZ` (Shenzhen main board / SME)
/// - `300xxx.SZ` (ChiNext)
///
/// A matching code is still rejected when the display name equals the code
/// verbatim (placeholder data) or the industry contains any fund/index/bond
/// keyword. Malformed input simply classifies as ineligible — there is no
/// error path.
pub fn is_eligible_a_share(code: &str, name: &str, industry: &str) -> bool {
    if !matches_a_share_code(code) {
        return false;
    }
    if name.is_empty() || name == code {
        return false;
    }
    !NON_A_SHARE_KEYWORDS
        .iter()
        .any(|keyword| industry.contains(keyword))
}

fn matches_a_share_code(code: &str) -> bool {
    let digits = if let Some(stem) = code.strip_suffix(".SH") {
        if !stem.starts_with("600") && !stem.starts_with("601") && !stem.starts_with("603") {
            return false;
        }
        stem
    } else if let Some(stem) = code.strip_suffix(".SZ") {
        if !stem.starts_with("000")
            && !stem.starts_with("001")
            && !stem.starts_with("002")
            && !stem.starts_with("300")
        {
            return false;
        }
        stem
    } else {
        return false;
    };
    digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Counts from one [`filter_a_shares`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterReport {
    pub total: usize,
    pub kept: usize,
    pub dropped: usize,
}

/// Keep only eligible A-share records.
///
/// Unknown name/industry classify as ineligible (the classifier sees an
/// empty string, which never passes). Original relative order is preserved.
pub fn filter_a_shares(
    records: impl IntoIterator<Item = CanonicalStockRecord>,
) -> (Vec<CanonicalStockRecord>, FilterReport) {
    let mut kept = Vec::new();
    let mut total = 0usize;
    for record in records {
        total += 1;
        let eligible = is_eligible_a_share(
            &record.code,
            record.name.as_deref().unwrap_or(""),
            record.industry.as_deref().unwrap_or(""),
        );
        if eligible {
            kept.push(record);
        } else {
            tracing::debug!(code = %record.code, "dropped non-A-share record");
        }
    }
    let report = FilterReport {
        total,
        kept: kept.len(),
        dropped: total - kept.len(),
    };
    (kept, report)
}
