//! Cross-sectional multi-factor scoring.
//!
//! Normalizes each factor over the eligible peer set (min-max), combines a
//! technical and a fundamental composite, and picks the top candidate. When
//! nothing passes the validity filter, falls back to a raw weighted sort of
//! the unfiltered input so a non-empty universe always yields a pick.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::CanonicalStockRecord;

/// Factor weights for the raw fallback ranking.
const FALLBACK_WEIGHTS: (f64, f64, f64) = (0.4, 0.3, 0.3);

/// A record plus its ephemeral composite score.
///
/// Recomputed on every run; sub-scores are absent on the fallback path where
/// no normalization happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(flatten)]
    pub record: CanonicalStockRecord,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundamental: Option<f64>,
}

/// Does the record carry everything the scoring model reads?
///
/// Name and industry known; price, pe, roe, market cap, volume, turnover
/// rate and pb all present and strictly positive; price change present (any
/// sign — a flat or down day is valid input).
pub fn is_scorable(record: &CanonicalStockRecord) -> bool {
    fn positive(field: Option<f64>) -> bool {
        field.is_some_and(|v| v > 0.0)
    }
    record.name.is_some()
        && record.industry.is_some()
        && positive(record.price)
        && positive(record.pe)
        && positive(record.roe)
        && positive(record.market_cap)
        && positive(record.volume)
        && positive(record.turnover_rate)
        && positive(record.pb)
        && record.price_change.is_some()
}

/// Min-max normalize to [0, 1].
///
/// A degenerate range (min == max, including a singleton set) yields 0.0 for
/// every entry — never a division error.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let (min, max) = values.iter().fold((first, first), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    let range = max - min;
    if range == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / range).collect()
}

/// Score an eligible set. Caller guarantees every record passes
/// [`is_scorable`]; order is preserved.
fn score_eligible(records: &[&CanonicalStockRecord]) -> Vec<ScoreRecord> {
    fn column(records: &[&CanonicalStockRecord], f: impl Fn(&CanonicalStockRecord) -> f64) -> Vec<f64> {
        records.iter().map(|r| f(r)).collect()
    }

    let price_changes = column(records, |r| r.price_change.unwrap_or(0.0));
    let turnovers = column(records, |r| r.turnover_rate.unwrap_or(0.0));
    // Volume relative to market cap, so small caps aren't drowned out.
    let volume_ratios = column(records, |r| {
        r.volume.unwrap_or(0.0) / r.market_cap.unwrap_or(1.0)
    });
    let pes = column(records, |r| r.pe.unwrap_or(0.0));
    let roes = column(records, |r| r.roe.unwrap_or(0.0));

    let norm_price = normalize(&price_changes);
    let norm_turnover = normalize(&turnovers);
    let norm_volume = normalize(&volume_ratios);
    let norm_pe = normalize(&pes);
    let norm_roe = normalize(&roes);

    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let technical =
                0.4 * norm_price[i] + 0.3 * norm_turnover[i] + 0.3 * norm_volume[i];
            // Low PE scores high.
            let fundamental = 0.4 * (1.0 - norm_pe[i]) + 0.6 * norm_roe[i];
            ScoreRecord {
                record: (*record).clone(),
                score: 0.7 * technical + 0.3 * fundamental,
                technical: Some(technical),
                fundamental: Some(fundamental),
            }
        })
        .collect()
}

/// Raw ranking key used when nothing is scorable: missing numerics read as 0.
fn fallback_key(record: &CanonicalStockRecord) -> f64 {
    let (w_change, w_turnover, w_volume) = FALLBACK_WEIGHTS;
    w_change * record.price_change.unwrap_or(0.0)
        + w_turnover * record.turnover_rate.unwrap_or(0.0)
        + w_volume * record.volume.unwrap_or(0.0)
}

fn take_max(scored: Vec<ScoreRecord>) -> Option<ScoreRecord> {
    // Strict comparison keeps the earliest of tied maxima.
    scored.into_iter().fold(None, |best, candidate| match best {
        Some(b) if candidate.score <= b.score => Some(b),
        _ => Some(candidate),
    })
}

/// Pick the single top candidate from a cross-sectional snapshot.
///
/// Empty input returns `None`. An input with no scorable record falls back
/// to the raw weighted sort of the *unfiltered* list; the fallback pick
/// exposes the raw ranking key as its score with no sub-scores.
pub fn select_top(records: &[CanonicalStockRecord]) -> Option<ScoreRecord> {
    if records.is_empty() {
        return None;
    }

    let eligible: Vec<&CanonicalStockRecord> = records.iter().filter(|r| is_scorable(r)).collect();
    if eligible.is_empty() {
        tracing::debug!(
            total = records.len(),
            "no scorable records, ranking the raw universe"
        );
        return take_max(
            records
                .iter()
                .map(|record| ScoreRecord {
                    record: record.clone(),
                    score: fallback_key(record),
                    technical: None,
                    fundamental: None,
                })
                .collect(),
        );
    }

    take_max(score_eligible(&eligible))
}

/// The n best scorable candidates, best first.
///
/// Unlike [`select_top`] there is no fallback: with nothing scorable the
/// result is empty.
pub fn select_top_n(records: &[CanonicalStockRecord], n: usize) -> Vec<ScoreRecord> {
    let eligible: Vec<&CanonicalStockRecord> = records.iter().filter(|r| is_scorable(r)).collect();
    let mut scored = score_eligible(&eligible);
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(n);
    scored
}

/// Metrics the IQR fence inspects, in application order.
fn outlier_metrics() -> [fn(&CanonicalStockRecord) -> f64; 5] {
    [
        |r| r.price_change.unwrap_or(0.0),
        |r| r.pe.unwrap_or(0.0),
        |r| r.roe.unwrap_or(0.0),
        |r| r.turnover_rate.unwrap_or(0.0),
        |r| r.volume.unwrap_or(0.0),
    ]
}

/// Drop records outside the 1.5×IQR fence, metric by metric.
///
/// Quartiles use the floor-index convention over the sorted values. Meant
/// for an already-scorable set; survivors keep their input order.
pub fn remove_outliers(records: &[CanonicalStockRecord]) -> Vec<CanonicalStockRecord> {
    let mut kept: Vec<CanonicalStockRecord> = records.to_vec();
    for metric in outlier_metrics() {
        if kept.is_empty() {
            break;
        }
        let mut values: Vec<f64> = kept.iter().map(metric).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let q1 = values[values.len() / 4];
        let q3 = values[values.len() * 3 / 4];
        let iqr = q3 - q1;
        let lower = q1 - 1.5 * iqr;
        let upper = q3 + 1.5 * iqr;
        kept.retain(|r| {
            let v = metric(r);
            v >= lower && v <= upper
        });
    }
    kept
}

/// Industry-diversified portfolio: the best `per_industry` records of each
/// industry by the technical composite alone, combined and sorted by score.
///
/// Normalization factors come from the whole eligible set, not per group, so
/// scores stay comparable across industries.
pub fn select_diversified(
    records: &[CanonicalStockRecord],
    per_industry: usize,
) -> Vec<ScoreRecord> {
    let eligible: Vec<&CanonicalStockRecord> = records.iter().filter(|r| is_scorable(r)).collect();
    let scored = score_eligible(&eligible);

    let mut by_industry: BTreeMap<String, Vec<ScoreRecord>> = BTreeMap::new();
    for mut entry in scored {
        // Rank within the industry on the technical component only.
        entry.score = entry.technical.unwrap_or(0.0);
        let industry = entry
            .record
            .industry
            .clone()
            .unwrap_or_default();
        by_industry.entry(industry).or_default().push(entry);
    }

    let mut portfolio = Vec::new();
    for (_, mut group) in by_industry {
        group.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        group.truncate(per_industry);
        portfolio.extend(group);
    }
    portfolio.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    portfolio
}

/// Overall risk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Rule-based risk summary for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: f64,
    pub factors: Vec<String>,
}

/// Apply the risk rule table.
///
/// Unknown fields simply trip no rules; the assessment never fails.
pub fn assess_risk(record: &CanonicalStockRecord) -> RiskAssessment {
    let pe = record.pe.unwrap_or(0.0);
    let rules: [(bool, f64, &str); 7] = [
        (pe > 50.0, 1.0, "high PE"),
        (pe > 0.0 && pe < 5.0, 0.5, "anomalously low PE"),
        (record.pb.unwrap_or(0.0) > 5.0, 0.8, "high PB"),
        (
            record.price_change.unwrap_or(0.0).abs() > 10.0,
            1.2,
            "violent price swing",
        ),
        (
            record.turnover_rate.unwrap_or(0.0) > 10.0,
            0.5,
            "high turnover",
        ),
        (
            record.market_cap.is_some_and(|v| v < 50.0),
            0.3,
            "small-cap",
        ),
        (
            record.roe.is_some_and(|v| v < 5.0),
            0.5,
            "weak profitability",
        ),
    ];

    let mut score = 0.0;
    let mut factors = Vec::new();
    for (hit, weight, label) in rules {
        if hit {
            score += weight;
            factors.push(label.to_string());
        }
    }

    let level = if score > 3.0 {
        RiskLevel::High
    } else if score < 1.5 {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    };
    RiskAssessment {
        level,
        score,
        factors,
    }
}
