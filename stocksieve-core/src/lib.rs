//! StockSieve Core — decoding, reconciliation, indicators, strategy, scoring.
//!
//! Pure computation over already-materialized inputs:
//! - Domain types (bars, series, canonical records, signals)
//! - Fixed-layout binary `.day` record decoding
//! - Precedence-based multi-source field reconciliation
//! - Rolling technical indicators and breakout rule evaluation
//! - Cross-sectional multi-factor scoring
//! - A-share eligibility classification
//!
//! No I/O beyond byte buffers and strings handed in by the caller; file and
//! directory plumbing lives in `stocksieve-runner`.

pub mod classify;
pub mod decode;
pub mod domain;
pub mod indicators;
pub mod lookup;
pub mod reconcile;
pub mod scoring;
pub mod strategy;
