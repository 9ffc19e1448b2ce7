//! Integration: a vendor-style data directory scanned end to end.

use std::fs;

use stocksieve_core::lookup::SymbolTable;
use stocksieve_core::scoring::select_top;
use stocksieve_runner::{
    decode_snapshots, load_day_dir, run_breakout_scan, scan_report_json, write_artifact,
};

/// Encode one 32-byte feed record.
fn record(date: i32, open: f64, high: f64, low: f64, close: f64, volume: i32, prev: f64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32);
    buf.extend_from_slice(&date.to_le_bytes());
    for price in [open, high, low, close] {
        buf.extend_from_slice(&((price * 1000.0).round() as i32).to_le_bytes());
    }
    buf.extend_from_slice(&((close * volume as f64) as f32).to_le_bytes());
    buf.extend_from_slice(&volume.to_le_bytes());
    buf.extend_from_slice(&((prev * 1000.0).round() as i32).to_le_bytes());
    buf
}

fn tape(n: usize, breakout_last: bool) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut prev = 0.0;
    for i in 0..n {
        let date = 20230000 + (i / 28 + 1) as i32 * 100 + (i % 28 + 1) as i32;
        let base = 10.0 + i as f64 * 0.05;
        let (open, high, low, close, volume) = if breakout_last && i == n - 1 {
            // Final bar closes above its own high; the decode path takes the
            // feed as-is and the inclusive band makes this the only shape
            // that can fire.
            (base, base + 1.0, base - 0.1, base + 2.0, 5000)
        } else {
            (base, base + 0.2, base - 0.2, base + 0.1, 1000)
        };
        buf.extend(record(date, open, high, low, close, volume, prev));
        prev = close;
    }
    buf
}

#[test]
fn vendor_directory_scan_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let sh = dir.path().join("sh/lday");
    let sz = dir.path().join("sz/lday");
    fs::create_dir_all(&sh).unwrap();
    fs::create_dir_all(&sz).unwrap();

    fs::write(sh.join("sh600519.day"), tape(70, true)).unwrap();
    fs::write(sz.join("sz000858.day"), tape(70, false)).unwrap();
    fs::write(sz.join("sz000002.day"), tape(20, false)).unwrap(); // too short
    fs::write(sh.join("sh601318.day"), Vec::<u8>::new()).unwrap(); // empty

    let files = load_day_dir(dir.path()).unwrap();
    assert_eq!(files.len(), 4);

    let report = run_breakout_scan(&files, None);
    assert_eq!(report.scanned, 4);
    assert_eq!(report.signals.len(), 1);
    assert_eq!(report.signals[0].code, "600519.SH");
    assert_eq!(report.skipped.len(), 2);

    // The report serializes and lands on disk for the serving layer.
    let json = scan_report_json(&report).unwrap();
    let out = dir.path().join("results/scan.json");
    write_artifact(&out, &json).unwrap();
    assert!(out.exists());

    // Snapshot path over the same directory still yields exactly one pick.
    let records = decode_snapshots(&files, &SymbolTable::default_cn());
    assert_eq!(records.len(), 3); // empty buffer excluded
    let top = select_top(&records).unwrap();
    assert_eq!(top.record.code, "600519.SH");
}
