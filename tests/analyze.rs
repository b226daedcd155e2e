//! End-to-end checks of the combined report.

use std::fs;
use std::path::PathBuf;

use insight_engines::config::DataConfig;
use insight_engines::domain::Section;
use insight_engines::engines::run_analysis;

fn scratch(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("insight-analyze-{label}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_price_sales(dir: &PathBuf) {
    let mut rows = String::from("price,units\n");
    for i in 0..20 {
        let p = 10.0 + i as f64;
        let u = 5000.0 * p.powf(-1.3);
        rows.push_str(&format!("{p},{u:.2}\n"));
    }
    fs::write(dir.join("price_sales.csv"), rows).unwrap();
}

fn write_marketing(dir: &PathBuf) {
    let mut rows = String::from("date,channel,spend,impressions,clicks,conversions\n");
    for i in 0..30 {
        let spend = 50.0 + 30.0 * i as f64;
        let conv = if spend > 400.0 { 12 } else { 2 };
        rows.push_str(&format!("2024-01-{:02},search,{spend},1000,50,{conv}\n", i % 28 + 1));
    }
    fs::write(dir.join("marketing.csv"), rows).unwrap();
}

fn write_forecast(dir: &PathBuf) {
    let mut rows = String::from("ds,y\n");
    for m in 1..=3 {
        for d in 1..=28 {
            let t = (m - 1) * 28 + d;
            rows.push_str(&format!("2024-{m:02}-{d:02},{:.2}\n", 100.0 + 0.5 * t as f64));
        }
    }
    fs::write(dir.join("forecast.csv"), rows).unwrap();
}

#[test]
fn all_sections_populate_when_every_dataset_is_present() {
    let local = scratch("full");
    write_forecast(&local);
    write_price_sales(&local);
    write_marketing(&local);
    let cfg = DataConfig {
        local_dir: local,
        shared_dir: scratch("full-shared"),
    };

    let report = run_analysis(&cfg);

    match report.forecast {
        Section::Value(f) => assert_eq!(f.forecast.len(), 180),
        Section::Failed { error } => panic!("forecast failed: {error}"),
    }
    match report.elasticity {
        Section::Value(e) => assert!(e.elasticity < 0.0),
        Section::Failed { error } => panic!("elasticity failed: {error}"),
    }
    match report.roi {
        Section::Value(r) => assert!(!r.probability_curve.is_empty()),
        Section::Failed { error } => panic!("roi failed: {error}"),
    }
    match report.simulation {
        Section::Value(s) => assert!(s.profit.p10 <= s.profit.p90),
        Section::Failed { error } => panic!("simulation failed: {error}"),
    }
}

#[test]
fn missing_dataset_fails_only_its_own_section() {
    let local = scratch("partial");
    write_price_sales(&local);
    write_marketing(&local);
    // No forecast.csv anywhere.
    let cfg = DataConfig {
        local_dir: local,
        shared_dir: scratch("partial-shared"),
    };

    let report = run_analysis(&cfg);

    assert!(report.forecast.is_failed());
    match report.forecast {
        Section::Failed { error } => assert!(!error.is_empty()),
        Section::Value(_) => panic!("forecast should have failed without its dataset"),
    }
    assert!(!report.elasticity.is_failed());
    assert!(!report.roi.is_failed());
    assert!(!report.simulation.is_failed());
}

#[test]
fn report_serializes_failed_sections_as_error_objects() {
    let cfg = DataConfig {
        local_dir: scratch("empty"),
        shared_dir: scratch("empty-shared"),
    };

    let report = run_analysis(&cfg);
    let json = serde_json::to_value(&report).unwrap();

    for key in ["forecast", "elasticity", "roi"] {
        let section = &json[key];
        assert!(
            section.get("error").and_then(|e| e.as_str()).is_some(),
            "{key} should carry an error message, got {section}"
        );
    }
    // Simulation falls back to its built-in baseline and still succeeds.
    assert!(json["simulation"].get("error").is_none());
}
