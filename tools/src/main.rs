//! subsiguard-runner: headless fraud analysis over a JSON claims file.
//!
//! Usage:
//!   subsiguard-runner --input claims.json
//!   subsiguard-runner --input claims.json --config data/detection.json --db runs.db
//!   subsiguard-runner --input claims.json --seed 7 --output result.json

use anyhow::{Context, Result};
use std::env;
use subsiguard_core::{
    config::DetectionConfig,
    engine::GuardEngine,
    ingest::RawRow,
    result::AnalysisResult,
    store::AnalysisStore,
};

const FLAGGED_SHOWN: usize = 10;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let input = string_arg(&args, "--input")
        .context("--input <claims.json> is required")?;
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let output = string_arg(&args, "--output");

    let mut config = match string_arg(&args, "--config") {
        Some(path) => DetectionConfig::load(path)?,
        None => DetectionConfig::default(),
    };
    config.random_seed = parse_arg(&args, "--seed", config.random_seed);

    println!("SubsiGuard - subsiguard-runner");
    println!("  input:     {input}");
    println!("  db:        {db}");
    println!("  seed:      {}", config.random_seed);
    println!();

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Cannot read {input}"))?;
    let rows: Vec<RawRow> = serde_json::from_str(&content)
        .with_context(|| format!("{input} must be a JSON array of objects"))?;

    let store = AnalysisStore::open(db)?;
    store.migrate()?;
    let engine = GuardEngine::new(store, config);

    let receipt = engine.upload(&rows)?;
    let result = engine.analyze(&receipt.file_id)?;
    print_summary(&engine, &result);

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&result)?)
            .with_context(|| format!("Cannot write {path}"))?;
        log::info!("result written to {path}");
    }
    Ok(())
}

fn print_summary(engine: &GuardEngine, result: &AnalysisResult) {
    let s = &result.summary;
    println!("=== ANALYSIS SUMMARY ===");
    println!("  file_id:          {}", result.file_id);
    println!("  records:          {}", s.total_records);
    println!("  flagged:          {}", s.flagged_count);
    println!("  leakage:          {:.2}%", s.leakage_percent);
    println!("  amount leakage:   {:.2}%", s.amount_leakage_percent);
    println!("  flagged amount:   ₹{:.0} of ₹{:.0}", s.flagged_amount, s.total_amount);
    println!("  model outliers:   {}", s.anomaly_outliers);

    println!();
    println!("=== HIGH-RISK STATES ===");
    if s.high_risk_states.is_empty() {
        println!("  (none)");
    }
    for state in &s.high_risk_states {
        println!(
            "  {:<20} {:>5} flagged | ₹{:.0}",
            state.state, state.flagged_count, state.flagged_amount
        );
    }

    println!();
    println!("=== FLAGGED RECORDS (first {FLAGGED_SHOWN}) ===");
    for flagged in result.flagged_records.iter().take(FLAGGED_SHOWN) {
        println!(
            "  {} | score {:.2} | {}",
            flagged.record.beneficiary_id,
            flagged.verdict.fraud_score,
            flagged.verdict.describe(&flagged.record, &engine.config).join("; ")
        );
    }
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    string_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
