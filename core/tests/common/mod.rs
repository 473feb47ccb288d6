//! Shared claim fixtures for integration tests.
#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use subsiguard_core::record::{Dataset, SubsidyRecord};

/// A quiet claim: unique ids, unique distributor and date, modest numbers.
pub fn claim(n: usize) -> SubsidyRecord {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
    SubsidyRecord {
        beneficiary_id: format!("BEN-{n:05}"),
        name: format!("Beneficiary {n}"),
        aadhaar: format!("{:012}", 400_000_000_000u64 + n as u64),
        income: Some(60_000.0 + n as f64 * 1_000.0),
        location_state: "Bihar".to_string(),
        subsidy_type: "LPG".to_string(),
        amount: Some(500.0 + n as f64),
        claim_date: base.checked_add_days(Days::new(n as u64)),
        distributor_id: format!("DIST-{n:03}"),
    }
}

pub fn claims(count: usize) -> Vec<SubsidyRecord> {
    (0..count).map(claim).collect()
}

pub fn dataset(records: Vec<SubsidyRecord>) -> Dataset {
    Dataset::new(records)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
