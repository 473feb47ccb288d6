//! Row validation and coercion: loosely typed rows in, a Dataset out.
//!
//! Only a column missing from most rows is fatal. Everything else
//! (bad numbers, odd dates, numeric identity numbers) is absorbed here
//! so the detection core never sees a malformed value.

use crate::{
    error::{GuardError, GuardResult},
    record::{Dataset, SubsidyRecord},
};
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// One uploaded row, as parsed from JSON.
pub type RawRow = Map<String, Value>;

/// Columns every upload must carry. `name` is optional.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "beneficiary_id",
    "aadhaar",
    "income",
    "location_state",
    "subsidy_type",
    "amount",
    "claim_date",
    "distributor_id",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Validate the schema of `rows` and coerce each row into a record.
pub fn dataset_from_rows(rows: &[RawRow]) -> GuardResult<Dataset> {
    check_schema(rows)?;

    let mut degraded = 0usize;
    let records: Vec<SubsidyRecord> = rows
        .iter()
        .map(|row| {
            let record = coerce_row(row);
            if is_degraded(row, &record) {
                degraded += 1;
            }
            record
        })
        .collect();

    if degraded > 0 {
        log::warn!(
            "{degraded} of {} rows had missing or invalid values; they are excluded from the aggregates they would poison",
            rows.len()
        );
    }
    Ok(Dataset::new(records))
}

fn check_schema(rows: &[RawRow]) -> GuardResult<()> {
    let total = rows.len();
    for field in REQUIRED_FIELDS {
        let missing = rows
            .iter()
            .filter(|row| matches!(row.get(field), None | Some(Value::Null)))
            .count();
        if missing * 2 > total {
            return Err(GuardError::Schema {
                field,
                missing,
                total,
            });
        }
    }
    Ok(())
}

fn coerce_row(row: &RawRow) -> SubsidyRecord {
    SubsidyRecord {
        beneficiary_id: text(row.get("beneficiary_id")),
        name: text(row.get("name")),
        aadhaar: text(row.get("aadhaar")),
        income: non_negative(row.get("income")),
        location_state: text(row.get("location_state")),
        subsidy_type: text(row.get("subsidy_type")),
        amount: non_negative(row.get("amount")),
        claim_date: date(row.get("claim_date")),
        distributor_id: text(row.get("distributor_id")),
    }
}

fn is_degraded(row: &RawRow, record: &SubsidyRecord) -> bool {
    !record.has_numeric_features()
        || record.claim_date.is_none()
        || REQUIRED_FIELDS
            .iter()
            .any(|f| matches!(row.get(*f), None | Some(Value::Null)))
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn non_negative(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }?;
    (parsed.is_finite() && parsed >= 0.0).then_some(parsed)
}

fn date(value: Option<&Value>) -> Option<NaiveDate> {
    let raw = match value? {
        Value::String(s) => s.trim(),
        _ => return None,
    };
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    // RFC 3339 timestamps: keep the calendar date.
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RawRow {
        value.as_object().cloned().expect("object literal")
    }

    fn full_row() -> Value {
        json!({
            "beneficiary_id": "BEN-001",
            "name": "Asha Devi",
            "aadhaar": "123456789012",
            "income": 85000,
            "location_state": "Bihar",
            "subsidy_type": "LPG",
            "amount": 450.5,
            "claim_date": "2024-03-01",
            "distributor_id": "DIST-01"
        })
    }

    #[test]
    fn coerces_a_clean_row() {
        let ds = dataset_from_rows(&[row(full_row())]).unwrap();
        let r = &ds.records()[0];
        assert_eq!(r.beneficiary_id, "BEN-001");
        assert_eq!(r.income, Some(85000.0));
        assert_eq!(r.amount, Some(450.5));
        assert_eq!(r.claim_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn numeric_aadhaar_is_stringified() {
        let mut v = full_row();
        v["aadhaar"] = json!(987654321098u64);
        let ds = dataset_from_rows(&[row(v)]).unwrap();
        assert_eq!(ds.records()[0].aadhaar, "987654321098");
    }

    #[test]
    fn bad_numbers_become_none_not_zero() {
        let mut v = full_row();
        v["income"] = json!("n/a");
        v["amount"] = json!(-12.0);
        let ds = dataset_from_rows(&[row(v)]).unwrap();
        assert_eq!(ds.records()[0].income, None);
        assert_eq!(ds.records()[0].amount, None);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let mut v = full_row();
        v["income"] = json!(" 2,60,000 ");
        let ds = dataset_from_rows(&[row(v)]).unwrap();
        assert_eq!(ds.records()[0].income, Some(260000.0));
    }

    #[test]
    fn alternate_date_formats_parse() {
        let mut a = full_row();
        a["claim_date"] = json!("05/02/2024");
        let mut b = full_row();
        b["claim_date"] = json!("2024-02-05T10:30:00Z");
        let mut c = full_row();
        c["claim_date"] = json!("yesterday");
        let ds = dataset_from_rows(&[row(a), row(b), row(c)]).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 2, 5);
        assert_eq!(ds.records()[0].claim_date, expected);
        assert_eq!(ds.records()[1].claim_date, expected);
        assert_eq!(ds.records()[2].claim_date, None);
    }

    #[test]
    fn column_missing_from_most_rows_is_a_schema_error() {
        let mut v = full_row();
        v.as_object_mut().unwrap().remove("amount");
        let rows = vec![row(v.clone()), row(v), row(full_row())];
        match dataset_from_rows(&rows) {
            Err(GuardError::Schema { field, missing, total }) => {
                assert_eq!(field, "amount");
                assert_eq!(missing, 2);
                assert_eq!(total, 3);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn column_missing_from_a_minority_is_absorbed() {
        let mut v = full_row();
        v.as_object_mut().unwrap().remove("amount");
        let rows = vec![row(v), row(full_row()), row(full_row())];
        let ds = dataset_from_rows(&rows).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records()[0].amount, None);
    }

    #[test]
    fn empty_upload_is_an_empty_dataset() {
        let ds = dataset_from_rows(&[]).unwrap();
        assert!(ds.is_empty());
    }
}
