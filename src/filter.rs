use serde_json::Value;

use crate::dates;
use crate::models::Record;

/// Keeps the records whose date field resolves to a year inside the
/// inclusive window, preserving input order.
pub fn filter_by_year(
    records: &[Record],
    start_year: i32,
    end_year: i32,
    date_field: &str,
) -> Vec<Record> {
    let mut kept = Vec::new();
    let mut unparseable = 0usize;

    for record in records {
        match record_year(record, date_field) {
            Some(year) if start_year <= year && year <= end_year => kept.push(record.clone()),
            Some(_) => {}
            None => unparseable += 1,
        }
    }

    tracing::info!(
        input = records.len(),
        kept = kept.len(),
        unparseable,
        "filtered records to {start_year}-{end_year}"
    );
    kept
}

// A missing field, a non-string value, or an unknown format all exclude the
// record; a bad row never fails the batch.
fn record_year(record: &Record, date_field: &str) -> Option<i32> {
    match record.get(date_field) {
        Some(Value::String(raw)) => dates::extract_year(raw),
        _ => None,
    }
}
