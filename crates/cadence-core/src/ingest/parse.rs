use serde::Deserialize;
use serde_json::json;

use crate::detect::dates::parse_transaction_date;
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct IngestRow {
    #[serde(default)]
    pub txn_id: Option<String>,
    pub account_id: String,
    pub posted_at: String,
    pub amount: f64,
    pub description: String,
    #[serde(default)]
    pub merchant: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    JsonArray,
    Csv,
}

impl SourceFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JsonArray => "json_array",
            Self::Csv => "csv",
        }
    }
}

/// Sniffs the payload shape: a JSON array if the first non-whitespace
/// byte is `[`, CSV otherwise.
pub fn detect_format(text: &str) -> SourceFormat {
    if text.trim_start().starts_with('[') {
        return SourceFormat::JsonArray;
    }
    SourceFormat::Csv
}

pub fn parse_rows(text: &str) -> CoreResult<Vec<IngestRow>> {
    match detect_format(text) {
        SourceFormat::JsonArray => parse_json_rows(text),
        SourceFormat::Csv => parse_csv_rows(text),
    }
}

/// Validates parsed rows and returns the issues found, one entry per
/// offending field, with 1-based row numbers for human-readable reports.
pub fn validate_rows(rows: &[IngestRow]) -> Vec<serde_json::Value> {
    let mut issues = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        if row.account_id.trim().is_empty() {
            issues.push(issue(row_number, "account_id", "must not be empty"));
        }
        if parse_transaction_date(&row.posted_at).is_none() {
            issues.push(issue(
                row_number,
                "posted_at",
                "must be a valid YYYY-MM-DD calendar date",
            ));
        }
        if !row.amount.is_finite() {
            issues.push(issue(row_number, "amount", "must be a finite number"));
        }
        if row.description.trim().is_empty() {
            issues.push(issue(row_number, "description", "must not be empty"));
        }
    }
    issues
}

fn parse_json_rows(text: &str) -> CoreResult<Vec<IngestRow>> {
    serde_json::from_str::<Vec<IngestRow>>(text).map_err(|error| {
        CoreError::ingest_invalid_format(
            &format!("Could not parse JSON array of transactions: {error}"),
            SourceFormat::JsonArray.as_str(),
        )
    })
}

fn parse_csv_rows(text: &str) -> CoreResult<Vec<IngestRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.deserialize::<IngestRow>() {
        let row = record.map_err(|error| {
            CoreError::ingest_invalid_format(
                &format!("Could not parse CSV transactions: {error}"),
                SourceFormat::Csv.as_str(),
            )
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn issue(row_number: usize, field: &str, message: &str) -> serde_json::Value {
    json!({
        "row": row_number,
        "field": field,
        "message": message,
    })
}
