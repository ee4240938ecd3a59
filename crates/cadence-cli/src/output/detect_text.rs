use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_detect(data: &Value) -> io::Result<String> {
    let candidates = data
        .get("candidates")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("detect output requires candidates"))?;

    let scanned = data
        .get("transactions_scanned")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    if scanned == 0 {
        return Ok([
            "No transactions to scan.",
            "",
            "Run `cadence ingest <path> --space <space-id>` first, then detect again.",
        ]
        .join("\n"));
    }

    let mut lines = vec![detect_heading(data, candidates.len()), String::new()];

    if candidates.is_empty() {
        lines.push("No recurring patterns found in the scanned range.".to_string());
    } else {
        lines.push("Candidates:".to_string());
        let columns = [
            Column {
                name: "Merchant",
                align: Align::Left,
            },
            Column {
                name: "Account",
                align: Align::Left,
            },
            Column {
                name: "Frequency",
                align: Align::Left,
            },
            Column {
                name: "Amount",
                align: Align::Right,
            },
            Column {
                name: "Next expected",
                align: Align::Left,
            },
            Column {
                name: "Confidence",
                align: Align::Right,
            },
        ];
        let rows = candidates
            .iter()
            .map(|row| {
                vec![
                    string_field(row, "display_name"),
                    string_field(row, "account_id"),
                    string_field(row, "frequency"),
                    money_field(row, "expected_amount"),
                    string_field(row, "next_expected_at"),
                    confidence_field(row),
                ]
            })
            .collect::<Vec<Vec<String>>>();
        lines.extend(format::render_table(&columns, &rows));
    }

    lines.push(String::new());
    lines.extend(format::key_value_rows(
        &[
            ("Created", count_field(data, "created")),
            ("Updated", count_field(data, "updated")),
            ("Left alone", count_field(data, "unchanged")),
            ("Skipped groups", skipped_summary(data)),
        ],
        2,
    ));
    lines.push(String::new());
    lines.push(
        "Run `cadence patterns list --all` to review, then confirm or dismiss each pattern."
            .to_string(),
    );

    Ok(lines.join("\n"))
}

fn detect_heading(data: &Value, candidate_count: usize) -> String {
    let space = data.get("space_id").and_then(Value::as_str).unwrap_or("default");
    let scanned = data
        .get("transactions_scanned")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let noun = if candidate_count == 1 {
        "recurring pattern"
    } else {
        "recurring patterns"
    };
    format!(
        "Scanned {scanned} transactions in space `{space}` and found {candidate_count} {noun}."
    )
}

fn skipped_summary(data: &Value) -> String {
    let skipped = data
        .get("skipped_groups")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    skipped.to_string()
}

fn string_field(row: &Value, field: &str) -> String {
    row.get(field)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

fn count_field(data: &Value, field: &str) -> String {
    data.get(field)
        .and_then(Value::as_i64)
        .unwrap_or(0)
        .to_string()
}

fn money_field(row: &Value, field: &str) -> String {
    row.get(field)
        .and_then(Value::as_f64)
        .map(format::format_money)
        .unwrap_or_else(|| "unknown".to_string())
}

fn confidence_field(row: &Value) -> String {
    row.get("confidence")
        .and_then(Value::as_f64)
        .map(|value| format!("{:.0}%", value * 100.0))
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_detect;

    #[test]
    fn empty_scan_points_at_ingest() {
        let data = json!({
            "space_id": "default",
            "transactions_scanned": 0,
            "candidates": [],
            "created": 0,
            "updated": 0,
            "unchanged": 0,
            "skipped_groups": [],
        });
        let rendered = render_detect(&data);
        assert!(rendered.is_ok());
        if let Ok(body) = rendered {
            assert!(body.contains("No transactions to scan."));
            assert!(body.contains("cadence ingest"));
        }
    }

    #[test]
    fn candidates_render_as_a_table_with_counts() {
        let data = json!({
            "space_id": "household",
            "transactions_scanned": 12,
            "candidates": [{
                "display_name": "Netflix",
                "account_id": "acct_checking",
                "merchant_key": "netflix",
                "frequency": "monthly",
                "expected_amount": -15.99,
                "amount_tolerance": 0.8,
                "next_expected_at": "2026-07-01",
                "confidence": 0.9,
                "occurrences": 6,
            }],
            "created": 1,
            "updated": 0,
            "unchanged": 0,
            "skipped_groups": [],
        });
        let rendered = render_detect(&data);
        assert!(rendered.is_ok());
        if let Ok(body) = rendered {
            assert!(body.contains("found 1 recurring pattern."));
            assert!(body.contains("Netflix"));
            assert!(body.contains("-$15.99"));
            assert!(body.contains("90%"));
            assert!(body.contains("Created"));
        }
    }
}
