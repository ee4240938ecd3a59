use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_summary(data: &Value) -> io::Result<String> {
    let counts = data
        .get("counts")
        .ok_or_else(|| io::Error::other("summary output requires counts"))?;

    let space = data.get("space_id").and_then(Value::as_str).unwrap_or("default");
    let window = data.get("window_days").and_then(Value::as_i64).unwrap_or(30);
    let spend = data
        .get("monthly_recurring_spend")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let mut lines = vec![format!("Recurring summary for space `{space}`:"), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("Monthly recurring spend", format::format_money(spend)),
            ("Detected", count(counts, "detected")),
            ("Confirmed", count(counts, "confirmed")),
            ("Paused", count(counts, "paused")),
            ("Dismissed", count(counts, "dismissed")),
        ],
        2,
    ));
    lines.push(String::new());

    let upcoming = data
        .get("upcoming")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if upcoming.is_empty() {
        lines.push(format!("No charges expected in the next {window} days."));
    } else {
        lines.push(format!("Expected in the next {window} days:"));
        let columns = [
            Column {
                name: "Date",
                align: Align::Left,
            },
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
        ];
        let rows = upcoming
            .iter()
            .map(|row| {
                vec![
                    string_field(row, "next_expected_at"),
                    string_field(row, "display_name"),
                    string_field(row, "account_id"),
                    string_field(row, "frequency"),
                    money_field(row, "expected_amount"),
                ]
            })
            .collect::<Vec<Vec<String>>>();
        lines.extend(format::render_table(&columns, &rows));
    }

    Ok(lines.join("\n"))
}

fn count(counts: &Value, field: &str) -> String {
    counts
        .get(field)
        .and_then(Value::as_i64)
        .unwrap_or(0)
        .to_string()
}

fn string_field(row: &Value, field: &str) -> String {
    row.get(field)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

fn money_field(row: &Value, field: &str) -> String {
    row.get(field)
        .and_then(Value::as_f64)
        .map(format::format_money)
        .unwrap_or_else(|| "unknown".to_string())
}
