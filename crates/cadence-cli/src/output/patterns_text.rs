use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_list(data: &Value) -> io::Result<String> {
    let patterns = data
        .get("patterns")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("patterns list output requires patterns"))?;

    if patterns.is_empty() {
        return Ok([
            "No patterns to show.",
            "",
            "Run `cadence detect` to find recurring charges, or",
            "`cadence patterns list --all` to include unreviewed detections.",
        ]
        .join("\n"));
    }

    let space = data.get("space_id").and_then(Value::as_str).unwrap_or("default");
    let mut lines = vec![
        format!("{} patterns in space `{space}`:", patterns.len()),
        String::new(),
    ];

    let columns = [
        Column {
            name: "Pattern id",
            align: Align::Left,
        },
        Column {
            name: "Merchant",
            align: Align::Left,
        },
        Column {
            name: "Status",
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
    ];
    let rows = patterns
        .iter()
        .map(|row| {
            vec![
                string_field(row, "pattern_id"),
                string_field(row, "display_name"),
                string_field(row, "status"),
                string_field(row, "frequency"),
                money_field(row, "expected_amount"),
                string_field(row, "next_expected_at"),
            ]
        })
        .collect::<Vec<Vec<String>>>();
    lines.extend(format::render_table(&columns, &rows));

    Ok(lines.join("\n"))
}

pub fn render_action(command: &str, data: &Value) -> io::Result<String> {
    let pattern_id = data
        .get("pattern_id")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("pattern action output requires pattern_id"))?;
    let previous = data
        .get("previous_status")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let status = data
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    if previous == status {
        return Ok(format!("Pattern `{pattern_id}` was already {status}."));
    }

    let verb = match command {
        "patterns confirm" => "confirmed",
        "patterns dismiss" => "dismissed",
        _ => status,
    };
    Ok(format!(
        "Pattern `{pattern_id}` is now {verb} (was {previous})."
    ))
}

pub fn render_remove(data: &Value) -> io::Result<String> {
    let pattern_id = data
        .get("pattern_id")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("remove output requires pattern_id"))?;
    Ok(format!("Pattern `{pattern_id}` was removed."))
}

pub fn render_add(data: &Value) -> io::Result<String> {
    let pattern_id = data
        .get("pattern_id")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("add output requires pattern_id"))?;

    let mut lines = vec![format!("Added pattern `{pattern_id}`."), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("Merchant", string_field(data, "display_name")),
            ("Account", string_field(data, "account_id")),
            ("Frequency", string_field(data, "frequency")),
            ("Amount", money_field(data, "expected_amount")),
            ("Next expected", string_field(data, "next_expected_at")),
            ("Status", string_field(data, "status")),
        ],
        2,
    ));
    Ok(lines.join("\n"))
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

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_action, render_list};

    #[test]
    fn empty_lists_point_at_detect() {
        let data = json!({"space_id": "default", "total": 0, "patterns": []});
        let rendered = render_list(&data);
        assert!(rendered.is_ok());
        if let Ok(body) = rendered {
            assert!(body.contains("No patterns to show."));
            assert!(body.contains("cadence detect"));
        }
    }

    #[test]
    fn idempotent_actions_say_already() {
        let data = json!({
            "pattern_id": "pat_1",
            "previous_status": "confirmed",
            "status": "confirmed",
        });
        let rendered = render_action("patterns confirm", &data);
        assert!(rendered.is_ok());
        if let Ok(body) = rendered {
            assert!(body.contains("already confirmed"));
        }
    }

    #[test]
    fn transitions_name_both_states() {
        let data = json!({
            "pattern_id": "pat_1",
            "previous_status": "detected",
            "status": "confirmed",
        });
        let rendered = render_action("patterns confirm", &data);
        assert!(rendered.is_ok());
        if let Ok(body) = rendered {
            assert!(body.contains("now confirmed"));
            assert!(body.contains("was detected"));
        }
    }
}
