use std::io;

use serde_json::Value;

use super::format;

pub fn render_ingest(data: &Value) -> io::Result<String> {
    let inserted = data
        .get("inserted")
        .and_then(Value::as_i64)
        .ok_or_else(|| io::Error::other("ingest output requires inserted"))?;

    let mut lines = vec![
        format!(
            "Ingested {inserted} {} into space `{}`.",
            if inserted == 1 { "transaction" } else { "transactions" },
            data.get("space_id").and_then(Value::as_str).unwrap_or("default"),
        ),
        String::new(),
    ];
    lines.extend(format::key_value_rows(
        &[
            (
                "Source",
                data.get("path")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
            ),
            (
                "Format",
                data.get("format")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
            ),
            (
                "Rows read",
                data.get("rows_read")
                    .and_then(Value::as_i64)
                    .unwrap_or(0)
                    .to_string(),
            ),
        ],
        2,
    ));
    lines.push(String::new());
    lines.push("Run `cadence detect` to scan for recurring patterns.".to_string());

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_ingest;

    #[test]
    fn ingest_reports_source_and_counts() {
        let data = json!({
            "space_id": "household",
            "path": "/tmp/rows.json",
            "format": "json_array",
            "rows_read": 3,
            "inserted": 3,
        });
        let rendered = render_ingest(&data);
        assert!(rendered.is_ok());
        if let Ok(body) = rendered {
            assert!(body.contains("Ingested 3 transactions into space `household`."));
            assert!(body.contains("json_array"));
            assert!(body.contains("cadence detect"));
        }
    }
}
