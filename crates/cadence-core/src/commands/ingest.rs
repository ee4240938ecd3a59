use std::path::Path;

use crate::commands::common::{load_setup, now_unix, validate_space_id};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::IngestData;
use crate::ingest::parse::{detect_format, parse_rows, validate_rows};
use crate::ingest::persist::insert_rows;
use crate::state::{map_io_error, open_connection};
use crate::{CoreError, CoreResult};

#[derive(Debug, Default)]
pub struct IngestRunOptions<'a> {
    pub space_id: String,
    pub path: String,
    pub home_override: Option<&'a Path>,
}

/// Reads a JSON-array or CSV transaction file, validates every row, and
/// inserts the batch in one transaction. A single invalid row fails the
/// whole file so partial imports never poison later detection runs.
pub fn run(space_id: &str, path: &str) -> CoreResult<SuccessEnvelope> {
    run_with_options(IngestRunOptions {
        space_id: space_id.to_string(),
        path: path.to_string(),
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: IngestRunOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let space_id = validate_space_id(&options.space_id, "ingest")?;
    if options.path.trim().is_empty() {
        return Err(CoreError::invalid_argument_for_command(
            "`path` must point at a JSON or CSV transaction file.",
            Some("ingest"),
        ));
    }

    let source_path = Path::new(&options.path);
    let text = std::fs::read_to_string(source_path).map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            return CoreError::invalid_argument_for_command(
                &format!("No file found at `{}`.", source_path.display()),
                Some("ingest"),
            );
        }
        map_io_error(source_path, &error)
    })?;

    let format = detect_format(&text);
    let rows = parse_rows(&text)?;
    let issues = validate_rows(&rows);
    if !issues.is_empty() {
        let rows_invalid = to_count(issues.len());
        return Err(CoreError::ingest_validation_failed(
            rows_invalid,
            serde_json::Value::Array(issues),
        ));
    }

    let setup = load_setup(options.home_override)?;
    let mut connection = open_connection(&setup.db_path)?;
    let inserted = insert_rows(&mut connection, &setup.db_path, &space_id, &rows, now_unix())?;

    tracing::info!(
        space = %space_id,
        path = %options.path,
        rows = rows.len(),
        inserted,
        "ingest complete"
    );

    let data = IngestData {
        space_id,
        path: options.path,
        format: format.as_str().to_string(),
        rows_read: to_count(rows.len()),
        inserted,
        issues: Vec::new(),
    };

    success("ingest", data)
}

fn to_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
