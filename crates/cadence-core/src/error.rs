use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

/// Single structured error type for the whole core.
///
/// Every failure carries a stable `code` so callers can branch without
/// parsing messages: `invalid_argument` and `pattern_not_found` are
/// validation failures, `invalid_state` is a rejected lifecycle transition,
/// and the `store_*`/`migration_failed` codes are storage failures that are
/// fatal for the run they occur in.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CoreError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl CoreError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `cadence {cmd} --help` for usage."),
            None => "Run `cadence --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn pattern_not_found(pattern_id: &str) -> Self {
        Self::new(
            "pattern_not_found",
            &format!("Pattern `{pattern_id}` was not found."),
            vec![
                "Run `cadence patterns list --space <space-id>` to find a valid pattern id."
                    .to_string(),
            ],
        )
        .with_data(json!({
            "pattern_id": pattern_id,
        }))
    }

    pub fn invalid_state(action: &str, current_status: &str) -> Self {
        Self::new(
            "invalid_state",
            &format!("Cannot {action} a pattern while its status is `{current_status}`."),
            vec![
                "Run `cadence patterns list --space <space-id>` to inspect pattern statuses."
                    .to_string(),
                "Confirm the pattern first if you want to pause or resume it.".to_string(),
            ],
        )
        .with_data(json!({
            "action": action,
            "current_status": current_status,
        }))
    }

    pub fn ingest_invalid_format(message: &str, received_format: &str) -> Self {
        Self::invalid_argument_with_recovery(
            message,
            vec![
                "Provide a supported ingest format (JSON array or CSV).".to_string(),
                "Run `cadence ingest --help` to confirm field requirements.".to_string(),
            ],
        )
        .with_data(json!({
            "received_format": received_format,
            "supported_formats": ["json_array", "csv"],
        }))
    }

    pub fn ingest_validation_failed(rows_invalid: i64, issues: Value) -> Self {
        Self::new(
            "ingest_validation_failed",
            &format!("Ingest failed validation: {rows_invalid} rows need fixes. No rows were written."),
            vec![
                "Fix the listed issues in your source file.".to_string(),
                "Rerun `cadence ingest <path> --space <space-id>`.".to_string(),
            ],
        )
        .with_data(json!({
            "rows_invalid": rows_invalid,
            "issues": issues,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn store_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "store_permission_denied",
            &format!("Cannot initialize pattern store at `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `CADENCE_HOME` to a writable directory."
            )],
        )
    }

    pub fn store_locked(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "store_locked",
            &format!("Pattern store database is locked at `{location}`."),
            vec![format!(
                "Close other processes using `{location}` so the lock is released."
            )],
        )
    }

    pub fn store_corrupt(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "store_corrupt",
            &format!("Pattern store database appears corrupt at `{location}`."),
            vec![format!(
                "Replace `{location}` with a valid SQLite store file or restore from backup."
            )],
        )
    }

    pub fn migration_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "migration_failed",
            &format!("Pattern store migration failed at `{location}`: {detail}"),
            vec!["Resolve conflicting schema objects referenced in the error details.".to_string()],
        )
    }

    pub fn store_init_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "store_init_failed",
            &format!("Pattern store initialization failed at `{location}`: {detail}"),
            Vec::new(),
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
