use std::path::Path;

use crate::setup::{SetupContext, ensure_initialized, ensure_initialized_at};
use crate::{CoreError, CoreResult};

pub const DEFAULT_SPACE_ID: &str = "default";

pub(crate) fn load_setup(home_override: Option<&Path>) -> CoreResult<SetupContext> {
    if let Some(home) = home_override {
        return ensure_initialized_at(home);
    }
    ensure_initialized()
}

/// Space ids key every stored row, so they must be non-empty and free of
/// whitespace before anything touches the database.
pub(crate) fn validate_space_id(space_id: &str, command: &str) -> CoreResult<String> {
    let trimmed = space_id.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_argument_for_command(
            "`space` must not be empty.",
            Some(command),
        ));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(CoreError::invalid_argument_for_command(
            "`space` must not contain whitespace.",
            Some(command),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::validate_space_id;

    #[test]
    fn space_ids_reject_blanks_and_whitespace() {
        assert!(validate_space_id("", "detect").is_err());
        assert!(validate_space_id("   ", "detect").is_err());
        assert!(validate_space_id("my space", "detect").is_err());
        let ok = validate_space_id(" household ", "detect");
        assert!(ok.is_ok());
        if let Ok(value) = ok {
            assert_eq!(value, "household");
        }
    }
}
