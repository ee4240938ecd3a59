mod detect_text;
mod error_text;
mod format;
mod ingest_text;
mod json;
mod mode;
mod patterns_text;
mod summary_text;

use std::io;

use cadence_core::{CoreError, SuccessEnvelope};

pub use mode::{OutputMode, mode_for_command};

use crate::stdout_io::write_stdout_line;

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    write_stdout_line(&body)
}

pub fn print_failure(error: &CoreError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "ingest" => ingest_text::render_ingest(&success.data),
        "detect" => detect_text::render_detect(&success.data),
        "patterns list" => patterns_text::render_list(&success.data),
        "patterns confirm" | "patterns dismiss" | "patterns pause" => {
            patterns_text::render_action(&success.command, &success.data)
        }
        "patterns remove" => patterns_text::render_remove(&success.data),
        "patterns add" => patterns_text::render_add(&success.data),
        "summary" => summary_text::render_summary(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
