use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    if value.len() != 10 {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return Err("date must use YYYY-MM-DD format".to_string());
        }
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }

    Ok(IsoDate(value.to_string()))
}

pub fn parse_status_filter(value: &str) -> Result<String, String> {
    match value {
        "detected" | "confirmed" | "dismissed" | "paused" => Ok(value.to_string()),
        _ => Err("status must be one of: detected, confirmed, dismissed, paused".to_string()),
    }
}

pub fn parse_frequency(value: &str) -> Result<String, String> {
    match value {
        "weekly" | "biweekly" | "monthly" | "quarterly" | "yearly" => Ok(value.to_string()),
        _ => Err(
            "frequency must be one of: weekly, biweekly, monthly, quarterly, yearly".to_string(),
        ),
    }
}

/// Extended help shown after `cadence ingest --help`.
pub const INGEST_AFTER_HELP: &str = "\
How ingest works:
  Cadence does not parse raw bank PDFs or provider-specific exports.
  You parse each statement into a normalized file, then ingest it.

  Accepted formats:
    JSON — one top-level array of transaction objects
    CSV  — one header row with the field names below

Ingest schema:
  JSON example (one top-level array):
  [
    {
      \"txn_id\": \"txn_12345\",
      \"account_id\": \"chase_checking_1234\",
      \"posted_at\": \"2026-01-15\",
      \"amount\": -15.99,
      \"description\": \"NETFLIX.COM 01/15\",
      \"merchant\": \"Netflix\"
    }
  ]

  CSV example (header + rows):
  txn_id,account_id,posted_at,amount,description,merchant
  txn_12345,chase_checking_1234,2026-01-15,-15.99,NETFLIX.COM 01/15,Netflix

Field rules:
  txn_id (optional):
    Upstream transaction id when your source provides one.
    Rows without one get a generated id.

  account_id (required):
    A stable account name. Pick one value and keep it the same forever.

  posted_at (required):
    Date only, exactly `YYYY-MM-DD`.

  amount (required):
    A signed number, not text. Negative = money out, positive = money in.
    Zero-amount rows are ignored by detection.

  description (required):
    Raw transaction text from the source. Cadence normalizes it to group
    recurring charges, so leave dates and reference numbers in place.

  merchant (optional):
    Clean merchant name if you know it. Preferred over the description
    for grouping when present.

What to do next:
  1. Parse your source into normalized JSON or CSV.
  2. Run `cadence ingest <path> --space <space-id>`.
  3. Run `cadence detect --space <space-id>` to find recurring patterns.
";

#[derive(Debug, Parser)]
#[command(
    name = "cadence",
    version,
    about = "recurring transaction detection for your ledger",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load normalized transaction data into your local ledger
    #[command(after_long_help = INGEST_AFTER_HELP)]
    Ingest {
        /// Path to a normalized JSON or CSV file
        path: String,
        /// Space (ledger namespace) to load into
        #[arg(long, default_value = "default")]
        space: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Detect recurring transaction patterns in your ingested data
    Detect {
        /// Space (ledger namespace) to scan
        #[arg(long, default_value = "default")]
        space: String,
        /// Restrict the scan to one account
        #[arg(long)]
        account: Option<String>,
        /// Start date filter (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        from: Option<IsoDate>,
        /// End date filter (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        to: Option<IsoDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Review and manage detected recurring patterns
    #[command(arg_required_else_help = true)]
    Patterns {
        #[command(subcommand)]
        command: PatternsCommand,
    },
    /// Show recurring spend, status counts, and upcoming charges
    Summary {
        /// Space (ledger namespace) to summarize
        #[arg(long, default_value = "default")]
        space: String,
        /// Days ahead to include in the upcoming-charges window
        #[arg(long = "window-days")]
        window_days: Option<i64>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum PatternsCommand {
    /// List stored patterns for a space
    List {
        /// Space (ledger namespace) to list
        #[arg(long, default_value = "default")]
        space: String,
        /// Only show patterns with this status
        #[arg(long, value_parser = parse_status_filter)]
        status: Option<String>,
        /// Include auto-detected patterns the user has not acted on
        #[arg(long)]
        all: bool,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Mark a detected pattern as a real recurring charge
    Confirm {
        /// The pattern id to confirm
        pattern_id: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Reject a pattern so detection never recreates it
    Dismiss {
        /// The pattern id to dismiss
        pattern_id: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Pause a confirmed pattern, or resume a paused one
    Pause {
        /// The pattern id to pause or resume
        pattern_id: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Delete a pattern outright
    Remove {
        /// The pattern id to delete
        pattern_id: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Add a recurring pattern by hand
    Add {
        /// Merchant name for the pattern
        merchant: String,
        /// Space (ledger namespace) to add into
        #[arg(long, default_value = "default")]
        space: String,
        /// Account the charge posts to
        #[arg(long)]
        account: String,
        /// Expected signed amount per occurrence
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        /// How often the charge recurs
        #[arg(long, value_parser = parse_frequency)]
        frequency: String,
        /// Date of the most recent occurrence (YYYY-MM-DD)
        #[arg(long = "last-seen", value_parser = parse_iso_date)]
        last_seen: IsoDate,
        /// Allowed amount wiggle room (defaults to 5% of the amount)
        #[arg(long)]
        tolerance: Option<f64>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    use clap::Parser;
    Cli::try_parse_from(itr)
}
