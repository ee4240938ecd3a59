use std::path::Path;

use crate::commands::common::{load_setup, validate_space_id};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::SummaryData;
use crate::pattern::store::list_by_space;
use crate::pattern::summary::{DEFAULT_UPCOMING_WINDOW_DAYS, summarize};
use crate::pattern::types::PatternFilter;
use crate::state::open_connection;
use crate::{CoreError, CoreResult};

#[derive(Debug, Default)]
pub struct SummaryRunOptions<'a> {
    pub space_id: String,
    pub window_days: Option<i64>,
    /// Overrides "today" so tests get stable windows.
    pub today: Option<chrono::NaiveDate>,
    pub home_override: Option<&'a Path>,
}

pub fn run(space_id: &str, window_days: Option<i64>) -> CoreResult<SuccessEnvelope> {
    run_with_options(SummaryRunOptions {
        space_id: space_id.to_string(),
        window_days,
        today: None,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: SummaryRunOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let space_id = validate_space_id(&options.space_id, "summary")?;
    let window_days = match options.window_days {
        Some(value) if value < 0 => {
            return Err(CoreError::invalid_argument_for_command(
                "`window-days` must be zero or greater.",
                Some("summary"),
            ));
        }
        Some(value) => value,
        None => DEFAULT_UPCOMING_WINDOW_DAYS,
    };

    let setup = load_setup(options.home_override)?;
    let connection = open_connection(&setup.db_path)?;
    let patterns = list_by_space(&connection, &setup.db_path, &space_id, &PatternFilter::all())?;

    let today = options
        .today
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    let summary = summarize(&patterns, today, window_days);

    success(
        "summary",
        SummaryData::from_summary(&space_id, window_days, &summary),
    )
}
