use chrono::{Datelike, NaiveDate};

use crate::detect::types::DetectionFilter;
use crate::{CoreError, CoreResult};

pub fn build_filter(
    from: Option<&str>,
    to: Option<&str>,
    command: &str,
) -> CoreResult<DetectionFilter> {
    let parsed_from = from
        .map(|value| parse_iso_date_strict(value, "from", command))
        .transpose()?;
    let parsed_to = to
        .map(|value| parse_iso_date_strict(value, "to", command))
        .transpose()?;

    if let (Some(start), Some(end)) = (parsed_from, parsed_to)
        && start > end
    {
        return Err(CoreError::invalid_argument_for_command(
            "Invalid date range: `from` must be on or before `to`.",
            Some(command),
        ));
    }

    Ok(DetectionFilter {
        from: parsed_from,
        to: parsed_to,
    })
}

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_transaction_date(value: &str) -> Option<NaiveDate> {
    if !looks_like_iso_date(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Month-add with end-of-month clamping, so a pattern anchored on the 31st
/// lands on the 28th/29th/30th in shorter months instead of skidding into
/// the next month.
pub fn add_months_clamped(date: NaiveDate, months: i32) -> NaiveDate {
    let month_index = date.year() * 12 + i32::try_from(date.month0()).unwrap_or(0) + months;
    let year = month_index.div_euclid(12);
    let month = u32::try_from(month_index.rem_euclid(12)).unwrap_or(0) + 1;

    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

fn parse_iso_date_strict(value: &str, field_name: &str, command: &str) -> CoreResult<NaiveDate> {
    if !looks_like_iso_date(value) {
        return Err(CoreError::invalid_argument_for_command(
            &format!("`{field_name}` must use YYYY-MM-DD format with a real calendar date."),
            Some(command),
        ));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        CoreError::invalid_argument_for_command(
            &format!("`{field_name}` must use YYYY-MM-DD format with valid calendar values."),
            Some(command),
        )
    })
}

// Strict shape check keeps "2026-2-28" and slash dates out before chrono's
// more permissive parser sees them.
fn looks_like_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| index == 4 || index == 7 || byte.is_ascii_digit())
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
