use std::collections::BTreeMap;

/// Sentinel key for descriptions that normalize to nothing usable.
/// Groups under this key are too ambiguous to cluster and are excluded
/// from detection.
pub const UNKNOWN_MERCHANT_KEY: &str = "unknown";

/// Canonicalizes raw transaction text into a comparable merchant key.
///
/// Pure and deterministic: ASCII case-folding only, no locale handling.
/// Embedded dates, reference-number runs (4+ digits) and punctuation are
/// stripped so `NETFLIX.COM 4857` and `Netflix.com 9921` collapse to the
/// same key.
pub fn normalize(raw: &str) -> String {
    let mut kept_tokens: Vec<String> = Vec::new();
    let mut saw_alpha = false;

    for raw_token in raw.split_whitespace() {
        if is_date_token(raw_token) {
            continue;
        }

        for token in strip_punctuation(raw_token).split_whitespace() {
            if is_numeric_token(token) && token.len() >= 4 {
                continue;
            }
            if token.chars().any(|character| character.is_ascii_alphabetic()) {
                saw_alpha = true;
            }
            kept_tokens.push(token.to_string());
        }
    }

    if !saw_alpha {
        return UNKNOWN_MERCHANT_KEY.to_string();
    }
    kept_tokens.join(" ")
}

/// Picks the human label for a merchant group: the most frequent raw
/// description, ties broken lexicographically so reruns stay stable.
pub fn display_name(raw_descriptions: &[&str]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for description in raw_descriptions {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            continue;
        }
        *counts.entry(trimmed).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, count) in &counts {
        let replace = match best {
            Some((_, best_count)) => *count > best_count,
            None => true,
        };
        if replace {
            best = Some((label, *count));
        }
    }

    best.map(|(label, _)| label.to_string())
        .unwrap_or_else(|| UNKNOWN_MERCHANT_KEY.to_string())
}

fn strip_punctuation(token: &str) -> String {
    let mut output = String::with_capacity(token.len());
    let mut previous_space = false;
    for character in token.chars() {
        if character.is_ascii_alphanumeric() {
            output.push(character.to_ascii_lowercase());
            previous_space = false;
        } else if !previous_space {
            output.push(' ');
            previous_space = true;
        }
    }
    output
}

fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|character| character.is_ascii_digit())
}

/// Matches the date shapes that show up embedded in bank descriptions:
/// `MM/DD`, `MM/DD/YY`, `MM/DD/YYYY` (also with `-`) and `YYYY-MM-DD`.
fn is_date_token(token: &str) -> bool {
    let separator = if token.contains('/') {
        '/'
    } else if token.contains('-') {
        '-'
    } else {
        return false;
    };

    let parts: Vec<&str> = token.split(separator).collect();
    if parts.len() != 2 && parts.len() != 3 {
        return false;
    }
    if !parts.iter().all(|part| is_numeric_token(part)) {
        return false;
    }

    match parts.as_slice() {
        [month, day] => month.len() <= 2 && day.len() <= 2,
        [first, second, third] => {
            let month_day_year =
                first.len() <= 2 && second.len() <= 2 && (third.len() == 2 || third.len() == 4);
            let year_month_day = first.len() == 4 && second.len() <= 2 && third.len() <= 2;
            month_day_year || year_month_day
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{UNKNOWN_MERCHANT_KEY, display_name, normalize};

    #[test]
    fn normalization_lowercases_and_strips_reference_numbers() {
        assert_eq!(normalize("NETFLIX.COM 4857"), "netflix com");
        assert_eq!(normalize("  Spotify USA   8274550021 "), "spotify usa");
    }

    #[test]
    fn short_numeric_runs_survive() {
        assert_eq!(normalize("Whole-Foods #123"), "whole foods 123");
    }

    #[test]
    fn embedded_dates_are_removed() {
        assert_eq!(normalize("ACME POWER 01/15 PAYMENT"), "acme power payment");
        assert_eq!(normalize("ACME POWER 2026-01-15"), "acme power");
        assert_eq!(normalize("RENT 01/15/2026 TRANSFER"), "rent transfer");
    }

    #[test]
    fn punctuation_runs_collapse_to_single_spaces() {
        assert_eq!(normalize("PAYPAL *SPOTIFY---USA"), "paypal spotify usa");
    }

    #[test]
    fn empty_and_all_numeric_input_normalize_to_the_sentinel() {
        assert_eq!(normalize(""), UNKNOWN_MERCHANT_KEY);
        assert_eq!(normalize("   "), UNKNOWN_MERCHANT_KEY);
        assert_eq!(normalize("4857 0021"), UNKNOWN_MERCHANT_KEY);
        assert_eq!(normalize("#123"), UNKNOWN_MERCHANT_KEY);
    }

    #[test]
    fn same_input_always_yields_the_same_key() {
        let raw = "POS DEBIT NETFLIX.COM 4857 01/15";
        assert_eq!(normalize(raw), normalize(raw));
    }

    #[test]
    fn display_name_prefers_the_most_frequent_description() {
        let name = display_name(&["NETFLIX.COM 4857", "NETFLIX.COM", "NETFLIX.COM"]);
        assert_eq!(name, "NETFLIX.COM");
    }

    #[test]
    fn display_name_ties_break_lexicographically() {
        let name = display_name(&["B MERCHANT", "A MERCHANT"]);
        assert_eq!(name, "A MERCHANT");
    }
}
