use cadence_core::commands;
use cadence_core::commands::patterns::AddOptions;
use cadence_core::{CoreResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, PatternsCommand};

pub fn dispatch(cli: &Cli) -> CoreResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Ingest { path, space, .. } => commands::ingest::run(space, path),
        Commands::Detect {
            space,
            account,
            from,
            to,
            ..
        } => commands::detect::run(
            space,
            account.as_deref(),
            from.as_ref().map(|value| value.as_str()),
            to.as_ref().map(|value| value.as_str()),
        ),
        Commands::Patterns { command } => match command {
            PatternsCommand::List {
                space,
                status,
                all,
                ..
            } => commands::patterns::list(space, status.as_deref(), *all),
            PatternsCommand::Confirm { pattern_id, .. } => commands::patterns::confirm(pattern_id),
            PatternsCommand::Dismiss { pattern_id, .. } => commands::patterns::dismiss(pattern_id),
            PatternsCommand::Pause { pattern_id, .. } => {
                commands::patterns::toggle_pause(pattern_id)
            }
            PatternsCommand::Remove { pattern_id, .. } => commands::patterns::remove(pattern_id),
            PatternsCommand::Add {
                merchant,
                space,
                account,
                amount,
                frequency,
                last_seen,
                tolerance,
                ..
            } => commands::patterns::add(AddOptions {
                space_id: space.clone(),
                account_id: account.clone(),
                merchant: merchant.clone(),
                amount: *amount,
                frequency: frequency.clone(),
                last_seen: last_seen.as_str().to_string(),
                tolerance: *tolerance,
                home_override: None,
            }),
        },
        Commands::Summary {
            space, window_days, ..
        } => commands::summary::run(space, *window_days),
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::parse_from;

    #[test]
    fn summary_parses_with_window_days() {
        let parsed = parse_from(["cadence", "summary", "--window-days", "14"]);
        assert!(parsed.is_ok());
    }

    #[test]
    fn detect_parses_with_account_filter() {
        let parsed = parse_from(["cadence", "detect", "--account", "acct_checking"]);
        assert!(parsed.is_ok());
    }

    #[test]
    fn unknown_commands_fail_parsing() {
        let parsed = parse_from(["cadence", "guide"]);
        assert!(parsed.is_err());
    }
}
