use crate::cli::{Commands, PatternsCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Ingest { json, .. }
        | Commands::Detect { json, .. }
        | Commands::Summary { json, .. } => *json,
        Commands::Patterns { command } => match command {
            PatternsCommand::List { json, .. }
            | PatternsCommand::Confirm { json, .. }
            | PatternsCommand::Dismiss { json, .. }
            | PatternsCommand::Pause { json, .. }
            | PatternsCommand::Remove { json, .. }
            | PatternsCommand::Add { json, .. } => *json,
        },
    };

    if json {
        OutputMode::Json
    } else {
        OutputMode::Text
    }
}
