use crate::cli::{
    AnomaliesCommand, BackupCommand, Commands, HistoryCommand, ImportCommand, NotifyCommand,
    VehiclesCommand,
};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    const fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Import { command } => match command {
            ImportCommand::Create { json, .. } | ImportCommand::List { json } => *json,
        },
        Commands::History { command } => match command {
            HistoryCommand::List { json, .. }
            | HistoryCommand::Add { json, .. }
            | HistoryCommand::Edit { json, .. }
            | HistoryCommand::Clear { json, .. }
            | HistoryCommand::Export { json, .. } => *json,
        },
        Commands::Anomalies { command } => match command {
            AnomaliesCommand::List { json, .. } | AnomaliesCommand::Ack { json, .. } => *json,
        },
        Commands::Vehicles { command } => match command {
            VehiclesCommand::List { json }
            | VehiclesCommand::Set { json, .. }
            | VehiclesCommand::Remove { json, .. } => *json,
        },
        Commands::Notify { command } => match command {
            NotifyCommand::Preview { json } | NotifyCommand::Send { json } => *json,
        },
        Commands::Stats { json, .. } => *json,
        Commands::Backup { command } => match command {
            BackupCommand::Create { json, .. } | BackupCommand::Restore { json, .. } => *json,
        },
    };
    OutputMode::from_flag(json)
}
