use std::path::Path;

use fuelcheck_client::anomalies::FindingScope;
use fuelcheck_client::commands;
use fuelcheck_client::commands::anomalies::{AnomaliesAckOptions, AnomaliesListOptions};
use fuelcheck_client::commands::backup::{BackupCreateOptions, BackupRestoreOptions};
use fuelcheck_client::commands::history::{
    HistoryAddOptions, HistoryClearOptions, HistoryEditOptions, HistoryExportOptions,
    HistoryListOptions,
};
use fuelcheck_client::commands::import::{ImportListOptions, ImportRunOptions};
use fuelcheck_client::commands::notify::NotifyOptions;
use fuelcheck_client::commands::stats::StatsRunOptions;
use fuelcheck_client::commands::vehicles::{
    VehiclesListOptions, VehiclesRemoveOptions, VehiclesSetOptions,
};
use fuelcheck_client::ledger::edit::RecordUpdate;
use fuelcheck_client::{ClientResult, SuccessEnvelope};

use crate::cli::{
    AnomaliesCommand, BackupCommand, Cli, Commands, HistoryCommand, ImportCommand, NotifyCommand,
    VehiclesCommand,
};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    let home_override = cli.home.as_deref();
    let user = cli.user.clone();

    match &cli.command {
        Commands::Import { command } => match command {
            ImportCommand::Create {
                dry_run,
                format,
                paths,
                ..
            } => commands::import::run_with_options(ImportRunOptions {
                paths: paths.clone(),
                format: *format,
                dry_run: *dry_run,
                user,
                home_override,
            }),
            ImportCommand::List { .. } => commands::import::list_with_options(ImportListOptions {
                user,
                home_override,
            }),
        },
        Commands::History { command } => dispatch_history(command, user, home_override),
        Commands::Anomalies { command } => match command {
            AnomaliesCommand::List { all, vehicle, .. } => {
                commands::anomalies::list_with_options(AnomaliesListOptions {
                    scope: finding_scope(*all),
                    vehicle_id: vehicle.clone(),
                    user,
                    home_override,
                })
            }
            AnomaliesCommand::Ack {
                finding_id,
                comment,
                ..
            } => commands::anomalies::acknowledge_with_options(AnomaliesAckOptions {
                finding_id: finding_id.clone(),
                comment: comment.clone(),
                user,
                home_override,
            }),
        },
        Commands::Vehicles { command } => match command {
            VehiclesCommand::List { .. } => {
                commands::vehicles::list_with_options(VehiclesListOptions {
                    user,
                    home_override,
                })
            }
            VehiclesCommand::Set {
                vehicle_id,
                owner_name,
                owner_email,
                min,
                max,
                notes,
                ..
            } => commands::vehicles::set(VehiclesSetOptions {
                vehicle_id: vehicle_id.clone(),
                owner_name: owner_name.clone(),
                owner_email: owner_email.clone(),
                min_efficiency: *min,
                max_efficiency: *max,
                notes: notes.clone(),
                user,
                home_override,
            }),
            VehiclesCommand::Remove { vehicle_id, .. } => {
                commands::vehicles::remove(VehiclesRemoveOptions {
                    vehicle_id: vehicle_id.clone(),
                    user,
                    home_override,
                })
            }
        },
        Commands::Notify { command } => {
            let options = NotifyOptions {
                user,
                home_override,
            };
            match command {
                NotifyCommand::Preview { .. } => commands::notify::preview_with_options(options),
                NotifyCommand::Send { .. } => commands::notify::send_with_options(options),
            }
        }
        Commands::Stats {
            vehicle, from, to, ..
        } => commands::stats::run_with_options(StatsRunOptions {
            vehicle_id: vehicle.clone(),
            from: from.clone(),
            to: to.clone(),
            user,
            home_override,
        }),
        Commands::Backup { command } => match command {
            BackupCommand::Create { output, .. } => {
                commands::backup::create(BackupCreateOptions {
                    output: output.clone(),
                    user,
                    home_override,
                })
            }
            BackupCommand::Restore { archive, .. } => {
                commands::backup::restore(BackupRestoreOptions {
                    archive: archive.clone(),
                    user,
                    home_override,
                })
            }
        },
    }
}

fn dispatch_history(
    command: &HistoryCommand,
    user: Option<String>,
    home_override: Option<&Path>,
) -> ClientResult<SuccessEnvelope> {
    match command {
        HistoryCommand::List {
            vehicle,
            from,
            to,
            limit,
            ..
        } => commands::history::list_with_options(HistoryListOptions {
            vehicle_id: vehicle.clone(),
            from: from.clone(),
            to: to.clone(),
            limit: *limit,
            user,
            home_override,
        }),
        HistoryCommand::Add {
            vehicle,
            date,
            time,
            odometer,
            volume,
            amount,
            location,
            fuel_type,
            ..
        } => commands::history::add(HistoryAddOptions {
            vehicle_id: vehicle.clone(),
            date: date.clone(),
            time: time.clone(),
            odometer: *odometer,
            volume: *volume,
            amount: *amount,
            location: location.clone(),
            fuel_type: fuel_type.clone(),
            user,
            home_override,
        }),
        HistoryCommand::Edit {
            vehicle,
            date,
            time,
            odometer,
            volume,
            amount,
            location,
            ..
        } => commands::history::edit(HistoryEditOptions {
            vehicle_id: vehicle.clone(),
            date: date.clone(),
            time: time.clone(),
            update: RecordUpdate {
                odometer: *odometer,
                volume: *volume,
                amount: *amount,
                location: location.clone(),
            },
            user,
            home_override,
        }),
        HistoryCommand::Clear { yes, .. } => commands::history::clear(HistoryClearOptions {
            confirmed: *yes,
            user,
            home_override,
        }),
        HistoryCommand::Export {
            output,
            vehicle,
            from,
            to,
            ..
        } => commands::history::export(HistoryExportOptions {
            output: output.clone(),
            vehicle_id: vehicle.clone(),
            from: from.clone(),
            to: to.clone(),
            user,
            home_override,
        }),
    }
}

fn finding_scope(all: bool) -> FindingScope {
    if all {
        FindingScope::All
    } else {
        FindingScope::Open
    }
}
