mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use fuelcheck_client::{ClientError, ErrorCategory};
use stdout_io::write_stdout_text;
use tracing_subscriber::EnvFilter;

const ROOT_HELP: &str = "fuelcheck - fuel-card invoice checker

Usage:
  fuelcheck <command>

Start here:
  fuelcheck import create --help
  fuelcheck anomalies list
  fuelcheck --help
";

const TOP_LEVEL_HELP: &str = "fuelcheck - fuel-card invoice checker

USAGE: fuelcheck [--home <dir>] [--user <name>] <command>

Import invoices:
  1. fuelcheck import create --help                 Read the accepted formats and columns
  2. fuelcheck import create --dry-run <path>...    Check files without writing
  3. fuelcheck import create <path>...              Merge files into the history

Review findings (recomputed on every change):
  fuelcheck anomalies list [--all]                  Open (or all) plausibility findings
  fuelcheck anomalies ack <finding> -m <reason>     Acknowledge a checked finding
  fuelcheck notify preview                          Show messages for vehicle owners
  fuelcheck notify send                             Write owner messages to the outbox

History and statistics:
  fuelcheck history list                            Stored fill-ups with consumption
  fuelcheck history add | edit                      Record or correct a fill-up
  fuelcheck history export <path>                   Write the history as delimited text
  fuelcheck history clear --yes                     Delete all transactions
  fuelcheck stats                                   Consumption per vehicle and month

Configuration and data:
  fuelcheck vehicles list | set | remove            Owners and efficiency bounds
  fuelcheck import list                             Past imports
  fuelcheck backup create | restore                 Zip archive of all data files

Every command accepts --json for machine-readable output.
Set FUELCHECK_LOG=debug to see diagnostic logs on stderr.
";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FUELCHECK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }
    let cli = match cli::Cli::try_parse() {
        Ok(value) => value,
        Err(err) => return handle_parse_error(&err, &raw_args),
    };
    let mode = output::mode_for_command(&cli.command);
    tracing::debug!(command = ?cli.command, "dispatching");

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            tracing::debug!(code = %error.code, "command failed");
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn handle_parse_error(err: &clap::Error, raw_args: &[String]) -> Result<ExitCode, ExitCode> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let text = if is_top_level_help_request(raw_args) {
                TOP_LEVEL_HELP.to_string()
            } else {
                err.to_string()
            };
            if write_stdout_text(&text).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        ErrorKind::DisplayVersion => {
            if write_stdout_text(&err.to_string()).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let command_hint = command_path_from_args(raw_args);
            let parse_error =
                ClientError::invalid_argument_for_command(&clean_message, command_hint.as_deref());
            let mode = infer_requested_output_mode(raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(ExitCode::from(1))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Strips clap's trailing usage block so "What to do next" is the only guidance.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_start_matches("error: ").trim_end().to_string()
}

/// Best-effort subcommand path for the `--help` hint in parse errors.
fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let mut words = Vec::new();
    let mut skip_value = false;
    for value in raw_args.iter().skip(1) {
        if skip_value {
            skip_value = false;
        } else if matches!(value.as_str(), "--home" | "--user") {
            skip_value = true;
        } else if !value.starts_with('-') {
            words.push(value.as_str());
        }
    }

    let hint = match words.as_slice() {
        ["stats", ..] => "stats",
        [
            group @ ("import" | "history" | "anomalies" | "vehicles" | "notify" | "backup"),
            action,
            ..,
        ] if is_known_action(group, action) => {
            return Some(format!("{group} {action}"));
        }
        [group @ ("import" | "history" | "anomalies" | "vehicles" | "notify" | "backup"), ..] => {
            *group
        }
        _ => return None,
    };
    Some(hint.to_string())
}

fn is_known_action(group: &str, action: &str) -> bool {
    let actions: &[&str] = match group {
        "import" => &["create", "list"],
        "history" => &["list", "add", "edit", "clear", "export"],
        "anomalies" => &["list", "ack"],
        "vehicles" => &["list", "set", "remove"],
        "notify" => &["preview", "send"],
        "backup" => &["create", "restore"],
        _ => &[],
    };
    actions.contains(&action)
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    match error.category() {
        ErrorCategory::Storage | ErrorCategory::Internal => ExitCode::from(2),
        _ => ExitCode::from(1),
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}
