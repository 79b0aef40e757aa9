use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fuelcheck_client::import::FormatHint;

pub fn parse_format_hint(value: &str) -> Result<FormatHint, String> {
    match value {
        "auto" => Ok(FormatHint::Auto),
        "delimited" | "csv" => Ok(FormatHint::Delimited),
        "document" | "json" => Ok(FormatHint::Document),
        _ => Err("format must be one of: auto, delimited, document".to_string()),
    }
}

pub fn parse_positive_limit(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err("limit must be a whole number greater than zero".to_string()),
    }
}

/// Extended help shown after `fuelcheck import create --help`.
pub const IMPORT_CREATE_AFTER_HELP: &str = "\
How import works:
  Pass one or more fuel-card invoice exports. Each file is parsed,
  merged into the transaction history, and re-checked for anomalies.
  Rows already in the history (same vehicle, date and time) are skipped.

  Accepted formats:
    delimited  semicolon-separated invoice export with a title block
    document   JSON array of row objects using the invoice column names

  The format is detected from the file extension unless --format is given.

Invoice columns used:
  Kennzeichen        vehicle id (license plate)
  km-Stand           odometer reading, empty or 0 when not recorded
  Lieferdatum        delivery date, DD.MM.YYYY
  Lieferzeit         delivery time, HH:MM
  Menge              volume in litres, decimal comma accepted
  Warenart           product; only fuel products enter consumption
  Wert incl. USt     gross amount
  Name               filling station

What to do next:
  1. Run `fuelcheck import create --dry-run <path>` and fix any reported issues.
  2. Run `fuelcheck import create <path>` once the dry run looks right.
  3. Run `fuelcheck anomalies list` to review new findings.
";

#[derive(Debug, Parser)]
#[command(
    name = "fuelcheck",
    version,
    about = "fuel-card invoice checker",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Data directory (defaults to FUELCHECK_HOME or ~/.fuelcheck)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,
    /// Acting user, checked against the configured roles
    #[arg(long, global = true, env = "FUELCHECK_USER")]
    pub user: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import fuel-card invoice files into the transaction history
    #[command(arg_required_else_help = true)]
    Import {
        #[command(subcommand)]
        command: ImportCommand,
    },
    /// Browse and maintain the transaction history
    #[command(arg_required_else_help = true)]
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Review and acknowledge plausibility findings
    #[command(arg_required_else_help = true)]
    Anomalies {
        #[command(subcommand)]
        command: AnomaliesCommand,
    },
    /// Manage per-vehicle owners and efficiency bounds
    #[command(arg_required_else_help = true)]
    Vehicles {
        #[command(subcommand)]
        command: VehiclesCommand,
    },
    /// Notify vehicle owners about open findings
    #[command(arg_required_else_help = true)]
    Notify {
        #[command(subcommand)]
        command: NotifyCommand,
    },
    /// Show consumption statistics per vehicle and month
    Stats {
        /// Only include this vehicle
        #[arg(long)]
        vehicle: Option<String>,
        /// Start date filter (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long)]
        from: Option<String>,
        /// End date filter (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long)]
        to: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Create or restore data backups
    #[command(arg_required_else_help = true)]
    Backup {
        #[command(subcommand)]
        command: BackupCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ImportCommand {
    /// Parse invoice files and merge them into the history
    #[command(after_long_help = IMPORT_CREATE_AFTER_HELP)]
    Create {
        /// Parse and report without writing to the history
        #[arg(long)]
        dry_run: bool,
        /// Input format: auto, delimited or document
        #[arg(long, value_parser = parse_format_hint, default_value = "auto")]
        format: FormatHint,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Invoice files to import
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List past imports, newest first
    List {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum HistoryCommand {
    /// List stored transactions
    List {
        /// Only include this vehicle
        #[arg(long)]
        vehicle: Option<String>,
        /// Start date filter (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long)]
        from: Option<String>,
        /// End date filter (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long)]
        to: Option<String>,
        /// Show only the newest N transactions
        #[arg(long, value_parser = parse_positive_limit)]
        limit: Option<usize>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Record a fill-up by hand
    Add {
        #[arg(long)]
        vehicle: String,
        /// Fill-up date (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long)]
        date: String,
        /// Fill-up time (HH:MM)
        #[arg(long)]
        time: String,
        /// Odometer reading in km
        #[arg(long)]
        odometer: Option<f64>,
        /// Volume in litres
        #[arg(long)]
        volume: f64,
        /// Gross amount
        #[arg(long)]
        amount: Option<f64>,
        /// Filling station
        #[arg(long, default_value = "")]
        location: String,
        /// Product name
        #[arg(long, default_value = "DIESEL")]
        fuel_type: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Correct fields of one transaction
    Edit {
        #[arg(long)]
        vehicle: String,
        /// Fill-up date (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long)]
        date: String,
        /// Fill-up time (HH:MM)
        #[arg(long)]
        time: String,
        #[arg(long)]
        odometer: Option<f64>,
        #[arg(long)]
        volume: Option<f64>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        location: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Delete every transaction and import record
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Export transactions to a delimited file
    Export {
        /// Destination file
        output: PathBuf,
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum AnomaliesCommand {
    /// List findings (open ones unless --all)
    List {
        /// Include acknowledged findings
        #[arg(long)]
        all: bool,
        /// Only include this vehicle
        #[arg(long)]
        vehicle: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Acknowledge a finding with an explanatory comment
    Ack {
        /// Finding id as shown by `fuelcheck anomalies list`
        finding_id: String,
        /// Why the finding is acceptable
        #[arg(long, short = 'm')]
        comment: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum VehiclesCommand {
    /// List configured vehicles and the default bounds
    List {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Create or update a vehicle entry
    Set {
        vehicle_id: String,
        #[arg(long)]
        owner_name: Option<String>,
        #[arg(long)]
        owner_email: Option<String>,
        /// Lower bound in L/100km (0 disables)
        #[arg(long)]
        min: Option<f64>,
        /// Upper bound in L/100km (0 disables)
        #[arg(long)]
        max: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Remove a vehicle entry
    Remove {
        vehicle_id: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum NotifyCommand {
    /// Show the messages that would be sent
    Preview {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Write one message per owner and vehicle to the outbox
    Send {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum BackupCommand {
    /// Write a zip archive of the data files
    Create {
        /// Archive path (defaults to backups/ under the data directory)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Replace the data files with the contents of an archive
    Restore {
        archive: PathBuf,
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
    Cli::try_parse_from(itr)
}
