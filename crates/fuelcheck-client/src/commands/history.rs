use std::path::{Path, PathBuf};

use crate::access::Permission;
use crate::commands::common::{authorize, load_setup, parse_date_arg, parse_optional_date_arg};
use crate::consumption::StatsFilter;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{
    HistoryAddData, HistoryClearData, HistoryEditData, HistoryExportData, HistoryListData,
};
use crate::ledger::edit::{ManualEntry, RecordUpdate};
use crate::ledger::{RecordKey, TransactionRecord};
use crate::state::write_atomic;
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct HistoryListOptions<'a> {
    pub vehicle_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<usize>,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct HistoryAddOptions<'a> {
    pub vehicle_id: String,
    pub date: String,
    pub time: String,
    pub odometer: Option<f64>,
    pub volume: f64,
    pub amount: Option<f64>,
    pub location: String,
    pub fuel_type: String,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct HistoryEditOptions<'a> {
    pub vehicle_id: String,
    pub date: String,
    pub time: String,
    pub update: RecordUpdate,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct HistoryClearOptions<'a> {
    pub confirmed: bool,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct HistoryExportOptions<'a> {
    pub output: PathBuf,
    pub vehicle_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn list(vehicle_id: Option<String>, limit: Option<usize>) -> ClientResult<SuccessEnvelope> {
    list_with_options(HistoryListOptions {
        vehicle_id,
        limit,
        ..HistoryListOptions::default()
    })
}

#[doc(hidden)]
pub fn list_with_options(options: HistoryListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::Read)?;
    let filter = build_filter(
        options.vehicle_id,
        options.from.as_deref(),
        options.to.as_deref(),
        "history list",
    )?;

    let log = setup.engine().transactions()?;
    let matching = log
        .sorted()
        .into_iter()
        .filter(|record| filter.includes(record))
        .cloned()
        .collect::<Vec<_>>();
    let total = matching.len();
    // A limit keeps the newest entries.
    let transactions = match options.limit {
        Some(limit) if limit < total => matching[total - limit..].to_vec(),
        _ => matching,
    };

    success(
        "history list",
        HistoryListData {
            total,
            transactions,
        },
    )
}

pub fn add(options: HistoryAddOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::Edit)?;
    let entry = ManualEntry {
        vehicle_id: options.vehicle_id,
        date: parse_date_arg(&options.date, "date", "history add")?,
        time: options.time,
        odometer: options.odometer,
        volume: options.volume,
        amount: options.amount,
        location: options.location,
        fuel_type: options.fuel_type,
    };

    let record = setup.engine().add_manual(&entry)?;
    success("history add", HistoryAddData { record })
}

pub fn edit(options: HistoryEditOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::Edit)?;
    let date = parse_date_arg(&options.date, "date", "history edit")?;
    let key = RecordKey::new(options.vehicle_id.trim(), date, options.time.trim());

    let changed = setup.engine().update(&key, &options.update)?;
    success(
        "history edit",
        HistoryEditData {
            key: key.to_string(),
            changed,
        },
    )
}

pub fn clear(options: HistoryClearOptions<'_>) -> ClientResult<SuccessEnvelope> {
    if !options.confirmed {
        return Err(ClientError::invalid_argument_with_recovery(
            "Deleting the whole history needs explicit confirmation.",
            vec![
                "Create a backup first with `fuelcheck backup create`.".to_string(),
                "Then rerun `fuelcheck history clear --yes`.".to_string(),
            ],
        ));
    }
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::DeleteAll)?;

    let summary = setup.engine().delete_all()?;
    success("history clear", HistoryClearData { summary })
}

pub fn export(options: HistoryExportOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::Export)?;
    let filter = build_filter(
        options.vehicle_id,
        options.from.as_deref(),
        options.to.as_deref(),
        "history export",
    )?;

    let log = setup.engine().transactions()?;
    let records = log
        .sorted()
        .into_iter()
        .filter(|record| filter.includes(record))
        .collect::<Vec<_>>();
    let body = export_csv(&records, setup.settings.delimited.delimiter)?;
    write_atomic(&options.output, &body)?;

    success(
        "history export",
        HistoryExportData {
            path: options.output.display().to_string(),
            rows: records.len(),
        },
    )
}

fn build_filter(
    vehicle_id: Option<String>,
    from: Option<&str>,
    to: Option<&str>,
    command: &str,
) -> ClientResult<StatsFilter> {
    Ok(StatsFilter {
        vehicle_id,
        from: parse_optional_date_arg(from, "from", command)?,
        to: parse_optional_date_arg(to, "to", command)?,
    })
}

fn export_csv(records: &[&TransactionRecord], delimiter: char) -> ClientResult<Vec<u8>> {
    let delimiter = u8::try_from(delimiter).map_err(|_| {
        ClientError::invalid_argument("The configured delimiter must be a single-byte character.")
    })?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|error| ClientError::internal_serialization(&error.to_string()))
}
