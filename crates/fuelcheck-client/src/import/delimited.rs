use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, StringRecord};

use crate::contracts::types::RowIssue;
use crate::import::ParseOutcome;
use crate::import::number::{parse_locale_number, parse_optional_locale_number};
use crate::ledger::record::{RecordKey, TransactionRecord};
use crate::settings::DelimitedLayout;
use crate::{ClientError, ClientResult};

struct ColumnIndex {
    vehicle: usize,
    date: usize,
    volume: usize,
    odometer: Option<usize>,
    time: Option<usize>,
    fuel_type: Option<usize>,
    amount: Option<usize>,
    location: Option<usize>,
}

/// Parses a vendor export: one header line, a fixed preamble, then
/// delimiter-separated data lines.
pub(crate) fn parse_delimited(
    content: &str,
    source_file: &str,
    layout: &DelimitedLayout,
) -> ClientResult<ParseOutcome> {
    let delimiter = u8::try_from(layout.delimiter).map_err(|_| {
        ClientError::parse_failed(source_file, "the configured delimiter is not ASCII")
    })?;
    let content = content.trim_start_matches('\u{feff}');
    let lines = content.lines().collect::<Vec<_>>();

    let Some(header) = lines.first().filter(|line| !line.trim().is_empty()) else {
        return Err(ClientError::parse_failed(source_file, "header row is missing"));
    };

    let mut kept_line_numbers = Vec::new();
    let mut body = String::from(*header);
    body.push('\n');
    for (index, line) in lines.iter().enumerate().skip(layout.preamble_lines) {
        if line.trim().is_empty()
            || !line.contains(layout.delimiter)
            || line.starts_with(char::is_whitespace)
        {
            continue;
        }
        kept_line_numbers.push(index + 1);
        body.push_str(line);
        body.push('\n');
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| ClientError::parse_failed(source_file, &error.to_string()))?
        .clone();
    let columns = resolve_columns(&headers, layout, source_file)?;

    let mut outcome = ParseOutcome::default();
    for (position, result) in reader.records().enumerate() {
        let line = kept_line_numbers.get(position).copied().unwrap_or(0);
        outcome.rows_read += 1;

        let row = match result {
            Ok(row) => row,
            Err(error) => {
                outcome.issues.push(RowIssue::new(
                    source_file,
                    line,
                    "row",
                    &error.to_string(),
                    None,
                ));
                continue;
            }
        };

        match read_row(&row, &columns, layout, source_file, line) {
            Ok(record) => outcome.records.push(record),
            Err(issue) => outcome.issues.push(issue),
        }
    }

    if outcome.records.is_empty() {
        return Err(ClientError::parse_failed_with_issues(
            source_file,
            "no data rows could be read",
            &outcome.issues,
        ));
    }

    outcome.records.sort_by_key(TransactionRecord::key);
    Ok(outcome)
}

fn resolve_columns(
    headers: &StringRecord,
    layout: &DelimitedLayout,
    source_file: &str,
) -> ClientResult<ColumnIndex> {
    let positions = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.trim().to_string(), index))
        .collect::<HashMap<_, _>>();
    let lookup = |name: &str| column_position(&positions, name);

    let required = [
        layout.vehicle_column.as_str(),
        layout.date_column.as_str(),
        layout.volume_column.as_str(),
    ];
    let missing = required
        .iter()
        .filter(|name| column_position(&positions, name).is_none())
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(ClientError::parse_failed(
            source_file,
            &format!("header row lacks required columns {}", missing.join(", ")),
        ));
    }

    Ok(ColumnIndex {
        vehicle: lookup(&layout.vehicle_column).unwrap_or_default(),
        date: lookup(&layout.date_column).unwrap_or_default(),
        volume: lookup(&layout.volume_column).unwrap_or_default(),
        odometer: lookup(&layout.odometer_column),
        time: lookup(&layout.time_column),
        fuel_type: lookup(&layout.fuel_type_column),
        amount: lookup(&layout.amount_column),
        location: lookup(&layout.location_column),
    })
}

fn column_position(positions: &HashMap<String, usize>, name: &str) -> Option<usize> {
    positions.get(name).copied()
}

fn read_row(
    row: &StringRecord,
    columns: &ColumnIndex,
    layout: &DelimitedLayout,
    source_file: &str,
    line: usize,
) -> Result<TransactionRecord, RowIssue> {
    let cell = |index: usize| row.get(index).map(str::trim).unwrap_or("");
    let optional_cell =
        |index: Option<usize>| index.and_then(|value| row.get(value)).map(str::trim);

    let vehicle_id = cell(columns.vehicle);
    if vehicle_id.is_empty() {
        return Err(RowIssue::new(
            source_file,
            line,
            &layout.vehicle_column,
            "vehicle id is empty",
            None,
        ));
    }

    let raw_date = cell(columns.date);
    let Ok(date) = NaiveDate::parse_from_str(raw_date, &layout.date_format) else {
        return Err(RowIssue::new(
            source_file,
            line,
            &layout.date_column,
            "date does not match the expected format",
            Some(raw_date),
        ));
    };

    let raw_volume = cell(columns.volume);
    let volume = parse_locale_number(raw_volume).unwrap_or(0.0);
    if volume <= 0.0 {
        return Err(RowIssue::new(
            source_file,
            line,
            &layout.volume_column,
            "volume must be a positive number",
            Some(raw_volume),
        ));
    }

    let raw_time = optional_cell(columns.time).unwrap_or("");
    let Some(time) = read_clock_time(raw_time) else {
        return Err(RowIssue::new(
            source_file,
            line,
            &layout.time_column,
            "time is not a HH:MM clock time",
            Some(raw_time),
        ));
    };

    Ok(TransactionRecord::parsed(
        RecordKey::new(vehicle_id, date, &time),
        parse_optional_locale_number(optional_cell(columns.odometer)),
        volume,
        parse_optional_locale_number(optional_cell(columns.amount)),
        optional_cell(columns.location).unwrap_or(""),
        optional_cell(columns.fuel_type).unwrap_or(""),
        source_file,
    ))
}

/// Normalizes `H:MM`, `HH:MM` and `HH:MM:SS` to `HH:MM`; blank stays blank.
fn read_clock_time(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return Some(String::new());
    }
    ["%H:%M", "%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .map(|time| time.format("%H:%M").to_string())
}
