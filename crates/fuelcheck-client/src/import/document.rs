use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

use crate::contracts::types::RowIssue;
use crate::import::ParseOutcome;
use crate::import::number::parse_locale_number;
use crate::ledger::record::{RecordKey, TransactionRecord};
use crate::settings::DocumentLayout;
use crate::{ClientError, ClientResult};

type TableRow = Vec<Option<String>>;

/// Table rows as produced by a document table extractor, either flat or
/// grouped per table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtractedTables {
    Rows(Vec<TableRow>),
    Tables(Vec<Vec<TableRow>>),
}

impl ExtractedTables {
    fn into_rows(self) -> Vec<TableRow> {
        match self {
            Self::Rows(rows) => rows,
            Self::Tables(tables) => tables.into_iter().flatten().collect(),
        }
    }
}

struct DocumentPatterns {
    vehicle_marker: Regex,
    data_row: Regex,
    dated_line: Regex,
    clock_time: Regex,
    leading_digits: Regex,
    station_number: Regex,
    product: Regex,
}

impl DocumentPatterns {
    fn compile() -> ClientResult<Self> {
        let build = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|error| ClientError::internal_serialization(&error.to_string()))
        };
        Ok(Self {
            vehicle_marker: build(r"VEHICLE:\s*([A-Z]{2,3}-[A-Z]{1,2}\s*\d+[A-Z]?)\s+CARD")?,
            data_row: build(r"^\d{2}\.\d{2}\.\d{4}")?,
            dated_line: build(r"^(\d{2}\.\d{2}\.\d{4})\s+(.+)")?,
            clock_time: build(r"\d{2}:\d{2}")?,
            leading_digits: build(r"^\d+")?,
            station_number: build(r"\d{7}")?,
            product: build(r"^([A-Z0-9\s\(\)]+)\s+\d{4}")?,
        })
    }
}

/// Parses extracted invoice tables. Vehicle marker rows switch the current
/// vehicle; dated rows below a marker carry one or more fill-ups whose cells
/// are split on line breaks and paired by position.
pub(crate) fn parse_document(
    content: &str,
    source_file: &str,
    layout: &DocumentLayout,
) -> ClientResult<ParseOutcome> {
    let tables = serde_json::from_str::<ExtractedTables>(content).map_err(|error| {
        ClientError::parse_failed(
            source_file,
            &format!("document is not an extracted table export ({error})"),
        )
    })?;
    let patterns = DocumentPatterns::compile()?;

    let mut outcome = ParseOutcome::default();
    let mut current_vehicle: Option<String> = None;

    for (index, row) in tables.into_rows().iter().enumerate() {
        let row_number = index + 1;
        let Some(first_cell) = row.first().and_then(Option::as_deref) else {
            continue;
        };
        if first_cell.is_empty() {
            continue;
        }

        if let Some(captures) = patterns.vehicle_marker.captures(first_cell) {
            current_vehicle = captures
                .get(1)
                .map(|plate| plate.as_str().replace(' ', ""));
            continue;
        }

        if layout
            .skip_markers
            .iter()
            .any(|marker| first_cell.contains(marker.as_str()))
        {
            continue;
        }

        if !patterns.data_row.is_match(first_cell) {
            continue;
        }
        let Some(vehicle_id) = current_vehicle.as_deref() else {
            tracing::debug!(source_file, row = row_number, "dated row before any vehicle marker");
            continue;
        };

        let products = split_cell(row, layout.product_column);
        let volumes = split_cell(row, layout.volume_column);
        let amounts = split_cell(row, layout.amount_column);

        for (line_index, line) in first_cell.split('\n').enumerate() {
            let Some(captures) = patterns.dated_line.captures(line) else {
                continue;
            };
            let raw_date = captures.get(1).map_or("", |value| value.as_str());
            let rest = captures.get(2).map_or("", |value| value.as_str());
            outcome.rows_read += 1;

            let Ok(date) = NaiveDate::parse_from_str(raw_date, "%d.%m.%Y") else {
                outcome.issues.push(RowIssue::new(
                    source_file,
                    row_number,
                    "date",
                    "date is not a calendar date",
                    Some(raw_date),
                ));
                continue;
            };

            let volume = volumes
                .get(line_index)
                .and_then(|value| parse_locale_number(value))
                .unwrap_or(0.0);
            if volume <= 0.0 {
                continue;
            }

            let (time, odometer) = read_time_and_odometer(&patterns, rest);
            let location = patterns
                .station_number
                .find(rest)
                .map(|station| rest[..station.start()].trim())
                .unwrap_or("");
            let fuel_type = products
                .get(line_index)
                .and_then(|value| patterns.product.captures(value))
                .and_then(|product| product.get(1))
                .map_or("", |product| product.as_str().trim());
            let amount = amounts
                .get(line_index)
                .and_then(|value| parse_locale_number(value));

            outcome.records.push(TransactionRecord::parsed(
                RecordKey::new(vehicle_id, date, time),
                odometer,
                volume,
                amount,
                location,
                fuel_type,
                source_file,
            ));
        }
    }

    if outcome.records.is_empty() {
        return Err(ClientError::parse_failed_with_issues(
            source_file,
            "no fill-ups could be extracted from the document",
            &outcome.issues,
        ));
    }

    outcome.records.sort_by_key(TransactionRecord::key);
    Ok(outcome)
}

fn split_cell(row: &TableRow, column: usize) -> Vec<&str> {
    row.get(column)
        .and_then(Option::as_deref)
        .map(|cell| cell.split('\n').map(str::trim).collect())
        .unwrap_or_default()
}

/// Time is the first `HH:MM`; the odometer is the integer right after it.
fn read_time_and_odometer<'a>(
    patterns: &DocumentPatterns,
    rest: &'a str,
) -> (&'a str, Option<f64>) {
    let Some(time) = patterns.clock_time.find(rest) else {
        return ("", None);
    };
    let after = rest[time.end()..].trim_start();
    let odometer = patterns
        .leading_digits
        .find(after)
        .and_then(|digits| digits.as_str().parse::<f64>().ok());
    (time.as_str(), odometer)
}
