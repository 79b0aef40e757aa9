pub mod delimited;
pub mod document;
pub mod fuel;
pub mod input;
pub mod number;

use std::collections::HashSet;

use crate::ClientResult;
use crate::contracts::types::{FileImportOutcome, RowIssue};
use crate::ledger::record::{TransactionLog, TransactionRecord};
use crate::settings::Settings;

pub use fuel::FuelFilter;
pub use input::{FormatHint, ImportSource};

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Accepted records, sorted by `(vehicle_id, date, time)`.
    pub records: Vec<TransactionRecord>,
    /// Rows that were seen but rejected.
    pub issues: Vec<RowIssue>,
    pub rows_read: usize,
}

/// Parses one source into candidate records.
pub fn parse(source: &ImportSource, settings: &Settings) -> ClientResult<ParseOutcome> {
    match source.resolved_format() {
        FormatHint::Document => {
            document::parse_document(&source.content, &source.name, &settings.document)
        }
        FormatHint::Auto | FormatHint::Delimited => {
            delimited::parse_delimited(&source.content, &source.name, &settings.delimited)
        }
    }
}

/// Records from every parseable file of a batch plus one outcome per file.
#[derive(Debug, Clone, Default)]
pub(crate) struct PreparedBatch {
    pub(crate) records: Vec<TransactionRecord>,
    pub(crate) files: Vec<FileImportOutcome>,
}

/// Parses each source, skipping files that were imported before. A parse
/// error is recorded against its file and does not stop the others.
pub(crate) fn prepare_batch(
    sources: &[ImportSource],
    log: &TransactionLog,
    settings: &Settings,
) -> PreparedBatch {
    let mut batch = PreparedBatch::default();
    let mut names_in_batch = HashSet::new();

    for source in sources {
        let format = source.resolved_format();
        if log.was_imported(&source.name) || !names_in_batch.insert(source.name.clone()) {
            tracing::info!(source_file = %source.name, "skipping file imported before");
            batch.files.push(FileImportOutcome::skipped(&source.name, format));
            continue;
        }

        match parse(source, settings) {
            Ok(outcome) => {
                tracing::info!(
                    source_file = %source.name,
                    format = format.as_str(),
                    records = outcome.records.len(),
                    rejected = outcome.issues.len(),
                    "parsed import file"
                );
                batch.files.push(FileImportOutcome::parsed(
                    &source.name,
                    format,
                    outcome.rows_read,
                    outcome.records.len(),
                    outcome.issues,
                ));
                batch.records.extend(outcome.records);
            }
            Err(error) => {
                tracing::warn!(
                    source_file = %source.name,
                    error = %error,
                    "import file failed to parse"
                );
                batch
                    .files
                    .push(FileImportOutcome::failed(&source.name, format, &error));
            }
        }
    }

    batch
}
