use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use serde::Serialize;
use ulid::Ulid;

use crate::ledger::record::{ImportAuditEntry, RecordKey, TransactionLog, TransactionRecord};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupeReason {
    /// An earlier row of the same merge had the same key.
    Batch,
    /// The key was already stored before this merge.
    ExistingLedger,
}

impl DedupeReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::ExistingLedger => "existing_ledger",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateRecord {
    pub key: String,
    pub source_file: String,
    pub reason: DedupeReason,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct FileMergeCount {
    pub accepted: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeOutcome {
    pub accepted: usize,
    pub duplicates: usize,
    pub per_file: BTreeMap<String, FileMergeCount>,
    pub duplicate_rows: Vec<DuplicateRecord>,
    pub audit_entries: Vec<ImportAuditEntry>,
}

/// Appends records whose key is not yet present and writes one audit entry
/// per source file. Returns how many rows were accepted and skipped.
pub fn merge(
    log: &mut TransactionLog,
    records: Vec<TransactionRecord>,
    merged_at: NaiveDateTime,
) -> MergeOutcome {
    let mut seen = log
        .transactions
        .iter()
        .map(|record| (record.key(), DedupeReason::ExistingLedger))
        .collect::<HashMap<RecordKey, DedupeReason>>();
    let mut outcome = MergeOutcome::default();
    let mut file_order = Vec::new();

    for record in records {
        if !outcome.per_file.contains_key(&record.source_file) {
            file_order.push(record.source_file.clone());
        }
        let counts = outcome
            .per_file
            .entry(record.source_file.clone())
            .or_default();

        let key = record.key();
        if let Some(reason) = seen.get(&key) {
            counts.duplicates += 1;
            outcome.duplicates += 1;
            outcome.duplicate_rows.push(DuplicateRecord {
                key: key.to_string(),
                source_file: record.source_file.clone(),
                reason: *reason,
            });
            continue;
        }

        counts.accepted += 1;
        outcome.accepted += 1;
        seen.insert(key, DedupeReason::Batch);
        log.transactions.push(record);
    }

    let timestamp = merged_at.format("%Y-%m-%d %H:%M").to_string();
    for source_file in file_order {
        let accepted = outcome
            .per_file
            .get(&source_file)
            .map(|counts| counts.accepted)
            .unwrap_or(0);
        let entry = ImportAuditEntry {
            import_id: format!("imp_{}", Ulid::new()),
            timestamp: timestamp.clone(),
            source_file,
            accepted,
        };
        log.imports.push(entry.clone());
        outcome.audit_entries.push(entry);
    }

    tracing::info!(
        accepted = outcome.accepted,
        duplicates = outcome.duplicates,
        files = outcome.audit_entries.len(),
        "merged records into ledger"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{DedupeReason, merge};
    use crate::ledger::record::{RecordKey, TransactionLog, TransactionRecord};

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 1)
            .and_then(|date| date.and_hms_opt(9, 30, 0))
            .unwrap_or_default()
    }

    fn record(vehicle: &str, day: u32, time: &str, source: &str) -> TransactionRecord {
        let date = NaiveDate::from_ymd_opt(2025, 3, day).unwrap_or(NaiveDate::MIN);
        TransactionRecord::parsed(
            RecordKey::new(vehicle, date, time),
            Some(1000.0 + f64::from(day)),
            40.0,
            Some(70.0),
            "Station",
            "DIESEL",
            source,
        )
    }

    #[test]
    fn merging_the_same_batch_twice_is_idempotent() {
        let batch = vec![
            record("AB-CD123", 1, "08:00", "march.csv"),
            record("AB-CD123", 2, "08:00", "march.csv"),
            record("XY-Z9", 2, "09:00", "march.csv"),
        ];
        let mut log = TransactionLog::default();

        let first = merge(&mut log, batch.clone(), at());
        assert_eq!((first.accepted, first.duplicates), (3, 0));

        let second = merge(&mut log, batch, at());
        assert_eq!((second.accepted, second.duplicates), (0, 3));
        assert_eq!(log.transactions.len(), 3);
        assert!(
            second
                .duplicate_rows
                .iter()
                .all(|row| row.reason == DedupeReason::ExistingLedger)
        );
    }

    #[test]
    fn duplicates_inside_one_batch_keep_the_first_row() {
        let mut later = record("AB-CD123", 1, "08:00", "b.csv");
        later.volume = 99.0;
        let batch = vec![record("AB-CD123", 1, "08:00", "a.csv"), later];
        let mut log = TransactionLog::default();

        let outcome = merge(&mut log, batch, at());
        assert_eq!((outcome.accepted, outcome.duplicates), (1, 1));
        assert_eq!(outcome.duplicate_rows[0].reason, DedupeReason::Batch);
        assert_eq!(log.transactions[0].volume, 40.0);
    }

    #[test]
    fn one_audit_entry_per_source_file() {
        let batch = vec![
            record("AB-CD123", 1, "08:00", "a.csv"),
            record("AB-CD123", 2, "08:00", "b.csv"),
            record("AB-CD123", 3, "08:00", "a.csv"),
        ];
        let mut log = TransactionLog::default();

        let outcome = merge(&mut log, batch, at());
        let files = log
            .imports
            .iter()
            .map(|entry| (entry.source_file.as_str(), entry.accepted))
            .collect::<Vec<_>>();
        assert_eq!(files, vec![("a.csv", 2), ("b.csv", 1)]);
        assert_eq!(outcome.audit_entries.len(), 2);
        assert!(log.imports.iter().all(|entry| entry.import_id.starts_with("imp_")));
        assert_eq!(log.imports[0].timestamp, "2025-04-01 09:30");
    }
}
