use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MANUAL_SOURCE: &str = "MANUAL";
pub const LOG_SCHEMA_VERSION: u32 = 1;

/// Identity of a fill-up: one vehicle, one date, one time of day.
///
/// Ordering is by vehicle, then date, then time; an empty time sorts first.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub vehicle_id: String,
    pub date: NaiveDate,
    pub time: String,
}

impl RecordKey {
    pub fn new(vehicle_id: &str, date: NaiveDate, time: &str) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            date,
            time: time.to_string(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.vehicle_id,
            self.date.format("%Y-%m-%d"),
            self.time
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub vehicle_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub odometer: Option<f64>,
    pub volume: f64,
    pub amount: Option<f64>,
    pub location: String,
    pub fuel_type: String,
    pub source_file: String,
    pub distance_since_last: Option<f64>,
    pub efficiency: Option<f64>,
    pub acknowledged: bool,
    pub ack_comment: String,
    pub ack_by: String,
    pub ack_at: String,
}

impl TransactionRecord {
    /// A freshly parsed record: no derived values, not acknowledged.
    pub fn parsed(
        key: RecordKey,
        odometer: Option<f64>,
        volume: f64,
        amount: Option<f64>,
        location: &str,
        fuel_type: &str,
        source_file: &str,
    ) -> Self {
        Self {
            vehicle_id: key.vehicle_id,
            date: key.date,
            time: key.time,
            odometer,
            volume,
            amount,
            location: location.to_string(),
            fuel_type: fuel_type.to_string(),
            source_file: source_file.to_string(),
            distance_since_last: None,
            efficiency: None,
            acknowledged: false,
            ack_comment: String::new(),
            ack_by: String::new(),
            ack_at: String::new(),
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.vehicle_id, self.date, &self.time)
    }

    pub fn matches_key(&self, key: &RecordKey) -> bool {
        self.vehicle_id == key.vehicle_id && self.date == key.date && self.time == key.time
    }

    /// Odometer reading usable as a reference point; zero counts as absent.
    pub fn valid_odometer(&self) -> Option<f64> {
        self.odometer.filter(|value| *value > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportAuditEntry {
    pub import_id: String,
    pub timestamp: String,
    pub source_file: String,
    pub accepted: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLog {
    pub schema_version: u32,
    pub transactions: Vec<TransactionRecord>,
    pub imports: Vec<ImportAuditEntry>,
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self {
            schema_version: LOG_SCHEMA_VERSION,
            transactions: Vec::new(),
            imports: Vec::new(),
        }
    }
}

impl TransactionLog {
    pub fn find(&self, key: &RecordKey) -> Option<&TransactionRecord> {
        self.transactions.iter().find(|record| record.matches_key(key))
    }

    pub fn find_mut(&mut self, key: &RecordKey) -> Option<&mut TransactionRecord> {
        self.transactions
            .iter_mut()
            .find(|record| record.matches_key(key))
    }

    pub fn was_imported(&self, source_file: &str) -> bool {
        self.imports
            .iter()
            .any(|entry| entry.source_file == source_file)
    }

    /// Records in `(vehicle_id, date, time)` order.
    pub fn sorted(&self) -> Vec<&TransactionRecord> {
        let mut records = self.transactions.iter().collect::<Vec<_>>();
        records.sort_by(|left, right| left.key().cmp(&right.key()));
        records
    }
}
