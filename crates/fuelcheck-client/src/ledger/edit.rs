use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::record::{MANUAL_SOURCE, RecordKey, TransactionLog, TransactionRecord};
use crate::{ClientError, ClientResult};

/// Editable fields of a stored record; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub odometer: Option<f64>,
    pub volume: Option<f64>,
    pub amount: Option<f64>,
    pub location: Option<String>,
}

impl RecordUpdate {
    pub fn is_empty(&self) -> bool {
        self.odometer.is_none()
            && self.volume.is_none()
            && self.amount.is_none()
            && self.location.is_none()
    }

    fn validate(&self) -> ClientResult<()> {
        if let Some(volume) = self.volume
            && !is_positive(volume)
        {
            return Err(ClientError::validation_failed(
                "Volume must be greater than zero.",
                "volume",
            ));
        }
        if let Some(odometer) = self.odometer
            && !is_non_negative(odometer)
        {
            return Err(ClientError::validation_failed(
                "Odometer must be a finite number of zero or more.",
                "odometer",
            ));
        }
        if let Some(amount) = self.amount
            && !is_non_negative(amount)
        {
            return Err(ClientError::validation_failed(
                "Amount must be a finite number of zero or more.",
                "amount",
            ));
        }
        Ok(())
    }
}

/// A fill-up typed in by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualEntry {
    pub vehicle_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub odometer: Option<f64>,
    pub volume: f64,
    pub amount: Option<f64>,
    pub location: String,
    pub fuel_type: String,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct DeleteSummary {
    pub transactions_removed: usize,
    pub imports_removed: usize,
}

/// Applies `update` to the record at `key`. Returns the number of changed
/// records: zero when the key is unknown or nothing differed.
pub fn update(
    log: &mut TransactionLog,
    key: &RecordKey,
    update: &RecordUpdate,
) -> ClientResult<usize> {
    update.validate()?;

    let Some(record) = log.find_mut(key) else {
        tracing::debug!(key = %key, "update skipped, key not stored");
        return Ok(0);
    };

    let mut changed = false;
    if let Some(odometer) = update.odometer
        && record.odometer != Some(odometer)
    {
        record.odometer = Some(odometer);
        changed = true;
    }
    if let Some(volume) = update.volume
        && record.volume != volume
    {
        record.volume = volume;
        changed = true;
    }
    if let Some(amount) = update.amount
        && record.amount != Some(amount)
    {
        record.amount = Some(amount);
        changed = true;
    }
    if let Some(location) = update.location.as_deref()
        && record.location != location
    {
        record.location = location.to_string();
        changed = true;
    }
    record.efficiency = None;

    Ok(usize::from(changed))
}

pub fn delete_all(log: &mut TransactionLog) -> DeleteSummary {
    let summary = DeleteSummary {
        transactions_removed: log.transactions.len(),
        imports_removed: log.imports.len(),
    };
    log.transactions.clear();
    log.imports.clear();
    tracing::warn!(
        transactions = summary.transactions_removed,
        imports = summary.imports_removed,
        "deleted all ledger data"
    );
    summary
}

/// Validates and appends a hand-entered record.
pub fn add_manual(
    log: &mut TransactionLog,
    entry: &ManualEntry,
) -> ClientResult<TransactionRecord> {
    let vehicle_id = entry.vehicle_id.trim();
    if vehicle_id.is_empty() {
        return Err(ClientError::validation_failed(
            "A vehicle id is required.",
            "vehicle_id",
        ));
    }
    if !is_positive(entry.volume) {
        return Err(ClientError::validation_failed(
            "Volume must be greater than zero.",
            "volume",
        ));
    }
    if let Some(odometer) = entry.odometer
        && !is_positive(odometer)
    {
        return Err(ClientError::validation_failed(
            "Odometer must be greater than zero when given.",
            "odometer",
        ));
    }
    if let Some(amount) = entry.amount
        && !is_non_negative(amount)
    {
        return Err(ClientError::validation_failed(
            "Amount must be a finite number of zero or more.",
            "amount",
        ));
    }
    let time = entry.time.trim();
    if !is_clock_time(time) {
        return Err(ClientError::validation_failed(
            "Time must be HH:MM or empty.",
            "time",
        ));
    }

    let key = RecordKey::new(vehicle_id, entry.date, time);
    if log.find(&key).is_some() {
        return Err(ClientError::duplicate_record(
            vehicle_id,
            &entry.date.format("%Y-%m-%d").to_string(),
            time,
        ));
    }

    let record = TransactionRecord::parsed(
        key,
        entry.odometer,
        entry.volume,
        entry.amount,
        entry.location.trim(),
        entry.fuel_type.trim(),
        MANUAL_SOURCE,
    );
    log.transactions.push(record.clone());
    Ok(record)
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// `HH:MM` on a 24-hour clock, or empty.
pub(crate) fn is_clock_time(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };
    hours.len() == 2
        && minutes.len() == 2
        && hours.parse::<u8>().is_ok_and(|hour| hour < 24)
        && minutes.parse::<u8>().is_ok_and(|minute| minute < 60)
}
