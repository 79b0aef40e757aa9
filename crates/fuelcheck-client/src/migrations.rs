//! Load-time upgrades of `ledger.json`.
//!
//! Older files may lack derived, acknowledgement or provenance fields. They
//! are filled in here on the raw JSON so that deserialization into
//! [`TransactionLog`] never has to guess about absent keys.

use serde_json::{Map, Value};

use crate::ledger::record::{LOG_SCHEMA_VERSION, TransactionLog};

/// Optional transaction fields and the value an absent key stands for.
const TRANSACTION_BACKFILL: [(&str, BackfillValue); 12] = [
    ("time", BackfillValue::EmptyString),
    ("odometer", BackfillValue::Null),
    ("amount", BackfillValue::Null),
    ("location", BackfillValue::EmptyString),
    ("fuel_type", BackfillValue::EmptyString),
    ("source_file", BackfillValue::EmptyString),
    ("distance_since_last", BackfillValue::Null),
    ("efficiency", BackfillValue::Null),
    ("acknowledged", BackfillValue::False),
    ("ack_comment", BackfillValue::EmptyString),
    ("ack_by", BackfillValue::EmptyString),
    ("ack_at", BackfillValue::EmptyString),
];

const IMPORT_BACKFILL: [(&str, BackfillValue); 3] = [
    ("import_id", BackfillValue::EmptyString),
    ("timestamp", BackfillValue::EmptyString),
    ("accepted", BackfillValue::Zero),
];

#[derive(Debug, Clone, Copy)]
enum BackfillValue {
    Null,
    False,
    Zero,
    EmptyString,
}

impl BackfillValue {
    fn to_value(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::False => Value::Bool(false),
            Self::Zero => Value::from(0),
            Self::EmptyString => Value::String(String::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub fields_backfilled: usize,
}

/// Brings a raw ledger document up to the current schema in place.
pub fn upgrade_ledger_document(document: &mut Value) -> Result<MigrationReport, String> {
    let Some(root) = document.as_object_mut() else {
        return Err("top-level value must be an object".to_string());
    };

    let from_version = root
        .get("schema_version")
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(0);
    if from_version > LOG_SCHEMA_VERSION {
        return Err(format!(
            "schema version {from_version} is newer than supported version {LOG_SCHEMA_VERSION}"
        ));
    }

    let mut fields_backfilled = 0;
    fields_backfilled += backfill_rows(root, "transactions", &TRANSACTION_BACKFILL)?;
    fields_backfilled += backfill_rows(root, "imports", &IMPORT_BACKFILL)?;

    root.insert(
        "schema_version".to_string(),
        Value::from(LOG_SCHEMA_VERSION),
    );

    Ok(MigrationReport {
        from_version,
        fields_backfilled,
    })
}

/// Parses, upgrades and deserializes a ledger file body.
pub fn decode_ledger(body: &str) -> Result<(TransactionLog, MigrationReport), String> {
    let mut document =
        serde_json::from_str::<Value>(body).map_err(|error| error.to_string())?;
    let report = upgrade_ledger_document(&mut document)?;
    let log =
        serde_json::from_value::<TransactionLog>(document).map_err(|error| error.to_string())?;
    Ok((log, report))
}

fn backfill_rows(
    root: &mut Map<String, Value>,
    list_key: &str,
    defaults: &[(&str, BackfillValue)],
) -> Result<usize, String> {
    let list = root
        .entry(list_key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    let Some(rows) = list.as_array_mut() else {
        return Err(format!("`{list_key}` must be an array"));
    };

    let mut filled = 0;
    for (index, row) in rows.iter_mut().enumerate() {
        let Some(object) = row.as_object_mut() else {
            return Err(format!("`{list_key}[{index}]` must be an object"));
        };
        for (field, default) in defaults {
            if !object.contains_key(*field) {
                object.insert((*field).to_string(), default.to_value());
                filled += 1;
            }
        }
    }
    Ok(filled)
}
