use std::fs;
use std::path::{Path, PathBuf};

use fuelcheck_client::SuccessEnvelope;
use fuelcheck_client::anomalies::FindingScope;
use fuelcheck_client::commands::anomalies::{self, AnomaliesListOptions};
use fuelcheck_client::commands::import::{self, ImportRunOptions};
use fuelcheck_client::commands::vehicles::{self, VehiclesSetOptions};
use fuelcheck_client::import::FormatHint;
use serde_json::Value;
use tempfile::{Builder, TempDir};

pub const INVOICE_HEADER: &str =
    "Kennzeichen;km-Stand;Lieferdatum;Lieferzeit;Menge;Warenart;Wert incl. USt;Name";

pub fn temp_home(prefix: &str) -> std::io::Result<(TempDir, PathBuf)> {
    let dir = Builder::new().prefix(prefix).tempdir()?;
    let home = dir.path().join("fuelcheck-home");
    fs::create_dir_all(&home)?;
    Ok((dir, home))
}

/// A vendor export: header, four preamble lines, then the given rows.
pub fn invoice(rows: &[&str]) -> String {
    let mut lines = vec![
        INVOICE_HEADER.to_string(),
        "Kunde 40711".to_string(),
        "Zeitraum 01.03.2025 - 31.03.2025".to_string(),
        String::new(),
        "Rechnung 2025-03".to_string(),
    ];
    lines.extend(rows.iter().map(|row| (*row).to_string()));
    lines.join("\n") + "\n"
}

pub fn write_fixture(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let written = fs::write(&path, body);
    assert!(written.is_ok());
    path
}

pub fn to_payload(result: fuelcheck_client::ClientResult<SuccessEnvelope>) -> Value {
    assert!(result.is_ok());
    if let Ok(success) = result {
        let payload = serde_json::to_value(success);
        assert!(payload.is_ok());
        if let Ok(value) = payload {
            return value;
        }
    }
    Value::Null
}

pub fn import_files(home: &Path, paths: &[PathBuf], dry_run: bool) -> Value {
    to_payload(import::run_with_options(ImportRunOptions {
        paths: paths.to_vec(),
        format: FormatHint::Auto,
        dry_run,
        home_override: Some(home),
        ..ImportRunOptions::default()
    }))
}

/// Writes `rows` as a delimited export named `name` next to the data home and
/// imports it.
pub fn import_invoice(home: &Path, name: &str, rows: &[&str]) -> Value {
    let fixture_dir = home.parent().unwrap_or(home).to_path_buf();
    let path = write_fixture(&fixture_dir, name, &invoice(rows));
    import_files(home, &[path], false)
}

pub fn findings(home: &Path, scope: FindingScope) -> Vec<Value> {
    let payload = to_payload(anomalies::list_with_options(AnomaliesListOptions {
        scope,
        home_override: Some(home),
        ..AnomaliesListOptions::default()
    }));
    payload["data"]["findings"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}

pub fn set_owner(home: &Path, vehicle_id: &str, owner_name: &str, owner_email: &str) {
    let result = vehicles::set(VehiclesSetOptions {
        vehicle_id: vehicle_id.to_string(),
        owner_name: Some(owner_name.to_string()),
        owner_email: Some(owner_email.to_string()),
        home_override: Some(home),
        ..VehiclesSetOptions::default()
    });
    assert!(result.is_ok());
}

pub fn write_settings(home: &Path, body: &str) {
    let written = fs::write(home.join("settings.json"), body);
    assert!(written.is_ok());
}
