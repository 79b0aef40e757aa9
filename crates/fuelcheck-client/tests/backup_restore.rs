mod support;

use std::fs;
use std::io::{Cursor, Write};

use fuelcheck_client::commands::backup::{self, BackupCreateOptions, BackupRestoreOptions};
use fuelcheck_client::commands::history::{self, HistoryClearOptions, HistoryListOptions};
use support::fleet_testkit::{import_invoice, set_owner, temp_home, to_payload};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const ROWS: [&str; 2] = [
    "AB-CD 123;1.000;01.03.2025;08:00;30,00;DIESEL;50,00;Nord",
    "AB-CD 123;1.300;08.03.2025;08:00;25,00;DIESEL;42,00;Nord",
];

fn stored_rows(home: &std::path::Path) -> u64 {
    let payload = to_payload(history::list_with_options(HistoryListOptions {
        home_override: Some(home),
        ..HistoryListOptions::default()
    }));
    payload["data"]["total"].as_u64().unwrap_or(u64::MAX)
}

#[test]
fn backup_restores_history_after_clear() {
    let temp = temp_home("fuelcheck-backup-roundtrip");
    assert!(temp.is_ok());
    let Ok((dir, home)) = temp else {
        return;
    };
    let _ = import_invoice(&home, "march.csv", &ROWS);
    set_owner(&home, "AB-CD 123", "Anna Berg", "anna@example.com");

    let archive = dir.path().join("fleet.zip");
    let created = to_payload(backup::create(BackupCreateOptions {
        output: Some(archive.clone()),
        home_override: Some(home.as_path()),
        ..BackupCreateOptions::default()
    }));
    let files = created["data"]["files"].as_array().cloned().unwrap_or_default();
    assert!(files.iter().any(|name| name == "ledger.json"));
    assert!(files.iter().any(|name| name == "vehicles.json"));
    assert!(archive.exists());

    let cleared = history::clear(HistoryClearOptions {
        confirmed: true,
        home_override: Some(home.as_path()),
        ..HistoryClearOptions::default()
    });
    assert!(cleared.is_ok());
    assert_eq!(stored_rows(&home), 0);

    let restored = to_payload(backup::restore(BackupRestoreOptions {
        archive,
        home_override: Some(home.as_path()),
        ..BackupRestoreOptions::default()
    }));
    assert_eq!(restored["command"], "backup restore");
    assert_eq!(stored_rows(&home), 2);
}

#[test]
fn default_archive_lands_under_backups() {
    let temp = temp_home("fuelcheck-backup-default");
    assert!(temp.is_ok());
    let Ok((_dir, home)) = temp else {
        return;
    };
    let _ = import_invoice(&home, "march.csv", &ROWS);

    let created = to_payload(backup::create(BackupCreateOptions {
        home_override: Some(home.as_path()),
        ..BackupCreateOptions::default()
    }));
    let archive = created["data"]["archive"].as_str().unwrap_or_default().to_string();
    assert!(archive.starts_with(&home.join("backups").display().to_string()));
    assert!(archive.ends_with(".zip"));
}

#[test]
fn corrupt_member_leaves_the_data_home_untouched() {
    let temp = temp_home("fuelcheck-backup-corrupt");
    assert!(temp.is_ok());
    let Ok((dir, home)) = temp else {
        return;
    };
    let _ = import_invoice(&home, "march.csv", &ROWS);
    let before = fs::read_to_string(home.join("ledger.json")).unwrap_or_default();

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    assert!(writer.start_file("vehicles.json", options).is_ok());
    assert!(writer.write_all(br#"{"vehicles": []}"#).is_ok());
    assert!(writer.start_file("ledger.json", options).is_ok());
    assert!(writer.write_all(b"{ not json").is_ok());
    let finished = writer.finish();
    assert!(finished.is_ok());
    let Ok(cursor) = finished else {
        return;
    };
    let archive = dir.path().join("bad.zip");
    assert!(fs::write(&archive, cursor.into_inner()).is_ok());

    let result = backup::restore(BackupRestoreOptions {
        archive,
        home_override: Some(home.as_path()),
        ..BackupRestoreOptions::default()
    });
    assert!(matches!(result, Err(ref error) if error.code == "backup_invalid"));
    assert_eq!(fs::read_to_string(home.join("ledger.json")).unwrap_or_default(), before);
    assert_eq!(stored_rows(&home), 2);
}

#[test]
fn archives_without_data_files_are_rejected() {
    let temp = temp_home("fuelcheck-backup-empty");
    assert!(temp.is_ok());
    let Ok((dir, home)) = temp else {
        return;
    };

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    assert!(writer.start_file("notes.txt", SimpleFileOptions::default()).is_ok());
    assert!(writer.write_all(b"nothing to see").is_ok());
    let finished = writer.finish();
    assert!(finished.is_ok());
    let Ok(cursor) = finished else {
        return;
    };
    let archive = dir.path().join("other.zip");
    assert!(fs::write(&archive, cursor.into_inner()).is_ok());

    let result = backup::restore(BackupRestoreOptions {
        archive,
        home_override: Some(home.as_path()),
        ..BackupRestoreOptions::default()
    });
    assert!(matches!(result, Err(ref error) if error.code == "backup_invalid"));
}
