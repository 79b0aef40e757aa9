use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::ledger::vehicles::VehiclesFile;
use crate::migrations::decode_ledger;
use crate::notify::template::MessageTemplate;
use crate::settings::Settings;
use crate::state::{
    DATA_FILES, LEDGER_FILE, SETTINGS_FILE, TEMPLATE_FILE, VEHICLES_FILE, map_io_error,
    read_optional, write_atomic,
};
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub archive: String,
    pub files: Vec<String>,
}

/// Zips every data file that exists under `home` into `destination`.
pub fn create_backup(home: &Path, destination: &Path) -> ClientResult<BackupReport> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = Vec::new();
    for name in DATA_FILES {
        let Some(body) = read_optional(&home.join(name))? else {
            continue;
        };
        writer
            .start_file(name, options)
            .map_err(|error| ClientError::storage_write_failed(destination, &error.to_string()))?;
        writer
            .write_all(body.as_bytes())
            .map_err(|error| ClientError::storage_write_failed(destination, &error.to_string()))?;
        files.push(name.to_string());
    }

    let archive = writer
        .finish()
        .map_err(|error| ClientError::storage_write_failed(destination, &error.to_string()))?
        .into_inner();
    write_atomic(destination, &archive)?;

    tracing::info!(archive = %destination.display(), files = files.len(), "created backup");
    Ok(BackupReport {
        archive: destination.display().to_string(),
        files,
    })
}

/// Restores data files from an archive made by [`create_backup`].
///
/// Every recognized member is decoded before anything is written, so a bad
/// archive leaves the data home untouched. Unknown members are ignored.
pub fn restore_backup(home: &Path, archive_path: &Path) -> ClientResult<BackupReport> {
    let bytes = std::fs::read(archive_path).map_err(|error| map_io_error(archive_path, &error))?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|error| ClientError::backup_invalid(archive_path, &error.to_string()))?;

    let mut staged: Vec<(&'static str, String)> = Vec::new();
    for index in 0..archive.len() {
        let mut member = archive
            .by_index(index)
            .map_err(|error| ClientError::backup_invalid(archive_path, &error.to_string()))?;
        if member.is_dir() {
            continue;
        }
        let base_name = member.name().rsplit('/').next().unwrap_or_default().to_string();
        let Some(known) = DATA_FILES.into_iter().find(|name| *name == base_name) else {
            tracing::debug!(member = %member.name(), "skipping unknown backup member");
            continue;
        };

        let mut body = String::new();
        member
            .read_to_string(&mut body)
            .map_err(|error| ClientError::backup_invalid(archive_path, &error.to_string()))?;
        validate_member(known, &body).map_err(|detail| {
            ClientError::backup_invalid(archive_path, &format!("{known}: {detail}"))
        })?;
        staged.retain(|(name, _)| *name != known);
        staged.push((known, body));
    }

    if staged.is_empty() {
        return Err(ClientError::backup_invalid(
            archive_path,
            "the archive contains no fuelcheck data files",
        ));
    }

    let mut files = Vec::new();
    for (name, body) in staged {
        write_atomic(&home.join(name), body.as_bytes())?;
        files.push(name.to_string());
    }

    tracing::info!(archive = %archive_path.display(), files = files.len(), "restored backup");
    Ok(BackupReport {
        archive: archive_path.display().to_string(),
        files,
    })
}

fn validate_member(name: &str, body: &str) -> Result<(), String> {
    match name {
        LEDGER_FILE => decode_ledger(body).map(|_| ()),
        VEHICLES_FILE => serde_json::from_str::<VehiclesFile>(body)
            .map(|_| ())
            .map_err(|error| error.to_string()),
        SETTINGS_FILE => serde_json::from_str::<Settings>(body)
            .map(|_| ())
            .map_err(|error| error.to_string()),
        TEMPLATE_FILE => serde_json::from_str::<MessageTemplate>(body)
            .map(|_| ())
            .map_err(|error| error.to_string()),
        _ => Err(format!("`{name}` is not a data file")),
    }
}

pub fn default_archive_name(now: chrono::NaiveDateTime) -> PathBuf {
    PathBuf::from(format!("fuelcheck-backup-{}.zip", now.format("%Y%m%d-%H%M%S")))
}
