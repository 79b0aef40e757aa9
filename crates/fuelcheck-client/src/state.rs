use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{ClientError, ClientResult};

pub const LEDGER_FILE: &str = "ledger.json";
pub const VEHICLES_FILE: &str = "vehicles.json";
pub const SETTINGS_FILE: &str = "settings.json";
pub const TEMPLATE_FILE: &str = "template.json";
pub const OUTBOX_DIR: &str = "outbox";

/// Files that make up one dataset, in backup order.
pub const DATA_FILES: [&str; 4] = [LEDGER_FILE, VEHICLES_FILE, SETTINGS_FILE, TEMPLATE_FILE];

pub fn resolve_data_home(home_override: Option<&Path>) -> ClientResult<PathBuf> {
    let candidate = match home_override {
        Some(path) => path.to_path_buf(),
        None => {
            if let Some(override_path) = std::env::var_os("FUELCHECK_HOME") {
                PathBuf::from(override_path)
            } else if let Some(home_path) = home::home_dir() {
                home_path.join(".fuelcheck")
            } else {
                return Err(ClientError::storage_read_failed(
                    Path::new("."),
                    "Could not resolve a home directory for the data files.",
                ));
            }
        }
    };

    absolutize(&candidate)
}

pub fn ensure_data_directory(path: &Path) -> ClientResult<()> {
    fs::create_dir_all(path).map_err(|error| map_io_error(path, &error))?;
    set_private_permissions_best_effort(path);
    Ok(())
}

/// Reads a data file; `None` when it does not exist yet.
pub fn read_optional(path: &Path) -> ClientResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(body) => Ok(Some(body)),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(map_io_error(path, &error)),
    }
}

/// Replaces `path` with `body` via a sibling temp file and rename.
pub fn write_atomic(path: &Path, body: &[u8]) -> ClientResult<()> {
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    ensure_data_directory(directory)?;

    let mut staged =
        NamedTempFile::new_in(directory).map_err(|error| map_write_error(path, &error))?;
    staged
        .write_all(body)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|error| map_write_error(path, &error))?;
    staged
        .persist(path)
        .map_err(|error| map_write_error(path, &error.error))?;

    tracing::debug!(path = %path.display(), bytes = body.len(), "replaced data file");
    Ok(())
}

pub fn map_io_error(path: &Path, error: &std::io::Error) -> ClientError {
    if error.kind() == std::io::ErrorKind::PermissionDenied {
        return ClientError::storage_permission_denied(path, &error.to_string());
    }

    ClientError::storage_read_failed(path, &error.to_string())
}

fn map_write_error(path: &Path, error: &std::io::Error) -> ClientError {
    if error.kind() == std::io::ErrorKind::PermissionDenied {
        return ClientError::storage_permission_denied(path, &error.to_string());
    }

    ClientError::storage_write_failed(path, &error.to_string())
}

fn absolutize(path: &Path) -> ClientResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|error| ClientError::storage_read_failed(path, &error.to_string()))
}

#[cfg(unix)]
fn set_private_permissions_best_effort(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o700));
}

#[cfg(not(unix))]
fn set_private_permissions_best_effort(_path: &Path) {}
