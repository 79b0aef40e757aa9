use std::path::{Path, PathBuf};

use crate::ClientResult;
use crate::access::Permission;
use crate::backup::{create_backup, default_archive_name, restore_backup};
use crate::commands::common::{authorize, load_setup, local_now};
use crate::contracts::envelope::{SuccessEnvelope, success};

#[derive(Debug, Default)]
pub struct BackupCreateOptions<'a> {
    /// Defaults to `backups/<timestamp>.zip` under the data home.
    pub output: Option<PathBuf>,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct BackupRestoreOptions<'a> {
    pub archive: PathBuf,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn create(options: BackupCreateOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::Backup)?;

    let destination = options.output.unwrap_or_else(|| {
        setup
            .home
            .join("backups")
            .join(default_archive_name(local_now()))
    });
    let report = create_backup(&setup.home, &destination)?;
    success("backup create", report)
}

pub fn restore(options: BackupRestoreOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::Backup)?;

    let report = restore_backup(&setup.home, &options.archive)?;
    success("backup restore", report)
}
