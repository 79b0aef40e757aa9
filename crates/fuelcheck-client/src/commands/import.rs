use std::path::{Path, PathBuf};

use crate::access::Permission;
use crate::commands::common::{authorize, load_setup, local_now};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ImportListData;
use crate::import::{FormatHint, ImportSource};
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct ImportRunOptions<'a> {
    pub paths: Vec<PathBuf>,
    pub format: FormatHint,
    pub dry_run: bool,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct ImportListOptions<'a> {
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn run(paths: Vec<PathBuf>, format: FormatHint, dry_run: bool) -> ClientResult<SuccessEnvelope> {
    run_with_options(ImportRunOptions {
        paths,
        format,
        dry_run,
        ..ImportRunOptions::default()
    })
}

#[doc(hidden)]
pub fn run_with_options(options: ImportRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    if options.paths.is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            "Pass at least one export file to import.",
            Some("import create"),
        ));
    }

    let setup = load_setup(options.home_override)?;
    let permission = if options.dry_run {
        Permission::Read
    } else {
        Permission::Import
    };
    authorize(&setup, options.user.as_deref(), permission)?;

    let sources = options
        .paths
        .iter()
        .map(|path| ImportSource::read(path, options.format))
        .collect::<ClientResult<Vec<_>>>()?;

    let mut engine = setup.engine();
    let data = engine.import(&sources, options.dry_run, local_now())?;
    success("import create", data)
}

pub fn list() -> ClientResult<SuccessEnvelope> {
    list_with_options(ImportListOptions::default())
}

#[doc(hidden)]
pub fn list_with_options(options: ImportListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::Read)?;

    let log = setup.engine().transactions()?;
    let mut imports = log.imports;
    imports.reverse();
    success("import list", ImportListData { imports })
}
