use std::path::{Path, PathBuf};

use crate::ClientResult;
use crate::access::{Actor, resolve_actor};
use crate::engine::Engine;
use crate::ledger::FileLedgerStore;
use crate::notify::template::{MessageTemplate, save_template};
use crate::settings::{Settings, load_settings, save_settings};
use crate::state::{
    OUTBOX_DIR, SETTINGS_FILE, TEMPLATE_FILE, ensure_data_directory, resolve_data_home,
};

/// Resolved data home plus the settings stored in it.
#[derive(Debug, Clone)]
pub struct SetupContext {
    pub home: PathBuf,
    pub settings: Settings,
}

impl SetupContext {
    pub fn engine(&self) -> Engine<FileLedgerStore> {
        Engine::new(FileLedgerStore::new(&self.home), self.settings.clone())
    }

    pub fn actor(&self, username: Option<&str>) -> ClientResult<Actor> {
        resolve_actor(&self.settings, username)
    }

    pub fn outbox_dir(&self) -> PathBuf {
        self.home.join(OUTBOX_DIR)
    }
}

pub fn ensure_initialized() -> ClientResult<SetupContext> {
    ensure_initialized_with_home_override(None)
}

pub fn ensure_initialized_at(home_override: &Path) -> ClientResult<SetupContext> {
    ensure_initialized_with_home_override(Some(home_override))
}

pub(crate) fn ensure_initialized_with_home_override(
    home_override: Option<&Path>,
) -> ClientResult<SetupContext> {
    let home = resolve_data_home(home_override)?;
    ensure_data_directory(&home)?;
    seed_defaults(&home)?;
    let settings = load_settings(&home)?;
    tracing::debug!(home = %home.display(), users = settings.users.len(), "data home ready");
    Ok(SetupContext { home, settings })
}

/// Writes editable default files into a fresh data home. Existing files are
/// left alone.
fn seed_defaults(home: &Path) -> ClientResult<()> {
    if !home.join(SETTINGS_FILE).exists() {
        save_settings(home, &Settings::default())?;
        tracing::info!(home = %home.display(), "wrote default settings");
    }
    if !home.join(TEMPLATE_FILE).exists() {
        save_template(home, &MessageTemplate::default())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_initialized_at;
    use crate::settings::{Settings, load_settings};

    #[test]
    fn creates_missing_home_with_default_settings() {
        let temp = tempfile::tempdir();
        assert!(temp.is_ok());
        let Ok(temp) = temp else {
            return;
        };
        let home = temp.path().join("nested").join("data");

        let context = ensure_initialized_at(&home);
        assert!(context.is_ok());
        if let Ok(context) = context {
            assert!(home.is_dir());
            assert_eq!(context.settings.default_max_efficiency, 25.0);
            assert!(context.outbox_dir().ends_with("outbox"));
            assert!(home.join("settings.json").is_file());
            assert!(home.join("template.json").is_file());
        }
    }

    #[test]
    fn existing_settings_are_not_overwritten() {
        let temp = tempfile::tempdir();
        assert!(temp.is_ok());
        let Ok(temp) = temp else {
            return;
        };
        let written = std::fs::write(
            temp.path().join("settings.json"),
            r#"{"default_max_efficiency": 18.0}"#,
        );
        assert!(written.is_ok());

        assert!(ensure_initialized_at(temp.path()).is_ok());
        let loaded = load_settings(temp.path());
        assert!(matches!(loaded, Ok(ref settings) if settings.default_max_efficiency == 18.0));
        assert!(loaded.is_ok_and(|settings| settings != Settings::default()));
    }
}
