use std::path::Path;

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::contracts::types::RowIssue;

pub(crate) const IMPORT_HELP_COMMAND: &str = "fuelcheck import create --help";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Parse,
    Validation,
    Storage,
    Notification,
    Access,
    Internal,
}

impl ErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Validation => "validation",
            Self::Storage => "storage",
            Self::Notification => "notification",
            Self::Access => "access",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn category(&self) -> ErrorCategory {
        match self.code.as_str() {
            "parse_failed" => ErrorCategory::Parse,
            "validation_failed" | "duplicate_record" | "comment_too_short"
            | "finding_not_found" | "invalid_argument" => ErrorCategory::Validation,
            "storage_read_failed"
            | "storage_write_failed"
            | "storage_corrupt"
            | "storage_permission_denied"
            | "backup_invalid" => ErrorCategory::Storage,
            "notification_failed" => ErrorCategory::Notification,
            "permission_denied" => ErrorCategory::Access,
            _ => ErrorCategory::Internal,
        }
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `fuelcheck {cmd} --help` for usage."),
            None => "Run `fuelcheck --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn parse_failed(source_file: &str, reason: &str) -> Self {
        Self::new(
            "parse_failed",
            &format!("Could not read `{source_file}`: {reason}"),
            vec![
                "Check that the file is an unmodified fuel-card export.".to_string(),
                format!("Run `{IMPORT_HELP_COMMAND}` to review supported formats."),
            ],
        )
        .with_data(json!({
            "source_file": source_file,
            "reason": reason,
        }))
    }

    pub fn parse_failed_with_issues(source_file: &str, reason: &str, issues: &[RowIssue]) -> Self {
        Self::parse_failed(source_file, reason).with_data(json!({
            "source_file": source_file,
            "reason": reason,
            "issues": issues,
        }))
    }

    pub fn validation_failed(message: &str, field: &str) -> Self {
        Self::new(
            "validation_failed",
            message,
            vec![format!("Correct `{field}` and retry.")],
        )
        .with_data(json!({
            "field": field,
        }))
    }

    pub fn duplicate_record(vehicle_id: &str, date: &str, time: &str) -> Self {
        Self::new(
            "duplicate_record",
            &format!("A fill-up for `{vehicle_id}` on {date} {time} already exists."),
            vec![
                "Run `fuelcheck history list` to inspect the existing entry.".to_string(),
                "Use `fuelcheck history edit` to change it instead.".to_string(),
            ],
        )
        .with_data(json!({
            "vehicle_id": vehicle_id,
            "date": date,
            "time": time,
        }))
    }

    pub fn comment_too_short(min_chars: usize) -> Self {
        Self::new(
            "comment_too_short",
            &format!("An acknowledgement comment needs at least {min_chars} characters."),
            vec!["Describe why the finding is acceptable and retry.".to_string()],
        )
        .with_data(json!({
            "min_chars": min_chars,
        }))
    }

    pub fn finding_not_found(finding_id: &str) -> Self {
        Self::new(
            "finding_not_found",
            &format!("Finding `{finding_id}` does not match any stored fill-up."),
            vec!["Run `fuelcheck anomalies list --all` to find a valid id.".to_string()],
        )
        .with_data(json!({
            "finding_id": finding_id,
        }))
    }

    pub fn permission_denied(username: &str, role: &str, permission: &str) -> Self {
        Self::new(
            "permission_denied",
            &format!("User `{username}` ({role}) is not allowed to {permission}."),
            vec![
                "Ask an administrator to grant a role with this permission.".to_string(),
                "Or rerun with `--user` set to an authorized account.".to_string(),
            ],
        )
        .with_data(json!({
            "username": username,
            "role": role,
            "permission": permission,
        }))
    }

    pub fn unknown_user(username: &str) -> Self {
        Self::new(
            "permission_denied",
            &format!("User `{username}` is not listed in settings.json."),
            vec!["Add the user to the `users` list in settings.json.".to_string()],
        )
        .with_data(json!({
            "username": username,
        }))
    }

    pub fn notification_failed(recipient: &str, detail: &str) -> Self {
        Self::new(
            "notification_failed",
            &format!("Could not deliver the report to `{recipient}`: {detail}"),
            vec!["Check the outbox directory and retry `fuelcheck notify send`.".to_string()],
        )
        .with_data(json!({
            "recipient": recipient,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn storage_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "storage_permission_denied",
            &format!("Cannot access data files at `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `FUELCHECK_HOME` to a writable directory."
            )],
        )
    }

    pub fn storage_read_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "storage_read_failed",
            &format!("Reading `{location}` failed: {detail}"),
            Vec::new(),
        )
    }

    pub fn storage_write_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "storage_write_failed",
            &format!("Writing `{location}` failed: {detail}"),
            vec!["Check free disk space and retry; the previous file is unchanged.".to_string()],
        )
    }

    pub fn storage_corrupt(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "storage_corrupt",
            &format!("Data file `{location}` is not valid: {detail}"),
            vec![
                format!("Repair `{location}` by hand or restore it with `fuelcheck backup restore`."),
            ],
        )
    }

    pub fn backup_invalid(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "backup_invalid",
            &format!("Backup archive `{location}` cannot be restored: {detail}"),
            vec!["Nothing was overwritten. Pick an archive made by `fuelcheck backup create`.".to_string()],
        )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
