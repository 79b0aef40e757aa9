use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::access::{Actor, Permission};
use crate::anomalies::FindingId;
use crate::setup::{SetupContext, ensure_initialized, ensure_initialized_at};
use crate::{ClientError, ClientResult};

const DATE_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d.%m.%Y"];

pub(crate) fn load_setup(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    if let Some(home) = home_override {
        return ensure_initialized_at(home);
    }
    ensure_initialized()
}

/// Resolves the acting user and checks one permission before any data is
/// touched.
pub(crate) fn authorize(
    setup: &SetupContext,
    user: Option<&str>,
    permission: Permission,
) -> ClientResult<Actor> {
    let actor = setup.actor(user)?;
    actor.require(permission)?;
    Ok(actor)
}

pub(crate) fn parse_date_arg(value: &str, field: &str, command: &str) -> ClientResult<NaiveDate> {
    let trimmed = value.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| {
            ClientError::invalid_argument_for_command(
                &format!("`{field}` must be a date as YYYY-MM-DD or DD.MM.YYYY, got `{trimmed}`."),
                Some(command),
            )
        })
}

pub(crate) fn parse_optional_date_arg(
    value: Option<&str>,
    field: &str,
    command: &str,
) -> ClientResult<Option<NaiveDate>> {
    value
        .map(|raw| parse_date_arg(raw, field, command))
        .transpose()
}

pub(crate) fn parse_finding_id(value: &str, command: &str) -> ClientResult<FindingId> {
    value.trim().parse::<FindingId>().map_err(|detail| {
        ClientError::invalid_argument_for_command(
            &format!("Invalid finding id: {detail}."),
            Some(command),
        )
    })
}

pub(crate) fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}
