use std::path::Path;

use crate::ClientResult;
use crate::access::Permission;
use crate::anomalies::{FindingScope, Severity};
use crate::commands::common::{authorize, load_setup, local_now, parse_finding_id};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::AnomalyListData;

#[derive(Debug, Default)]
pub struct AnomaliesListOptions<'a> {
    pub scope: FindingScope,
    pub vehicle_id: Option<String>,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct AnomaliesAckOptions<'a> {
    pub finding_id: String,
    pub comment: String,
    pub user: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn list(scope: FindingScope, vehicle_id: Option<String>) -> ClientResult<SuccessEnvelope> {
    list_with_options(AnomaliesListOptions {
        scope,
        vehicle_id,
        ..AnomaliesListOptions::default()
    })
}

#[doc(hidden)]
pub fn list_with_options(options: AnomaliesListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    authorize(&setup, options.user.as_deref(), Permission::Read)?;

    let findings = setup
        .engine()
        .findings(options.scope, options.vehicle_id.as_deref())?;
    let errors = findings
        .iter()
        .filter(|finding| finding.severity == Severity::Error)
        .count();

    success(
        "anomalies list",
        AnomalyListData {
            scope: options.scope,
            total: findings.len(),
            errors,
            warnings: findings.len() - errors,
            findings,
        },
    )
}

pub fn acknowledge(finding_id: &str, comment: &str) -> ClientResult<SuccessEnvelope> {
    acknowledge_with_options(AnomaliesAckOptions {
        finding_id: finding_id.to_string(),
        comment: comment.to_string(),
        ..AnomaliesAckOptions::default()
    })
}

#[doc(hidden)]
pub fn acknowledge_with_options(options: AnomaliesAckOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let finding_id = parse_finding_id(&options.finding_id, "anomalies ack")?;
    let setup = load_setup(options.home_override)?;
    let actor = authorize(&setup, options.user.as_deref(), Permission::Edit)?;

    let acknowledgement = setup.engine().acknowledge(
        &finding_id,
        &options.comment,
        &actor.username,
        local_now(),
    )?;
    success("anomalies ack", acknowledgement)
}
