use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::anomalies::finding::{AnomalyFinding, Severity};
use crate::ledger::vehicles::ThresholdTable;

/// Everything a message for one vehicle needs; no further lookups required.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub owner_name: String,
    pub owner_email: String,
    pub vehicle_id: String,
    pub total_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub generated_on: NaiveDate,
    /// Most recent first.
    pub findings: Vec<AnomalyFinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreachableVehicle {
    pub vehicle_id: String,
    pub owner_name: String,
    pub open_findings: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoutingPlan {
    /// Keyed by owner e-mail; one owner may hold several vehicles.
    pub recipients: BTreeMap<String, Vec<NotificationPayload>>,
    pub unreachable: Vec<UnreachableVehicle>,
}

impl RoutingPlan {
    pub fn payload_count(&self) -> usize {
        self.recipients.values().map(Vec::len).sum()
    }

    pub fn payloads(&self) -> impl Iterator<Item = &NotificationPayload> {
        self.recipients.values().flatten()
    }
}

pub fn route(findings: &[AnomalyFinding], owners: &ThresholdTable, today: NaiveDate) -> RoutingPlan {
    let mut by_vehicle: BTreeMap<&str, Vec<&AnomalyFinding>> = BTreeMap::new();
    for finding in findings.iter().filter(|finding| finding.is_open()) {
        by_vehicle
            .entry(finding.vehicle_id.as_str())
            .or_default()
            .push(finding);
    }

    let mut plan = RoutingPlan::default();
    for (vehicle_id, open) in by_vehicle {
        let contact = owners.get(vehicle_id);
        let owner_name = contact
            .map(|threshold| threshold.owner_name.trim().to_string())
            .unwrap_or_default();

        let Some(email) = contact.and_then(|threshold| threshold.reachable_email()) else {
            let reason = if contact.is_some() {
                "no owner e-mail configured"
            } else {
                "vehicle has no owner entry"
            };
            plan.unreachable.push(UnreachableVehicle {
                vehicle_id: vehicle_id.to_string(),
                owner_name,
                open_findings: open.len(),
                reason: reason.to_string(),
            });
            continue;
        };

        let mut sorted = open.into_iter().cloned().collect::<Vec<_>>();
        sorted.sort_by(|left, right| {
            (right.date, right.time.as_str()).cmp(&(left.date, left.time.as_str()))
        });
        let error_count = sorted
            .iter()
            .filter(|finding| finding.severity == Severity::Error)
            .count();

        plan.recipients
            .entry(email.to_string())
            .or_default()
            .push(NotificationPayload {
                owner_name,
                owner_email: email.to_string(),
                vehicle_id: vehicle_id.to_string(),
                total_count: sorted.len(),
                error_count,
                warning_count: sorted.len() - error_count,
                generated_on: today,
                findings: sorted,
            });
    }

    tracing::debug!(
        payloads = plan.payload_count(),
        unreachable = plan.unreachable.len(),
        "routed open findings"
    );
    plan
}
