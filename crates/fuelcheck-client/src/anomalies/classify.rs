use std::collections::BTreeMap;

use serde::Serialize;

use crate::anomalies::finding::{AnomalyFinding, FindingKind};
use crate::anomalies::policy::ThresholdPolicy;
use crate::ledger::record::TransactionRecord;

/// Which findings a view shows.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingScope {
    #[default]
    Open,
    All,
}

/// Classifies every record; output follows a per-vehicle chronological
/// sweep with vehicles in id order.
///
/// Checks per record, in order: missing odometer, odometer decrease against
/// the previous record of the sweep, then efficiency below or above the
/// vehicle's bounds (strict comparisons, at most one of the two).
pub fn classify(records: &[TransactionRecord], policy: ThresholdPolicy<'_>) -> Vec<AnomalyFinding> {
    let mut by_vehicle: BTreeMap<&str, Vec<&TransactionRecord>> = BTreeMap::new();
    for record in records {
        by_vehicle
            .entry(record.vehicle_id.as_str())
            .or_default()
            .push(record);
    }

    let mut findings = Vec::new();
    for (vehicle_id, mut history) in by_vehicle {
        history.sort_by(|left, right| {
            (left.date, left.time.as_str()).cmp(&(right.date, right.time.as_str()))
        });
        let bounds = policy.bounds_for(vehicle_id);

        let mut previous: Option<&TransactionRecord> = None;
        for record in history {
            let current_odometer = record.valid_odometer();

            if current_odometer.is_none() {
                findings.push(AnomalyFinding::raise(
                    record,
                    FindingKind::MissingOdometer,
                    format!("Fill-up without odometer reading ({:.1} L)", record.volume),
                ));
            }

            // Zero counts as a reading here; only the recompute baseline skips it.
            if let Some(current) = record.odometer
                && let Some(prior) = previous.and_then(|prior| prior.odometer)
            {
                let difference = current - prior;
                if difference < 0.0 {
                    findings.push(AnomalyFinding::raise(
                        record,
                        FindingKind::OdometerDecreased,
                        format!("Difference: {difference:.0} km (previous: {prior:.0})"),
                    ));
                }
            }

            if let Some(efficiency) = record.efficiency {
                if efficiency < bounds.min {
                    findings.push(AnomalyFinding::raise(
                        record,
                        FindingKind::EfficiencyTooLow,
                        format!("{efficiency:.2} L/100km (limit: {} L/100km)", bounds.min),
                    ));
                } else if efficiency > bounds.max {
                    findings.push(AnomalyFinding::raise(
                        record,
                        FindingKind::EfficiencyTooHigh,
                        format!("{efficiency:.2} L/100km (limit: {} L/100km)", bounds.max),
                    ));
                }
            }

            previous = Some(record);
        }
    }

    findings
}

/// Narrows findings to a scope and, optionally, one vehicle.
pub fn select(
    findings: Vec<AnomalyFinding>,
    scope: FindingScope,
    vehicle_id: Option<&str>,
) -> Vec<AnomalyFinding> {
    findings
        .into_iter()
        .filter(|finding| scope == FindingScope::All || finding.is_open())
        .filter(|finding| vehicle_id.is_none_or(|vehicle| finding.vehicle_id == vehicle))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{FindingScope, classify, select};
    use crate::anomalies::finding::{FindingKind, Severity};
    use crate::anomalies::policy::ThresholdPolicy;
    use crate::ledger::record::{RecordKey, TransactionRecord};
    use crate::ledger::vehicles::{ThresholdTable, VehicleThreshold};
    use crate::settings::Settings;

    fn fill(day: u32, odometer: Option<f64>, efficiency: Option<f64>) -> TransactionRecord {
        let date = NaiveDate::from_ymd_opt(2025, 7, day).unwrap_or(NaiveDate::MIN);
        let mut record = TransactionRecord::parsed(
            RecordKey::new("AB-CD123", date, "09:00"),
            odometer,
            40.0,
            None,
            "",
            "DIESEL",
            "t.csv",
        );
        record.efficiency = efficiency;
        record
    }

    fn kinds(records: &[TransactionRecord]) -> Vec<FindingKind> {
        let table = ThresholdTable::default();
        let policy = ThresholdPolicy::new(&table, &Settings::default());
        classify(records, policy)
            .into_iter()
            .map(|finding| finding.kind)
            .collect()
    }

    #[test]
    fn decrease_reports_signed_difference() {
        let records = vec![fill(1, Some(20000.0), None), fill(2, Some(19800.0), None)];
        let table = ThresholdTable::default();
        let findings = classify(&records, ThresholdPolicy::new(&table, &Settings::default()));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::OdometerDecreased);
        assert_eq!(findings[0].severity, Severity::Error);
        assert!(findings[0].detail.contains("-200"));
        assert_eq!(findings[0].id.to_string(), "AB-CD123_2025-07-02_09:00");
    }

    #[test]
    fn bounds_are_exclusive() {
        assert!(kinds(&[fill(1, Some(1.0), Some(3.0))]).is_empty());
        assert!(kinds(&[fill(1, Some(1.0), Some(25.0))]).is_empty());
        assert_eq!(
            kinds(&[fill(1, Some(1.0), Some(2.99))]),
            vec![FindingKind::EfficiencyTooLow]
        );
        assert_eq!(
            kinds(&[fill(1, Some(1.0), Some(25.01))]),
            vec![FindingKind::EfficiencyTooHigh]
        );
    }

    #[test]
    fn zero_reading_is_missing_and_also_a_decrease() {
        let records = vec![
            fill(1, Some(5000.0), None),
            fill(2, Some(0.0), None),
            fill(3, None, None),
            fill(4, Some(5400.0), None),
        ];
        assert_eq!(
            kinds(&records),
            vec![
                FindingKind::MissingOdometer,
                FindingKind::OdometerDecreased,
                FindingKind::MissingOdometer,
            ]
        );

        let table = ThresholdTable::default();
        let findings = classify(&records, ThresholdPolicy::new(&table, &Settings::default()));
        assert_eq!(findings[1].id.to_string(), "AB-CD123_2025-07-02_09:00");
        assert!(findings[1].detail.contains("-5000"));
    }

    #[test]
    fn vehicle_thresholds_override_defaults() {
        let mut threshold = VehicleThreshold::new("AB-CD123");
        threshold.max_efficiency = Some(12.0);
        let table = [threshold].into_iter().collect::<ThresholdTable>();
        let records = vec![fill(1, Some(1.0), Some(13.0))];

        let findings = classify(&records, ThresholdPolicy::new(&table, &Settings::default()));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].detail.contains("limit: 12 L/100km"));
    }

    #[test]
    fn select_hides_acknowledged_findings_from_open_view() {
        let mut acknowledged = fill(2, None, None);
        acknowledged.acknowledged = true;
        let records = vec![fill(1, None, None), acknowledged];
        let table = ThresholdTable::default();
        let findings = classify(&records, ThresholdPolicy::new(&table, &Settings::default()));

        assert_eq!(select(findings.clone(), FindingScope::All, None).len(), 2);
        assert_eq!(select(findings.clone(), FindingScope::Open, None).len(), 1);
        assert!(select(findings, FindingScope::All, Some("OTHER")).is_empty());
    }
}
