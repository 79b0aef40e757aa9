use chrono::{NaiveDate, NaiveDateTime};

use crate::anomalies::{
    Acknowledgement, AnomalyFinding, FindingId, FindingScope, ThresholdPolicy, acknowledge,
    classify, select,
};
use crate::consumption::{StatsFilter, monthly_consumption, recompute, vehicle_summaries};
use crate::contracts::types::{FileImportStatus, ImportData, ImportNextStep, StatsData};
use crate::import::{FuelFilter, ImportSource, prepare_batch};
use crate::ledger::dedupe::merge;
use crate::ledger::edit::{self, DeleteSummary, ManualEntry, RecordUpdate};
use crate::ledger::{
    LedgerStore, RecordKey, ThresholdTable, TransactionLog, TransactionRecord, VehicleThreshold,
};
use crate::notify::{RoutingPlan, route};
use crate::settings::Settings;
use crate::{ClientError, ClientResult};

/// Runs every dataset operation against an injected store.
///
/// Each mutating call loads the current snapshot, applies the change,
/// recomputes derived consumption values and saves the result as a whole.
#[derive(Debug)]
pub struct Engine<S: LedgerStore> {
    store: S,
    settings: Settings,
    fuel: FuelFilter,
}

impl<S: LedgerStore> Engine<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        let fuel = FuelFilter::new(&settings.fuel_keywords);
        Self {
            store,
            settings,
            fuel,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn transactions(&self) -> ClientResult<TransactionLog> {
        self.store.load_transactions()
    }

    pub fn thresholds(&self) -> ClientResult<ThresholdTable> {
        self.store.load_thresholds()
    }

    pub fn import(
        &mut self,
        sources: &[ImportSource],
        dry_run: bool,
        now: NaiveDateTime,
    ) -> ClientResult<ImportData> {
        let mut log = self.store.load_transactions()?;
        let batch = prepare_batch(sources, &log, &self.settings);
        let outcome = merge(&mut log, batch.records, now);

        let mut files = batch.files;
        for file in &mut files {
            if file.status != FileImportStatus::Imported {
                continue;
            }
            if let Some(counts) = outcome.per_file.get(&file.source_file) {
                file.accepted = counts.accepted;
                file.duplicates = counts.duplicates;
            }
        }

        recompute(&mut log.transactions, &self.fuel);
        if !dry_run && !outcome.audit_entries.is_empty() {
            self.store.save_transactions(&log)?;
        }

        let thresholds = self.store.load_thresholds()?;
        let policy = ThresholdPolicy::new(&thresholds, &self.settings);
        let open_findings = classify(&log.transactions, policy)
            .iter()
            .filter(|finding| finding.is_open())
            .count();

        let failed = files
            .iter()
            .filter(|file| file.status == FileImportStatus::Failed)
            .count();
        let message = if dry_run {
            format!(
                "Dry run: {} new and {} duplicate fill-ups found. Nothing was saved.",
                outcome.accepted, outcome.duplicates
            )
        } else {
            format!(
                "Imported {} new fill-ups; skipped {} duplicates.",
                outcome.accepted, outcome.duplicates
            )
        };
        let message = if failed > 0 {
            format!("{message} {failed} file(s) could not be read.")
        } else {
            message
        };

        let next_step = if dry_run {
            ImportNextStep {
                label: "Import for real".to_string(),
                command: "fuelcheck import create <paths..>".to_string(),
            }
        } else if open_findings > 0 {
            ImportNextStep {
                label: "Review open findings".to_string(),
                command: "fuelcheck anomalies list".to_string(),
            }
        } else {
            ImportNextStep {
                label: "Review consumption".to_string(),
                command: "fuelcheck stats".to_string(),
            }
        };

        Ok(ImportData {
            dry_run,
            message,
            accepted: outcome.accepted,
            duplicates: outcome.duplicates,
            files,
            duplicates_preview: outcome.duplicate_rows.into_iter().take(20).collect(),
            audit_entries: outcome.audit_entries,
            open_findings,
            next_step,
        })
    }

    pub fn add_manual(&mut self, entry: &ManualEntry) -> ClientResult<TransactionRecord> {
        let mut log = self.store.load_transactions()?;
        let added = edit::add_manual(&mut log, entry)?;
        recompute(&mut log.transactions, &self.fuel);
        self.store.save_transactions(&log)?;

        let key = added.key();
        Ok(log.find(&key).cloned().unwrap_or(added))
    }

    /// Returns the number of changed records; nothing is saved when zero.
    pub fn update(&mut self, key: &RecordKey, update: &RecordUpdate) -> ClientResult<usize> {
        if update.is_empty() {
            return Err(ClientError::invalid_argument(
                "Nothing to change; pass at least one field to edit.",
            ));
        }
        let mut log = self.store.load_transactions()?;
        let changed = edit::update(&mut log, key, update)?;
        if changed == 0 {
            return Ok(0);
        }
        recompute(&mut log.transactions, &self.fuel);
        self.store.save_transactions(&log)?;
        Ok(changed)
    }

    pub fn delete_all(&mut self) -> ClientResult<DeleteSummary> {
        let mut log = self.store.load_transactions()?;
        let summary = edit::delete_all(&mut log);
        self.store.save_transactions(&log)?;
        Ok(summary)
    }

    pub fn findings(
        &self,
        scope: FindingScope,
        vehicle_id: Option<&str>,
    ) -> ClientResult<Vec<AnomalyFinding>> {
        let mut log = self.store.load_transactions()?;
        let thresholds = self.store.load_thresholds()?;
        recompute(&mut log.transactions, &self.fuel);
        let policy = ThresholdPolicy::new(&thresholds, &self.settings);
        Ok(select(classify(&log.transactions, policy), scope, vehicle_id))
    }

    pub fn acknowledge(
        &mut self,
        finding_id: &FindingId,
        comment: &str,
        user: &str,
        now: NaiveDateTime,
    ) -> ClientResult<Acknowledgement> {
        let mut log = self.store.load_transactions()?;
        let acknowledgement = acknowledge(
            &mut log,
            finding_id,
            comment,
            user,
            self.settings.ack_min_comment_chars,
            now,
        )?;
        recompute(&mut log.transactions, &self.fuel);
        self.store.save_transactions(&log)?;
        Ok(acknowledgement)
    }

    pub fn routing_plan(&self, today: NaiveDate) -> ClientResult<RoutingPlan> {
        let findings = self.findings(FindingScope::Open, None)?;
        let thresholds = self.store.load_thresholds()?;
        Ok(route(&findings, &thresholds, today))
    }

    /// Inserts or replaces a vehicle entry. Returns `true` when it is new.
    pub fn set_threshold(&mut self, threshold: VehicleThreshold) -> ClientResult<bool> {
        validate_threshold(&threshold)?;
        let mut table = self.store.load_thresholds()?;
        let created = table.upsert(threshold).is_none();
        self.store.save_thresholds(&table)?;
        Ok(created)
    }

    pub fn remove_threshold(&mut self, vehicle_id: &str) -> ClientResult<bool> {
        let mut table = self.store.load_thresholds()?;
        if table.remove(vehicle_id).is_none() {
            return Ok(false);
        }
        self.store.save_thresholds(&table)?;
        Ok(true)
    }

    pub fn statistics(&self, filter: &StatsFilter) -> ClientResult<StatsData> {
        let mut log = self.store.load_transactions()?;
        let thresholds = self.store.load_thresholds()?;
        recompute(&mut log.transactions, &self.fuel);
        let policy = ThresholdPolicy::new(&thresholds, &self.settings);
        Ok(StatsData {
            vehicles: vehicle_summaries(&log.transactions, policy, &self.fuel, filter),
            monthly: monthly_consumption(&log.transactions, policy, &self.fuel, filter),
        })
    }
}

fn validate_threshold(threshold: &VehicleThreshold) -> ClientResult<()> {
    if threshold.vehicle_id.trim().is_empty() {
        return Err(ClientError::validation_failed(
            "A vehicle id is required.",
            "vehicle_id",
        ));
    }
    for (field, value) in [
        ("min_efficiency", threshold.min_efficiency),
        ("max_efficiency", threshold.max_efficiency),
    ] {
        if let Some(bound) = value
            && (!bound.is_finite() || bound < 0.0)
        {
            return Err(ClientError::validation_failed(
                "Efficiency bounds must be zero or positive numbers.",
                field,
            ));
        }
    }
    if let (Some(min), Some(max)) = (threshold.min_efficiency, threshold.max_efficiency)
        && min > 0.0
        && max > 0.0
        && min >= max
    {
        return Err(ClientError::validation_failed(
            "The minimum efficiency must be below the maximum.",
            "min_efficiency",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::Engine;
    use crate::anomalies::{FindingKind, FindingScope};
    use crate::import::{FormatHint, ImportSource};
    use crate::ledger::edit::RecordUpdate;
    use crate::ledger::{MemoryLedgerStore, RecordKey, ThresholdTable, VehicleThreshold};
    use crate::settings::Settings;

    const HEADER: &str = "Kennzeichen;km-Stand;Lieferdatum;Lieferzeit;Menge;Warenart;Wert incl. USt;Name\n\n\n\n\n";

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .unwrap_or_default()
    }

    fn engine() -> Engine<MemoryLedgerStore> {
        Engine::new(MemoryLedgerStore::default(), Settings::default())
    }

    fn source(name: &str, rows: &str) -> ImportSource {
        ImportSource::from_text(name, &format!("{HEADER}{rows}"), FormatHint::Auto)
    }

    #[test]
    fn dry_run_reports_counts_without_saving() {
        let mut engine = engine();
        let sources = [source("a.csv", "AB-CD123;1.000;01.03.2025;08:00;30,00;DIESEL;50,00;Nord\n")];

        let report = engine.import(&sources, true, now());
        assert!(matches!(report, Ok(ref data) if data.accepted == 1 && data.dry_run));
        assert_eq!(engine.store().saves, 0);
        assert!(engine.store().log.transactions.is_empty());
    }

    #[test]
    fn import_recomputes_and_counts_open_findings() {
        let mut engine = engine();
        let rows = "AB-CD123;1.000;01.03.2025;08:00;30,00;DIESEL;50,00;Nord\n\
                    AB-CD123;1.300;02.03.2025;08:00;25,00;DIESEL;40,00;Nord\n\
                    AB-CD123;1.250;03.03.2025;08:00;20,00;DIESEL;30,00;Nord\n";

        let report = engine.import(&[source("march.csv", rows)], false, now());
        assert!(report.is_ok());
        if let Ok(data) = report {
            assert_eq!(data.accepted, 3);
            assert_eq!(data.files[0].accepted, 3);
            assert_eq!(data.open_findings, 1);
            assert_eq!(data.audit_entries.len(), 1);
        }
        let stored = &engine.store().log.transactions;
        assert_eq!(stored[1].efficiency, Some(8.33));
        assert_eq!(stored[2].distance_since_last, Some(-50.0));
    }

    #[test]
    fn update_recomputes_later_entries() {
        let mut engine = engine();
        let rows = "AB-CD123;1.000;01.03.2025;08:00;30,00;DIESEL;50,00;Nord\n\
                    AB-CD123;1.500;02.03.2025;08:00;40,00;DIESEL;40,00;Nord\n";
        assert!(engine.import(&[source("a.csv", rows)], false, now()).is_ok());

        let key = RecordKey::new(
            "AB-CD123",
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or(NaiveDate::MIN),
            "08:00",
        );
        let update = RecordUpdate {
            odometer: Some(1100.0),
            ..RecordUpdate::default()
        };
        assert!(matches!(engine.update(&key, &update), Ok(1)));
        assert_eq!(engine.store().log.transactions[1].efficiency, Some(10.0));

        let unknown = RecordKey::new("ZZ-9", key.date, "08:00");
        assert!(matches!(engine.update(&unknown, &update), Ok(0)));
    }

    #[test]
    fn acknowledged_findings_leave_the_open_view() {
        let mut engine = engine();
        let rows = "AB-CD123;;01.03.2025;08:00;30,00;DIESEL;50,00;Nord\n";
        assert!(engine.import(&[source("a.csv", rows)], false, now()).is_ok());

        let open = engine.findings(FindingScope::Open, None).unwrap_or_default();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].kind, FindingKind::MissingOdometer);

        let ack = engine.acknowledge(&open[0].id, "odometer broken", "anna", now());
        assert!(ack.is_ok());
        assert!(engine.findings(FindingScope::Open, None).unwrap_or_default().is_empty());
        let all = engine.findings(FindingScope::All, None).unwrap_or_default();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, open[0].id);
        assert_eq!(all[0].severity, open[0].severity);
        assert!(all[0].acknowledged);
    }

    #[test]
    fn thresholds_validate_and_report_creation() {
        let mut engine = engine();
        let mut threshold = VehicleThreshold::new("AB-CD123");
        assert!(matches!(engine.set_threshold(threshold.clone()), Ok(true)));
        assert!(matches!(engine.set_threshold(threshold.clone()), Ok(false)));

        threshold.min_efficiency = Some(30.0);
        let invalid = engine.set_threshold(threshold);
        assert!(matches!(invalid, Err(ref error) if error.code == "validation_failed"));

        assert!(matches!(engine.remove_threshold("AB-CD123"), Ok(true)));
        assert!(matches!(engine.remove_threshold("AB-CD123"), Ok(false)));
    }

    #[test]
    fn stored_vehicle_bounds_drive_classification() {
        let mut tight = VehicleThreshold::new("AB-CD123");
        tight.max_efficiency = Some(6.0);
        let store = MemoryLedgerStore::with_thresholds([tight].into_iter().collect::<ThresholdTable>());
        let mut engine = Engine::new(store, Settings::default());
        let rows = "AB-CD123;1.000;01.03.2025;08:00;30,00;DIESEL;50,00;Nord\n\
                    AB-CD123;1.500;02.03.2025;08:00;40,00;DIESEL;40,00;Nord\n";
        assert!(engine.import(&[source("a.csv", rows)], false, now()).is_ok());

        let open = engine.findings(FindingScope::Open, None).unwrap_or_default();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].kind, FindingKind::EfficiencyTooHigh);
    }
}
