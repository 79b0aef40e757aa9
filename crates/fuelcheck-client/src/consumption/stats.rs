use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::anomalies::policy::ThresholdPolicy;
use crate::consumption::recompute::round_to;
use crate::import::FuelFilter;
use crate::ledger::record::TransactionRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsFilter {
    pub vehicle_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl StatsFilter {
    pub fn includes(&self, record: &TransactionRecord) -> bool {
        if let Some(vehicle_id) = self.vehicle_id.as_deref()
            && record.vehicle_id != vehicle_id
        {
            return false;
        }
        if let Some(from) = self.from
            && record.date < from
        {
            return false;
        }
        if let Some(to) = self.to
            && record.date > to
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSummary {
    pub vehicle_id: String,
    pub fill_ups: usize,
    /// Fuel volume only; additives are excluded.
    pub total_volume: f64,
    /// Everything billed to the vehicle, additives included.
    pub total_amount: f64,
    pub average_efficiency: Option<f64>,
    pub plausible_samples: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyConsumption {
    /// `YYYY-MM`.
    pub month: String,
    pub vehicle_id: String,
    pub fill_ups: usize,
    pub total_volume: f64,
    pub total_amount: f64,
    pub average_efficiency: Option<f64>,
}

#[derive(Debug, Default)]
struct Accumulator {
    fill_ups: usize,
    total_volume: f64,
    total_amount: f64,
    efficiency_sum: f64,
    plausible_samples: usize,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
}

impl Accumulator {
    fn add(&mut self, record: &TransactionRecord, is_fuel: bool, plausible: Option<f64>) {
        self.total_amount += record.amount.unwrap_or(0.0);
        self.first_date = Some(self.first_date.map_or(record.date, |date| date.min(record.date)));
        self.last_date = Some(self.last_date.map_or(record.date, |date| date.max(record.date)));
        if !is_fuel {
            return;
        }
        self.fill_ups += 1;
        self.total_volume += record.volume;
        if let Some(efficiency) = plausible {
            self.efficiency_sum += efficiency;
            self.plausible_samples += 1;
        }
    }

    fn average_efficiency(&self) -> Option<f64> {
        if self.plausible_samples == 0 {
            return None;
        }
        let samples = u32::try_from(self.plausible_samples).unwrap_or(u32::MAX);
        Some(round_to(self.efficiency_sum / f64::from(samples), 2))
    }
}

/// Per-vehicle totals; the average only uses efficiencies strictly inside
/// the vehicle's plausible range.
pub fn vehicle_summaries(
    records: &[TransactionRecord],
    policy: ThresholdPolicy<'_>,
    fuel: &FuelFilter,
    filter: &StatsFilter,
) -> Vec<VehicleSummary> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for record in records.iter().filter(|record| filter.includes(record)) {
        let plausible = plausible_efficiency(record, policy);
        groups
            .entry(record.vehicle_id.clone())
            .or_default()
            .add(record, fuel.is_fuel(&record.fuel_type), plausible);
    }

    groups
        .into_iter()
        .map(|(vehicle_id, totals)| VehicleSummary {
            average_efficiency: totals.average_efficiency(),
            vehicle_id,
            fill_ups: totals.fill_ups,
            total_volume: round_to(totals.total_volume, 2),
            total_amount: round_to(totals.total_amount, 2),
            plausible_samples: totals.plausible_samples,
            first_date: totals.first_date,
            last_date: totals.last_date,
        })
        .collect()
}

/// Totals per calendar month and vehicle, months ascending.
pub fn monthly_consumption(
    records: &[TransactionRecord],
    policy: ThresholdPolicy<'_>,
    fuel: &FuelFilter,
    filter: &StatsFilter,
) -> Vec<MonthlyConsumption> {
    let mut groups: BTreeMap<(String, String), Accumulator> = BTreeMap::new();
    for record in records.iter().filter(|record| filter.includes(record)) {
        let month = record.date.format("%Y-%m").to_string();
        let plausible = plausible_efficiency(record, policy);
        groups
            .entry((month, record.vehicle_id.clone()))
            .or_default()
            .add(record, fuel.is_fuel(&record.fuel_type), plausible);
    }

    groups
        .into_iter()
        .map(|((month, vehicle_id), totals)| MonthlyConsumption {
            average_efficiency: totals.average_efficiency(),
            month,
            vehicle_id,
            fill_ups: totals.fill_ups,
            total_volume: round_to(totals.total_volume, 2),
            total_amount: round_to(totals.total_amount, 2),
        })
        .collect()
}

fn plausible_efficiency(record: &TransactionRecord, policy: ThresholdPolicy<'_>) -> Option<f64> {
    let bounds = policy.bounds_for(&record.vehicle_id);
    record
        .efficiency
        .filter(|value| bounds.contains_strictly(*value))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{StatsFilter, monthly_consumption, vehicle_summaries};
    use crate::anomalies::policy::ThresholdPolicy;
    use crate::import::FuelFilter;
    use crate::ledger::record::{RecordKey, TransactionRecord};
    use crate::ledger::vehicles::ThresholdTable;
    use crate::settings::Settings;

    fn fill(
        vehicle: &str,
        month: u32,
        day: u32,
        efficiency: Option<f64>,
        product: &str,
    ) -> TransactionRecord {
        let date = NaiveDate::from_ymd_opt(2025, month, day).unwrap_or(NaiveDate::MIN);
        let mut record = TransactionRecord::parsed(
            RecordKey::new(vehicle, date, "08:00"),
            Some(1000.0),
            40.0,
            Some(60.0),
            "",
            product,
            "s.csv",
        );
        record.efficiency = efficiency;
        record
    }

    #[test]
    fn averages_skip_implausible_values_and_additives() {
        let records = vec![
            fill("AB-CD123", 1, 1, None, "DIESEL"),
            fill("AB-CD123", 1, 8, Some(8.0), "DIESEL"),
            fill("AB-CD123", 1, 15, Some(10.0), "DIESEL"),
            fill("AB-CD123", 1, 22, Some(40.0), "DIESEL"),
            fill("AB-CD123", 1, 22, None, "ADBLUE"),
        ];
        let table = ThresholdTable::default();
        let policy = ThresholdPolicy::new(&table, &Settings::default());

        let summaries = vehicle_summaries(
            &records,
            policy,
            &FuelFilter::default(),
            &StatsFilter::default(),
        );
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.fill_ups, 4);
        assert_eq!(summary.total_volume, 160.0);
        assert_eq!(summary.total_amount, 300.0);
        assert_eq!(summary.average_efficiency, Some(9.0));
        assert_eq!(summary.plausible_samples, 2);
    }

    #[test]
    fn monthly_rows_group_by_month_then_vehicle() {
        let records = vec![
            fill("B-2", 2, 3, Some(6.0), "SUPER"),
            fill("A-1", 2, 4, Some(7.0), "DIESEL"),
            fill("A-1", 1, 4, Some(9.0), "DIESEL"),
        ];
        let table = ThresholdTable::default();
        let policy = ThresholdPolicy::new(&table, &Settings::default());

        let months = monthly_consumption(
            &records,
            policy,
            &FuelFilter::default(),
            &StatsFilter::default(),
        );
        let keys = months
            .iter()
            .map(|row| (row.month.as_str(), row.vehicle_id.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![("2025-01", "A-1"), ("2025-02", "A-1"), ("2025-02", "B-2")]);
    }

    #[test]
    fn filters_restrict_vehicle_and_range() {
        let records = vec![
            fill("A-1", 1, 4, Some(9.0), "DIESEL"),
            fill("A-1", 3, 4, Some(7.0), "DIESEL"),
            fill("B-2", 1, 5, Some(6.0), "DIESEL"),
        ];
        let table = ThresholdTable::default();
        let policy = ThresholdPolicy::new(&table, &Settings::default());
        let filter = StatsFilter {
            vehicle_id: Some("A-1".to_string()),
            from: NaiveDate::from_ymd_opt(2025, 2, 1),
            to: None,
        };

        let summaries = vehicle_summaries(&records, policy, &FuelFilter::default(), &filter);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].fill_ups, 1);
        assert_eq!(summaries[0].average_efficiency, Some(7.0));
    }
}
