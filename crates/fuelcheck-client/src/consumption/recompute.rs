use std::collections::BTreeMap;

use crate::import::FuelFilter;
use crate::ledger::record::TransactionRecord;

/// Rewrites `distance_since_last` and `efficiency` on every record from
/// scratch.
///
/// Records are walked per vehicle in `(date, time)` order. Only fuel
/// purchases take part; other products end up with no derived values. A
/// reading of zero is treated as missing and never becomes the reference.
pub fn recompute(records: &mut [TransactionRecord], fuel: &FuelFilter) {
    let mut by_vehicle: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, record) in records.iter_mut().enumerate() {
        record.distance_since_last = None;
        record.efficiency = None;
        if fuel.is_fuel(&record.fuel_type) {
            by_vehicle
                .entry(record.vehicle_id.clone())
                .or_default()
                .push(index);
        }
    }

    for indexes in by_vehicle.values_mut() {
        indexes.sort_by(|left, right| {
            let left = &records[*left];
            let right = &records[*right];
            (left.date, left.time.as_str()).cmp(&(right.date, right.time.as_str()))
        });

        let mut last_valid_odometer: Option<f64> = None;
        for index in indexes.iter() {
            let record = &mut records[*index];
            let current = record.valid_odometer();

            if let (Some(previous), Some(current)) = (last_valid_odometer, current) {
                let distance = current - previous;
                record.distance_since_last = Some(distance);
                if distance > 0.0 && record.volume > 0.0 {
                    record.efficiency = Some(round_to(record.volume / distance * 100.0, 2));
                }
            }

            if current.is_some() {
                last_valid_odometer = current;
            }
        }
    }

    tracing::debug!(records = records.len(), "recomputed consumption");
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = i32::try_from(decimals).unwrap_or(2);
    let factor = 10_f64.powi(exponent);
    (value * factor).round() / factor
}
