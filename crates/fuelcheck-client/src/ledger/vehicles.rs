use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::settings::{DEFAULT_MAX_EFFICIENCY, DEFAULT_MIN_EFFICIENCY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleThreshold {
    pub vehicle_id: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub owner_email: String,
    #[serde(default)]
    pub min_efficiency: Option<f64>,
    #[serde(default)]
    pub max_efficiency: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

impl VehicleThreshold {
    pub fn new(vehicle_id: &str) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            owner_name: String::new(),
            owner_email: String::new(),
            min_efficiency: Some(DEFAULT_MIN_EFFICIENCY),
            max_efficiency: Some(DEFAULT_MAX_EFFICIENCY),
            notes: String::new(),
        }
    }

    /// Trimmed owner address, or `None` when nobody can be notified.
    pub fn reachable_email(&self) -> Option<&str> {
        let trimmed = self.owner_email.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// Per-vehicle owner and threshold configuration, at most one per vehicle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdTable {
    entries: BTreeMap<String, VehicleThreshold>,
}

impl ThresholdTable {
    pub fn get(&self, vehicle_id: &str) -> Option<&VehicleThreshold> {
        self.entries.get(vehicle_id)
    }

    /// Inserts or replaces the entry for its vehicle; returns the previous one.
    pub fn upsert(&mut self, threshold: VehicleThreshold) -> Option<VehicleThreshold> {
        self.entries.insert(threshold.vehicle_id.clone(), threshold)
    }

    pub fn remove(&mut self, vehicle_id: &str) -> Option<VehicleThreshold> {
        self.entries.remove(vehicle_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleThreshold> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<VehicleThreshold> for ThresholdTable {
    fn from_iter<I: IntoIterator<Item = VehicleThreshold>>(iter: I) -> Self {
        let mut table = Self::default();
        for threshold in iter {
            table.upsert(threshold);
        }
        table
    }
}

/// On-disk shape of `vehicles.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct VehiclesFile {
    #[serde(default)]
    pub(crate) vehicles: Vec<VehicleThreshold>,
}

impl From<&ThresholdTable> for VehiclesFile {
    fn from(table: &ThresholdTable) -> Self {
        Self {
            vehicles: table.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ThresholdTable, VehicleThreshold};

    #[test]
    fn later_entries_replace_earlier_ones_for_the_same_vehicle() {
        let mut first = VehicleThreshold::new("AB-CD123");
        first.owner_email = "first@example.com".to_string();
        let mut second = VehicleThreshold::new("AB-CD123");
        second.owner_email = "second@example.com".to_string();

        let table = [first, second].into_iter().collect::<ThresholdTable>();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("AB-CD123").and_then(VehicleThreshold::reachable_email),
            Some("second@example.com")
        );
    }

    #[test]
    fn blank_email_is_unreachable() {
        let mut threshold = VehicleThreshold::new("AB-CD123");
        threshold.owner_email = "   ".to_string();
        assert_eq!(threshold.reachable_email(), None);
    }
}
