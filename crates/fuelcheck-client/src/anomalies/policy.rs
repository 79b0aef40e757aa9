use serde::Serialize;

use crate::ledger::vehicles::ThresholdTable;
use crate::settings::Settings;

/// Plausible efficiency range for one vehicle, in volume per 100 distance
/// units. Values equal to a bound are plausible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyBounds {
    pub min: f64,
    pub max: f64,
}

impl EfficiencyBounds {
    pub fn contains_strictly(self, value: f64) -> bool {
        value > self.min && value < self.max
    }
}

/// Resolves per-vehicle bounds against configured defaults.
///
/// A bound that is absent or zero falls back to the default for that bound
/// only, so a vehicle may override just one side.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdPolicy<'a> {
    table: &'a ThresholdTable,
    defaults: EfficiencyBounds,
}

impl<'a> ThresholdPolicy<'a> {
    pub fn new(table: &'a ThresholdTable, settings: &Settings) -> Self {
        Self {
            table,
            defaults: EfficiencyBounds {
                min: settings.default_min_efficiency,
                max: settings.default_max_efficiency,
            },
        }
    }

    pub fn defaults(self) -> EfficiencyBounds {
        self.defaults
    }

    pub fn bounds_for(self, vehicle_id: &str) -> EfficiencyBounds {
        let Some(threshold) = self.table.get(vehicle_id) else {
            return self.defaults;
        };
        EfficiencyBounds {
            min: configured_or(threshold.min_efficiency, self.defaults.min),
            max: configured_or(threshold.max_efficiency, self.defaults.max),
        }
    }
}

fn configured_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(bound) if bound != 0.0 && bound.is_finite() => bound,
        _ => fallback,
    }
}
