pub mod recompute;
pub mod stats;

pub use recompute::recompute;
pub use stats::{MonthlyConsumption, StatsFilter, VehicleSummary, monthly_consumption, vehicle_summaries};
