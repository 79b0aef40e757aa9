pub mod acknowledge;
pub mod classify;
pub mod finding;
pub mod policy;

pub use acknowledge::{ACK_TIMESTAMP_FORMAT, Acknowledgement, acknowledge};
pub use classify::{FindingScope, classify, select};
pub use finding::{AnomalyFinding, FindingId, FindingKind, Severity};
pub use policy::{EfficiencyBounds, ThresholdPolicy};
