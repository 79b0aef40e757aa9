pub mod anomalies;
pub mod backup;
pub(crate) mod common;
pub mod history;
pub mod import;
pub mod notify;
pub mod stats;
pub mod vehicles;
