pub mod dedupe;
pub mod edit;
pub mod record;
pub mod store;
pub mod vehicles;

pub use record::{ImportAuditEntry, RecordKey, TransactionLog, TransactionRecord};
pub use store::{FileLedgerStore, LedgerStore, MemoryLedgerStore};
pub use vehicles::{ThresholdTable, VehicleThreshold};
