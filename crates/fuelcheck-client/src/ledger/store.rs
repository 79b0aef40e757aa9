use std::path::{Path, PathBuf};

use crate::ledger::record::TransactionLog;
use crate::ledger::vehicles::{ThresholdTable, VehiclesFile};
use crate::migrations::decode_ledger;
use crate::state::{LEDGER_FILE, VEHICLES_FILE, read_optional, write_atomic};
use crate::{ClientError, ClientResult};

/// Persistence seam for the transaction log and vehicle configuration.
///
/// Loads return a fully migrated snapshot. Saves replace the whole dataset;
/// a failed save must leave the previous state readable.
pub trait LedgerStore {
    fn load_transactions(&self) -> ClientResult<TransactionLog>;
    fn save_transactions(&mut self, log: &TransactionLog) -> ClientResult<()>;
    fn load_thresholds(&self) -> ClientResult<ThresholdTable>;
    fn save_thresholds(&mut self, table: &ThresholdTable) -> ClientResult<()>;
}

/// JSON files under the data home.
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    home: PathBuf,
}

impl FileLedgerStore {
    pub fn new(home: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.home.join(LEDGER_FILE)
    }

    pub fn vehicles_path(&self) -> PathBuf {
        self.home.join(VEHICLES_FILE)
    }
}

impl LedgerStore for FileLedgerStore {
    fn load_transactions(&self) -> ClientResult<TransactionLog> {
        let path = self.ledger_path();
        let Some(body) = read_optional(&path)? else {
            return Ok(TransactionLog::default());
        };

        let (log, report) =
            decode_ledger(&body).map_err(|detail| ClientError::storage_corrupt(&path, &detail))?;
        if report.fields_backfilled > 0 {
            tracing::info!(
                path = %path.display(),
                from_version = report.from_version,
                fields = report.fields_backfilled,
                "backfilled legacy ledger fields"
            );
        }
        Ok(log)
    }

    fn save_transactions(&mut self, log: &TransactionLog) -> ClientResult<()> {
        let body = serde_json::to_vec_pretty(log)
            .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
        write_atomic(&self.ledger_path(), &body)?;
        tracing::debug!(
            transactions = log.transactions.len(),
            imports = log.imports.len(),
            "saved ledger"
        );
        Ok(())
    }

    fn load_thresholds(&self) -> ClientResult<ThresholdTable> {
        let path = self.vehicles_path();
        let Some(body) = read_optional(&path)? else {
            return Ok(ThresholdTable::default());
        };

        let file = serde_json::from_str::<VehiclesFile>(&body)
            .map_err(|error| ClientError::storage_corrupt(&path, &error.to_string()))?;
        Ok(file.vehicles.into_iter().collect())
    }

    fn save_thresholds(&mut self, table: &ThresholdTable) -> ClientResult<()> {
        let body = serde_json::to_vec_pretty(&VehiclesFile::from(table))
            .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
        write_atomic(&self.vehicles_path(), &body)
    }
}

/// In-process store for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    pub log: TransactionLog,
    pub thresholds: ThresholdTable,
    pub saves: usize,
}

impl MemoryLedgerStore {
    pub fn with_thresholds(thresholds: ThresholdTable) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load_transactions(&self) -> ClientResult<TransactionLog> {
        Ok(self.log.clone())
    }

    fn save_transactions(&mut self, log: &TransactionLog) -> ClientResult<()> {
        self.log = log.clone();
        self.saves += 1;
        Ok(())
    }

    fn load_thresholds(&self) -> ClientResult<ThresholdTable> {
        Ok(self.thresholds.clone())
    }

    fn save_thresholds(&mut self, table: &ThresholdTable) -> ClientResult<()> {
        self.thresholds = table.clone();
        Ok(())
    }
}
