use serde::Serialize;

use crate::anomalies::{AnomalyFinding, EfficiencyBounds, FindingScope};
use crate::consumption::{MonthlyConsumption, VehicleSummary};
use crate::contracts::envelope::ErrorContract;
use crate::error::ClientError;
use crate::import::FormatHint;
use crate::ledger::dedupe::DuplicateRecord;
use crate::ledger::edit::DeleteSummary;
use crate::ledger::{ImportAuditEntry, TransactionRecord, VehicleThreshold};
use crate::notify::{DeliveryReport, RenderedMessage, RoutingPlan, UnreachableVehicle};

/// A rejected input row, located by file and 1-based row number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub source_file: String,
    pub row: usize,
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl RowIssue {
    pub fn new(
        source_file: &str,
        row: usize,
        field: &str,
        message: &str,
        value: Option<&str>,
    ) -> Self {
        Self {
            source_file: source_file.to_string(),
            row,
            field: field.to_string(),
            message: message.to_string(),
            value: value.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileImportStatus {
    Imported,
    AlreadyImported,
    Failed,
}

impl FileImportStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Imported => "imported",
            Self::AlreadyImported => "already_imported",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileImportOutcome {
    pub source_file: String,
    pub format: FormatHint,
    pub status: FileImportStatus,
    pub rows_read: usize,
    pub parsed: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub issues: Vec<RowIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorContract>,
}

impl FileImportOutcome {
    pub(crate) fn parsed(
        source_file: &str,
        format: FormatHint,
        rows_read: usize,
        parsed: usize,
        issues: Vec<RowIssue>,
    ) -> Self {
        Self {
            source_file: source_file.to_string(),
            format,
            status: FileImportStatus::Imported,
            rows_read,
            parsed,
            accepted: 0,
            duplicates: 0,
            issues,
            error: None,
        }
    }

    pub(crate) fn skipped(source_file: &str, format: FormatHint) -> Self {
        Self {
            source_file: source_file.to_string(),
            format,
            status: FileImportStatus::AlreadyImported,
            rows_read: 0,
            parsed: 0,
            accepted: 0,
            duplicates: 0,
            issues: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn failed(source_file: &str, format: FormatHint, error: &ClientError) -> Self {
        Self {
            source_file: source_file.to_string(),
            format,
            status: FileImportStatus::Failed,
            rows_read: 0,
            parsed: 0,
            accepted: 0,
            duplicates: 0,
            issues: Vec::new(),
            error: Some(ErrorContract::from(error)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportNextStep {
    pub label: String,
    pub command: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportData {
    pub dry_run: bool,
    pub message: String,
    pub accepted: usize,
    pub duplicates: usize,
    pub files: Vec<FileImportOutcome>,
    pub duplicates_preview: Vec<DuplicateRecord>,
    pub audit_entries: Vec<ImportAuditEntry>,
    pub open_findings: usize,
    pub next_step: ImportNextStep,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportListData {
    pub imports: Vec<ImportAuditEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryListData {
    pub total: usize,
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryAddData {
    pub record: TransactionRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEditData {
    pub key: String,
    pub changed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryClearData {
    #[serde(flatten)]
    pub summary: DeleteSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryExportData {
    pub path: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnomalyListData {
    pub scope: FindingScope,
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub findings: Vec<AnomalyFinding>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleListData {
    pub defaults: EfficiencyBounds,
    pub vehicles: Vec<VehicleThreshold>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleSetData {
    pub created: bool,
    pub vehicle: VehicleThreshold,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleRemoveData {
    pub vehicle_id: String,
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotifyPreviewData {
    pub plan: RoutingPlan,
    pub messages: Vec<RenderedMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotifySendData {
    pub outbox: String,
    pub delivered: usize,
    pub failed: usize,
    pub reports: Vec<DeliveryReport>,
    pub unreachable: Vec<UnreachableVehicle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsData {
    pub vehicles: Vec<VehicleSummary>,
    pub monthly: Vec<MonthlyConsumption>,
}
