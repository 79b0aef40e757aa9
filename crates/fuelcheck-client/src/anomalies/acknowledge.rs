use chrono::NaiveDateTime;
use serde::Serialize;

use crate::anomalies::finding::FindingId;
use crate::ledger::record::TransactionLog;
use crate::{ClientError, ClientResult};

pub const ACK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub finding_id: FindingId,
    pub comment: String,
    pub by: String,
    pub at: String,
    /// True when an earlier acknowledgement was overwritten.
    pub replaced_previous: bool,
}

/// Marks the record behind `finding_id` as acknowledged.
///
/// The comment is trimmed and must keep at least `min_chars` characters.
/// Acknowledging again overwrites the earlier comment, user and time.
pub fn acknowledge(
    log: &mut TransactionLog,
    finding_id: &FindingId,
    comment: &str,
    user: &str,
    min_chars: usize,
    now: NaiveDateTime,
) -> ClientResult<Acknowledgement> {
    let comment = comment.trim();
    if comment.chars().count() < min_chars {
        return Err(ClientError::comment_too_short(min_chars));
    }

    let Some(record) = log.find_mut(finding_id.key()) else {
        return Err(ClientError::finding_not_found(&finding_id.to_string()));
    };

    let replaced_previous = record.acknowledged;
    let at = now.format(ACK_TIMESTAMP_FORMAT).to_string();
    record.acknowledged = true;
    record.ack_comment = comment.to_string();
    record.ack_by = user.to_string();
    record.ack_at = at.clone();

    tracing::info!(finding = %finding_id, user, replaced_previous, "acknowledged finding");

    Ok(Acknowledgement {
        finding_id: finding_id.clone(),
        comment: comment.to_string(),
        by: user.to_string(),
        at,
        replaced_previous,
    })
}
