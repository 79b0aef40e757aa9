use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ledger::record::{RecordKey, TransactionRecord};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MissingOdometer,
    OdometerDecreased,
    EfficiencyTooLow,
    EfficiencyTooHigh,
}

impl FindingKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingOdometer => "missing_odometer",
            Self::OdometerDecreased => "odometer_decreased",
            Self::EfficiencyTooLow => "efficiency_too_low",
            Self::EfficiencyTooHigh => "efficiency_too_high",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::MissingOdometer => "Missing odometer",
            Self::OdometerDecreased => "Odometer decreased",
            Self::EfficiencyTooLow => "Consumption too low",
            Self::EfficiencyTooHigh => "Consumption too high",
        }
    }

    pub const fn severity(self) -> Severity {
        match self {
            Self::MissingOdometer | Self::EfficiencyTooLow => Severity::Warning,
            Self::OdometerDecreased | Self::EfficiencyTooHigh => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Identity of a finding: the key of the record it was raised on.
///
/// The string form is `vehicle_YYYY-MM-DD_time`. Vehicle ids and times may
/// both contain underscores, so decoding anchors on the last `_YYYY-MM-DD_`
/// segment instead of splitting on separators.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FindingId(pub RecordKey);

impl FindingId {
    pub fn key(&self) -> &RecordKey {
        &self.0
    }
}

impl fmt::Display for FindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for FindingId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((vehicle_id, date, time)) = split_on_date(value) else {
            return Err(format!(
                "`{value}` is not of the form vehicle_YYYY-MM-DD_time with a valid date"
            ));
        };
        if vehicle_id.is_empty() {
            return Err(format!("`{value}` has an empty vehicle id"));
        }
        Ok(Self(RecordKey::new(vehicle_id, date, time)))
    }
}

const DATE_WIDTH: usize = "YYYY-MM-DD".len();

/// Finds the rightmost `_<date>_` segment that parses as a calendar date.
fn split_on_date(value: &str) -> Option<(&str, NaiveDate, &str)> {
    value
        .match_indices('_')
        .map(|(index, _)| index)
        .rev()
        .find_map(|start| {
            let date_end = start + 1 + DATE_WIDTH;
            let raw_date = value.get(start + 1..date_end)?;
            if value.get(date_end..=date_end) != Some("_") {
                return None;
            }
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").ok()?;
            Some((&value[..start], date, &value[date_end + 1..]))
        })
}

impl Serialize for FindingId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FindingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyFinding {
    pub id: FindingId,
    pub vehicle_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub kind: FindingKind,
    pub severity: Severity,
    pub detail: String,
    pub acknowledged: bool,
    pub ack_comment: String,
    pub ack_by: String,
    pub ack_at: String,
}

impl AnomalyFinding {
    pub(crate) fn raise(record: &TransactionRecord, kind: FindingKind, detail: String) -> Self {
        Self {
            id: FindingId(record.key()),
            vehicle_id: record.vehicle_id.clone(),
            date: record.date,
            time: record.time.clone(),
            kind,
            severity: kind.severity(),
            detail,
            acknowledged: record.acknowledged,
            ack_comment: record.ack_comment.clone(),
            ack_by: record.ack_by.clone(),
            ack_at: record.ack_at.clone(),
        }
    }

    pub fn is_open(&self) -> bool {
        !self.acknowledged
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{FindingId, FindingKind, Severity};
    use crate::ledger::record::RecordKey;

    #[test]
    fn severities_are_fixed_per_kind() {
        assert_eq!(FindingKind::MissingOdometer.severity(), Severity::Warning);
        assert_eq!(FindingKind::EfficiencyTooLow.severity(), Severity::Warning);
        assert_eq!(FindingKind::OdometerDecreased.severity(), Severity::Error);
        assert_eq!(FindingKind::EfficiencyTooHigh.severity(), Severity::Error);
    }

    #[test]
    fn ids_decode_vehicle_ids_containing_underscores() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap_or(NaiveDate::MIN);
        let id = FindingId(RecordKey::new("FLEET_AB_12", date, "06:05"));
        let rendered = id.to_string();
        assert_eq!(rendered, "FLEET_AB_12_2025-01-31_06:05");
        let parsed = rendered.parse::<FindingId>();
        assert!(matches!(parsed, Ok(ref value) if *value == id));
    }

    #[test]
    fn ids_round_trip_with_underscores_on_both_sides_of_the_date() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or(NaiveDate::MIN);
        for (vehicle, time) in [
            ("AB-CD123", "08_30"),
            ("FLEET_AB_12", "08_30"),
            ("FLEET_2025-06-30_X", "late_shift_1"),
        ] {
            let id = FindingId(RecordKey::new(vehicle, date, time));
            let parsed = id.to_string().parse::<FindingId>();
            assert!(matches!(parsed, Ok(ref value) if *value == id), "{id}");
        }
    }

    #[test]
    fn ids_with_empty_time_round_trip() {
        let parsed = "AB-CD123_2025-02-01_".parse::<FindingId>();
        assert!(parsed.is_ok());
        if let Ok(id) = parsed {
            assert_eq!(id.key().time, "");
            assert_eq!(id.key().vehicle_id, "AB-CD123");
        }
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!("AB-CD123".parse::<FindingId>().is_err());
        assert!("AB-CD123_2025-13-01_08:00".parse::<FindingId>().is_err());
        assert!("_2025-01-01_08:00".parse::<FindingId>().is_err());
        assert!("AB-CD123_2025-01-01".parse::<FindingId>().is_err());
    }
}
