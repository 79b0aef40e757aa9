//! Dataset-wide configuration stored in `settings.json`.
//!
//! Every field has a default, so a missing file or a file written by an older
//! release loads without migration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::state::{SETTINGS_FILE, read_optional, write_atomic};
use crate::{ClientError, ClientResult};

pub const DEFAULT_MIN_EFFICIENCY: f64 = 3.0;
pub const DEFAULT_MAX_EFFICIENCY: f64 = 25.0;
pub const DEFAULT_ACK_MIN_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_min_efficiency: f64,
    pub default_max_efficiency: f64,
    /// Substrings (case-insensitive) that mark a product as fuel.
    pub fuel_keywords: Vec<String>,
    pub ack_min_comment_chars: usize,
    pub delimited: DelimitedLayout,
    pub document: DocumentLayout,
    pub users: Vec<UserEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_min_efficiency: DEFAULT_MIN_EFFICIENCY,
            default_max_efficiency: DEFAULT_MAX_EFFICIENCY,
            fuel_keywords: ["DIESEL", "SUPER", "BENZIN", "EURO"]
                .iter()
                .map(|keyword| (*keyword).to_string())
                .collect(),
            ack_min_comment_chars: DEFAULT_ACK_MIN_CHARS,
            delimited: DelimitedLayout::default(),
            document: DocumentLayout::default(),
            users: Vec::new(),
        }
    }
}

/// Column names and framing of the vendor's delimited export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimitedLayout {
    pub delimiter: char,
    /// Leading lines, header included, before the first data row.
    pub preamble_lines: usize,
    pub date_format: String,
    pub vehicle_column: String,
    pub odometer_column: String,
    pub date_column: String,
    pub time_column: String,
    pub volume_column: String,
    pub fuel_type_column: String,
    pub amount_column: String,
    pub location_column: String,
}

impl Default for DelimitedLayout {
    fn default() -> Self {
        Self {
            delimiter: ';',
            preamble_lines: 5,
            date_format: "%d.%m.%Y".to_string(),
            vehicle_column: "Kennzeichen".to_string(),
            odometer_column: "km-Stand".to_string(),
            date_column: "Lieferdatum".to_string(),
            time_column: "Lieferzeit".to_string(),
            volume_column: "Menge".to_string(),
            fuel_type_column: "Warenart".to_string(),
            amount_column: "Wert incl. USt".to_string(),
            location_column: "Name".to_string(),
        }
    }
}

/// Table layout of invoice documents after table extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentLayout {
    pub product_column: usize,
    pub volume_column: usize,
    pub amount_column: usize,
    /// First-cell markers of summary and repeated header rows.
    pub skip_markers: Vec<String>,
}

impl Default for DocumentLayout {
    fn default() -> Self {
        Self {
            product_column: 1,
            volume_column: 3,
            amount_column: 10,
            skip_markers: ["TOTAL:", "Gesamtsummen", "Lieferdatum"]
                .iter()
                .map(|marker| (*marker).to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub username: String,
    pub role: Role,
}

pub fn load_settings(home: &Path) -> ClientResult<Settings> {
    let path = home.join(SETTINGS_FILE);
    let Some(body) = read_optional(&path)? else {
        return Ok(Settings::default());
    };
    serde_json::from_str(&body)
        .map_err(|error| ClientError::storage_corrupt(&path, &error.to_string()))
}

pub fn save_settings(home: &Path, settings: &Settings) -> ClientResult<()> {
    let body = serde_json::to_vec_pretty(settings)
        .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
    write_atomic(&home.join(SETTINGS_FILE), &body)
}
