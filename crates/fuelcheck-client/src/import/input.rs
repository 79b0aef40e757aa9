use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatHint {
    #[default]
    Auto,
    Delimited,
    Document,
}

impl FormatHint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Delimited => "delimited",
            Self::Document => "document",
        }
    }
}

/// One file handed to an import, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSource {
    /// File name without directories; also the provenance of every record.
    pub name: String,
    pub content: String,
    pub hint: FormatHint,
}

impl ImportSource {
    pub fn from_text(name: &str, content: &str, hint: FormatHint) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
            hint,
        }
    }

    pub fn read(path: &Path, hint: FormatHint) -> ClientResult<Self> {
        let display = path.display().to_string();
        let name = path
            .file_name()
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_else(|| display.clone());

        let bytes = fs::read(path).map_err(|error| {
            ClientError::invalid_argument_with_recovery(
                &format!("Could not read import file `{display}`: {error}"),
                vec!["Verify the path exists and is readable.".to_string()],
            )
        })?;
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(error) => {
                tracing::warn!(source_file = %name, "import file is not UTF-8, decoding lossily");
                String::from_utf8_lossy(error.as_bytes()).into_owned()
            }
        };

        Ok(Self {
            name,
            content,
            hint,
        })
    }

    /// The concrete format: the hint when given, else by extension, else by
    /// content.
    pub fn resolved_format(&self) -> FormatHint {
        if self.hint != FormatHint::Auto {
            return self.hint;
        }
        let lowered = self.name.to_lowercase();
        if lowered.ends_with(".json") {
            return FormatHint::Document;
        }
        if lowered.ends_with(".csv") {
            return FormatHint::Delimited;
        }
        if self.content.trim_start().starts_with('[') {
            return FormatHint::Document;
        }
        FormatHint::Delimited
    }
}
