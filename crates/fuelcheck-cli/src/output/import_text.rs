use std::io;

use serde_json::Value;

use super::format::{self, Column};

const MAX_PREVIEW_ROWS: usize = 10;

pub fn render_import_run(data: &Value) -> io::Result<String> {
    let dry_run = data
        .get("dry_run")
        .and_then(Value::as_bool)
        .ok_or_else(|| io::Error::other("import output requires dry_run"))?;

    let mut lines = vec![if dry_run {
        "Dry run completed.".to_string()
    } else {
        "Import completed.".to_string()
    }];
    let message = format::text(data, "message");
    if !message.is_empty() {
        lines.push(message);
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    lines.extend(format::key_value_rows(
        &[
            ("Accepted:", format::count(data, "accepted").to_string()),
            ("Duplicates:", format::count(data, "duplicates").to_string()),
            (
                "Open findings:",
                format::count(data, "open_findings").to_string(),
            ),
        ],
        2,
    ));

    let files = format::array(data, "files");
    if !files.is_empty() {
        lines.push(String::new());
        lines.push("Files:".to_string());
        let rows = files
            .iter()
            .map(|file| {
                vec![
                    format::text(file, "source_file"),
                    format::text(file, "status"),
                    format::count(file, "rows_read").to_string(),
                    format::count(file, "accepted").to_string(),
                    format::count(file, "duplicates").to_string(),
                    format::array(file, "issues").len().to_string(),
                ]
            })
            .collect::<Vec<_>>();
        lines.extend(format::render_table_or_blocks(
            &[
                Column::left("File"),
                Column::left("Status"),
                Column::right("Rows"),
                Column::right("Accepted"),
                Column::right("Duplicates"),
                Column::right("Issues"),
            ],
            &rows,
            format::terminal_width(),
            "File",
        ));
    }

    let issues = files
        .iter()
        .flat_map(|file| format::array(file, "issues"))
        .collect::<Vec<_>>();
    if !issues.is_empty() {
        lines.push(String::new());
        lines.push("Skipped rows:".to_string());
        for issue in issues.iter().take(MAX_PREVIEW_ROWS) {
            lines.push(format!(
                "  {} row {}: {} ({})",
                format::text(issue, "source_file"),
                format::count(issue, "row"),
                format::text(issue, "message"),
                format::text(issue, "field"),
            ));
        }
        if issues.len() > MAX_PREVIEW_ROWS {
            lines.push(format!("  ... and {} more", issues.len() - MAX_PREVIEW_ROWS));
        }
    }

    let failures = files
        .iter()
        .filter_map(|file| file.get("error").map(|error| (file, error)))
        .collect::<Vec<_>>();
    if !failures.is_empty() {
        lines.push(String::new());
        lines.push("Failed files:".to_string());
        for (file, error) in failures {
            lines.push(format!(
                "  {}: {}",
                format::text(file, "source_file"),
                format::text(error, "message"),
            ));
        }
    }

    let duplicates = format::array(data, "duplicates_preview");
    if !duplicates.is_empty() {
        lines.push(String::new());
        lines.push("Duplicate rows (skipped):".to_string());
        for duplicate in duplicates.iter().take(MAX_PREVIEW_ROWS) {
            lines.push(format!(
                "  {} from {} ({})",
                format::text(duplicate, "key"),
                format::text(duplicate, "source_file"),
                format::text(duplicate, "reason").replace('_', " "),
            ));
        }
        if duplicates.len() > MAX_PREVIEW_ROWS {
            lines.push(format!(
                "  ... and {} more",
                duplicates.len() - MAX_PREVIEW_ROWS
            ));
        }
    }

    if let Some(next_step) = data.get("next_step") {
        lines.push(String::new());
        lines.push("What to do next:".to_string());
        lines.push(format!(
            "  {}: `{}`",
            format::text(next_step, "label"),
            format::text(next_step, "command"),
        ));
    }

    Ok(lines.join("\n"))
}

pub fn render_import_list(data: &Value) -> io::Result<String> {
    let imports = data
        .get("imports")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("import list output requires imports"))?;

    if imports.is_empty() {
        return Ok([
            "No imports yet.",
            "",
            "What to do next:",
            "  1. Run `fuelcheck import create --dry-run <path>` to check an invoice export.",
        ]
        .join("\n"));
    }

    let rows = imports
        .iter()
        .map(|entry| {
            vec![
                format::text(entry, "import_id"),
                format::text(entry, "timestamp"),
                format::text(entry, "source_file"),
                format::count(entry, "accepted").to_string(),
            ]
        })
        .collect::<Vec<_>>();

    let mut lines = vec![format!("Imports ({}):", imports.len()), String::new()];
    lines.extend(format::render_table_or_blocks(
        &[
            Column::left("Import ID"),
            Column::left("Imported at"),
            Column::left("File"),
            Column::right("Accepted"),
        ],
        &rows,
        format::terminal_width(),
        "Import",
    ));
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_import_list, render_import_run};

    #[test]
    fn import_run_lists_files_issues_and_next_step() {
        let data = json!({
            "dry_run": false,
            "message": "2 new fill-ups stored.",
            "accepted": 2,
            "duplicates": 1,
            "open_findings": 1,
            "files": [{
                "source_file": "march.csv",
                "format": "delimited",
                "status": "imported",
                "rows_read": 4,
                "parsed": 3,
                "accepted": 2,
                "duplicates": 1,
                "issues": [{"source_file": "march.csv", "row": 9, "field": "Menge", "message": "not a number"}]
            }],
            "duplicates_preview": [{"key": "B-XY 1_2024-03-01_08:00", "source_file": "march.csv", "reason": "existing_ledger"}],
            "next_step": {"label": "Review open findings", "command": "fuelcheck anomalies list"}
        });

        let rendered = render_import_run(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Import completed."));
            assert!(text.contains("march.csv"));
            assert!(text.contains("  march.csv row 9: not a number (Menge)"));
            assert!(text.contains("B-XY 1_2024-03-01_08:00 from march.csv (existing ledger)"));
            assert!(text.contains("Review open findings: `fuelcheck anomalies list`"));
        }
    }

    #[test]
    fn dry_run_has_its_own_headline() {
        let data = json!({"dry_run": true, "accepted": 0, "duplicates": 0, "files": []});
        let rendered = render_import_run(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Dry run completed."));
            assert!(text.contains("Accepted:"));
        }
    }

    #[test]
    fn empty_import_list_points_to_import_create() {
        let rendered = render_import_list(&json!({"imports": []}));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("No imports yet."));
            assert!(text.contains("fuelcheck import create --dry-run"));
        }
    }
}
