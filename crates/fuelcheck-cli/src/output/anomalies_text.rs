use std::io;

use serde_json::Value;

use super::format::{self, Column};

pub fn render_anomalies_list(data: &Value) -> io::Result<String> {
    let findings = data
        .get("findings")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("anomalies output requires findings"))?;
    let scope = format::text(data, "scope");

    if findings.is_empty() {
        let message = if scope == "all" {
            "No findings. Every fill-up passed the plausibility checks."
        } else {
            "No open findings."
        };
        return Ok(message.to_string());
    }

    let mut lines = vec![
        format!(
            "{} finding(s): {} error(s), {} warning(s).",
            findings.len(),
            format::count(data, "errors"),
            format::count(data, "warnings"),
        ),
        String::new(),
    ];

    let include_ack = scope == "all";
    let rows = findings
        .iter()
        .map(|finding| {
            let mut row = vec![
                format::text(finding, "id"),
                format::text(finding, "severity"),
                kind_label(&format::text(finding, "kind")).to_string(),
                format::text(finding, "detail"),
            ];
            if include_ack {
                row.push(ack_summary(finding));
            }
            row
        })
        .collect::<Vec<_>>();

    let mut columns = vec![
        Column::left("Finding"),
        Column::left("Severity"),
        Column::left("Kind"),
        Column::left("Detail"),
    ];
    if include_ack {
        columns.push(Column::left("Acknowledged"));
    }
    lines.extend(format::render_table_or_blocks(
        &columns,
        &rows,
        format::terminal_width(),
        "Finding",
    ));

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    lines.push(
        "  Acknowledge a checked finding: `fuelcheck anomalies ack <finding> -m \"<reason>\"`"
            .to_string(),
    );
    lines.push("  Tell the owners: `fuelcheck notify preview`".to_string());
    Ok(lines.join("\n"))
}

fn kind_label(kind: &str) -> &str {
    match kind {
        "missing_odometer" => "Missing odometer",
        "odometer_decreased" => "Odometer decreased",
        "efficiency_too_low" => "Consumption too low",
        "efficiency_too_high" => "Consumption too high",
        other => other,
    }
}

fn ack_summary(finding: &Value) -> String {
    if finding.get("acknowledged").and_then(Value::as_bool) != Some(true) {
        return "no".to_string();
    }
    format!(
        "{} ({}, {})",
        format::text(finding, "ack_comment"),
        format::text(finding, "ack_by"),
        format::text(finding, "ack_at"),
    )
}

pub fn render_anomalies_ack(data: &Value) -> io::Result<String> {
    let finding_id = format::text(data, "finding_id");
    if finding_id.is_empty() {
        return Err(io::Error::other("ack output requires finding_id"));
    }
    let mut lines = vec![format!("Acknowledged {finding_id}.")];
    if data.get("replaced_previous").and_then(Value::as_bool) == Some(true) {
        lines.push("The previous acknowledgement was replaced.".to_string());
    }
    lines.push(String::new());
    lines.extend(format::key_value_rows(
        &[
            ("Comment:", format::text(data, "comment")),
            ("By:", format::text(data, "by")),
            ("At:", format::text(data, "at")),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}
