use std::io;

use serde_json::Value;

use super::format::{self, Column};

pub fn render_notify_preview(data: &Value) -> io::Result<String> {
    let messages = data
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("notify preview output requires messages"))?;
    let unreachable = data
        .get("plan")
        .map(|plan| format::array(plan, "unreachable"))
        .unwrap_or(&[]);

    let mut lines = Vec::new();
    if messages.is_empty() {
        lines.push("No messages to send.".to_string());
    } else {
        lines.push(format!("{} message(s) would be sent.", messages.len()));
        for message in messages {
            lines.push(String::new());
            lines.push(format!("To:      {}", format::text(message, "to")));
            lines.push(format!("Subject: {}", format::text(message, "subject")));
            lines.push(String::new());
            lines.extend(
                format::text(message, "body")
                    .lines()
                    .map(|line| format!("  {line}").trim_end().to_string()),
            );
        }
    }

    lines.extend(render_unreachable(unreachable));
    if !messages.is_empty() {
        lines.push(String::new());
        lines.push("What to do next:".to_string());
        lines.push("  1. Run `fuelcheck notify send` to write these messages to the outbox.".to_string());
    }
    Ok(lines.join("\n"))
}

pub fn render_notify_send(data: &Value) -> io::Result<String> {
    let reports = data
        .get("reports")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("notify send output requires reports"))?;

    let mut lines = vec![format!(
        "Delivered {} message(s), {} failed.",
        format::count(data, "delivered"),
        format::count(data, "failed"),
    )];
    if !reports.is_empty() {
        lines.push(format!("Outbox: {}", format::text(data, "outbox")));
        lines.push(String::new());
        let rows = reports
            .iter()
            .map(|report| {
                let outcome = if report.get("delivered").and_then(Value::as_bool) == Some(true) {
                    format::text(report, "receipt")
                } else {
                    format!("failed: {}", format::text(report, "error"))
                };
                vec![
                    format::text(report, "recipient"),
                    format::text(report, "vehicle_id"),
                    outcome,
                ]
            })
            .collect::<Vec<_>>();
        lines.extend(format::render_table_or_blocks(
            &[
                Column::left("Recipient"),
                Column::left("Vehicle"),
                Column::left("Result"),
            ],
            &rows,
            format::terminal_width(),
            "Message",
        ));
    }
    lines.extend(render_unreachable(format::array(data, "unreachable")));
    Ok(lines.join("\n"))
}

fn render_unreachable(unreachable: &[Value]) -> Vec<String> {
    if unreachable.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![
        String::new(),
        "Vehicles with open findings but no owner address:".to_string(),
    ];
    for vehicle in unreachable {
        lines.push(format!(
            "  {} ({} open): {}",
            format::text(vehicle, "vehicle_id"),
            format::count(vehicle, "open_findings"),
            format::text(vehicle, "reason"),
        ));
    }
    lines.push(
        "  Set an address with `fuelcheck vehicles set <vehicle> --owner-email <address>`."
            .to_string(),
    );
    lines
}
