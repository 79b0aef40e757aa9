use std::io;

use serde_json::Value;

use super::format::{self, Column};

pub fn render_history_list(data: &Value) -> io::Result<String> {
    let transactions = data
        .get("transactions")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("history output requires transactions"))?;
    let total = format::count(data, "total");

    if transactions.is_empty() {
        return Ok("No transactions match.".to_string());
    }

    let rows = transactions.iter().map(transaction_row).collect::<Vec<_>>();
    let mut lines = vec![
        format!("Transactions (showing {} of {total}):", transactions.len()),
        String::new(),
    ];
    lines.extend(format::render_table_or_blocks(
        &[
            Column::left("Vehicle"),
            Column::left("Date"),
            Column::left("Time"),
            Column::right("Odometer"),
            Column::right("Litres"),
            Column::right("Amount"),
            Column::left("Product"),
            Column::right("Km"),
            Column::right("L/100km"),
            Column::left("Station"),
        ],
        &rows,
        format::terminal_width(),
        "Transaction",
    ));
    Ok(lines.join("\n"))
}

fn transaction_row(record: &Value) -> Vec<String> {
    vec![
        format::text(record, "vehicle_id"),
        format::text(record, "date"),
        format::text(record, "time"),
        format::decimal(record, "odometer", 0),
        format::decimal(record, "volume", 2),
        format::decimal(record, "amount", 2),
        format::text(record, "fuel_type"),
        format::decimal(record, "distance_since_last", 0),
        format::decimal(record, "efficiency", 2),
        format::text(record, "location"),
    ]
}

pub fn render_history_add(data: &Value) -> io::Result<String> {
    let record = data
        .get("record")
        .ok_or_else(|| io::Error::other("history add output requires record"))?;
    let mut lines = vec!["Fill-up recorded.".to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("Vehicle:", format::text(record, "vehicle_id")),
            (
                "When:",
                format!(
                    "{} {}",
                    format::text(record, "date"),
                    format::text(record, "time")
                ),
            ),
            ("Odometer:", format::decimal(record, "odometer", 0)),
            ("Litres:", format::decimal(record, "volume", 2)),
            ("Product:", format::text(record, "fuel_type")),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}

pub fn render_history_edit(data: &Value) -> io::Result<String> {
    let changed = format::count(data, "changed");
    let key = format::text(data, "key");
    if changed == 0 {
        return Ok(format!("No fields changed for {key}."));
    }
    Ok(format!(
        "Updated {changed} field(s) of {key}.\nConsumption and findings were recalculated."
    ))
}

pub fn render_history_clear(data: &Value) -> io::Result<String> {
    let mut lines = vec!["History cleared.".to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[
            (
                "Transactions removed:",
                format::count(data, "transactions_removed").to_string(),
            ),
            (
                "Imports removed:",
                format::count(data, "imports_removed").to_string(),
            ),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}

pub fn render_history_export(data: &Value) -> io::Result<String> {
    Ok(format!(
        "Exported {} transaction(s) to {}.",
        format::count(data, "rows"),
        format::text(data, "path")
    ))
}
