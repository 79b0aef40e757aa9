use std::io;

use serde_json::Value;

use super::format::{self, Column};

pub fn render_stats(data: &Value) -> io::Result<String> {
    let vehicles = data
        .get("vehicles")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("stats output requires vehicles"))?;
    if vehicles.is_empty() {
        return Ok("No fuel transactions match.".to_string());
    }

    let width = format::terminal_width();
    let vehicle_rows = vehicles
        .iter()
        .map(|summary| {
            vec![
                format::text(summary, "vehicle_id"),
                format::count(summary, "fill_ups").to_string(),
                format::decimal(summary, "total_volume", 2),
                format::decimal(summary, "total_amount", 2),
                format::decimal(summary, "average_efficiency", 2),
                format!(
                    "{} .. {}",
                    format::text(summary, "first_date"),
                    format::text(summary, "last_date")
                ),
            ]
        })
        .collect::<Vec<_>>();

    let mut lines = vec!["Per vehicle:".to_string()];
    lines.extend(format::render_table_or_blocks(
        &[
            Column::left("Vehicle"),
            Column::right("Fill-ups"),
            Column::right("Litres"),
            Column::right("Amount"),
            Column::right("Avg L/100km"),
            Column::left("Period"),
        ],
        &vehicle_rows,
        width,
        "Vehicle",
    ));

    let monthly = format::array(data, "monthly");
    if !monthly.is_empty() {
        let month_rows = monthly
            .iter()
            .map(|month| {
                vec![
                    format::text(month, "month"),
                    format::text(month, "vehicle_id"),
                    format::count(month, "fill_ups").to_string(),
                    format::decimal(month, "total_volume", 2),
                    format::decimal(month, "total_amount", 2),
                    format::decimal(month, "average_efficiency", 2),
                ]
            })
            .collect::<Vec<_>>();
        lines.push(String::new());
        lines.push("Per month:".to_string());
        lines.extend(format::render_table_or_blocks(
            &[
                Column::left("Month"),
                Column::left("Vehicle"),
                Column::right("Fill-ups"),
                Column::right("Litres"),
                Column::right("Amount"),
                Column::right("Avg L/100km"),
            ],
            &month_rows,
            width,
            "Month",
        ));
    }

    Ok(lines.join("\n"))
}
