use std::io;

use serde_json::Value;

use super::format::{self, Column};

pub fn render_vehicles_list(data: &Value) -> io::Result<String> {
    let defaults = data
        .get("defaults")
        .ok_or_else(|| io::Error::other("vehicles output requires defaults"))?;
    let vehicles = format::array(data, "vehicles");

    let mut lines = vec![
        format!(
            "Default bounds: {} to {} L/100km",
            format::decimal(defaults, "min", 1),
            format::decimal(defaults, "max", 1)
        ),
        String::new(),
    ];

    if vehicles.is_empty() {
        lines.push("No vehicles configured.".to_string());
        lines.push(String::new());
        lines.push("What to do next:".to_string());
        lines.push(
            "  1. Run `fuelcheck vehicles set <vehicle> --owner-email <address>` so findings can be routed."
                .to_string(),
        );
        return Ok(lines.join("\n"));
    }

    let rows = vehicles
        .iter()
        .map(|vehicle| {
            vec![
                format::text(vehicle, "vehicle_id"),
                format::text(vehicle, "owner_name"),
                format::text(vehicle, "owner_email"),
                format::decimal(vehicle, "min_efficiency", 1),
                format::decimal(vehicle, "max_efficiency", 1),
                format::text(vehicle, "notes"),
            ]
        })
        .collect::<Vec<_>>();
    lines.push(format!("Vehicles ({}):", vehicles.len()));
    lines.extend(format::render_table_or_blocks(
        &[
            Column::left("Vehicle"),
            Column::left("Owner"),
            Column::left("Email"),
            Column::right("Min"),
            Column::right("Max"),
            Column::left("Notes"),
        ],
        &rows,
        format::terminal_width(),
        "Vehicle",
    ));
    Ok(lines.join("\n"))
}

pub fn render_vehicles_set(data: &Value) -> io::Result<String> {
    let vehicle = data
        .get("vehicle")
        .ok_or_else(|| io::Error::other("vehicles set output requires vehicle"))?;
    let created = data.get("created").and_then(Value::as_bool) == Some(true);

    let mut lines = vec![
        format!(
            "{} {}.",
            if created { "Added" } else { "Updated" },
            format::text(vehicle, "vehicle_id")
        ),
        String::new(),
    ];
    lines.extend(format::key_value_rows(
        &[
            ("Owner:", format::text(vehicle, "owner_name")),
            ("Email:", format::text(vehicle, "owner_email")),
            ("Min L/100km:", format::decimal(vehicle, "min_efficiency", 1)),
            ("Max L/100km:", format::decimal(vehicle, "max_efficiency", 1)),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}

pub fn render_vehicles_remove(data: &Value) -> io::Result<String> {
    let vehicle_id = format::text(data, "vehicle_id");
    if data.get("removed").and_then(Value::as_bool) == Some(true) {
        Ok(format!("Removed {vehicle_id}. Default bounds apply from now on."))
    } else {
        Ok(format!("{vehicle_id} was not configured; nothing changed."))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_vehicles_list, render_vehicles_remove, render_vehicles_set};

    #[test]
    fn list_shows_defaults_and_unset_bounds() {
        let data = json!({
            "defaults": {"min": 3.0, "max": 15.0},
            "vehicles": [{
                "vehicle_id": "B-XY 1",
                "owner_name": "Kim",
                "owner_email": "kim@example.com",
                "min_efficiency": null,
                "max_efficiency": 11.5,
                "notes": ""
            }]
        });

        let rendered = render_vehicles_list(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Default bounds: 3.0 to 15.0 L/100km"));
            assert!(text.contains("kim@example.com"));
            assert!(text.contains("11.5"));
        }
    }

    #[test]
    fn set_distinguishes_created_and_updated() {
        let vehicle = json!({"vehicle_id": "B-XY 1", "owner_name": "", "owner_email": ""});
        let created = render_vehicles_set(&json!({"created": true, "vehicle": vehicle.clone()}));
        let updated = render_vehicles_set(&json!({"created": false, "vehicle": vehicle}));
        assert!(matches!(created, Ok(ref text) if text.starts_with("Added B-XY 1.")));
        assert!(matches!(updated, Ok(ref text) if text.starts_with("Updated B-XY 1.")));
    }

    #[test]
    fn remove_of_unknown_vehicle_is_reported() {
        let rendered = render_vehicles_remove(&json!({"vehicle_id": "X", "removed": false}));
        assert!(matches!(rendered, Ok(ref text) if text.contains("nothing changed")));
    }
}
