use std::io;

use fuelcheck_client::{ClientError, SuccessEnvelope};
use serde::Serialize;
use serde_json::{Value, json};

const JSON_VERSION: &str = "v1";

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    let value = match success.command.as_str() {
        "import list" => render_import_list_json(&success.data),
        _ => json!({
            "ok": true,
            "command": success.command,
            "version": JSON_VERSION,
            "data": success.data.clone()
        }),
    };

    serialize_json_pretty(&value)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    let mut body = json!({
        "code": error.code,
        "category": error.category().as_str(),
        "message": error.message,
        "recovery_steps": error.recovery_steps,
    });
    if let (Some(data), Some(object)) = (error.data.as_ref(), body.as_object_mut()) {
        object.insert("data".to_string(), data.clone());
    }
    serialize_json_pretty(&json!({ "error": body }))
}

/// Newest import first, as a bare array.
fn render_import_list_json(data: &Value) -> Value {
    let rows = data
        .get("imports")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    Value::Array(rows)
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}
