use std::io;

use serde_json::Value;

use super::format;

pub fn render_backup(command: &str, data: &Value) -> io::Result<String> {
    let archive = format::text(data, "archive");
    if archive.is_empty() {
        return Err(io::Error::other("backup output requires archive"));
    }
    let files = format::array(data, "files");

    let headline = if command == "backup restore" {
        format!("Restored {} file(s) from {archive}.", files.len())
    } else {
        format!("Wrote {archive} with {} file(s).", files.len())
    };
    let mut lines = vec![headline];
    lines.extend(
        files
            .iter()
            .filter_map(Value::as_str)
            .map(|name| format!("  {name}")),
    );
    Ok(lines.join("\n"))
}
