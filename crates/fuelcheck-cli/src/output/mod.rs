mod anomalies_text;
mod backup_text;
mod error_text;
mod format;
mod history_text;
mod import_text;
mod json;
mod mode;
mod notify_text;
mod stats_text;
mod vehicles_text;

use std::io;

use fuelcheck_client::{ClientError, SuccessEnvelope};

use crate::stdout_io::write_stdout_line;

pub use mode::{OutputMode, mode_for_command};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    write_stdout_line(&body)
}

pub fn print_failure(error: &ClientError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    let data = &success.data;
    match success.command.as_str() {
        "import create" => import_text::render_import_run(data),
        "import list" => import_text::render_import_list(data),
        "history list" => history_text::render_history_list(data),
        "history add" => history_text::render_history_add(data),
        "history edit" => history_text::render_history_edit(data),
        "history clear" => history_text::render_history_clear(data),
        "history export" => history_text::render_history_export(data),
        "anomalies list" => anomalies_text::render_anomalies_list(data),
        "anomalies ack" => anomalies_text::render_anomalies_ack(data),
        "vehicles list" => vehicles_text::render_vehicles_list(data),
        "vehicles set" => vehicles_text::render_vehicles_set(data),
        "vehicles remove" => vehicles_text::render_vehicles_remove(data),
        "notify preview" => notify_text::render_notify_preview(data),
        "notify send" => notify_text::render_notify_send(data),
        "stats" => stats_text::render_stats(data),
        "backup create" | "backup restore" => backup_text::render_backup(&success.command, data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
