use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

const INVOICE_HEADER: &str =
    "Kennzeichen;km-Stand;Lieferdatum;Lieferzeit;Menge;Warenart;Wert incl. USt;Name\n\n\n\n\n";

const MARCH_ROWS: &str = "AB-CD123;1.000;01.03.2025;08:00;30,00;DIESEL;50,00;Nord\n\
                          AB-CD123;1.300;02.03.2025;08:00;25,00;DIESEL;40,00;Nord\n\
                          AB-CD123;1.250;03.03.2025;08:00;20,00;DIESEL;30,00;Nord\n";

struct CliRun {
    ok: bool,
    code: Option<i32>,
    stdout: String,
}

fn test_home() -> tempfile::TempDir {
    let home = tempfile::tempdir();
    assert!(home.is_ok());
    match home {
        Ok(dir) => dir,
        Err(error) => panic!("temp dir: {error}"),
    }
}

fn run_cli_in_home(home: &Path, args: &[&str]) -> CliRun {
    let mut command = Command::new(env!("CARGO_BIN_EXE_fuelcheck"));
    command.args(args);
    command.env("FUELCHECK_HOME", home);
    command.env_remove("FUELCHECK_USER");
    command.env_remove("FUELCHECK_LOG");

    let output = command.output();
    assert!(output.is_ok());
    match output {
        Ok(result) => CliRun {
            ok: result.status.success(),
            code: result.status.code(),
            stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
        },
        Err(_) => CliRun {
            ok: false,
            code: None,
            stdout: String::new(),
        },
    }
}

fn write_invoice(home: &Path, name: &str, rows: &str) -> PathBuf {
    let path = home.join(name);
    let write = fs::write(&path, format!("{INVOICE_HEADER}{rows}"));
    assert!(write.is_ok());
    path
}

fn parse_json(body: &str) -> Value {
    let parsed = serde_json::from_str::<Value>(body);
    assert!(parsed.is_ok(), "not json: {body}");
    parsed.unwrap_or(Value::Null)
}

fn assert_text_error_contract(body: &str, code: &str) {
    assert!(body.contains("Something went wrong, but it's easy to fix."));
    assert!(body.contains(&format!("  Error:    {code}")));
    assert!(body.contains("  Details:"));
    assert!(body.contains("What to do next:"));
}

#[test]
fn root_command_uses_short_plaintext_help() {
    let home = test_home();
    let run = run_cli_in_home(home.path(), &[]);
    assert!(run.ok);
    assert!(run.stdout.starts_with("fuelcheck - fuel-card invoice checker"));
    assert!(run.stdout.contains("fuelcheck import create --help"));
}

#[test]
fn help_and_version_return_success_output() {
    let home = test_home();
    let help = run_cli_in_home(home.path(), &["--help"]);
    assert!(help.ok);
    assert!(help.stdout.contains("USAGE: fuelcheck"));
    assert!(help.stdout.contains("fuelcheck anomalies ack"));

    let version = run_cli_in_home(home.path(), &["--version"]);
    assert!(version.ok);
    assert_eq!(version.stdout.trim(), "fuelcheck 0.1.0");
}

#[test]
fn import_create_help_lists_invoice_columns() {
    let home = test_home();
    let run = run_cli_in_home(home.path(), &["import", "create", "--help"]);
    assert!(run.ok);
    assert!(run.stdout.contains("How import works:"));
    assert!(run.stdout.contains("Kennzeichen"));
    assert!(run.stdout.contains("What to do next:"));
}

#[test]
fn dry_run_then_import_then_review_findings() {
    let home = test_home();
    let invoice = write_invoice(home.path(), "march.csv", MARCH_ROWS);
    let invoice_arg = invoice.display().to_string();

    let dry_run = run_cli_in_home(home.path(), &["import", "create", "--dry-run", &invoice_arg]);
    assert!(dry_run.ok, "{}", dry_run.stdout);
    assert!(dry_run.stdout.starts_with("Dry run completed."));
    assert!(!home.path().join("ledger.json").exists());

    let import = run_cli_in_home(home.path(), &["import", "create", &invoice_arg]);
    assert!(import.ok, "{}", import.stdout);
    assert!(import.stdout.starts_with("Import completed."));
    assert!(import.stdout.contains("Open findings:  1"));

    let findings = run_cli_in_home(home.path(), &["anomalies", "list"]);
    assert!(findings.ok);
    assert!(findings.stdout.contains("Odometer decreased"));
    assert!(findings.stdout.contains("AB-CD123_2025-03-03_08:00"));

    let history = run_cli_in_home(home.path(), &["history", "list"]);
    assert!(history.ok);
    assert!(history.stdout.starts_with("Transactions (showing 3 of 3):"));
    assert!(history.stdout.contains("8.33"));
}

#[test]
fn reimporting_the_same_file_adds_nothing() {
    let home = test_home();
    let invoice = write_invoice(home.path(), "march.csv", MARCH_ROWS);
    let invoice_arg = invoice.display().to_string();

    let first = run_cli_in_home(home.path(), &["import", "create", &invoice_arg, "--json"]);
    assert!(first.ok);
    assert_eq!(parse_json(&first.stdout)["data"]["accepted"], Value::from(3));

    let second = run_cli_in_home(home.path(), &["import", "create", &invoice_arg, "--json"]);
    assert!(second.ok);
    assert_eq!(parse_json(&second.stdout)["data"]["accepted"], Value::from(0));

    let history = run_cli_in_home(home.path(), &["history", "list", "--json"]);
    assert!(history.ok);
    assert_eq!(parse_json(&history.stdout)["data"]["total"], Value::from(3));
}

#[test]
fn acknowledgement_needs_a_real_comment_and_closes_the_finding() {
    let home = test_home();
    let invoice = write_invoice(
        home.path(),
        "march.csv",
        "AB-CD123;;01.03.2025;08:00;30,00;DIESEL;50,00;Nord\n",
    );
    let invoice_arg = invoice.display().to_string();
    assert!(run_cli_in_home(home.path(), &["import", "create", &invoice_arg]).ok);

    let listed = run_cli_in_home(home.path(), &["anomalies", "list", "--json"]);
    assert!(listed.ok);
    let payload = parse_json(&listed.stdout);
    assert_eq!(payload["data"]["total"], Value::from(1));
    let finding_id = payload["data"]["findings"][0]["id"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    assert_eq!(finding_id, "AB-CD123_2025-03-01_08:00");

    let too_short = run_cli_in_home(
        home.path(),
        &["anomalies", "ack", &finding_id, "-m", "ok", "--json"],
    );
    assert!(!too_short.ok);
    assert_eq!(too_short.code, Some(1));
    let error = parse_json(&too_short.stdout);
    assert_eq!(
        error["error"]["code"],
        Value::String("comment_too_short".to_string())
    );

    let acknowledged = run_cli_in_home(
        home.path(),
        &[
            "--user",
            "anna",
            "anomalies",
            "ack",
            &finding_id,
            "-m",
            "odometer display broken",
        ],
    );
    assert!(acknowledged.ok, "{}", acknowledged.stdout);
    assert!(acknowledged.stdout.contains("By:       anna"));

    let open = run_cli_in_home(home.path(), &["anomalies", "list"]);
    assert!(open.ok);
    assert_eq!(open.stdout.trim(), "No open findings.");

    let all = run_cli_in_home(home.path(), &["anomalies", "list", "--all"]);
    assert!(all.ok);
    assert!(all.stdout.contains("odometer display broken"));
}

#[test]
fn unknown_finding_id_is_a_validation_error() {
    let home = test_home();
    let run = run_cli_in_home(
        home.path(),
        &["anomalies", "ack", "ZZ-1_2025-01-01_08:00", "-m", "a long enough comment"],
    );
    assert!(!run.ok);
    assert_eq!(run.code, Some(1));
    assert_text_error_contract(&run.stdout, "finding_not_found");
}

#[test]
fn history_clear_requires_confirmation() {
    let home = test_home();
    let run = run_cli_in_home(home.path(), &["history", "clear"]);
    assert!(!run.ok);
    assert_text_error_contract(&run.stdout, "invalid_argument");
    assert!(run.stdout.contains("fuelcheck history clear --yes"));

    let confirmed = run_cli_in_home(home.path(), &["history", "clear", "--yes"]);
    assert!(confirmed.ok);
    assert!(confirmed.stdout.starts_with("History cleared."));
}

#[test]
fn parse_errors_are_json_when_json_flag_is_present() {
    let home = test_home();
    let run = run_cli_in_home(home.path(), &["stats", "--bogus", "--json"]);
    assert!(!run.ok);
    assert_eq!(run.code, Some(1));
    let payload = parse_json(&run.stdout);
    assert_eq!(
        payload["error"]["code"],
        Value::String("invalid_argument".to_string())
    );
    assert!(
        payload["error"]["recovery_steps"][0]
            .as_str()
            .unwrap_or_default()
            .contains("fuelcheck stats --help")
    );
}

#[test]
fn corrupt_ledger_exits_with_storage_code() {
    let home = test_home();
    assert!(fs::write(home.path().join("ledger.json"), "{\"transactions\": [").is_ok());

    let run = run_cli_in_home(home.path(), &["history", "list"]);
    assert!(!run.ok);
    assert_eq!(run.code, Some(2));
    assert_text_error_contract(&run.stdout, "storage_corrupt");
}

#[test]
fn viewer_cannot_import() {
    let home = test_home();
    let settings = r#"{"users": [{"username": "vic", "role": "viewer"}]}"#;
    assert!(fs::write(home.path().join("settings.json"), settings).is_ok());
    let invoice = write_invoice(home.path(), "march.csv", MARCH_ROWS);
    let invoice_arg = invoice.display().to_string();

    let denied = run_cli_in_home(
        home.path(),
        &["--user", "vic", "import", "create", &invoice_arg],
    );
    assert!(!denied.ok);
    assert_text_error_contract(&denied.stdout, "permission_denied");

    let listing = run_cli_in_home(home.path(), &["--user", "vic", "history", "list"]);
    assert!(listing.ok);
}

#[test]
fn vehicles_and_notifications_route_to_owner_outbox() {
    let home = test_home();
    let invoice = write_invoice(home.path(), "march.csv", MARCH_ROWS);
    let invoice_arg = invoice.display().to_string();
    assert!(run_cli_in_home(home.path(), &["import", "create", &invoice_arg]).ok);

    let unrouted = run_cli_in_home(home.path(), &["notify", "preview"]);
    assert!(unrouted.ok);
    assert!(unrouted.stdout.contains("No messages to send."));
    assert!(unrouted.stdout.contains("AB-CD123 (1 open)"));

    let set = run_cli_in_home(
        home.path(),
        &[
            "vehicles",
            "set",
            "AB-CD123",
            "--owner-name",
            "Kim",
            "--owner-email",
            "kim@example.com",
        ],
    );
    assert!(set.ok, "{}", set.stdout);
    assert!(set.stdout.starts_with("Added AB-CD123."));

    let sent = run_cli_in_home(home.path(), &["notify", "send", "--json"]);
    assert!(sent.ok, "{}", sent.stdout);
    let payload = parse_json(&sent.stdout);
    assert_eq!(payload["data"]["delivered"], Value::from(1));

    let outbox = fs::read_dir(home.path().join("outbox"));
    assert!(outbox.is_ok());
    if let Ok(entries) = outbox {
        assert_eq!(entries.count(), 1);
    }
}

#[test]
fn backup_round_trip_restores_history() {
    let home = test_home();
    let invoice = write_invoice(home.path(), "march.csv", MARCH_ROWS);
    let invoice_arg = invoice.display().to_string();
    assert!(run_cli_in_home(home.path(), &["import", "create", &invoice_arg]).ok);

    let archive = home.path().join("snapshot.zip");
    let archive_arg = archive.display().to_string();
    let created = run_cli_in_home(home.path(), &["backup", "create", "--output", &archive_arg]);
    assert!(created.ok, "{}", created.stdout);
    assert!(archive.exists());

    assert!(run_cli_in_home(home.path(), &["history", "clear", "--yes"]).ok);
    let restored = run_cli_in_home(home.path(), &["backup", "restore", &archive_arg]);
    assert!(restored.ok, "{}", restored.stdout);

    let history = run_cli_in_home(home.path(), &["history", "list", "--json"]);
    assert_eq!(parse_json(&history.stdout)["data"]["total"], Value::from(3));
}
