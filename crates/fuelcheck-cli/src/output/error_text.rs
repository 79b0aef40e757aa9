use fuelcheck_client::ClientError;
use serde_json::Value;

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "Something went wrong, but it's easy to fix.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];

    let issues = row_issue_lines(error.data.as_ref());
    if !issues.is_empty() {
        lines.push(String::new());
        lines.push("Rows with problems:".to_string());
        lines.extend(issues);
    }

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

const MAX_ISSUE_LINES: usize = 10;

fn row_issue_lines(data: Option<&Value>) -> Vec<String> {
    let Some(issues) = data
        .and_then(|value| value.get("issues"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let mut lines = issues
        .iter()
        .take(MAX_ISSUE_LINES)
        .map(|issue| {
            format!(
                "  {} row {}: {} ({})",
                issue
                    .get("source_file")
                    .and_then(Value::as_str)
                    .unwrap_or("?"),
                issue.get("row").and_then(Value::as_u64).unwrap_or(0),
                issue.get("message").and_then(Value::as_str).unwrap_or(""),
                issue.get("field").and_then(Value::as_str).unwrap_or(""),
            )
        })
        .collect::<Vec<_>>();
    if issues.len() > MAX_ISSUE_LINES {
        lines.push(format!(
            "  ... and {} more",
            issues.len() - MAX_ISSUE_LINES
        ));
    }
    lines
}
