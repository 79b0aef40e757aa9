use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::notify::route::NotificationPayload;
use crate::state::{TEMPLATE_FILE, read_optional, write_atomic};
use crate::{ClientError, ClientResult};

/// Message texts with placeholders. Fields missing from `template.json`
/// keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplate {
    pub subject: String,
    pub greeting: String,
    pub intro: String,
    pub closing: String,
    pub footer: String,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            subject: "Fuel check: {total_count} finding(s) for {vehicle_id}".to_string(),
            greeting: "Hello {owner_name},".to_string(),
            intro: "the following findings were detected for your vehicle {vehicle_id}:"
                .to_string(),
            closing: "Please review and correct the affected fill-ups.".to_string(),
            footer: "This message was generated by fuelcheck on {today}.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub to: String,
    pub vehicle_id: String,
    pub subject: String,
    pub body: String,
}

impl MessageTemplate {
    pub fn render(&self, payload: &NotificationPayload) -> RenderedMessage {
        let fill = |text: &str| substitute(text, payload);

        let mut body = String::new();
        let _ = writeln!(body, "{}", fill(&self.greeting));
        let _ = writeln!(body);
        let _ = writeln!(body, "{}", fill(&self.intro));
        let _ = writeln!(body);
        let _ = writeln!(
            body,
            "Total: {}  Errors: {}  Warnings: {}",
            payload.total_count, payload.error_count, payload.warning_count
        );
        let _ = writeln!(body);
        let _ = writeln!(body, "{:<10}  {:<5}  {:<20}  Details", "Date", "Time", "Problem");
        for finding in &payload.findings {
            let _ = writeln!(
                body,
                "{:<10}  {:<5}  {:<20}  {}",
                finding.date.format("%Y-%m-%d"),
                finding.time,
                finding.kind.label(),
                finding.detail
            );
        }
        let _ = writeln!(body);
        let _ = writeln!(body, "{}", fill(&self.closing));
        let _ = writeln!(body);
        let _ = write!(body, "-- \n{}\n", fill(&self.footer));

        RenderedMessage {
            to: payload.owner_email.clone(),
            vehicle_id: payload.vehicle_id.clone(),
            subject: fill(&self.subject),
            body,
        }
    }
}

/// Replaces known `{placeholder}` names in one left-to-right pass, so text
/// coming from a value is never substituted again. Unknown names stay as
/// written.
fn substitute(text: &str, payload: &NotificationPayload) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let candidate = &rest[open..];
        let value = candidate.find('}').and_then(|close| {
            placeholder(&candidate[1..close], payload).map(|value| (close, value))
        });
        match value {
            Some((close, value)) => {
                output.push_str(&value);
                rest = &candidate[close + 1..];
            }
            None => {
                output.push('{');
                rest = &candidate[1..];
            }
        }
    }
    output.push_str(rest);
    output
}

fn placeholder(name: &str, payload: &NotificationPayload) -> Option<String> {
    let value = match name {
        "owner_name" => payload.owner_name.clone(),
        "vehicle_id" => payload.vehicle_id.clone(),
        "total_count" => payload.total_count.to_string(),
        "error_count" => payload.error_count.to_string(),
        "warning_count" => payload.warning_count.to_string(),
        "today" => payload.generated_on.format("%Y-%m-%d").to_string(),
        _ => return None,
    };
    Some(value)
}

pub fn load_template(home: &Path) -> ClientResult<MessageTemplate> {
    let path = home.join(TEMPLATE_FILE);
    let Some(body) = read_optional(&path)? else {
        return Ok(MessageTemplate::default());
    };
    serde_json::from_str(&body)
        .map_err(|error| ClientError::storage_corrupt(&path, &error.to_string()))
}

pub fn save_template(home: &Path, template: &MessageTemplate) -> ClientResult<()> {
    let body = serde_json::to_vec_pretty(template)
        .map_err(|error| ClientError::internal_serialization(&error.to_string()))?;
    write_atomic(&home.join(TEMPLATE_FILE), &body)
}
