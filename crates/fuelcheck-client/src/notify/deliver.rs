use std::path::{Path, PathBuf};

use serde::Serialize;
use ulid::Ulid;

use crate::notify::template::RenderedMessage;
use crate::state::write_atomic;
use crate::{ClientError, ClientResult};

/// Hands a rendered message to a transport. Returns a receipt on success.
pub trait Notifier {
    fn deliver(&mut self, message: &RenderedMessage) -> ClientResult<String>;
}

/// Spools each message as a plain-text file for an external mail agent.
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    directory: PathBuf,
}

impl OutboxNotifier {
    pub fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl Notifier for OutboxNotifier {
    fn deliver(&mut self, message: &RenderedMessage) -> ClientResult<String> {
        if message.to.trim().is_empty() {
            return Err(ClientError::notification_failed(
                &message.vehicle_id,
                "message has no recipient address",
            ));
        }

        let file_name = format!("msg_{}.txt", Ulid::new());
        let path = self.directory.join(&file_name);
        let body = format!(
            "To: {}\nSubject: {}\nX-Vehicle: {}\n\n{}",
            message.to, message.subject, message.vehicle_id, message.body
        );
        write_atomic(&path, body.as_bytes())
            .map_err(|error| ClientError::notification_failed(&message.to, &error.message))?;
        Ok(file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub recipient: String,
    pub vehicle_id: String,
    pub delivered: bool,
    pub receipt: Option<String>,
    pub error: Option<String>,
}

/// Attempts every message once; a failure is recorded and the rest continue.
pub fn deliver_all<N: Notifier + ?Sized>(
    notifier: &mut N,
    messages: &[RenderedMessage],
) -> Vec<DeliveryReport> {
    messages
        .iter()
        .map(|message| match notifier.deliver(message) {
            Ok(receipt) => DeliveryReport {
                recipient: message.to.clone(),
                vehicle_id: message.vehicle_id.clone(),
                delivered: true,
                receipt: Some(receipt),
                error: None,
            },
            Err(error) => {
                tracing::warn!(
                    recipient = %message.to,
                    vehicle = %message.vehicle_id,
                    error = %error,
                    "notification delivery failed"
                );
                DeliveryReport {
                    recipient: message.to.clone(),
                    vehicle_id: message.vehicle_id.clone(),
                    delivered: false,
                    receipt: None,
                    error: Some(error.message),
                }
            }
        })
        .collect()
}
