pub mod access;
pub mod anomalies;
pub mod backup;
pub mod commands;
pub mod consumption;
pub mod contracts;
pub mod engine;
pub mod error;
pub mod import;
pub mod ledger;
pub mod migrations;
pub mod notify;
pub mod settings;
pub mod setup;
pub mod state;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use engine::Engine;
pub use error::{ClientError, ClientResult, ErrorCategory};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
