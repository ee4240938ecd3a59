pub mod commands;
pub mod contracts;
pub mod detect;
pub mod error;
mod ingest;
pub mod migrations;
pub mod pattern;
pub mod setup;
pub mod state;
pub mod txsource;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{CoreError, CoreResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
