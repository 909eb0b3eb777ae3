pub mod client;
pub mod common;
pub mod proto;

pub use client::{run, OutputFormat, PredictionClient};
pub use common::config::ClientConfig;
pub use common::error::ClientError;
