//! # Common Components
//!
//! Shared pieces used by the client core and the binary.
//!
//! ## Modules
//!
//! - [`config`]: TOML configuration and `host:port` parsing
//! - [`error`]: The [`ClientError`](error::ClientError) taxonomy

pub mod config;
pub mod error;
