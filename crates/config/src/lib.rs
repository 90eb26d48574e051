//! Configuration loading for the aps-login CLI.
//!
//! Uses figment to layer defaults, an optional YAML file and `APS_`-prefixed
//! environment variables.

pub mod schema;

pub use schema::{Config, LogConfig, ProviderConfig};
