//! Engine configuration.
//!
//! Configuration is explicit: the CLI (or any embedding caller) builds an
//! [`EngineConfig`] and hands it to the validator. Library code never reads
//! environment variables.

pub mod loader;
pub mod schema;

pub use loader::{discover, load, load_config_file, CONFIG_FILE_NAMES};
pub use schema::{EngineConfig, RulesConfig, SecurityConfig, StyleConfig, TemplateRulesConfig};
