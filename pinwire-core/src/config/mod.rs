//! Device configuration
//!
//! Board-agnostic configuration structures and the `device.toml` parser.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ConfigError};
pub use types::*;
