//! Configuration and logging setup for carve

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError, ExtractConfig, HostConfig, LogFormat, LoggingConfig};
