//! Configuration for carve.
//!
//! Settings are resolved in the following order of precedence (highest to lowest):
//! 1. **Environment Variables**: `CARVE__*` (e.g., `CARVE__EXTRACT__INDENT_WIDTH=2`)
//! 2. **Local Configuration**: `.carve/config.toml` in the workspace root
//! 3. **Project Configuration**: `carve.toml` in the workspace root
//! 4. **Default Values**: Hardcoded defaults in the configuration structs
//!
//! # Configuration File Example
//!
//! ```toml
//! # carve.toml
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [extract]
//! base_component = "Component"
//! indent_width = 2
//! react_import = "import React, { Component } from 'react';"
//!
//! [host]
//! format_command = ["npx", "prettier", "--write"]
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Settings for generated components
    pub extract: ExtractConfig,
    /// Host integration settings
    pub host: HostConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON logging
    Json,
    /// Human-readable pretty format
    Pretty,
}

/// Settings that shape the generated component text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Base class of class-form components
    pub base_component: String,
    /// Spaces per indentation level in generated components
    pub indent_width: usize,
    /// Parameter name of function-form components
    pub props_name: String,
    /// Import prepended to components written to their own file
    pub react_import: String,
}

/// Host integration settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Command run on the touched files after edits are applied; the paths are appended
    pub format_command: Option<Vec<String>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            base_component: "React.Component".to_string(),
            indent_width: 4,
            props_name: "props".to_string(),
            react_import: "import React from \"react\";".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Figment error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for figment::Error {
    fn from(err: ConfigError) -> figment::Error {
        use figment::error::Kind;
        figment::Error::from(Kind::Message(err.to_string()))
    }
}

impl AppConfig {
    /// Load configuration for the workspace rooted at `workspace_root`
    pub fn load(workspace_root: &Path) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        for candidate in ["carve.toml", ".carve/config.toml"] {
            let path = workspace_root.join(candidate);
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading TOML configuration");
                figment = figment.merge(Toml::file(path));
            }
        }

        let config: AppConfig = figment
            .merge(Env::prefixed("CARVE__").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .logging
            .level
            .parse::<tracing::Level>()
            .is_err()
        {
            return Err(ConfigError::Invalid(format!(
                "Unknown log level '{}'",
                self.logging.level
            )));
        }

        if !(1..=8).contains(&self.extract.indent_width) {
            return Err(ConfigError::Invalid(format!(
                "extract.indent_width must be between 1 and 8, got {}",
                self.extract.indent_width
            )));
        }

        if self.extract.base_component.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "extract.base_component cannot be empty".to_string(),
            ));
        }

        if !is_identifier(&self.extract.props_name) {
            return Err(ConfigError::Invalid(format!(
                "extract.props_name '{}' is not an identifier",
                self.extract.props_name
            )));
        }

        if let Some(command) = &self.host.format_command {
            if command.is_empty() {
                return Err(ConfigError::Invalid(
                    "host.format_command cannot be an empty list".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}
