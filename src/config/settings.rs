//! TOML-based configuration for domainql.
//!
//! Supports a config file (domainql.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [database]
//! path = "${DATA_DIR}/shop.sqlite"
//!
//! [ingestion]
//! domain_naming = "camel_case"
//! attribute_naming = "preserve"
//! register_relations = true
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::metadata::{IngestOptions, Naming};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("No database configured")]
    NoDatabase,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Database to introspect.
    pub database: DatabaseSettings,

    /// Schema ingestion options.
    pub ingestion: IngestionSettings,
}

/// Database configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to a SQLite file (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

impl DatabaseSettings {
    /// Get the database path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<PathBuf, SettingsError> {
        let path = self.path.as_deref().ok_or(SettingsError::NoDatabase)?;
        Ok(PathBuf::from(expand_env_vars(path)?))
    }
}

/// Schema ingestion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestionSettings {
    /// Naming of domains derived from tables.
    pub domain_naming: Naming,

    /// Naming of attributes derived from columns.
    pub attribute_naming: Naming,

    /// Register a relation per foreign key.
    pub register_relations: bool,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        let defaults = IngestOptions::default();
        Self {
            domain_naming: defaults.domain_naming,
            attribute_naming: defaults.attribute_naming,
            register_relations: defaults.register_relations,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `DOMAINQL_CONFIG`
    /// 2. `./domainql.toml`
    /// 3. `<config dir>/domainql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("DOMAINQL_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("domainql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("domainql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Options for schema ingestion.
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            domain_naming: self.ingestion.domain_naming,
            attribute_naming: self.ingestion.attribute_naming,
            register_relations: self.ingestion.register_relations,
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
