//! Configuration module for domainql.
//!
//! Handles the settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, DatabaseSettings, IngestionSettings, Settings, SettingsError,
};
