//! Configuration management for routerwatch
//!
//! This module provides the `ConfigManager` for loading and saving
//! `routerwatch.toml`, and the `RouterSettings` it contains.

mod manager;
pub mod settings;

pub use manager::{CONFIG_DIR_ENV, ConfigManager, KNOWN_HOSTS_FILE, SETTINGS_FILE};
pub use settings::{
    DEFAULT_HOST, DEFAULT_INTERVAL_SECS, DEFAULT_USERNAME, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS,
    PollingSettings, RouterConnectionSettings, RouterSettings, SshSettings,
};
