//! Router connection and polling settings
//!
//! Stored as TOML in `routerwatch.toml`:
//!
//! ```toml
//! [router]
//! host = "192.168.1.100"
//! port = 22
//! username = "admin"
//! # password = "..."   optional; never written back
//!
//! [polling]
//! interval_secs = 30
//!
//! [ssh]
//! connect_timeout_secs = 10
//! command_timeout_secs = 10
//! # known_hosts_path = "/path/to/known_hosts"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::session::{
    DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_SSH_PORT, RemoteEndpoint,
    SessionTimeouts,
};

/// Router address used when none is configured
pub const DEFAULT_HOST: &str = "192.168.1.100";
/// Login name used when none is configured
pub const DEFAULT_USERNAME: &str = "admin";
/// Default seconds between poll cycles
pub const DEFAULT_INTERVAL_SECS: u64 = 30;
/// Shortest accepted poll interval in seconds
pub const MIN_INTERVAL_SECS: u64 = 5;
/// Longest accepted poll interval in seconds
pub const MAX_INTERVAL_SECS: u64 = 3600;

/// Complete settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterSettings {
    /// Where and how to log in
    #[serde(default)]
    pub router: RouterConnectionSettings,
    /// Poll schedule
    #[serde(default)]
    pub polling: PollingSettings,
    /// SSH transport tuning
    #[serde(default)]
    pub ssh: SshSettings,
}

/// `[router]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConnectionSettings {
    /// Hostname or IP address
    #[serde(default = "default_host")]
    pub host: String,
    /// SSH port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login name
    #[serde(default = "default_username")]
    pub username: String,
    /// Login password; read from the file if present but never written
    #[serde(default, deserialize_with = "deserialize_password", skip_serializing)]
    pub password: Option<SecretString>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

const fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn deserialize_password<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let password: Option<String> = Option::deserialize(deserializer)?;
    Ok(password.map(SecretString::from))
}

impl Default for RouterConnectionSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_username(),
            password: None,
        }
    }
}

/// `[polling]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingSettings {
    /// Seconds between poll cycles (5–3600, default 30)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

const fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl PollingSettings {
    /// Returns the interval clamped to the valid range
    #[must_use]
    pub const fn effective_interval_secs(&self) -> u64 {
        if self.interval_secs < MIN_INTERVAL_SECS {
            MIN_INTERVAL_SECS
        } else if self.interval_secs > MAX_INTERVAL_SECS {
            MAX_INTERVAL_SECS
        } else {
            self.interval_secs
        }
    }

    /// The clamped interval as a [`Duration`]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.effective_interval_secs())
    }
}

/// `[ssh]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshSettings {
    /// Seconds allowed for connect, handshake, and authentication
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds allowed for one command
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Where accepted host keys are stored; defaults to the config dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_hosts_path: Option<PathBuf>,
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

const fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            command_timeout_secs: default_command_timeout_secs(),
            known_hosts_path: None,
        }
    }
}

impl SshSettings {
    /// Timeouts for the session; zero values fall back to the defaults
    #[must_use]
    pub fn timeouts(&self) -> SessionTimeouts {
        let or_default =
            |secs: u64, default: u64| Duration::from_secs(if secs == 0 { default } else { secs });
        SessionTimeouts {
            connect: or_default(self.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS),
            command: or_default(self.command_timeout_secs, DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }

    /// Configured known_hosts path, or `known_hosts` inside `config_dir`
    #[must_use]
    pub fn known_hosts_path_in(&self, config_dir: &Path) -> PathBuf {
        self.known_hosts_path
            .clone()
            .unwrap_or_else(|| config_dir.join(super::manager::KNOWN_HOSTS_FILE))
    }
}

impl RouterSettings {
    /// Checks that the connection settings are usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.router.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "router.host",
                reason: "must not be empty".to_string(),
            });
        }
        if self.router.port == 0 {
            return Err(ConfigError::Invalid {
                field: "router.port",
                reason: "must be between 1 and 65535".to_string(),
            });
        }
        if self.router.username.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "router.username",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Builds the endpoint to connect to
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if validation fails or no password
    /// has been supplied.
    pub fn endpoint(&self) -> ConfigResult<RemoteEndpoint> {
        self.validate()?;
        let password = self
            .router
            .password
            .clone()
            .ok_or_else(|| ConfigError::Invalid {
                field: "router.password",
                reason: "no password configured".to_string(),
            })?;

        Ok(
            RemoteEndpoint::new(self.router.host.trim(), self.router.username.trim(), password)
                .with_port(self.router.port),
        )
    }
}
