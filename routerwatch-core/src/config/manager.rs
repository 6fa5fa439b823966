//! Loading and saving `routerwatch.toml`

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::tracing::span_names;

use super::settings::RouterSettings;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "ROUTERWATCH_CONFIG_DIR";
/// Settings file name inside the configuration directory
pub const SETTINGS_FILE: &str = "routerwatch.toml";
/// Default known_hosts file name inside the configuration directory
pub const KNOWN_HOSTS_FILE: &str = "known_hosts";

const APP_DIR: &str = "routerwatch";

/// Locates and reads/writes the settings file
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Uses `$ROUTERWATCH_CONFIG_DIR`, or `routerwatch` under the user's
    /// configuration directory
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if neither is available.
    pub fn new() -> ConfigResult<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_config_dir(PathBuf::from(dir)));
        }
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_config_dir(base.join(APP_DIR)))
    }

    /// Uses an explicit configuration directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// The configuration directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Full path of the settings file
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Whether a settings file exists
    #[must_use]
    pub fn settings_exist(&self) -> bool {
        self.settings_path().is_file()
    }

    /// Where host keys are persisted for `settings`
    #[must_use]
    pub fn known_hosts_path(&self, settings: &RouterSettings) -> PathBuf {
        settings.ssh.known_hosts_path_in(&self.config_dir)
    }

    /// Loads settings, falling back to defaults when no file exists
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub fn load_settings(&self) -> ConfigResult<RouterSettings> {
        let _span = tracing::debug_span!(span_names::CONFIG_LOAD).entered();
        let path = self.settings_path();

        let settings = match std::fs::read_to_string(&path) {
            Ok(text) => {
                toml::from_str::<RouterSettings>(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                RouterSettings::default()
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Writes settings, creating the directory if needed. The password is
    /// never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save_settings(&self, settings: &RouterSettings) -> ConfigResult<()> {
        let _span = tracing::debug_span!(span_names::CONFIG_SAVE).entered();

        std::fs::create_dir_all(&self.config_dir).map_err(|source| ConfigError::Io {
            path: self.config_dir.clone(),
            source,
        })?;

        let text =
            toml::to_string_pretty(settings).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        let path = self.settings_path();
        std::fs::write(&path, text).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), "Settings saved");
        Ok(())
    }
}
