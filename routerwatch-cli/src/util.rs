//! Shared utility functions used across command modules.

use std::io::IsTerminal;
use std::path::Path;

use routerwatch_core::config::{ConfigManager, RouterSettings};
use routerwatch_core::monitor::MonitorParams;
use secrecy::SecretString;

use crate::cli::RouterArgs;
use crate::error::CliError;

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Applies command-line overrides to loaded settings
pub fn apply_overrides(settings: &mut RouterSettings, args: &RouterArgs) {
    if let Some(host) = &args.host {
        settings.router.host.clone_from(host);
    }
    if let Some(port) = args.port {
        settings.router.port = port;
    }
    if let Some(user) = &args.user {
        settings.router.username.clone_from(user);
    }
    if let Some(password) = &args.password {
        settings.router.password = Some(SecretString::from(password.clone()));
    }
}

/// Loads settings, applies overrides, and validates the result
pub fn load_settings(
    config_manager: &ConfigManager,
    args: &RouterArgs,
) -> Result<RouterSettings, CliError> {
    let mut settings = config_manager
        .load_settings()
        .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))?;
    apply_overrides(&mut settings, args);
    settings.validate()?;
    Ok(settings)
}

/// Prompts for the password when neither the file nor the command line
/// supplied one
pub fn ensure_password(settings: &mut RouterSettings) -> Result<(), CliError> {
    if settings.router.password.is_some() {
        return Ok(());
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Config(
            "No password configured; use --password or ROUTERWATCH_PASSWORD".to_string(),
        ));
    }

    let prompt = format!(
        "Password for {}@{}: ",
        settings.router.username, settings.router.host
    );
    let password = rpassword::prompt_password(prompt)?;
    settings.router.password = Some(SecretString::from(password));
    Ok(())
}

/// Resolves everything needed to talk to the router
pub fn monitor_params(
    config_path: Option<&Path>,
    args: &RouterArgs,
) -> Result<MonitorParams, CliError> {
    let config_manager = create_config_manager(config_path)?;
    let mut settings = load_settings(&config_manager, args)?;
    ensure_password(&mut settings)?;
    Ok(MonitorParams::from_settings(&settings, &config_manager)?)
}

/// Creates the runtime a command runs its async work on
pub fn create_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Connection(format!("Failed to create async runtime: {e}")))
}

/// Serializes `value` as pretty JSON
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Output(format!("Failed to serialize to JSON: {e}")))
}
