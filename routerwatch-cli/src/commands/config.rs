//! Settings file commands.

use std::path::Path;

use routerwatch_core::config::RouterSettings;

use crate::cli::{ConfigCommands, RouterArgs};
use crate::error::CliError;
use crate::util::{apply_overrides, create_config_manager, load_settings};

/// Config command handler
pub fn cmd_config(
    config_path: Option<&Path>,
    router: &RouterArgs,
    subcmd: ConfigCommands,
) -> Result<(), CliError> {
    match subcmd {
        ConfigCommands::Show => cmd_show(config_path, router),
        ConfigCommands::Init { force } => cmd_init(config_path, router, force),
        ConfigCommands::Path => {
            let config_manager = create_config_manager(config_path)?;
            println!("{}", config_manager.settings_path().display());
            Ok(())
        }
    }
}

fn cmd_show(config_path: Option<&Path>, router: &RouterArgs) -> Result<(), CliError> {
    let config_manager = create_config_manager(config_path)?;
    let settings = load_settings(&config_manager, router)?;

    let source = if config_manager.settings_exist() {
        config_manager.settings_path().display().to_string()
    } else {
        "defaults (no settings file)".to_string()
    };
    println!("# Source: {source}");
    println!("{}", format_settings(&settings)?);
    Ok(())
}

fn cmd_init(config_path: Option<&Path>, router: &RouterArgs, force: bool) -> Result<(), CliError> {
    let config_manager = create_config_manager(config_path)?;
    let path = config_manager.settings_path();

    if config_manager.settings_exist() && !force {
        return Err(CliError::Config(format!(
            "{} already exists; use --force to overwrite",
            path.display()
        )));
    }

    let mut settings = RouterSettings::default();
    apply_overrides(&mut settings, router);
    settings.validate()?;
    config_manager.save_settings(&settings)?;

    println!("Wrote {}", path.display());
    if router.password.is_some() {
        println!("Note: the password is not stored; pass --password or set ROUTERWATCH_PASSWORD.");
    }
    Ok(())
}

/// Format settings as TOML with a line noting whether a password is set
///
/// # Errors
///
/// Returns `CliError::Output` if the settings cannot be serialized.
pub fn format_settings(settings: &RouterSettings) -> Result<String, CliError> {
    let text = toml::to_string_pretty(settings)
        .map_err(|e| CliError::Output(format!("Failed to serialize settings: {e}")))?;
    let password = if settings.router.password.is_some() {
        "set"
    } else {
        "not set"
    };
    Ok(format!("{}\n# password: {password}", text.trim_end()))
}
