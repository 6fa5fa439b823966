//! Router reboot command.

use std::path::Path;

use routerwatch_core::control;

use crate::cli::RouterArgs;
use crate::error::CliError;
use crate::util::{create_runtime, monitor_params};

/// Reboot command handler
pub fn cmd_reboot(
    config_path: Option<&Path>,
    router: &RouterArgs,
    yes: bool,
) -> Result<(), CliError> {
    if !yes {
        return Err(CliError::Control(
            "Refusing to reboot without --yes".to_string(),
        ));
    }

    let params = monitor_params(config_path, router)?;
    let address = params.endpoint.address();
    let runtime = create_runtime()?;
    let session = params.ssh_session();

    if !runtime.block_on(session.connect()) {
        return Err(CliError::Connection(format!("Could not connect to {address}")));
    }

    let rebooted = runtime.block_on(async {
        let rebooted = control::reboot(&session).await;
        session.disconnect().await;
        rebooted
    });

    if rebooted {
        println!("Reboot command sent to {address}.");
        Ok(())
    } else {
        Err(CliError::Control(format!("Could not reboot {address}")))
    }
}
