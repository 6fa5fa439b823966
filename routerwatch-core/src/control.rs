//! Control actions sent to the router over the shared session

use tracing::Instrument;

use crate::session::SessionHandle;
use crate::trace_operation;
use crate::tracing::span_names;

/// Command that restarts the router
pub const REBOOT_COMMAND: &str = "reboot";

/// Asks the router to reboot.
///
/// Returns `true` once the command has been executed without a transport
/// error; the router's own exit status is not checked. Any failure is
/// logged and reported as `false`.
pub async fn reboot(session: &SessionHandle) -> bool {
    let span = trace_operation!(span_names::CONTROL_REBOOT, host = %session.address());

    async {
        match session.execute_command(REBOOT_COMMAND).await {
            Ok(_) => {
                tracing::warn!("Router is rebooting");
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "Reboot failed");
                false
            }
        }
    }
    .instrument(span)
    .await
}
