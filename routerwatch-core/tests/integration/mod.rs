//! Integration test modules

mod monitor_tests;
mod poller_tests;

use routerwatch_core::testing::ScriptedTransport;
use routerwatch_core::{RemoteEndpoint, RemoteSession, SessionHandle, SessionTimeouts};

/// Wraps a clone of `transport` in a shared session handle
pub fn handle_with(transport: &ScriptedTransport) -> SessionHandle {
    SessionHandle::new(RemoteSession::new(
        RemoteEndpoint::new("192.168.1.1", "admin", "secret".to_string()),
        SessionTimeouts::default(),
        Box::new(transport.clone()),
    ))
}
