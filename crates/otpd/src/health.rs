//! Structured health reporting for daemon lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use otp_config::Config;
use otp_protocol::ServiceKind;

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self, kind: ServiceKind);

    /// Invoked once configuration, telemetry and the socket are ready.
    fn bootstrap_succeeded(&self, config: &Config, address: SocketAddr);

    /// Invoked when startup fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when the accept loop is running.
    fn listener_ready(&self, kind: ServiceKind, address: SocketAddr);

    /// Invoked after the accept loop has stopped.
    fn listener_stopped(&self, kind: ServiceKind);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self, kind: ServiceKind) {
        (**self).bootstrap_starting(kind);
    }

    fn bootstrap_succeeded(&self, config: &Config, address: SocketAddr) {
        (**self).bootstrap_succeeded(config, address);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_ready(&self, kind: ServiceKind, address: SocketAddr) {
        (**self).listener_ready(kind, address);
    }

    fn listener_stopped(&self, kind: ServiceKind) {
        (**self).listener_stopped(kind);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self, kind: ServiceKind) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            service = %kind,
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            address = %address,
            max_connections = config.max_connections(),
            listen_backlog = config.listen_backlog(),
            max_message_bytes = config.frame_reader().max_bytes(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn listener_ready(&self, kind: ServiceKind, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            service = %kind,
            address = %address,
            "daemon accepting connections"
        );
    }

    fn listener_stopped(&self, kind: ServiceKind) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_stopped",
            service = %kind,
            "daemon stopped accepting connections"
        );
    }
}
