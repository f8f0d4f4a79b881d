//! Test double for [`HealthReporter`] that records lifecycle events.

use std::net::SocketAddr;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use otp_config::Config;
use otp_protocol::ServiceKind;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;

/// Structured health events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    BootstrapStarting(ServiceKind),
    BootstrapSucceeded(SocketAddr),
    BootstrapFailed(String),
    ListenerReady(ServiceKind, SocketAddr),
    ListenerStopped(ServiceKind),
}

/// Records health events and lets tests wait for the listener.
#[derive(Debug, Default)]
pub(crate) struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
    changed: Condvar,
}

impl RecordingHealthReporter {
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
        self.changed.notify_all();
    }

    /// Blocks until the listener reports ready, or startup fails.
    pub(crate) fn wait_for_ready(&self, timeout: Duration) -> Option<SocketAddr> {
        let guard = self.events.lock().expect("health reporter mutex poisoned");
        let (events, _timeout) = self
            .changed
            .wait_timeout_while(guard, timeout, |events| {
                !events.iter().any(|event| {
                    matches!(
                        event,
                        HealthEvent::ListenerReady(..) | HealthEvent::BootstrapFailed(_)
                    )
                })
            })
            .expect("health reporter mutex poisoned during wait");
        events.iter().find_map(|event| match event {
            HealthEvent::ListenerReady(_, address) => Some(*address),
            _ => None,
        })
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self, kind: ServiceKind) {
        self.record(HealthEvent::BootstrapStarting(kind));
    }

    fn bootstrap_succeeded(&self, _config: &Config, address: SocketAddr) {
        self.record(HealthEvent::BootstrapSucceeded(address));
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_ready(&self, kind: ServiceKind, address: SocketAddr) {
        self.record(HealthEvent::ListenerReady(kind, address));
    }

    fn listener_stopped(&self, kind: ServiceKind) {
        self.record(HealthEvent::ListenerStopped(kind));
    }
}
