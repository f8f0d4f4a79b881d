//! Cipher daemon for the one-time pad tools.
//!
//! A daemon announces which service it provides ([`ServiceKind`]) as soon as
//! a client connects, then reads one `payload '#' key '@'` request, applies
//! the cipher in that service's direction and replies with `payload '@'`.
//!
//! Connections are served on independent threads. At most
//! `max_connections` run at once; further clients wait in the kernel listen
//! backlog until a slot frees up. Errors on one connection are logged and
//! never affect the others or the process, so the only failures that end the
//! daemon are those met during startup: bad arguments, unusable
//! configuration, or a socket that cannot be bound.
//!
//! The library is parameterised by [`ServiceKind`]; the `otp_dec_d` binary
//! runs the decoding service.

mod bootstrap;
mod cli;
mod health;
mod process;
mod service;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, RunningDaemon, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use otp_protocol::ServiceKind;
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon,
};
pub use service::{CipherService, ConnectionError, ConnectionState};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
