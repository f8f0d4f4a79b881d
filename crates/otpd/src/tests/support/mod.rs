//! Shared fixtures for daemon tests.

mod client;
mod reporter;
mod shutdown;

use otp_config::Config;

pub(crate) use self::client::{Exchange, exchange, exchange_in_pieces, hang_up_after_handshake};
pub(crate) use self::reporter::{HealthEvent, RecordingHealthReporter};
pub(crate) use self::shutdown::TriggeredShutdown;

/// Loopback configuration that keeps test output quiet.
pub(crate) fn loopback_config() -> Config {
    Config {
        listen_host: "127.0.0.1".to_owned(),
        log_filter: "warn".to_owned(),
        ..Config::default()
    }
}
