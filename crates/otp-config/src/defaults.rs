use otp_protocol::DEFAULT_MAX_MESSAGE_BYTES;

use crate::logging::LogFormat;

/// Host the client connects to when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Address the daemon binds when none is configured (all IPv4 interfaces).
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";

/// Number of connections a daemon serves at once.
pub const DEFAULT_MAX_CONNECTIONS: usize = 5;

/// Depth of the kernel accept queue.
pub const DEFAULT_LISTEN_BACKLOG: u16 = 5;

/// Client connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned default host, for serde.
pub fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

/// Owned default listen host, for serde.
pub fn default_listen_host() -> String {
    DEFAULT_LISTEN_HOST.to_owned()
}

/// Default concurrency bound, for serde.
pub const fn default_max_connections() -> usize {
    DEFAULT_MAX_CONNECTIONS
}

/// Default listen backlog, for serde.
pub const fn default_listen_backlog() -> u16 {
    DEFAULT_LISTEN_BACKLOG
}

/// Default message size limit, for serde.
pub const fn default_max_message_bytes() -> usize {
    DEFAULT_MAX_MESSAGE_BYTES
}

/// Default connect timeout, for serde.
pub const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
