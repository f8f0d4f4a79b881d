//! Shared configuration for the pad client and daemon.
//!
//! Settings are layered by [`ortho_config`]: built-in defaults, then an
//! optional configuration file (`--config-path`), then `OTP_*` environment
//! variables, then command-line flags. Flags must precede the positional
//! arguments; [`split_config_arguments`] separates the two.

mod args;
mod defaults;
mod logging;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use otp_protocol::FrameReader;

pub use args::{ArgumentSplit, CONFIG_CLI_FLAGS, split_config_arguments};
pub use defaults::*;
pub use logging::LogFormat;
pub use ortho_config::{OrthoConfig, OrthoError};

/// Resolved configuration shared by both programs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "OTP")]
pub struct Config {
    /// Host name the client connects to.
    #[serde(default = "default_host")]
    #[ortho_config(default = default_host())]
    pub host: String,
    /// Address the daemon binds.
    #[serde(default = "default_listen_host")]
    #[ortho_config(default = default_listen_host())]
    pub listen_host: String,
    /// Connections a daemon serves concurrently.
    #[serde(default = "default_max_connections")]
    #[ortho_config(default = default_max_connections())]
    pub max_connections: usize,
    /// Depth of the daemon's accept queue.
    #[serde(default = "default_listen_backlog")]
    #[ortho_config(default = default_listen_backlog())]
    pub listen_backlog: u16,
    /// Largest message body either side accepts.
    #[serde(default = "default_max_message_bytes")]
    #[ortho_config(default = default_max_message_bytes())]
    pub max_message_bytes: usize,
    /// Client connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    #[ortho_config(default = default_connect_timeout_ms())]
    pub connect_timeout_ms: u64,
    /// `tracing` filter directive for the daemon.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Daemon log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            listen_host: default_listen_host(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            listen_backlog: DEFAULT_LISTEN_BACKLOG,
            max_message_bytes: default_max_message_bytes(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

/// Settings that load successfully but cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `max_connections` was zero, which would stall the daemon.
    #[error("max_connections must be at least 1")]
    NoConnections,
    /// `listen_backlog` was zero.
    #[error("listen_backlog must be at least 1")]
    NoBacklog,
    /// `max_message_bytes` was zero, which would reject every message.
    #[error("max_message_bytes must be at least 1")]
    NoMessageBytes,
    /// `connect_timeout_ms` was zero, which the socket layer rejects.
    #[error("connect_timeout_ms must be at least 1")]
    NoConnectTimeout,
}

impl Config {
    /// Client connect target host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Daemon bind host.
    #[must_use]
    pub fn listen_host(&self) -> &str {
        &self.listen_host
    }

    /// Concurrency bound for the daemon.
    #[must_use]
    pub const fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Listen backlog for the daemon.
    #[must_use]
    pub const fn listen_backlog(&self) -> u16 {
        self.listen_backlog
    }

    /// Message reader honouring the configured size limit.
    #[must_use]
    pub const fn frame_reader(&self) -> FrameReader {
        FrameReader::new(self.max_message_bytes)
    }

    /// Client connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Rejects values that would leave a program unable to work.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::NoConnections);
        }
        if self.listen_backlog == 0 {
            return Err(ConfigError::NoBacklog);
        }
        if self.max_message_bytes == 0 {
            return Err(ConfigError::NoMessageBytes);
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::NoConnectTimeout);
        }
        Ok(())
    }
}
