//! Daemon bootstrap orchestration.
//!
//! Startup is the only phase allowed to fail the process: configuration,
//! telemetry and the listening socket are all prepared here, and any error
//! is reported before a single connection is accepted.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use otp_config::{Config, ConfigError, OrthoConfig};
use otp_protocol::ServiceKind;

use crate::health::HealthReporter;
use crate::service::CipherService;
use crate::telemetry::{self, TelemetryError};
use crate::transport::{ListenSettings, ListenerError, ListenerHandle, SocketListener};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that layers defaults, files, environment and the given flags.
#[derive(Debug, Default, Clone)]
pub struct SystemConfigLoader {
    arguments: Vec<OsString>,
}

impl SystemConfigLoader {
    /// Builds a loader for the configuration flags of a command line,
    /// program name first.
    #[must_use]
    pub fn new(arguments: Vec<OsString>) -> Self {
        Self { arguments }
    }
}

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter(self.arguments.clone())
    }
}

/// Loader returning a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Configuration loaded but is unusable.
    #[error("invalid configuration: {source}")]
    InvalidConfiguration {
        /// Validation failure.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The listening socket could not be prepared.
    #[error("failed to open listening socket: {source}")]
    Listener {
        /// Underlying socket error.
        #[source]
        source: ListenerError,
    },
}

/// A daemon whose socket is bound and listening but not yet accepting.
pub struct Daemon {
    kind: ServiceKind,
    config: Config,
    listener: SocketListener,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    /// Service this daemon provides.
    #[must_use]
    pub const fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// Address the socket is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Starts the accept loop on a background thread.
    ///
    /// # Errors
    ///
    /// Fails when the socket cannot be switched to non-blocking mode.
    pub fn start(self) -> Result<RunningDaemon, ListenerError> {
        let service = CipherService::new(self.kind, self.config.frame_reader());
        let handle = self.listener.start(Arc::new(service))?;
        self.reporter.listener_ready(self.kind, handle.local_addr());
        Ok(RunningDaemon {
            kind: self.kind,
            handle,
            reporter: self.reporter,
        })
    }
}

/// A daemon that is accepting connections.
pub struct RunningDaemon {
    kind: ServiceKind,
    handle: ListenerHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl RunningDaemon {
    /// Address the daemon accepts connections on.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.handle.local_addr()
    }

    /// Connections currently being served.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.handle.active_connections()
    }

    /// Stops accepting and waits for the accept loop to exit.
    ///
    /// Connections already accepted are left to finish on their own threads.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] if the accept loop panicked.
    pub fn stop(self) -> Result<(), ListenerError> {
        self.handle.shutdown();
        self.handle.join()?;
        self.reporter.listener_stopped(self.kind);
        Ok(())
    }
}

/// Bootstraps a daemon for `kind` listening on `port`.
///
/// # Errors
///
/// Returns the first [`BootstrapError`] encountered; the reporter is told
/// about it before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    kind: ServiceKind,
    port: u16,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting(kind);
    match prepare(loader, kind, port) {
        Ok((config, listener)) => {
            reporter.bootstrap_succeeded(&config, listener.local_addr());
            Ok(Daemon {
                kind,
                config,
                listener,
                reporter,
            })
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn prepare(
    loader: &dyn ConfigLoader,
    kind: ServiceKind,
    port: u16,
) -> Result<(Config, SocketListener), BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    config
        .validate()
        .map_err(|source| BootstrapError::InvalidConfiguration { source })?;
    telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    let settings = ListenSettings {
        host: config.listen_host().to_owned(),
        port,
        backlog: config.listen_backlog(),
        max_connections: config.max_connections(),
    };
    let listener =
        SocketListener::bind(&settings).map_err(|source| BootstrapError::Listener { source })?;
    tracing::debug!(
        target: concat!(env!("CARGO_PKG_NAME"), "::bootstrap"),
        service = %kind,
        address = %listener.local_addr(),
        "listening socket bound"
    );
    Ok((config, listener))
}
