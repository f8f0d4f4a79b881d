//! Error surface for daemon launch and supervision.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Errors that end the daemon process with a failure status.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The command line was not understood.
    #[error("{0}")]
    Usage(#[source] clap::Error),
    /// Startup failed before any connection was accepted.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The accept loop could not be started or stopped cleanly.
    #[error("daemon socket listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// Waiting for a shutdown signal failed.
    #[error("failed to await shutdown signal: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}
