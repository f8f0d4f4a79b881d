//! Error types and exit status mapping for the client.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;

use otp_config::ConfigError;
use otp_protocol::{AlphabetError, FrameError, HandshakeError, KeyTooShort};

/// Exit status for a handshake with the wrong kind of daemon.
pub(crate) const WRONG_DAEMON_STATUS: u8 = 2;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("failed to read {}: {source}", .path.display())]
    ReadInput { path: PathBuf, source: io::Error },
    #[error("input contains bad characters: {}: {source}", .path.display())]
    BadCharacters {
        path: PathBuf,
        source: AlphabetError,
    },
    #[error("key {} is too short: {source}", .path.display())]
    KeyTooShort { path: PathBuf, source: KeyTooShort },
    #[error(
        "message in {} is too large: the request needs {size} bytes but the limit is {limit}",
        .path.display()
    )]
    RequestTooLarge {
        path: PathBuf,
        size: usize,
        limit: usize,
    },
    #[error("no such host {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        source: io::Error,
    },
    #[error("failed to connect to daemon at {address}: {source}")]
    Connect {
        address: SocketAddr,
        source: io::Error,
    },
    #[error("failed to read handshake from daemon: {0}")]
    ReadHandshake(io::Error),
    #[error("could not contact {} on port {port}", reached_daemon(.source))]
    WrongDaemon { port: u16, source: HandshakeError },
    #[error("failed to send request to daemon: {0}")]
    SendRequest(io::Error),
    #[error("failed to read response from daemon: {0}")]
    ReadResponse(FrameError),
    #[error("daemon sent an invalid response: {0}")]
    InvalidResponse(FrameError),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}

impl AppError {
    /// Process exit status for this error.
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            Self::WrongDaemon { .. } => ExitCode::from(WRONG_DAEMON_STATUS),
            _ => ExitCode::FAILURE,
        }
    }
}

fn reached_daemon(error: &HandshakeError) -> String {
    match error {
        HandshakeError::WrongService { found, .. } => found.daemon_name().to_owned(),
        HandshakeError::UnknownToken { token, .. } => format!("a daemon announcing {token:?}"),
    }
}
