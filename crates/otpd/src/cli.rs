//! Positional command line of a daemon binary.

use std::ffi::OsString;

use clap::{CommandFactory, FromArgMatches, Parser};

use otp_protocol::ServiceKind;

/// Arguments left once configuration flags have been split off.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    about = "Serves one-time pad cipher requests over TCP.",
    after_help = "Configuration flags (--config-path, --listen-host, --max-connections, ...) \
                  must come before the port."
)]
pub(crate) struct DaemonCli {
    /// TCP port to accept connections on.
    pub(crate) listening_port: u16,
}

impl DaemonCli {
    /// Parses `arguments` (program name first) for the daemon providing `kind`.
    pub(crate) fn parse_for(
        kind: ServiceKind,
        arguments: Vec<OsString>,
    ) -> Result<Self, clap::Error> {
        let matches = Self::command()
            .name(kind.daemon_name())
            .bin_name(kind.daemon_name())
            .try_get_matches_from(arguments)?;
        Self::from_arg_matches(&matches)
    }
}
