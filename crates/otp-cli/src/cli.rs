use std::path::PathBuf;

use clap::Parser;

/// Positional command line of `otp_enc`.
#[derive(Debug, Parser)]
#[command(
    name = "otp_enc",
    about = "Encrypts a plaintext file with a one-time pad via the encoding daemon.",
    after_help = "Configuration flags (--config-path, --host, --connect-timeout-ms, ...) \
                  must come before the positional arguments."
)]
pub(crate) struct Cli {
    /// File holding the message (A-Z and space).
    pub(crate) plaintext_file: PathBuf,
    /// File holding the pad; at least as long as the message.
    pub(crate) key_file: PathBuf,
    /// Port the encoding daemon listens on.
    pub(crate) port: u16,
}
