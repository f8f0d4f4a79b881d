//! CLI entrypoint for the one-time pad encoder.
//!
//! The binary delegates to [`otp_cli::run`], which validates the input files,
//! performs the daemon exchange and maps failures to exit statuses.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    otp_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
