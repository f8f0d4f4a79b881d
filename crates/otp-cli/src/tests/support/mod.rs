//! Shared fixtures for client tests.

mod fake_daemon;
mod files;

use std::ffi::OsString;

use otp_config::Config;

use crate::{AppError, ConfigLoader};

pub(in crate::tests) use self::fake_daemon::FakeDaemon;
pub(in crate::tests) use self::files::PadFiles;

/// Loader that ignores the command line and hands out a fixed configuration.
pub(in crate::tests) struct StaticLoader(pub(in crate::tests) Config);

impl ConfigLoader for StaticLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.0.clone())
    }
}

/// Configuration pointing the client at loopback with a short timeout.
pub(in crate::tests) fn loopback_loader() -> StaticLoader {
    StaticLoader(Config {
        host: "127.0.0.1".to_owned(),
        connect_timeout_ms: 1_000,
        ..Config::default()
    })
}

/// Output captured from one client run.
#[derive(Debug)]
pub(in crate::tests) struct Outcome {
    pub(in crate::tests) status: std::process::ExitCode,
    pub(in crate::tests) stdout: String,
    pub(in crate::tests) stderr: String,
}

/// Runs the client with `args` (program name excluded) against `loader`.
pub(in crate::tests) fn run_client<L: ConfigLoader>(args: &[OsString], loader: &L) -> Outcome {
    let mut argv = vec![OsString::from("otp_enc")];
    argv.extend(args.iter().cloned());
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let status = crate::run_with_loader(argv, &mut stdout, &mut stderr, loader);
    Outcome {
        status,
        stdout: String::from_utf8(stdout).expect("stdout is utf-8"),
        stderr: String::from_utf8(stderr).expect("stderr is utf-8"),
    }
}
