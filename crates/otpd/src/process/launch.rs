//! Supervises daemon launch sequencing and runtime orchestration.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::error::ErrorKind;
use tracing::info;

use otp_config::split_config_arguments;
use otp_protocol::ServiceKind;

use crate::bootstrap::{SystemConfigLoader, bootstrap_with};
use crate::cli::DaemonCli;
use crate::health::{HealthReporter, StructuredHealthReporter};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<S> {
    pub(crate) kind: ServiceKind,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) shutdown: S,
}

/// Runs the daemon providing `kind` until a termination signal arrives.
///
/// `args` is the full command line, program name first. Usage errors and
/// startup failures are written to standard error and yield exit status 1;
/// once the socket is listening, per-connection failures are only logged.
#[must_use]
pub fn run_daemon<I>(args: I, kind: ServiceKind) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
{
    let plan = LaunchPlan {
        kind,
        reporter: Arc::new(StructuredHealthReporter::new()),
        shutdown: SystemShutdownSignal,
    };
    run_daemon_with(args, plan, &mut io::stdout(), &mut io::stderr())
}

/// Runs the daemon with injected collaborators and output streams.
pub(crate) fn run_daemon_with<I, S, W, E>(
    args: I,
    plan: LaunchPlan<S>,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    S: ShutdownSignal,
    W: Write,
    E: Write,
{
    let program = plan.kind.daemon_name();
    match launch(args, plan) {
        Ok(()) => ExitCode::SUCCESS,
        Err(LaunchError::Usage(error))
            if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            let _ = write!(stdout, "{error}");
            ExitCode::SUCCESS
        }
        Err(LaunchError::Usage(error)) => {
            let _ = write!(stderr, "{error}");
            ExitCode::FAILURE
        }
        Err(error) => {
            let _ = writeln!(stderr, "{program}: {error}");
            ExitCode::FAILURE
        }
    }
}

fn launch<I, S>(args: I, plan: LaunchPlan<S>) -> Result<(), LaunchError>
where
    I: IntoIterator<Item = OsString>,
    S: ShutdownSignal,
{
    let LaunchPlan {
        kind,
        reporter,
        shutdown,
    } = plan;
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli = DaemonCli::parse_for(kind, split.command_arguments).map_err(LaunchError::Usage)?;
    let loader = SystemConfigLoader::new(split.config_arguments);

    let daemon = bootstrap_with(&loader, reporter, kind, cli.listening_port)?;
    let running = daemon.start()?;
    info!(
        target: PROCESS_TARGET,
        service = %kind,
        address = %running.local_addr(),
        "daemon running"
    );

    let waited = shutdown.wait();
    running.stop()?;
    waited?;
    info!(
        target: PROCESS_TARGET,
        service = %kind,
        "shutdown sequence completed"
    );
    Ok(())
}
