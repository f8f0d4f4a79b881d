use std::env;
use std::process::ExitCode;

use otpd::{ServiceKind, run_daemon};

fn main() -> ExitCode {
    run_daemon(env::args_os(), ServiceKind::Decode)
}
