//! Separates configuration flags from positional arguments.
//!
//! Both binaries accept configuration flags ahead of their positional
//! arguments (`otp_enc --host example.org plain key 9000`). The flags are
//! forwarded to the configuration loader while the remainder is parsed by the
//! program's own `clap` definition, so neither parser sees the other's input.

use std::ffi::{OsStr, OsString};

/// Flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of [`crate::Config`].
pub const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--host",
    "--listen-host",
    "--max-connections",
    "--listen-backlog",
    "--max-message-bytes",
    "--connect-timeout-ms",
    "--log-filter",
    "--log-format",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Stop;
    }

    let (flag, has_inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (&*text, false),
    };

    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Result of splitting a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSplit {
    /// Program name followed by the configuration flags and their values.
    pub config_arguments: Vec<OsString>,
    /// Program name followed by everything after the configuration flags.
    pub command_arguments: Vec<OsString>,
}

/// Splits `args` at the first argument that is not a configuration flag.
#[must_use]
pub fn split_config_arguments(args: &[OsString]) -> ArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ArgumentSplit {
            config_arguments: Vec::new(),
            command_arguments: Vec::new(),
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut consumed = 0_usize;
    let mut pending_value = false;

    for argument in rest {
        if pending_value {
            config_arguments.push(argument.clone());
            pending_value = false;
            consumed += 1;
            continue;
        }

        match classify(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                pending_value = needs_value;
                consumed += 1;
            }
            FlagAction::Stop => break,
        }
    }

    let mut command_arguments = vec![program.clone()];
    command_arguments.extend(rest.iter().skip(consumed).cloned());

    ArgumentSplit {
        config_arguments,
        command_arguments,
    }
}
