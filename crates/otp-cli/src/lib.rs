//! Command-line client for the one-time pad encoding daemon.
//!
//! `otp_enc <plaintext_file> <key_file> <port>` validates both files locally,
//! connects to the daemon, checks that it announces the encoding service and
//! only then sends the request. The ciphertext is printed to standard output
//! followed by a newline; every diagnostic goes to standard error.
//!
//! Exit status is 0 on success, 2 when the daemon on the port is not an
//! encoding daemon, and 1 for anything else (usage, unreadable or invalid
//! input, a key shorter than the message, a request over the message size
//! limit, transport failures).

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use otp_config::{Config, split_config_arguments};
use otp_protocol::{Request, ServiceKind};

mod cli;
mod config;
mod errors;
mod exchange;
mod input;
mod transport;

use cli::Cli;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use exchange::Exchange;
use input::load_text;

const PROGRAM: &str = "otp_enc";

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    stdout: &'a mut W,
    stderr: &'a mut E,
    loader: &'a L,
}

impl<W, E, L> CliRunner<'_, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let result = self.execute(args.into_iter().collect());

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(AppError::CliUsage(error))
                if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
            {
                let _ = write!(self.stdout, "{error}");
                ExitCode::SUCCESS
            }
            Err(AppError::CliUsage(error)) => {
                let _ = write!(self.stderr, "{error}");
                ExitCode::FAILURE
            }
            Err(error) => {
                let _ = writeln!(self.stderr, "{PROGRAM}: {error}");
                error.exit_code()
            }
        }
    }

    fn execute(&mut self, args: Vec<OsString>) -> Result<(), AppError> {
        let split = split_config_arguments(&args);
        let cli = Cli::try_parse_from(split.command_arguments).map_err(AppError::CliUsage)?;
        let config = self.loader.load(&split.config_arguments)?;
        encrypt(&cli, &config, self.stdout)
    }
}

/// Validates the inputs, performs the exchange and prints the ciphertext.
fn encrypt<W>(cli: &Cli, config: &Config, stdout: &mut W) -> Result<(), AppError>
where
    W: Write,
{
    config.validate()?;
    let plaintext = load_text(&cli.plaintext_file)?;
    let key = load_text(&cli.key_file)?;
    let request = Request::new(plaintext, key).map_err(|source| AppError::KeyTooShort {
        path: cli.key_file.clone(),
        source,
    })?;
    let reader = config.frame_reader();
    if request.body_len() > reader.max_bytes() {
        return Err(AppError::RequestTooLarge {
            path: cli.plaintext_file.clone(),
            size: request.body_len(),
            limit: reader.max_bytes(),
        });
    }

    let mut stream = transport::connect(config.host(), cli.port, config.connect_timeout())?;
    let exchange = Exchange {
        service: ServiceKind::Encode,
        port: cli.port,
        reader,
    };
    let ciphertext = exchange.run(&mut stream, &request)?;

    writeln!(stdout, "{ciphertext}").map_err(AppError::WriteOutput)?;
    stdout.flush().map_err(AppError::WriteOutput)
}

/// Runs the client using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the client with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner {
        stdout,
        stderr,
        loader,
    }
    .run(args)
}

#[cfg(test)]
mod tests;
