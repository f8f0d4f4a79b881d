//! Configuration loading for the client.

use std::ffi::OsString;

use otp_config::{Config, OrthoConfig};

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration from the configuration flags of the command line.
    ///
    /// Configuration flags must precede the positional arguments; anything
    /// after the first positional argument is left to the command parser.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}
