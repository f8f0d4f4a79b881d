//! Loading and validating the plaintext and key files.

use std::fs;
use std::path::Path;

use otp_protocol::Text;

use crate::AppError;

/// Reads `path` and validates it against the alphabet.
///
/// Input files are line oriented, so one trailing `\n` or `\r\n` is dropped
/// before validation.
pub(crate) fn load_text(path: &Path) -> Result<Text, AppError> {
    let bytes = fs::read(path).map_err(|source| AppError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    Text::parse(strip_line_ending(&bytes)).map_err(|source| AppError::BadCharacters {
        path: path.to_path_buf(),
        source,
    })
}

fn strip_line_ending(bytes: &[u8]) -> &[u8] {
    let Some(line) = bytes.strip_suffix(b"\n") else {
        return bytes;
    };
    line.strip_suffix(b"\r").unwrap_or(line)
}
