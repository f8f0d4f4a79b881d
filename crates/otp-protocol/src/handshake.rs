//! Service identification exchanged before any request.
//!
//! A daemon writes a six-byte token as soon as it accepts a connection. The
//! client compares it with the kind of service it needs and aborts, without
//! sending its payload, when they differ.

use std::io::{self, Read, Write};

use strum::{Display, EnumString};
use thiserror::Error;

use crate::cipher::Direction;

/// Length of every handshake token.
pub const TOKEN_LEN: usize = 6;

/// A raw token as read from the wire.
pub type Token = [u8; TOKEN_LEN];

/// The two daemon flavours sharing this protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ServiceKind {
    /// Applies the key forwards, turning plaintext into ciphertext.
    Encode,
    /// Applies the key in reverse, recovering plaintext.
    Decode,
}

impl ServiceKind {
    /// Token a daemon of this kind announces.
    #[must_use]
    pub const fn token(self) -> &'static Token {
        match self {
            Self::Encode => b"ENCODE",
            Self::Decode => b"DECODE",
        }
    }

    /// Identifies the kind announced by `token`, if any.
    #[must_use]
    pub fn from_token(token: &[u8]) -> Option<Self> {
        [Self::Encode, Self::Decode]
            .into_iter()
            .find(|kind| kind.token().as_slice() == token)
    }

    /// Transform direction the daemon applies.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Encode => Direction::Forward,
            Self::Decode => Direction::Inverse,
        }
    }

    /// Conventional program name of the daemon.
    #[must_use]
    pub const fn daemon_name(self) -> &'static str {
        match self {
            Self::Encode => "otp_enc_d",
            Self::Decode => "otp_dec_d",
        }
    }
}

/// Raised when the daemon announces a different service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// The daemon is the sibling service.
    #[error("expected {expected} but reached {found}")]
    WrongService {
        /// Service the client needs.
        expected: ServiceKind,
        /// Service the daemon announced.
        found: ServiceKind,
    },
    /// The token matches neither service.
    #[error("expected {expected} but the daemon sent unrecognised token {token:?}")]
    UnknownToken {
        /// Service the client needs.
        expected: ServiceKind,
        /// Bytes received, lossily decoded.
        token: String,
    },
}

/// Checks a received token against the service the caller needs.
///
/// # Errors
///
/// Returns [`HandshakeError`] describing the mismatch.
pub fn verify(expected: ServiceKind, received: &[u8]) -> Result<(), HandshakeError> {
    match ServiceKind::from_token(received) {
        Some(found) if found == expected => Ok(()),
        Some(found) => Err(HandshakeError::WrongService { expected, found }),
        None => Err(HandshakeError::UnknownToken {
            expected,
            token: String::from_utf8_lossy(received).into_owned(),
        }),
    }
}

/// Announces `kind` on a freshly accepted connection.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_token<W>(writer: &mut W, kind: ServiceKind) -> io::Result<()>
where
    W: Write + ?Sized,
{
    writer.write_all(kind.token())?;
    writer.flush()
}

/// Reads exactly one token; a short stream is an `UnexpectedEof` error.
///
/// # Errors
///
/// Propagates read failures.
pub fn read_token<R>(reader: &mut R) -> io::Result<Token>
where
    R: Read + ?Sized,
{
    let mut token = [0_u8; TOKEN_LEN];
    reader.read_exact(&mut token)?;
    Ok(token)
}
