//! Sentinel-delimited message framing.
//!
//! A request travels as `payload '#' key '@'` and a response as
//! `payload '@'`. Neither delimiter belongs to the alphabet, so no escaping is
//! required. Receivers accumulate reads until the terminator appears, which
//! tolerates arbitrarily fragmented delivery; anything after the terminator is
//! discarded because each direction of a connection carries one message.

use std::io::{self, Read, Write};

use strum::Display;
use thiserror::Error;

use crate::alphabet::{AlphabetError, Text};
use crate::cipher::{Direction, KeyTooShort, transform};

/// Separates the payload from the key in a request.
pub const SEPARATOR: u8 = b'#';
/// Marks the end of every message.
pub const TERMINATOR: u8 = b'@';
/// Largest message body accepted by default.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 150_000;

const READ_CHUNK_BYTES: usize = 1024;

/// Part of a request a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Section {
    /// Bytes before the separator, or the whole body of a response.
    Payload,
    /// Bytes between the separator and the terminator.
    Key,
}

/// Errors raised while receiving or decoding a framed message.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Reading from the peer failed.
    #[error("failed to read from peer: {source}")]
    Io {
        /// Underlying transport error.
        #[source]
        source: io::Error,
    },
    /// The peer closed the stream before sending the terminator.
    #[error(
        "peer closed the connection after {} bytes without an end-of-message marker",
        .partial.len()
    )]
    UnexpectedEof {
        /// Bytes accumulated before the stream ended.
        partial: Vec<u8>,
    },
    /// The message grew past the configured limit.
    #[error("message exceeds the {limit} byte limit")]
    TooLarge {
        /// Limit that was exceeded.
        limit: usize,
    },
    /// A request arrived without the payload/key separator.
    #[error("request is missing the '#' separator between payload and key")]
    MissingSeparator,
    /// A section contained a byte outside the alphabet.
    #[error("invalid {section}: {source}")]
    Alphabet {
        /// Section holding the rejected byte.
        section: Section,
        /// Details of the rejected byte.
        #[source]
        source: AlphabetError,
    },
    /// The key cannot cover the payload.
    #[error(transparent)]
    KeyTooShort(#[from] KeyTooShort),
}

impl From<io::Error> for FrameError {
    fn from(source: io::Error) -> Self {
        Self::Io { source }
    }
}

/// Accumulates socket reads until a terminator is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReader {
    max_bytes: usize,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_BYTES)
    }
}

impl FrameReader {
    /// Builds a reader that rejects bodies longer than `max_bytes`.
    #[must_use]
    pub const fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Largest body this reader accepts.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Reads one message body, excluding the terminator.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Io`] when a read fails,
    /// [`FrameError::UnexpectedEof`] when the stream ends first and
    /// [`FrameError::TooLarge`] when the body passes the size limit.
    pub fn read_frame<R>(&self, reader: &mut R) -> Result<Vec<u8>, FrameError>
    where
        R: Read + ?Sized,
    {
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; READ_CHUNK_BYTES];
        loop {
            let bytes_read = read_chunk_with_retry(reader, &mut chunk)?;
            if bytes_read == 0 {
                return Err(FrameError::UnexpectedEof { partial: buffer });
            }
            let received = chunk.get(..bytes_read).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "reader reported more bytes than the buffer holds",
                )
            })?;

            if let Some(end) = received.iter().position(|byte| *byte == TERMINATOR) {
                let (body, _discarded) = received.split_at(end);
                buffer.extend_from_slice(body);
                self.enforce_limit(buffer.len())?;
                return Ok(buffer);
            }

            buffer.extend_from_slice(received);
            self.enforce_limit(buffer.len())?;
        }
    }

    fn enforce_limit(&self, size: usize) -> Result<(), FrameError> {
        if size > self.max_bytes {
            return Err(FrameError::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

fn read_chunk_with_retry<R>(reader: &mut R, chunk: &mut [u8]) -> io::Result<usize>
where
    R: Read + ?Sized,
{
    loop {
        match reader.read(chunk) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
}

/// A validated payload and the key that covers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    payload: Text,
    key: Text,
}

impl Request {
    /// Pairs a payload with its key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyTooShort`] when the key has fewer symbols than the payload.
    pub fn new(payload: Text, key: Text) -> Result<Self, KeyTooShort> {
        if key.len() < payload.len() {
            return Err(KeyTooShort {
                payload_len: payload.len(),
                key_len: key.len(),
            });
        }
        Ok(Self { payload, key })
    }

    /// Parses a request body received by [`FrameReader::read_frame`].
    ///
    /// # Errors
    ///
    /// Fails when the separator is missing, either section leaves the
    /// alphabet, or the key is shorter than the payload.
    pub fn decode(frame: &[u8]) -> Result<Self, FrameError> {
        let mut sections = frame.splitn(2, |byte| *byte == SEPARATOR);
        let payload_bytes = sections.next().unwrap_or_default();
        let key_bytes = sections.next().ok_or(FrameError::MissingSeparator)?;
        let payload = Text::parse(payload_bytes).map_err(|source| FrameError::Alphabet {
            section: Section::Payload,
            source,
        })?;
        let key = Text::parse(key_bytes).map_err(|source| FrameError::Alphabet {
            section: Section::Key,
            source,
        })?;
        Self::new(payload, key).map_err(FrameError::from)
    }

    /// Size of the encoded body, the unit a [`FrameReader`] limit applies to.
    ///
    /// The key is cut to the payload length, so this is `2 * len + 1`.
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.payload.len().saturating_mul(2).saturating_add(1)
    }

    /// Wire bytes for the request, with the key cut to the payload length.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.body_len().saturating_add(1));
        frame.extend(self.payload.symbols().iter().map(|symbol| symbol.to_byte()));
        frame.push(SEPARATOR);
        frame.extend(
            self.key
                .symbols()
                .iter()
                .take(self.payload.len())
                .map(|symbol| symbol.to_byte()),
        );
        frame.push(TERMINATOR);
        frame
    }

    /// The data to transform.
    #[must_use]
    pub const fn payload(&self) -> &Text {
        &self.payload
    }

    /// The pad; at least as long as the payload.
    #[must_use]
    pub const fn key(&self) -> &Text {
        &self.key
    }

    /// Applies the key to the payload in the given direction.
    ///
    /// # Errors
    ///
    /// Returns [`KeyTooShort`] only if the key no longer covers the payload,
    /// which construction through [`Request::new`] rules out.
    pub fn apply(&self, direction: Direction) -> Result<Text, KeyTooShort> {
        transform(&self.payload, &self.key, direction)
    }
}

/// Wire bytes for a payload-only response.
#[must_use]
pub fn encode_response(payload: &Text) -> Vec<u8> {
    let mut frame = payload.to_bytes();
    frame.push(TERMINATOR);
    frame
}

/// Parses a response body received by [`FrameReader::read_frame`].
///
/// # Errors
///
/// Returns [`FrameError::Alphabet`] when the body leaves the alphabet.
pub fn decode_response(frame: &[u8]) -> Result<Text, FrameError> {
    Text::parse(frame).map_err(|source| FrameError::Alphabet {
        section: Section::Payload,
        source,
    })
}

/// Writes a complete frame and flushes the writer.
///
/// # Errors
///
/// Propagates any write or flush failure.
pub fn write_frame<W>(writer: &mut W, frame: &[u8]) -> io::Result<()>
where
    W: Write + ?Sized,
{
    writer.write_all(frame)?;
    writer.flush()
}
