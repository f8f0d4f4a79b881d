//! Per-connection cipher exchange.
//!
//! Every accepted connection walks the same states: the daemon announces its
//! token (handshake), reads one framed request (receiving), applies the cipher
//! (processing), writes the framed result (responding) and closes. A failure
//! in any state ends that connection only.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

use strum::Display;
use thiserror::Error;
use tracing::{debug, warn};

use otp_protocol::{
    FrameError, FrameReader, Request, ServiceKind, encode_response, write_frame, write_token,
};

use crate::transport::ConnectionHandler;

const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");

/// Stage of a connection at which an exchange stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionState {
    /// Sending the service token.
    Handshake,
    /// Accumulating the request frame.
    Receiving,
    /// Validating and transforming the request.
    Processing,
    /// Writing the response frame.
    Responding,
}

/// Reasons a single exchange ended without a response being delivered.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The token could not be written.
    #[error("failed to send handshake token: {source}")]
    Handshake {
        /// Underlying transport error.
        #[source]
        source: io::Error,
    },
    /// The request never arrived intact.
    #[error("failed to receive request: {source}")]
    Receive {
        /// Framing failure.
        #[source]
        source: FrameError,
    },
    /// The request arrived but is not acceptable.
    #[error("rejected malformed request: {source}")]
    Malformed {
        /// Validation failure.
        #[source]
        source: FrameError,
    },
    /// The response could not be written.
    #[error("failed to send response: {source}")]
    Respond {
        /// Underlying transport error.
        #[source]
        source: io::Error,
    },
}

impl ConnectionError {
    /// State the exchange was in when it failed.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        match self {
            Self::Handshake { .. } => ConnectionState::Handshake,
            Self::Receive { .. } => ConnectionState::Receiving,
            Self::Malformed { .. } => ConnectionState::Processing,
            Self::Respond { .. } => ConnectionState::Responding,
        }
    }

    /// Whether the peer simply hung up without sending anything.
    ///
    /// Clients that reject the handshake do exactly this.
    #[must_use]
    pub fn is_silent_disconnect(&self) -> bool {
        matches!(
            self,
            Self::Receive {
                source: FrameError::UnexpectedEof { partial },
            } if partial.is_empty()
        )
    }
}

/// Serves cipher requests for one [`ServiceKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherService {
    kind: ServiceKind,
    reader: FrameReader,
}

impl CipherService {
    /// Builds a service announcing `kind` and bounding requests with `reader`.
    #[must_use]
    pub const fn new(kind: ServiceKind, reader: FrameReader) -> Self {
        Self { kind, reader }
    }

    /// Service this instance provides.
    #[must_use]
    pub const fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// Runs one complete exchange over `stream`.
    ///
    /// Returns the number of payload symbols transformed.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] naming the state that failed. No
    /// response is written after a receiving or processing failure.
    pub fn serve<S>(&self, stream: &mut S) -> Result<usize, ConnectionError>
    where
        S: Read + Write,
    {
        write_token(stream, self.kind).map_err(|source| ConnectionError::Handshake { source })?;

        let frame = self
            .reader
            .read_frame(stream)
            .map_err(|source| ConnectionError::Receive { source })?;

        let request =
            Request::decode(&frame).map_err(|source| ConnectionError::Malformed { source })?;
        let output = request
            .apply(self.kind.direction())
            .map_err(|source| ConnectionError::Malformed {
                source: source.into(),
            })?;

        write_frame(stream, &encode_response(&output))
            .map_err(|source| ConnectionError::Respond { source })?;
        Ok(output.len())
    }
}

impl ConnectionHandler for CipherService {
    fn handle(&self, mut stream: TcpStream, peer: SocketAddr) {
        match self.serve(&mut stream) {
            Ok(symbols) => debug!(
                target: SERVICE_TARGET,
                peer = %peer,
                service = %self.kind,
                symbols,
                "request served"
            ),
            Err(error) if error.is_silent_disconnect() => debug!(
                target: SERVICE_TARGET,
                peer = %peer,
                service = %self.kind,
                "client disconnected after handshake"
            ),
            Err(error) => warn!(
                target: SERVICE_TARGET,
                peer = %peer,
                service = %self.kind,
                state = %error.state(),
                error = %error,
                "connection closed without a response"
            ),
        }
        if let Err(error) = stream.shutdown(Shutdown::Both)
            && error.kind() != io::ErrorKind::NotConnected
        {
            debug!(
                target: SERVICE_TARGET,
                peer = %peer,
                error = %error,
                "socket shutdown failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use rstest::{fixture, rstest};

    /// In-memory peer: scripted input delivered in fixed-size pieces, output
    /// captured for inspection.
    struct ScriptedPeer {
        input: Cursor<Vec<u8>>,
        step: usize,
        output: Vec<u8>,
    }

    impl ScriptedPeer {
        fn new(input: &[u8], step: usize) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                step,
                output: Vec::new(),
            }
        }
    }

    impl Read for ScriptedPeer {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let limit = buf.len().min(self.step);
            match buf.get_mut(..limit) {
                Some(window) => self.input.read(window),
                None => Ok(0),
            }
        }
    }

    impl Write for ScriptedPeer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[fixture]
    fn decoder() -> CipherService {
        CipherService::new(ServiceKind::Decode, FrameReader::default())
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(1024)]
    fn decodes_fragmented_requests(decoder: CipherService, #[case] step: usize) {
        let mut peer = ScriptedPeer::new(b"DQNVZ#XMCKL@", step);
        let symbols = decoder.serve(&mut peer).expect("exchange succeeds");
        assert_eq!(symbols, 5);
        assert_eq!(peer.output, b"DECODEHELLO@");
    }

    #[test]
    fn encoder_applies_the_forward_transform() {
        let encoder = CipherService::new(ServiceKind::Encode, FrameReader::default());
        let mut peer = ScriptedPeer::new(b"HELLO#XMCKL@", 4);
        encoder.serve(&mut peer).expect("exchange succeeds");
        assert_eq!(peer.output, b"ENCODEDQNVZ@");
    }

    #[rstest]
    fn bytes_after_the_terminator_are_ignored(decoder: CipherService) {
        let mut peer = ScriptedPeer::new(b"A#A@TRAILING", 64);
        decoder.serve(&mut peer).expect("exchange succeeds");
        assert_eq!(peer.output, b"DECODEA@");
    }

    #[rstest]
    #[case::bad_payload(b"HELLO!#XMCKLQ@".as_slice())]
    #[case::bad_key(b"HELLO#xmckl@".as_slice())]
    #[case::missing_separator(b"HELLO@".as_slice())]
    #[case::short_key(b"HELLO#XM@".as_slice())]
    fn malformed_requests_get_no_response(decoder: CipherService, #[case] input: &[u8]) {
        let mut peer = ScriptedPeer::new(input, 1024);
        let error = decoder.serve(&mut peer).expect_err("request is rejected");
        assert_eq!(error.state(), ConnectionState::Processing);
        assert_eq!(peer.output, b"DECODE", "only the token should be written");
    }

    #[rstest]
    fn truncated_requests_fail_while_receiving(decoder: CipherService) {
        let mut peer = ScriptedPeer::new(b"HELLO#XM", 2);
        let error = decoder.serve(&mut peer).expect_err("request is truncated");
        assert_eq!(error.state(), ConnectionState::Receiving);
        assert!(!error.is_silent_disconnect());
    }

    #[rstest]
    fn hang_up_after_handshake_is_silent(decoder: CipherService) {
        let mut peer = ScriptedPeer::new(b"", 1);
        let error = decoder.serve(&mut peer).expect_err("nothing was sent");
        assert!(error.is_silent_disconnect());
    }

    #[test]
    fn oversize_requests_are_rejected() {
        let service = CipherService::new(ServiceKind::Decode, FrameReader::new(8));
        let mut peer = ScriptedPeer::new(b"HELLO#XMCKL@", 1024);
        let error = service.serve(&mut peer).expect_err("request is too large");
        assert!(matches!(
            error,
            ConnectionError::Receive {
                source: FrameError::TooLarge { limit: 8 }
            }
        ));
    }
}
