//! Wire protocol shared by the pad client and daemons.
//!
//! The crate holds everything both ends must agree on:
//!
//! - [`alphabet`]: the 27-symbol alphabet (`A`–`Z` plus space) and validated
//!   [`Text`].
//! - [`cipher`]: the modular substitution applied symbol by symbol.
//! - [`framing`]: the `payload '#' key '@'` request and `payload '@'`
//!   response encodings, and a bounded reader that reassembles them from
//!   fragmented socket reads.
//! - [`handshake`]: the six-byte token a daemon sends on accept so clients
//!   can refuse to talk to the wrong service.
//!
//! Nothing here performs network I/O on its own; functions accept any
//! [`std::io::Read`] or [`std::io::Write`] so they can be driven by sockets in
//! production and by in-memory buffers in tests.

pub mod alphabet;
pub mod cipher;
pub mod framing;
pub mod handshake;

pub use alphabet::{AlphabetError, SYMBOL_COUNT, Symbol, Text};
pub use cipher::{Direction, KeyTooShort, transform, transform_symbol};
pub use framing::{
    DEFAULT_MAX_MESSAGE_BYTES, FrameError, FrameReader, Request, SEPARATOR, Section, TERMINATOR,
    decode_response, encode_response, write_frame,
};
pub use handshake::{
    HandshakeError, ServiceKind, TOKEN_LEN, Token, read_token, verify, write_token,
};
