//! One request/response round trip with a daemon.

use std::io::{Read, Write};

use otp_protocol::{
    FrameReader, Request, ServiceKind, Text, decode_response, read_token, verify, write_frame,
};

use crate::AppError;

/// What the client expects of the daemon it talks to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Exchange {
    pub(crate) service: ServiceKind,
    pub(crate) port: u16,
    pub(crate) reader: FrameReader,
}

impl Exchange {
    /// Checks the daemon's token, then sends `request` and returns the reply.
    ///
    /// Nothing is written to the stream unless the token matches.
    pub(crate) fn run<S>(&self, stream: &mut S, request: &Request) -> Result<Text, AppError>
    where
        S: Read + Write,
    {
        let token = read_token(stream).map_err(AppError::ReadHandshake)?;
        verify(self.service, &token).map_err(|source| AppError::WrongDaemon {
            port: self.port,
            source,
        })?;

        write_frame(stream, &request.encode()).map_err(AppError::SendRequest)?;

        let frame = self
            .reader
            .read_frame(stream)
            .map_err(AppError::ReadResponse)?;
        decode_response(&frame).map_err(AppError::InvalidResponse)
    }
}
