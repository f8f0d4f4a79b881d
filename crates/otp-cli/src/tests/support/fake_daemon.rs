//! Fake daemon for client tests.
//!
//! Accepts a single connection, announces a canned token, records whatever
//! the client sends up to the terminator and answers with canned bytes.

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};

use otp_protocol::TERMINATOR;

const ACCEPT_DEADLINE: Duration = Duration::from_secs(2);
const READ_TIMEOUT: Duration = Duration::from_secs(2);

pub(in crate::tests) struct FakeDaemon {
    port: u16,
    received: Arc<Mutex<Option<Vec<u8>>>>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl FakeDaemon {
    /// Spawns a fake daemon on an ephemeral loopback port.
    pub(in crate::tests) fn spawn(token: &[u8], response: &[u8]) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake daemon")?;
        listener
            .set_nonblocking(true)
            .context("fake daemon nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let received = Arc::new(Mutex::new(None));
        let received_clone = Arc::clone(&received);
        let token = token.to_vec();
        let response = response.to_vec();
        let handle = thread::spawn(move || {
            Self::serve_client(&listener, &token, &response, &received_clone)
        });
        Ok(Self {
            port,
            received,
            handle: Some(handle),
        })
    }

    pub(in crate::tests) fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the daemon thread and returns the bytes the client sent.
    ///
    /// `None` means no client connected before the accept deadline.
    pub(in crate::tests) fn take_received(&mut self) -> Result<Option<Vec<u8>>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake daemon thread panicked"))?
                .context("fake daemon failed")?;
        }
        let received = self
            .received
            .lock()
            .map_err(|error| anyhow!("lock received bytes: {error}"))?;
        Ok(received.clone())
    }

    fn serve_client(
        listener: &TcpListener,
        token: &[u8],
        response: &[u8],
        received: &Mutex<Option<Vec<u8>>>,
    ) -> Result<()> {
        let deadline = Instant::now() + ACCEPT_DEADLINE;
        loop {
            match listener.accept() {
                Ok((stream, _)) => return Self::converse(stream, token, response, received),
                Err(ref error)
                    if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline =>
                {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(error) => return Err(error).context("accept connection"),
            }
        }
    }

    fn converse(
        mut stream: TcpStream,
        token: &[u8],
        response: &[u8],
        received: &Mutex<Option<Vec<u8>>>,
    ) -> Result<()> {
        stream
            .set_nonblocking(false)
            .context("blocking client stream")?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .context("set read timeout")?;
        stream.write_all(token).context("write token")?;

        let request = read_request(&mut stream)?;
        let answered = !request.is_empty();
        *received
            .lock()
            .map_err(|error| anyhow!("lock received bytes: {error}"))? = Some(request);

        if answered {
            stream.write_all(response).context("write response")?;
        }
        Ok(())
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Reads until the terminator or until the client hangs up.
fn read_request(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut request = Vec::new();
    let mut byte = [0_u8; 1];
    loop {
        match stream.read(&mut byte) {
            Ok(0) => return Ok(request),
            Ok(_) => {
                request.push(byte[0]);
                if byte[0] == TERMINATOR {
                    return Ok(request);
                }
            }
            Err(error) if error.kind() == io::ErrorKind::ConnectionReset => return Ok(request),
            Err(error) => return Err(error).context("read request"),
        }
    }
}
