//! Minimal raw client used to drive a daemon over loopback.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use otp_protocol::TOKEN_LEN;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything a client observed on one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Exchange {
    pub(crate) token: Vec<u8>,
    pub(crate) response: Vec<u8>,
}

fn connect(address: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(address).expect("connect to daemon");
    stream
        .set_read_timeout(Some(READ_TIMEOUT))
        .expect("set read timeout");
    stream
}

fn read_token(stream: &mut TcpStream) -> Vec<u8> {
    let mut token = vec![0_u8; TOKEN_LEN];
    stream.read_exact(&mut token).expect("read handshake token");
    token
}

fn finish(mut stream: TcpStream, token: Vec<u8>) -> Exchange {
    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .expect("read response until the daemon closes");
    Exchange { token, response }
}

/// Reads the token, sends `request` in one write and collects the reply.
pub(crate) fn exchange(address: SocketAddr, request: &[u8]) -> Exchange {
    let mut stream = connect(address);
    let token = read_token(&mut stream);
    stream.write_all(request).expect("send request");
    finish(stream, token)
}

/// As [`exchange`], but writes `request` in `piece`-byte segments with a
/// pause between them.
pub(crate) fn exchange_in_pieces(address: SocketAddr, request: &[u8], piece: usize) -> Exchange {
    let mut stream = connect(address);
    stream.set_nodelay(true).expect("disable nagle");
    let token = read_token(&mut stream);
    for segment in request.chunks(piece) {
        stream.write_all(segment).expect("send request segment");
        thread::sleep(Duration::from_millis(5));
    }
    finish(stream, token)
}

/// Reads the token and hangs up without sending a request.
pub(crate) fn hang_up_after_handshake(address: SocketAddr) -> Vec<u8> {
    let mut stream = connect(address);
    let token = read_token(&mut stream);
    stream
        .shutdown(Shutdown::Both)
        .expect("close client socket");
    token
}
