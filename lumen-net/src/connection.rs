//! Byte-stream handles for connected clients.
//!
//! The registry reads and writes through shared references so the I/O
//! thread never needs the session lock while it blocks on a socket.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixStream;

/// A connected client socket.
pub trait Connection: AsRawFd + Send + Sync {
    /// Read whatever is available. `Ok(0)` means the peer closed.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    fn write_all(&self, data: &[u8]) -> io::Result<()>;

    /// Peer address, for logging.
    fn address(&self) -> String;

    fn port(&self) -> u16;

    fn close(&self);
}

impl Connection for TcpStream {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut stream: &TcpStream = self;
        Read::read(&mut stream, buf)
    }

    fn write_all(&self, data: &[u8]) -> io::Result<()> {
        let mut stream: &TcpStream = self;
        Write::write_all(&mut stream, data)?;
        Write::flush(&mut stream)
    }

    fn address(&self) -> String {
        self.peer_addr()
            .map(|a| a.ip().to_string())
            .unwrap_or_else(|_| "unknown".into())
    }

    fn port(&self) -> u16 {
        self.peer_addr().map(|a| a.port()).unwrap_or(0)
    }

    fn close(&self) {
        let _ = self.shutdown(Shutdown::Both);
    }
}

impl Connection for UnixStream {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut stream: &UnixStream = self;
        Read::read(&mut stream, buf)
    }

    fn write_all(&self, data: &[u8]) -> io::Result<()> {
        let mut stream: &UnixStream = self;
        Write::write_all(&mut stream, data)?;
        Write::flush(&mut stream)
    }

    fn address(&self) -> String {
        "local".into()
    }

    fn port(&self) -> u16 {
        0
    }

    fn close(&self) {
        let _ = self.shutdown(Shutdown::Both);
    }
}
