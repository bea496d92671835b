#![allow(dead_code)]
//! Test harness utilities for lumen-net integration tests.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use lumen_net::listener;
use lumen_net::{ServerConfig, SessionRegistry};
use lumen_types::{Light, ScanRange};

/// The light set every test server starts with.
pub fn test_lights() -> Vec<Light> {
    vec![
        Light::new("kitchen", ScanRange::new(0.0, 100.0), ScanRange::new(0.0, 50.0)),
        Light::new("hall", ScanRange::new(0.0, 100.0), ScanRange::new(50.0, 100.0)),
    ]
}

/// A registry served by real accept and session threads on a loopback port.
pub struct TestServer {
    pub registry: Arc<SessionRegistry>,
    pub addr: String,
    stop: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl TestServer {
    pub fn start() -> Self {
        Self::start_with_capacity(16)
    }

    pub fn start_with_capacity(max_sessions: usize) -> Self {
        let config = ServerConfig::default()
            .with_max_sessions(max_sessions)
            .with_poll_timeout(Duration::from_millis(10));
        let registry = Arc::new(SessionRegistry::with_config(test_lights(), &config));

        let tcp = TcpListener::bind("127.0.0.1:0").unwrap();
        tcp.set_nonblocking(true).unwrap();
        let addr = tcp.local_addr().unwrap().to_string();
        let stop = Arc::new(AtomicBool::new(false));

        let accept = {
            let registry = Arc::clone(&registry);
            let stop = Arc::clone(&stop);
            thread::spawn(move || listener::accept_loop(&tcp, &registry, &stop))
        };
        let sessions = {
            let registry = Arc::clone(&registry);
            let stop = Arc::clone(&stop);
            thread::spawn(move || registry.run(&stop))
        };

        Self {
            registry,
            addr,
            stop,
            threads: vec![accept, sessions],
        }
    }

    pub fn connect(&self) -> RawClient {
        RawClient::connect(&self.addr).unwrap()
    }

    /// Connect and wait until the registry has admitted the client.
    pub fn connect_admitted(&self) -> RawClient {
        let expected = self.registry.session_count() + 1;
        let client = self.connect();
        wait_for_sessions(&self.registry, expected, Duration::from_secs(2));
        client
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        for handle in self.threads.drain(..) {
            handle.join().unwrap();
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wait until the registry holds exactly `expected` sessions, or panic.
pub fn wait_for_sessions(registry: &SessionRegistry, expected: usize, timeout: Duration) {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if registry.session_count() == expected {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!(
        "Timed out waiting for {} sessions (have {})",
        expected,
        registry.session_count()
    );
}

/// A raw TCP client speaking the line protocol.
pub struct RawClient {
    pub reader: BufReader<TcpStream>,
    pub writer: TcpStream,
}

impl RawClient {
    pub fn connect(addr: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(Some(Duration::from_secs(5)))?;
        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: stream,
        })
    }

    /// Send one protocol line (the newline is added).
    pub fn send(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    /// Receive one reply line, without its newline.
    pub fn recv(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "server closed"));
        }
        Ok(line.trim_end_matches('\n').to_string())
    }

    /// Round-trip a ping so every earlier command has been applied.
    pub fn sync(&mut self) {
        self.send("ping").unwrap();
        assert_eq!(self.recv().unwrap(), "ping");
    }

    /// Say hello and wait for the reply.
    pub fn hello(&mut self) {
        self.send("hello").unwrap();
        assert_eq!(self.recv().unwrap(), "hello");
    }

    /// Read until the server closes, returning anything it sent first.
    pub fn read_until_closed(&mut self) -> Vec<u8> {
        let mut rest = Vec::new();
        match self.reader.read_to_end(&mut rest) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::ConnectionReset => {}
            Err(e) => panic!("expected the server to close the connection, got {}", e),
        }
        rest
    }
}
