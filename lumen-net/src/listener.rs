//! TCP accept loop feeding the session registry.

use std::io;
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{error, info, warn};

use crate::config::ServerConfig;
use crate::registry::SessionRegistry;

/// How often a quiet listener re-checks the stop flag.
const ACCEPT_IDLE: Duration = Duration::from_millis(10);

/// Bind a non-blocking listener on the configured address.
pub fn bind(config: &ServerConfig) -> io::Result<TcpListener> {
    let listener = TcpListener::bind(config.listen_addr())?;
    listener.set_nonblocking(true)?;
    info!("listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accept pending connections into `registry`. Returns how many were
/// accepted (including ones the registry turned away).
pub fn accept_pending(listener: &TcpListener, registry: &SessionRegistry<TcpStream>) -> usize {
    let mut accepted = 0;
    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                accepted += 1;
                info!("client connecting from {}", addr);
                if let Err(e) = prepare(&stream) {
                    warn!("{}: {}", addr, e);
                    continue;
                }
                registry.admit(stream);
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) => {
                error!("accept error: {}", e);
                break;
            }
        }
    }
    accepted
}

/// Accept connections until `stop` is set.
///
/// `listener` must be non-blocking (see [`bind`]).
pub fn accept_loop(listener: &TcpListener, registry: &SessionRegistry<TcpStream>, stop: &AtomicBool) {
    while !stop.load(Ordering::Relaxed) {
        if accept_pending(listener, registry) == 0 {
            thread::sleep(ACCEPT_IDLE);
        }
    }
}

fn prepare(stream: &TcpStream) -> io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_nodelay(true)
}
