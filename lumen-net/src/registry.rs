//! Live session registry.
//!
//! Owns every admitted session behind one lock. The network thread runs
//! [`SessionRegistry::run`], servicing one readable session per iteration;
//! the render thread calls [`SessionRegistry::fill_channels`] on its own
//! cadence. Socket reads and writes always happen with the lock released.

use std::net::TcpStream;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use log::{info, warn};

use lumen_types::{now_micros, Channel, Light};

use crate::arbitration;
use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::dispatch;
use crate::error::{SessionError, SessionResult};
use crate::framing::Message;
use crate::poll;
use crate::protocol::{self, FULL_REPLY};
use crate::session::{ClientState, Session, SessionId};

/// Bytes read from a socket per service call.
const READ_CHUNK: usize = 4096;

/// Registry of connected clients.
pub struct SessionRegistry<C: Connection = TcpStream> {
    /// The configured lights; each session starts from a clone.
    lights: Vec<Light>,
    capacity: usize,
    poll_timeout: Duration,
    next_id: AtomicU64,
    /// Live sessions in admission order.
    sessions: Mutex<Vec<Session<C>>>,
}

impl<C: Connection> SessionRegistry<C> {
    pub fn new(lights: Vec<Light>) -> Self {
        Self::with_config(lights, &ServerConfig::default())
    }

    pub fn with_config(lights: Vec<Light>, config: &ServerConfig) -> Self {
        Self {
            lights,
            capacity: config.max_sessions(),
            poll_timeout: config.poll_timeout(),
            next_id: AtomicU64::new(0),
            sessions: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Session<C>>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    pub fn session_count(&self) -> usize {
        self.lock().len()
    }

    /// Ids of live sessions in admission order.
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.lock().iter().map(|s| s.id()).collect()
    }

    /// Snapshot of one session's protocol state.
    pub fn client_state(&self, id: SessionId) -> Option<ClientState> {
        self.lock()
            .iter()
            .find(|s| s.id() == id)
            .map(|s| s.state().clone())
    }

    /// Admit a newly accepted connection.
    ///
    /// At capacity the connection gets a single `full` line and is closed
    /// without ever entering the registry.
    pub fn admit(&self, conn: C) -> Option<SessionId> {
        let id = SessionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let session = Session::new(id, conn, self.lights.clone());

        let mut sessions = self.lock();
        if sessions.len() >= self.capacity {
            drop(sessions);
            warn!(
                "number of sessions reached maximum {}, rejecting {}",
                self.capacity,
                session.peer()
            );
            let conn = session.conn();
            if let Err(e) = conn.write_all(FULL_REPLY.as_bytes()) {
                warn!("{}: {}", session.peer(), e);
            }
            conn.close();
            return None;
        }

        info!("{} connected as session {}", session.peer(), id);
        sessions.push(session);
        Some(id)
    }

    /// Wait up to `timeout` for a session to become readable.
    ///
    /// When several are ready, the earliest admitted one is returned. With
    /// no sessions this just sleeps for `timeout`.
    pub fn poll_readable(&self, timeout: Duration) -> Option<SessionId> {
        let targets: Vec<(SessionId, RawFd)> = self
            .lock()
            .iter()
            .map(|s| (s.id(), s.conn().as_raw_fd()))
            .collect();

        if targets.is_empty() {
            thread::sleep(timeout);
            return None;
        }

        let fds: Vec<RawFd> = targets.iter().map(|(_, fd)| *fd).collect();
        match poll::first_readable(&fds, timeout) {
            Ok(ready) => ready.map(|i| targets[i].0),
            Err(e) => {
                warn!("poll() {}", e);
                thread::sleep(timeout);
                None
            }
        }
    }

    /// Remove a session and close its connection. Returns false if it was
    /// already gone.
    pub fn remove(&self, id: SessionId) -> bool {
        let removed = {
            let mut sessions = self.lock();
            sessions
                .iter()
                .position(|s| s.id() == id)
                .map(|i| sessions.remove(i))
        };

        match removed {
            Some(session) => {
                info!("removing {}", session.peer());
                session.conn().close();
                true
            }
            None => false,
        }
    }

    /// Read from a ready session and run every complete message.
    pub fn service(&self, id: SessionId) -> SessionResult {
        let Some((conn, peer)) = self.lock().iter().find(|s| s.id() == id).map(|s| {
            (Arc::clone(s.conn()), s.peer().to_string())
        }) else {
            return Ok(());
        };

        let mut buf = [0u8; READ_CHUNK];
        let n = conn.read(&mut buf)?;
        if n == 0 {
            return Err(SessionError::Closed);
        }
        let arrived = now_micros();

        let messages: Vec<Message> = {
            let mut sessions = self.lock();
            let Some(session) = sessions.iter_mut().find(|s| s.id() == id) else {
                return Ok(());
            };
            session.queue.feed(&buf[..n], arrived)?;
            std::iter::from_fn(|| session.queue.pop()).collect()
        };

        for message in messages {
            let command = protocol::parse(&message.text)?;
            let reply = {
                let mut sessions = self.lock();
                let Some(session) = sessions.iter_mut().find(|s| s.id() == id) else {
                    return Ok(());
                };
                dispatch::execute(&mut session.state, command, message.time, &peer)?
            };
            if let Some(reply) = reply {
                conn.write_all(reply.as_bytes())?;
            }
        }
        Ok(())
    }

    /// One loop iteration: poll, then service the ready session. A session
    /// that fails in any way is removed. Returns whether a session was
    /// serviced.
    pub fn service_one(&self, timeout: Duration) -> bool {
        let Some(id) = self.poll_readable(timeout) else {
            return false;
        };

        if let Err(e) = self.service(id) {
            let peer = self
                .lock()
                .iter()
                .find(|s| s.id() == id)
                .map(|s| s.peer().to_string())
                .unwrap_or_else(|| id.to_string());
            match &e {
                SessionError::Protocol(err) => warn!("{} sent gibberish: {}", peer, err),
                SessionError::Closed => info!("{} disconnected", peer),
                other => warn!("{}: {}", peer, other),
            }
            self.remove(id);
        }
        true
    }

    /// Service sessions until `stop` is set, then drain them all.
    pub fn run(&self, stop: &AtomicBool) {
        info!("starting session loop");
        while !stop.load(Ordering::Relaxed) {
            self.service_one(self.poll_timeout);
        }
        info!("stopping session loop");
        self.shutdown();
    }

    /// Remove every session, oldest first.
    pub fn shutdown(&self) {
        loop {
            let first = self.lock().first().map(|s| s.id());
            match first {
                Some(id) => {
                    self.remove(id);
                }
                None => break,
            }
        }
    }

    /// Arbitrate every channel for render time `time`.
    ///
    /// Holds the registry lock for the whole pass, so no client update is
    /// seen half-applied.
    pub fn fill_channels(&self, channels: &mut [Channel], time: i64) {
        let sessions = self.lock();
        arbitration::fill_channels(
            &self.lights,
            sessions.iter().map(|s| s.state()),
            channels,
            time,
        );
    }
}
