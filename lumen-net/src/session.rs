//! Per-client session state.

use std::sync::Arc;

use lumen_types::{Light, LightIndex};

use crate::connection::Connection;
use crate::framing::MessageQueue;

/// Priority of a client that has not negotiated one.
pub const PRIORITY_UNSET: i32 = 255;

/// Numerically lowest priority; it outranks every other client.
pub const PRIORITY_MIN: i32 = 0;

/// `handshake_time` of a client that has not said hello.
pub const NO_HANDSHAKE: i64 = -1;

/// Unique identifier for a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl SessionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The part of a session that protocol commands write and arbitration reads.
#[derive(Debug, Clone)]
pub struct ClientState {
    priority: i32,
    handshake_time: i64,
    /// Private copy of the configured lights.
    lights: Vec<Light>,
}

impl ClientState {
    pub fn new(lights: Vec<Light>) -> Self {
        Self {
            priority: PRIORITY_UNSET,
            handshake_time: NO_HANDSHAKE,
            lights,
        }
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Set the priority, clamped to 0..=255. 255 withdraws the client.
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority.clamp(PRIORITY_MIN, PRIORITY_UNSET);
    }

    pub fn handshake_time(&self) -> i64 {
        self.handshake_time
    }

    pub fn set_handshake_time(&mut self, time: i64) {
        self.handshake_time = time;
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn light(&self, index: LightIndex) -> Option<&Light> {
        self.lights.get(index)
    }

    /// Exact-match lookup by light name.
    pub fn light_by_name_mut(&mut self, name: &str) -> Option<&mut Light> {
        self.lights.iter_mut().find(|l| l.name() == name)
    }

    /// Whether this client may drive `light` at all.
    pub fn is_candidate_for(&self, light: LightIndex) -> bool {
        self.priority != PRIORITY_UNSET
            && self.handshake_time != NO_HANDSHAKE
            && self.lights.get(light).is_some_and(|l| l.is_used())
    }
}

/// One connected client: its socket, inbound buffer and protocol state.
pub struct Session<C: Connection> {
    id: SessionId,
    conn: Arc<C>,
    /// `address:port`, captured at admission for logging.
    peer: String,
    pub(crate) queue: MessageQueue,
    pub(crate) state: ClientState,
}

impl<C: Connection> Session<C> {
    pub fn new(id: SessionId, conn: C, lights: Vec<Light>) -> Self {
        let peer = format!("{}:{}", conn.address(), conn.port());
        Self {
            id,
            conn: Arc::new(conn),
            peer,
            queue: MessageQueue::new(),
            state: ClientState::new(lights),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub(crate) fn conn(&self) -> &Arc<C> {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_types::ScanRange;

    fn lights() -> Vec<Light> {
        vec![
            Light::new("kitchen", ScanRange::default(), ScanRange::default()),
            Light::new("hall", ScanRange::default(), ScanRange::default()),
        ]
    }

    #[test]
    fn new_client_is_not_a_candidate() {
        let state = ClientState::new(lights());
        assert_eq!(state.priority(), PRIORITY_UNSET);
        assert_eq!(state.handshake_time(), NO_HANDSHAKE);
        assert!(!state.is_candidate_for(0));
    }

    #[test]
    fn candidate_needs_priority_handshake_and_use() {
        let mut state = ClientState::new(lights());
        state.set_priority(10);
        assert!(!state.is_candidate_for(0));
        state.set_handshake_time(42);
        assert!(state.is_candidate_for(0));

        state.light_by_name_mut("kitchen").unwrap().set_use(false);
        assert!(!state.is_candidate_for(0));
        assert!(state.is_candidate_for(1));
        // Out of range light
        assert!(!state.is_candidate_for(2));
    }

    #[test]
    fn priority_is_clamped() {
        let mut state = ClientState::new(lights());
        state.set_priority(-4);
        assert_eq!(state.priority(), 0);
        state.set_priority(1000);
        assert_eq!(state.priority(), PRIORITY_UNSET);
    }

    #[test]
    fn light_lookup_is_exact() {
        let mut state = ClientState::new(lights());
        assert!(state.light_by_name_mut("kitchen").is_some());
        assert!(state.light_by_name_mut("Kitchen").is_none());
        assert!(state.light_by_name_mut("kit").is_none());
    }
}
