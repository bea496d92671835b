//! Session and arbitration core for the lumen lighting daemon.
//!
//! Clients connect over TCP, speak a line-based text protocol, and ask for
//! colors on named lights. The [`SessionRegistry`] services their sockets
//! from one thread while the render side calls
//! [`SessionRegistry::fill_channels`] to learn, per output channel, which
//! client currently drives it.

pub mod arbitration;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod framing;
pub mod listener;
pub mod poll;
pub mod protocol;
pub mod registry;
pub mod session;

pub use config::ServerConfig;
pub use connection::Connection;
pub use error::{FramingError, ProtocolError, SessionError};
pub use protocol::{Command, LightProperty, PROTOCOL_VERSION};
pub use registry::SessionRegistry;
pub use session::{ClientState, SessionId};
