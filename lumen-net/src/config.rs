use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    server: ServerSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ServerSection {
    address: Option<String>,
    port: Option<u16>,
    max_sessions: Option<usize>,
    poll_timeout_ms: Option<u64>,
}

/// Process-wide server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    server: ServerSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");
        Self {
            server: base.server,
        }
    }
}

impl ServerConfig {
    /// Embedded defaults overlaid with the user's config file, if any.
    pub fn load() -> Self {
        match user_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::default(),
        }
    }

    /// Embedded defaults overlaid with `path`. A missing or malformed file
    /// is logged and ignored.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Self::default();
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                Ok(user) => merge_server(&mut config.server, user.server),
                Err(e) => {
                    log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                }
            },
            Err(e) => {
                log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
            }
        }
        config
    }

    /// Embedded defaults overlaid with the TOML in `contents`.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let user: ConfigFile = toml::from_str(contents)?;
        let mut config = Self::default();
        merge_server(&mut config.server, user.server);
        Ok(config)
    }

    pub fn address(&self) -> &str {
        self.server.address.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn port(&self) -> u16 {
        self.server.port.unwrap_or(19333)
    }

    /// `address:port`, ready for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address(), self.port())
    }

    /// Live session cap (at least 1).
    pub fn max_sessions(&self) -> usize {
        self.server.max_sessions.unwrap_or(1024).max(1)
    }

    /// Session loop poll timeout (clamped to 1..=1000 ms).
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.server.poll_timeout_ms.unwrap_or(100).clamp(1, 1000))
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.server.max_sessions = Some(max_sessions);
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.server.poll_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lumen").join("config.toml"))
}

fn merge_server(base: &mut ServerSection, user: ServerSection) {
    if user.address.is_some() {
        base.address = user.address;
    }
    if user.port.is_some() {
        base.port = user.port;
    }
    if user.max_sessions.is_some() {
        base.max_sessions = user.max_sessions;
    }
    if user.poll_timeout_ms.is_some() {
        base.poll_timeout_ms = user.poll_timeout_ms;
    }
}
