use crate::error::{CoreError, Result};
use crate::events::Event;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

/// Node configuration (spec §3). `probe_timeout` and `send_cap` carry the
/// design defaults called out in the spec when not overridden.
#[derive(Clone)]
pub struct Config {
    pub ping_interval: Duration,
    pub probe_timeout: Duration,
    pub send_cap: u32,
    pub event_sink: Option<mpsc::Sender<Event>>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("ping_interval", &self.ping_interval)
            .field("probe_timeout", &self.probe_timeout)
            .field("send_cap", &self.send_cap)
            .field("event_sink", &self.event_sink.is_some())
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let ping_interval = Duration::from_millis(200);
        Self {
            probe_timeout: ping_interval / 3,
            ping_interval,
            send_cap: 3,
            event_sink: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    ping_interval_ms: Option<u64>,
    probe_timeout_ms: Option<u64>,
    send_cap: Option<u32>,
}

impl Config {
    /// Load overrides from a TOML file on top of the defaults. A missing
    /// file is not an error - it just means "use the defaults," mirroring
    /// the teacher's tolerant startup posture. A present-but-malformed file
    /// is fatal, since that almost always means an operator typo.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(CoreError::Io(e)),
        };

        let file: FileConfig = toml::from_str(&contents)
            .map_err(|e| CoreError::Configuration(format!("{}: {e}", path.display())))?;

        let mut config = Self::default();
        if let Some(ms) = file.ping_interval_ms {
            config.ping_interval = Duration::from_millis(ms);
        }
        config.probe_timeout = file
            .probe_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(config.ping_interval / 3);
        if let Some(cap) = file.send_cap {
            config.send_cap = cap;
        }
        Ok(config)
    }
}
