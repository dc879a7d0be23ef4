use semaphore_core::IceServerConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server configuration, loaded from a TOML file at startup. Every field
/// has a usable default so the server runs without a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: ListenConfig,
    pub signaling: SignalingConfig,
    pub limits: LimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    pub addr: String,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalingConfig {
    /// ICE servers advertised to every client on connect.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".into()],
                username: None,
                credential: None,
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Protocol violations tolerated per participant before its channel is
    /// closed.
    pub violation_limit: u32,
    /// A channel producing no frame at all for this long is treated as
    /// disconnected.
    pub idle_timeout_secs: u64,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            violation_limit: 5,
            idle_timeout_secs: 60,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file. A missing file is not an error: the defaults
    /// apply and a warning is logged.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config: Self = toml::from_str(&contents)
                    .map_err(|e| anyhow::anyhow!("config error in '{path}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path, "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!("cannot read config file '{path}': {e}")),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen.addr, self.listen.port)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.limits.idle_timeout_secs)
    }
}
