use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration as StdDuration;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_PRUNE_INTERVAL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_SESSION_COOKIE: &str = "inkwell.sid";

/// Server settings. Every field has a default, so a TOML file only needs
/// the keys it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Lifetime of a freshly issued session.
    pub session_ttl_secs: u64,
    /// How often expired sessions are swept.
    pub session_prune_interval_secs: u64,
    /// Name of the cookie carrying the session token.
    pub session_cookie: String,
    /// Register a `demo` user at startup and log a token for it.
    pub seed_demo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            session_prune_interval_secs: DEFAULT_PRUNE_INTERVAL_SECS,
            session_cookie: DEFAULT_SESSION_COOKIE.into(),
            seed_demo: false,
        }
    }
}

impl ServerConfig {
    /// Read a TOML file. Missing keys fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ServerResult<()> {
        self.session_ttl()?;
        if self.session_prune_interval_secs == 0 {
            return Err(ServerError::Config(
                "session_prune_interval_secs must be positive".into(),
            ));
        }
        if self.session_cookie.is_empty()
            || !self.session_cookie.chars().all(is_cookie_name_char)
        {
            return Err(ServerError::Config(format!(
                "invalid session_cookie name: {:?}",
                self.session_cookie
            )));
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> ServerResult<chrono::Duration> {
        i64::try_from(self.session_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .ok_or_else(|| {
                ServerError::Config(format!(
                    "session_ttl_secs out of range: {}",
                    self.session_ttl_secs
                ))
            })
    }

    pub fn prune_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.session_prune_interval_secs)
    }
}

fn is_cookie_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}
