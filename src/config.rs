//! Process configuration from environment variables

use crate::types::RegistryConfig;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    /// Announce `dead` + `playerCount` even when the id matched nobody
    pub always_emit_dead: bool,
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            always_emit_dead: false,
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_var("PORT", "port number")?.unwrap_or(DEFAULT_PORT);

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        let registry = RegistryConfig {
            reject_duplicate_ids: flag("REJECT_DUPLICATE_IDS", false),
            reset_round_on_last_player: flag("RESET_ROUND_ON_LAST_PLAYER", false),
        };

        Ok(Self {
            port,
            static_dir,
            always_emit_dead: flag("ALWAYS_EMIT_DEAD", false),
            registry,
        })
    }
}

/// Anything but `0`/`false` turns a flag on
fn flag(var: &str, default: bool) -> bool {
    std::env::var(var)
        .map(|v| {
            let v = v.trim().to_lowercase();
            v != "0" && v != "false"
        })
        .unwrap_or(default)
}

fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Ok(value) = std::env::var(var) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::Invalid {
            var,
            value,
            expected,
        })
}
