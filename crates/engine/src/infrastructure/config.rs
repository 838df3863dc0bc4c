//! Engine configuration

use std::env;
use std::path::PathBuf;

/// Engine configuration loaded from environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Interface to bind
    pub server_host: String,
    /// HTTP/WebSocket port
    pub server_port: u16,

    /// CORS allowed origins (comma-separated, or "*" for any). Empty disables CORS.
    pub cors_allowed_origins: Vec<String>,

    /// JSON file seeding the campaign and character catalogs
    pub seed_path: Option<PathBuf>,

    /// Per-connection outbound WebSocket buffer
    pub ws_channel_buffer: usize,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_WS_CHANNEL_BUFFER: usize = 256;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_host: DEFAULT_HOST.to_string(),
            server_port: DEFAULT_PORT,
            cors_allowed_origins: Vec::new(),
            seed_path: None,
            ws_channel_buffer: DEFAULT_WS_CHANNEL_BUFFER,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup. Unparseable numbers fall back
    /// to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let server_port = var("SERVER_PORT")
            .or_else(|| var("PORT"))
            .map(|raw| parse_or_default("SERVER_PORT", &raw, DEFAULT_PORT))
            .unwrap_or(DEFAULT_PORT);

        let ws_channel_buffer = var("WS_CHANNEL_BUFFER")
            .map(|raw| parse_or_default("WS_CHANNEL_BUFFER", &raw, DEFAULT_WS_CHANNEL_BUFFER))
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_WS_CHANNEL_BUFFER);

        Self {
            server_host: var("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            server_port,
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            seed_path: var("SKIRMISH_SEED_PATH").map(PathBuf::from),
            ws_channel_buffer,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or_default<T: std::str::FromStr + Copy + std::fmt::Display>(
    key: &str,
    raw: &str,
    default: T,
) -> T {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(key, value = raw, default = %default, "Invalid config value, using default");
        default
    })
}
