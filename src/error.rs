//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Redis(#[from] redis::RedisError),

    // ─────────────────────────────────────────────────────────────
    // Startup errors (RV-001 to RV-010)
    // ─────────────────────────────────────────────────────────────
    #[error("RV-001: Invalid config: {reason}")]
    Config { reason: String },

    #[error("RV-002: Invalid address '{addr}' (expected host:port)")]
    InvalidAddress { addr: String },

    #[error("RV-003: connect to redis failed: {reason}")]
    Connection { reason: String },

    #[error("RV-004: Logging setup failed: {reason}")]
    Logging { reason: String },

    #[error("RV-010: Terminal error: {reason}")]
    Tui { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Per-key errors, rendered inside the key list (RV-020 to RV-023)
    // ─────────────────────────────────────────────────────────────
    #[error("RV-020: unsupported type: {key_type}")]
    UnsupportedType { key_type: String },

    #[error("RV-021: key '{key}' no longer exists")]
    KeyVanished { key: String },

    #[error("RV-022: MOVED to {addr}")]
    Moved { addr: String },

    #[error("RV-023: too many redirects for key '{key}'")]
    TooManyRedirects { key: String },

    // ─────────────────────────────────────────────────────────────
    // Operation errors, rendered in the status bar (RV-030 to RV-032)
    // ─────────────────────────────────────────────────────────────
    #[error("RV-030: scan failed: {reason}")]
    Scan { reason: String },

    #[error("RV-031: count failed: {reason}")]
    Count { reason: String },

    #[error("RV-032: export to {path}: {reason}")]
    Export { path: String, reason: String },
}

impl ViewerError {
    /// Map a redis reply into a typed error, keeping cluster redirects visible.
    pub fn from_redis(err: redis::RedisError) -> Self {
        if err.kind() == redis::ErrorKind::Moved {
            if let Some((host, port)) = err.redirect_node() {
                return ViewerError::Moved {
                    addr: format!("{}:{}", host, port),
                };
            }
        }
        ViewerError::Redis(err)
    }
}

impl FixSuggestion for ViewerError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            ViewerError::Io(_) => Some("Check file path and permissions"),
            ViewerError::Yaml(_) => Some("Check YAML syntax in ~/.redis-viewer.yaml"),
            ViewerError::Config { .. } => Some("Check the file passed with --config"),
            ViewerError::InvalidAddress { .. } => {
                Some("Use host:port, e.g. addrs: [\"127.0.0.1:6379\"] or REDIS=addr=127.0.0.1:6379")
            }
            ViewerError::Connection { .. } => {
                Some("Check the server is reachable and the REDIS env var / config credentials")
            }
            ViewerError::Logging { .. } => Some("Pass a writable path with --log-file"),
            ViewerError::Tui { .. } => Some("Run redis-viewer from an interactive terminal"),
            ViewerError::Redis(_) => Some("Check the server logs for the failing command"),
            ViewerError::Export { .. } => Some("Check the export path exists and is writable"),
            ViewerError::UnsupportedType { .. }
            | ViewerError::KeyVanished { .. }
            | ViewerError::Moved { .. }
            | ViewerError::TooManyRedirects { .. }
            | ViewerError::Scan { .. }
            | ViewerError::Count { .. } => None,
        }
    }
}
