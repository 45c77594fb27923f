//! Configuration
//!
//! Connection parameters come from `~/.redis-viewer.yaml` (or `--config`),
//! then the `REDIS` environment variable overrides them field by field.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. `REDIS` env var, URL-query style: `addr=h1:6379&addr=h2:6379&db=0&pwd=secret`
//! 2. Config file
//! 3. Defaults
//!
//! The result is an immutable [`Settings`] value that is built once at startup
//! and handed to every component that needs it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ViewerError};

/// Environment variable holding the query-string overrides
pub const ENV_OVERRIDE: &str = "REDIS";

/// Address used when neither the env var nor the config file name one
pub const DEFAULT_ADDR: &str = "127.0.0.1:6379";

/// Keys fetched per scan page
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Client retry budget
pub const MAX_RETRIES: usize = 3;

/// Cluster redirect budget
pub const MAX_REDIRECTS: usize = 10;

/// Config file contents
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Sentinel master name; enables sentinel mode when set
    #[serde(default)]
    pub master_name: Option<String>,

    #[serde(default)]
    pub addrs: Vec<String>,

    #[serde(default)]
    pub db: i64,

    /// Scan page size
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Config {
    /// Default config file path: `~/.redis-viewer.yaml`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".redis-viewer.yaml")
    }

    /// Load the config.
    ///
    /// An explicit path must exist. The default path is optional and yields
    /// an empty config when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !path.exists() {
            if required {
                return Err(ViewerError::Config {
                    reason: format!("config file not found: {}", path.display()),
                });
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| ViewerError::Config {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        tracing::info!(path = %path.display(), "using config file");
        Self::from_yaml(&content)
    }

    /// Parse YAML config content. An empty document is an empty config.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Which kind of deployment the settings describe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topology {
    Single,
    Sentinel { master_name: String },
    Cluster,
}

/// Resolved, immutable connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub addrs: Vec<String>,
    pub db: i64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub master_name: Option<String>,
    pub max_retries: usize,
    pub max_redirects: usize,
    pub page_limit: usize,
}

impl Settings {
    /// Resolve settings from the config and the `REDIS` env var.
    pub fn from_env(config: &Config) -> Self {
        let query = std::env::var(ENV_OVERRIDE).unwrap_or_default();
        Self::resolve(config, &query)
    }

    /// Resolve settings from the config and a URL-query override string.
    pub fn resolve(config: &Config, query: &str) -> Self {
        let overrides = Overrides::parse(query);

        let addrs = if !overrides.all("addr").is_empty() {
            overrides.all("addr")
        } else if !config.addrs.is_empty() {
            config.addrs.clone()
        } else {
            vec![DEFAULT_ADDR.to_string()]
        };

        let page_limit = match config.limit {
            Some(limit) if limit > 0 => limit,
            _ => DEFAULT_PAGE_LIMIT,
        };

        Self {
            addrs,
            db: overrides.int("db").unwrap_or(config.db),
            username: overrides.string("user").or_else(|| config.username.clone()),
            password: overrides.string("pwd").or_else(|| config.password.clone()),
            master_name: overrides
                .string("masterName")
                .or_else(|| config.master_name.clone())
                .filter(|name| !name.is_empty()),
            max_retries: overrides
                .int("maxRetries")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(MAX_RETRIES),
            max_redirects: overrides
                .int("maxRedirects")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(MAX_REDIRECTS),
            page_limit,
        }
    }

    /// Sentinel when a master name is set, cluster for several addresses.
    pub fn topology(&self) -> Topology {
        if let Some(name) = &self.master_name {
            return Topology::Sentinel {
                master_name: name.clone(),
            };
        }
        if self.addrs.len() > 1 {
            Topology::Cluster
        } else {
            Topology::Single
        }
    }
}

/// Split `host:port` into its parts.
pub fn split_addr(addr: &str) -> Result<(String, u16)> {
    let invalid = || ViewerError::InvalidAddress {
        addr: addr.to_string(),
    };
    let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;
    Ok((host.to_string(), port))
}

/// Parsed `REDIS` query pairs, in order
struct Overrides {
    pairs: Vec<(String, String)>,
}

impl Overrides {
    fn parse(query: &str) -> Self {
        let pairs = url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    fn all(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn string(&self, key: &str) -> Option<String> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Unparseable integers fall back like absent ones.
    fn int(&self, key: &str) -> Option<i64> {
        self.string(key).and_then(|v| v.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_without_config_or_env() {
        let settings = Settings::resolve(&Config::default(), "");
        assert_eq!(settings.addrs, vec![DEFAULT_ADDR.to_string()]);
        assert_eq!(settings.db, 0);
        assert_eq!(settings.max_retries, MAX_RETRIES);
        assert_eq!(settings.max_redirects, MAX_REDIRECTS);
        assert_eq!(settings.page_limit, DEFAULT_PAGE_LIMIT);
        assert_eq!(settings.topology(), Topology::Single);
    }

    #[test]
    fn test_env_overrides_field_by_field() {
        let config = Config {
            username: Some("alice".to_string()),
            password: Some("from-file".to_string()),
            addrs: vec!["10.0.0.1:6379".to_string()],
            db: 3,
            ..Default::default()
        };

        let settings = Settings::resolve(&config, "db=5&pwd=1qazzaq1");
        assert_eq!(settings.addrs, vec!["10.0.0.1:6379".to_string()]);
        assert_eq!(settings.db, 5);
        assert_eq!(settings.username.as_deref(), Some("alice"));
        assert_eq!(settings.password.as_deref(), Some("1qazzaq1"));
    }

    #[test]
    fn test_repeated_addr_selects_cluster() {
        let settings = Settings::resolve(&Config::default(), "addr=h1:7000&addr=h2:7001");
        assert_eq!(settings.addrs, vec!["h1:7000", "h2:7001"]);
        assert_eq!(settings.topology(), Topology::Cluster);
    }

    #[test]
    fn test_master_name_selects_sentinel() {
        let settings = Settings::resolve(&Config::default(), "masterName=mymaster&addr=s1:26379");
        assert_eq!(
            settings.topology(),
            Topology::Sentinel {
                master_name: "mymaster".to_string()
            }
        );
    }

    #[test]
    fn test_bad_integer_falls_back() {
        let config = Config {
            db: 2,
            ..Default::default()
        };
        let settings = Settings::resolve(&config, "db=two&maxRetries=-1&maxRedirects=4");
        assert_eq!(settings.db, 2);
        assert_eq!(settings.max_retries, MAX_RETRIES);
        assert_eq!(settings.max_redirects, 4);
    }

    #[test]
    fn test_yaml_config() {
        let config = Config::from_yaml(
            r#"
username: bob
password: secret
master_name: ""
addrs:
  - "127.0.0.1:7000"
  - "127.0.0.1:7001"
db: 1
limit: 50
"#,
        )
        .unwrap();
        assert_eq!(config.addrs.len(), 2);
        assert_eq!(config.limit, Some(50));

        let settings = Settings::resolve(&config, "");
        assert_eq!(settings.page_limit, 50);
        assert_eq!(settings.master_name, None);
        assert_eq!(settings.topology(), Topology::Cluster);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.yaml"))).unwrap_err();
        assert!(matches!(err, ViewerError::Config { .. }));
    }

    #[test]
    fn test_split_addr() {
        assert_eq!(split_addr("localhost:6379").unwrap(), ("localhost".to_string(), 6379));
        assert!(split_addr("localhost").is_err());
        assert!(split_addr(":6379").is_err());
        assert!(split_addr("h:notaport").is_err());
    }
}
