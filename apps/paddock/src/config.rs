//! # Configuration
//!
//! Settings are resolved from four layers, highest priority first:
//!
//! 1. CLI flags (`--data`, `--strict`, `server --host/--port`)
//! 2. Environment (`PADDOCK_DATA`, `PADDOCK_STRICT`, `PADDOCK_HOST`,
//!    `PADDOCK_PORT`, `PADDOCK_CACHE_CAPACITY`, `PADDOCK_DEFAULT_K`)
//! 3. TOML file (`--config <path>`, or `paddock.toml` in the working directory)
//! 4. Built-in defaults
//!
//! ## File Layout
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [data]
//! path = "data/seed.json"
//! strict = false
//!
//! [ranking]
//! cache_capacity = 128
//! default_k = 10
//! ```

use paddock_core::{ShopError, primitives};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "paddock.toml";

/// Seed file used when nothing else names one.
pub const DEFAULT_DATA_PATH: &str = "data/seed.json";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

// =============================================================================
// FILE LAYER
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSection {
    pub path: Option<PathBuf>,
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingSection {
    pub cache_capacity: Option<usize>,
    pub default_k: Option<usize>,
}

/// Contents of `paddock.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub data: DataSection,
    pub ranking: RankingSection,
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self, ShopError> {
        toml::from_str(content)
            .map_err(|e| ShopError::DeserializationError(format!("Invalid config: {}", e)))
    }

    /// Load the config file.
    ///
    /// An explicit path must exist. Without one, `paddock.toml` is read if
    /// present and an empty config is used otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ShopError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            ShopError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::parse(&content)
    }
}

// =============================================================================
// RESOLVED SETTINGS
// =============================================================================

/// Values given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data: Option<PathBuf>,
    pub strict: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_path: PathBuf,
    pub strict: bool,
    pub host: String,
    pub port: u16,
    pub cache_capacity: usize,
    pub default_k: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            strict: false,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cache_capacity: primitives::DEFAULT_CACHE_CAPACITY,
            default_k: primitives::DEFAULT_TOP_K,
        }
    }
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn resolve(cli: &CliOverrides, file: &FileConfig) -> Result<Self, ShopError> {
        Self::resolve_with(cli, file, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an injectable environment lookup.
    pub fn resolve_with<F>(cli: &CliOverrides, file: &FileConfig, env: F) -> Result<Self, ShopError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let data_path = cli
            .data
            .clone()
            .or_else(|| env("PADDOCK_DATA").map(PathBuf::from))
            .or_else(|| file.data.path.clone())
            .unwrap_or(defaults.data_path);

        let strict = if cli.strict {
            true
        } else if let Some(raw) = env("PADDOCK_STRICT") {
            parse_flag("PADDOCK_STRICT", &raw)?
        } else {
            file.data.strict.unwrap_or(defaults.strict)
        };

        let host = cli
            .host
            .clone()
            .or_else(|| env("PADDOCK_HOST"))
            .or_else(|| file.server.host.clone())
            .unwrap_or(defaults.host);

        let port = match cli.port {
            Some(port) => port,
            None => match env("PADDOCK_PORT") {
                Some(raw) => parse_number("PADDOCK_PORT", &raw)?,
                None => file.server.port.unwrap_or(defaults.port),
            },
        };

        let cache_capacity = match env("PADDOCK_CACHE_CAPACITY") {
            Some(raw) => parse_number("PADDOCK_CACHE_CAPACITY", &raw)?,
            None => file
                .ranking
                .cache_capacity
                .unwrap_or(defaults.cache_capacity),
        };

        let default_k = match env("PADDOCK_DEFAULT_K") {
            Some(raw) => parse_number("PADDOCK_DEFAULT_K", &raw)?,
            None => file.ranking.default_k.unwrap_or(defaults.default_k),
        };
        if default_k > primitives::MAX_TOP_K {
            return Err(ShopError::InvalidQuery(format!(
                "default_k must be at most {}, got {}",
                primitives::MAX_TOP_K,
                default_k
            )));
        }

        Ok(Self {
            data_path,
            strict,
            host,
            port,
            cache_capacity,
            default_k,
        })
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ShopError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ShopError::InvalidQuery(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ShopError> {
    raw.trim()
        .parse()
        .map_err(|_| ShopError::InvalidQuery(format!("{} must be a number, got '{}'", key, raw)))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let settings =
            Settings::resolve_with(&CliOverrides::default(), &FileConfig::default(), env_of(&[]))
                .expect("resolve");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn parse_full_file() {
        let file = FileConfig::parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [data]
            path = "shop.json"
            strict = true

            [ranking]
            cache_capacity = 16
            default_k = 3
            "#,
        )
        .expect("parse");

        let settings = Settings::resolve_with(&CliOverrides::default(), &file, env_of(&[]))
            .expect("resolve");
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.data_path, PathBuf::from("shop.json"));
        assert!(settings.strict);
        assert_eq!(settings.cache_capacity, 16);
        assert_eq!(settings.default_k, 3);
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(FileConfig::parse("[server]\nhots = \"x\"").is_err());
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file = FileConfig::parse("[data]\npath = \"file.json\"\n[server]\nport = 1").expect("parse");
        let env = env_of(&[("PADDOCK_DATA", "env.json"), ("PADDOCK_PORT", "2")]);

        let from_env =
            Settings::resolve_with(&CliOverrides::default(), &file, &env).expect("resolve");
        assert_eq!(from_env.data_path, PathBuf::from("env.json"));
        assert_eq!(from_env.port, 2);

        let cli = CliOverrides {
            data: Some(PathBuf::from("cli.json")),
            port: Some(3),
            ..CliOverrides::default()
        };
        let from_cli = Settings::resolve_with(&cli, &file, &env).expect("resolve");
        assert_eq!(from_cli.data_path, PathBuf::from("cli.json"));
        assert_eq!(from_cli.port, 3);
    }

    #[test]
    fn strict_from_env() {
        let on = Settings::resolve_with(
            &CliOverrides::default(),
            &FileConfig::default(),
            env_of(&[("PADDOCK_STRICT", "1")]),
        )
        .expect("resolve");
        assert!(on.strict);

        let bad = Settings::resolve_with(
            &CliOverrides::default(),
            &FileConfig::default(),
            env_of(&[("PADDOCK_STRICT", "maybe")]),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn oversized_default_k_rejected() {
        let file = FileConfig::parse("[ranking]\ndefault_k = 100000").expect("parse");
        assert!(Settings::resolve_with(&CliOverrides::default(), &file, env_of(&[])).is_err());
    }
}
