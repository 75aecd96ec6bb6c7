//! Configuration for dbexport.
//!
//! Configuration sources (highest priority first):
//! 1. CLI flags (applied by the caller on top of [`Settings`])
//! 2. Environment variables (DATABASE_URL, DBEXPORT_BINARY,
//!    DBEXPORT_TEMP_DIR, DBEXPORT_TIMEOUT_SECONDS)
//! 3. Config file (.dbexport/config.yaml)
//! 4. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .dbexport/config.yaml
//! - Falls back to <config dir>/dbexport/config.yaml
//! - Relative paths in the file are relative to the directory containing .dbexport/
//!
//! Settings are resolved once at startup and passed explicitly to whatever
//! needs them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::CredentialMode;
use crate::domain::{ConfigError, ConnectionConfig};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;
pub const DEFAULT_FILENAME_PREFIX: &str = "db_backup";
pub const DEFAULT_BINARY: &str = "mysqldump";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub dump: DumpConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DumpConfig {
    pub timeout_seconds: Option<u64>,
    pub filename_prefix: Option<String>,
    pub binary: Option<String>,
    /// Directory for in-progress dumps (relative to the project root)
    pub temp_dir: Option<String>,
    pub credentials: Option<CredentialMode>,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Environment overrides, read once
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub database_url: Option<String>,
    pub binary: Option<String>,
    pub temp_dir: Option<String>,
    pub timeout_seconds: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            database_url: var("DATABASE_URL"),
            binary: var("DBEXPORT_BINARY"),
            temp_dir: var("DBEXPORT_TEMP_DIR"),
            timeout_seconds: var("DBEXPORT_TIMEOUT_SECONDS"),
        }
    }
}

/// Settings controlling a dump run
#[derive(Debug, Clone)]
pub struct DumpSettings {
    pub timeout_seconds: u64,
    pub filename_prefix: String,
    pub binary: String,
    /// None means the OS temp directory
    pub temp_dir: Option<PathBuf>,
    pub credentials: CredentialMode,
    pub extra_args: Vec<String>,
}

impl Default for DumpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_string(),
            binary: DEFAULT_BINARY.to_string(),
            temp_dir: None,
            credentials: CredentialMode::default(),
            extra_args: Vec::new(),
        }
    }
}

impl DumpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Fully resolved configuration
#[derive(Clone)]
pub struct Settings {
    /// Raw connection URL (contains the password; never print it)
    pub database_url: Option<String>,
    pub dump: DumpSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &self.database_url.as_ref().map(|_| "***"))
            .field("dump", &self.dump)
            .field("config_file", &self.config_file)
            .finish()
    }
}

impl Settings {
    /// Load settings from the environment and the config file.
    ///
    /// `explicit` skips discovery and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_file = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => find_config_file(),
        };

        let file = config_file.as_deref().map(load_config_file).transpose()?;
        Self::resolve(file, config_file, EnvOverrides::from_env())
    }

    /// Merge a parsed config file with environment overrides
    pub fn resolve(
        file: Option<ConfigFile>,
        config_file: Option<PathBuf>,
        env: EnvOverrides,
    ) -> Result<Self> {
        let dump_config = file.as_ref().map(|f| f.dump.clone()).unwrap_or_default();
        let base_dir = config_file.as_deref().map(project_root);

        let timeout_seconds = match env.timeout_seconds {
            Some(ref raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid DBEXPORT_TIMEOUT_SECONDS: {}", raw))?,
            None => dump_config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        };
        if timeout_seconds == 0 {
            anyhow::bail!("Dump timeout must be at least one second");
        }

        let temp_dir = match (env.temp_dir, dump_config.temp_dir) {
            (Some(env_dir), _) => Some(PathBuf::from(env_dir)),
            (None, Some(dir)) => Some(match base_dir {
                Some(ref base) => resolve_path(base, &dir),
                None => PathBuf::from(dir),
            }),
            (None, None) => None,
        };

        let dump = DumpSettings {
            timeout_seconds,
            filename_prefix: dump_config
                .filename_prefix
                .unwrap_or_else(|| DEFAULT_FILENAME_PREFIX.to_string()),
            binary: env
                .binary
                .or(dump_config.binary)
                .unwrap_or_else(|| DEFAULT_BINARY.to_string()),
            temp_dir,
            credentials: dump_config.credentials.unwrap_or_default(),
            extra_args: dump_config.extra_args,
        };

        Ok(Self {
            database_url: env.database_url.or(file.and_then(|f| f.database_url)),
            dump,
            config_file,
        })
    }

    /// Resolve the configured connection URL
    pub fn connection(&self) -> Result<ConnectionConfig, ConfigError> {
        match self.database_url.as_deref() {
            Some(url) => ConnectionConfig::parse(url),
            None => Err(ConfigError::Missing),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".dbexport").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("dbexport").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Directory that contains `.dbexport/` (grandparent of config.yaml)
fn project_root(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .and_then(|p| p.parent())
        .unwrap_or(Path::new("."))
        .to_path_buf()
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
