//! Configuration loading and root folder resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal; the server logs a
//! warning and starts with defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Database file created inside the root folder
pub const DATABASE_FILE_NAME: &str = "lcm.db";

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "LCM_ROOT_FOLDER";

/// Environment variable holding the shared admin password
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";

/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "LCM_PORT";

/// Environment variable overriding the bind address
pub const BIND_ADDRESS_ENV: &str = "LCM_BIND_ADDRESS";

/// Password used when nothing else is configured
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Default HTTP port of lcm-admin
pub const DEFAULT_PORT: u16 = 5780;

/// Default bind address (loopback only)
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional so that a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database file
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP bind address
    #[serde(default)]
    pub bind_address: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Shared admin password
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level or EnvFilter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load from an explicit path, or from the first platform location that exists
    ///
    /// Falls back to an empty config (all defaults) when no file can be read.
    /// Nothing is logged here since this runs before tracing is set up; the
    /// returned [`ConfigSource`] says where the config came from.
    pub fn load_or_default(explicit: Option<&Path>) -> (Self, ConfigSource) {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let Some(path) = path else {
            return (Self::default(), ConfigSource::Defaults);
        };

        match Self::load(&path) {
            Ok(config) => (config, ConfigSource::File(path)),
            Err(e) => (Self::default(), ConfigSource::Invalid(e)),
        }
    }
}

/// Where [`TomlConfig::load_or_default`] took its config from
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    /// No config file exists
    Defaults,
    /// A file exists but could not be read or parsed
    Invalid(Error),
}

impl ConfigSource {
    /// Report the outcome once tracing is initialized
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config file: {}", path.display()),
            ConfigSource::Defaults => info!("No config file found, using defaults"),
            ConfigSource::Invalid(e) => warn!("{} (continuing with defaults)", e),
        }
    }
}

/// Locate the config file for the platform
///
/// Linux checks `~/.config/lcm/lcm-admin.toml` then `/etc/lcm/lcm-admin.toml`;
/// other platforms only the user config dir.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("lcm").join("lcm-admin.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/lcm/lcm-admin.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("lcm"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\lcm"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("lcm"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/lcm"))
    } else {
        dirs::data_local_dir()
            .map(|d| d.join("lcm"))
            .unwrap_or_else(|| PathBuf::from("./lcm_data"))
    }
}

/// Pick the first available value: CLI, then environment, then TOML
fn resolve_setting(cli: Option<String>, env_var_name: &str, toml: Option<String>) -> Option<String> {
    cli.or_else(|| {
        std::env::var(env_var_name)
            .ok()
            .filter(|v| !v.trim().is_empty())
    })
    .or(toml)
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub admin_password: Option<String>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub admin_password: String,
    /// True when no password was configured anywhere
    pub password_is_default: bool,
    pub log_level: String,
}

impl ServerConfig {
    /// Merge CLI, environment, TOML and defaults
    pub fn resolve(cli: CliOverrides, toml: &TomlConfig) -> Result<Self> {
        let root_folder = resolve_setting(
            cli.root_folder.map(|p| p.to_string_lossy().into_owned()),
            ROOT_FOLDER_ENV,
            toml.root_folder
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        )
        .map(PathBuf::from)
        .unwrap_or_else(default_root_folder);

        let bind_address = resolve_setting(
            cli.bind_address,
            BIND_ADDRESS_ENV,
            toml.bind_address.clone(),
        )
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let port = match resolve_setting(
            cli.port.map(|p| p.to_string()),
            PORT_ENV,
            toml.port.map(|p| p.to_string()),
        ) {
            Some(value) => value
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("Invalid port '{}': {}", value, e)))?,
            None => DEFAULT_PORT,
        };

        let configured_password =
            resolve_setting(cli.admin_password, ADMIN_PASSWORD_ENV, toml.admin_password.clone());
        let password_is_default = configured_password.is_none();

        Ok(Self {
            root_folder,
            bind_address,
            port,
            admin_password: configured_password
                .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
            password_is_default,
            log_level: toml.logging.level.clone(),
        })
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    /// `host:port` string for the listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
