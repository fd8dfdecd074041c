//! Configuration loading and root folder resolution
//!
//! The root folder holds everything the service persists: the SQLite
//! database, the blob directory and the optional `docfinder.toml`.
//!
//! Root folder priority:
//! 1. Command-line argument (highest priority)
//! 2. `DOCFINDER_ROOT_FOLDER` environment variable
//! 3. OS-dependent compiled default (fallback)
//!
//! Bootstrap settings come from `docfinder.toml` inside the root folder; a
//! missing file is not an error and yields the built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "DOCFINDER_ROOT_FOLDER";

/// Name of the TOML file looked up inside the root folder
pub const CONFIG_FILE_NAME: &str = "docfinder.toml";

const DATABASE_FILE_NAME: &str = "docfinder.db";
const BLOB_DIR_NAME: &str = "blobs";

/// Bootstrap configuration loaded from `docfinder.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP listen address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Session lifetime in seconds
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,

    /// Account created on first start when no user exists
    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Initial administrator account
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_email")]
    pub email: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    5780
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_session_timeout_secs() -> u64 {
    60 * 60 * 24 * 7 // one week
}

fn default_admin_email() -> String {
    "admin@docfinder.local".to_string()
}

fn default_admin_password() -> String {
    "change-me".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: default_admin_email(),
            password: default_admin_password(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            session_timeout_secs: default_session_timeout_secs(),
            admin: AdminConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid {}: {}", CONFIG_FILE_NAME, e)))
    }

    /// Load `docfinder.toml` from the root folder
    ///
    /// A missing file logs a warning and returns defaults; a malformed file
    /// is an error.
    pub fn load(root_folder: &Path) -> Result<Self> {
        let path = root_folder.join(CONFIG_FILE_NAME);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                info!("Loaded configuration from {}", path.display());
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("{} not found, using built-in defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Resolves the root folder from CLI, environment and compiled default
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>) -> Self {
        Self { cli_arg }
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        default_root_folder()
    }
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("docfinder"))
        .unwrap_or_else(|| PathBuf::from("./docfinder_data"))
}

/// Creates the root folder layout and names the files inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.blob_path())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn blob_path(&self) -> PathBuf {
        self.root_folder.join(BLOB_DIR_NAME)
    }
}
