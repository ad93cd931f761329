//! Configuration loading and root folder resolution
//!
//! The bundled corpus lives under a single root folder. Its location is
//! resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`SCORE_CORPUS_ROOT`, then `SCORE_CORPUS`)
//! 3. TOML config file (`root_folder`)
//! 4. OS-dependent compiled default (fallback)
//!
//! Missing or malformed config files never abort startup: a warning is
//! logged and compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Application directory name used under the platform config/data dirs
pub const APP_DIR_NAME: &str = "score-corpus";

/// Primary environment variable naming the corpus root folder
pub const ROOT_ENV_VAR: &str = "SCORE_CORPUS_ROOT";

/// Alternative environment variable naming the corpus root folder
pub const ROOT_ENV_VAR_ALT: &str = "SCORE_CORPUS";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Directory holding the bundled (core) corpus
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Directories searched as the local corpus on every run
    #[serde(default)]
    pub local_corpus_paths: Vec<PathBuf>,

    /// Where per-domain metadata bundles are stored as JSON
    #[serde(default)]
    pub metadata_cache_dir: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// A complete config spelling out the compiled defaults, used when
    /// writing a fresh config file
    pub fn from_defaults(defaults: &CompiledDefaults) -> Self {
        Self {
            root_folder: Some(defaults.root_folder.clone()),
            local_corpus_paths: Vec::new(),
            metadata_cache_dir: Some(defaults.metadata_cache_dir.clone()),
            logging: LoggingConfig {
                level: defaults.log_level.clone(),
                file: defaults.log_file.clone(),
            },
        }
    }
}

/// Compiled-in defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub metadata_cache_dir: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was built for
    pub fn for_current_platform() -> Self {
        let data_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("C:\\ProgramData"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir().unwrap_or_else(|| PathBuf::from("/Library/Application Support"))
        } else {
            dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("/var/lib"))
        };

        let cache_dir = dirs::cache_dir().unwrap_or_else(|| data_dir.clone());

        Self {
            root_folder: data_dir.join(APP_DIR_NAME).join("corpus"),
            metadata_cache_dir: cache_dir.join(APP_DIR_NAME).join("metadata"),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

/// Resolves the corpus root folder from CLI, environment, TOML and defaults
pub struct RootFolderResolver {
    cli_override: Option<PathBuf>,
    config: TomlConfig,
}

impl RootFolderResolver {
    /// Create a resolver reading the default config file location
    pub fn new() -> Self {
        let config = match default_config_path() {
            Some(path) => load_toml_config_or_default(&path),
            None => TomlConfig::default(),
        };
        Self::with_config(config)
    }

    /// Create a resolver over an already-loaded TOML config
    pub fn with_config(config: TomlConfig) -> Self {
        Self {
            cli_override: None,
            config,
        }
    }

    /// Set the command-line argument value (highest priority)
    pub fn with_cli_override(mut self, path: Option<PathBuf>) -> Self {
        self.cli_override = path;
        self
    }

    /// The TOML config this resolver consults
    pub fn config(&self) -> &TomlConfig {
        &self.config
    }

    /// Resolve the root folder; never fails, falls back to compiled default
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_override {
            debug!("Root folder from command line: {}", path.display());
            return path.clone();
        }

        for var in [ROOT_ENV_VAR, ROOT_ENV_VAR_ALT] {
            if let Ok(value) = std::env::var(var) {
                if !value.is_empty() {
                    debug!("Root folder from {}: {}", var, value);
                    return PathBuf::from(value);
                }
            }
        }

        if let Some(path) = &self.config.root_folder {
            debug!("Root folder from TOML config: {}", path.display());
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }

    /// Metadata cache directory from TOML, else the compiled default
    pub fn metadata_cache_dir(&self) -> PathBuf {
        self.config
            .metadata_cache_dir
            .clone()
            .unwrap_or_else(|| CompiledDefaults::for_current_platform().metadata_cache_dir)
    }
}

impl Default for RootFolderResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-user config file location, whether or not it exists yet
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// Locate the config file for this platform, if one exists
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = user_config_path() {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR_NAME).join("config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
}

/// Load a TOML config file, falling back to defaults with a warning
pub fn load_toml_config_or_default(path: &Path) -> TomlConfig {
    match load_toml_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Using default configuration: {}", e);
            TomlConfig::default()
        }
    }
}

/// Write a TOML config atomically (temp file + rename)
///
/// On Unix the file is created with 0600 permissions.
pub fn write_toml_config(config: &TomlConfig, target: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = target.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
    }

    if let Err(e) = fs::rename(&temp_path, target) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}
