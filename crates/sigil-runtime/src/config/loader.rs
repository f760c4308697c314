//! Configuration loader using figment.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`sigil.{profile}.toml`)
//! 3. Main config file (`sigil.toml` or `config.toml`)
//! 4. Bare legacy variables (`HANDLERS`, `SUDO`, `MODE`, `LOG_MSG`, ...)
//! 5. Environment variables (`SIGIL_*`)
//! 6. Programmatic overrides
//!
//! A `.env` file in the working directory is read first with dotenvy. It
//! never overrides variables that are already set.
//!
//! # Environment Variable Mapping
//!
//! `SIGIL_` variables use `__` as the nesting separator:
//!
//! - `SIGIL_HANDLERS=^[.!]` → `handlers = "^[.!]"`
//! - `SIGIL_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//!
//! Legacy variables map one to one onto the top-level keys. Empty legacy
//! values are ignored, and a boolean that does not parse keeps its default.
//!
//! # Example
//!
//! ```rust,ignore
//! use sigil_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().profile("production").load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(feature = "toml-config")]
use figment::providers::{Format, Toml};
use figment::providers::{Env, Serialized};
use sigil_framework::Mode;
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::SigilConfig;

/// Bare environment variables read for compatibility with older deployments.
pub const LEGACY_ENV_VARS: [&str; 7] = [
    "HANDLERS",
    "SUDO",
    "MODE",
    "LOG_MSG",
    "READ_MSG",
    "READ_CMD",
    "ERROR_MSG",
];

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Reads `SIGIL_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var("SIGIL_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Programmatic overrides, merged last.
    overrides: Figment,
    /// Explicit profile; read from the environment when unset.
    profile: Option<Profile>,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: None,
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Some(Profile::parse(profile.as_ref()));
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("sigil"))
        } else {
            self
        }
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables the `.env` file and environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Ignores the `.env` file and every environment variable.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges configuration programmatically, above every other source.
    ///
    /// ```rust,ignore
    /// let config = ConfigLoader::new()
    ///     .merge(SigilConfig { handlers: "!".into(), ..Default::default() })
    ///     .load()?;
    /// ```
    pub fn merge(mut self, config: SigilConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<SigilConfig> {
        if self.load_env {
            match dotenvy::dotenv() {
                Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
                Err(e) if e.not_found() => trace!("No .env file found"),
                Err(e) => warn!("Failed to load .env file: {e}"),
            }
        }

        let profile = self.profile.clone().unwrap_or_else(Profile::from_env);
        let figment = self.build_figment(&profile)?;

        let config: SigilConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;

        debug!(
            profile = %profile,
            handlers = %config.handlers,
            mode = %config.mode,
            logging_level = %config.logging.level,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(self, profile: &Profile) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(SigilConfig::default()));

        if let Some(path) = &self.config_file {
            if path.exists() {
                info!(path = %path.display(), "Loading configuration file");
                figment = Self::merge_config_file(figment, path)?;
            } else {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
        } else {
            figment = self.load_config_files(figment, profile);
        }

        if self.load_env {
            figment = merge_legacy_env(figment);

            trace!("Loading environment variables with SIGIL_ prefix");
            figment = figment.merge(
                Env::prefixed("SIGIL_")
                    .ignore(&["PROFILE"])
                    .split("__"),
            );
        }

        Ok(figment.merge(self.overrides))
    }

    /// Merges a single config file into the figment, dispatching on file extension.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if self.search_paths.is_empty() {
            let mut paths = Vec::new();
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd);
            }
            if let Some(config_dir) = dirs::config_dir() {
                paths.push(config_dir.join("sigil"));
            }
            paths
        } else {
            self.search_paths.clone()
        }
    }

    /// Searches `search_paths × base_names`, merging a profile-specific
    /// variant before each base file. Stops at the first base file found.
    #[cfg(feature = "toml-config")]
    fn load_config_files(&self, mut figment: Figment, profile: &Profile) -> Figment {
        for search_path in self.resolve_search_paths() {
            for (stem, base_name) in [("sigil", "sigil.toml"), ("config", "config.toml")] {
                let profile_path = search_path.join(format!("{stem}.{}.toml", profile.as_str()));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = figment.merge(Toml::file(&profile_path));
                }

                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    return figment.merge(Toml::file(&base_path));
                }
            }
        }

        warn!("No configuration file found, using defaults");
        figment
    }

    #[cfg(not(feature = "toml-config"))]
    fn load_config_files(&self, figment: Figment, _profile: &Profile) -> Figment {
        figment
    }
}

/// Parses a boolean the way the legacy variables were written.
fn parse_legacy_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn merge_legacy_env(mut figment: Figment) -> Figment {
    for var in LEGACY_ENV_VARS {
        let Ok(value) = std::env::var(var) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        let key = var.to_lowercase();
        figment = match var {
            "HANDLERS" | "SUDO" => figment.merge(Serialized::default(&key, value)),
            "MODE" => {
                let mode: Mode = value.parse().unwrap_or_default();
                figment.merge(Serialized::default(&key, mode))
            }
            _ => match parse_legacy_bool(value) {
                Some(flag) => figment.merge(Serialized::default(&key, flag)),
                None => {
                    warn!(variable = var, value, "Ignoring unparseable boolean");
                    figment
                }
            },
        };
        trace!(variable = var, "Applied legacy environment variable");
    }
    figment
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<SigilConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from `path`, with environment overrides.
pub fn load_config_from_file(path: impl AsRef<Path>) -> ConfigResult<SigilConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
