// src/infrastructure/config.rs
use crate::constants::ENV_PREFIX;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// TOML configuration for the note backend, file storage and signed-in identity.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BackendConfig {
    /// SQLite database file; empty means the platform data directory.
    #[serde(default = "default_database")]
    pub database: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    /// Root directory for uploaded attachments; empty means the platform data directory.
    #[serde(default = "default_storage_root")]
    pub root: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct IdentityConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub photo_url: String,
}

fn default_database() -> String { String::new() }
fn default_storage_root() -> String { String::new() }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

/// `<config dir>/studynotes/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("studynotes").join("config.toml"))
}

fn data_dir() -> Result<PathBuf> {
    Ok(dirs::data_dir()
        .context("Could not find data directory")?
        .join("studynotes"))
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        std::fs::write(path.as_ref(), toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Load an explicit config file, or the default one if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    debug!(?path, "Loading default config");
                    Self::load(path)
                }
                _ => Ok(Self::default()),
            },
        }
    }

    /// Override values from `STUDYNOTES_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|value| !value.trim().is_empty())
        };
        let targets: [(&str, &mut String); 6] = [
            ("DATABASE", &mut self.backend.database),
            ("STORAGE", &mut self.storage.root),
            ("USER_ID", &mut self.identity.id),
            ("USER_EMAIL", &mut self.identity.email),
            ("USER_NAME", &mut self.identity.display_name),
            ("USER_PHOTO", &mut self.identity.photo_url),
        ];
        for (name, target) in targets {
            if let Some(value) = var(name) {
                debug!(variable = name, "Config overridden from environment");
                *target = value;
            }
        }
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        if self.backend.database.is_empty() {
            Ok(data_dir()?.join("notes.db"))
        } else {
            Ok(PathBuf::from(&self.backend.database))
        }
    }

    pub fn storage_root(&self) -> Result<PathBuf> {
        if self.storage.root.is_empty() {
            Ok(data_dir()?.join("files"))
        } else {
            Ok(PathBuf::from(&self.storage.root))
        }
    }
}
