//! Configuration and storage location

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::admin::DEFAULT_LOGIN_ERROR_DURATION;
use crate::contact::DEFAULT_STATUS_DURATION;
use crate::storage::FileStorage;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the local storage file (platform data dir if unset)
    pub data_dir: Option<PathBuf>,
    /// Seconds a failed-login message stays visible
    pub login_error_secs: u64,
    /// Seconds a submit success/failure notice stays visible
    pub submit_status_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            login_error_secs: DEFAULT_LOGIN_ERROR_DURATION.as_secs(),
            submit_status_secs: DEFAULT_STATUS_DURATION.as_secs(),
        }
    }
}

impl Config {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "portfolio-inbox", "portfolio-inbox")
            .context("Could not determine config directory")
    }

    /// Get config file path
    fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Load configuration from disk, falling back to defaults if absent.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    /// Apply a `--data-dir` override for this run only.
    pub fn with_data_dir_override(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.data_dir = Some(dir);
        }
        self
    }

    /// Directory where the local storage file lives.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    /// Open the file-backed local storage.
    pub fn storage(&self) -> Result<FileStorage> {
        Ok(FileStorage::in_dir(&self.data_dir()?))
    }

    pub fn login_error_duration(&self) -> Duration {
        Duration::from_secs(self.login_error_secs)
    }

    pub fn submit_status_duration(&self) -> Duration {
        Duration::from_secs(self.submit_status_secs)
    }
}

/// Show the effective configuration, optionally pinning a new data directory.
///
/// `file_config` is what the config file holds; only `set_data_dir` is
/// written back. The `--data-dir` override changes what is shown, not what
/// is saved.
pub fn show_or_update(
    file_config: Config,
    set_data_dir: Option<PathBuf>,
    data_dir_override: Option<PathBuf>,
) -> Result<()> {
    let path = Config::config_path()?;
    let config = update_at(&path, file_config, set_data_dir, data_dir_override)?;

    println!("Config file:   {}", path.display());
    println!("Storage file:  {}", config.storage()?.path().display());
    println!("Login error:   {}s", config.login_error_secs);
    println!("Submit status: {}s", config.submit_status_secs);
    Ok(())
}

/// Pin `set_data_dir` into the config file at `path`, then return the
/// configuration in effect for this run.
fn update_at(
    path: &Path,
    mut file_config: Config,
    set_data_dir: Option<PathBuf>,
    data_dir_override: Option<PathBuf>,
) -> Result<Config> {
    if let Some(dir) = set_data_dir {
        tracing::info!("Setting data directory to {}", dir.display());
        file_config.data_dir = Some(dir);
        file_config.save_to(path)?;
    }
    Ok(file_config.with_data_dir_override(data_dir_override))
}
