//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory),
//! and picking the directory the run sheet is stored in.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use runsheet::{RunSheetError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for RunSheetError {
    fn from(err: ConfigError) -> Self {
        RunSheetError::Io(io::Error::other(err.to_string()))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "runsheet", "runsheet")
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (runsheet/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, RunSheetError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("runsheet/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = project_dirs() {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Returns the directory the run sheet is stored in.
///
/// The configured store path wins; otherwise the platform data directory
/// is used, and `.runsheet` in the working directory as a last resort.
pub fn store_dir(config: &AppConfig) -> PathBuf {
    if let Some(path) = config.store().path() {
        return path.clone();
    }
    match project_dirs() {
        Some(proj_dirs) => proj_dirs.data_dir().to_path_buf(),
        None => {
            debug!("Could not determine platform-specific data directory");
            PathBuf::from(".runsheet")
        }
    }
}

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, RunSheetError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_explicit_config_is_loaded() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[diagram]\ndouble_click_ms = 500\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.diagram().double_click(), Duration::from_millis(500));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let err = load_config(Some(temp_dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[service\nmodel = ").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_store_dir_prefers_configured_path() {
        let config = AppConfig::default().with_store_path("/srv/runsheet");
        assert_eq!(store_dir(&config), PathBuf::from("/srv/runsheet"));
    }
}
