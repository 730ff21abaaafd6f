use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "FREEROOMS_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one ICS file per group
    #[serde(default = "default_schedule_dir")]
    pub schedule_dir: PathBuf,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Offset from UTC applied to stored class times
    pub utc_offset_hours: i32,
    /// Abort a directory import at the first failing file
    #[serde(default)]
    pub stop_on_error: bool,
}

fn default_schedule_dir() -> PathBuf {
    PathBuf::from("schedules")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("freerooms.json") }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { utc_offset_hours: 3, stop_on_error: false }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule_dir: default_schedule_dir(),
            storage: StorageConfig::default(),
            import: ImportConfig::default(),
        }
    }
}

impl Config {
    /// Load from an explicit path, `FREEROOMS_CONFIG`, or the user config dir.
    /// The user config file is created with defaults when missing.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }

        let config_path = get_config_path()?;

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(&config_path)?;
            log::info!("Created default config at {}", config_path.display());
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "freerooms", "freerooms")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.schedule_dir, PathBuf::from("schedules"));
        assert_eq!(config.storage.path, PathBuf::from("freerooms.json"));
        assert_eq!(config.import.utc_offset_hours, 3);
        assert!(!config.import.stop_on_error);
    }

    #[test]
    fn test_config_save_load() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.schedule_dir = PathBuf::from("/srv/ics");
        config.import.stop_on_error = true;
        config.save_to(&config_path)?;

        let loaded = Config::load(Some(&config_path))?;
        assert_eq!(loaded, config);

        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "schedule_dir = \"ics\"\n")?;

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded.schedule_dir, PathBuf::from("ics"));
        assert_eq!(loaded.import, ImportConfig::default());
        assert_eq!(loaded.storage, StorageConfig::default());
        Ok(())
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let err = Config::load(Some(Path::new("/nonexistent/freerooms.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
