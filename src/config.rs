use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the config looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "photo-date-updater.json";

/// Top-level configuration for the updater.
///
/// The tag priority tables and the supported-format list are fixed and not
/// part of the configuration.
///
/// # Loading
///
/// ```rust,no_run
/// use photo_date_updater::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("photo-date-updater.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.setfile.program = "/usr/bin/SetFile".into();
/// config.output.dry_run = true;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The creation-date utility.
    pub setfile: SetFileConfig,
    /// Walk and output behavior.
    pub output: OutputConfig,
}

/// Which program sets creation dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetFileConfig {
    /// Program name or absolute path, invoked as `<program> -d <date> <path>`.
    pub program: String,
}

/// Output and walk behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// If `true`, log what would change without touching any file.
    pub dry_run: bool,
    /// If `true`, process subdirectories too.
    pub recursive: bool,
}

impl Default for SetFileConfig {
    fn default() -> Self {
        Self {
            program: "SetFile".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            recursive: true,
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join(CONFIG_FILE_NAME))
    }

    /// Load config from the given path, or from the default location.
    ///
    /// A missing file is not an error: defaults are returned.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        log::debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testlog::{capture, logged};
    use log::Level;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.setfile.program, "SetFile");
        assert!(!config.output.dry_run);
        assert!(config.output.recursive);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(dir.path().join("absent.json").as_path())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_file_logs_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");

        let (config, records) = capture(|| Config::load(Some(path.as_path())));

        assert_eq!(config.unwrap(), Config::default());
        assert!(logged(&records, Level::Warn, "Config file not found"));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.setfile.program = "/usr/local/bin/SetFile".into();
        config.output.recursive = false;

        assert_eq!(config.save(Some(path.as_path())).unwrap(), path);
        assert_eq!(Config::load(Some(path.as_path())).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "output": { "dry_run": true } }"#).unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert!(config.output.dry_run);
        assert!(config.output.recursive);
        assert_eq!(config.setfile.program, "SetFile");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load(Some(path.as_path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
