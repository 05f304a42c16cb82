//! Editor configuration from cinder.toml

use crate::autosave::Cadence;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default configuration file name
pub const CONFIG_FILE: &str = "cinder.toml";

/// Main configuration from cinder.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CinderConfig {
    /// Autosave timer periods
    pub autosave: AutosaveSettings,

    /// Where notes and drafts live
    pub storage: StorageSettings,
}

/// Autosave timer periods in milliseconds; `0` disables a timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveSettings {
    pub draft_interval_ms: u64,
    pub remote_interval_ms: u64,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            draft_interval_ms: 5_000,
            remote_interval_ms: 120_000,
        }
    }
}

impl AutosaveSettings {
    pub fn cadence(&self) -> Cadence {
        let period = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));
        Cadence {
            draft: period(self.draft_interval_ms),
            remote: period(self.remote_interval_ms),
        }
    }
}

/// Storage directories, relative to the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory of saved `<id>.md` notes
    pub notes_dir: PathBuf,

    /// Directory of `cinder_draft_<id>.json` drafts
    pub drafts_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from("notes"),
            drafts_dir: PathBuf::from(".cinder/drafts"),
        }
    }
}

impl StorageSettings {
    /// Resolve relative directories against `base`
    pub fn resolved(&self, base: &Path) -> Self {
        Self {
            notes_dir: base.join(&self.notes_dir),
            drafts_dir: base.join(&self.drafts_dir),
        }
    }
}

impl CinderConfig {
    /// Load configuration from a cinder.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(CinderConfig)` - Loaded configuration; defaults when the file does not exist
    /// * `Err(ConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a cinder.toml file
    ///
    /// # Parameters
    /// * `path` - Path where the configuration will be written
    ///
    /// # Returns
    /// * `Ok(())` - Successfully saved configuration
    /// * `Err(ConfigError)` - Error serializing or writing the configuration file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = CinderConfig {
            autosave: AutosaveSettings {
                draft_interval_ms: 1_000,
                remote_interval_ms: 0,
            },
            storage: StorageSettings {
                notes_dir: PathBuf::from("vault"),
                drafts_dir: PathBuf::from("vault/.drafts"),
            },
        };

        config.save(&path).unwrap();
        let loaded = CinderConfig::load(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CinderConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CinderConfig::default());
        assert_eq!(config.autosave.cadence(), Cadence::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: CinderConfig = toml::from_str("[autosave]\ndraft_interval_ms = 250\n").unwrap();
        assert_eq!(config.autosave.draft_interval_ms, 250);
        assert_eq!(config.autosave.remote_interval_ms, 120_000);
        assert_eq!(config.storage, StorageSettings::default());
    }

    #[test]
    fn test_zero_interval_disables_timer() {
        let settings = AutosaveSettings {
            draft_interval_ms: 0,
            remote_interval_ms: 30_000,
        };
        let cadence = settings.cadence();
        assert_eq!(cadence.draft, None);
        assert_eq!(cadence.remote, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[autosave\n").unwrap();
        assert!(matches!(CinderConfig::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_storage_resolved_against_base() {
        let resolved = StorageSettings::default().resolved(Path::new("/home/me"));
        assert_eq!(resolved.notes_dir, PathBuf::from("/home/me/notes"));
        assert_eq!(resolved.drafts_dir, PathBuf::from("/home/me/.cinder/drafts"));
    }
}
