use crate::error::{LoamError, Result};
use crate::search::SearchConfig;
use crate::sites::SitesConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "loam.json";
const DEFAULT_CONTENT_DIR: &str = "content";

/// Installation-wide configuration, stored as `loam.json` next to the
/// content tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoamConfig {
    /// Directory holding the flat-file content tree, relative to the
    /// config directory unless absolute.
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    #[serde(default)]
    pub sites: SitesConfig,

    /// Global switch for AMP output; collections opt in individually.
    #[serde(default)]
    pub amp_enabled: bool,

    /// Global switch for revisions; collections opt in individually.
    #[serde(default)]
    pub revisions_enabled: bool,

    #[serde(default)]
    pub search: SearchConfig,
}

fn default_content_dir() -> String {
    DEFAULT_CONTENT_DIR.to_string()
}

impl Default for LoamConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            sites: SitesConfig::default(),
            amp_enabled: false,
            revisions_enabled: false,
            search: SearchConfig::default(),
        }
    }
}

impl LoamConfig {
    /// Load config from the given directory, or return defaults if not found.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(LoamError::Io)?;
        let config: LoamConfig = serde_json::from_str(&content).map_err(LoamError::Json)?;
        Ok(config)
    }

    /// Save config to the given directory.
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(LoamError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(LoamError::Json)?;
        fs::write(config_path, content).map_err(LoamError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = LoamConfig::default();
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.sites.default, "default");
        assert!(!config.amp_enabled);
    }

    #[test]
    fn load_missing_config_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let config = LoamConfig::load(dir.path()).unwrap();
        assert_eq!(config, LoamConfig::default());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();

        let mut config = LoamConfig::default();
        config.sites = SitesConfig {
            default: "en".to_string(),
            sites: vec!["en".to_string(), "fr".to_string()],
        };
        config.amp_enabled = true;
        config.save(dir.path()).unwrap();

        let loaded = LoamConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"amp_enabled": true}"#).unwrap();

        let config = LoamConfig::load(dir.path()).unwrap();
        assert!(config.amp_enabled);
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.search.default, "default");
    }
}
