//! Site registry: the ordered set of sites content can be localized into.
//!
//! This is an explicit app-context object constructed from configuration,
//! not a global singleton, so tests can build isolated registries.

use crate::error::{LoamError, Result};
use serde::{Deserialize, Serialize};

/// Site configuration as it appears in [`LoamConfig`](crate::config::LoamConfig).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SitesConfig {
    /// Handle of the default site.
    #[serde(default = "default_site_handle")]
    pub default: String,

    /// All site handles, in display order. Must contain `default`.
    #[serde(default = "default_site_list")]
    pub sites: Vec<String>,
}

fn default_site_handle() -> String {
    "default".to_string()
}

fn default_site_list() -> Vec<String> {
    vec!["default".to_string()]
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            default: default_site_handle(),
            sites: default_site_list(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sites {
    ordered: Vec<String>,
    default: String,
    current: String,
}

impl Sites {
    pub fn new(config: &SitesConfig) -> Result<Self> {
        if !config.sites.contains(&config.default) {
            return Err(LoamError::Config(format!(
                "Default site [{}] is not in the site list",
                config.default
            )));
        }
        Ok(Self {
            ordered: config.sites.clone(),
            default: config.default.clone(),
            current: config.default.clone(),
        })
    }

    /// Registry with a single site. Convenient for tests and single-site
    /// installations.
    pub fn single(handle: &str) -> Self {
        Self {
            ordered: vec![handle.to_string()],
            default: handle.to_string(),
            current: handle.to_string(),
        }
    }

    pub fn default_site(&self) -> &str {
        &self.default
    }

    pub fn all(&self) -> &[String] {
        &self.ordered
    }

    pub fn has_multiple(&self) -> bool {
        self.ordered.len() > 1
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn set_current(&mut self, handle: &str) -> Result<()> {
        if !self.ordered.iter().any(|s| s == handle) {
            return Err(LoamError::Config(format!("Site [{handle}] is not configured")));
        }
        self.current = handle.to_string();
        Ok(())
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.ordered.iter().any(|s| s == handle)
    }
}
