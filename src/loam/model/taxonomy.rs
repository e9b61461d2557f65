use crate::model::ucfirst;
use crate::sites::Sites;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A named grouping vocabulary (tags, categories) that collections can be
/// associated with. Only the container is modeled here; terms live behind
/// the repository contract like entries do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    handle: String,
    title: Option<String>,
    sites: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxonomyFileData {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sites: Option<Vec<String>>,
}

impl Taxonomy {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            title: None,
            sites: None,
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| ucfirst(&self.handle))
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn sites(&self, registry: &Sites) -> Vec<String> {
        match &self.sites {
            Some(sites) if registry.has_multiple() && !sites.is_empty() => sites.clone(),
            _ => vec![registry.default_site().to_string()],
        }
    }

    pub fn set_sites(&mut self, sites: Vec<String>) -> &mut Self {
        self.sites = Some(sites);
        self
    }

    pub fn path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.yaml", self.handle))
    }

    pub fn file_data(&self, registry: &Sites) -> TaxonomyFileData {
        TaxonomyFileData {
            title: self.title(),
            sites: if registry.has_multiple() {
                self.sites.clone()
            } else {
                None
            },
        }
    }

    pub(crate) fn from_file_data(handle: &str, data: TaxonomyFileData) -> Self {
        Self {
            handle: handle.to_string(),
            title: Some(data.title),
            sites: data.sites,
        }
    }
}
