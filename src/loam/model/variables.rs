use crate::model::remove_null_values;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One site's data payload within a global set.
///
/// Owned by exactly one [`GlobalSet`](crate::model::GlobalSet); the parent
/// is referenced by handle. In multi-site installations each Variables
/// persists its own companion record (`{site}/{set_handle}.yaml`); the
/// parent set only persists its own metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Variables {
    set_handle: String,
    site: String,

    #[serde(default)]
    data: BTreeMap<String, Value>,
}

impl Variables {
    pub fn new(set_handle: impl Into<String>, site: impl Into<String>) -> Self {
        Self {
            set_handle: set_handle.into(),
            site: site.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn global_set(&self) -> &str {
        &self.set_handle
    }

    pub(crate) fn attach_to(&mut self, set_handle: &str) {
        self.set_handle = set_handle.to_string();
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }

    pub fn with_data(mut self, data: BTreeMap<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn set_data(&mut self, data: BTreeMap<String, Value>) -> &mut Self {
        self.data = data;
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Deterministic path under the globals directory; no I/O.
    pub fn path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.site).join(format!("{}.yaml", self.set_handle))
    }

    /// Persistable projection: the data map with null values removed.
    pub fn file_data(&self) -> BTreeMap<String, Value> {
        remove_null_values(&self.data)
    }
}
