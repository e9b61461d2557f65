//! # Search indexing
//!
//! Named indexes are resolved once by the [`IndexManager`] from layered
//! configuration (`defaults` < per-driver `drivers` < per-index `indexes`,
//! later keys win) and dispatched on a `driver` discriminator through a
//! registry of factory closures. An unknown index or driver is a fatal
//! configuration error at resolution time, never deferred.
//!
//! Two drivers ship with the crate: [`local::LocalIndex`], an in-process
//! inverted index persisted as a YAML sidecar, and [`remote::RemoteIndex`],
//! which delegates to an external service behind the
//! [`remote::SearchClient`] seam. Additional drivers register through
//! [`IndexManager::extend`].

use crate::error::{LoamError, Result};
use crate::model::Entry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

pub mod local;
pub mod remote;

/// Merged driver configuration: a plain JSON object.
pub type DriverConfig = serde_json::Map<String, Value>;

/// Search configuration layers as they appear in
/// [`LoamConfig`](crate::config::LoamConfig).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Name of the index used when none is given.
    #[serde(default = "default_index_name")]
    pub default: String,

    /// Keys applied to every index.
    #[serde(default)]
    pub defaults: DriverConfig,

    /// Keys applied to every index of one driver.
    #[serde(default)]
    pub drivers: HashMap<String, DriverConfig>,

    /// Per-index configuration; the `driver` key selects the variant.
    #[serde(default)]
    pub indexes: HashMap<String, DriverConfig>,
}

fn default_index_name() -> String {
    "default".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default: default_index_name(),
            defaults: DriverConfig::new(),
            drivers: HashMap::new(),
            indexes: HashMap::new(),
        }
    }
}

/// A document handed to an index: id plus flattened searchable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchItem {
    pub id: String,
    pub fields: BTreeMap<String, String>,
}

impl SearchItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Project an entry into a searchable item: builtin text fields plus
    /// any string values in the data map.
    pub fn from_entry(entry: &Entry) -> Self {
        let mut item = SearchItem::new(entry.id.to_string())
            .with_field("title", entry.title.clone())
            .with_field("slug", entry.slug.clone())
            .with_field("collection", entry.collection.clone());
        for (key, value) in &entry.data {
            if let Value::String(s) = value {
                item.fields.insert(key.clone(), s.clone());
            }
        }
        item
    }
}

/// One ranked result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
}

/// Uniform contract over both driver variants.
pub trait SearchIndex {
    fn name(&self) -> &str;
    fn exists(&self) -> bool;
    fn clear(&mut self) -> Result<()>;
    fn update(&mut self, item: &SearchItem) -> Result<()>;
    fn delete(&mut self, id: &str) -> Result<()>;
    /// Ranked ids, best first. Remote failures surface as
    /// [`LoamError::SearchUnavailable`]; callers degrade gracefully.
    fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

type DriverFactory = Box<dyn Fn(&str, &DriverConfig) -> Result<Box<dyn SearchIndex>>>;

pub struct IndexManager {
    config: SearchConfig,
    factories: HashMap<String, DriverFactory>,
    resolved: HashMap<String, Box<dyn SearchIndex>>,
}

impl IndexManager {
    pub fn new(config: SearchConfig) -> Self {
        let mut manager = Self {
            config,
            factories: HashMap::new(),
            resolved: HashMap::new(),
        };
        manager.extend("local", |name, config| {
            Ok(Box::new(local::LocalIndex::new(name, config)?))
        });
        manager
    }

    /// Wire the remote driver to a service client. Indexes declaring
    /// `driver: remote` fail resolution until this is called.
    pub fn register_remote(&mut self, client: std::sync::Arc<dyn remote::SearchClient>) {
        self.extend("remote", move |name, config| {
            Ok(Box::new(remote::RemoteIndex::new(
                name,
                config,
                std::sync::Arc::clone(&client),
            )))
        });
    }

    /// Register a driver factory. Used for the builtin drivers, the remote
    /// client wiring, and pluggability in tests.
    pub fn extend<F>(&mut self, driver: impl Into<String>, factory: F)
    where
        F: Fn(&str, &DriverConfig) -> Result<Box<dyn SearchIndex>> + 'static,
    {
        self.factories.insert(driver.into(), Box::new(factory));
    }

    /// Resolve an index by name (the configured default when `None`),
    /// memoized per name.
    pub fn index(&mut self, name: Option<&str>) -> Result<&mut Box<dyn SearchIndex>> {
        let name = name.unwrap_or(&self.config.default).to_string();

        if !self.resolved.contains_key(&name) {
            let index = self.resolve(&name)?;
            self.resolved.insert(name.clone(), index);
        }

        self.resolved
            .get_mut(&name)
            .ok_or_else(|| LoamError::Config(format!("Search index [{name}] is not defined")))
    }

    /// Resolve every configured index, returning the names.
    pub fn all(&mut self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.config.indexes.keys().cloned().collect();
        names.sort();
        for name in &names {
            self.index(Some(name))?;
        }
        Ok(names)
    }

    pub fn index_exists(&mut self, name: Option<&str>) -> Result<bool> {
        Ok(self.index(name)?.exists())
    }

    pub fn clear_index(&mut self, name: Option<&str>) -> Result<()> {
        self.index(name)?.clear()
    }

    fn resolve(&self, name: &str) -> Result<Box<dyn SearchIndex>> {
        let index_config = self
            .config
            .indexes
            .get(name)
            .ok_or_else(|| LoamError::Config(format!("Search index [{name}] is not defined")))?;

        let driver = index_config
            .get("driver")
            .and_then(Value::as_str)
            .unwrap_or("local")
            .to_string();

        let merged = self.merged_config(&driver, index_config);

        let factory = self.factories.get(&driver).ok_or_else(|| {
            LoamError::Config(format!("Driver [{driver}] in index [{name}] is invalid"))
        })?;

        factory(name, &merged)
    }

    /// `defaults` < `drivers[driver]` < the index's own keys.
    fn merged_config(&self, driver: &str, index_config: &DriverConfig) -> DriverConfig {
        let mut merged = self.config.defaults.clone();
        if let Some(driver_defaults) = self.config.drivers.get(driver) {
            for (key, value) in driver_defaults {
                merged.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in index_config {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}
