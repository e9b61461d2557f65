//! # Storage layer
//!
//! The [`ContentStore`] trait is the persistence boundary for the content
//! repository. Abstracting it keeps the repository and query layers
//! decoupled from the on-disk format and enables testing against
//! [`memory::InMemoryStore`] without a filesystem.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production flat-file storage, one YAML record per
//!   entity under a content root:
//!
//!   ```text
//!   content/
//!   ├── collections/
//!   │   └── blog.yaml
//!   ├── entries/
//!   │   └── blog/
//!   │       └── {id}.yaml
//!   ├── globals/
//!   │   ├── footer.yaml
//!   │   └── fr/footer.yaml        # per-site variables (multi-site)
//!   └── taxonomies/
//!       └── tags.yaml
//!   ```
//!
//! - [`memory::InMemoryStore`]: in-memory storage for tests; entries keep
//!   insertion order, which is the stable-sort baseline the query builder
//!   documents.
//!
//! ## Consistency contract
//!
//! Implementations must guarantee read-your-writes within one process: a
//! `save_*` is visible to every subsequent load in the same process.
//! Cross-process concurrent writers are unsupported — a known limitation of
//! this core, not of any particular backend.

use crate::error::Result;
use crate::model::{CollectionFileData, Entry, GlobalSetFileData, TaxonomyFileData, Variables};
use uuid::Uuid;

pub mod fs;
pub mod memory;

/// Abstract interface for content persistence. Handles are unique per
/// entity kind; lookups return `Ok(None)` when nothing matches.
pub trait ContentStore {
    fn save_collection(&mut self, handle: &str, data: &CollectionFileData) -> Result<()>;
    fn load_collection(&self, handle: &str) -> Result<Option<CollectionFileData>>;
    fn delete_collection(&mut self, handle: &str) -> Result<()>;
    /// All collection handles, sorted.
    fn list_collections(&self) -> Result<Vec<String>>;

    fn save_global_set(&mut self, handle: &str, data: &GlobalSetFileData) -> Result<()>;
    fn load_global_set(&self, handle: &str) -> Result<Option<GlobalSetFileData>>;
    fn delete_global_set(&mut self, handle: &str) -> Result<()>;
    fn list_global_sets(&self) -> Result<Vec<String>>;

    /// Persist one localization's companion record.
    fn save_variables(&mut self, variables: &Variables) -> Result<()>;
    fn load_variables(&self, handle: &str, site: &str) -> Result<Option<Variables>>;
    fn delete_variables(&mut self, handle: &str, site: &str) -> Result<()>;

    fn save_taxonomy(&mut self, handle: &str, data: &TaxonomyFileData) -> Result<()>;
    fn load_taxonomy(&self, handle: &str) -> Result<Option<TaxonomyFileData>>;
    fn delete_taxonomy(&mut self, handle: &str) -> Result<()>;
    fn list_taxonomies(&self) -> Result<Vec<String>>;

    fn save_entry(&mut self, entry: &Entry) -> Result<()>;
    fn load_entry(&self, id: &Uuid) -> Result<Option<Entry>>;
    fn delete_entry(&mut self, id: &Uuid) -> Result<()>;
    /// Entries of one collection, in the store's deterministic iteration
    /// order.
    fn list_entries(&self, collection: &str) -> Result<Vec<Entry>>;
    /// Every entry across all collections, same ordering guarantee.
    fn all_entries(&self) -> Result<Vec<Entry>>;
}
