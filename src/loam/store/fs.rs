use super::ContentStore;
use crate::error::{LoamError, Result};
use crate::model::{CollectionFileData, Entry, GlobalSetFileData, TaxonomyFileData, Variables};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const COLLECTIONS_DIR: &str = "collections";
const ENTRIES_DIR: &str = "entries";
const GLOBALS_DIR: &str = "globals";
const TAXONOMIES_DIR: &str = "taxonomies";

/// Flat-file store: one YAML record per entity under a content root.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collections_dir(&self) -> PathBuf {
        self.root.join(COLLECTIONS_DIR)
    }

    pub fn globals_dir(&self) -> PathBuf {
        self.root.join(GLOBALS_DIR)
    }

    pub fn taxonomies_dir(&self) -> PathBuf {
        self.root.join(TAXONOMIES_DIR)
    }

    fn entries_dir(&self, collection: &str) -> PathBuf {
        self.root.join(ENTRIES_DIR).join(collection)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(LoamError::Io)?;
        }
        Ok(())
    }

    fn write_record<T: Serialize>(&self, path: &Path, record: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent)?;
        }
        let content = serde_yaml::to_string(record).map_err(LoamError::Yaml)?;
        fs::write(path, content).map_err(LoamError::Io)?;
        Ok(())
    }

    fn read_record<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(LoamError::Io)?;
        let record = serde_yaml::from_str(&content).map_err(LoamError::Yaml)?;
        Ok(Some(record))
    }

    fn remove_record(&self, path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path).map_err(LoamError::Io)?;
        }
        Ok(())
    }

    /// Handles of the `.yaml` records directly inside `dir`, sorted.
    fn list_handles(&self, dir: &Path) -> Result<Vec<String>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut handles = Vec::new();
        for dir_entry in fs::read_dir(dir).map_err(LoamError::Io)? {
            let path = dir_entry.map_err(LoamError::Io)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                handles.push(stem.to_string());
            }
        }
        handles.sort();
        Ok(handles)
    }

    fn collection_path(&self, handle: &str) -> PathBuf {
        self.collections_dir().join(format!("{handle}.yaml"))
    }

    fn global_set_path(&self, handle: &str) -> PathBuf {
        self.globals_dir().join(format!("{handle}.yaml"))
    }

    fn variables_path(&self, handle: &str, site: &str) -> PathBuf {
        self.globals_dir().join(site).join(format!("{handle}.yaml"))
    }

    fn taxonomy_path(&self, handle: &str) -> PathBuf {
        self.taxonomies_dir().join(format!("{handle}.yaml"))
    }

    fn entry_path(&self, collection: &str, id: &Uuid) -> PathBuf {
        self.entries_dir(collection).join(format!("{id}.yaml"))
    }

    fn find_entry_path(&self, id: &Uuid) -> Result<Option<PathBuf>> {
        let entries_root = self.root.join(ENTRIES_DIR);
        if !entries_root.exists() {
            return Ok(None);
        }
        for dir_entry in fs::read_dir(&entries_root).map_err(LoamError::Io)? {
            let collection_dir = dir_entry.map_err(LoamError::Io)?.path();
            if !collection_dir.is_dir() {
                continue;
            }
            let candidate = collection_dir.join(format!("{id}.yaml"));
            if candidate.exists() {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

impl ContentStore for FileStore {
    fn save_collection(&mut self, handle: &str, data: &CollectionFileData) -> Result<()> {
        self.write_record(&self.collection_path(handle), data)
    }

    fn load_collection(&self, handle: &str) -> Result<Option<CollectionFileData>> {
        self.read_record(&self.collection_path(handle))
    }

    fn delete_collection(&mut self, handle: &str) -> Result<()> {
        self.remove_record(&self.collection_path(handle))?;
        // The entry directory goes with the record.
        let dir = self.entries_dir(handle);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(LoamError::Io)?;
        }
        Ok(())
    }

    fn list_collections(&self) -> Result<Vec<String>> {
        self.list_handles(&self.collections_dir())
    }

    fn save_global_set(&mut self, handle: &str, data: &GlobalSetFileData) -> Result<()> {
        self.write_record(&self.global_set_path(handle), data)
    }

    fn load_global_set(&self, handle: &str) -> Result<Option<GlobalSetFileData>> {
        self.read_record(&self.global_set_path(handle))
    }

    fn delete_global_set(&mut self, handle: &str) -> Result<()> {
        self.remove_record(&self.global_set_path(handle))
    }

    fn list_global_sets(&self) -> Result<Vec<String>> {
        self.list_handles(&self.globals_dir())
    }

    fn save_variables(&mut self, variables: &Variables) -> Result<()> {
        self.write_record(
            &self.variables_path(variables.global_set(), variables.site()),
            variables,
        )
    }

    fn load_variables(&self, handle: &str, site: &str) -> Result<Option<Variables>> {
        self.read_record(&self.variables_path(handle, site))
    }

    fn delete_variables(&mut self, handle: &str, site: &str) -> Result<()> {
        self.remove_record(&self.variables_path(handle, site))
    }

    fn save_taxonomy(&mut self, handle: &str, data: &TaxonomyFileData) -> Result<()> {
        self.write_record(&self.taxonomy_path(handle), data)
    }

    fn load_taxonomy(&self, handle: &str) -> Result<Option<TaxonomyFileData>> {
        self.read_record(&self.taxonomy_path(handle))
    }

    fn delete_taxonomy(&mut self, handle: &str) -> Result<()> {
        self.remove_record(&self.taxonomy_path(handle))
    }

    fn list_taxonomies(&self) -> Result<Vec<String>> {
        self.list_handles(&self.taxonomies_dir())
    }

    fn save_entry(&mut self, entry: &Entry) -> Result<()> {
        // An entry moved between collections must not leave a stale record.
        if let Some(existing) = self.find_entry_path(&entry.id)? {
            let target = self.entry_path(&entry.collection, &entry.id);
            if existing != target {
                self.remove_record(&existing)?;
            }
        }
        self.write_record(&self.entry_path(&entry.collection, &entry.id), entry)
    }

    fn load_entry(&self, id: &Uuid) -> Result<Option<Entry>> {
        match self.find_entry_path(id)? {
            Some(path) => self.read_record(&path),
            None => Ok(None),
        }
    }

    fn delete_entry(&mut self, id: &Uuid) -> Result<()> {
        if let Some(path) = self.find_entry_path(id)? {
            self.remove_record(&path)?;
        }
        Ok(())
    }

    fn list_entries(&self, collection: &str) -> Result<Vec<Entry>> {
        let dir = self.entries_dir(collection);
        let mut entries = Vec::new();
        for handle in self.list_handles(&dir)? {
            let path = dir.join(format!("{handle}.yaml"));
            if let Some(entry) = self.read_record::<Entry>(&path)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn all_entries(&self) -> Result<Vec<Entry>> {
        let entries_root = self.root.join(ENTRIES_DIR);
        if !entries_root.exists() {
            return Ok(Vec::new());
        }
        let mut collections = Vec::new();
        for dir_entry in fs::read_dir(&entries_root).map_err(LoamError::Io)? {
            let path = dir_entry.map_err(LoamError::Io)?.path();
            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    collections.push(name.to_string());
                }
            }
        }
        collections.sort();

        let mut entries = Vec::new();
        for collection in collections {
            entries.extend(self.list_entries(&collection)?);
        }
        Ok(entries)
    }
}
