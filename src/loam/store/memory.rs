use super::ContentStore;
use crate::error::Result;
use crate::model::{CollectionFileData, Entry, GlobalSetFileData, TaxonomyFileData, Variables};
use std::collections::BTreeMap;
use uuid::Uuid;

/// In-memory store for tests. Entries keep insertion order; an entry saved
/// again under the same id is replaced in place, so the order the query
/// builder's stable sort falls back to is predictable.
#[derive(Default)]
pub struct InMemoryStore {
    collections: BTreeMap<String, CollectionFileData>,
    global_sets: BTreeMap<String, GlobalSetFileData>,
    variables: BTreeMap<(String, String), Variables>,
    taxonomies: BTreeMap<String, TaxonomyFileData>,
    entries: Vec<Entry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentStore for InMemoryStore {
    fn save_collection(&mut self, handle: &str, data: &CollectionFileData) -> Result<()> {
        self.collections.insert(handle.to_string(), data.clone());
        Ok(())
    }

    fn load_collection(&self, handle: &str) -> Result<Option<CollectionFileData>> {
        Ok(self.collections.get(handle).cloned())
    }

    fn delete_collection(&mut self, handle: &str) -> Result<()> {
        self.collections.remove(handle);
        self.entries.retain(|e| e.collection != handle);
        Ok(())
    }

    fn list_collections(&self) -> Result<Vec<String>> {
        Ok(self.collections.keys().cloned().collect())
    }

    fn save_global_set(&mut self, handle: &str, data: &GlobalSetFileData) -> Result<()> {
        self.global_sets.insert(handle.to_string(), data.clone());
        Ok(())
    }

    fn load_global_set(&self, handle: &str) -> Result<Option<GlobalSetFileData>> {
        Ok(self.global_sets.get(handle).cloned())
    }

    fn delete_global_set(&mut self, handle: &str) -> Result<()> {
        self.global_sets.remove(handle);
        Ok(())
    }

    fn list_global_sets(&self) -> Result<Vec<String>> {
        Ok(self.global_sets.keys().cloned().collect())
    }

    fn save_variables(&mut self, variables: &Variables) -> Result<()> {
        let key = (
            variables.global_set().to_string(),
            variables.site().to_string(),
        );
        self.variables.insert(key, variables.clone());
        Ok(())
    }

    fn load_variables(&self, handle: &str, site: &str) -> Result<Option<Variables>> {
        Ok(self
            .variables
            .get(&(handle.to_string(), site.to_string()))
            .cloned())
    }

    fn delete_variables(&mut self, handle: &str, site: &str) -> Result<()> {
        self.variables
            .remove(&(handle.to_string(), site.to_string()));
        Ok(())
    }

    fn save_taxonomy(&mut self, handle: &str, data: &TaxonomyFileData) -> Result<()> {
        self.taxonomies.insert(handle.to_string(), data.clone());
        Ok(())
    }

    fn load_taxonomy(&self, handle: &str) -> Result<Option<TaxonomyFileData>> {
        Ok(self.taxonomies.get(handle).cloned())
    }

    fn delete_taxonomy(&mut self, handle: &str) -> Result<()> {
        self.taxonomies.remove(handle);
        Ok(())
    }

    fn list_taxonomies(&self) -> Result<Vec<String>> {
        Ok(self.taxonomies.keys().cloned().collect())
    }

    fn save_entry(&mut self, entry: &Entry) -> Result<()> {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.id == entry.id) {
            *existing = entry.clone();
        } else {
            self.entries.push(entry.clone());
        }
        Ok(())
    }

    fn load_entry(&self, id: &Uuid) -> Result<Option<Entry>> {
        Ok(self.entries.iter().find(|e| &e.id == id).cloned())
    }

    fn delete_entry(&mut self, id: &Uuid) -> Result<()> {
        self.entries.retain(|e| &e.id != id);
        Ok(())
    }

    fn list_entries(&self, collection: &str) -> Result<Vec<Entry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.collection == collection)
            .cloned()
            .collect())
    }

    fn all_entries(&self) -> Result<Vec<Entry>> {
        Ok(self.entries.clone())
    }
}
