//! # Content repository
//!
//! The coordination layer over a [`ContentStore`]: it owns the app-context
//! objects (site registry, blink cache, event bus) and implements the
//! lifecycle rules the stores stay ignorant of — creation events, cascading
//! deletes, and re-derivation of computed entry fields.
//!
//! Mutations go through the repository, never through entities: an entity is
//! a plain value until a `save_*` call persists it. `Created` events fire
//! only when the handle did not previously exist; every save also fires
//! `Saved`, in that order.

use crate::blink::{Blink, BlinkKey};
use crate::config::LoamConfig;
use crate::error::{LoamError, Result};
use crate::events::{Event, EventBus};
use crate::model::{
    Collection, CollectionStructure, Entry, FieldProcessor, GlobalSet, Taxonomy, Variables,
};
use crate::query::EntryQuery;
use crate::search::{IndexManager, SearchItem};
use crate::sites::Sites;
use crate::store::ContentStore;
use chrono::Datelike;
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

pub struct ContentRepository<S: ContentStore> {
    store: S,
    sites: Sites,
    blink: Blink,
    events: EventBus,
    indexes: IndexManager,
    amp_enabled: bool,
    revisions_enabled: bool,
}

impl<S: ContentStore> ContentRepository<S> {
    pub fn new(store: S, config: &LoamConfig) -> Result<Self> {
        Ok(Self {
            store,
            sites: Sites::new(&config.sites)?,
            blink: Blink::new(),
            events: EventBus::new(),
            indexes: IndexManager::new(config.search.clone()),
            amp_enabled: config.amp_enabled,
            revisions_enabled: config.revisions_enabled,
        })
    }

    pub fn sites(&self) -> &Sites {
        &self.sites
    }

    pub fn sites_mut(&mut self) -> &mut Sites {
        &mut self.sites
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// The search index manager. Mutable access is the seam for wiring the
    /// remote driver client and for registering custom drivers.
    pub fn indexes_mut(&mut self) -> &mut IndexManager {
        &mut self.indexes
    }

    pub fn amp_enabled(&self) -> bool {
        self.amp_enabled
    }

    pub fn revisions_enabled(&self) -> bool {
        self.revisions_enabled
    }

    /// Drop every memoized value. Call between units of work.
    pub fn flush_blink(&mut self) {
        self.blink.flush();
    }

    // ------------------------------------------------------------------
    // Collections

    pub fn make_collection(&self, handle: impl Into<String>) -> Collection {
        Collection::new(handle)
    }

    pub fn collection(&self, handle: &str) -> Result<Option<Collection>> {
        Ok(self
            .store
            .load_collection(handle)?
            .map(|data| Collection::from_file_data(handle, data)))
    }

    pub fn collection_exists(&self, handle: &str) -> Result<bool> {
        Ok(self.store.load_collection(handle)?.is_some())
    }

    /// Every collection, ordered by handle.
    pub fn collections(&self) -> Result<Vec<Collection>> {
        let mut collections = Vec::new();
        for handle in self.store.list_collections()? {
            if let Some(data) = self.store.load_collection(&handle)? {
                collections.push(Collection::from_file_data(&handle, data));
            }
        }
        Ok(collections)
    }

    /// Persist a collection. Fires `CollectionCreated` only when the handle
    /// was not in the store before this call, then `CollectionSaved`. Any
    /// memoized values derived from the collection are invalidated.
    pub fn save_collection(&mut self, collection: &Collection) -> Result<()> {
        let handle = collection.handle().to_string();
        let is_new = self.store.load_collection(&handle)?.is_none();

        self.store
            .save_collection(&handle, &collection.file_data(&self.sites))?;
        self.blink.flush_entity("collection", &handle);

        if is_new {
            self.events.dispatch(Event::CollectionCreated {
                handle: handle.clone(),
            });
        }
        self.events.dispatch(Event::CollectionSaved { handle });
        Ok(())
    }

    /// Delete a collection and everything it contains. Member entries go
    /// first so a failure part-way never leaves orphaned entries pointing at
    /// a missing collection record.
    pub fn delete_collection(&mut self, handle: &str) -> Result<()> {
        for entry in self.store.list_entries(handle)? {
            self.store.delete_entry(&entry.id)?;
            self.sync_index(&entry, false)?;
        }
        self.store.delete_collection(handle)?;
        self.blink.flush_entity("collection", handle);

        self.events.dispatch(Event::CollectionDeleted {
            handle: handle.to_string(),
        });
        Ok(())
    }

    /// The collection's structure, memoized under the blink cache so
    /// repeated resolution within one unit of work loads the record once.
    pub fn collection_structure(&mut self, handle: &str) -> Result<Option<CollectionStructure>> {
        let store = &self.store;
        self.blink.try_once(
            BlinkKey::new("collection", handle, "structure"),
            || {
                Ok(store
                    .load_collection(handle)?
                    .and_then(|data| Collection::from_file_data(handle, data).structure()))
            },
        )
    }

    // ------------------------------------------------------------------
    // Global sets

    pub fn make_global_set(&self, handle: impl Into<String>) -> GlobalSet {
        GlobalSet::new(handle)
    }

    /// Load a set with its localizations rebuilt: from the inline data in
    /// single-site installations, from per-site companion records otherwise.
    pub fn global_set(&self, handle: &str) -> Result<Option<GlobalSet>> {
        let Some(data) = self.store.load_global_set(handle)? else {
            return Ok(None);
        };
        let mut set = GlobalSet::from_file_data(handle, data, &self.sites);

        if self.sites.has_multiple() {
            for site in self.sites.all() {
                if let Some(variables) = self.store.load_variables(handle, site)? {
                    set.add_localization(variables);
                }
            }
        }
        Ok(Some(set))
    }

    pub fn global_sets(&self) -> Result<Vec<GlobalSet>> {
        let mut sets = Vec::new();
        for handle in self.store.list_global_sets()? {
            if let Some(set) = self.global_set(&handle)? {
                sets.push(set);
            }
        }
        Ok(sets)
    }

    /// Persist a set's own record. In single-site installations this carries
    /// the default site's data inline; in multi-site installations the
    /// localizations persist separately through
    /// [`save_variables`](Self::save_variables).
    pub fn save_global_set(&mut self, set: &GlobalSet) -> Result<()> {
        let handle = set.handle().to_string();
        self.store
            .save_global_set(&handle, &set.file_data(&self.sites))?;
        self.blink.flush_entity("global", &handle);

        self.events.dispatch(Event::GlobalSetSaved { handle });
        Ok(())
    }

    /// Delete a set and all of its localizations' companion records.
    pub fn delete_global_set(&mut self, handle: &str) -> Result<()> {
        for site in self.sites.all().to_vec() {
            self.store.delete_variables(handle, &site)?;
        }
        self.store.delete_global_set(handle)?;
        self.blink.flush_entity("global", handle);

        self.events.dispatch(Event::GlobalSetDeleted {
            handle: handle.to_string(),
        });
        Ok(())
    }

    pub fn save_variables(&mut self, variables: &Variables) -> Result<()> {
        self.store.save_variables(variables)?;
        self.blink.flush_entity("global", variables.global_set());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Taxonomies

    pub fn make_taxonomy(&self, handle: impl Into<String>) -> Taxonomy {
        Taxonomy::new(handle)
    }

    pub fn taxonomy(&self, handle: &str) -> Result<Option<Taxonomy>> {
        Ok(self
            .store
            .load_taxonomy(handle)?
            .map(|data| Taxonomy::from_file_data(handle, data)))
    }

    pub fn taxonomies(&self) -> Result<Vec<Taxonomy>> {
        let mut taxonomies = Vec::new();
        for handle in self.store.list_taxonomies()? {
            if let Some(data) = self.store.load_taxonomy(&handle)? {
                taxonomies.push(Taxonomy::from_file_data(&handle, data));
            }
        }
        Ok(taxonomies)
    }

    pub fn save_taxonomy(&mut self, taxonomy: &Taxonomy) -> Result<()> {
        let handle = taxonomy.handle().to_string();
        let is_new = self.store.load_taxonomy(&handle)?.is_none();

        self.store
            .save_taxonomy(&handle, &taxonomy.file_data(&self.sites))?;
        self.blink.flush_entity("taxonomy", &handle);

        if is_new {
            self.events.dispatch(Event::TaxonomyCreated {
                handle: handle.clone(),
            });
        }
        self.events.dispatch(Event::TaxonomySaved { handle });
        Ok(())
    }

    pub fn delete_taxonomy(&mut self, handle: &str) -> Result<()> {
        self.store.delete_taxonomy(handle)?;
        self.blink.flush_entity("taxonomy", handle);

        self.events.dispatch(Event::TaxonomyDeleted {
            handle: handle.to_string(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entries

    pub fn save_entry(&mut self, entry: &Entry) -> Result<()> {
        self.store.save_entry(entry)?;
        self.blink.flush_entity("collection", &entry.collection);
        self.sync_index(entry, true)
    }

    pub fn entry(&self, id: &Uuid) -> Result<Option<Entry>> {
        self.store.load_entry(id)
    }

    pub fn delete_entry(&mut self, id: &Uuid) -> Result<()> {
        if let Some(entry) = self.store.load_entry(id)? {
            self.blink.flush_entity("collection", &entry.collection);
            self.store.delete_entry(id)?;
            self.sync_index(&entry, false)?;
        }
        Ok(())
    }

    /// Opportunistic index maintenance: entries flow into their collection's
    /// configured index as they are saved and out as they are deleted. The
    /// entry is already persisted by the time this runs, so an unreachable
    /// backend is not fatal — the index catches up on the next write.
    fn sync_index(&mut self, entry: &Entry, keep: bool) -> Result<()> {
        let Some(data) = self.store.load_collection(&entry.collection)? else {
            return Ok(());
        };
        let collection = Collection::from_file_data(&entry.collection, data);
        let Some(name) = collection.search_index() else {
            return Ok(());
        };

        let index = self.indexes.index(Some(name))?;
        let result = if keep {
            index.update(&SearchItem::from_entry(entry))
        } else {
            index.delete(&entry.id.to_string())
        };
        match result {
            Err(LoamError::SearchUnavailable(_)) => Ok(()),
            other => other,
        }
    }

    pub fn entries(&self, collection: &str) -> Result<Vec<Entry>> {
        self.store.list_entries(collection)
    }

    /// Apply raw edited input to an entry through the blueprint seam and
    /// persist the result. Inputs are assumed validated by the (external)
    /// field-processing collaborator before they get here.
    pub fn save_entry_input(
        &mut self,
        entry: &mut Entry,
        raw: &BTreeMap<String, Value>,
        processor: &FieldProcessor,
    ) -> Result<()> {
        entry.data = (processor.process)(raw);
        self.save_entry(entry)
    }

    /// An entry's data pre-processed for an editing surface.
    pub fn entry_input(
        &self,
        id: &Uuid,
        processor: &FieldProcessor,
    ) -> Result<Option<BTreeMap<String, Value>>> {
        Ok(self
            .store
            .load_entry(id)?
            .map(|entry| (processor.pre_process)(&entry.data)))
    }

    /// Query over every entry in the store.
    pub fn query_entries(&self) -> Result<EntryQuery> {
        Ok(EntryQuery::new(self.store.all_entries()?))
    }

    /// Query scoped to one collection's entries.
    pub fn query_collection(&self, collection: &str) -> Result<EntryQuery> {
        Ok(EntryQuery::new(self.store.list_entries(collection)?))
    }

    /// Re-derive entry URIs from the collection's route pattern. Idempotent:
    /// running it twice changes nothing the second time. When `ids` is given
    /// only those entries are touched; otherwise the whole collection is
    /// processed. Entries whose site has no route pattern lose their URI.
    pub fn update_entry_uris(&mut self, collection: &str, ids: Option<&[Uuid]>) -> Result<()> {
        let Some(collection) = self.collection(collection)? else {
            return Ok(());
        };

        for mut entry in self.store.list_entries(collection.handle())? {
            if let Some(ids) = ids {
                if !ids.contains(&entry.id) {
                    continue;
                }
            }

            let uri = collection
                .route(&entry.site)
                .and_then(|pattern| expand_route(&pattern, &entry));

            if entry.uri != uri {
                entry.uri = uri;
                self.store.save_entry(&entry)?;
            }
        }
        Ok(())
    }

    /// Re-number entry order values to a dense 1..n sequence. With `ids`,
    /// the listed entries are numbered in the given sequence and everything
    /// else is left untouched. Without, the whole collection is renumbered
    /// keeping the existing relative order (unordered entries go last).
    pub fn update_entry_order(&mut self, collection: &str, ids: Option<&[Uuid]>) -> Result<()> {
        match ids {
            Some(ids) => {
                for (position, id) in ids.iter().enumerate() {
                    if let Some(mut entry) = self.store.load_entry(id)? {
                        entry.order = Some(position as u32 + 1);
                        self.store.save_entry(&entry)?;
                    }
                }
            }
            None => {
                let mut entries = self.store.list_entries(collection)?;
                entries.sort_by_key(|e| e.order.map_or(u32::MAX, |o| o));
                for (position, entry) in entries.iter_mut().enumerate() {
                    let order = Some(position as u32 + 1);
                    if entry.order != order {
                        entry.order = order;
                        self.store.save_entry(entry)?;
                    }
                }
            }
        }
        self.blink.flush_entity("collection", collection);
        Ok(())
    }
}

/// Substitute `{slug}`, `{year}`, `{month}` and `{day}` in a route pattern.
/// A pattern with date placeholders yields no URI for an undated entry.
fn expand_route(pattern: &str, entry: &Entry) -> Option<String> {
    let mut uri = pattern.replace("{slug}", &entry.slug);

    if uri.contains('{') {
        let date = entry.date?;
        uri = uri
            .replace("{year}", &format!("{:04}", date.year()))
            .replace("{month}", &format!("{:02}", date.month()))
            .replace("{day}", &format!("{:02}", date.day()));
    }
    Some(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Routes;
    use crate::sites::SitesConfig;
    use crate::store::memory::InMemoryStore;
    use serde_json::json;

    fn repo() -> ContentRepository<InMemoryStore> {
        ContentRepository::new(InMemoryStore::new(), &LoamConfig::default()).unwrap()
    }

    fn multi_site_repo() -> ContentRepository<InMemoryStore> {
        let mut config = LoamConfig::default();
        config.sites = SitesConfig {
            default: "en".to_string(),
            sites: vec!["en".to_string(), "fr".to_string()],
        };
        ContentRepository::new(InMemoryStore::new(), &config).unwrap()
    }

    #[test]
    fn first_save_fires_created_then_saved() {
        let mut repo = repo();
        let collection = repo.make_collection("blog");

        repo.save_collection(&collection).unwrap();
        repo.save_collection(&collection).unwrap();

        assert_eq!(
            repo.events().log(),
            &[
                Event::CollectionCreated {
                    handle: "blog".to_string()
                },
                Event::CollectionSaved {
                    handle: "blog".to_string()
                },
                Event::CollectionSaved {
                    handle: "blog".to_string()
                },
            ]
        );
    }

    #[test]
    fn collections_round_trip_through_the_store() {
        let mut repo = repo();
        let mut collection = repo.make_collection("blog");
        collection.set_title("The Blog").set_dated(true);
        repo.save_collection(&collection).unwrap();

        let loaded = repo.collection("blog").unwrap().unwrap();
        assert_eq!(loaded.title(), "The Blog");
        assert!(loaded.dated());
        assert!(repo.collection_exists("blog").unwrap());
        assert!(!repo.collection_exists("pages").unwrap());
    }

    #[test]
    fn deleting_a_collection_cascades_to_its_entries() {
        let mut repo = repo();
        let collection = repo.make_collection("blog");
        repo.save_collection(&collection).unwrap();

        let entry = Entry::new("blog", "default", "hello", "Hello");
        let id = entry.id;
        repo.save_entry(&entry).unwrap();

        repo.delete_collection("blog").unwrap();

        assert!(repo.collection("blog").unwrap().is_none());
        assert!(repo.entry(&id).unwrap().is_none());
        assert!(matches!(
            repo.events().log().last(),
            Some(Event::CollectionDeleted { handle }) if handle == "blog"
        ));
    }

    #[test]
    fn structure_resolution_is_memoized_until_the_collection_is_saved() {
        use crate::model::StructureContents;

        let mut repo = repo();
        let mut collection = repo.make_collection("pages");
        collection.set_structure_contents(Some(StructureContents {
            root: true,
            max_depth: Some(3),
        }));
        repo.save_collection(&collection).unwrap();

        let first = repo.collection_structure("pages").unwrap().unwrap();
        assert_eq!(first.max_depth(), Some(3));

        // Saving flushes the memoized structure; the next resolution sees
        // the new descriptor.
        collection.set_structure_contents(Some(StructureContents {
            root: true,
            max_depth: Some(5),
        }));
        repo.save_collection(&collection).unwrap();

        let second = repo.collection_structure("pages").unwrap().unwrap();
        assert_eq!(second.max_depth(), Some(5));
    }

    #[test]
    fn global_set_round_trips_inline_data_in_single_site() {
        let mut repo = repo();
        let mut set = repo.make_global_set("footer").with_title("Footer");
        let mut vars = set.make_localization("default");
        vars.set("copyright", json!("2026"));
        set.add_localization(vars);

        repo.save_global_set(&set).unwrap();

        let loaded = repo.global_set("footer").unwrap().unwrap();
        assert_eq!(loaded.title(), "Footer");
        assert_eq!(
            loaded.in_site("default").unwrap().get("copyright"),
            Some(&json!("2026"))
        );
    }

    #[test]
    fn global_set_rebuilds_localizations_from_companion_records() {
        let mut repo = multi_site_repo();
        let set = repo.make_global_set("footer").with_title("Footer");
        repo.save_global_set(&set).unwrap();

        let mut en = set.make_localization("en");
        en.set("copyright", json!("2026"));
        let mut fr = set.make_localization("fr");
        fr.set("copyright", json!("© 2026"));
        repo.save_variables(&en).unwrap();
        repo.save_variables(&fr).unwrap();

        let loaded = repo.global_set("footer").unwrap().unwrap();
        assert_eq!(loaded.localizations().len(), 2);
        assert_eq!(
            loaded.in_site("fr").unwrap().get("copyright"),
            Some(&json!("© 2026"))
        );

        repo.delete_global_set("footer").unwrap();
        assert!(repo.global_set("footer").unwrap().is_none());
    }

    #[test]
    fn taxonomy_lifecycle_fires_events() {
        let mut repo = repo();
        let taxonomy = repo.make_taxonomy("tags");
        repo.save_taxonomy(&taxonomy).unwrap();
        repo.delete_taxonomy("tags").unwrap();

        assert_eq!(
            repo.events().log(),
            &[
                Event::TaxonomyCreated {
                    handle: "tags".to_string()
                },
                Event::TaxonomySaved {
                    handle: "tags".to_string()
                },
                Event::TaxonomyDeleted {
                    handle: "tags".to_string()
                },
            ]
        );
    }

    #[test]
    fn uris_derive_from_the_route_pattern() {
        let mut repo = repo();
        let mut collection = repo.make_collection("blog");
        collection
            .set_dated(true)
            .set_routes(Routes::Single("/blog/{year}/{month}/{slug}".to_string()));
        repo.save_collection(&collection).unwrap();

        let dated = Entry::new("blog", "default", "hello", "Hello")
            .with_date("2026-03-15T00:00:00Z".parse().unwrap());
        let undated = Entry::new("blog", "default", "draft", "Draft");
        let dated_id = dated.id;
        let undated_id = undated.id;
        repo.save_entry(&dated).unwrap();
        repo.save_entry(&undated).unwrap();

        repo.update_entry_uris("blog", None).unwrap();

        assert_eq!(
            repo.entry(&dated_id).unwrap().unwrap().uri.as_deref(),
            Some("/blog/2026/03/hello")
        );
        // Date placeholders cannot resolve without a date.
        assert_eq!(repo.entry(&undated_id).unwrap().unwrap().uri, None);

        // Running it again is a no-op.
        repo.update_entry_uris("blog", None).unwrap();
        assert_eq!(
            repo.entry(&dated_id).unwrap().unwrap().uri.as_deref(),
            Some("/blog/2026/03/hello")
        );
    }

    #[test]
    fn uri_update_with_a_subset_leaves_other_entries_untouched() {
        let mut repo = repo();
        let mut collection = repo.make_collection("pages");
        collection.set_routes(Routes::Single("/{slug}".to_string()));
        repo.save_collection(&collection).unwrap();

        let a = Entry::new("pages", "default", "about", "About");
        let b = Entry::new("pages", "default", "contact", "Contact");
        let a_id = a.id;
        let b_id = b.id;
        repo.save_entry(&a).unwrap();
        repo.save_entry(&b).unwrap();

        repo.update_entry_uris("pages", Some(&[a_id])).unwrap();

        assert_eq!(
            repo.entry(&a_id).unwrap().unwrap().uri.as_deref(),
            Some("/about")
        );
        assert_eq!(repo.entry(&b_id).unwrap().unwrap().uri, None);
    }

    #[test]
    fn order_update_renumbers_the_whole_collection() {
        let mut repo = repo();
        let pages = repo.make_collection("pages");
        repo.save_collection(&pages).unwrap();

        let mut a = Entry::new("pages", "default", "a", "A");
        a.order = Some(10);
        let mut b = Entry::new("pages", "default", "b", "B");
        b.order = Some(5);
        let c = Entry::new("pages", "default", "c", "C");
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        repo.save_entry(&a).unwrap();
        repo.save_entry(&b).unwrap();
        repo.save_entry(&c).unwrap();

        repo.update_entry_order("pages", None).unwrap();

        // Existing relative order is kept; unordered entries go last.
        assert_eq!(repo.entry(&b_id).unwrap().unwrap().order, Some(1));
        assert_eq!(repo.entry(&a_id).unwrap().unwrap().order, Some(2));
        assert_eq!(repo.entry(&c_id).unwrap().unwrap().order, Some(3));

        // A second run over an already-dense sequence changes nothing.
        repo.update_entry_order("pages", None).unwrap();
        assert_eq!(repo.entry(&b_id).unwrap().unwrap().order, Some(1));
        assert_eq!(repo.entry(&a_id).unwrap().unwrap().order, Some(2));
        assert_eq!(repo.entry(&c_id).unwrap().unwrap().order, Some(3));
    }

    #[test]
    fn order_update_with_a_subset_follows_the_given_sequence() {
        let mut repo = repo();
        let pages = repo.make_collection("pages");
        repo.save_collection(&pages).unwrap();

        let mut a = Entry::new("pages", "default", "a", "A");
        a.order = Some(7);
        let b = Entry::new("pages", "default", "b", "B");
        let c = Entry::new("pages", "default", "c", "C");
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);
        repo.save_entry(&a).unwrap();
        repo.save_entry(&b).unwrap();
        repo.save_entry(&c).unwrap();

        repo.update_entry_order("pages", Some(&[c_id, b_id])).unwrap();

        assert_eq!(repo.entry(&c_id).unwrap().unwrap().order, Some(1));
        assert_eq!(repo.entry(&b_id).unwrap().unwrap().order, Some(2));
        // Not named, not touched.
        assert_eq!(repo.entry(&a_id).unwrap().unwrap().order, Some(7));
    }

    #[test]
    fn saved_entries_flow_into_the_collection_index() {
        let mut config = LoamConfig::default();
        config.search.indexes.insert(
            "default".to_string(),
            [("driver".to_string(), json!("local"))].into_iter().collect(),
        );
        let mut repo = ContentRepository::new(InMemoryStore::new(), &config).unwrap();

        let mut blog = repo.make_collection("blog");
        blog.set_search_index("default");
        repo.save_collection(&blog).unwrap();

        let entry = Entry::new("blog", "default", "rust-intro", "Rust Introduction");
        let id = entry.id;
        repo.save_entry(&entry).unwrap();

        let hits = repo
            .indexes_mut()
            .index(Some("default"))
            .unwrap()
            .search("rust")
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, id.to_string());

        repo.delete_entry(&id).unwrap();
        let hits = repo
            .indexes_mut()
            .index(Some("default"))
            .unwrap()
            .search("rust")
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn entries_without_a_configured_index_save_cleanly() {
        let mut repo = repo();
        let blog = repo.make_collection("blog");
        repo.save_collection(&blog).unwrap();

        // No search_index on the collection, nothing to sync.
        repo.save_entry(&Entry::new("blog", "default", "hello", "Hello"))
            .unwrap();
        assert_eq!(repo.entries("blog").unwrap().len(), 1);
    }

    #[test]
    fn entry_input_goes_through_the_field_processor() {
        fn uppercase_strings(values: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
            values
                .iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) => json!(s.to_uppercase()),
                        other => other.clone(),
                    };
                    (k.clone(), v)
                })
                .collect()
        }

        let mut repo = repo();
        let blog = repo.make_collection("blog");
        repo.save_collection(&blog).unwrap();

        let processor = FieldProcessor {
            process: uppercase_strings,
            pre_process: uppercase_strings,
        };

        let mut entry = Entry::new("blog", "default", "hello", "Hello");
        let raw = [("author".to_string(), json!("jane"))].into_iter().collect();
        repo.save_entry_input(&mut entry, &raw, &processor).unwrap();

        let stored = repo.entry(&entry.id).unwrap().unwrap();
        assert_eq!(stored.data.get("author"), Some(&json!("JANE")));

        let identity = FieldProcessor::default();
        let input = repo.entry_input(&entry.id, &identity).unwrap().unwrap();
        assert_eq!(input.get("author"), Some(&json!("JANE")));
    }

    #[test]
    fn queries_see_saved_entries() {
        use crate::query::Operator;

        let mut repo = repo();
        let blog = repo.make_collection("blog");
        repo.save_collection(&blog).unwrap();
        repo.save_entry(&Entry::new("blog", "default", "one", "One"))
            .unwrap();
        repo.save_entry(&Entry::new("blog", "default", "two", "Two"))
            .unwrap();

        let count = repo
            .query_collection("blog")
            .unwrap()
            .where_("title", Operator::Eq, "One")
            .count();
        assert_eq!(count, 1);
        assert_eq!(repo.query_entries().unwrap().count(), 2);
    }
}
