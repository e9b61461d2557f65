//! Cross-collection entry listings.
//!
//! The parameter set mirrors what a relationship picker or control-panel
//! listing sends: an optional search term, collection and site filters, a
//! sort column and direction, and pagination. When the listing targets a
//! single collection with a configured search index, the term goes through
//! that index; an unavailable index degrades to a title substring match
//! rather than failing the listing.

use crate::error::{LoamError, Result};
use crate::model::{Entry, SortDirection};
use crate::query::{Operator, Paginated};
use crate::repo::ContentRepository;
use crate::store::ContentStore;
use serde_json::Value;

const DEFAULT_PER_PAGE: usize = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub sort: String,
    pub order: SortDirection,
    /// Restrict to these collections; empty means all.
    pub collections: Vec<String>,
    pub search: Option<String>,
    pub site: Option<String>,
    pub per_page: usize,
    pub page: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            sort: "title".to_string(),
            order: SortDirection::Asc,
            collections: Vec::new(),
            search: None,
            site: None,
            per_page: DEFAULT_PER_PAGE,
            page: 1,
        }
    }
}

impl ListParams {
    pub fn with_sort(mut self, sort: impl Into<String>, order: SortDirection) -> Self {
        self.sort = sort.into();
        self.order = order;
        self
    }

    pub fn with_collections(mut self, collections: Vec<String>) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn with_page(mut self, per_page: usize, page: usize) -> Self {
        self.per_page = per_page;
        self.page = page;
        self
    }
}

/// Run a listing. Filters apply as a conjunction; the search term narrows
/// before collection and site filters do. The repository is mutable because
/// index resolution memoizes inside its [`IndexManager`](crate::search::IndexManager).
pub fn list_entries<S: ContentStore>(
    repo: &mut ContentRepository<S>,
    params: &ListParams,
) -> Result<Paginated<Entry>> {
    let mut query = repo.query_entries()?;

    if let Some(term) = &params.search {
        query = match indexed_ids(repo, params, term) {
            Ok(Some(ids)) => query.where_in("id", ids),
            // No usable index, or the index's backend is unreachable:
            // degrade to a title substring match.
            Ok(None) | Err(LoamError::SearchUnavailable(_)) => {
                query.where_("title", Operator::Like, format!("%{term}%"))
            }
            Err(other) => return Err(other),
        };
    }

    if !params.collections.is_empty() {
        let handles = params
            .collections
            .iter()
            .map(|handle| Value::String(handle.clone()))
            .collect();
        query = query.where_in("collection", handles);
    }

    if let Some(site) = &params.site {
        query = query.where_("site", Operator::Eq, site.as_str());
    }

    query = query.order_by(params.sort.clone(), params.order);
    Ok(query.paginate(params.per_page, params.page))
}

/// Entry ids matching the term through a search index, when the listing
/// targets exactly one collection and that collection has one configured.
fn indexed_ids<S: ContentStore>(
    repo: &mut ContentRepository<S>,
    params: &ListParams,
    term: &str,
) -> Result<Option<Vec<Value>>> {
    let [handle] = params.collections.as_slice() else {
        return Ok(None);
    };
    let Some(collection) = repo.collection(handle)? else {
        return Ok(None);
    };
    let Some(index_name) = collection.search_index() else {
        return Ok(None);
    };
    let index_name = index_name.to_string();

    let hits = repo.indexes_mut().index(Some(&index_name))?.search(term)?;
    Ok(Some(
        hits.into_iter()
            .map(|hit| Value::String(hit.id))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoamConfig;
    use crate::search::{SearchHit, SearchIndex, SearchItem};
    use crate::store::memory::InMemoryStore;
    use serde_json::json;

    fn repo_with_entries(config: &LoamConfig) -> ContentRepository<InMemoryStore> {
        let mut repo = ContentRepository::new(InMemoryStore::new(), config).unwrap();

        let blog = repo.make_collection("blog");
        let pages = repo.make_collection("pages");
        repo.save_collection(&blog).unwrap();
        repo.save_collection(&pages).unwrap();

        repo.save_entry(&Entry::new("blog", "default", "rust-intro", "Rust Introduction"))
            .unwrap();
        repo.save_entry(&Entry::new("blog", "default", "yaml-tips", "Yaml Tips"))
            .unwrap();
        repo.save_entry(&Entry::new("pages", "default", "about", "About Us"))
            .unwrap();
        repo
    }

    fn config_with_index(name: &str, driver: &str) -> LoamConfig {
        let mut config = LoamConfig::default();
        config.search.indexes.insert(
            name.to_string(),
            [("driver".to_string(), json!(driver))].into_iter().collect(),
        );
        config
    }

    #[test]
    fn filters_by_collection_and_sorts() {
        let mut repo = repo_with_entries(&LoamConfig::default());

        let params = ListParams::default()
            .with_collections(vec!["blog".to_string()])
            .with_sort("title", SortDirection::Desc);
        let page = list_entries(&mut repo, &params).unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].slug, "yaml-tips");
        assert_eq!(page.items[1].slug, "rust-intro");
    }

    #[test]
    fn search_without_an_index_matches_titles() {
        let mut repo = repo_with_entries(&LoamConfig::default());

        let params = ListParams::default().with_search("rust");
        let page = list_entries(&mut repo, &params).unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "rust-intro");
    }

    #[test]
    fn search_goes_through_the_collection_index() {
        let config = config_with_index("default", "local");
        let mut repo = repo_with_entries(&config);

        let mut blog = repo.collection("blog").unwrap().unwrap();
        blog.set_search_index("default");
        repo.save_collection(&blog).unwrap();

        // Re-saving routes each entry into the now-configured index.
        for entry in repo.entries("blog").unwrap() {
            repo.save_entry(&entry).unwrap();
        }

        let params = ListParams::default()
            .with_collections(vec!["blog".to_string()])
            .with_search("yaml");
        let page = list_entries(&mut repo, &params).unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "yaml-tips");
    }

    #[test]
    fn unreachable_index_falls_back_to_title_match() {
        struct DownIndex;
        impl SearchIndex for DownIndex {
            fn name(&self) -> &str {
                "down"
            }
            fn exists(&self) -> bool {
                false
            }
            fn clear(&mut self) -> crate::error::Result<()> {
                Ok(())
            }
            fn update(&mut self, _item: &SearchItem) -> crate::error::Result<()> {
                Ok(())
            }
            fn delete(&mut self, _id: &str) -> crate::error::Result<()> {
                Ok(())
            }
            fn search(&self, _query: &str) -> crate::error::Result<Vec<SearchHit>> {
                Err(LoamError::SearchUnavailable("down".to_string()))
            }
        }

        let config = config_with_index("down", "down");
        let mut repo = repo_with_entries(&config);
        repo.indexes_mut().extend("down", |_, _| Ok(Box::new(DownIndex)));

        let mut blog = repo.collection("blog").unwrap().unwrap();
        blog.set_search_index("down");
        repo.save_collection(&blog).unwrap();

        let params = ListParams::default()
            .with_collections(vec!["blog".to_string()])
            .with_search("rust");
        let page = list_entries(&mut repo, &params).unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "rust-intro");
    }

    #[test]
    fn site_filter_and_pagination() {
        let mut repo = repo_with_entries(&LoamConfig::default());
        repo.save_entry(&Entry::new("blog", "fr", "bonjour", "Bonjour"))
            .unwrap();

        let params = ListParams::default().with_site("default").with_page(2, 1);
        let page = list_entries(&mut repo, &params).unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more_pages());
    }
}
