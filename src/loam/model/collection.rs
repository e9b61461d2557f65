use crate::model::structure::{CollectionStructure, StructureContents};
use crate::model::ucfirst;
use crate::sites::Sites;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const DEFAULT_TEMPLATE: &str = "default";
pub const DEFAULT_LAYOUT: &str = "layout";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Visibility policy for entries whose date lies in the past or future.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateBehavior {
    #[default]
    Public,
    Private,
    Unlisted,
}

/// Route patterns: either one pattern for every site, or a per-site map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Routes {
    Single(String),
    PerSite(BTreeMap<String, String>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DateBehaviorPair {
    pub past: DateBehavior,
    pub future: DateBehavior,
}

/// A named content container.
///
/// Holds raw configured values; getters compute documented defaults
/// lazily. The handle is fixed at construction — it is the identity the
/// repository keys everything by. Anything requiring site context takes the
/// [`Sites`] registry as an argument rather than consulting global state.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    handle: String,
    title: Option<String>,
    routes: Option<Routes>,
    mount: Option<Uuid>,
    template: Option<String>,
    layout: Option<String>,
    sites: Option<Vec<String>>,
    blueprints: Vec<String>,
    search_index: Option<String>,
    dated: bool,
    sort_field: Option<String>,
    sort_direction: Option<SortDirection>,
    ampable: bool,
    revisions: bool,
    default_publish_state: bool,
    past_date_behavior: DateBehavior,
    future_date_behavior: DateBehavior,
    structure: Option<CollectionStructure>,
    structure_contents: Option<StructureContents>,
    taxonomies: Vec<String>,
    cascade: BTreeMap<String, Value>,
}

impl Collection {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            title: None,
            routes: None,
            mount: None,
            template: None,
            layout: None,
            sites: None,
            blueprints: Vec::new(),
            search_index: None,
            dated: false,
            sort_field: None,
            sort_direction: None,
            ampable: false,
            revisions: false,
            default_publish_state: true,
            past_date_behavior: DateBehavior::Public,
            future_date_behavior: DateBehavior::Public,
            structure: None,
            structure_contents: None,
            taxonomies: Vec::new(),
            cascade: BTreeMap::new(),
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// A collection's id is its handle.
    pub fn id(&self) -> &str {
        &self.handle
    }

    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| ucfirst(&self.handle))
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn template(&self) -> String {
        self.template
            .clone()
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string())
    }

    pub fn set_template(&mut self, template: impl Into<String>) -> &mut Self {
        self.template = Some(template.into());
        self
    }

    pub fn layout(&self) -> String {
        self.layout
            .clone()
            .unwrap_or_else(|| DEFAULT_LAYOUT.to_string())
    }

    pub fn set_layout(&mut self, layout: impl Into<String>) -> &mut Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn dated(&self) -> bool {
        self.dated
    }

    pub fn set_dated(&mut self, dated: bool) -> &mut Self {
        self.dated = dated;
        self
    }

    /// The sites this collection is available in. Single-site installations
    /// (and collections with no explicit list) collapse to the default site.
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

    /// Route pattern for one site. A single-string configuration applies to
    /// every site; a map is consulted per site.
    pub fn route(&self, site: &str) -> Option<String> {
        match &self.routes {
            Some(Routes::Single(route)) => Some(route.clone()),
            Some(Routes::PerSite(map)) => map.get(site).cloned(),
            None => None,
        }
    }

    pub fn routes_for(&self, registry: &Sites) -> BTreeMap<String, Option<String>> {
        self.sites(registry)
            .into_iter()
            .map(|site| {
                let route = self.route(&site);
                (site, route)
            })
            .collect()
    }

    pub fn set_routes(&mut self, routes: Routes) -> &mut Self {
        self.routes = Some(routes);
        self
    }

    pub fn mount(&self) -> Option<Uuid> {
        self.mount
    }

    pub fn set_mount(&mut self, mount: Option<Uuid>) -> &mut Self {
        self.mount = mount;
        self
    }

    pub fn blueprints(&self) -> &[String] {
        &self.blueprints
    }

    pub fn set_blueprints(&mut self, blueprints: Vec<String>) -> &mut Self {
        self.blueprints = blueprints;
        self
    }

    pub fn taxonomies(&self) -> &[String] {
        &self.taxonomies
    }

    pub fn set_taxonomies(&mut self, taxonomies: Vec<String>) -> &mut Self {
        self.taxonomies = taxonomies;
        self
    }

    /// Name of the search index configured for this collection, if any.
    /// Resolution to a live index happens through the
    /// [`IndexManager`](crate::search::IndexManager).
    pub fn search_index(&self) -> Option<&str> {
        self.search_index.as_deref()
    }

    pub fn has_search_index(&self) -> bool {
        self.search_index.is_some()
    }

    pub fn set_search_index(&mut self, index: impl Into<String>) -> &mut Self {
        self.search_index = Some(index.into());
        self
    }

    /// AMP output requires both the global switch and the per-collection
    /// flag.
    pub fn ampable(&self, amp_enabled: bool) -> bool {
        amp_enabled && self.ampable
    }

    pub fn set_ampable(&mut self, ampable: bool) -> &mut Self {
        self.ampable = ampable;
        self
    }

    pub fn revisions_enabled(&self, revisions_enabled: bool) -> bool {
        revisions_enabled && self.revisions
    }

    pub fn set_revisions(&mut self, revisions: bool) -> &mut Self {
        self.revisions = revisions;
        self
    }

    /// Working copies always start as drafts when revisions are in play.
    pub fn default_publish_state(&self, revisions_enabled: bool) -> bool {
        if self.revisions_enabled(revisions_enabled) {
            false
        } else {
            self.default_publish_state
        }
    }

    pub fn set_default_publish_state(&mut self, state: bool) -> &mut Self {
        self.default_publish_state = state;
        self
    }

    pub fn past_date_behavior(&self) -> DateBehavior {
        self.past_date_behavior
    }

    pub fn set_past_date_behavior(&mut self, behavior: DateBehavior) -> &mut Self {
        self.past_date_behavior = behavior;
        self
    }

    pub fn future_date_behavior(&self) -> DateBehavior {
        self.future_date_behavior
    }

    pub fn set_future_date_behavior(&mut self, behavior: DateBehavior) -> &mut Self {
        self.future_date_behavior = behavior;
        self
    }

    /// Sort field cascade: explicit field, then `order` for orderable
    /// collections, then `date` for dated ones, then `title`.
    pub fn sort_field(&self) -> String {
        if let Some(field) = &self.sort_field {
            return field.clone();
        }
        if self.orderable() {
            "order".to_string()
        } else if self.dated {
            "date".to_string()
        } else {
            "title".to_string()
        }
    }

    pub fn set_sort_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.sort_field = Some(field.into());
        self
    }

    /// Direction cascade: explicit, then ascending when a custom sort field
    /// is set (a dated collection would otherwise end up with a confusing
    /// descending custom field), then ascending for orderable, descending
    /// for dated, ascending otherwise.
    pub fn sort_direction(&self) -> SortDirection {
        if let Some(direction) = self.sort_direction {
            return direction;
        }
        if self.sort_field.is_some() || self.orderable() {
            SortDirection::Asc
        } else if self.dated {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) -> &mut Self {
        self.sort_direction = Some(direction);
        self
    }

    /// A collection is orderable iff its structure is a flat list (max
    /// depth of exactly 1).
    pub fn orderable(&self) -> bool {
        self.structure()
            .map(|s| s.max_depth() == Some(1))
            .unwrap_or(false)
    }

    pub fn has_structure(&self) -> bool {
        self.structure.is_some() || self.structure_contents.is_some()
    }

    /// The structure object, built lazily from the raw descriptor when one
    /// has not been set directly.
    pub fn structure(&self) -> Option<CollectionStructure> {
        if let Some(structure) = &self.structure {
            return Some(structure.clone());
        }
        self.structure_contents
            .as_ref()
            .map(|contents| CollectionStructure::from_contents(&self.handle, contents))
    }

    /// Setting a structure object claims it for this collection and
    /// invalidates the raw descriptor.
    pub fn set_structure(&mut self, structure: Option<CollectionStructure>) -> &mut Self {
        self.structure_contents = None;
        self.structure = structure.map(|mut s| {
            s.set_handle(&self.handle);
            s
        });
        self
    }

    pub fn structure_contents(&self) -> Option<StructureContents> {
        self.structure().map(|s| s.contents())
    }

    /// Setting the raw descriptor invalidates any built structure object;
    /// it will be rebuilt on the next [`structure`](Self::structure) call.
    pub fn set_structure_contents(&mut self, contents: Option<StructureContents>) -> &mut Self {
        self.structure = None;
        self.structure_contents = contents;
        self
    }

    pub fn cascade(&self) -> &BTreeMap<String, Value> {
        &self.cascade
    }

    pub fn cascade_value(&self, key: &str) -> Option<&Value> {
        self.cascade.get(key)
    }

    pub fn set_cascade(&mut self, cascade: BTreeMap<String, Value>) -> &mut Self {
        self.cascade = cascade;
        self
    }

    /// Deterministic path under the collections directory; no I/O.
    pub fn path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.yaml", self.handle))
    }

    /// Persistable projection. Fields equal to their defaults are omitted;
    /// derived flags (`orderable`, `structured`) never appear — they are
    /// recomputed from the structure descriptor on load.
    pub fn file_data(&self, registry: &Sites) -> CollectionFileData {
        let date_behavior = if self.past_date_behavior == DateBehavior::Public
            && self.future_date_behavior == DateBehavior::Public
        {
            None
        } else {
            Some(DateBehaviorPair {
                past: self.past_date_behavior,
                future: self.future_date_behavior,
            })
        };

        CollectionFileData {
            title: self.title.clone(),
            route: self.routes.clone(),
            mount: self.mount,
            date: self.dated.then_some(true),
            amp: self.ampable.then_some(true),
            sort_by: self.sort_field.clone(),
            sort_dir: self.sort_direction,
            default_status: (!self.default_publish_state).then(|| "draft".to_string()),
            date_behavior,
            sites: if registry.has_multiple() {
                self.sites.clone()
            } else {
                None
            },
            template: self.template.clone(),
            layout: self.layout.clone(),
            inject: self.cascade.clone(),
            blueprints: self.blueprints.clone(),
            search_index: self.search_index.clone(),
            taxonomies: self.taxonomies.clone(),
            revisions: self.revisions.then_some(true),
            structure: if self.has_structure() {
                self.structure_contents()
            } else {
                None
            },
        }
    }

    pub(crate) fn from_file_data(handle: &str, data: CollectionFileData) -> Self {
        let mut collection = Collection::new(handle);
        collection.title = data.title;
        collection.routes = data.route;
        collection.mount = data.mount;
        collection.dated = data.date.unwrap_or(false);
        collection.ampable = data.amp.unwrap_or(false);
        collection.sort_field = data.sort_by;
        collection.sort_direction = data.sort_dir;
        collection.default_publish_state = data.default_status.as_deref() != Some("draft");
        if let Some(pair) = data.date_behavior {
            collection.past_date_behavior = pair.past;
            collection.future_date_behavior = pair.future;
        }
        collection.sites = data.sites;
        collection.template = data.template;
        collection.layout = data.layout;
        collection.cascade = data.inject;
        collection.blueprints = data.blueprints;
        collection.search_index = data.search_index;
        collection.taxonomies = data.taxonomies;
        collection.revisions = data.revisions.unwrap_or(false);
        collection.structure_contents = data.structure;
        collection
    }

    /// Full projection including derived read-only metadata. Unlike
    /// [`file_data`](Self::file_data) this is a view, never read back as
    /// authoritative input.
    pub fn to_array(&self, registry: &Sites) -> Value {
        json!({
            "title": self.title(),
            "handle": self.handle,
            "dated": self.dated,
            "past_date_behavior": self.past_date_behavior,
            "future_date_behavior": self.future_date_behavior,
            "default_publish_state": self.default_publish_state,
            "amp": self.ampable,
            "sites": self.sites(registry),
            "template": self.template(),
            "layout": self.layout(),
            "cascade": self.cascade,
            "blueprints": self.blueprints,
            "search_index": self.search_index,
            "orderable": self.orderable(),
            "structured": self.has_structure(),
            "taxonomies": self.taxonomies,
            "revisions": self.revisions,
        })
    }
}

/// Persisted record shape for a collection. Optional fields are omitted
/// from output when equal to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CollectionFileData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Routes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amp: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<SortDirection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_behavior: Option<DateBehaviorPair>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sites: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inject: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blueprints: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_index: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxonomies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revisions: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureContents>,
}
