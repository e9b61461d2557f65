use crate::model::variables::Variables;
use crate::model::{remove_null_values, ucfirst};
use crate::sites::Sites;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A named, site-localized bag of shared variables not tied to a collection.
///
/// At most one localization exists per site. Localizations are added and
/// removed independently of the parent's own persistence: saving the set
/// persists only its metadata (plus, in single-site installations, the
/// default site's data inlined into the set record).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalSet {
    handle: String,
    title: Option<String>,
    localizations: BTreeMap<String, Variables>,
}

/// Persisted record shape for a global set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalSetFileData {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, Value>>,
}

impl GlobalSet {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            title: None,
            localizations: BTreeMap::new(),
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

    /// Construct an unattached localization for `site`, pre-wired to this
    /// set's handle. Add it with [`add_localization`](Self::add_localization).
    pub fn make_localization(&self, site: impl Into<String>) -> Variables {
        Variables::new(self.handle.clone(), site)
    }

    pub fn add_localization(&mut self, mut localization: Variables) -> &mut Self {
        localization.attach_to(&self.handle);
        self.localizations
            .insert(localization.site().to_string(), localization);
        self
    }

    /// Removing a localization for a site that was never added is a no-op.
    pub fn remove_localization(&mut self, site: &str) -> &mut Self {
        self.localizations.remove(site);
        self
    }

    pub fn in_site(&self, site: &str) -> Option<&Variables> {
        self.localizations.get(site)
    }

    pub fn in_default_site(&self, sites: &Sites) -> Option<&Variables> {
        self.in_site(sites.default_site())
    }

    pub fn in_current_site(&self, sites: &Sites) -> Option<&Variables> {
        self.in_site(sites.current())
    }

    pub fn exists_in(&self, site: &str) -> bool {
        self.localizations.contains_key(site)
    }

    pub fn localizations(&self) -> &BTreeMap<String, Variables> {
        &self.localizations
    }

    /// Deterministic path under the globals directory; no I/O.
    pub fn path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.yaml", self.handle))
    }

    /// Persistable projection. Single-site installations inline the default
    /// site's data (nulls removed); multi-site installations omit `data`
    /// entirely — each localization persists its own companion record.
    pub fn file_data(&self, sites: &Sites) -> GlobalSetFileData {
        let data = if sites.has_multiple() {
            None
        } else {
            Some(
                self.in_default_site(sites)
                    .map(|vars| remove_null_values(vars.data()))
                    .unwrap_or_default(),
            )
        };

        GlobalSetFileData {
            title: self.title(),
            data,
        }
    }

    pub(crate) fn from_file_data(handle: &str, data: GlobalSetFileData, sites: &Sites) -> Self {
        let mut set = GlobalSet::new(handle).with_title(data.title);
        if let Some(inline) = data.data {
            let vars = set.make_localization(sites.default_site()).with_data(inline);
            set.add_localization(vars);
        }
        set
    }
}
