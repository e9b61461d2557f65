use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// One content record belonging to a collection.
///
/// Entries carry a handful of builtin fields plus a free-form data map
/// produced by the (out of scope) blueprint subsystem. Derived fields
/// (`uri`, `order`) are maintained by the repository, never set by hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: Uuid,
    pub collection: String,
    pub site: String,
    pub slug: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default = "default_published")]
    pub published: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Value>,
}

fn default_published() -> bool {
    true
}

impl Entry {
    pub fn new(
        collection: impl Into<String>,
        site: impl Into<String>,
        slug: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            collection: collection.into(),
            site: site.into(),
            slug: slug.into(),
            title: title.into(),
            date: None,
            order: None,
            uri: None,
            published: true,
            data: BTreeMap::new(),
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_data(mut self, data: BTreeMap<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Uniform field access for the query builder. Builtin fields come
    /// first; anything else is looked up in the data map. Absent fields
    /// resolve to `None` and compare as null (lowest) when queried.
    pub fn value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::String(self.id.to_string())),
            "collection" => Some(Value::String(self.collection.clone())),
            "site" => Some(Value::String(self.site.clone())),
            "slug" => Some(Value::String(self.slug.clone())),
            "title" => Some(Value::String(self.title.clone())),
            "date" => self.date.map(|d| Value::String(d.to_rfc3339())),
            "order" => self.order.map(Value::from),
            "uri" => self.uri.clone().map(Value::String),
            "published" => Some(Value::Bool(self.published)),
            other => self.data.get(other).cloned().filter(|v| !v.is_null()),
        }
    }
}
