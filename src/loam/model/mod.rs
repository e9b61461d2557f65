//! Core entity model: content containers and their projections.
//!
//! Entities here are transient views over the persisted store. They hold
//! raw configured values and compute defaults lazily through their getters;
//! all mutation that must stay consistent with the store routes through the
//! repository layer ([`crate::repo`]).

use serde_json::Value;
use std::collections::BTreeMap;

pub mod collection;
pub mod entry;
pub mod global_set;
pub mod structure;
pub mod taxonomy;
pub mod variables;

pub use collection::{Collection, CollectionFileData, DateBehavior, Routes, SortDirection};
pub use entry::Entry;
pub use global_set::{GlobalSet, GlobalSetFileData};
pub use structure::{CollectionStructure, StructureContents};
pub use taxonomy::{Taxonomy, TaxonomyFileData};
pub use variables::Variables;

/// Opaque seam to the blueprint/fieldtype subsystem. The core never
/// inspects field-type logic: it hands raw input through `process` to get
/// typed values, and through `pre_process` for the inverse.
#[derive(Clone, Copy)]
pub struct FieldProcessor {
    pub process: fn(&BTreeMap<String, Value>) -> BTreeMap<String, Value>,
    pub pre_process: fn(&BTreeMap<String, Value>) -> BTreeMap<String, Value>,
}

impl Default for FieldProcessor {
    fn default() -> Self {
        fn identity(values: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
            values.clone()
        }
        Self {
            process: identity,
            pre_process: identity,
        }
    }
}

/// Title fallback for entities configured without one: the handle with its
/// first character upper-cased.
pub(crate) fn ucfirst(handle: &str) -> String {
    let mut chars = handle.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Drop null values from a data map before persisting it.
pub(crate) fn remove_null_values(data: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    data.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ucfirst_handles() {
        assert_eq!(ucfirst("blog"), "Blog");
        assert_eq!(ucfirst(""), "");
        assert_eq!(ucfirst("études"), "Études");
    }
}
