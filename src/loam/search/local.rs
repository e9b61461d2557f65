//! Local search driver: an in-process inverted index.
//!
//! Documents are tokenized over their configured searchable fields into a
//! term → document → frequency map. Ranking is by summed term frequency
//! across matched query tokens; a query token matches a term exactly or as
//! a prefix. When a `path` is configured the postings persist as a YAML
//! sidecar so the index survives process restarts.

use super::{DriverConfig, SearchHit, SearchIndex, SearchItem};
use crate::error::{LoamError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "is", "it",
        "of", "on", "or", "the", "to", "was",
    ]
    .into_iter()
    .collect()
});

/// term → document id → term frequency
type Postings = BTreeMap<String, BTreeMap<String, u32>>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexData {
    postings: Postings,
}

pub struct LocalIndex {
    name: String,
    fields: Vec<String>,
    path: Option<PathBuf>,
    data: IndexData,
}

impl LocalIndex {
    /// Recognized config keys: `fields` (searchable field names, default
    /// `["title"]`) and `path` (sidecar file for persistence).
    pub fn new(name: &str, config: &DriverConfig) -> Result<Self> {
        let fields = match config.get("fields") {
            None => vec!["title".to_string()],
            Some(value) => value
                .as_array()
                .ok_or_else(|| {
                    LoamError::Config(format!("Search index [{name}]: fields must be a list"))
                })?
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        };

        let path = config
            .get("path")
            .and_then(Value::as_str)
            .map(PathBuf::from);

        let data = match &path {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(path).map_err(LoamError::Io)?;
                serde_yaml::from_str(&content).map_err(LoamError::Yaml)?
            }
            _ => IndexData::default(),
        };

        Ok(Self {
            name: name.to_string(),
            fields,
            path,
            data,
        })
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| token.len() > 1 && !STOP_WORDS.contains(token))
            .map(str::to_string)
            .collect()
    }

    fn remove_document(&mut self, id: &str) {
        for docs in self.data.postings.values_mut() {
            docs.remove(id);
        }
        self.data.postings.retain(|_, docs| !docs.is_empty());
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else { return Ok(()) };
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(LoamError::Io)?;
            }
        }
        let content = serde_yaml::to_string(&self.data).map_err(LoamError::Yaml)?;
        fs::write(path, content).map_err(LoamError::Io)?;
        Ok(())
    }
}

impl SearchIndex for LocalIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        !self.data.postings.is_empty()
    }

    fn clear(&mut self) -> Result<()> {
        self.data.postings.clear();
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path).map_err(LoamError::Io)?;
            }
        }
        Ok(())
    }

    fn update(&mut self, item: &SearchItem) -> Result<()> {
        self.remove_document(&item.id);

        let fields = self.fields.clone();
        for field in &fields {
            let Some(text) = item.fields.get(field) else {
                continue;
            };
            for token in Self::tokenize(text) {
                *self
                    .data
                    .postings
                    .entry(token)
                    .or_default()
                    .entry(item.id.clone())
                    .or_insert(0) += 1;
            }
        }

        self.persist()
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.remove_document(id);
        self.persist()
    }

    fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let tokens = Self::tokenize(query);
        let mut scores: BTreeMap<String, f32> = BTreeMap::new();

        for token in &tokens {
            for (term, docs) in &self.data.postings {
                if term == token || term.starts_with(token.as_str()) {
                    for (id, freq) in docs {
                        *scores.entry(id.clone()).or_insert(0.0) += *freq as f32;
                    }
                }
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .map(|(id, score)| SearchHit { id, score })
            .collect();
        // Best first; ties break on id so results are deterministic.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(hits)
    }
}
