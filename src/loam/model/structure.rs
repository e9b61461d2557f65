use serde::{Deserialize, Serialize};

/// Raw structure descriptor as persisted alongside a collection: whether a
/// root entry is expected and the maximum tree depth (absent = unbounded).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructureContents {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub root: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
}

/// Shape constraints for a structured collection's entry tree.
///
/// Built lazily from [`StructureContents`]; a collection whose structure has
/// a max depth of 1 is "orderable" (a flat, manually ordered list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStructure {
    handle: String,
    expects_root: bool,
    max_depth: Option<u32>,
}

impl CollectionStructure {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            expects_root: false,
            max_depth: None,
        }
    }

    pub fn from_contents(handle: impl Into<String>, contents: &StructureContents) -> Self {
        Self {
            handle: handle.into(),
            expects_root: contents.root,
            max_depth: contents.max_depth,
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn set_handle(&mut self, handle: impl Into<String>) -> &mut Self {
        self.handle = handle.into();
        self
    }

    pub fn expects_root(&self) -> bool {
        self.expects_root
    }

    pub fn set_expects_root(&mut self, expects_root: bool) -> &mut Self {
        self.expects_root = expects_root;
        self
    }

    pub fn max_depth(&self) -> Option<u32> {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u32>) -> &mut Self {
        self.max_depth = max_depth;
        self
    }

    pub fn contents(&self) -> StructureContents {
        StructureContents {
            root: self.expects_root,
            max_depth: self.max_depth,
        }
    }
}
