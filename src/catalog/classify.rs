use serde::{Serialize, Serializer};

use super::{Catalog, CategorySpec};

pub const UNCLASSIFIED: &str = "unclassified";

/// Category label derived from an asset's pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Matched(String),
    Unclassified,
}

impl Classification {
    pub fn label(&self) -> &str {
        match self {
            Classification::Matched(name) => name,
            Classification::Unclassified => UNCLASSIFIED,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Classification::Matched(_))
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl Catalog {
    /// First entry (in declaration order) whose target size admits `width` x `height`.
    pub fn find_match(&self, width: u32, height: u32) -> Option<&CategorySpec> {
        self.iter().find(|spec| spec.matches(width, height))
    }

    /// Label plus the matched entry, so later checks can read its limits.
    pub fn classify(&self, width: u32, height: u32) -> (Classification, Option<&CategorySpec>) {
        match self.find_match(width, height) {
            Some(spec) => (Classification::Matched(spec.name.clone()), Some(spec)),
            None => (Classification::Unclassified, None),
        }
    }
}
