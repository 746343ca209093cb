//! Label to asset lookup

use std::collections::HashMap;

use crate::timeline::result::AssetRef;

/// Resolves a label to the asset illustrating it
///
/// Implementations must be idempotent (resolving the same label twice yields equal refs)
/// and must never hand out a ref to a resource that does not exist.
pub trait AssetLookup {
    /// Asset for `label`, or `None` when the label has no asset
    fn resolve(&self, label: &str) -> Option<AssetRef>;
}

impl AssetLookup for HashMap<String, AssetRef> {
    fn resolve(&self, label: &str) -> Option<AssetRef> {
        self.get(label).cloned()
    }
}

/// Fixed mapping from labels to assets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetCatalog {
    entries: HashMap<String, AssetRef>,
}

impl AssetCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the asset for `label`
    pub fn insert(&mut self, label: impl Into<String>, asset: AssetRef) {
        self.entries.insert(label.into(), asset);
    }

    /// Asset registered for `label`
    pub fn get(&self, label: &str) -> Option<&AssetRef> {
        self.entries.get(label)
    }

    /// Number of labels with an asset
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no label has an asset
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AssetLookup for AssetCatalog {
    fn resolve(&self, label: &str) -> Option<AssetRef> {
        self.get(label).cloned()
    }
}

impl FromIterator<(String, AssetRef)> for AssetCatalog {
    fn from_iter<I: IntoIterator<Item = (String, AssetRef)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_resolves_registered_labels() {
        let mut catalog = AssetCatalog::new();
        catalog.insert("A", AssetRef::new("/assets/a.png"));
        assert_eq!(catalog.resolve("A"), Some(AssetRef::new("/assets/a.png")));
        assert_eq!(catalog.resolve("a"), None);
        assert_eq!(catalog.resolve("A"), catalog.resolve("A"));
    }

    #[test]
    fn test_hash_map_lookup() {
        let map: HashMap<String, AssetRef> =
            HashMap::from([("B".to_string(), AssetRef::new("/assets/b.png"))]);
        assert!(map.resolve("B").is_some());
        assert!(map.resolve("C").is_none());
    }
}
