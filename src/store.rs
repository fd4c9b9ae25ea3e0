//! Metadata stores.
//!
//! A store is a read-only, key-addressable collection of [`Value`]s. The
//! canonical store is [`Metadata`]; any type implementing [`MetadataStore`]
//! can stand in for it, which lets a caller use a plain struct whose lookups
//! compile to a static `match`.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::{MetadataError, Result};

/// Dynamic metadata value. Never inspected by this crate.
pub use serde_json::Value;

/// Read-only key/value store attached to a [`crate::MetadataArray`].
pub trait MetadataStore {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> Option<&Value>;

    /// Keys in the store's own order.
    fn keys(&self) -> Vec<&str>;

    fn len(&self) -> usize {
        self.keys().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Copy every entry into the canonical store, preserving key order.
    fn to_metadata(&self) -> Metadata {
        Metadata::from_pairs(
            self.keys()
                .into_iter()
                .filter_map(|k| self.get(k).map(|v| (k, v.clone()))),
        )
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Insertion-ordered, immutable key/value store.
///
/// Once built there is no API to add, remove or replace entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata {
    entries: IndexMap<String, Value>,
}

impl Metadata {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(key, value)` pairs.
    ///
    /// A repeated key keeps the position of its first occurrence and the
    /// value of its last.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut entries = IndexMap::new();
        for (k, v) in pairs {
            entries.insert(k.into(), v.into());
        }
        Self { entries }
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }
}

impl MetadataStore for Metadata {
    #[inline]
    fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn to_metadata(&self) -> Metadata {
        self.clone()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl MetadataStore for serde_json::Map<String, Value> {
    fn get(&self, key: &str) -> Option<&Value> {
        serde_json::Map::get(self, key)
    }

    fn keys(&self) -> Vec<&str> {
        serde_json::Map::keys(self).map(String::as_str).collect()
    }

    fn len(&self) -> usize {
        serde_json::Map::len(self)
    }
}

// ============================================================================
// Store conversion
// ============================================================================

/// Build a concrete store from any other store.
pub trait FromStore: MetadataStore + Sized {
    fn from_store<S: MetadataStore + ?Sized>(store: &S) -> Result<Self>;
}

impl FromStore for Metadata {
    fn from_store<S: MetadataStore + ?Sized>(store: &S) -> Result<Self> {
        Ok(store.to_metadata())
    }
}

impl FromStore for serde_json::Map<String, Value> {
    fn from_store<S: MetadataStore + ?Sized>(store: &S) -> Result<Self> {
        let mut map = serde_json::Map::new();
        for key in store.keys() {
            let value = store
                .get(key)
                .ok_or_else(|| MetadataError::IncompatibleConversion {
                    target: std::any::type_name::<Self>(),
                    reason: format!("store lists key {key:?} but has no value for it"),
                })?;
            map.insert(key.to_owned(), value.clone());
        }
        Ok(map)
    }
}

// ============================================================================
// Construction inputs
// ============================================================================

/// Anything that can become the shared store of a wrapper.
pub trait IntoMetadata<M> {
    fn into_metadata(self) -> Arc<M>;
}

/// An existing shared store is reused as is.
impl<M> IntoMetadata<M> for Arc<M> {
    #[inline]
    fn into_metadata(self) -> Arc<M> {
        self
    }
}

impl IntoMetadata<Metadata> for Metadata {
    #[inline]
    fn into_metadata(self) -> Arc<Metadata> {
        Arc::new(self)
    }
}

impl<K: Into<String>, V: Into<Value>> IntoMetadata<Metadata> for Vec<(K, V)> {
    fn into_metadata(self) -> Arc<Metadata> {
        Arc::new(Metadata::from_pairs(self))
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> IntoMetadata<Metadata> for [(K, V); N] {
    fn into_metadata(self) -> Arc<Metadata> {
        Arc::new(Metadata::from_pairs(self))
    }
}

/// Hash maps have no order of their own; keys are sorted.
impl<K, V, S> IntoMetadata<Metadata> for HashMap<K, V, S>
where
    K: Into<String>,
    V: Into<Value>,
    S: BuildHasher,
{
    fn into_metadata(self) -> Arc<Metadata> {
        let mut pairs: Vec<(String, Value)> =
            self.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Arc::new(Metadata::from_pairs(pairs))
    }
}

impl<K: Into<String>, V: Into<Value>> IntoMetadata<Metadata> for BTreeMap<K, V> {
    fn into_metadata(self) -> Arc<Metadata> {
        Arc::new(Metadata::from_pairs(self))
    }
}

impl<K, V, S> IntoMetadata<Metadata> for IndexMap<K, V, S>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_metadata(self) -> Arc<Metadata> {
        Arc::new(Metadata::from_pairs(self))
    }
}

impl IntoMetadata<Metadata> for serde_json::Map<String, Value> {
    fn into_metadata(self) -> Arc<Metadata> {
        Arc::new(Metadata::from_pairs(self))
    }
}

/// Build a [`Metadata`] from named arguments.
///
/// ```
/// use metadata_arrays::{metadata, MetadataStore};
///
/// let m = metadata!(unit = "m", scale = 2);
/// assert_eq!(m.keys(), vec!["unit", "scale"]);
///
/// let n = metadata!("sample rate" => 44_100);
/// assert_eq!(n.get("sample rate").unwrap(), 44_100);
/// ```
#[macro_export]
macro_rules! metadata {
    () => {
        $crate::Metadata::new()
    };
    ($($key:ident = $value:expr),+ $(,)?) => {
        $crate::Metadata::from_pairs([$((stringify!($key), $crate::Value::from($value))),+])
    };
    ($($key:ident => $value:expr),+ $(,)?) => {
        $crate::Metadata::from_pairs([$((stringify!($key), $crate::Value::from($value))),+])
    };
    ($($key:literal => $value:expr),+ $(,)?) => {
        $crate::Metadata::from_pairs([$(($key, $crate::Value::from($value))),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insertion_order_is_kept() {
        let m = Metadata::from_pairs([("b", 1), ("a", 2), ("c", 3)]);
        assert_eq!(m.keys(), vec!["b", "a", "c"]);
        assert_eq!(m.len(), 3);
        assert_eq!(m.get("a"), Some(&json!(2)));
        assert!(m.get("z").is_none());
    }

    #[test]
    fn test_duplicate_key_first_position_last_value() {
        let m = Metadata::from_pairs([("x", 1), ("y", 2), ("x", 3)]);
        assert_eq!(m.keys(), vec!["x", "y"]);
        assert_eq!(m.get("x"), Some(&json!(3)));
    }

    #[test]
    fn test_construction_forms_agree() {
        let from_vec: Arc<Metadata> = vec![("a", 1), ("b", 2)].into_metadata();
        let from_array: Arc<Metadata> = [("a", 1), ("b", 2)].into_metadata();
        let from_macro = metadata!(a = 1, b = 2);
        let from_arrow = metadata!(a => 1, b => 2);
        let mut btree = BTreeMap::new();
        btree.insert("b", 2);
        btree.insert("a", 1);
        let from_btree: Arc<Metadata> = btree.into_metadata();
        let mut hash = HashMap::new();
        hash.insert("b".to_string(), 2);
        hash.insert("a".to_string(), 1);
        let from_hash: Arc<Metadata> = hash.into_metadata();
        let mut json_map = serde_json::Map::new();
        json_map.insert("a".into(), json!(1));
        json_map.insert("b".into(), json!(2));
        let from_json: Arc<Metadata> = json_map.into_metadata();

        for m in [&from_array, &from_btree, &from_hash, &from_json] {
            assert_eq!(**m, *from_vec);
            assert_eq!(m.keys(), vec!["a", "b"]);
        }
        assert_eq!(from_macro, *from_vec);
        assert_eq!(from_arrow, *from_vec);
    }

    #[test]
    fn test_shared_arc_is_reused() {
        let shared = Arc::new(metadata!(k = "v"));
        let again: Arc<Metadata> = Arc::clone(&shared).into_metadata();
        assert!(Arc::ptr_eq(&shared, &again));
    }

    #[test]
    fn test_empty_macro() {
        let m = metadata!();
        assert!(m.is_empty());
        assert!(m.keys().is_empty());
    }

    #[test]
    fn test_from_store_roundtrip() {
        let m = metadata!(a = 1, b = json!([1, 2]));
        let map = serde_json::Map::from_store(&m).unwrap();
        assert_eq!(MetadataStore::keys(&map), vec!["a", "b"]);
        let back = Metadata::from_store(&map).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_iter_and_collect() {
        let m: Metadata = vec![("one", 1), ("two", 2)].into_iter().collect();
        let keys: Vec<&String> = (&m).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["one", "two"]);
        assert_eq!(m.iter().count(), 2);
    }
}
