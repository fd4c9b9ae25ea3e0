//! Named metadata access.
//!
//! Values are read by key through the wrapper's own store. Reads never
//! mutate anything, and there is no write path: [`metadata_support`] always
//! reports `write: false`.

use array_traits::{Container, Value};
use tracing::trace;

use crate::array::MetadataArray;
use crate::store::MetadataStore;
use crate::{MetadataError, Result};

/// Which wrapper layer answered a layered lookup.
///
/// `depth` counts wrappers from the outside in; `0` is the outermost one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Provenance {
    pub depth: usize,
}

/// Capabilities of the metadata channel of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetadataSupport {
    pub read: bool,
    pub write: bool,
}

impl<C, M: MetadataStore> MetadataArray<C, M> {
    /// Value stored under `key` in this wrapper's store.
    pub fn metadata(&self, key: &str) -> Result<&Value> {
        self.metadata
            .get(key)
            .ok_or_else(|| MetadataError::MissingMetadataKey(key.to_owned()))
    }

    /// Value stored under `key`, or `default` when absent.
    pub fn metadata_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.metadata.get(key).unwrap_or(default)
    }

    /// Keys of this wrapper's store, in store order.
    pub fn metadata_keys(&self) -> Vec<&str> {
        self.metadata.keys()
    }

    pub fn has_metadata(&self, key: &str) -> bool {
        self.metadata.contains_key(key)
    }

    pub fn metadata_support(&self) -> MetadataSupport {
        MetadataSupport {
            read: true,
            write: false,
        }
    }
}

impl<C: Container, M: MetadataStore> MetadataArray<C, M> {
    /// Layered lookup through nested wrappers.
    ///
    /// The outermost store that holds `key` wins; the returned
    /// [`Provenance`] names its layer.
    pub fn metadata_traced(&self, key: &str) -> Result<(&Value, Provenance)> {
        find_metadata(self, key).ok_or_else(|| MetadataError::MissingMetadataKey(key.to_owned()))
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Layered lookup on any container. Plain containers hold no metadata.
pub fn find_metadata<'a, C: Container + ?Sized>(
    x: &'a C,
    key: &str,
) -> Option<(&'a Value, Provenance)> {
    let found = x.find_metadata(key, 0);
    trace!(key, depth = found.map(|(_, d)| d), "metadata lookup");
    found.map(|(v, depth)| (v, Provenance { depth }))
}

/// Value under `key` on any container, searching through nested wrappers.
///
/// Fails with [`MetadataError::MissingMetadataKey`] when no layer has the
/// key, which is always the case for a plain container.
pub fn metadata<'a, C: Container + ?Sized>(x: &'a C, key: &str) -> Result<&'a Value> {
    find_metadata(x, key)
        .map(|(v, _)| v)
        .ok_or_else(|| MetadataError::MissingMetadataKey(key.to_owned()))
}

/// Like [`metadata`], falling back to `default`.
pub fn metadata_or<'a, C: Container + ?Sized>(
    x: &'a C,
    key: &str,
    default: &'a Value,
) -> &'a Value {
    find_metadata(x, key).map_or(default, |(v, _)| v)
}

pub fn metadata_keys<C, M: MetadataStore>(x: &MetadataArray<C, M>) -> Vec<&str> {
    x.metadata_keys()
}

/// Read support for wrappers, none for plain containers. Writing is never
/// supported.
pub fn metadata_support<C: Container + ?Sized>(_x: &C) -> MetadataSupport {
    MetadataSupport {
        read: C::IS_FORWARDING,
        write: false,
    }
}

/// Remove the outermost wrapper.
pub fn unwrap<C, M>(x: MetadataArray<C, M>) -> C {
    x.into_parent()
}

/// Strip every wrapper layer. Plain containers come back unchanged.
pub fn drop_metadata<C: Container>(x: C) -> C::Bare {
    x.into_bare()
}
