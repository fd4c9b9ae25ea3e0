//! The metadata wrapper.

use std::sync::Arc;

use dense_array::DenseArray;

use crate::store::{IntoMetadata, Metadata};

/// A container paired with a shared, read-only metadata store.
///
/// The wrapper behaves like its parent for every [`crate::Container`] query;
/// see the forwarding impl for the exact rules. The store is held behind an
/// [`Arc`] so that slices, reshapes and other derived wrappers point at the
/// same store instead of copying it.
///
/// # Example
///
/// ```
/// use metadata_arrays::{metadata, Container, MetadataArray};
///
/// let w = MetadataArray::new(vec![1, 2, 3], metadata!(unit = "s"));
/// assert_eq!(w.len(), 3);
/// assert_eq!(w.parent(), &vec![1, 2, 3]);
/// ```
pub struct MetadataArray<C, M = Metadata> {
    pub(crate) parent: C,
    pub(crate) metadata: Arc<M>,
}

/// One-dimensional wrapper over a `Vec`.
pub type MetadataVector<T, M = Metadata> = MetadataArray<Vec<T>, M>;

/// Two-dimensional (or any rank) wrapper over a [`DenseArray`].
pub type MetadataMatrix<T, M = Metadata> = MetadataArray<DenseArray<T>, M>;

impl<C, M> MetadataArray<C, M> {
    /// Wrap `parent` with metadata from any accepted construction input.
    pub fn new(parent: C, metadata: impl IntoMetadata<M>) -> Self {
        Self {
            parent,
            metadata: metadata.into_metadata(),
        }
    }

    /// Wrap `parent` with a caller-defined store.
    pub fn with_store(parent: C, store: M) -> Self {
        Self {
            parent,
            metadata: Arc::new(store),
        }
    }

    /// Wrap `parent` with an existing shared store.
    pub fn from_shared(parent: C, metadata: Arc<M>) -> Self {
        Self { parent, metadata }
    }

    #[inline]
    pub fn parent(&self) -> &C {
        &self.parent
    }

    /// Mutable access to the payload. The store stays untouched.
    #[inline]
    pub fn parent_mut(&mut self) -> &mut C {
        &mut self.parent
    }

    /// Drop the outer layer of metadata.
    #[inline]
    pub fn into_parent(self) -> C {
        self.parent
    }

    pub fn into_parts(self) -> (C, Arc<M>) {
        (self.parent, self.metadata)
    }

    /// The shared store.
    #[inline]
    pub fn metadata_store(&self) -> &Arc<M> {
        &self.metadata
    }

    /// Whether both wrappers point at the same store allocation.
    pub fn shares_metadata_with<C2>(&self, other: &MetadataArray<C2, M>) -> bool {
        Arc::ptr_eq(&self.metadata, &other.metadata)
    }

    /// Same payload, different store.
    pub fn with_metadata<M2>(self, metadata: impl IntoMetadata<M2>) -> MetadataArray<C, M2> {
        MetadataArray::new(self.parent, metadata)
    }

    /// Transform the payload, keeping the store.
    pub fn map_parent<C2>(self, f: impl FnOnce(C) -> C2) -> MetadataArray<C2, M> {
        MetadataArray {
            parent: f(self.parent),
            metadata: self.metadata,
        }
    }

    /// Wrap a derived payload with a clone of this wrapper's store.
    #[inline]
    pub(crate) fn rewrap<C2>(&self, parent: C2) -> MetadataArray<C2, M> {
        MetadataArray {
            parent,
            metadata: Arc::clone(&self.metadata),
        }
    }
}
