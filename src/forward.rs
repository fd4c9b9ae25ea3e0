//! Forwarding of the container contract through [`MetadataArray`].
//!
//! Every structural query delegates to the parent. Operations that derive a
//! new container (slicing, `similar`, `reshape`) re-wrap the result with the
//! same shared store, while single elements are returned bare.

use std::fmt;
use std::ops::{Index, Range};
use std::sync::Arc;

use array_traits::{
    col_major_linear, ArrayError, BroadcastStyle, Container, DataIds, Dims, Sel, Selection,
    Strides, Value,
};

use crate::array::MetadataArray;
use crate::store::MetadataStore;
use crate::Result;

impl<C: Container, M: MetadataStore> Container for MetadataArray<C, M> {
    type Elem = C::Elem;
    type Bare = C::Bare;
    type Similar<U: Clone + Default> = MetadataArray<C::Similar<U>, M>;
    type Reshaped = MetadataArray<C::Reshaped, M>;
    type Iter<'a>
        = C::Iter<'a>
    where
        Self: 'a;

    const SUPPORTS_SET: bool = C::SUPPORTS_SET;
    const SUPPORTS_RESIZE: bool = C::SUPPORTS_RESIZE;
    const IS_FORWARDING: bool = true;

    #[inline]
    fn dims(&self) -> Dims {
        self.parent.dims()
    }

    #[inline]
    fn strides(&self) -> Strides {
        self.parent.strides()
    }

    #[inline]
    fn at_linear(&self, index: usize) -> Option<&C::Elem> {
        self.parent.at_linear(index)
    }

    #[inline]
    fn iter(&self) -> C::Iter<'_> {
        self.parent.iter()
    }

    fn select(&self, sel: &[Sel]) -> array_traits::Result<Selection<C::Elem, Self>>
    where
        C::Elem: Clone,
    {
        Ok(self.parent.select(sel)?.map_slice(|p| self.rewrap(p)))
    }

    fn similar<U: Clone + Default>(
        &self,
        dims: &[usize],
    ) -> array_traits::Result<MetadataArray<C::Similar<U>, M>> {
        Ok(self.rewrap(self.parent.similar::<U>(dims)?))
    }

    fn reshape(self, dims: &[usize]) -> array_traits::Result<MetadataArray<C::Reshaped, M>>
    where
        C::Elem: Clone,
    {
        let (parent, metadata) = self.into_parts();
        Ok(MetadataArray::from_shared(parent.reshape(dims)?, metadata))
    }

    /// Parent identities followed by the store's allocation.
    fn data_ids(&self) -> DataIds {
        let mut ids = self.parent.data_ids();
        ids.push(Arc::as_ptr(&self.metadata) as usize);
        ids
    }

    #[inline]
    fn bare(&self) -> &C::Bare {
        self.parent.bare()
    }

    #[inline]
    fn into_bare(self) -> C::Bare {
        self.parent.into_bare()
    }

    #[inline]
    fn ndim(&self) -> usize {
        self.parent.ndim()
    }

    #[inline]
    fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    fn size(&self, axis: usize) -> Option<usize> {
        self.parent.size(axis)
    }

    fn axes(&self) -> Vec<Range<usize>> {
        self.parent.axes()
    }

    fn first_index(&self) -> usize {
        self.parent.first_index()
    }

    fn last_index(&self) -> Option<usize> {
        self.parent.last_index()
    }

    fn keys(&self) -> Range<usize> {
        self.parent.keys()
    }

    fn first(&self) -> Option<&C::Elem> {
        self.parent.first()
    }

    fn last(&self) -> Option<&C::Elem> {
        self.parent.last()
    }

    fn contains(&self, value: &C::Elem) -> bool
    where
        C::Elem: PartialEq,
    {
        self.parent.contains(value)
    }

    #[inline]
    fn at(&self, indices: &[usize]) -> Option<&C::Elem> {
        self.parent.at(indices)
    }

    // Mutation goes straight to the parent; its error is returned as is.

    fn set(&mut self, indices: &[usize], value: C::Elem) -> array_traits::Result<()> {
        self.parent.set(indices, value)
    }

    fn try_resize(&mut self, len: usize, fill: C::Elem) -> array_traits::Result<()>
    where
        C::Elem: Clone,
    {
        self.parent.try_resize(len, fill)
    }

    fn try_push(&mut self, value: C::Elem) -> array_traits::Result<()> {
        self.parent.try_push(value)
    }

    fn broadcast_style(&self) -> BroadcastStyle {
        BroadcastStyle::tagged(self.parent.broadcast_style())
    }

    fn find_metadata(&self, key: &str, depth: usize) -> Option<(&Value, usize)> {
        match self.metadata.get(key) {
            Some(v) => Some((v, depth)),
            None => self.parent.find_metadata(key, depth + 1),
        }
    }
}

impl<C: Container, M: MetadataStore> MetadataArray<C, M> {
    /// General indexing returning the crate error type.
    ///
    /// A single position yields the bare element; anything else yields a
    /// wrapper sharing this wrapper's store.
    pub fn get(&self, sel: &[Sel]) -> Result<Selection<C::Elem, Self>>
    where
        C::Elem: Clone,
    {
        Ok(self.select(sel)?)
    }

    /// Element at a cartesian position, bare.
    pub fn get_elem(&self, indices: &[usize]) -> Result<&C::Elem> {
        let linear = col_major_linear(&self.parent.dims(), indices)?;
        Ok(self
            .parent
            .at_linear(linear)
            .ok_or(ArrayError::OffsetOverflow)?)
    }

    /// Allocate a wrapper with the same dims and element type, sharing the
    /// store.
    pub fn similar_like(&self) -> Result<MetadataArray<C::Similar<C::Elem>, M>>
    where
        C::Elem: Clone + Default,
    {
        let dims = self.parent.dims();
        Ok(self.similar::<C::Elem>(&dims)?)
    }
}

impl<C: Container, M: MetadataStore> Index<&[usize]> for MetadataArray<C, M> {
    type Output = C::Elem;

    fn index(&self, indices: &[usize]) -> &C::Elem {
        match self.get_elem(indices) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<'a, C: Container, M: MetadataStore> IntoIterator for &'a MetadataArray<C, M> {
    type Item = &'a C::Elem;
    type IntoIter = C::Iter<'a>;

    fn into_iter(self) -> C::Iter<'a> {
        self.parent.iter()
    }
}

impl<C: fmt::Debug, M: fmt::Debug> fmt::Debug for MetadataArray<C, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataArray")
            .field("parent", &self.parent)
            .field("metadata", &*self.metadata)
            .finish()
    }
}

/// Cloning copies the payload and shares the store.
impl<C: Clone, M> Clone for MetadataArray<C, M> {
    fn clone(&self) -> Self {
        self.rewrap(self.parent.clone())
    }
}

impl<C: PartialEq, M: PartialEq> PartialEq for MetadataArray<C, M> {
    fn eq(&self, other: &Self) -> bool {
        self.parent == other.parent
            && (Arc::ptr_eq(&self.metadata, &other.metadata) || *self.metadata == *other.metadata)
    }
}
