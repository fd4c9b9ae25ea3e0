//! The container contract.
//!
//! A [`Container`] is any indexable, sizeable, iterable array-like value. The
//! trait is the boundary between the payload containers and anything that
//! wraps them: every query a wrapper forwards is a method here, and the
//! capability flags let generic code see what a payload supports before
//! calling into it.
//!
//! # Linear order
//!
//! Linear indices are column-major (first index varies fastest), matching
//! Julia's `LinearIndices`. This holds for every container regardless of its
//! storage layout.

use std::ops::Range;

use smallvec::SmallVec;

use crate::index::Sel;
use crate::style::BroadcastStyle;
use crate::{ArrayError, Result, Value};

/// Axis extents.
pub type Dims = SmallVec<[usize; 4]>;

/// Per-axis storage steps.
pub type Strides = SmallVec<[isize; 4]>;

/// Storage identities, one per memory region a value logically touches.
pub type DataIds = SmallVec<[usize; 2]>;

/// Result of a general indexing operation.
///
/// Selecting a single position yields a bare element; any other selection
/// yields a new container of the same type.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<E, C> {
    /// A single element.
    Element(E),
    /// A sub-container.
    Slice(C),
}

impl<E, C> Selection<E, C> {
    pub fn is_element(&self) -> bool {
        matches!(self, Selection::Element(_))
    }

    pub fn into_element(self) -> Option<E> {
        match self {
            Selection::Element(e) => Some(e),
            Selection::Slice(_) => None,
        }
    }

    pub fn into_slice(self) -> Option<C> {
        match self {
            Selection::Element(_) => None,
            Selection::Slice(c) => Some(c),
        }
    }

    /// Transform the slice variant, leaving elements untouched.
    pub fn map_slice<D>(self, f: impl FnOnce(C) -> D) -> Selection<E, D> {
        match self {
            Selection::Element(e) => Selection::Element(e),
            Selection::Slice(c) => Selection::Slice(f(c)),
        }
    }
}

/// Indexable, sizeable, iterable array-like value.
///
/// Mutating operations have default implementations that fail with
/// [`ArrayError::UnsupportedMutation`]; read-only containers simply leave them
/// alone and set the matching capability flag to `false`.
pub trait Container {
    /// Element type.
    type Elem;

    /// This container with every forwarding layer removed.
    type Bare: Container<Elem = Self::Elem>;

    /// Container produced by an allocation request with element type `U`.
    type Similar<U: Clone + Default>: Container<Elem = U>;

    /// Container produced by [`Container::reshape`].
    type Reshaped: Container<Elem = Self::Elem>;

    /// Element iterator.
    type Iter<'a>: Iterator<Item = &'a Self::Elem>
    where
        Self: 'a;

    /// Whether indexed assignment is supported.
    const SUPPORTS_SET: bool;

    /// Whether the container can change its length.
    const SUPPORTS_RESIZE: bool;

    /// Whether this type transparently delegates to an inner container.
    const IS_FORWARDING: bool = false;

    /// Axis extents.
    fn dims(&self) -> Dims;

    /// Storage step along each axis.
    fn strides(&self) -> Strides;

    /// Element at a column-major linear index.
    fn at_linear(&self, index: usize) -> Option<&Self::Elem>;

    /// Iterate over every element once, in storage order.
    fn iter(&self) -> Self::Iter<'_>;

    /// General indexing: see [`crate::plan_selection`] for the rules.
    fn select(&self, sel: &[Sel]) -> Result<Selection<Self::Elem, Self>>
    where
        Self: Sized,
        Self::Elem: Clone;

    /// Allocate a container compatible with this one, with the given dims and
    /// element type. Elements are `U::default()`.
    fn similar<U: Clone + Default>(&self, dims: &[usize]) -> Result<Self::Similar<U>>;

    /// Reinterpret the elements (in linear order) under new dims.
    fn reshape(self, dims: &[usize]) -> Result<Self::Reshaped>
    where
        Self: Sized,
        Self::Elem: Clone;

    /// Storage identities used by aliasing checks.
    fn data_ids(&self) -> DataIds;

    /// Borrow the container with every forwarding layer removed.
    fn bare(&self) -> &Self::Bare;

    /// Take the container with every forwarding layer removed.
    fn into_bare(self) -> Self::Bare
    where
        Self: Sized;

    #[inline]
    fn ndim(&self) -> usize {
        self.dims().len()
    }

    #[inline]
    fn len(&self) -> usize {
        self.dims().iter().product()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extent of one axis.
    fn size(&self, axis: usize) -> Option<usize> {
        self.dims().get(axis).copied()
    }

    /// Valid positions along each axis.
    fn axes(&self) -> Vec<Range<usize>> {
        self.dims().iter().map(|&d| 0..d).collect()
    }

    /// First valid linear index.
    fn first_index(&self) -> usize {
        0
    }

    /// Last valid linear index, `None` when empty.
    fn last_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// All valid linear indices.
    fn keys(&self) -> Range<usize> {
        0..self.len()
    }

    fn first(&self) -> Option<&Self::Elem> {
        self.at_linear(self.first_index())
    }

    fn last(&self) -> Option<&Self::Elem> {
        self.last_index().and_then(|i| self.at_linear(i))
    }

    fn contains(&self, value: &Self::Elem) -> bool
    where
        Self::Elem: PartialEq,
    {
        self.iter().any(|x| x == value)
    }

    /// Element at a cartesian position; `indices.len()` must equal `ndim()`.
    fn at(&self, indices: &[usize]) -> Option<&Self::Elem> {
        let dims = self.dims();
        col_major_linear(&dims, indices)
            .ok()
            .and_then(|i| self.at_linear(i))
    }

    /// Indexed assignment.
    fn set(&mut self, indices: &[usize], value: Self::Elem) -> Result<()> {
        let _ = (indices, value);
        Err(ArrayError::unsupported::<Self>("set"))
    }

    /// Change the length, filling new slots with `fill`.
    fn try_resize(&mut self, len: usize, fill: Self::Elem) -> Result<()>
    where
        Self::Elem: Clone,
    {
        let _ = (len, fill);
        Err(ArrayError::unsupported::<Self>("resize"))
    }

    /// Append one element.
    fn try_push(&mut self, value: Self::Elem) -> Result<()> {
        let _ = value;
        Err(ArrayError::unsupported::<Self>("push"))
    }

    /// Execution strategy used when this container takes part in a broadcast.
    fn broadcast_style(&self) -> BroadcastStyle {
        BroadcastStyle::Default(self.ndim())
    }

    /// Layered metadata lookup. `depth` is the number of forwarding layers
    /// already traversed; the returned depth names the layer that answered.
    fn find_metadata(&self, key: &str, depth: usize) -> Option<(&Value, usize)> {
        let _ = (key, depth);
        None
    }
}

/// Column-major linear index of a cartesian position.
pub fn col_major_linear(dims: &[usize], indices: &[usize]) -> Result<usize> {
    if dims.len() != indices.len() {
        return Err(ArrayError::RankMismatch(dims.len(), indices.len()));
    }
    let mut linear = 0usize;
    let mut stride = 1usize;
    for (axis, (&index, &extent)) in indices.iter().zip(dims.iter()).enumerate() {
        if index >= extent {
            return Err(ArrayError::IndexOutOfBounds {
                axis,
                index,
                extent,
            });
        }
        linear += index * stride;
        stride *= extent;
    }
    Ok(linear)
}

/// Compute column-major strides (Julia default: first index varies fastest).
pub fn col_major_strides(dims: &[usize]) -> Strides {
    let mut strides = Strides::with_capacity(dims.len());
    let mut acc = 1isize;
    for &d in dims {
        strides.push(acc);
        acc *= d as isize;
    }
    strides
}

/// Compute row-major strides (C default: last index varies fastest).
pub fn row_major_strides(dims: &[usize]) -> Strides {
    let rank = dims.len();
    let mut strides: Strides = SmallVec::from_elem(1isize, rank);
    for i in (0..rank.saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1] as isize;
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_major_linear() {
        assert_eq!(col_major_linear(&[2, 3], &[1, 2]).unwrap(), 5);
        assert_eq!(col_major_linear(&[], &[]).unwrap(), 0);
    }

    #[test]
    fn test_col_major_linear_out_of_bounds() {
        let err = col_major_linear(&[2, 3], &[2, 0]).unwrap_err();
        assert_eq!(
            err,
            ArrayError::IndexOutOfBounds {
                axis: 0,
                index: 2,
                extent: 2
            }
        );
        assert_eq!(
            col_major_linear(&[2, 3], &[1]).unwrap_err(),
            ArrayError::RankMismatch(2, 1)
        );
    }

    #[test]
    fn test_strides() {
        assert_eq!(col_major_strides(&[2, 3, 4]).as_slice(), &[1, 2, 6]);
        assert_eq!(row_major_strides(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
        assert!(row_major_strides(&[]).is_empty());
    }

    #[test]
    fn test_selection_helpers() {
        let s: Selection<i32, Vec<i32>> = Selection::Slice(vec![1, 2]);
        assert!(!s.is_element());
        let mapped = s.map_slice(|v| v.len());
        assert_eq!(mapped, Selection::Slice(2));
        let e: Selection<i32, Vec<i32>> = Selection::Element(7);
        assert_eq!(e.into_element(), Some(7));
    }
}
