//! Read-only array holding one value at every position.

use array_traits::{
    plan_selection, BroadcastStyle, Container, DataIds, Dims, Sel, Selection, SelectionPlan,
    Strides,
};
use smallvec::{smallvec, SmallVec};

use crate::dense::DenseArray;
use crate::{ArrayError, Result};

/// Broadcast style kind reported by [`Fill`].
pub const FILL_STYLE: &str = "fill";

/// A constant array: every position holds the same value.
///
/// Storage is a single element, so every stride is 0. Indexed assignment and
/// resizing are rejected with [`ArrayError::UnsupportedMutation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fill<T> {
    value: T,
    dims: Dims,
}

impl<T> Fill<T> {
    pub fn new(value: T, dims: &[usize]) -> Self {
        Self {
            value,
            dims: Dims::from_slice(dims),
        }
    }

    /// The repeated value.
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T> Container for Fill<T> {
    type Elem = T;
    type Bare = Fill<T>;
    type Similar<U: Clone + Default> = DenseArray<U>;
    type Reshaped = Fill<T>;
    type Iter<'a>
        = std::iter::Take<std::iter::Repeat<&'a T>>
    where
        T: 'a;

    const SUPPORTS_SET: bool = false;
    const SUPPORTS_RESIZE: bool = false;

    fn dims(&self) -> Dims {
        self.dims.clone()
    }

    fn strides(&self) -> Strides {
        SmallVec::from_elem(0, self.dims.len())
    }

    fn at_linear(&self, index: usize) -> Option<&T> {
        (index < self.len()).then_some(&self.value)
    }

    fn iter(&self) -> Self::Iter<'_> {
        std::iter::repeat(&self.value).take(self.len())
    }

    fn select(&self, sel: &[Sel]) -> Result<Selection<T, Self>>
    where
        T: Clone,
    {
        match plan_selection(&self.dims, sel)? {
            SelectionPlan::Scalar(_) => Ok(Selection::Element(self.value.clone())),
            SelectionPlan::Slice { dims, .. } => Ok(Selection::Slice(Fill {
                value: self.value.clone(),
                dims,
            })),
        }
    }

    fn similar<U: Clone + Default>(&self, dims: &[usize]) -> Result<DenseArray<U>> {
        Ok(DenseArray::col_major(dims))
    }

    fn reshape(self, dims: &[usize]) -> Result<Fill<T>> {
        let total: usize = dims.iter().product();
        if total != self.len() {
            return Err(ArrayError::ShapeMismatch(self.dims.to_vec(), dims.to_vec()));
        }
        Ok(Fill::new(self.value, dims))
    }

    fn broadcast_style(&self) -> BroadcastStyle {
        BroadcastStyle::Array {
            kind: FILL_STYLE,
            ndim: self.dims.len(),
        }
    }

    fn data_ids(&self) -> DataIds {
        smallvec![&self.value as *const T as usize]
    }

    fn bare(&self) -> &Fill<T> {
        self
    }

    fn into_bare(self) -> Fill<T> {
        self
    }
}
