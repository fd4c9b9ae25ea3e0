//! Zero-dimensional container.

use array_traits::{
    plan_selection, Container, DataIds, Dims, Sel, Selection, SelectionPlan, Strides,
};
use smallvec::smallvec;

use crate::dense::DenseArray;
use crate::{ArrayError, Result};

/// A single value seen as a 0-d container.
///
/// Scalars take part in broadcasts with style `Default(0)` and are indexed
/// with zero terms (or trailing `At(0)` terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scalar<T>(pub T);

impl<T> Scalar<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Container for Scalar<T> {
    type Elem = T;
    type Bare = Scalar<T>;
    type Similar<U: Clone + Default> = DenseArray<U>;
    type Reshaped = DenseArray<T>;
    type Iter<'a>
        = std::iter::Once<&'a T>
    where
        T: 'a;

    const SUPPORTS_SET: bool = true;
    const SUPPORTS_RESIZE: bool = false;

    fn dims(&self) -> Dims {
        Dims::new()
    }

    fn strides(&self) -> Strides {
        Strides::new()
    }

    fn at_linear(&self, index: usize) -> Option<&T> {
        (index == 0).then_some(&self.0)
    }

    fn iter(&self) -> Self::Iter<'_> {
        std::iter::once(&self.0)
    }

    fn select(&self, sel: &[Sel]) -> Result<Selection<T, Self>>
    where
        T: Clone,
    {
        match plan_selection(&[], sel)? {
            SelectionPlan::Scalar(_) => Ok(Selection::Element(self.0.clone())),
            SelectionPlan::Slice { dims, .. } => Err(ArrayError::RankMismatch(0, dims.len())),
        }
    }

    fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
        if !indices.iter().all(|&i| i == 0) {
            return Err(ArrayError::RankMismatch(0, indices.len()));
        }
        self.0 = value;
        Ok(())
    }

    fn similar<U: Clone + Default>(&self, dims: &[usize]) -> Result<DenseArray<U>> {
        Ok(DenseArray::col_major(dims))
    }

    fn reshape(self, dims: &[usize]) -> Result<DenseArray<T>> {
        DenseArray::from_vec(vec![self.0], dims)
    }

    fn data_ids(&self) -> DataIds {
        smallvec![&self.0 as *const T as usize]
    }

    fn bare(&self) -> &Scalar<T> {
        self
    }

    fn into_bare(self) -> Scalar<T> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use array_traits::BroadcastStyle;

    #[test]
    fn test_scalar_is_zero_dimensional() {
        let s = Scalar(3.0f64);
        assert_eq!(s.ndim(), 0);
        assert_eq!(s.len(), 1);
        assert_eq!(s.at(&[]), Some(&3.0));
        assert_eq!(s.broadcast_style(), BroadcastStyle::Default(0));
    }

    #[test]
    fn test_scalar_select_and_set() {
        let mut s = Scalar(1i32);
        assert_eq!(s.select(&[]).unwrap(), Selection::Element(1));
        assert_eq!(s.select(&[Sel::At(0)]).unwrap(), Selection::Element(1));
        assert!(s.select(&[Sel::All]).is_err());
        s.set(&[], 9).unwrap();
        assert_eq!(s.into_inner(), 9);
    }

    #[test]
    fn test_scalar_reshape() {
        let r = Scalar(5u8).reshape(&[1, 1]).unwrap();
        assert_eq!(r.dims(), &[1, 1]);
        assert!(Scalar(5u8).reshape(&[2]).is_err());
    }
}
