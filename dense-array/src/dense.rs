//! Owned strided multidimensional array.

use std::ops::{Index, IndexMut};
use std::sync::Arc;

use array_traits::{
    col_major_linear, col_major_strides, plan_selection, row_major_strides, Container, DataIds,
    Dims, Sel, Selection, SelectionPlan, Strides,
};
use num_traits::{One, Zero};
use smallvec::smallvec;

use crate::{ArrayError, Result};

// ============================================================================
// Validation helpers
// ============================================================================

/// Validate that all accessed offsets stay within `[0, len)`.
fn validate_bounds(len: usize, dims: &[usize], strides: &[isize], offset: isize) -> Result<()> {
    if dims.len() != strides.len() {
        return Err(ArrayError::StrideLengthMismatch);
    }
    // Empty array - no access needed
    if dims.iter().any(|&d| d == 0) {
        return Ok(());
    }
    let mut min_offset = offset;
    let mut max_offset = offset;
    for (&dim, &stride) in dims.iter().zip(strides.iter()) {
        if dim > 1 {
            let end = stride
                .checked_mul(dim as isize - 1)
                .ok_or(ArrayError::OffsetOverflow)?;
            if end >= 0 {
                max_offset = max_offset
                    .checked_add(end)
                    .ok_or(ArrayError::OffsetOverflow)?;
            } else {
                min_offset = min_offset
                    .checked_add(end)
                    .ok_or(ArrayError::OffsetOverflow)?;
            }
        }
    }
    if min_offset < 0 || max_offset < 0 {
        return Err(ArrayError::OffsetOverflow);
    }
    if max_offset as usize >= len {
        return Err(ArrayError::OffsetOverflow);
    }
    Ok(())
}

// ============================================================================
// DenseArray
// ============================================================================

/// Owned strided multidimensional array.
///
/// Supports both column-major (Julia default) and row-major (C default)
/// layouts. Linear indexing is always column-major over the logical dims,
/// independent of the storage layout.
pub struct DenseArray<T> {
    data: Vec<T>,
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

impl<T: std::fmt::Debug> std::fmt::Debug for DenseArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseArray")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("data", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Clone> Clone for DenseArray<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

/// Logical equality: same dims and same elements in linear order.
impl<T: PartialEq> PartialEq for DenseArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims && self.iter().eq(other.iter())
    }
}

impl<T: Clone + Default> DenseArray<T> {
    /// Create a column-major (Julia default) array filled with Default values.
    pub fn col_major(dims: &[usize]) -> Self {
        let total: usize = dims.iter().product();
        Self {
            data: vec![T::default(); total],
            dims: Arc::from(dims),
            strides: Arc::from(col_major_strides(dims).as_slice()),
            offset: 0,
        }
    }

    /// Create a row-major (C default) array filled with Default values.
    pub fn row_major(dims: &[usize]) -> Self {
        let total: usize = dims.iter().product();
        Self {
            data: vec![T::default(); total],
            dims: Arc::from(dims),
            strides: Arc::from(row_major_strides(dims).as_slice()),
            offset: 0,
        }
    }
}

impl<T: Clone + Zero> DenseArray<T> {
    /// Column-major array of zeros.
    pub fn zeros(dims: &[usize]) -> Self {
        Self::filled(dims, T::zero())
    }
}

impl<T: Clone + One> DenseArray<T> {
    /// Column-major array of ones.
    pub fn ones(dims: &[usize]) -> Self {
        Self::filled(dims, T::one())
    }
}

impl<T> DenseArray<T> {
    /// Column-major array with `value` at every position.
    pub fn filled(dims: &[usize], value: T) -> Self
    where
        T: Clone,
    {
        let total: usize = dims.iter().product();
        Self {
            data: vec![value; total],
            dims: Arc::from(dims),
            strides: Arc::from(col_major_strides(dims).as_slice()),
            offset: 0,
        }
    }

    /// Create a column-major array with values produced by a function.
    ///
    /// The function is called with indices in column-major iteration order.
    pub fn from_fn_col_major(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Self {
        let total: usize = dims.iter().product();
        let rank = dims.len();
        let mut data = Vec::with_capacity(total);
        let mut idx = vec![0usize; rank];
        for _ in 0..total {
            data.push(f(&idx));
            for d in 0..rank {
                idx[d] += 1;
                if idx[d] < dims[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(col_major_strides(dims).as_slice()),
            offset: 0,
        }
    }

    /// Take ownership of column-major data.
    pub fn from_vec(data: Vec<T>, dims: &[usize]) -> Result<Self> {
        let total: usize = dims.iter().product();
        if total != data.len() {
            return Err(ArrayError::ShapeMismatch(vec![data.len()], dims.to_vec()));
        }
        Ok(Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(col_major_strides(dims).as_slice()),
            offset: 0,
        })
    }

    /// Create from raw parts.
    pub fn from_parts(data: Vec<T>, dims: &[usize], strides: &[isize], offset: isize) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Whether storage is exactly the column-major layout of the dims.
    pub fn is_col_major_contiguous(&self) -> bool {
        self.offset == 0
            && self.data.len() == self.len()
            && *self.strides == *col_major_strides(&self.dims).as_slice()
    }

    /// Storage offset of a cartesian position.
    fn offset_of(&self, indices: &[usize]) -> Result<usize> {
        col_major_linear(&self.dims, indices)?;
        let off = indices
            .iter()
            .zip(self.strides.iter())
            .fold(self.offset, |acc, (&i, &s)| acc + i as isize * s);
        Ok(off as usize)
    }

    /// Storage offset of a column-major linear index.
    fn offset_of_linear(&self, mut linear: usize) -> usize {
        let mut off = self.offset;
        for (&d, &s) in self.dims.iter().zip(self.strides.iter()) {
            off += (linear % d) as isize * s;
            linear /= d;
        }
        off as usize
    }

    /// Element at a cartesian position.
    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        self.offset_of(indices).ok().map(|off| &self.data[off])
    }

    /// Mutable element at a cartesian position.
    pub fn get_mut(&mut self, indices: &[usize]) -> Option<&mut T> {
        let off = self.offset_of(indices).ok()?;
        Some(&mut self.data[off])
    }

    /// Iterate over all elements in column-major linear order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            array: self,
            next: 0,
            len: self.len(),
        }
    }

    /// Copy the elements into a fresh column-major array.
    pub fn to_col_major(&self) -> Self
    where
        T: Clone,
    {
        Self {
            data: self.iter().cloned().collect(),
            dims: self.dims.clone(),
            strides: Arc::from(col_major_strides(&self.dims).as_slice()),
            offset: 0,
        }
    }

    /// Elementwise conversion into another element type.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> std::result::Result<U, E>) -> std::result::Result<DenseArray<U>, E>
    where
        T: Clone,
    {
        let dense = if self.is_col_major_contiguous() {
            self
        } else {
            self.to_col_major()
        };
        let data = dense
            .data
            .into_iter()
            .map(f)
            .collect::<std::result::Result<Vec<U>, E>>()?;
        Ok(DenseArray {
            data,
            dims: dense.dims,
            strides: dense.strides,
            offset: 0,
        })
    }

    /// Consume into a `Vec` in column-major linear order.
    pub fn into_vec(self) -> Vec<T>
    where
        T: Clone,
    {
        if self.is_col_major_contiguous() {
            self.data
        } else {
            self.iter().cloned().collect()
        }
    }
}

/// Iterator over a [`DenseArray`] in column-major linear order.
pub struct Iter<'a, T> {
    array: &'a DenseArray<T>,
    next: usize,
    len: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.next >= self.len {
            return None;
        }
        let off = self.array.offset_of_linear(self.next);
        self.next += 1;
        Some(&self.array.data[off])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.len - self.next;
        (rest, Some(rest))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> Index<&[usize]> for DenseArray<T> {
    type Output = T;

    fn index(&self, indices: &[usize]) -> &T {
        match self.offset_of(indices) {
            Ok(off) => &self.data[off],
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> IndexMut<&[usize]> for DenseArray<T> {
    fn index_mut(&mut self, indices: &[usize]) -> &mut T {
        match self.offset_of(indices) {
            Ok(off) => &mut self.data[off],
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> From<Vec<T>> for DenseArray<T> {
    fn from(data: Vec<T>) -> Self {
        let dims = [data.len()];
        Self {
            data,
            dims: Arc::from(&dims[..]),
            strides: Arc::from(&[1isize][..]),
            offset: 0,
        }
    }
}

// ============================================================================
// Container
// ============================================================================

impl<T> Container for DenseArray<T> {
    type Elem = T;
    type Bare = DenseArray<T>;
    type Similar<U: Clone + Default> = DenseArray<U>;
    type Reshaped = DenseArray<T>;
    type Iter<'a>
        = Iter<'a, T>
    where
        T: 'a;

    const SUPPORTS_SET: bool = true;
    const SUPPORTS_RESIZE: bool = false;

    fn dims(&self) -> Dims {
        Dims::from_slice(&self.dims)
    }

    fn strides(&self) -> Strides {
        Strides::from_slice(&self.strides)
    }

    #[inline]
    fn len(&self) -> usize {
        DenseArray::len(self)
    }

    fn at_linear(&self, index: usize) -> Option<&T> {
        if index >= DenseArray::len(self) {
            return None;
        }
        Some(&self.data[self.offset_of_linear(index)])
    }

    fn at(&self, indices: &[usize]) -> Option<&T> {
        DenseArray::get(self, indices)
    }

    fn iter(&self) -> Iter<'_, T> {
        DenseArray::iter(self)
    }

    fn select(&self, sel: &[Sel]) -> Result<Selection<T, Self>>
    where
        T: Clone,
    {
        match plan_selection(&self.dims, sel)? {
            SelectionPlan::Scalar(i) => {
                Ok(Selection::Element(self.data[self.offset_of_linear(i)].clone()))
            }
            SelectionPlan::Slice { dims, indices } => {
                let data = indices
                    .iter()
                    .map(|&i| self.data[self.offset_of_linear(i)].clone())
                    .collect();
                Ok(Selection::Slice(DenseArray::from_vec(data, &dims)?))
            }
        }
    }

    fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
        let off = self.offset_of(indices)?;
        self.data[off] = value;
        Ok(())
    }

    fn similar<U: Clone + Default>(&self, dims: &[usize]) -> Result<DenseArray<U>> {
        Ok(DenseArray::col_major(dims))
    }

    fn reshape(self, dims: &[usize]) -> Result<DenseArray<T>>
    where
        T: Clone,
    {
        let total: usize = dims.iter().product();
        if total != DenseArray::len(&self) {
            return Err(ArrayError::ShapeMismatch(self.dims.to_vec(), dims.to_vec()));
        }
        // Zero or overlapping strides may map several positions to one slot.
        let dense = if self.is_col_major_contiguous() {
            self
        } else {
            self.to_col_major()
        };
        DenseArray::from_vec(dense.data, dims)
    }

    fn data_ids(&self) -> DataIds {
        smallvec![self.data.as_ptr() as usize]
    }

    #[inline]
    fn bare(&self) -> &DenseArray<T> {
        self
    }

    #[inline]
    fn into_bare(self) -> DenseArray<T> {
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_parts_row_major_get() {
        let a = DenseArray::from_parts(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &[3, 1], 0)
            .unwrap();
        assert_eq!(a.get(&[0, 0]), Some(&1.0));
        assert_eq!(a.get(&[1, 0]), Some(&4.0));
        assert_eq!(a.get(&[1, 2]), Some(&6.0));
        assert_eq!(a.get(&[2, 0]), None);
    }

    #[test]
    fn test_from_parts_rejects_out_of_bounds() {
        let err = DenseArray::from_parts(vec![0.0; 4], &[2, 3], &[3, 1], 0).unwrap_err();
        assert_eq!(err, ArrayError::OffsetOverflow);
        let err = DenseArray::from_parts(vec![0.0; 6], &[2, 3], &[1], 0).unwrap_err();
        assert_eq!(err, ArrayError::StrideLengthMismatch);
    }

    #[test]
    fn test_linear_order_is_col_major() {
        let a = DenseArray::from_parts(vec![1, 2, 3, 4, 5, 6], &[2, 3], &[3, 1], 0).unwrap();
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![1, 4, 2, 5, 3, 6]);
        assert_eq!(a.at_linear(1), Some(&4));
        assert_eq!(Container::last(&a), Some(&6));
    }

    #[test]
    fn test_from_fn_col_major() {
        let a = DenseArray::from_fn_col_major(&[2, 3], |idx| (idx[0] * 10 + idx[1]) as f64);
        assert_relative_eq!(a[&[1, 2][..]], 12.0);
        assert_relative_eq!(a[&[0, 1][..]], 1.0);
        assert!(a.is_col_major_contiguous());
    }

    #[test]
    fn test_select_slice_and_scalar() {
        let a = DenseArray::from_fn_col_major(&[2, 3], |idx| idx[0] + 2 * idx[1]);
        assert_eq!(
            a.select(&[Sel::At(1), Sel::At(2)]).unwrap(),
            Selection::Element(5)
        );
        let col = a.select(&[Sel::All, Sel::At(1)]).unwrap().into_slice().unwrap();
        assert_eq!(col.dims(), &[2]);
        assert_eq!(col.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_set_and_index_mut() {
        let mut a = DenseArray::<i32>::zeros(&[2, 2]);
        Container::set(&mut a, &[1, 0], 7).unwrap();
        a[&[0, 1][..]] = 3;
        assert_eq!(a.data(), &[0, 7, 3, 0]);
        assert!(Container::set(&mut a, &[2, 0], 1).is_err());
        assert!(matches!(
            Container::try_push(&mut a, 1),
            Err(ArrayError::UnsupportedMutation { op: "push", .. })
        ));
    }

    #[test]
    fn test_reshape_row_major_copies_in_linear_order() {
        let a = DenseArray::from_parts(vec![1, 2, 3, 4, 5, 6], &[2, 3], &[3, 1], 0).unwrap();
        let r = Container::reshape(a, &[3, 2]).unwrap();
        assert!(r.is_col_major_contiguous());
        assert_eq!(r.data(), &[1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_reshape_contiguous_keeps_storage() {
        let a = DenseArray::<f64>::ones(&[2, 3]);
        let ptr = a.data().as_ptr();
        let r = Container::reshape(a, &[6]).unwrap();
        assert_eq!(r.data().as_ptr(), ptr);
        assert_eq!(r.dims(), &[6]);
    }

    #[test]
    fn test_reshape_zero_stride_repeats_slot() {
        let a = DenseArray::from_parts(vec![5], &[3], &[0], 0).unwrap();
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![5, 5, 5]);
        let r = Container::reshape(a, &[3, 1]).unwrap();
        assert_eq!(r.dims(), &[3, 1]);
        assert_eq!(r.data(), &[5, 5, 5]);
    }

    #[test]
    fn test_reshape_overlapping_strides() {
        // Windows of length 2 over [1, 2, 3].
        let a = DenseArray::from_parts(vec![1, 2, 3], &[2, 2], &[1, 1], 0).unwrap();
        let r = Container::reshape(a, &[4]).unwrap();
        assert_eq!(r.data(), &[1, 2, 2, 3]);
    }

    #[test]
    fn test_try_map() {
        let a = DenseArray::from(vec![1i64, 2, 300]);
        let ok: DenseArray<i32> = a.clone().try_map(i32::try_from).unwrap();
        assert_eq!(ok.data(), &[1, 2, 300]);
        assert!(a.try_map(u8::try_from).is_err());
    }

    #[test]
    fn test_into_vec_is_linear_order() {
        let row = DenseArray::from_parts(vec![1, 2, 3, 4], &[2, 2], &[2, 1], 0).unwrap();
        assert_eq!(row.into_vec(), vec![1, 3, 2, 4]);
        let col = DenseArray::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        assert_eq!(col.into_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_similar_is_col_major_default() {
        let a = DenseArray::<f64>::row_major(&[2, 2]);
        let s: DenseArray<u32> = a.similar(&[3, 1]).unwrap();
        assert_eq!(s.dims(), &[3, 1]);
        assert!(s.is_col_major_contiguous());
        assert!(s.iter().all(|&x| x == 0));
    }
}
