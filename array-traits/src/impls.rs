//! [`Container`] implementations for foreign container types.

use smallvec::smallvec;

use crate::container::{col_major_linear, Container, DataIds, Dims, Selection, Strides};
use crate::index::{plan_selection, Sel, SelectionPlan};
use crate::{ArrayError, Result};

// ============================================================================
// Vec<T>: one-dimensional, settable and resizable
// ============================================================================

impl<T> Container for Vec<T> {
    type Elem = T;
    type Bare = Vec<T>;
    type Similar<U: Clone + Default> = Vec<U>;
    type Reshaped = Vec<T>;
    type Iter<'a>
        = std::slice::Iter<'a, T>
    where
        T: 'a;

    const SUPPORTS_SET: bool = true;
    const SUPPORTS_RESIZE: bool = true;

    fn dims(&self) -> Dims {
        smallvec![Vec::len(self)]
    }

    fn strides(&self) -> Strides {
        smallvec![1]
    }

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn at_linear(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.as_slice().iter()
    }

    fn select(&self, sel: &[Sel]) -> Result<Selection<T, Self>>
    where
        T: Clone,
    {
        match plan_selection(&[Vec::len(self)], sel)? {
            SelectionPlan::Scalar(i) => Ok(Selection::Element(self[i].clone())),
            SelectionPlan::Slice { dims, indices } => {
                if dims.len() != 1 {
                    return Err(ArrayError::RankMismatch(1, dims.len()));
                }
                Ok(Selection::Slice(
                    indices.iter().map(|&i| self[i].clone()).collect(),
                ))
            }
        }
    }

    fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
        let i = col_major_linear(&[Vec::len(self)], indices)?;
        self[i] = value;
        Ok(())
    }

    fn try_resize(&mut self, len: usize, fill: T) -> Result<()>
    where
        T: Clone,
    {
        self.resize(len, fill);
        Ok(())
    }

    fn try_push(&mut self, value: T) -> Result<()> {
        self.push(value);
        Ok(())
    }

    fn similar<U: Clone + Default>(&self, dims: &[usize]) -> Result<Vec<U>> {
        match dims {
            [n] => Ok(vec![U::default(); *n]),
            _ => Err(ArrayError::RankMismatch(1, dims.len())),
        }
    }

    fn reshape(self, dims: &[usize]) -> Result<Vec<T>> {
        let total: usize = dims.iter().product();
        if total != Vec::len(&self) {
            return Err(ArrayError::ShapeMismatch(vec![Vec::len(&self)], dims.to_vec()));
        }
        if dims.len() != 1 {
            return Err(ArrayError::RankMismatch(1, dims.len()));
        }
        Ok(self)
    }

    fn data_ids(&self) -> DataIds {
        smallvec![self.as_ptr() as usize]
    }

    #[inline]
    fn bare(&self) -> &Vec<T> {
        self
    }

    #[inline]
    fn into_bare(self) -> Vec<T> {
        self
    }
}

// ============================================================================
// ndarray::ArrayD<T>
// ============================================================================

#[cfg(feature = "ndarray")]
mod ndarray_impl {
    use ndarray::{ArrayD, IxDyn, ShapeBuilder};
    use smallvec::smallvec;

    use super::*;
    use crate::container::DataIds;

    fn col_major_to_cartesian(dims: &[usize], mut linear: usize) -> Vec<usize> {
        dims.iter()
            .map(|&d| {
                let i = linear % d;
                linear /= d;
                i
            })
            .collect()
    }

    fn from_col_major<T>(dims: &[usize], data: Vec<T>) -> Result<ArrayD<T>> {
        let len = data.len();
        ArrayD::from_shape_vec(IxDyn(dims).f(), data)
            .map_err(|_| ArrayError::ShapeMismatch(vec![len], dims.to_vec()))
    }

    impl<T: Clone> Container for ArrayD<T> {
        type Elem = T;
        type Bare = ArrayD<T>;
        type Similar<U: Clone + Default> = ArrayD<U>;
        type Reshaped = ArrayD<T>;
        type Iter<'a>
            = ndarray::iter::Iter<'a, T, IxDyn>
        where
            T: 'a;

        const SUPPORTS_SET: bool = true;
        const SUPPORTS_RESIZE: bool = false;

        fn dims(&self) -> Dims {
            Dims::from_slice(self.shape())
        }

        fn strides(&self) -> Strides {
            Strides::from_slice(ArrayD::strides(self))
        }

        fn at_linear(&self, index: usize) -> Option<&T> {
            if index >= ArrayD::len(self) {
                return None;
            }
            let idx = col_major_to_cartesian(self.shape(), index);
            ArrayD::get(self, IxDyn(&idx))
        }

        fn iter(&self) -> Self::Iter<'_> {
            ArrayD::iter(self)
        }

        fn select(&self, sel: &[Sel]) -> Result<Selection<T, Self>> {
            match plan_selection(self.shape(), sel)? {
                SelectionPlan::Scalar(i) => Ok(Selection::Element(
                    self.at_linear(i).cloned().ok_or(ArrayError::OffsetOverflow)?,
                )),
                SelectionPlan::Slice { dims, indices } => {
                    let data = indices
                        .iter()
                        .map(|&i| self.at_linear(i).cloned().ok_or(ArrayError::OffsetOverflow))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(Selection::Slice(from_col_major(&dims, data)?))
                }
            }
        }

        fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
            col_major_linear(self.shape(), indices)?;
            if let Some(slot) = ArrayD::get_mut(self, IxDyn(indices)) {
                *slot = value;
            }
            Ok(())
        }

        fn similar<U: Clone + Default>(&self, dims: &[usize]) -> Result<ArrayD<U>> {
            Ok(ArrayD::from_elem(IxDyn(dims), U::default()))
        }

        fn reshape(self, dims: &[usize]) -> Result<ArrayD<T>> {
            let total: usize = dims.iter().product();
            if total != ArrayD::len(&self) {
                return Err(ArrayError::ShapeMismatch(self.shape().to_vec(), dims.to_vec()));
            }
            // Reversed axes iterate in column-major order of the original.
            let data: Vec<T> = self.t().iter().cloned().collect();
            from_col_major(dims, data)
        }

        fn data_ids(&self) -> DataIds {
            smallvec![self.as_ptr() as usize]
        }

        fn bare(&self) -> &ArrayD<T> {
            self
        }

        fn into_bare(self) -> ArrayD<T> {
            self
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_ndarray_linear_order_is_col_major() {
            let a = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1, 2, 3, 4, 5, 6]).unwrap();
            // Row-major storage: a[[1, 0]] == 4 sits at column-major linear index 1.
            assert_eq!(a.at_linear(1), Some(&4));
            let r = Container::reshape(a, &[6]).unwrap();
            assert_eq!(r.iter().copied().collect::<Vec<_>>(), vec![1, 4, 2, 5, 3, 6]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_forwarding_queries() {
        let v = vec![10, 20, 30];
        assert_eq!(Container::dims(&v).as_slice(), &[3]);
        assert_eq!(Container::ndim(&v), 1);
        assert_eq!(Container::last_index(&v), Some(2));
        assert_eq!(Container::at(&v, &[1]), Some(&20));
        assert!(Container::contains(&v, &30));
        assert_eq!(Container::keys(&v), 0..3);
    }

    #[test]
    fn test_vec_select() {
        let v = vec!['a', 'b', 'c', 'd'];
        assert_eq!(v.select(&[Sel::At(2)]).unwrap(), Selection::Element('c'));
        assert_eq!(
            v.select(&[Sel::List(vec![3, 0])]).unwrap(),
            Selection::Slice(vec!['d', 'a'])
        );
    }

    #[test]
    fn test_vec_mutation() {
        let mut v = vec![1, 2];
        Container::set(&mut v, &[0], 5).unwrap();
        Container::try_push(&mut v, 3).unwrap();
        Container::try_resize(&mut v, 4, 0).unwrap();
        assert_eq!(v, vec![5, 2, 3, 0]);
        assert!(Container::set(&mut v, &[9], 1).is_err());
    }

    #[test]
    fn test_vec_similar_and_reshape() {
        let v = vec![1.0f64, 2.0];
        let s: Vec<u8> = v.similar(&[3]).unwrap();
        assert_eq!(s, vec![0, 0, 0]);
        assert_eq!(
            v.similar::<u8>(&[2, 2]).unwrap_err(),
            ArrayError::RankMismatch(1, 2)
        );
        assert_eq!(
            v.reshape(&[3]).unwrap_err(),
            ArrayError::ShapeMismatch(vec![2], vec![3])
        );
    }
}
