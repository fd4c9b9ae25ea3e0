//! Conversion of wrappers to other container and store types.

use std::any::{type_name, Any, TypeId};
use std::fmt::Display;
use std::sync::Arc;

use array_traits::Container;
use dense_array::{DenseArray, Fill, Scalar};
use tracing::{debug, trace};

use crate::array::MetadataArray;
use crate::store::{FromStore, MetadataStore};
use crate::{MetadataError, Result};

/// Conversion of a payload container into `Target`.
///
/// Element conversions go through [`TryFrom`], so lossy narrowing fails with
/// [`MetadataError::IncompatibleConversion`] instead of truncating.
pub trait ConvertContainer<Target>: Sized {
    fn convert_container(self) -> Result<Target>;
}

fn element<T, U>(x: T) -> Result<U>
where
    U: TryFrom<T>,
    <U as TryFrom<T>>::Error: Display,
{
    U::try_from(x).map_err(|e| MetadataError::IncompatibleConversion {
        target: type_name::<U>(),
        reason: e.to_string(),
    })
}

/// Move `value` into `B` when `A` and `B` are the same type.
fn cast_same<A: 'static, B: 'static>(value: A) -> std::result::Result<B, A> {
    if TypeId::of::<A>() != TypeId::of::<B>() {
        return Err(value);
    }
    let mut slot = Some(value);
    let taken = (&mut slot as &mut dyn Any)
        .downcast_mut::<Option<B>>()
        .and_then(Option::take);
    match (taken, slot) {
        (Some(b), _) => Ok(b),
        (None, Some(a)) => Err(a),
        (None, None) => unreachable!("downcast emptied the slot without yielding"),
    }
}

impl<T, U> ConvertContainer<Vec<U>> for Vec<T>
where
    U: TryFrom<T>,
    <U as TryFrom<T>>::Error: Display,
{
    fn convert_container(self) -> Result<Vec<U>> {
        self.into_iter().map(element).collect()
    }
}

impl<T, U> ConvertContainer<DenseArray<U>> for DenseArray<T>
where
    T: Clone,
    U: TryFrom<T>,
    <U as TryFrom<T>>::Error: Display,
{
    fn convert_container(self) -> Result<DenseArray<U>> {
        self.try_map(element)
    }
}

impl<T, U> ConvertContainer<DenseArray<U>> for Vec<T>
where
    U: TryFrom<T>,
    <U as TryFrom<T>>::Error: Display,
{
    fn convert_container(self) -> Result<DenseArray<U>> {
        let data: Vec<U> = self.convert_container()?;
        Ok(DenseArray::from(data))
    }
}

/// Only one-dimensional arrays fit in a `Vec`.
impl<T, U> ConvertContainer<Vec<U>> for DenseArray<T>
where
    T: Clone,
    U: TryFrom<T>,
    <U as TryFrom<T>>::Error: Display,
{
    fn convert_container(self) -> Result<Vec<U>> {
        if self.ndim() != 1 {
            return Err(MetadataError::IncompatibleConversion {
                target: type_name::<Vec<U>>(),
                reason: format!("a vector cannot hold an array of dims {:?}", self.dims()),
            });
        }
        self.into_vec().convert_container()
    }
}

impl<T, U> ConvertContainer<Fill<U>> for Fill<T>
where
    T: Clone,
    U: TryFrom<T>,
    <U as TryFrom<T>>::Error: Display,
{
    fn convert_container(self) -> Result<Fill<U>> {
        let dims = Container::dims(&self);
        Ok(Fill::new(element(self.value().clone())?, &dims))
    }
}

/// Materializes the constant array.
impl<T, U> ConvertContainer<DenseArray<U>> for Fill<T>
where
    T: Clone,
    U: TryFrom<T> + Clone,
    <U as TryFrom<T>>::Error: Display,
{
    fn convert_container(self) -> Result<DenseArray<U>> {
        let dims = Container::dims(&self);
        Ok(DenseArray::filled(&dims, element(self.value().clone())?))
    }
}

impl<T, U> ConvertContainer<Scalar<U>> for Scalar<T>
where
    U: TryFrom<T>,
    <U as TryFrom<T>>::Error: Display,
{
    fn convert_container(self) -> Result<Scalar<U>> {
        Ok(Scalar(element(self.into_inner())?))
    }
}

/// Inner wrappers convert their payload and keep their own store.
impl<C, C2, M> ConvertContainer<MetadataArray<C2, M>> for MetadataArray<C, M>
where
    C: ConvertContainer<C2>,
{
    fn convert_container(self) -> Result<MetadataArray<C2, M>> {
        let (parent, metadata) = self.into_parts();
        Ok(MetadataArray::from_shared(parent.convert_container()?, metadata))
    }
}

impl<C: 'static, M: MetadataStore + 'static> MetadataArray<C, M> {
    /// Convert to a wrapper over `C2` with store type `M2`.
    ///
    /// When both types are unchanged the wrapper is returned as is, with the
    /// same payload and the same shared store. A store of unchanged type is
    /// always shared rather than copied.
    ///
    /// ```
    /// use metadata_arrays::{metadata, Metadata, MetadataArray};
    ///
    /// let w = MetadataArray::new(vec![1u8, 2, 3], metadata!(unit = "m"));
    /// let wide: MetadataArray<Vec<i64>> = w.clone().convert::<Vec<i64>, Metadata>().unwrap();
    /// assert!(wide.shares_metadata_with(&w));
    /// assert_eq!(wide.parent(), &vec![1i64, 2, 3]);
    /// ```
    pub fn convert<C2, M2>(self) -> Result<MetadataArray<C2, M2>>
    where
        C: ConvertContainer<C2>,
        C2: 'static,
        M2: FromStore + 'static,
    {
        let this = match cast_same::<Self, MetadataArray<C2, M2>>(self) {
            Ok(same) => {
                trace!(container = type_name::<C>(), "identity conversion");
                return Ok(same);
            }
            Err(this) => this,
        };

        let (parent, metadata) = this.into_parts();
        let metadata = match cast_same::<Arc<M>, Arc<M2>>(metadata) {
            Ok(shared) => shared,
            Err(store) => Arc::new(M2::from_store(&*store)?),
        };
        let parent = parent.convert_container()?;
        debug!(
            from = type_name::<C>(),
            to = type_name::<C2>(),
            store = type_name::<M2>(),
            "converted metadata array"
        );
        Ok(MetadataArray::from_shared(parent, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata, Metadata, Value};

    #[test]
    fn test_identity_returns_same_wrapper() {
        let w = MetadataArray::new(vec![1.5f64, 2.5], metadata!(a = 1));
        let store = Arc::clone(w.metadata_store());
        let ptr = w.parent().as_ptr();
        let same = w.convert::<Vec<f64>, Metadata>().unwrap();
        assert!(Arc::ptr_eq(same.metadata_store(), &store));
        assert_eq!(same.parent().as_ptr(), ptr);
    }

    #[test]
    fn test_element_conversion_shares_store() {
        let a = DenseArray::from_vec(vec![1i32, 2, 3, 4], &[2, 2]).unwrap();
        let w = MetadataArray::new(a, metadata!(a = 1));
        let wide = w.clone().convert::<DenseArray<i64>, Metadata>().unwrap();
        assert!(wide.shares_metadata_with(&w));
        assert_eq!(wide.parent().dims(), &[2, 2]);
        assert_eq!(wide.parent().data(), &[1i64, 2, 3, 4]);
    }

    #[test]
    fn test_narrowing_failure_is_reported() {
        let w = MetadataArray::new(vec![1i32, 300], metadata!(a = 1));
        let err = w.convert::<Vec<u8>, Metadata>().unwrap_err();
        match err {
            MetadataError::IncompatibleConversion { target, .. } => assert_eq!(target, "u8"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_matrix_into_vector_is_rejected() {
        let a = DenseArray::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let w = MetadataArray::new(a, metadata!(a = 1));
        assert!(matches!(
            w.convert::<Vec<i32>, Metadata>(),
            Err(MetadataError::IncompatibleConversion { .. })
        ));

        let v = DenseArray::from(vec![1, 2]);
        let w = MetadataArray::new(v, metadata!(a = 1));
        let out = w.convert::<Vec<i64>, Metadata>().unwrap();
        assert_eq!(out.parent(), &vec![1i64, 2]);
    }

    #[test]
    fn test_store_conversion() {
        let w = MetadataArray::new(vec![1], metadata!(a = 1, b = "x"));
        let out = w
            .convert::<Vec<i32>, serde_json::Map<String, Value>>()
            .unwrap();
        assert_eq!(out.metadata_keys(), vec!["a", "b"]);
        assert_eq!(*out.metadata("b").unwrap(), "x");
    }

    #[test]
    fn test_fill_conversions() {
        let w = MetadataArray::new(Fill::new(2u8, &[2, 2]), metadata!(a = 1));
        let dense = w.clone().convert::<DenseArray<f64>, Metadata>().unwrap();
        assert_eq!(dense.parent().data(), &[2.0; 4]);
        let fill = w.convert::<Fill<u32>, Metadata>().unwrap();
        assert_eq!(*fill.parent().value(), 2u32);
    }

    #[test]
    fn test_nested_keeps_inner_store() {
        let inner = MetadataArray::new(vec![1u8], metadata!(layer = "inner"));
        let outer = MetadataArray::new(inner, metadata!(layer = "outer"));
        let out = outer
            .convert::<MetadataArray<Vec<u16>>, Metadata>()
            .unwrap();
        assert_eq!(*out.parent().metadata("layer").unwrap(), "inner");
        assert_eq!(out.parent().parent(), &vec![1u16]);
    }

    #[test]
    fn test_cast_same() {
        assert_eq!(cast_same::<u8, u8>(3), Ok(3));
        assert_eq!(cast_same::<u8, u16>(3), Err(3));
    }
}
