//! Payload containers for the metadata-arrays ecosystem.
//!
//! # Core Types
//!
//! - [`DenseArray`]: Owned strided multidimensional array (column-major by default)
//! - [`Fill`]: Read-only array holding one value at every position, with its own
//!   broadcast style
//! - [`Scalar`]: Zero-dimensional container around a single value
//!
//! All three implement [`array_traits::Container`].

mod dense;
mod fill;
mod scalar;

pub use dense::{DenseArray, Iter};
pub use fill::{Fill, FILL_STYLE};
pub use scalar::Scalar;

pub use array_traits::{ArrayError, Result};
