//! Attach immutable, named metadata to array-like containers.
//!
//! This crate is a Rust port of Julia's
//! [MetadataArrays.jl](https://github.com/JuliaArrays/MetadataArrays.jl): a
//! [`MetadataArray`] owns a container and shares a read-only metadata store.
//! Code that only knows the [`Container`] protocol uses the wrapper
//! transparently; code that knows about the wrapper can read the metadata by key.
//!
//! # Core Types
//!
//! - [`MetadataArray`]: forwarding wrapper around a container `C` and a store `M`
//! - [`Metadata`] / [`MetadataStore`]: the canonical store and the store contract
//! - [`BroadcastStyle`]: execution-strategy marker, tagged by wrappers
//!
//! # Primary API
//!
//! ## Metadata access
//!
//! - [`MetadataArray::metadata`], [`MetadataArray::metadata_or`],
//!   [`MetadataArray::metadata_traced`], [`MetadataArray::metadata_keys`]
//! - [`drop_metadata`]: strip wrappers, identity on plain containers
//!
//! ## Broadcast
//!
//! - [`broadcast2`], [`broadcast3`], [`map1`]: elementwise evaluation over mixed
//!   wrapped and plain operands
//! - [`combine_styles`], [`resolve_styles`]: the style combinator
//!
//! # Example
//!
//! ```rust
//! use metadata_arrays::prelude::*;
//! use serde_json::json;
//!
//! let names = vec!["John", "John", "Jane", "Louise"];
//! let w = MetadataArray::new(
//!     names,
//!     metadata!(groups = json!({"John": "Treatment", "Jane": "Placebo", "Louise": "Placebo"})),
//! );
//!
//! assert_eq!(w.metadata_keys(), vec!["groups"]);
//! assert_eq!(w.metadata("groups").unwrap()["John"], "Treatment");
//!
//! // Scalars come back bare, slices keep the metadata.
//! assert_eq!(w.get(&sel![1]).unwrap(), Selection::Element("John"));
//! let head = w.get(&sel![0..2]).unwrap().into_slice().unwrap();
//! assert!(head.shares_metadata_with(&w));
//! ```
//!
//! # Broadcasting Example
//!
//! ```rust
//! use metadata_arrays::prelude::*;
//! use dense_array::DenseArray;
//!
//! let w = MetadataArray::new(vec![1.0, 2.0, 3.0], metadata!(unit = "m"));
//! let col = DenseArray::from_vec(vec![10.0, 20.0], &[1, 2]).unwrap();
//!
//! let out = broadcast2(&w, &col, |x, y| x + y).unwrap();
//! assert!(out.style().is_tagged());
//! assert_eq!(out.result().dims(), &[3, 2]);
//! ```

mod access;
mod array;
pub mod broadcast;
mod convert;
mod forward;
mod maybe_sync;
pub mod store;

// ============================================================================
// Wrapper
// ============================================================================
pub use array::{MetadataArray, MetadataMatrix, MetadataVector};

// ============================================================================
// Metadata access
// ============================================================================
pub use access::{
    drop_metadata, find_metadata, metadata, metadata_keys, metadata_or, metadata_support, unwrap,
    MetadataSupport, Provenance,
};

// ============================================================================
// Metadata store
// ============================================================================
pub use store::{FromStore, IntoMetadata, Metadata, MetadataStore, Value};

// ============================================================================
// Conversion
// ============================================================================
pub use convert::ConvertContainer;

// ============================================================================
// Broadcast operations
// ============================================================================
pub use broadcast::{broadcast2, broadcast3, map1, resolve2, resolve3, style_of, Broadcasted};
pub use maybe_sync::{MaybeSend, MaybeSendSync, MaybeSync};

// ============================================================================
// Host-ecosystem contract
// ============================================================================
pub use array_traits::{
    combine_styles, resolve_styles, sel, ArrayError, BroadcastStyle, Container, Sel, Selection,
};

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        broadcast2, broadcast3, drop_metadata, map1, metadata, sel, BroadcastStyle, Container,
        Metadata, MetadataArray, MetadataStore, Sel, Selection,
    };
}

// ============================================================================
// Constants
// ============================================================================

/// Minimum number of output elements before broadcast evaluation is split
/// across threads (with the `parallel` feature).
pub const MIN_THREAD_LENGTH: usize = 1 << 15;

// ============================================================================
// Error types
// ============================================================================

/// Errors raised by metadata access, conversion and broadcasting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetadataError {
    /// A metadata key was read without a default and is absent.
    #[error("metadata key not found: {0}")]
    MissingMetadataKey(String),

    /// The target container or store type cannot accept the source.
    #[error("cannot convert to {target}: {reason}")]
    IncompatibleConversion {
        target: &'static str,
        reason: String,
    },

    /// Error surfaced from the wrapped container or the style combinator.
    #[error(transparent)]
    Array(#[from] ArrayError),
}

/// Result type for metadata array operations.
pub type Result<T> = std::result::Result<T, MetadataError>;
