//! Shared container contract for the metadata-arrays ecosystem.
//!
//! This crate provides the trait definitions and the broadcast style hierarchy
//! shared across `dense-array`, `metadata-arrays` and external crates that want
//! their containers to be wrappable.
//!
//! External crates can depend on `array-traits` to implement [`Container`] for
//! their types without orphan rule violations.
//!
//! # Core Items
//!
//! - [`Container`]: indexable, sizeable, iterable array-like value
//! - [`Sel`] / [`plan_selection`]: index terms and the shared selection rules
//! - [`BroadcastStyle`] / [`combine_styles`]: execution-strategy markers and
//!   their pairwise combinator

pub mod container;
mod impls;
pub mod index;
pub mod style;

// ============================================================================
// Container contract
// ============================================================================
pub use container::{
    col_major_linear, col_major_strides, row_major_strides, Container, DataIds, Dims, Selection,
    Strides,
};

// ============================================================================
// Indexing
// ============================================================================
pub use index::{plan_selection, Sel, SelectionPlan};

// ============================================================================
// Broadcast styles
// ============================================================================
pub use style::{combine_styles, resolve_styles, BroadcastStyle};

/// Dynamic metadata value exposed through [`Container::find_metadata`].
pub use serde_json::Value;

// ============================================================================
// Error types
// ============================================================================

/// Errors reported by containers and the style combinator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrayError {
    /// Array ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Array shapes are incompatible for the operation.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// A position falls outside the extent of an axis.
    #[error("index {index} out of bounds for axis {axis} with extent {extent}")]
    IndexOutOfBounds {
        axis: usize,
        index: usize,
        extent: usize,
    },

    /// A stepped range with step 0.
    #[error("invalid step 0 on axis {axis}")]
    ZeroStep { axis: usize },

    /// The container rejects indexed assignment or resizing.
    #[error("{container} does not support {op}")]
    UnsupportedMutation {
        op: &'static str,
        container: &'static str,
    },

    /// Two broadcast styles have no common execution strategy.
    #[error("undecidable broadcast style: {left} vs {right}")]
    UndecidableStyle {
        left: BroadcastStyle,
        right: BroadcastStyle,
    },

    /// Stride array length doesn't match dimensions.
    #[error("stride and dims length mismatch")]
    StrideLengthMismatch,

    /// Integer overflow while computing a storage offset.
    #[error("offset overflow while computing storage offset")]
    OffsetOverflow,
}

impl ArrayError {
    /// Build an [`ArrayError::UnsupportedMutation`] naming the container type `C`.
    pub fn unsupported<C: ?Sized>(op: &'static str) -> Self {
        ArrayError::UnsupportedMutation {
            op,
            container: std::any::type_name::<C>(),
        }
    }
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, ArrayError>;
