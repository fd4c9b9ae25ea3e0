//! Broadcast styles: execution-strategy markers and their combinator.
//!
//! Each operand of an elementwise operation reports a [`BroadcastStyle`]. The
//! styles of all operands are folded pairwise with [`combine_styles`]; the
//! outcome decides which engine runs the operation, or fails when no common
//! strategy exists.
//!
//! A forwarding wrapper reports `Tagged(style of its payload)`. Tagged styles
//! always win over untagged ones, whichever side they appear on:
//!
//! ```text
//!   combine        | Untagged(B)          | Tagged(B)
//! ----------------|----------------------|----------------------
//!   Untagged(A)    | Untagged(A ⊕ B)      | Tagged(A ⊕ B)
//!   Tagged(A)      | Tagged(A ⊕ B)        | Tagged(A ⊕ B)
//! ```
//!
//! and `A ⊕ B` being undecidable makes every cell undecidable.

use std::fmt;

use crate::{ArrayError, Result};

/// Execution strategy of a broadcast operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BroadcastStyle {
    /// Dense default strategy with the given number of dimensions.
    /// Scalars are `Default(0)`.
    Default(usize),
    /// Tuple-like operands.
    Tuple,
    /// A container family with its own strategy.
    Array { kind: &'static str, ndim: usize },
    /// A metadata wrapper deferring to the style of its payload.
    Tagged(Box<BroadcastStyle>),
}

impl BroadcastStyle {
    /// Wrap a style in a tag.
    pub fn tagged(inner: BroadcastStyle) -> Self {
        BroadcastStyle::Tagged(Box::new(inner))
    }

    pub fn is_tagged(&self) -> bool {
        matches!(self, BroadcastStyle::Tagged(_))
    }

    /// The untagged execution style beneath every tag.
    pub fn inner(&self) -> &BroadcastStyle {
        match self {
            BroadcastStyle::Tagged(inner) => inner.inner(),
            other => other,
        }
    }

    /// Dimensionality carried by the style, if any.
    pub fn ndim(&self) -> Option<usize> {
        match self.inner() {
            BroadcastStyle::Default(n) => Some(*n),
            BroadcastStyle::Array { ndim, .. } => Some(*ndim),
            _ => None,
        }
    }

    /// Pairwise combination; see [`combine_styles`].
    pub fn combine(&self, other: &BroadcastStyle) -> Result<BroadcastStyle> {
        combine_styles(self, other)
    }
}

impl fmt::Display for BroadcastStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadcastStyle::Default(n) => write!(f, "Default({n})"),
            BroadcastStyle::Tuple => write!(f, "Tuple"),
            BroadcastStyle::Array { kind, ndim } => write!(f, "Array({kind}, {ndim})"),
            BroadcastStyle::Tagged(inner) => write!(f, "Tagged({inner})"),
        }
    }
}

/// Combine two styles.
///
/// # Julia equivalent
/// ```julia
/// BroadcastStyle(::DefaultArrayStyle{N}, ::DefaultArrayStyle{M}) = DefaultArrayStyle{max(M,N)}()
/// BroadcastStyle(::Style{Tuple}, ::DefaultArrayStyle{0}) = Style{Tuple}()
/// BroadcastStyle(::Style{Tuple}, a::AbstractArrayStyle) = a
/// BroadcastStyle(a::AbstractArrayStyle{M}, ::DefaultArrayStyle{N}) = typeof(a)(Val(max(M, N)))
/// BroadcastStyle(::MetadataArrayStyle{A}, ::MetadataArrayStyle{B}) = MetadataArrayStyle(BroadcastStyle(A, B))
/// BroadcastStyle(::MetadataArrayStyle{A}, b::AbstractArrayStyle) = MetadataArrayStyle(BroadcastStyle(A, b))
/// ```
pub fn combine_styles(a: &BroadcastStyle, b: &BroadcastStyle) -> Result<BroadcastStyle> {
    use BroadcastStyle::*;

    match (a, b) {
        (Tagged(x), Tagged(y)) => Ok(BroadcastStyle::tagged(combine_styles(x, y)?)),
        (Tagged(x), plain) => Ok(BroadcastStyle::tagged(combine_styles(x, plain)?)),
        (plain, Tagged(y)) => Ok(BroadcastStyle::tagged(combine_styles(plain, y)?)),
        (Default(n), Default(m)) => Ok(Default(*n.max(m))),
        (Tuple, Tuple) => Ok(Tuple),
        (Tuple, Default(0)) | (Default(0), Tuple) => Ok(Tuple),
        (Tuple, other) | (other, Tuple) => Ok(other.clone()),
        (Array { kind, ndim }, Default(m)) | (Default(m), Array { kind, ndim }) => Ok(Array {
            kind: *kind,
            ndim: *ndim.max(m),
        }),
        (Array { kind: k1, ndim: n }, Array { kind: k2, ndim: m }) if k1 == k2 => Ok(Array {
            kind: *k1,
            ndim: *n.max(m),
        }),
        (Array { .. }, Array { .. }) => Err(ArrayError::UndecidableStyle {
            left: a.clone(),
            right: b.clone(),
        }),
    }
}

/// Fold [`combine_styles`] over any number of styles.
///
/// An empty input resolves to `Default(0)`, the scalar style.
pub fn resolve_styles<I>(styles: I) -> Result<BroadcastStyle>
where
    I: IntoIterator<Item = BroadcastStyle>,
{
    let mut iter = styles.into_iter();
    let Some(first) = iter.next() else {
        return Ok(BroadcastStyle::Default(0));
    };
    iter.try_fold(first, |acc, s| combine_styles(&acc, &s))
}
