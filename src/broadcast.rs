//! Elementwise broadcasting over wrapped and plain containers.
//!
//! Every operation first resolves the combined [`BroadcastStyle`] of its
//! operands, so an undecidable combination fails before any element is
//! read. Operands are then stripped to their bare payloads and evaluated
//! into a fresh column-major [`DenseArray`].
//!
//! Shapes follow Julia's rule: per axis, extents must agree or be 1, and a
//! lower-rank operand is padded with trailing singleton axes.
//!
//! The result carries no metadata. Callers that want the output wrapped can
//! do so explicitly, e.g. with [`crate::MetadataArray::from_shared`].

use array_traits::{combine_styles, ArrayError, BroadcastStyle, Container, Dims};
use dense_array::DenseArray;
use tracing::debug;

use crate::maybe_sync::{MaybeSend, MaybeSendSync, MaybeSync};
use crate::Result;

/// Output of a broadcast: the resolved style and the computed array.
#[derive(Debug, Clone, PartialEq)]
pub struct Broadcasted<T> {
    style: BroadcastStyle,
    result: DenseArray<T>,
}

impl<T> Broadcasted<T> {
    /// Combined style of the operands, tagged when any operand was wrapped.
    pub fn style(&self) -> &BroadcastStyle {
        &self.style
    }

    /// The untagged style that decided the execution engine.
    pub fn exec_style(&self) -> &BroadcastStyle {
        self.style.inner()
    }

    pub fn result(&self) -> &DenseArray<T> {
        &self.result
    }

    pub fn into_result(self) -> DenseArray<T> {
        self.result
    }
}

// ============================================================================
// Style resolution
// ============================================================================

/// Broadcast style of a single operand.
pub fn style_of<A: Container + ?Sized>(a: &A) -> BroadcastStyle {
    a.broadcast_style()
}

fn combine_logged(left: &BroadcastStyle, right: &BroadcastStyle) -> Result<BroadcastStyle> {
    match combine_styles(left, right) {
        Ok(style) => {
            debug!(%left, %right, %style, "resolved broadcast style");
            Ok(style)
        }
        Err(e) => {
            debug!(%left, %right, "undecidable broadcast style");
            Err(e.into())
        }
    }
}

/// Combined style of two operands.
pub fn resolve2<A, B>(a: &A, b: &B) -> Result<BroadcastStyle>
where
    A: Container + ?Sized,
    B: Container + ?Sized,
{
    combine_logged(&a.broadcast_style(), &b.broadcast_style())
}

/// Combined style of three operands, folded left to right.
pub fn resolve3<A, B, C>(a: &A, b: &B, c: &C) -> Result<BroadcastStyle>
where
    A: Container + ?Sized,
    B: Container + ?Sized,
    C: Container + ?Sized,
{
    let ab = resolve2(a, b)?;
    combine_logged(&ab, &c.broadcast_style())
}

// ============================================================================
// Shape promotion
// ============================================================================

/// Compute a common broadcast shape across multiple operands.
///
/// Per axis, extents must be equal or 1, and the result is the non-1 extent.
/// Missing trailing axes count as 1.
pub(crate) fn broadcast_shape(dims_list: &[&[usize]]) -> Result<Dims> {
    let rank = dims_list.iter().map(|d| d.len()).max().unwrap_or(0);

    let mut out = Dims::from_elem(1, rank);
    for (axis, slot) in out.iter_mut().enumerate() {
        let mut target = 1usize;
        for dims in dims_list {
            let n = dims.get(axis).copied().unwrap_or(1);
            if n == 1 {
                continue;
            }
            if target == 1 {
                target = n;
            } else if target != n {
                return Err(ArrayError::ShapeMismatch(dims_list[0].to_vec(), dims.to_vec()).into());
            }
        }
        *slot = target;
    }

    Ok(out)
}

/// Column-major linear strides of `src_dims` promoted to `target_dims`.
///
/// Axes where the source has extent 1 and the target does not get stride 0,
/// so the single element repeats along them.
pub(crate) fn promote_strides_to_shape(target_dims: &[usize], src_dims: &[usize]) -> Result<Vec<usize>> {
    if src_dims.len() > target_dims.len() {
        return Err(ArrayError::RankMismatch(src_dims.len(), target_dims.len()).into());
    }

    let mut out = Vec::with_capacity(target_dims.len());
    let mut acc = 1usize;
    for (axis, &tdim) in target_dims.iter().enumerate() {
        let sdim = src_dims.get(axis).copied().unwrap_or(1);
        if sdim == tdim {
            out.push(acc);
        } else if sdim == 1 {
            out.push(0);
        } else {
            return Err(ArrayError::ShapeMismatch(src_dims.to_vec(), target_dims.to_vec()).into());
        }
        acc *= sdim;
    }

    Ok(out)
}

/// Source linear index of output position `linear`.
#[inline]
fn source_index(mut linear: usize, dims: &[usize], strides: &[usize]) -> usize {
    let mut index = 0;
    for (&d, &s) in dims.iter().zip(strides.iter()) {
        index += (linear % d) * s;
        linear /= d;
    }
    index
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate `eval` at every output position, in column-major order.
///
/// Returns `None` when any position could not be read.
fn collect_linear<D, F>(total: usize, eval: F) -> Option<Vec<D>>
where
    D: MaybeSend,
    F: Fn(usize) -> Option<D> + MaybeSendSync,
{
    #[cfg(feature = "parallel")]
    if total > crate::MIN_THREAD_LENGTH {
        use rayon::prelude::*;
        return (0..total).into_par_iter().map(eval).collect();
    }

    (0..total).map(eval).collect()
}

fn finish<D>(style: BroadcastStyle, dims: &[usize], data: Option<Vec<D>>) -> Result<Broadcasted<D>> {
    let data = data.ok_or(ArrayError::OffsetOverflow)?;
    Ok(Broadcasted {
        style,
        result: DenseArray::from_vec(data, dims)?,
    })
}

fn log_engine(style: &BroadcastStyle, dims: &[usize], operands: usize) {
    let total: usize = dims.iter().product();
    let parallel = cfg!(feature = "parallel") && total > crate::MIN_THREAD_LENGTH;
    debug!(
        exec_style = %style.inner(),
        tagged = style.is_tagged(),
        ?dims,
        operands,
        parallel,
        "broadcast"
    );
}

/// Apply `f` to every element of `a`.
///
/// ```
/// use metadata_arrays::{map1, metadata, MetadataArray};
///
/// let w = MetadataArray::new(vec![1, 2, 3], metadata!(unit = "m"));
/// let out = map1(&w, |x| x * 2).unwrap();
/// assert_eq!(out.result().data(), &[2, 4, 6]);
/// assert!(out.style().is_tagged());
/// ```
pub fn map1<A, D, F>(a: &A, f: F) -> Result<Broadcasted<D>>
where
    A: Container + ?Sized,
    A::Bare: MaybeSync,
    D: MaybeSend,
    F: Fn(&A::Elem) -> D + MaybeSendSync,
{
    let style = a.broadcast_style();
    let ba = a.bare();
    let dims = ba.dims();
    log_engine(&style, &dims, 1);

    let data = collect_linear(ba.len(), |k| ba.at_linear(k).map(&f));
    finish(style, &dims, data)
}

/// Elementwise `f(a, b)` with shape broadcasting.
///
/// Fails with [`ArrayError::UndecidableStyle`] (wrapped in
/// [`crate::MetadataError::Array`]) before evaluation when the operand styles
/// cannot be combined, and with [`ArrayError::ShapeMismatch`] when the
/// shapes do not broadcast.
pub fn broadcast2<A, B, D, F>(a: &A, b: &B, f: F) -> Result<Broadcasted<D>>
where
    A: Container + ?Sized,
    B: Container + ?Sized,
    A::Bare: MaybeSync,
    B::Bare: MaybeSync,
    D: MaybeSend,
    F: Fn(&A::Elem, &B::Elem) -> D + MaybeSendSync,
{
    let style = resolve2(a, b)?;
    let (ba, bb) = (a.bare(), b.bare());
    let (da, db) = (ba.dims(), bb.dims());

    let dims = broadcast_shape(&[&da, &db])?;
    let sa = promote_strides_to_shape(&dims, &da)?;
    let sb = promote_strides_to_shape(&dims, &db)?;
    log_engine(&style, &dims, 2);

    let data = collect_linear(dims.iter().product(), |k| {
        let x = ba.at_linear(source_index(k, &dims, &sa))?;
        let y = bb.at_linear(source_index(k, &dims, &sb))?;
        Some(f(x, y))
    });
    finish(style, &dims, data)
}

/// Elementwise `f(a, b, c)` with shape broadcasting.
pub fn broadcast3<A, B, C, D, F>(a: &A, b: &B, c: &C, f: F) -> Result<Broadcasted<D>>
where
    A: Container + ?Sized,
    B: Container + ?Sized,
    C: Container + ?Sized,
    A::Bare: MaybeSync,
    B::Bare: MaybeSync,
    C::Bare: MaybeSync,
    D: MaybeSend,
    F: Fn(&A::Elem, &B::Elem, &C::Elem) -> D + MaybeSendSync,
{
    let style = resolve3(a, b, c)?;
    let (ba, bb, bc) = (a.bare(), b.bare(), c.bare());
    let (da, db, dc) = (ba.dims(), bb.dims(), bc.dims());

    let dims = broadcast_shape(&[&da, &db, &dc])?;
    let sa = promote_strides_to_shape(&dims, &da)?;
    let sb = promote_strides_to_shape(&dims, &db)?;
    let sc = promote_strides_to_shape(&dims, &dc)?;
    log_engine(&style, &dims, 3);

    let data = collect_linear(dims.iter().product(), |k| {
        let x = ba.at_linear(source_index(k, &dims, &sa))?;
        let y = bb.at_linear(source_index(k, &dims, &sb))?;
        let z = bc.at_linear(source_index(k, &dims, &sc))?;
        Some(f(x, y, z))
    });
    finish(style, &dims, data)
}
