//! Index terms and the shared selection rules.
//!
//! Every container resolves a list of [`Sel`] terms through
//! [`plan_selection`], so indexing behaves the same way whatever the storage.

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};

use crate::container::Dims;
use crate::{ArrayError, Result};

/// One index term.
///
/// This is similar to Julia's index types: an `Int` drops its axis, while
/// ranges, colons and vectors keep it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sel {
    /// A single position; drops the axis.
    At(usize),
    /// A contiguous range of positions.
    Range(Range<usize>),
    /// A strided range (start..end with step). Negative steps walk backwards
    /// from `start` down to (but excluding) `end`.
    Step { start: usize, end: usize, step: isize },
    /// The whole axis.
    All,
    /// An explicit list of positions.
    List(Vec<usize>),
}

impl Sel {
    /// Whether this term reduces the dimension.
    #[inline]
    pub fn drops_axis(&self) -> bool {
        matches!(self, Sel::At(_))
    }

    /// Resolve the term against an axis of the given extent.
    pub fn positions(&self, axis: usize, extent: usize) -> Result<Vec<usize>> {
        let check = |index: usize| {
            if index < extent {
                Ok(index)
            } else {
                Err(ArrayError::IndexOutOfBounds {
                    axis,
                    index,
                    extent,
                })
            }
        };
        match self {
            Sel::At(i) => Ok(vec![check(*i)?]),
            Sel::All => Ok((0..extent).collect()),
            Sel::Range(r) => {
                if r.end > extent && r.start < r.end {
                    return Err(ArrayError::IndexOutOfBounds {
                        axis,
                        index: r.end - 1,
                        extent,
                    });
                }
                Ok(r.clone().collect())
            }
            Sel::Step { start, end, step } => {
                // An open end (`usize::MAX`) stops at the axis extent.
                let end = if *end == usize::MAX && *step > 0 {
                    extent.max(*start)
                } else {
                    *end
                };
                let len = compute_slice_len(*start, end, *step)
                    .ok_or(ArrayError::ZeroStep { axis })?;
                (0..len)
                    .map(|k| {
                        let pos = *start as isize + k as isize * step;
                        check(pos as usize)
                    })
                    .collect()
            }
            Sel::List(v) => v.iter().map(|&i| check(i)).collect(),
        }
    }
}

/// Number of positions in a stepped range, `None` for a zero step.
fn compute_slice_len(start: usize, end: usize, step: isize) -> Option<usize> {
    if step > 0 {
        Some(end.saturating_sub(start).div_ceil(step as usize))
    } else if step < 0 {
        Some(start.saturating_sub(end).div_ceil(step.unsigned_abs()))
    } else {
        None
    }
}

impl From<usize> for Sel {
    fn from(i: usize) -> Self {
        Sel::At(i)
    }
}

impl From<Range<usize>> for Sel {
    fn from(r: Range<usize>) -> Self {
        Sel::Range(r)
    }
}

impl From<RangeInclusive<usize>> for Sel {
    fn from(r: RangeInclusive<usize>) -> Self {
        let (start, end) = r.into_inner();
        inclusive(start, end)
    }
}

impl From<RangeTo<usize>> for Sel {
    fn from(r: RangeTo<usize>) -> Self {
        Sel::Range(0..r.end)
    }
}

impl From<RangeToInclusive<usize>> for Sel {
    fn from(r: RangeToInclusive<usize>) -> Self {
        inclusive(0, r.end)
    }
}

/// `start..=end`, falling back to an open end when `end + 1` overflows.
fn inclusive(start: usize, end: usize) -> Sel {
    match end.checked_add(1) {
        Some(stop) => Sel::Range(start..stop),
        None => Sel::Step {
            start,
            end: usize::MAX,
            step: 1,
        },
    }
}

impl From<RangeFull> for Sel {
    fn from(_: RangeFull) -> Self {
        Sel::All
    }
}

impl From<Vec<usize>> for Sel {
    fn from(v: Vec<usize>) -> Self {
        Sel::List(v)
    }
}

/// `RangeFrom` needs the extent, so it resolves to a step range ending at
/// `usize::MAX`, which [`Sel::positions`] clips to the axis.
impl From<RangeFrom<usize>> for Sel {
    fn from(r: RangeFrom<usize>) -> Self {
        Sel::Step {
            start: r.start,
            end: usize::MAX,
            step: 1,
        }
    }
}

/// Build a `[Sel; N]` from index-like values.
///
/// ```
/// use array_traits::{sel, Sel};
///
/// let terms = sel![0..2, 1];
/// assert_eq!(terms, [Sel::Range(0..2), Sel::At(1)]);
/// ```
#[macro_export]
macro_rules! sel {
    ($($term:expr),* $(,)?) => {
        [$($crate::Sel::from($term)),*]
    };
}

/// Outcome of [`plan_selection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPlan {
    /// A single element at this column-major linear index.
    Scalar(usize),
    /// A sub-array: its dims and the linear indices of its elements, listed
    /// in column-major order of the result.
    Slice { dims: Dims, indices: Vec<usize> },
}

/// Resolve index terms against a container's dims.
///
/// - `k == ndim`: per-axis selection; all `At` terms give a scalar.
/// - `k == 1`, `ndim != 1`: linear indexing in column-major order.
/// - `1 < k < ndim`: trailing axes merge into the last term.
/// - `k > ndim`: extra terms index trailing singleton axes.
pub fn plan_selection(dims: &[usize], sel: &[Sel]) -> Result<SelectionPlan> {
    let ndim = dims.len();
    let k = sel.len();

    if k == 0 && ndim != 0 {
        // Julia allows `A[]` only for single-element containers.
        let total: usize = dims.iter().product();
        if total == 1 {
            return Ok(SelectionPlan::Scalar(0));
        }
        return Err(ArrayError::RankMismatch(ndim, 0));
    }

    let effective: Dims = if k >= ndim {
        let mut e = Dims::from_slice(dims);
        e.extend(std::iter::repeat(1).take(k - ndim));
        e
    } else {
        let mut e = Dims::from_slice(&dims[..k - 1]);
        e.push(dims[k - 1..].iter().product());
        e
    };

    let mut positions = Vec::with_capacity(k);
    let mut out_dims = Dims::new();
    for (axis, (term, &extent)) in sel.iter().zip(effective.iter()).enumerate() {
        let pos = term.positions(axis, extent)?;
        if !term.drops_axis() {
            out_dims.push(pos.len());
        }
        positions.push(pos);
    }

    // Column-major strides over the effective dims.
    let mut strides = Vec::with_capacity(k);
    let mut acc = 1usize;
    for &e in &effective {
        strides.push(acc);
        acc *= e;
    }

    if sel.iter().all(Sel::drops_axis) {
        let linear = positions
            .iter()
            .zip(strides.iter())
            .map(|(p, s)| p[0] * s)
            .sum();
        return Ok(SelectionPlan::Scalar(linear));
    }

    let total: usize = positions.iter().map(Vec::len).product();
    let mut indices = Vec::with_capacity(total);
    if total > 0 {
        let mut counter = vec![0usize; k];
        loop {
            indices.push(
                counter
                    .iter()
                    .enumerate()
                    .map(|(axis, &c)| positions[axis][c] * strides[axis])
                    .sum(),
            );
            // Odometer, first axis fastest.
            let mut axis = 0;
            while axis < k {
                counter[axis] += 1;
                if counter[axis] < positions[axis].len() {
                    break;
                }
                counter[axis] = 0;
                axis += 1;
            }
            if axis == k {
                break;
            }
        }
    }

    Ok(SelectionPlan::Slice {
        dims: out_dims,
        indices,
    })
}
