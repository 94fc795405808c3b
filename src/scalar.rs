//! Scalar reference kernels.
//!
//! One generic implementation per operation, element by element, in index
//! order. These define the results every vectorized kernel must reproduce.
//! Unary and binary transforms take their first source as an `Option`:
//! `None` means the destination is also the source (in-place update).

use num::{PrimInt, Zero};

use crate::descriptor::{CompareOp, FloatClass, Quantifier};
use crate::error::{MathErrorKind, MathFault};
use crate::types::Element;

#[inline(always)]
fn overflow_kind<T: Element>() -> MathErrorKind {
    if T::TYPE.is_float() {
        MathErrorKind::NonFinite
    } else {
        MathErrorKind::Overflow
    }
}

/// Applies `f` element-wise from `src` (or `dst` itself) into `dst`.
#[inline(always)]
fn map_into<T: Element>(
    src: Option<&[T]>,
    dst: &mut [T],
    mut f: impl FnMut(usize, T) -> Result<T, MathFault>,
) -> Result<(), MathFault> {
    match src {
        Some(src) => {
            for (i, (out, &x)) in dst.iter_mut().zip(src).enumerate() {
                *out = f(i, x)?;
            }
        }
        None => {
            for (i, out) in dst.iter_mut().enumerate() {
                *out = f(i, *out)?;
            }
        }
    }
    Ok(())
}

/// Absolute value. Checked: `MIN` (signed integers) and non-finite floats
/// are math errors.
pub(crate) fn abs<T: Element>(
    src: Option<&[T]>,
    dst: &mut [T],
    checked: bool,
) -> Result<(), MathFault> {
    if checked {
        map_into(src, dst, |i, x| {
            x.checked_abs()
                .ok_or(MathFault::new(overflow_kind::<T>(), i))
        })
    } else {
        map_into(src, dst, |_, x| Ok(x.wrapping_abs()))
    }
}

/// `dst = lhs + rhs`, with `lhs = None` meaning `dst += rhs`.
pub(crate) fn add<T: Element>(
    lhs: Option<&[T]>,
    rhs: &[T],
    dst: &mut [T],
    checked: bool,
) -> Result<(), MathFault> {
    if checked {
        map_into(lhs, dst, |i, x| {
            x.checked_add(rhs[i])
                .ok_or(MathFault::new(overflow_kind::<T>(), i))
        })
    } else {
        map_into(lhs, dst, |i, x| Ok(x.wrapping_add(rhs[i])))
    }
}

/// Bitwise NOT.
pub(crate) fn invert<T: Element + PrimInt>(src: Option<&[T]>, dst: &mut [T]) {
    match src {
        Some(src) => {
            for (out, &x) in dst.iter_mut().zip(src) {
                *out = !x;
            }
        }
        None => {
            for out in dst.iter_mut() {
                *out = !*out;
            }
        }
    }
}

/// Classification reductions: any infinite, any NaN, or all finite.
pub(crate) fn classify<T: Element>(class: FloatClass, data: &[T]) -> bool {
    match class {
        FloatClass::Infinite => data.iter().any(|x| x.is_infinite()),
        FloatClass::Nan => data.iter().any(|x| x.is_nan()),
        FloatClass::Finite => data.iter().all(|x| x.is_finite()),
    }
}

#[inline(always)]
fn extreme<T: Element>(data: &[T], better: impl Fn(T, T) -> bool) -> Result<Option<T>, MathFault> {
    let mut best: Option<T> = None;
    for (i, &x) in data.iter().enumerate() {
        if x.is_nan() {
            return Err(MathFault::new(MathErrorKind::Nan, i));
        }
        best = match best {
            Some(b) if !better(x, b) => Some(b),
            _ => Some(x),
        };
    }
    Ok(best)
}

/// Largest element; the first of equal maxima wins. NaN is a math error.
/// `None` for an empty slice.
pub(crate) fn max<T: Element>(data: &[T]) -> Result<Option<T>, MathFault> {
    extreme(data, |x, best| x > best)
}

/// Smallest element; the first of equal minima wins. NaN is a math error.
pub(crate) fn min<T: Element>(data: &[T]) -> Result<Option<T>, MathFault> {
    extreme(data, |x, best| x < best)
}

/// Sum into the accumulator type, in index order.
pub(crate) fn sum<T: Element>(data: &[T], checked: bool) -> Result<T::Accumulator, MathFault> {
    data.iter().enumerate().try_fold(T::Accumulator::zero(), |acc, (i, &x)| {
        T::accumulate(acc, x, checked).ok_or(MathFault::new(overflow_kind::<T>(), i))
    })
}

/// Whether any / all elements satisfy `x <op> param`.
pub(crate) fn compare<T: Element>(
    op: CompareOp,
    quantifier: Quantifier,
    data: &[T],
    param: T,
) -> bool {
    match quantifier {
        Quantifier::Any => data.iter().any(|&x| op.apply(x, param)),
        Quantifier::All => data.iter().all(|&x| op.apply(x, param)),
    }
}
