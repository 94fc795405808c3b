//! Kernel bodies shared by every instruction set.
//!
//! Each kernel walks the data in whole registers and finishes the remainder
//! with the scalar element methods, so results match [`crate::scalar`]
//! exactly. Checked kernels test a register before storing it and report the
//! first offending index; elements before that index have been written, none
//! after it.
//!
//! Everything here is `#[inline(always)]` so that it is compiled inside the
//! `#[target_feature]` wrappers of each instruction set module.

use crate::descriptor::{CompareOp, FloatClass, Quantifier};
use crate::error::{MathErrorKind, MathFault};
use crate::scalar;
use crate::types::Element;

use super::traits::{
    full_mask, SimdBits, SimdCompare, SimdFloat, SimdMinMax, SimdSigned, SimdVec, SimdWideSum,
};

/// Index of the first lane missing from `mask`.
#[inline(always)]
fn first_unset(mask: u32) -> usize {
    (!mask).trailing_zeros() as usize
}

#[inline(always)]
fn body_len<V: SimdVec>(len: usize) -> usize {
    len - len % V::LANES
}

#[inline(always)]
unsafe fn finish_unary<T: Element>(
    src: *const T,
    dst: *mut T,
    from: usize,
    len: usize,
    mut f: impl FnMut(usize, T) -> Result<T, MathFault>,
) -> Result<(), MathFault> {
    for i in from..len {
        let x = src.add(i).read();
        dst.add(i).write(f(i, x)?);
    }
    Ok(())
}

#[inline(always)]
unsafe fn finish_binary<T: Element>(
    lhs: *const T,
    rhs: *const T,
    dst: *mut T,
    from: usize,
    len: usize,
    mut f: impl FnMut(usize, T, T) -> Result<T, MathFault>,
) -> Result<(), MathFault> {
    for i in from..len {
        let (a, b) = (lhs.add(i).read(), rhs.add(i).read());
        dst.add(i).write(f(i, a, b)?);
    }
    Ok(())
}

/// Float absolute value. Checked: a non-finite result is a math error.
///
/// # Safety
///
/// `src` and `dst` must be valid for `len` elements; they may be equal.
#[inline(always)]
pub(crate) unsafe fn abs_float<V: SimdFloat>(
    src: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
    checked: bool,
) -> Result<(), MathFault> {
    let body = body_len::<V>(len);
    let full = full_mask(V::LANES);
    let mut i = 0;
    while i < body {
        let v = V::load(src.add(i)).abs();
        if checked {
            let finite = v.finite_mask();
            if finite != full {
                return Err(MathFault::new(MathErrorKind::NonFinite, i + first_unset(finite)));
            }
        }
        v.store(dst.add(i));
        i += V::LANES;
    }
    finish_unary(src, dst, body, len, |i, x| {
        if checked {
            x.checked_abs()
                .ok_or(MathFault::new(MathErrorKind::NonFinite, i))
        } else {
            Ok(x.wrapping_abs())
        }
    })
}

/// Signed integer absolute value, wrapping at `MIN`.
///
/// # Safety
///
/// `src` and `dst` must be valid for `len` elements; they may be equal.
#[inline(always)]
pub(crate) unsafe fn abs_wrapping<V: SimdSigned>(
    src: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
) -> Result<(), MathFault> {
    let body = body_len::<V>(len);
    let mut i = 0;
    while i < body {
        V::load(src.add(i)).wrapping_abs().store(dst.add(i));
        i += V::LANES;
    }
    finish_unary(src, dst, body, len, |_, x| Ok(x.wrapping_abs()))
}

/// Float addition. Checked: a non-finite sum is a math error.
///
/// # Safety
///
/// All pointers must be valid for `len` elements; `dst` may equal `lhs`.
#[inline(always)]
pub(crate) unsafe fn add_float<V: SimdFloat>(
    lhs: *const V::Elem,
    rhs: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
    checked: bool,
) -> Result<(), MathFault> {
    let body = body_len::<V>(len);
    let full = full_mask(V::LANES);
    let mut i = 0;
    while i < body {
        let v = V::load(lhs.add(i)).add(V::load(rhs.add(i)));
        if checked {
            let finite = v.finite_mask();
            if finite != full {
                return Err(MathFault::new(MathErrorKind::NonFinite, i + first_unset(finite)));
            }
        }
        v.store(dst.add(i));
        i += V::LANES;
    }
    finish_binary(lhs, rhs, dst, body, len, |i, a, b| {
        if checked {
            a.checked_add(b)
                .ok_or(MathFault::new(MathErrorKind::NonFinite, i))
        } else {
            Ok(a.wrapping_add(b))
        }
    })
}

/// Integer addition modulo 2^bits.
///
/// # Safety
///
/// All pointers must be valid for `len` elements; `dst` may equal `lhs`.
#[inline(always)]
pub(crate) unsafe fn add_wrapping<V: SimdVec>(
    lhs: *const V::Elem,
    rhs: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
) -> Result<(), MathFault> {
    let body = body_len::<V>(len);
    let mut i = 0;
    while i < body {
        V::load(lhs.add(i))
            .add(V::load(rhs.add(i)))
            .store(dst.add(i));
        i += V::LANES;
    }
    finish_binary(lhs, rhs, dst, body, len, |_, a, b| Ok(a.wrapping_add(b)))
}

/// # Safety
///
/// `src` and `dst` must be valid for `len` elements; they may be equal.
#[inline(always)]
pub(crate) unsafe fn invert<V: SimdBits>(src: *const V::Elem, dst: *mut V::Elem, len: usize)
where
    V::Elem: num::PrimInt,
{
    let body = body_len::<V>(len);
    let mut i = 0;
    while i < body {
        V::load(src.add(i)).not().store(dst.add(i));
        i += V::LANES;
    }
    for i in body..len {
        dst.add(i).write(!src.add(i).read());
    }
}

/// # Safety
///
/// The instruction set of `V` must be available.
#[inline(always)]
pub(crate) unsafe fn classify<V: SimdFloat>(class: FloatClass, data: &[V::Elem]) -> bool {
    let body = body_len::<V>(data.len());
    let full = full_mask(V::LANES);
    let ptr = data.as_ptr();
    let mut i = 0;
    while i < body {
        let v = V::load(ptr.add(i));
        let decided = match class {
            FloatClass::Infinite => v.infinite_mask() != 0,
            FloatClass::Nan => v.nan_mask() != 0,
            FloatClass::Finite => v.finite_mask() != full,
        };
        if decided {
            return class != FloatClass::Finite;
        }
        i += V::LANES;
    }
    scalar::classify(class, &data[body..])
}

#[inline(always)]
unsafe fn extreme<V: SimdMinMax>(
    data: &[V::Elem],
    combine: impl Fn(V, V) -> V,
    better: impl Fn(V::Elem, V::Elem) -> bool,
) -> Option<V::Elem> {
    if data.len() < V::LANES {
        return scalar_extreme(data, better);
    }
    let body = body_len::<V>(data.len());
    let ptr = data.as_ptr();
    let mut acc = V::load(ptr);
    let mut i = V::LANES;
    while i < body {
        acc = combine(acc, V::load(ptr.add(i)));
        i += V::LANES;
    }
    // Widest register holds 32 lanes.
    let mut lanes = [<V::Elem as num::Zero>::zero(); 32];
    acc.store(lanes.as_mut_ptr());
    lanes[..V::LANES]
        .iter()
        .chain(&data[body..])
        .copied()
        .reduce(|best, x| if better(x, best) { x } else { best })
}

#[inline(always)]
fn scalar_extreme<T: Element>(data: &[T], better: impl Fn(T, T) -> bool) -> Option<T> {
    data.iter()
        .copied()
        .reduce(|best, x| if better(x, best) { x } else { best })
}

/// Integer maximum; `None` for an empty slice.
///
/// # Safety
///
/// The instruction set of `V` must be available.
#[inline(always)]
pub(crate) unsafe fn max<V: SimdMinMax>(data: &[V::Elem]) -> Option<V::Elem> {
    extreme::<V>(data, |a, b| a.max(b), |x, best| x > best)
}

/// Integer minimum; `None` for an empty slice.
///
/// # Safety
///
/// The instruction set of `V` must be available.
#[inline(always)]
pub(crate) unsafe fn min<V: SimdMinMax>(data: &[V::Elem]) -> Option<V::Elem> {
    extreme::<V>(data, |a, b| a.min(b), |x, best| x < best)
}

/// Wrapping sum into the 64-bit accumulator.
///
/// # Safety
///
/// The instruction set of `V` must be available.
#[inline(always)]
pub(crate) unsafe fn sum<V: SimdWideSum>(data: &[V::Elem]) -> <V::Elem as Element>::Accumulator {
    let body = body_len::<V>(data.len());
    let ptr = data.as_ptr();
    let mut wide = V::wide_zero();
    let mut i = 0;
    while i < body {
        wide = V::accumulate(wide, V::load(ptr.add(i)));
        i += V::LANES;
    }
    let mut acc = V::reduce(wide);
    for &x in &data[body..] {
        if let Some(next) = <V::Elem as Element>::accumulate(acc, x, false) {
            acc = next;
        }
    }
    acc
}

/// Whether any / all elements satisfy `x <op> param`.
///
/// # Safety
///
/// The instruction set of `V` must be available.
#[inline(always)]
pub(crate) unsafe fn compare<V: SimdCompare>(
    op: CompareOp,
    quantifier: Quantifier,
    data: &[V::Elem],
    param: V::Elem,
) -> bool {
    let body = body_len::<V>(data.len());
    let full = full_mask(V::LANES);
    let ptr = data.as_ptr();
    let splat = V::splat(param);
    let mut i = 0;
    while i < body {
        let mask = V::load(ptr.add(i)).compare(op, splat);
        match quantifier {
            Quantifier::Any if mask != 0 => return true,
            Quantifier::All if mask != full => return false,
            _ => {}
        }
        i += V::LANES;
    }
    scalar::compare(op, quantifier, &data[body..], param)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_unset() {
        assert_eq!(first_unset(0b1111), 4);
        assert_eq!(first_unset(0b1011), 2);
        assert_eq!(first_unset(0), 0);
    }
}
