//! NEON kernels for aarch64.
//!
//! NEON is part of the aarch64 baseline, so these entry points are always
//! safe to call on that architecture once [`Platform`](crate::platform::Platform)
//! has reported it. Register types are 128 bits wide: 4 × f32, 2 × f64,
//! 16 × i8 and so on.

use std::arch::aarch64::*;

mod float;
mod int;

pub(crate) use float::{F32x4, F64x2};
pub(crate) use int::{I16x8, I32x4, I64x2, I8x16, U16x8, U32x4, U64x2, U8x16};

use crate::descriptor::{CompareOp, FloatClass, Quantifier};
use crate::error::MathFault;
use crate::types::Element;

use super::kernels;
use super::traits::{SimdBits, SimdCompare, SimdFloat, SimdMinMax, SimdSigned, SimdVec, SimdWideSum};

const LANE_BITS_32: [u32; 4] = [1, 2, 4, 8];
const LANE_BITS_64: [u64; 2] = [1, 2];

/// Packs a 32-bit lane mask into one bit per lane.
#[inline(always)]
pub(super) unsafe fn mask32(m: uint32x4_t) -> u32 {
    vaddvq_u32(vandq_u32(m, vld1q_u32(LANE_BITS_32.as_ptr())))
}

#[inline(always)]
pub(super) unsafe fn mask64(m: uint64x2_t) -> u32 {
    vaddvq_u64(vandq_u64(m, vld1q_u64(LANE_BITS_64.as_ptr()))) as u32
}

#[inline(always)]
pub(super) unsafe fn not_u64(m: uint64x2_t) -> uint64x2_t {
    vreinterpretq_u64_u32(vmvnq_u32(vreinterpretq_u32_u64(m)))
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn abs_float<V: SimdFloat>(
    src: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
    checked: bool,
) -> Result<(), MathFault> {
    kernels::abs_float::<V>(src, dst, len, checked)
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn abs_wrapping<V: SimdSigned>(
    src: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
) -> Result<(), MathFault> {
    kernels::abs_wrapping::<V>(src, dst, len)
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn add_float<V: SimdFloat>(
    lhs: *const V::Elem,
    rhs: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
    checked: bool,
) -> Result<(), MathFault> {
    kernels::add_float::<V>(lhs, rhs, dst, len, checked)
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn add_wrapping<V: SimdVec>(
    lhs: *const V::Elem,
    rhs: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
) -> Result<(), MathFault> {
    kernels::add_wrapping::<V>(lhs, rhs, dst, len)
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn invert<V: SimdBits>(src: *const V::Elem, dst: *mut V::Elem, len: usize)
where
    V::Elem: num::PrimInt,
{
    kernels::invert::<V>(src, dst, len)
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn classify<V: SimdFloat>(class: FloatClass, data: &[V::Elem]) -> bool {
    kernels::classify::<V>(class, data)
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn max<V: SimdMinMax>(data: &[V::Elem]) -> Option<V::Elem> {
    kernels::max::<V>(data)
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn min<V: SimdMinMax>(data: &[V::Elem]) -> Option<V::Elem> {
    kernels::min::<V>(data)
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn sum<V: SimdWideSum>(data: &[V::Elem]) -> <V::Elem as Element>::Accumulator {
    kernels::sum::<V>(data)
}

#[target_feature(enable = "neon")]
pub(crate) unsafe fn compare<V: SimdCompare>(
    op: CompareOp,
    quantifier: Quantifier,
    data: &[V::Elem],
    param: V::Elem,
) -> bool {
    kernels::compare::<V>(op, quantifier, data, param)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abs_reports_first_non_finite_lane() {
        let mut data: Vec<f64> = (0..9).map(|i| -(i as f64)).collect();
        data[5] = f64::NAN;
        let fault =
            unsafe { abs_float::<F64x2>(data.as_ptr(), data.as_mut_ptr(), data.len(), true) }
                .unwrap_err();
        assert_eq!(fault.index, 5);
        assert_eq!(data[3], 3.0);
        assert_eq!(data[4], -4.0);
    }

    #[test]
    fn test_lane_masks() {
        let data = [1.0f32, f32::NAN, f32::INFINITY, -2.0];
        let v = unsafe { F32x4::load(data.as_ptr()) };
        assert_eq!(unsafe { v.nan_mask() }, 0b0010);
        assert_eq!(unsafe { v.infinite_mask() }, 0b0100);
        assert_eq!(unsafe { v.finite_mask() }, 0b1001);
    }

    #[test]
    fn test_integer_compare_masks() {
        let data = [-3i64, 0, 3, 8, 9];
        for op in CompareOp::ALL {
            for param in [-4, 0, 9] {
                let expected = data.iter().any(|&x| op.apply(x, param));
                let got = unsafe { compare::<I64x2>(op, Quantifier::Any, &data, param) };
                assert_eq!(got, expected, "{op} {param}");
            }
        }
    }

    #[test]
    fn test_wide_sums() {
        let data = vec![i32::MIN; 11];
        assert_eq!(unsafe { sum::<I32x4>(&data) }, 11 * i32::MIN as i64);
    }
}
