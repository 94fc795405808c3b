//! AVX2 kernels for x86_64.
//!
//! Every function here is compiled with `avx2` enabled regardless of the
//! build's target features, so the [`kernels`](super::kernels) bodies inline
//! into AVX2 code. Callers must have confirmed AVX2 support at runtime,
//! which is what [`Platform`](crate::platform::Platform) records.
//!
//! Register types use 256-bit vectors: 8 × f32, 4 × f64, 32 × i8 and so on.

mod float;
mod int;

pub(crate) use float::{F32x8, F64x4};
pub(crate) use int::{I16x16, I32x8, I64x4, I8x32, U16x16, U32x8, U64x4, U8x32};

use crate::descriptor::{CompareOp, FloatClass, Quantifier};
use crate::error::MathFault;
use crate::types::Element;

use super::kernels;
use super::traits::{SimdBits, SimdCompare, SimdFloat, SimdMinMax, SimdSigned, SimdVec, SimdWideSum};

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn abs_float<V: SimdFloat>(
    src: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
    checked: bool,
) -> Result<(), MathFault> {
    kernels::abs_float::<V>(src, dst, len, checked)
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn abs_wrapping<V: SimdSigned>(
    src: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
) -> Result<(), MathFault> {
    kernels::abs_wrapping::<V>(src, dst, len)
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn add_float<V: SimdFloat>(
    lhs: *const V::Elem,
    rhs: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
    checked: bool,
) -> Result<(), MathFault> {
    kernels::add_float::<V>(lhs, rhs, dst, len, checked)
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn add_wrapping<V: SimdVec>(
    lhs: *const V::Elem,
    rhs: *const V::Elem,
    dst: *mut V::Elem,
    len: usize,
) -> Result<(), MathFault> {
    kernels::add_wrapping::<V>(lhs, rhs, dst, len)
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn invert<V: SimdBits>(src: *const V::Elem, dst: *mut V::Elem, len: usize)
where
    V::Elem: num::PrimInt,
{
    kernels::invert::<V>(src, dst, len)
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn classify<V: SimdFloat>(class: FloatClass, data: &[V::Elem]) -> bool {
    kernels::classify::<V>(class, data)
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn max<V: SimdMinMax>(data: &[V::Elem]) -> Option<V::Elem> {
    kernels::max::<V>(data)
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn min<V: SimdMinMax>(data: &[V::Elem]) -> Option<V::Elem> {
    kernels::min::<V>(data)
}

#[target_feature(enable = "avx2")]
pub(crate) unsafe fn sum<V: SimdWideSum>(data: &[V::Elem]) -> <V::Elem as Element>::Accumulator {
    kernels::sum::<V>(data)
}

#[target_feature(enable = "avx2")]
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

    fn avx2() -> bool {
        let available = is_x86_feature_detected!("avx2");
        if !available {
            println!("AVX2 not available, skipping");
        }
        available
    }

    #[test]
    fn test_abs_reports_first_non_finite_lane() {
        if !avx2() {
            return;
        }
        let mut data: Vec<f32> = (0..20).map(|i| -(i as f32)).collect();
        data[11] = f32::NEG_INFINITY;
        let fault =
            unsafe { abs_float::<F32x8>(data.as_ptr(), data.as_mut_ptr(), data.len(), true) }
                .unwrap_err();
        assert_eq!(fault.index, 11);
        // The register holding index 11 was not stored.
        assert_eq!(data[7], 7.0);
        assert_eq!(data[8], -8.0);
    }

    #[test]
    fn test_i64_wrapping_abs() {
        if !avx2() {
            return;
        }
        let src = [i64::MIN, -1, 0, 5, -7];
        let mut dst = [0i64; 5];
        unsafe { abs_wrapping::<I64x4>(src.as_ptr(), dst.as_mut_ptr(), 5) }.unwrap();
        assert_eq!(dst, [i64::MIN, 1, 0, 5, 7]);
    }

    #[test]
    fn test_integer_compare_masks() {
        if !avx2() {
            return;
        }
        let data = [1i32, 2, 3, 4, 5, 6, 7, 8, 9];
        for op in CompareOp::ALL {
            for param in [0, 4, 9, 10] {
                let expected = data.iter().all(|&x| op.apply(x, param));
                let got = unsafe { compare::<I32x8>(op, Quantifier::All, &data, param) };
                assert_eq!(got, expected, "{op} {param}");
            }
        }
    }

    #[test]
    fn test_wide_sums() {
        if !avx2() {
            return;
        }
        let data = vec![i32::MAX; 19];
        assert_eq!(unsafe { sum::<I32x8>(&data) }, 19 * i32::MAX as i64);
        let data = vec![u32::MAX; 9];
        assert_eq!(unsafe { sum::<U32x8>(&data) }, 9 * u32::MAX as u64);
    }

    #[test]
    fn test_small_integer_extremes() {
        if !avx2() {
            return;
        }
        let mut data: Vec<u8> = (0..100).collect();
        data[57] = 250;
        assert_eq!(unsafe { max::<U8x32>(&data) }, Some(250));
        assert_eq!(unsafe { min::<U8x32>(&data) }, Some(0));
        assert_eq!(unsafe { max::<I8x32>(&[3, -1]) }, Some(3));
    }
}
