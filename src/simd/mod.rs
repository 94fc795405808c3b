//! Vectorized kernels.
//!
//! [`Vectorized`] is the per-element-type entry point the dispatcher calls.
//! Each method returns `None` when no vectorized kernel exists for that
//! type, operation, mode and instruction set; the caller then runs the
//! scalar kernel. Which (operation, type, mode) triples are vectorized is
//! declared in the operation descriptors and mirrored by the impls below.
//!
//! Kernel bodies live in [`kernels`], written against the lane traits in
//! [`traits`]. The `avx2` and `neon` modules supply register types and
//! `#[target_feature]` entry points.

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2;

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;

pub(crate) mod kernels;
pub(crate) mod traits;

use crate::descriptor::{CompareOp, FloatClass, Quantifier};
use crate::error::MathFault;
use crate::platform::SimdIsa;
use crate::types::Element;

/// Runs `$kernel` on the register type matching `$isa`, or yields `None`
/// when this build has no such instruction set.
macro_rules! on_isa {
    ($isa:expr, $avx2:ident, $neon:ident, $kernel:ident($($arg:expr),* $(,)?)) => {
        match $isa {
            #[cfg(target_arch = "x86_64")]
            SimdIsa::Avx2 => Some(avx2::$kernel::<avx2::$avx2>($($arg),*)),
            #[cfg(target_arch = "aarch64")]
            SimdIsa::Neon => Some(neon::$kernel::<neon::$neon>($($arg),*)),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    };
}

/// Vectorized entry points for one element type.
///
/// # Safety
///
/// Every method requires that `isa` is supported by the running CPU. A
/// [`Platform`](crate::platform::Platform) only reports detected ISAs.
#[allow(unused_variables)]
pub(crate) trait Vectorized: Element {
    /// Same contract as [`crate::scalar::abs`].
    unsafe fn abs(
        isa: SimdIsa,
        src: Option<&[Self]>,
        dst: &mut [Self],
        checked: bool,
    ) -> Option<Result<(), MathFault>> {
        None
    }

    /// Same contract as [`crate::scalar::add`].
    unsafe fn add(
        isa: SimdIsa,
        lhs: Option<&[Self]>,
        rhs: &[Self],
        dst: &mut [Self],
        checked: bool,
    ) -> Option<Result<(), MathFault>> {
        None
    }

    unsafe fn invert(isa: SimdIsa, src: Option<&[Self]>, dst: &mut [Self]) -> Option<()> {
        None
    }

    unsafe fn classify(isa: SimdIsa, class: FloatClass, data: &[Self]) -> Option<bool> {
        None
    }

    /// `Some(None)` for an empty slice.
    unsafe fn max(isa: SimdIsa, data: &[Self]) -> Option<Option<Self>> {
        None
    }

    unsafe fn min(isa: SimdIsa, data: &[Self]) -> Option<Option<Self>> {
        None
    }

    /// Wrapping sum; only used when math errors are suppressed.
    unsafe fn sum(isa: SimdIsa, data: &[Self]) -> Option<Self::Accumulator> {
        None
    }

    unsafe fn compare(
        isa: SimdIsa,
        op: CompareOp,
        quantifier: Quantifier,
        data: &[Self],
        param: Self,
    ) -> Option<bool> {
        None
    }
}

/// Source and destination pointers for a unary transform. With no source
/// the destination is read in place.
#[inline(always)]
fn unary_ptrs<T>(src: Option<&[T]>, dst: &mut [T]) -> (*const T, *mut T, usize) {
    let len = src.map_or(dst.len(), |src| src.len().min(dst.len()));
    let dst = dst.as_mut_ptr();
    let src = src.map_or(dst as *const T, <[T]>::as_ptr);
    (src, dst, len)
}

#[inline(always)]
fn binary_ptrs<T>(
    lhs: Option<&[T]>,
    rhs: &[T],
    dst: &mut [T],
) -> (*const T, *const T, *mut T, usize) {
    let len = lhs
        .map_or(dst.len(), |lhs| lhs.len().min(dst.len()))
        .min(rhs.len());
    let dst = dst.as_mut_ptr();
    let lhs = lhs.map_or(dst as *const T, <[T]>::as_ptr);
    (lhs, rhs.as_ptr(), dst, len)
}

macro_rules! vectorized_float {
    ($t:ty, $avx2:ident, $neon:ident) => {
        impl Vectorized for $t {
            unsafe fn abs(
                isa: SimdIsa,
                src: Option<&[$t]>,
                dst: &mut [$t],
                checked: bool,
            ) -> Option<Result<(), MathFault>> {
                let (src, dst, len) = unary_ptrs(src, dst);
                on_isa!(isa, $avx2, $neon, abs_float(src, dst, len, checked))
            }

            unsafe fn add(
                isa: SimdIsa,
                lhs: Option<&[$t]>,
                rhs: &[$t],
                dst: &mut [$t],
                checked: bool,
            ) -> Option<Result<(), MathFault>> {
                let (lhs, rhs, dst, len) = binary_ptrs(lhs, rhs, dst);
                on_isa!(isa, $avx2, $neon, add_float(lhs, rhs, dst, len, checked))
            }

            unsafe fn classify(isa: SimdIsa, class: FloatClass, data: &[$t]) -> Option<bool> {
                on_isa!(isa, $avx2, $neon, classify(class, data))
            }

            unsafe fn compare(
                isa: SimdIsa,
                op: CompareOp,
                quantifier: Quantifier,
                data: &[$t],
                param: $t,
            ) -> Option<bool> {
                on_isa!(isa, $avx2, $neon, compare(op, quantifier, data, param))
            }
        }
    };
}

vectorized_float!(f32, F32x8, F32x4);
vectorized_float!(f64, F64x4, F64x2);

/// Optional capabilities of an integer type, beyond wrapping add and NOT.
macro_rules! vectorized_int {
    (@abs $t:ty, $avx2:ident, $neon:ident) => {
        unsafe fn abs(
            isa: SimdIsa,
            src: Option<&[$t]>,
            dst: &mut [$t],
            checked: bool,
        ) -> Option<Result<(), MathFault>> {
            if checked {
                return None;
            }
            let (src, dst, len) = unary_ptrs(src, dst);
            on_isa!(isa, $avx2, $neon, abs_wrapping(src, dst, len))
        }
    };
    (@extremes $t:ty, $avx2:ident, $neon:ident) => {
        unsafe fn max(isa: SimdIsa, data: &[$t]) -> Option<Option<$t>> {
            on_isa!(isa, $avx2, $neon, max(data))
        }

        unsafe fn min(isa: SimdIsa, data: &[$t]) -> Option<Option<$t>> {
            on_isa!(isa, $avx2, $neon, min(data))
        }
    };
    (@sum $t:ty, $avx2:ident, $neon:ident) => {
        unsafe fn sum(isa: SimdIsa, data: &[$t]) -> Option<<$t as Element>::Accumulator> {
            on_isa!(isa, $avx2, $neon, sum(data))
        }
    };
    (@compare $t:ty, $avx2:ident, $neon:ident) => {
        unsafe fn compare(
            isa: SimdIsa,
            op: CompareOp,
            quantifier: Quantifier,
            data: &[$t],
            param: $t,
        ) -> Option<bool> {
            on_isa!(isa, $avx2, $neon, compare(op, quantifier, data, param))
        }
    };
    ($t:ty, $avx2:ident, $neon:ident { $($capability:ident),* }) => {
        impl Vectorized for $t {
            unsafe fn add(
                isa: SimdIsa,
                lhs: Option<&[$t]>,
                rhs: &[$t],
                dst: &mut [$t],
                checked: bool,
            ) -> Option<Result<(), MathFault>> {
                if checked {
                    return None;
                }
                let (lhs, rhs, dst, len) = binary_ptrs(lhs, rhs, dst);
                on_isa!(isa, $avx2, $neon, add_wrapping(lhs, rhs, dst, len))
            }

            unsafe fn invert(isa: SimdIsa, src: Option<&[$t]>, dst: &mut [$t]) -> Option<()> {
                let (src, dst, len) = unary_ptrs(src, dst);
                on_isa!(isa, $avx2, $neon, invert(src, dst, len))
            }

            $(vectorized_int!(@$capability $t, $avx2, $neon);)*
        }
    };
}

vectorized_int!(i8, I8x32, I8x16 { abs, extremes });
vectorized_int!(u8, U8x32, U8x16 { extremes });
vectorized_int!(i16, I16x16, I16x8 { abs, extremes });
vectorized_int!(u16, U16x16, U16x8 { extremes });
vectorized_int!(i32, I32x8, I32x4 { abs, extremes, sum, compare });
vectorized_int!(u32, U32x8, U32x4 { extremes, sum });
vectorized_int!(i64, I64x4, I64x2 { abs, sum, compare });
vectorized_int!(u64, U64x4, U64x2 { sum });

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::scalar;

    fn isa() -> Option<SimdIsa> {
        let isa = Platform::detect().simd_isa();
        if isa.is_none() {
            println!("no SIMD instruction set, skipping");
        }
        isa
    }

    #[test]
    fn test_in_place_and_out_of_place_agree() {
        let Some(isa) = isa() else { return };
        let src: Vec<f32> = (0..37).map(|i| i as f32 * -0.5).collect();
        let mut out = vec![0.0f32; 37];
        unsafe { <f32 as Vectorized>::abs(isa, Some(&src[..]), &mut out, true) }
            .unwrap()
            .unwrap();
        let mut in_place = src.clone();
        unsafe { <f32 as Vectorized>::abs(isa, None, &mut in_place, true) }
            .unwrap()
            .unwrap();
        assert_eq!(out, in_place);
    }

    #[test]
    fn test_checked_integer_kernels_decline() {
        let Some(isa) = isa() else { return };
        let mut data = [1i32, -2, 3];
        assert!(unsafe { <i32 as Vectorized>::abs(isa, None, &mut data, true) }.is_none());
        assert!(unsafe { <u8 as Vectorized>::add(isa, None, &[1], &mut [1], true) }.is_none());
        assert!(unsafe { <u64 as Vectorized>::max(isa, &[1, 2]) }.is_none());
        assert!(unsafe { <f64 as Vectorized>::sum(isa, &[1.0]) }.is_none());
    }

    #[test]
    fn test_add_matches_scalar_with_tail() {
        let Some(isa) = isa() else { return };
        let a: Vec<i16> = (0..75).map(|i| i * 1000).collect();
        let b: Vec<i16> = (0..75).map(|i| 30000 - i).collect();
        let mut simd = vec![0i16; 75];
        let mut reference = vec![0i16; 75];
        unsafe { <i16 as Vectorized>::add(isa, Some(&a[..]), &b, &mut simd, false) }
            .unwrap()
            .unwrap();
        scalar::add(Some(&a[..]), &b, &mut reference, false).unwrap();
        assert_eq!(simd, reference);
    }

    #[test]
    fn test_invert_in_place() {
        let Some(isa) = isa() else { return };
        let mut data: Vec<u64> = (0..7).collect();
        unsafe { <u64 as Vectorized>::invert(isa, None, &mut data) }.unwrap();
        assert_eq!(data, (0..7).map(|x: u64| !x).collect::<Vec<_>>());
    }

    #[test]
    fn test_invert_tail_matches_scalar() {
        let Some(isa) = isa() else { return };
        for len in [0usize, 1, 31, 32, 33, 70] {
            let src: Vec<i8> = (0..len).map(|i| (i as i8).wrapping_mul(37)).collect();
            let mut simd = vec![0i8; len];
            let mut reference = vec![0i8; len];
            unsafe { <i8 as Vectorized>::invert(isa, Some(&src[..]), &mut simd) }.unwrap();
            scalar::invert(Some(&src[..]), &mut reference);
            assert_eq!(simd, reference, "len {len}");
        }
    }
}
