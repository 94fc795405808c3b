//! NEON float registers: 4 × f32 and 2 × f64.

use std::arch::aarch64::*;

use crate::descriptor::CompareOp;
use crate::simd::traits::{SimdCompare, SimdFloat, SimdVec};

use super::{mask32, mask64, not_u64};

macro_rules! neon_float {
    (
        $name:ident, $elem:ty, $reg:ty, $lanes:expr,
        load: $load:ident, store: $store:ident, add: $add:ident, abs: $abs:ident, dup: $dup:ident,
        eq: $eq:ident, gt: $gt:ident, ge: $ge:ident, lt: $lt:ident, le: $le:ident,
        not: $not:ident, mask: $mask:ident
    ) => {
        #[derive(Copy, Clone, Debug)]
        pub(crate) struct $name($reg);

        impl SimdVec for $name {
            type Elem = $elem;
            const LANES: usize = $lanes;

            #[inline(always)]
            unsafe fn load(ptr: *const $elem) -> Self {
                $name($load(ptr))
            }

            #[inline(always)]
            unsafe fn store(self, ptr: *mut $elem) {
                $store(ptr, self.0)
            }

            #[inline(always)]
            unsafe fn add(self, rhs: Self) -> Self {
                $name($add(self.0, rhs.0))
            }
        }

        impl SimdFloat for $name {
            #[inline(always)]
            unsafe fn abs(self) -> Self {
                $name($abs(self.0))
            }

            #[inline(always)]
            unsafe fn finite_mask(self) -> u32 {
                $mask($lt($abs(self.0), $dup(<$elem>::INFINITY)))
            }

            #[inline(always)]
            unsafe fn nan_mask(self) -> u32 {
                $mask($not($eq(self.0, self.0)))
            }

            #[inline(always)]
            unsafe fn infinite_mask(self) -> u32 {
                $mask($eq($abs(self.0), $dup(<$elem>::INFINITY)))
            }
        }

        impl SimdCompare for $name {
            #[inline(always)]
            unsafe fn splat(value: $elem) -> Self {
                $name($dup(value))
            }

            #[inline(always)]
            unsafe fn compare(self, op: CompareOp, rhs: Self) -> u32 {
                let (a, b) = (self.0, rhs.0);
                $mask(match op {
                    CompareOp::Eq => $eq(a, b),
                    CompareOp::Ne => $not($eq(a, b)),
                    CompareOp::Gt => $gt(a, b),
                    CompareOp::Ge => $ge(a, b),
                    CompareOp::Lt => $lt(a, b),
                    CompareOp::Le => $le(a, b),
                })
            }
        }
    };
}

neon_float!(
    F32x4, f32, float32x4_t, 4,
    load: vld1q_f32, store: vst1q_f32, add: vaddq_f32, abs: vabsq_f32, dup: vdupq_n_f32,
    eq: vceqq_f32, gt: vcgtq_f32, ge: vcgeq_f32, lt: vcltq_f32, le: vcleq_f32,
    not: vmvnq_u32, mask: mask32
);

neon_float!(
    F64x2, f64, float64x2_t, 2,
    load: vld1q_f64, store: vst1q_f64, add: vaddq_f64, abs: vabsq_f64, dup: vdupq_n_f64,
    eq: vceqq_f64, gt: vcgtq_f64, ge: vcgeq_f64, lt: vcltq_f64, le: vcleq_f64,
    not: not_u64, mask: mask64
);
