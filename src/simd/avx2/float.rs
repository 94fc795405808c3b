//! AVX2 float registers: 8 × f32 and 4 × f64.

use std::arch::x86_64::*;

use crate::descriptor::CompareOp;
use crate::simd::traits::{SimdCompare, SimdFloat, SimdVec};

macro_rules! avx2_float {
    (
        $name:ident, $elem:ty, $reg:ty, $lanes:expr,
        loadu: $loadu:ident, storeu: $storeu:ident, add: $add:ident,
        andnot: $andnot:ident, set1: $set1:ident, cmp: $cmp:ident, movemask: $movemask:ident
    ) => {
        #[derive(Copy, Clone, Debug)]
        pub(crate) struct $name($reg);

        impl $name {
            #[inline(always)]
            unsafe fn magnitude(self) -> $reg {
                $andnot($set1(-0.0), self.0)
            }

            #[inline(always)]
            unsafe fn mask(reg: $reg) -> u32 {
                $movemask(reg) as u32
            }
        }

        impl SimdVec for $name {
            type Elem = $elem;
            const LANES: usize = $lanes;

            #[inline(always)]
            unsafe fn load(ptr: *const $elem) -> Self {
                $name($loadu(ptr))
            }

            #[inline(always)]
            unsafe fn store(self, ptr: *mut $elem) {
                $storeu(ptr, self.0)
            }

            #[inline(always)]
            unsafe fn add(self, rhs: Self) -> Self {
                $name($add(self.0, rhs.0))
            }
        }

        impl SimdFloat for $name {
            #[inline(always)]
            unsafe fn abs(self) -> Self {
                $name(self.magnitude())
            }

            #[inline(always)]
            unsafe fn finite_mask(self) -> u32 {
                Self::mask($cmp::<_CMP_LT_OQ>(self.magnitude(), $set1(<$elem>::INFINITY)))
            }

            #[inline(always)]
            unsafe fn nan_mask(self) -> u32 {
                Self::mask($cmp::<_CMP_UNORD_Q>(self.0, self.0))
            }

            #[inline(always)]
            unsafe fn infinite_mask(self) -> u32 {
                Self::mask($cmp::<_CMP_EQ_OQ>(self.magnitude(), $set1(<$elem>::INFINITY)))
            }
        }

        impl SimdCompare for $name {
            #[inline(always)]
            unsafe fn splat(value: $elem) -> Self {
                $name($set1(value))
            }

            // Ordered predicates are false on NaN; `!=` is the unordered
            // complement of `==`.
            #[inline(always)]
            unsafe fn compare(self, op: CompareOp, rhs: Self) -> u32 {
                let (a, b) = (self.0, rhs.0);
                Self::mask(match op {
                    CompareOp::Eq => $cmp::<_CMP_EQ_OQ>(a, b),
                    CompareOp::Ne => $cmp::<_CMP_NEQ_UQ>(a, b),
                    CompareOp::Gt => $cmp::<_CMP_GT_OQ>(a, b),
                    CompareOp::Ge => $cmp::<_CMP_GE_OQ>(a, b),
                    CompareOp::Lt => $cmp::<_CMP_LT_OQ>(a, b),
                    CompareOp::Le => $cmp::<_CMP_LE_OQ>(a, b),
                })
            }
        }
    };
}

avx2_float!(
    F32x8, f32, __m256, 8,
    loadu: _mm256_loadu_ps, storeu: _mm256_storeu_ps, add: _mm256_add_ps,
    andnot: _mm256_andnot_ps, set1: _mm256_set1_ps, cmp: _mm256_cmp_ps,
    movemask: _mm256_movemask_ps
);

avx2_float!(
    F64x4, f64, __m256d, 4,
    loadu: _mm256_loadu_pd, storeu: _mm256_storeu_pd, add: _mm256_add_pd,
    andnot: _mm256_andnot_pd, set1: _mm256_set1_pd, cmp: _mm256_cmp_pd,
    movemask: _mm256_movemask_pd
);
