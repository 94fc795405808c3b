//! AVX2 integer registers. All share `__m256i`; the wrapper type fixes the
//! lane width.

use std::arch::x86_64::*;

use crate::descriptor::CompareOp;
use crate::simd::traits::{
    full_mask, SimdBits, SimdCompare, SimdMinMax, SimdSigned, SimdVec, SimdWideSum,
};

macro_rules! avx2_int {
    ($name:ident, $elem:ty, $lanes:expr, $add:ident) => {
        #[derive(Copy, Clone, Debug)]
        pub(crate) struct $name(__m256i);

        impl SimdVec for $name {
            type Elem = $elem;
            const LANES: usize = $lanes;

            #[inline(always)]
            unsafe fn load(ptr: *const $elem) -> Self {
                $name(_mm256_loadu_si256(ptr as *const __m256i))
            }

            #[inline(always)]
            unsafe fn store(self, ptr: *mut $elem) {
                _mm256_storeu_si256(ptr as *mut __m256i, self.0)
            }

            #[inline(always)]
            unsafe fn add(self, rhs: Self) -> Self {
                $name($add(self.0, rhs.0))
            }
        }

        impl SimdBits for $name {
            #[inline(always)]
            unsafe fn not(self) -> Self {
                $name(_mm256_xor_si256(self.0, _mm256_set1_epi32(-1)))
            }
        }
    };
}

avx2_int!(I8x32, i8, 32, _mm256_add_epi8);
avx2_int!(U8x32, u8, 32, _mm256_add_epi8);
avx2_int!(I16x16, i16, 16, _mm256_add_epi16);
avx2_int!(U16x16, u16, 16, _mm256_add_epi16);
avx2_int!(I32x8, i32, 8, _mm256_add_epi32);
avx2_int!(U32x8, u32, 8, _mm256_add_epi32);
avx2_int!(I64x4, i64, 4, _mm256_add_epi64);
avx2_int!(U64x4, u64, 4, _mm256_add_epi64);

macro_rules! avx2_abs {
    ($name:ident, $abs:ident) => {
        impl SimdSigned for $name {
            #[inline(always)]
            unsafe fn wrapping_abs(self) -> Self {
                $name($abs(self.0))
            }
        }
    };
}

avx2_abs!(I8x32, _mm256_abs_epi8);
avx2_abs!(I16x16, _mm256_abs_epi16);
avx2_abs!(I32x8, _mm256_abs_epi32);

impl SimdSigned for I64x4 {
    // No 64-bit abs before AVX-512: (x ^ s) - s with s the sign mask.
    #[inline(always)]
    unsafe fn wrapping_abs(self) -> Self {
        let sign = _mm256_cmpgt_epi64(_mm256_setzero_si256(), self.0);
        I64x4(_mm256_sub_epi64(_mm256_xor_si256(self.0, sign), sign))
    }
}

macro_rules! avx2_min_max {
    ($name:ident, $max:ident, $min:ident) => {
        impl SimdMinMax for $name {
            #[inline(always)]
            unsafe fn max(self, rhs: Self) -> Self {
                $name($max(self.0, rhs.0))
            }

            #[inline(always)]
            unsafe fn min(self, rhs: Self) -> Self {
                $name($min(self.0, rhs.0))
            }
        }
    };
}

avx2_min_max!(I8x32, _mm256_max_epi8, _mm256_min_epi8);
avx2_min_max!(U8x32, _mm256_max_epu8, _mm256_min_epu8);
avx2_min_max!(I16x16, _mm256_max_epi16, _mm256_min_epi16);
avx2_min_max!(U16x16, _mm256_max_epu16, _mm256_min_epu16);
avx2_min_max!(I32x8, _mm256_max_epi32, _mm256_min_epi32);
avx2_min_max!(U32x8, _mm256_max_epu32, _mm256_min_epu32);

// Only `==` and `>` exist for signed integers; the other predicates are
// derived by swapping operands or complementing the lane mask.
macro_rules! avx2_compare {
    ($name:ident, $elem:ty, $set1:ident, $cmpeq:ident, $cmpgt:ident, $mask:ident) => {
        impl SimdCompare for $name {
            #[inline(always)]
            unsafe fn splat(value: $elem) -> Self {
                $name($set1(value))
            }

            #[inline(always)]
            unsafe fn compare(self, op: CompareOp, rhs: Self) -> u32 {
                let (a, b) = (self.0, rhs.0);
                let full = full_mask(Self::LANES);
                match op {
                    CompareOp::Eq => $mask($cmpeq(a, b)),
                    CompareOp::Ne => !$mask($cmpeq(a, b)) & full,
                    CompareOp::Gt => $mask($cmpgt(a, b)),
                    CompareOp::Ge => !$mask($cmpgt(b, a)) & full,
                    CompareOp::Lt => $mask($cmpgt(b, a)),
                    CompareOp::Le => !$mask($cmpgt(a, b)) & full,
                }
            }
        }
    };
}

#[inline(always)]
unsafe fn mask32(m: __m256i) -> u32 {
    _mm256_movemask_ps(_mm256_castsi256_ps(m)) as u32
}

#[inline(always)]
unsafe fn mask64(m: __m256i) -> u32 {
    _mm256_movemask_pd(_mm256_castsi256_pd(m)) as u32
}

avx2_compare!(I32x8, i32, _mm256_set1_epi32, _mm256_cmpeq_epi32, _mm256_cmpgt_epi32, mask32);
avx2_compare!(I64x4, i64, _mm256_set1_epi64x, _mm256_cmpeq_epi64, _mm256_cmpgt_epi64, mask64);

#[inline(always)]
unsafe fn horizontal_sum_u64(wide: __m256i) -> u64 {
    let mut lanes = [0u64; 4];
    _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, wide);
    lanes.iter().fold(0u64, |acc, &x| acc.wrapping_add(x))
}

impl SimdWideSum for I32x8 {
    type Wide = __m256i;

    #[inline(always)]
    unsafe fn wide_zero() -> __m256i {
        _mm256_setzero_si256()
    }

    #[inline(always)]
    unsafe fn accumulate(wide: __m256i, value: Self) -> __m256i {
        let lo = _mm256_cvtepi32_epi64(_mm256_castsi256_si128(value.0));
        let hi = _mm256_cvtepi32_epi64(_mm256_extracti128_si256::<1>(value.0));
        _mm256_add_epi64(wide, _mm256_add_epi64(lo, hi))
    }

    #[inline(always)]
    unsafe fn reduce(wide: __m256i) -> i64 {
        horizontal_sum_u64(wide) as i64
    }
}

impl SimdWideSum for U32x8 {
    type Wide = __m256i;

    #[inline(always)]
    unsafe fn wide_zero() -> __m256i {
        _mm256_setzero_si256()
    }

    #[inline(always)]
    unsafe fn accumulate(wide: __m256i, value: Self) -> __m256i {
        let lo = _mm256_cvtepu32_epi64(_mm256_castsi256_si128(value.0));
        let hi = _mm256_cvtepu32_epi64(_mm256_extracti128_si256::<1>(value.0));
        _mm256_add_epi64(wide, _mm256_add_epi64(lo, hi))
    }

    #[inline(always)]
    unsafe fn reduce(wide: __m256i) -> u64 {
        horizontal_sum_u64(wide)
    }
}

impl SimdWideSum for I64x4 {
    type Wide = __m256i;

    #[inline(always)]
    unsafe fn wide_zero() -> __m256i {
        _mm256_setzero_si256()
    }

    #[inline(always)]
    unsafe fn accumulate(wide: __m256i, value: Self) -> __m256i {
        _mm256_add_epi64(wide, value.0)
    }

    #[inline(always)]
    unsafe fn reduce(wide: __m256i) -> i64 {
        horizontal_sum_u64(wide) as i64
    }
}

impl SimdWideSum for U64x4 {
    type Wide = __m256i;

    #[inline(always)]
    unsafe fn wide_zero() -> __m256i {
        _mm256_setzero_si256()
    }

    #[inline(always)]
    unsafe fn accumulate(wide: __m256i, value: Self) -> __m256i {
        _mm256_add_epi64(wide, value.0)
    }

    #[inline(always)]
    unsafe fn reduce(wide: __m256i) -> u64 {
        horizontal_sum_u64(wide)
    }
}
