//! NEON integer registers.

use std::arch::aarch64::*;

use crate::descriptor::CompareOp;
use crate::simd::traits::{SimdBits, SimdCompare, SimdMinMax, SimdSigned, SimdVec, SimdWideSum};

use super::{mask32, mask64, not_u64};

#[inline(always)]
unsafe fn not_s64(x: int64x2_t) -> int64x2_t {
    vreinterpretq_s64_s32(vmvnq_s32(vreinterpretq_s32_s64(x)))
}

macro_rules! neon_int {
    (
        $name:ident, $elem:ty, $reg:ty, $lanes:expr,
        load: $load:ident, store: $store:ident, add: $add:ident, not: $not:ident
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

        impl SimdBits for $name {
            #[inline(always)]
            unsafe fn not(self) -> Self {
                $name($not(self.0))
            }
        }
    };
}

neon_int!(I8x16, i8, int8x16_t, 16, load: vld1q_s8, store: vst1q_s8, add: vaddq_s8, not: vmvnq_s8);
neon_int!(U8x16, u8, uint8x16_t, 16, load: vld1q_u8, store: vst1q_u8, add: vaddq_u8, not: vmvnq_u8);
neon_int!(I16x8, i16, int16x8_t, 8, load: vld1q_s16, store: vst1q_s16, add: vaddq_s16, not: vmvnq_s16);
neon_int!(U16x8, u16, uint16x8_t, 8, load: vld1q_u16, store: vst1q_u16, add: vaddq_u16, not: vmvnq_u16);
neon_int!(I32x4, i32, int32x4_t, 4, load: vld1q_s32, store: vst1q_s32, add: vaddq_s32, not: vmvnq_s32);
neon_int!(U32x4, u32, uint32x4_t, 4, load: vld1q_u32, store: vst1q_u32, add: vaddq_u32, not: vmvnq_u32);
neon_int!(I64x2, i64, int64x2_t, 2, load: vld1q_s64, store: vst1q_s64, add: vaddq_s64, not: not_s64);
neon_int!(U64x2, u64, uint64x2_t, 2, load: vld1q_u64, store: vst1q_u64, add: vaddq_u64, not: not_u64);

// `vabsq` wraps at MIN rather than saturating.
macro_rules! neon_abs {
    ($name:ident, $abs:ident) => {
        impl SimdSigned for $name {
            #[inline(always)]
            unsafe fn wrapping_abs(self) -> Self {
                $name($abs(self.0))
            }
        }
    };
}

neon_abs!(I8x16, vabsq_s8);
neon_abs!(I16x8, vabsq_s16);
neon_abs!(I32x4, vabsq_s32);
neon_abs!(I64x2, vabsq_s64);

macro_rules! neon_min_max {
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

neon_min_max!(I8x16, vmaxq_s8, vminq_s8);
neon_min_max!(U8x16, vmaxq_u8, vminq_u8);
neon_min_max!(I16x8, vmaxq_s16, vminq_s16);
neon_min_max!(U16x8, vmaxq_u16, vminq_u16);
neon_min_max!(I32x4, vmaxq_s32, vminq_s32);
neon_min_max!(U32x4, vmaxq_u32, vminq_u32);

macro_rules! neon_compare {
    (
        $name:ident, $elem:ty, dup: $dup:ident,
        eq: $eq:ident, gt: $gt:ident, ge: $ge:ident, lt: $lt:ident, le: $le:ident,
        not: $not:ident, mask: $mask:ident
    ) => {
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

neon_compare!(
    I32x4, i32, dup: vdupq_n_s32,
    eq: vceqq_s32, gt: vcgtq_s32, ge: vcgeq_s32, lt: vcltq_s32, le: vcleq_s32,
    not: vmvnq_u32, mask: mask32
);
neon_compare!(
    I64x2, i64, dup: vdupq_n_s64,
    eq: vceqq_s64, gt: vcgtq_s64, ge: vcgeq_s64, lt: vcltq_s64, le: vcleq_s64,
    not: not_u64, mask: mask64
);

impl SimdWideSum for I32x4 {
    type Wide = int64x2_t;

    #[inline(always)]
    unsafe fn wide_zero() -> int64x2_t {
        vdupq_n_s64(0)
    }

    #[inline(always)]
    unsafe fn accumulate(wide: int64x2_t, value: Self) -> int64x2_t {
        vpadalq_s32(wide, value.0)
    }

    #[inline(always)]
    unsafe fn reduce(wide: int64x2_t) -> i64 {
        vaddvq_s64(wide)
    }
}

impl SimdWideSum for U32x4 {
    type Wide = uint64x2_t;

    #[inline(always)]
    unsafe fn wide_zero() -> uint64x2_t {
        vdupq_n_u64(0)
    }

    #[inline(always)]
    unsafe fn accumulate(wide: uint64x2_t, value: Self) -> uint64x2_t {
        vpadalq_u32(wide, value.0)
    }

    #[inline(always)]
    unsafe fn reduce(wide: uint64x2_t) -> u64 {
        vaddvq_u64(wide)
    }
}

impl SimdWideSum for I64x2 {
    type Wide = int64x2_t;

    #[inline(always)]
    unsafe fn wide_zero() -> int64x2_t {
        vdupq_n_s64(0)
    }

    #[inline(always)]
    unsafe fn accumulate(wide: int64x2_t, value: Self) -> int64x2_t {
        vaddq_s64(wide, value.0)
    }

    #[inline(always)]
    unsafe fn reduce(wide: int64x2_t) -> i64 {
        vaddvq_s64(wide)
    }
}

impl SimdWideSum for U64x2 {
    type Wide = uint64x2_t;

    #[inline(always)]
    unsafe fn wide_zero() -> uint64x2_t {
        vdupq_n_u64(0)
    }

    #[inline(always)]
    unsafe fn accumulate(wide: uint64x2_t, value: Self) -> uint64x2_t {
        vaddq_u64(wide, value.0)
    }

    #[inline(always)]
    unsafe fn reduce(wide: uint64x2_t) -> u64 {
        vaddvq_u64(wide)
    }
}
