//! Lane-level register traits.
//!
//! Each instruction set provides one register type per element type and
//! implements the subset of these traits its kernels need. Kernel bodies in
//! [`super::kernels`] are written once against the traits.
//!
//! Mask-returning methods pack one bit per lane, lane 0 in bit 0.

use crate::descriptor::CompareOp;
use crate::types::Element;

pub(crate) trait SimdVec: Copy {
    type Elem: Element;

    /// Number of elements in one register.
    const LANES: usize;

    /// # Safety
    ///
    /// `ptr` must be valid for reading `LANES` elements.
    unsafe fn load(ptr: *const Self::Elem) -> Self;

    /// # Safety
    ///
    /// `ptr` must be valid for writing `LANES` elements.
    unsafe fn store(self, ptr: *mut Self::Elem);

    /// Lane-wise sum: wrapping for integers, IEEE for floats.
    ///
    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn add(self, rhs: Self) -> Self;
}

pub(crate) trait SimdFloat: SimdVec {
    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn abs(self) -> Self;

    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn finite_mask(self) -> u32;

    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn nan_mask(self) -> u32;

    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn infinite_mask(self) -> u32;
}

pub(crate) trait SimdSigned: SimdVec {
    /// Absolute value where `MIN` maps to itself.
    ///
    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn wrapping_abs(self) -> Self;
}

pub(crate) trait SimdBits: SimdVec {
    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn not(self) -> Self;
}

pub(crate) trait SimdMinMax: SimdVec {
    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn max(self, rhs: Self) -> Self;

    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn min(self, rhs: Self) -> Self;
}

pub(crate) trait SimdCompare: SimdVec {
    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn splat(value: Self::Elem) -> Self;

    /// Lanes where `self <op> rhs` holds, with `PartialOrd` semantics.
    ///
    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn compare(self, op: CompareOp, rhs: Self) -> u32;
}

/// Summation into 64-bit lanes.
pub(crate) trait SimdWideSum: SimdVec {
    type Wide: Copy;

    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn wide_zero() -> Self::Wide;

    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn accumulate(wide: Self::Wide, value: Self) -> Self::Wide;

    /// Wrapping horizontal sum of the wide lanes.
    ///
    /// # Safety
    ///
    /// The instruction set must be available.
    unsafe fn reduce(wide: Self::Wide) -> <Self::Elem as Element>::Accumulator;
}

/// Mask with the low `lanes` bits set.
#[inline(always)]
pub(crate) const fn full_mask(lanes: usize) -> u32 {
    if lanes >= 32 {
        u32::MAX
    } else {
        (1u32 << lanes) - 1
    }
}
