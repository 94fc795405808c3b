//! Element type registry.
//!
//! [`ElementType`] is the runtime tag carried by buffers, views and scalars.
//! [`Element`] ties each tag to its Rust primitive and carries the per-type
//! numeric behaviour the scalar kernels are written against: checked and
//! wrapping arithmetic, NaN/infinity classification, and the accumulator type
//! used by sums.

use std::fmt;
use std::str::FromStr;

use num::traits::{AsPrimitive, CheckedAdd, WrappingAdd};
use num::{Float, NumCast, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::array::{ArrayBuffer, ArrayView, ArrayViewMut};
use crate::error::{invalid_option, ArrayFuncError};

/// Numeric kind and width of an array element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ElementType {
    /// Every supported element type, integers first.
    pub const ALL: [ElementType; 10] = [
        ElementType::I8,
        ElementType::I16,
        ElementType::I32,
        ElementType::I64,
        ElementType::U8,
        ElementType::U16,
        ElementType::U32,
        ElementType::U64,
        ElementType::F32,
        ElementType::F64,
    ];

    /// Storage size of one element in bytes.
    pub const fn size_of(self) -> usize {
        match self {
            ElementType::I8 | ElementType::U8 => 1,
            ElementType::I16 | ElementType::U16 => 2,
            ElementType::I32 | ElementType::U32 | ElementType::F32 => 4,
            ElementType::I64 | ElementType::U64 | ElementType::F64 => 8,
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, ElementType::F32 | ElementType::F64)
    }

    pub const fn is_signed(self) -> bool {
        !matches!(
            self,
            ElementType::U8 | ElementType::U16 | ElementType::U32 | ElementType::U64
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementType::I8 => "i8",
            ElementType::I16 => "i16",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = ArrayFuncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| invalid_option("type", format!("unknown element type `{s}`")))
    }
}

/// A set of element types, used by operation descriptors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeSet(u16);

impl TypeSet {
    pub const EMPTY: TypeSet = TypeSet(0);

    pub const SIGNED: TypeSet = TypeSet::EMPTY
        .with(ElementType::I8)
        .with(ElementType::I16)
        .with(ElementType::I32)
        .with(ElementType::I64);

    pub const UNSIGNED: TypeSet = TypeSet::EMPTY
        .with(ElementType::U8)
        .with(ElementType::U16)
        .with(ElementType::U32)
        .with(ElementType::U64);

    pub const INTEGERS: TypeSet = TypeSet::SIGNED.union(TypeSet::UNSIGNED);

    pub const FLOATS: TypeSet = TypeSet::EMPTY
        .with(ElementType::F32)
        .with(ElementType::F64);

    pub const ALL: TypeSet = TypeSet::INTEGERS.union(TypeSet::FLOATS);

    pub const fn with(self, ty: ElementType) -> TypeSet {
        TypeSet(self.0 | ty.bit())
    }

    pub const fn union(self, other: TypeSet) -> TypeSet {
        TypeSet(self.0 | other.0)
    }

    pub const fn contains(self, ty: ElementType) -> bool {
        self.0 & ty.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ElementType> {
        ElementType::ALL
            .into_iter()
            .filter(move |ty| self.contains(*ty))
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A single value of one element type.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Scalar {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Scalar {
    pub fn element_type(&self) -> ElementType {
        match self {
            Scalar::I8(_) => ElementType::I8,
            Scalar::I16(_) => ElementType::I16,
            Scalar::I32(_) => ElementType::I32,
            Scalar::I64(_) => ElementType::I64,
            Scalar::U8(_) => ElementType::U8,
            Scalar::U16(_) => ElementType::U16,
            Scalar::U32(_) => ElementType::U32,
            Scalar::U64(_) => ElementType::U64,
            Scalar::F32(_) => ElementType::F32,
            Scalar::F64(_) => ElementType::F64,
        }
    }

    /// Extracts the value if it is of type `T`.
    pub fn get<T: Element>(self) -> Option<T> {
        T::from_scalar(self)
    }

    /// Lossy conversion to `f64`, for reporting.
    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::I8(v) => v as f64,
            Scalar::I16(v) => v as f64,
            Scalar::I32(v) => v as f64,
            Scalar::I64(v) => v as f64,
            Scalar::U8(v) => v as f64,
            Scalar::U16(v) => v as f64,
            Scalar::U32(v) => v as f64,
            Scalar::U64(v) => v as f64,
            Scalar::F32(v) => v as f64,
            Scalar::F64(v) => v,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::I8(v) => write!(f, "{v}"),
            Scalar::I16(v) => write!(f, "{v}"),
            Scalar::I32(v) => write!(f, "{v}"),
            Scalar::I64(v) => write!(f, "{v}"),
            Scalar::U8(v) => write!(f, "{v}"),
            Scalar::U16(v) => write!(f, "{v}"),
            Scalar::U32(v) => write!(f, "{v}"),
            Scalar::U64(v) => write!(f, "{v}"),
            Scalar::F32(v) => write!(f, "{v}"),
            Scalar::F64(v) => write!(f, "{v}"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust primitive that can be stored in an array.
///
/// Implemented for `i8`–`i64`, `u8`–`u64`, `f32` and `f64` only.
pub trait Element:
    Copy
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + NumCast
    + ToPrimitive
    + Zero
    + 'static
    + sealed::Sealed
{
    const TYPE: ElementType;

    /// Type that sums of this element type accumulate into.
    type Accumulator: Element;

    fn view(data: &[Self]) -> ArrayView<'_>;
    fn view_mut(data: &mut [Self]) -> ArrayViewMut<'_>;
    fn from_view(view: ArrayView<'_>) -> Option<&[Self]>;
    fn from_view_mut(view: ArrayViewMut<'_>) -> Option<&mut [Self]>;
    fn into_buffer(data: Vec<Self>) -> ArrayBuffer;
    fn buffer_slice(buffer: &ArrayBuffer) -> Option<&[Self]>;
    fn into_scalar(self) -> Scalar;
    fn from_scalar(scalar: Scalar) -> Option<Self>;

    /// Absolute value, or `None` when it is a math error
    /// (`MIN` for signed integers, a non-finite float).
    fn checked_abs(self) -> Option<Self>;
    fn wrapping_abs(self) -> Self;

    /// Sum, or `None` on integer overflow or a non-finite float result.
    fn checked_add(self, rhs: Self) -> Option<Self>;
    fn wrapping_add(self, rhs: Self) -> Self;

    fn is_nan(self) -> bool;
    fn is_infinite(self) -> bool;
    fn is_finite(self) -> bool;

    /// Adds `value` to a running sum. With `checked`, `None` signals overflow
    /// (integers) or a non-finite sum (floats).
    fn accumulate(acc: Self::Accumulator, value: Self, checked: bool)
        -> Option<Self::Accumulator>;

    /// Lossy conversion from `f64`, used to build test patterns.
    fn from_f64(value: f64) -> Option<Self> {
        <Self as NumCast>::from(value)
    }
}

macro_rules! element_common {
    ($t:ty, $variant:ident) => {
        const TYPE: ElementType = ElementType::$variant;

        #[inline(always)]
        fn view(data: &[$t]) -> ArrayView<'_> {
            ArrayView::$variant(data)
        }

        #[inline(always)]
        fn view_mut(data: &mut [$t]) -> ArrayViewMut<'_> {
            ArrayViewMut::$variant(data)
        }

        #[inline(always)]
        fn from_view(view: ArrayView<'_>) -> Option<&[$t]> {
            match view {
                ArrayView::$variant(data) => Some(data),
                _ => None,
            }
        }

        #[inline(always)]
        fn from_view_mut(view: ArrayViewMut<'_>) -> Option<&mut [$t]> {
            match view {
                ArrayViewMut::$variant(data) => Some(data),
                _ => None,
            }
        }

        fn into_buffer(data: Vec<$t>) -> ArrayBuffer {
            ArrayBuffer::$variant(data)
        }

        fn buffer_slice(buffer: &ArrayBuffer) -> Option<&[$t]> {
            match buffer {
                ArrayBuffer::$variant(data) => Some(data),
                _ => None,
            }
        }

        #[inline(always)]
        fn into_scalar(self) -> Scalar {
            Scalar::$variant(self)
        }

        #[inline(always)]
        fn from_scalar(scalar: Scalar) -> Option<$t> {
            match scalar {
                Scalar::$variant(value) => Some(value),
                _ => None,
            }
        }
    };
}

macro_rules! impl_integer_element {
    ($t:ty, $variant:ident, $acc:ty, signed) => {
        impl_integer_element!(@impl $t, $variant, $acc,
            |x: $t| <$t>::checked_abs(x),
            |x: $t| <$t>::wrapping_abs(x));
    };
    ($t:ty, $variant:ident, $acc:ty, unsigned) => {
        impl_integer_element!(@impl $t, $variant, $acc, |x: $t| Some(x), |x: $t| x);
    };
    (@impl $t:ty, $variant:ident, $acc:ty, $checked_abs:expr, $wrapping_abs:expr) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            type Accumulator = $acc;

            element_common!($t, $variant);

            #[inline(always)]
            fn checked_abs(self) -> Option<$t> {
                ($checked_abs)(self)
            }

            #[inline(always)]
            fn wrapping_abs(self) -> $t {
                ($wrapping_abs)(self)
            }

            #[inline(always)]
            fn checked_add(self, rhs: $t) -> Option<$t> {
                CheckedAdd::checked_add(&self, &rhs)
            }

            #[inline(always)]
            fn wrapping_add(self, rhs: $t) -> $t {
                WrappingAdd::wrapping_add(&self, &rhs)
            }

            #[inline(always)]
            fn is_nan(self) -> bool {
                false
            }

            #[inline(always)]
            fn is_infinite(self) -> bool {
                false
            }

            #[inline(always)]
            fn is_finite(self) -> bool {
                true
            }

            #[inline(always)]
            fn accumulate(acc: $acc, value: $t, checked: bool) -> Option<$acc> {
                let wide: $acc = value.as_();
                if checked {
                    CheckedAdd::checked_add(&acc, &wide)
                } else {
                    Some(WrappingAdd::wrapping_add(&acc, &wide))
                }
            }
        }
    };
}

macro_rules! impl_float_element {
    ($t:ty, $variant:ident) => {
        impl sealed::Sealed for $t {}

        impl Element for $t {
            type Accumulator = f64;

            element_common!($t, $variant);

            #[inline(always)]
            fn checked_abs(self) -> Option<$t> {
                let value = Float::abs(self);
                Float::is_finite(value).then_some(value)
            }

            #[inline(always)]
            fn wrapping_abs(self) -> $t {
                Float::abs(self)
            }

            #[inline(always)]
            fn checked_add(self, rhs: $t) -> Option<$t> {
                let sum = self + rhs;
                Float::is_finite(sum).then_some(sum)
            }

            #[inline(always)]
            fn wrapping_add(self, rhs: $t) -> $t {
                self + rhs
            }

            #[inline(always)]
            fn is_nan(self) -> bool {
                Float::is_nan(self)
            }

            #[inline(always)]
            fn is_infinite(self) -> bool {
                Float::is_infinite(self)
            }

            #[inline(always)]
            fn is_finite(self) -> bool {
                Float::is_finite(self)
            }

            #[inline(always)]
            fn accumulate(acc: f64, value: $t, checked: bool) -> Option<f64> {
                let wide: f64 = value.as_();
                let sum = acc + wide;
                if checked && !sum.is_finite() {
                    None
                } else {
                    Some(sum)
                }
            }
        }
    };
}

impl_integer_element!(i8, I8, i64, signed);
impl_integer_element!(i16, I16, i64, signed);
impl_integer_element!(i32, I32, i64, signed);
impl_integer_element!(i64, I64, i64, signed);
impl_integer_element!(u8, U8, u64, unsigned);
impl_integer_element!(u16, U16, u64, unsigned);
impl_integer_element!(u32, U32, u64, unsigned);
impl_integer_element!(u64, U64, u64, unsigned);
impl_float_element!(f32, F32);
impl_float_element!(f64, F64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_set_membership() {
        assert!(TypeSet::FLOATS.contains(ElementType::F32));
        assert!(!TypeSet::FLOATS.contains(ElementType::I32));
        assert!(TypeSet::INTEGERS.contains(ElementType::U64));
        assert_eq!(TypeSet::ALL.iter().count(), 10);
        assert_eq!(
            TypeSet::SIGNED.iter().collect::<Vec<_>>(),
            vec![
                ElementType::I8,
                ElementType::I16,
                ElementType::I32,
                ElementType::I64
            ]
        );
        assert!(TypeSet::EMPTY.is_empty());
    }

    #[test]
    fn test_element_type_names_round_trip() {
        for ty in ElementType::ALL {
            assert_eq!(ty.name().parse::<ElementType>().unwrap(), ty);
        }
        assert!("float".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_element_type_properties() {
        assert_eq!(ElementType::I16.size_of(), 2);
        assert_eq!(ElementType::F64.size_of(), 8);
        assert!(ElementType::F32.is_float());
        assert!(ElementType::I8.is_signed());
        assert!(!ElementType::U32.is_signed());
    }

    #[test]
    fn test_checked_integer_arithmetic() {
        assert_eq!(Element::checked_abs(i8::MIN), None);
        assert_eq!(Element::wrapping_abs(i8::MIN), i8::MIN);
        assert_eq!(Element::checked_add(100i8, 27), Some(127));
        assert_eq!(Element::checked_add(100i8, 28), None);
        assert_eq!(Element::wrapping_add(255u8, 1), 0);
    }

    #[test]
    fn test_float_math_errors() {
        assert_eq!(Element::checked_abs(-2.5f32), Some(2.5));
        assert_eq!(Element::checked_abs(f32::NEG_INFINITY), None);
        assert_eq!(Element::checked_add(f64::MAX, f64::MAX), None);
        assert!(Element::wrapping_add(f64::MAX, f64::MAX).is_infinite());
    }

    #[test]
    fn test_accumulators() {
        assert_eq!(<i8 as Element>::accumulate(0i64, -5i8, true), Some(-5));
        assert_eq!(<u32 as Element>::accumulate(1u64, u32::MAX, true), Some(1 << 32));
        assert_eq!(<i64 as Element>::accumulate(i64::MAX, 1, true), None);
        assert_eq!(<i64 as Element>::accumulate(i64::MAX, 1, false), Some(i64::MIN));
        assert_eq!(<f32 as Element>::accumulate(1.0, 0.5f32, true), Some(1.5));
    }

    #[test]
    fn test_scalar_conversions() {
        let scalar = 7u16.into_scalar();
        assert_eq!(scalar.element_type(), ElementType::U16);
        assert_eq!(scalar.get::<u16>(), Some(7));
        assert_eq!(scalar.get::<i16>(), None);
        assert_eq!(Scalar::F32(0.5).to_f64(), 0.5);
    }
}
