//! Array buffers, borrowed views and call arguments.
//!
//! An [`ArrayBuffer`] owns a contiguous `Vec` of one element type. Operations
//! never see buffers directly: callers lend them out as [`ArrayView`]
//! (read-only) or [`ArrayViewMut`] (output, or in-place input/output), wrapped
//! in an [`Arg`]. Views are plain slices tagged with their element type, so
//! the borrow checker guarantees they neither outlive their buffer nor alias
//! a mutable view.

use crate::error::{invalid_option, Result};
use crate::types::{Element, ElementType, Scalar};

/// Expands `$body` once per element type, binding the typed payload to `$data`.
macro_rules! each_variant {
    ($value:expr, $enum:ident, $data:ident => $body:expr) => {
        match $value {
            $enum::I8($data) => $body,
            $enum::I16($data) => $body,
            $enum::I32($data) => $body,
            $enum::I64($data) => $body,
            $enum::U8($data) => $body,
            $enum::U16($data) => $body,
            $enum::U32($data) => $body,
            $enum::U64($data) => $body,
            $enum::F32($data) => $body,
            $enum::F64($data) => $body,
        }
    };
}

/// Like `each_variant!`, rewrapping the result in the same variant of `$to`.
macro_rules! map_variant {
    ($value:expr, $from:ident => $to:ident, $data:ident => $body:expr) => {
        match $value {
            $from::I8($data) => $to::I8($body),
            $from::I16($data) => $to::I16($body),
            $from::I32($data) => $to::I32($body),
            $from::I64($data) => $to::I64($body),
            $from::U8($data) => $to::U8($body),
            $from::U16($data) => $to::U16($body),
            $from::U32($data) => $to::U32($body),
            $from::U64($data) => $to::U64($body),
            $from::F32($data) => $to::F32($body),
            $from::F64($data) => $to::F64($body),
        }
    };
}

/// Like `map_variant!`, for bodies that return an `Option`.
macro_rules! try_map_variant {
    ($value:expr, $from:ident => $to:ident, $data:ident => $body:expr) => {
        match $value {
            $from::I8($data) => $body.map($to::I8),
            $from::I16($data) => $body.map($to::I16),
            $from::I32($data) => $body.map($to::I32),
            $from::I64($data) => $body.map($to::I64),
            $from::U8($data) => $body.map($to::U8),
            $from::U16($data) => $body.map($to::U16),
            $from::U32($data) => $body.map($to::U32),
            $from::U64($data) => $body.map($to::U64),
            $from::F32($data) => $body.map($to::F32),
            $from::F64($data) => $body.map($to::F64),
        }
    };
}

/// An owned, fixed-length, homogeneous array.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayBuffer {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl ArrayBuffer {
    pub fn from_vec<T: Element>(data: Vec<T>) -> Self {
        T::into_buffer(data)
    }

    /// A buffer of `len` zeros.
    pub fn zeroed(element_type: ElementType, len: usize) -> Self {
        match element_type {
            ElementType::I8 => ArrayBuffer::I8(vec![0; len]),
            ElementType::I16 => ArrayBuffer::I16(vec![0; len]),
            ElementType::I32 => ArrayBuffer::I32(vec![0; len]),
            ElementType::I64 => ArrayBuffer::I64(vec![0; len]),
            ElementType::U8 => ArrayBuffer::U8(vec![0; len]),
            ElementType::U16 => ArrayBuffer::U16(vec![0; len]),
            ElementType::U32 => ArrayBuffer::U32(vec![0; len]),
            ElementType::U64 => ArrayBuffer::U64(vec![0; len]),
            ElementType::F32 => ArrayBuffer::F32(vec![0.0; len]),
            ElementType::F64 => ArrayBuffer::F64(vec![0.0; len]),
        }
    }

    /// A buffer of `len` elements filled by repeating `pattern`.
    ///
    /// Fails if the pattern is empty or one of its values does not fit the
    /// element type.
    pub fn from_pattern(element_type: ElementType, len: usize, pattern: &[f64]) -> Result<Self> {
        fn fill<T: Element>(len: usize, pattern: &[f64]) -> Result<ArrayBuffer> {
            let values = pattern
                .iter()
                .map(|&v| {
                    T::from_f64(v).ok_or_else(|| {
                        invalid_option(
                            "pattern",
                            format!("value {v} does not fit element type {}", T::TYPE),
                        )
                    })
                })
                .collect::<Result<Vec<T>>>()?;
            Ok(T::into_buffer(
                values.iter().copied().cycle().take(len).collect(),
            ))
        }

        if pattern.is_empty() {
            return Err(invalid_option("pattern", "pattern must not be empty"));
        }

        match element_type {
            ElementType::I8 => fill::<i8>(len, pattern),
            ElementType::I16 => fill::<i16>(len, pattern),
            ElementType::I32 => fill::<i32>(len, pattern),
            ElementType::I64 => fill::<i64>(len, pattern),
            ElementType::U8 => fill::<u8>(len, pattern),
            ElementType::U16 => fill::<u16>(len, pattern),
            ElementType::U32 => fill::<u32>(len, pattern),
            ElementType::U64 => fill::<u64>(len, pattern),
            ElementType::F32 => fill::<f32>(len, pattern),
            ElementType::F64 => fill::<f64>(len, pattern),
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.view().element_type()
    }

    pub fn len(&self) -> usize {
        each_variant!(self, ArrayBuffer, data => data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn view(&self) -> ArrayView<'_> {
        map_variant!(self, ArrayBuffer => ArrayView, data => data.as_slice())
    }

    pub fn view_mut(&mut self) -> ArrayViewMut<'_> {
        map_variant!(self, ArrayBuffer => ArrayViewMut, data => data.as_mut_slice())
    }

    /// The contents as a typed slice, if `T` matches the element type.
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::buffer_slice(self)
    }

    pub fn get(&self, index: usize) -> Option<Scalar> {
        self.view().get(index)
    }
}

impl<T: Element> From<Vec<T>> for ArrayBuffer {
    fn from(data: Vec<T>) -> Self {
        T::into_buffer(data)
    }
}

/// A read-only, typed view over a contiguous run of elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrayView<'a> {
    I8(&'a [i8]),
    I16(&'a [i16]),
    I32(&'a [i32]),
    I64(&'a [i64]),
    U8(&'a [u8]),
    U16(&'a [u16]),
    U32(&'a [u32]),
    U64(&'a [u64]),
    F32(&'a [f32]),
    F64(&'a [f64]),
}

impl<'a> ArrayView<'a> {
    pub fn element_type(&self) -> ElementType {
        match self {
            ArrayView::I8(_) => ElementType::I8,
            ArrayView::I16(_) => ElementType::I16,
            ArrayView::I32(_) => ElementType::I32,
            ArrayView::I64(_) => ElementType::I64,
            ArrayView::U8(_) => ElementType::U8,
            ArrayView::U16(_) => ElementType::U16,
            ArrayView::U32(_) => ElementType::U32,
            ArrayView::U64(_) => ElementType::U64,
            ArrayView::F32(_) => ElementType::F32,
            ArrayView::F64(_) => ElementType::F64,
        }
    }

    pub fn len(&self) -> usize {
        each_variant!(self, ArrayView, data => data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first `len` elements, or `None` if the view is shorter than that.
    pub fn prefix(self, len: usize) -> Option<ArrayView<'a>> {
        try_map_variant!(self, ArrayView => ArrayView, data => data.get(..len))
    }

    pub fn get(&self, index: usize) -> Option<Scalar> {
        each_variant!(self, ArrayView, data => data.get(index).map(|v| v.into_scalar()))
    }

    /// The typed slice, if `T` matches the element type.
    pub fn typed<T: Element>(self) -> Option<&'a [T]> {
        T::from_view(self)
    }
}

impl<'a, T: Element> From<&'a [T]> for ArrayView<'a> {
    fn from(data: &'a [T]) -> Self {
        T::view(data)
    }
}

/// A mutable, typed view: an output array, or an array updated in place.
#[derive(Debug, PartialEq)]
pub enum ArrayViewMut<'a> {
    I8(&'a mut [i8]),
    I16(&'a mut [i16]),
    I32(&'a mut [i32]),
    I64(&'a mut [i64]),
    U8(&'a mut [u8]),
    U16(&'a mut [u16]),
    U32(&'a mut [u32]),
    U64(&'a mut [u64]),
    F32(&'a mut [f32]),
    F64(&'a mut [f64]),
}

impl<'a> ArrayViewMut<'a> {
    pub fn element_type(&self) -> ElementType {
        self.as_view().element_type()
    }

    pub fn len(&self) -> usize {
        each_variant!(self, ArrayViewMut, data => data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only view of the same elements.
    pub fn as_view(&self) -> ArrayView<'_> {
        map_variant!(self, ArrayViewMut => ArrayView, data => &data[..])
    }

    /// The first `len` elements, or `None` if the view is shorter than that.
    pub fn prefix(self, len: usize) -> Option<ArrayViewMut<'a>> {
        try_map_variant!(self, ArrayViewMut => ArrayViewMut, data => data.get_mut(..len))
    }

    /// The typed slice, if `T` matches the element type.
    pub fn typed<T: Element>(self) -> Option<&'a mut [T]> {
        T::from_view_mut(self)
    }
}

impl<'a, T: Element> From<&'a mut [T]> for ArrayViewMut<'a> {
    fn from(data: &'a mut [T]) -> Self {
        T::view_mut(data)
    }
}

/// The kind of an argument, as matched against operation signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Array,
    MutArray,
    Scalar,
}

/// One argument of an operation call.
#[derive(Debug, PartialEq)]
pub enum Arg<'a> {
    /// A read-only input array.
    Array(ArrayView<'a>),
    /// An output array, or an input array updated in place.
    Mut(ArrayViewMut<'a>),
    /// A scalar parameter.
    Scalar(Scalar),
}

impl<'a> Arg<'a> {
    pub fn scalar<T: Element>(value: T) -> Arg<'static> {
        Arg::Scalar(value.into_scalar())
    }

    pub fn kind(&self) -> ArgKind {
        match self {
            Arg::Array(_) => ArgKind::Array,
            Arg::Mut(_) => ArgKind::MutArray,
            Arg::Scalar(_) => ArgKind::Scalar,
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Arg::Array(view) => view.element_type(),
            Arg::Mut(view) => view.element_type(),
            Arg::Scalar(value) => value.element_type(),
        }
    }

    /// Length of an array argument; `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            Arg::Array(view) => Some(view.len()),
            Arg::Mut(view) => Some(view.len()),
            Arg::Scalar(_) => None,
        }
    }

    pub fn is_array(&self) -> bool {
        !matches!(self, Arg::Scalar(_))
    }
}

impl<'a, T: Element> From<&'a [T]> for Arg<'a> {
    fn from(data: &'a [T]) -> Self {
        Arg::Array(T::view(data))
    }
}

impl<'a, T: Element> From<&'a mut [T]> for Arg<'a> {
    fn from(data: &'a mut [T]) -> Self {
        Arg::Mut(T::view_mut(data))
    }
}

impl<'a> From<ArrayView<'a>> for Arg<'a> {
    fn from(view: ArrayView<'a>) -> Self {
        Arg::Array(view)
    }
}

impl<'a> From<ArrayViewMut<'a>> for Arg<'a> {
    fn from(view: ArrayViewMut<'a>) -> Self {
        Arg::Mut(view)
    }
}

impl From<Scalar> for Arg<'_> {
    fn from(value: Scalar) -> Self {
        Arg::Scalar(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_bounds_checked() {
        let data = [1i16, 2, 3, 4];
        let view = ArrayView::from(&data[..]);
        assert_eq!(view.prefix(2).map(|v| v.len()), Some(2));
        assert_eq!(view.prefix(4).map(|v| v.len()), Some(4));
        assert!(view.prefix(5).is_none());

        let mut out = [0u8; 3];
        let view = ArrayViewMut::from(&mut out[..]);
        assert!(view.prefix(4).is_none());
    }

    #[test]
    fn test_pattern_buffer() {
        let buffer = ArrayBuffer::from_pattern(ElementType::I8, 7, &[-1.0, 0.0, 1.0]).unwrap();
        assert_eq!(buffer.as_slice::<i8>(), Some(&[-1i8, 0, 1, -1, 0, 1, -1][..]));
        assert!(ArrayBuffer::from_pattern(ElementType::U8, 3, &[-1.0]).is_err());
        assert!(ArrayBuffer::from_pattern(ElementType::F32, 3, &[]).is_err());
    }

    #[test]
    fn test_buffer_views_keep_type() {
        let mut buffer = ArrayBuffer::zeroed(ElementType::U32, 5);
        assert_eq!(buffer.element_type(), ElementType::U32);
        assert_eq!(buffer.view().len(), 5);
        assert_eq!(buffer.view_mut().element_type(), ElementType::U32);
        assert!(buffer.as_slice::<i32>().is_none());
        assert_eq!(buffer.get(4), Some(Scalar::U32(0)));
        assert_eq!(buffer.get(5), None);
    }

    #[test]
    fn test_arg_kinds() {
        let input = [1.0f64, 2.0];
        let mut output = [0.0f64; 2];
        let a = Arg::from(&input[..]);
        let b = Arg::from(&mut output[..]);
        let c = Arg::scalar(3.0f64);

        assert_eq!(a.kind(), ArgKind::Array);
        assert_eq!(b.kind(), ArgKind::MutArray);
        assert_eq!(c.kind(), ArgKind::Scalar);
        assert_eq!(c.len(), None);
        assert!(b.is_array());
        assert_eq!(c.element_type(), ElementType::F64);
    }
}
