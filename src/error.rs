//! Error types for arrayfunc operations.
//!
//! Every failure an operation can report is a variant of [`ArrayFuncError`].
//! Caller-contract violations (arity, types, options) are raised by the
//! validator before any numeric work; [`ArrayFuncError::Math`] is raised by
//! the kernels while math-error checking is enabled.

use std::fmt;

use thiserror::Error;

use crate::types::ElementType;

/// Errors that can occur during arrayfunc operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayFuncError {
    /// Wrong number or kind of arguments for the operation.
    #[error("{operation}: arity error: {message}")]
    Arity {
        /// Name of the operation that was called.
        operation: &'static str,
        /// Human-readable error message.
        message: String,
    },
    /// Two arguments of the same call have different element types.
    #[error("{operation}: type mismatch: expected {expected}, found {found} (argument {position})")]
    TypeMismatch {
        operation: &'static str,
        /// Element type of the first array argument.
        expected: ElementType,
        /// Element type of the offending argument.
        found: ElementType,
        /// Zero-based position of the offending argument.
        position: usize,
    },
    /// The operation has no kernel for this element type.
    #[error("{operation}: unsupported element type {element_type}")]
    UnsupportedType {
        operation: &'static str,
        element_type: ElementType,
    },
    /// An option was supplied to an operation that does not recognise it.
    #[error("{operation}: option `{option}` is not supported by this operation")]
    UnsupportedOption {
        operation: &'static str,
        option: &'static str,
    },
    /// An option value is malformed or out of range.
    #[error("invalid value for option `{option}`: {message}")]
    InvalidOption { option: String, message: String },
    /// A numeric-domain error detected while math-error checking was enabled.
    #[error("{operation}: math error ({kind}) at index {index}")]
    Math {
        operation: &'static str,
        kind: MathErrorKind,
        /// Index of the element where the error was detected.
        index: usize,
    },
    /// A reduction that returns an element was applied to zero elements.
    #[error("{operation}: effective array length is zero")]
    EmptyArray { operation: &'static str },
    /// A call succeeded but produced a different kind of result than the
    /// caller asked for.
    #[error("{operation}: expected {expected}, got {found}")]
    UnexpectedOutcome {
        operation: &'static str,
        expected: &'static str,
        found: String,
    },
}

/// The numeric condition behind an [`ArrayFuncError::Math`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathErrorKind {
    /// Integer result does not fit the result type.
    Overflow,
    /// Floating-point operand or result is NaN or infinite.
    NonFinite,
    /// NaN operand where an ordering is required.
    Nan,
}

impl fmt::Display for MathErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MathErrorKind::Overflow => "overflow",
            MathErrorKind::NonFinite => "non-finite value",
            MathErrorKind::Nan => "nan",
        };
        f.write_str(name)
    }
}

/// Result type alias for arrayfunc operations.
pub type Result<T> = std::result::Result<T, ArrayFuncError>;

/// A math fault raised inside a kernel, before the operation name is known.
///
/// Kernels (scalar and vectorized) report faults through this type so that
/// both paths name the same element; the dispatcher attaches the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MathFault {
    pub(crate) kind: MathErrorKind,
    pub(crate) index: usize,
}

impl MathFault {
    #[inline(always)]
    pub(crate) fn new(kind: MathErrorKind, index: usize) -> Self {
        MathFault { kind, index }
    }

    pub(crate) fn into_error(self, operation: &'static str) -> ArrayFuncError {
        math_error(operation, self.kind, self.index)
    }
}

/// Creates an arity error.
pub fn arity_error(operation: &'static str, message: impl Into<String>) -> ArrayFuncError {
    ArrayFuncError::Arity {
        operation,
        message: message.into(),
    }
}

/// Creates a type mismatch error.
pub fn type_mismatch(
    operation: &'static str,
    expected: ElementType,
    found: ElementType,
    position: usize,
) -> ArrayFuncError {
    ArrayFuncError::TypeMismatch {
        operation,
        expected,
        found,
        position,
    }
}

/// Creates an unsupported element type error.
pub fn unsupported_type(operation: &'static str, element_type: ElementType) -> ArrayFuncError {
    ArrayFuncError::UnsupportedType {
        operation,
        element_type,
    }
}

/// Creates an unsupported option error.
pub fn unsupported_option(operation: &'static str, option: &'static str) -> ArrayFuncError {
    ArrayFuncError::UnsupportedOption { operation, option }
}

/// Creates an invalid option error.
pub fn invalid_option(option: impl Into<String>, message: impl Into<String>) -> ArrayFuncError {
    ArrayFuncError::InvalidOption {
        option: option.into(),
        message: message.into(),
    }
}

/// Creates a math error.
pub fn math_error(operation: &'static str, kind: MathErrorKind, index: usize) -> ArrayFuncError {
    ArrayFuncError::Math {
        operation,
        kind,
        index,
    }
}

/// Creates an unexpected outcome error.
pub fn unexpected_outcome(
    operation: &'static str,
    expected: &'static str,
    found: impl Into<String>,
) -> ArrayFuncError {
    ArrayFuncError::UnexpectedOutcome {
        operation,
        expected,
        found: found.into(),
    }
}
