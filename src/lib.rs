//! Bulk numeric operations over homogeneous arrays.
//!
//! Every operation has a scalar reference kernel and, for selected element
//! types, a vectorized kernel (AVX2 on x86_64, NEON on aarch64) that
//! produces the same results. Calls go through one validation and dispatch
//! path:
//!
//! 1. [`validate`] checks arity, type consistency, type support and option
//!    legality, then cuts every array to the effective length.
//! 2. [`Dispatcher`] picks the scalar or vectorized kernel from the
//!    operation's [`OperationDescriptor`], the [`CallOptions`] and the
//!    detected [`Platform`], and runs it.
//!
//! The [`ops`] module offers typed shortcuts over the process-wide
//! dispatcher, and [`calibrate`] measures scalar against vectorized
//! latency.
//!
//! ```
//! use arrayfunc::{ops, CallOptions, CompareOp};
//!
//! let data = [3i32, -7, 12, 0];
//! let options = CallOptions::default();
//! assert_eq!(ops::amin(&data, &options).unwrap(), -7);
//! assert_eq!(ops::asum(&data, &options).unwrap(), 8i64);
//! assert!(ops::aany(CompareOp::Gt, &data, 10, &options).unwrap());
//!
//! // Only the first two elements take part.
//! let options = options.with_max_len(2);
//! assert_eq!(ops::amax(&data, &options).unwrap(), 3);
//! ```
//!
//! Setting the `ARRAYFUNC_NOSIMD` environment variable before the first call
//! disables vectorized kernels for the process.

pub mod array;
pub mod calibrate;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod ops;
pub mod options;
pub mod platform;
pub mod types;
pub mod validate;

mod scalar;
mod simd;

pub use array::{Arg, ArgKind, ArrayBuffer, ArrayView, ArrayViewMut};
pub use descriptor::{CompareOp, Operand, Operation, OperationDescriptor, Returns, SimdCoverage};
pub use dispatch::{Dispatcher, KernelPath, Outcome};
pub use error::{ArrayFuncError, MathErrorKind, Result};
pub use options::{CallOptions, OptionValue};
pub use platform::{ArchFamily, Platform, SimdIsa};
pub use types::{Element, ElementType, Scalar, TypeSet};
pub use validate::{validate, ValidatedCall};
