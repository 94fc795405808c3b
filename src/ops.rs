//! Typed entry points over the global [`Dispatcher`].
//!
//! Each function builds the argument list for one operation and runs it
//! through [`Dispatcher::global`], so validation, option handling and kernel
//! selection are exactly those of [`Dispatcher::call`].
//!
//! ```
//! use arrayfunc::{ops, CallOptions};
//!
//! let data = [-1.5f32, 2.0, -3.0];
//! let mut out = [0.0f32; 3];
//! ops::fabs(&data, &mut out, &CallOptions::default()).unwrap();
//! assert_eq!(out, [1.5, 2.0, 3.0]);
//! assert_eq!(ops::amax(&out, &CallOptions::default()).unwrap(), 3.0);
//! ```

use crate::array::Arg;
use crate::descriptor::{CompareOp, Operation};
use crate::dispatch::{Dispatcher, Outcome};
use crate::error::{unexpected_outcome, Result};
use crate::options::CallOptions;
use crate::types::Element;

fn run(operation: Operation, args: Vec<Arg<'_>>, options: &CallOptions) -> Result<Outcome> {
    Dispatcher::global().call(operation, args, options)
}

fn written(outcome: Result<Outcome>) -> Result<()> {
    outcome.map(|_| ())
}

fn boolean(operation: Operation, outcome: Result<Outcome>) -> Result<bool> {
    let outcome = outcome?;
    outcome
        .as_bool()
        .ok_or_else(|| unexpected_outcome(operation.name(), "a boolean", format!("{outcome:?}")))
}

fn value<R: Element>(operation: Operation, outcome: Result<Outcome>) -> Result<R> {
    let outcome = outcome?;
    let scalar = outcome.as_scalar().ok_or_else(|| {
        unexpected_outcome(operation.name(), "a value", format!("{outcome:?}"))
    })?;
    R::from_scalar(scalar).ok_or_else(|| {
        unexpected_outcome(operation.name(), R::TYPE.name(), format!("{scalar:?}"))
    })
}

/// `out[i] = |data[i]|` for floats.
pub fn fabs<T: Element>(data: &[T], out: &mut [T], options: &CallOptions) -> Result<()> {
    written(run(
        Operation::Fabs,
        vec![Arg::from(data), Arg::from(out)],
        options,
    ))
}

pub fn fabs_in_place<T: Element>(data: &mut [T], options: &CallOptions) -> Result<()> {
    written(run(Operation::Fabs, vec![Arg::from(data)], options))
}

/// `out[i] = |data[i]|` for signed integers and floats.
pub fn abs<T: Element>(data: &[T], out: &mut [T], options: &CallOptions) -> Result<()> {
    written(run(
        Operation::Abs,
        vec![Arg::from(data), Arg::from(out)],
        options,
    ))
}

pub fn abs_in_place<T: Element>(data: &mut [T], options: &CallOptions) -> Result<()> {
    written(run(Operation::Abs, vec![Arg::from(data)], options))
}

/// `out[i] = lhs[i] + rhs[i]`.
pub fn add<T: Element>(lhs: &[T], rhs: &[T], out: &mut [T], options: &CallOptions) -> Result<()> {
    written(run(
        Operation::Add,
        vec![Arg::from(lhs), Arg::from(rhs), Arg::from(out)],
        options,
    ))
}

/// `acc[i] += rhs[i]`.
pub fn add_in_place<T: Element>(acc: &mut [T], rhs: &[T], options: &CallOptions) -> Result<()> {
    written(run(
        Operation::Add,
        vec![Arg::from(acc), Arg::from(rhs)],
        options,
    ))
}

/// `out[i] = !data[i]` for integers.
pub fn invert<T: Element>(data: &[T], out: &mut [T], options: &CallOptions) -> Result<()> {
    written(run(
        Operation::Invert,
        vec![Arg::from(data), Arg::from(out)],
        options,
    ))
}

pub fn invert_in_place<T: Element>(data: &mut [T], options: &CallOptions) -> Result<()> {
    written(run(Operation::Invert, vec![Arg::from(data)], options))
}

/// True when any element is ±infinity.
pub fn isinf<T: Element>(data: &[T], options: &CallOptions) -> Result<bool> {
    boolean(Operation::IsInf, run(Operation::IsInf, vec![Arg::from(data)], options))
}

/// True when any element is NaN.
pub fn isnan<T: Element>(data: &[T], options: &CallOptions) -> Result<bool> {
    boolean(Operation::IsNan, run(Operation::IsNan, vec![Arg::from(data)], options))
}

/// True when every element is finite; true for an empty array.
pub fn isfinite<T: Element>(data: &[T], options: &CallOptions) -> Result<bool> {
    boolean(Operation::IsFinite, run(Operation::IsFinite, vec![Arg::from(data)], options))
}

pub fn amax<T: Element>(data: &[T], options: &CallOptions) -> Result<T> {
    value(
        Operation::AMax,
        run(Operation::AMax, vec![Arg::from(data)], options),
    )
}

pub fn amin<T: Element>(data: &[T], options: &CallOptions) -> Result<T> {
    value(
        Operation::AMin,
        run(Operation::AMin, vec![Arg::from(data)], options),
    )
}

/// Sum in the accumulator type: `i64` for signed, `u64` for unsigned and
/// `f64` for float elements.
pub fn asum<T: Element>(data: &[T], options: &CallOptions) -> Result<T::Accumulator> {
    value(
        Operation::ASum,
        run(Operation::ASum, vec![Arg::from(data)], options),
    )
}

/// True when some element satisfies `x <op> param`.
pub fn aany<T: Element>(op: CompareOp, data: &[T], param: T, options: &CallOptions) -> Result<bool> {
    let operation = Operation::AAny(op);
    boolean(
        operation,
        run(operation, vec![Arg::from(data), Arg::scalar(param)], options),
    )
}

/// True when every element satisfies `x <op> param`; true for an empty array.
pub fn aall<T: Element>(op: CompareOp, data: &[T], param: T, options: &CallOptions) -> Result<bool> {
    let operation = Operation::AAll(op);
    boolean(
        operation,
        run(operation, vec![Arg::from(data), Arg::scalar(param)], options),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArrayFuncError;
    use crate::types::Scalar;

    #[test]
    fn test_asum_widens() {
        let data = [i8::MIN; 4];
        assert_eq!(asum(&data, &CallOptions::default()).unwrap(), -512i64);
        let data = [1.5f32, 2.0];
        assert_eq!(asum(&data, &CallOptions::default()).unwrap(), 3.5f64);
    }

    #[test]
    fn test_unsupported_type_surfaces() {
        let data = [1u32, 2];
        let err = isnan(&data, &CallOptions::default()).unwrap_err();
        assert!(matches!(err, ArrayFuncError::UnsupportedType { .. }));
    }

    #[test]
    fn test_outcome_of_the_wrong_shape_is_an_error() {
        let err = boolean(Operation::IsNan, Ok(Outcome::Written)).unwrap_err();
        println!("{err}");
        assert!(matches!(
            err,
            ArrayFuncError::UnexpectedOutcome {
                operation: "isnan",
                expected: "a boolean",
                ..
            }
        ));

        let err = value::<i32>(Operation::AMax, Ok(Outcome::Bool(true))).unwrap_err();
        assert!(matches!(
            err,
            ArrayFuncError::UnexpectedOutcome {
                expected: "a value",
                ..
            }
        ));

        let err = value::<i32>(Operation::AMax, Ok(Outcome::Value(Scalar::F32(1.0)))).unwrap_err();
        assert!(matches!(
            err,
            ArrayFuncError::UnexpectedOutcome {
                expected: "i32",
                ..
            }
        ));

        assert_eq!(value::<i64>(Operation::ASum, Ok(Outcome::Value(Scalar::I64(7)))), Ok(7));
        assert_eq!(boolean(Operation::IsInf, Ok(Outcome::Bool(false))), Ok(false));
    }

    #[test]
    fn test_empty_reductions() {
        let empty: [f64; 0] = [];
        let options = CallOptions::default();
        assert!(isfinite(&empty, &options).unwrap());
        assert!(!isinf(&empty, &options).unwrap());
        assert!(aall(CompareOp::Lt, &empty, 0.0, &options).unwrap());
        assert!(!aany(CompareOp::Lt, &empty, 0.0, &options).unwrap());
        assert_eq!(asum(&empty, &options).unwrap(), 0.0);
        assert!(amax(&empty, &options).is_err());
    }
}
