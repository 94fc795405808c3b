//! Dispatch core.
//!
//! A [`Dispatcher`] validates a call, picks the scalar or vectorized kernel
//! for the element type, runs it and shapes the result. Selection depends
//! only on the operation descriptor, the call options and the
//! [`Platform`]; every path produces the same observable results.

use std::sync::OnceLock;

use log::{debug, trace};
use num::PrimInt;
use serde::Serialize;

use crate::array::{Arg, ArrayView, ArrayViewMut};
use crate::descriptor::{FloatClass, Operation, Quantifier};
use crate::error::{arity_error, type_mismatch, unsupported_type, ArrayFuncError, Result};
use crate::options::CallOptions;
use crate::platform::{Platform, SimdIsa};
use crate::scalar;
use crate::simd::Vectorized;
use crate::types::{Element, ElementType, Scalar};
use crate::validate::{validate, CallParts, ValidatedCall};

static GLOBAL: OnceLock<Dispatcher> = OnceLock::new();

/// Which kernel family serves a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KernelPath {
    Scalar,
    Vector(SimdIsa),
}

/// Result of a successful call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// The output array was written.
    Written,
    Bool(bool),
    /// An element or accumulator value.
    Value(Scalar),
}

impl Outcome {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Outcome::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_scalar(self) -> Option<Scalar> {
        match self {
            Outcome::Value(value) => Some(value),
            _ => None,
        }
    }
}

/// Runs operations against one [`Platform`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    platform: Platform,
}

/// Binds `$T` to the Rust type of `$ty` and evaluates `$body`.
macro_rules! with_element_type {
    ($ty:expr, $T:ident => $body:expr) => {
        match $ty {
            ElementType::I8 => {
                type $T = i8;
                $body
            }
            ElementType::U8 => {
                type $T = u8;
                $body
            }
            ElementType::I16 => {
                type $T = i16;
                $body
            }
            ElementType::U16 => {
                type $T = u16;
                $body
            }
            ElementType::I32 => {
                type $T = i32;
                $body
            }
            ElementType::U32 => {
                type $T = u32;
                $body
            }
            ElementType::I64 => {
                type $T = i64;
                $body
            }
            ElementType::U64 => {
                type $T = u64;
                $body
            }
            ElementType::F32 => {
                type $T = f32;
                $body
            }
            ElementType::F64 => {
                type $T = f64;
                $body
            }
        }
    };
}

/// Integer-only variant of [`with_element_type`]; floats evaluate `$float`.
macro_rules! with_integer_type {
    ($ty:expr, $T:ident => $body:expr, float => $float:expr) => {
        match $ty {
            ElementType::F32 | ElementType::F64 => $float,
            ElementType::I8 => {
                type $T = i8;
                $body
            }
            ElementType::U8 => {
                type $T = u8;
                $body
            }
            ElementType::I16 => {
                type $T = i16;
                $body
            }
            ElementType::U16 => {
                type $T = u16;
                $body
            }
            ElementType::I32 => {
                type $T = i32;
                $body
            }
            ElementType::U32 => {
                type $T = u32;
                $body
            }
            ElementType::I64 => {
                type $T = i64;
                $body
            }
            ElementType::U64 => {
                type $T = u64;
                $body
            }
        }
    };
}

/// Tries the vectorized kernel, falling back to `$scalar` when there is no
/// instruction set or the kernel declines.
macro_rules! vector_or_scalar {
    ($isa:expr, $op:expr, |$bound:ident| $vector:expr, $scalar:expr) => {
        match $isa {
            Some($bound) => match $vector {
                Some(result) => result,
                None => {
                    debug!("{}: no vectorized kernel on {}, using scalar", $op, $bound);
                    $scalar
                }
            },
            None => $scalar,
        }
    };
}

impl Dispatcher {
    pub fn new(platform: Platform) -> Self {
        Dispatcher { platform }
    }

    /// The process-wide dispatcher over [`Platform::current`].
    pub fn global() -> &'static Dispatcher {
        GLOBAL.get_or_init(|| Dispatcher::new(*Platform::current()))
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Picks the kernel family for a validated combination.
    pub fn select(
        &self,
        operation: Operation,
        element_type: ElementType,
        options: &CallOptions,
    ) -> KernelPath {
        let covered = operation
            .descriptor()
            .simd
            .covers(element_type, options.suppress_math_errors);
        match self.platform.simd_isa() {
            Some(isa) if covered && !options.force_scalar => KernelPath::Vector(isa),
            _ => KernelPath::Scalar,
        }
    }

    /// Validates and runs one call.
    pub fn call<'a>(
        &self,
        operation: Operation,
        args: Vec<Arg<'a>>,
        options: &CallOptions,
    ) -> Result<Outcome> {
        let call = validate(operation, args, options)?;
        self.execute(call)
    }

    /// Runs a call that has already been validated.
    pub fn execute(&self, call: ValidatedCall<'_>) -> Result<Outcome> {
        let operation = call.operation();
        let element_type = call.element_type();
        let path = self.select(operation, element_type, call.options());
        let checked = !call.options().suppress_math_errors;
        trace!(
            "{operation} on {} x {element_type}: {path:?}",
            call.len()
        );

        let isa = match path {
            KernelPath::Vector(isa) => Some(isa),
            KernelPath::Scalar => None,
        };
        let parts = call.into_parts();

        match operation {
            Operation::Invert => with_integer_type!(
                element_type, T => run_invert::<T>(isa, parts),
                float => Err(unsupported_type(operation.name(), element_type))
            ),
            _ => with_element_type!(element_type, T => run::<T>(operation, isa, checked, parts)),
        }
    }
}

fn input<'a, T: Element>(name: &'static str, view: Option<ArrayView<'a>>) -> Result<&'a [T]> {
    let view = view.ok_or_else(|| arity_error(name, "missing input array"))?;
    let found = view.element_type();
    view.typed::<T>()
        .ok_or_else(|| type_mismatch(name, T::TYPE, found, 0))
}

fn output<'a, T: Element>(name: &'static str, view: Option<ArrayViewMut<'a>>) -> Result<&'a mut [T]> {
    let view = view.ok_or_else(|| arity_error(name, "missing output array"))?;
    let found = view.element_type();
    view.typed::<T>()
        .ok_or_else(|| type_mismatch(name, T::TYPE, found, 0))
}

/// Splits a unary transform into its optional source and its destination.
fn unary<'a, T: Element>(
    name: &'static str,
    parts: CallParts<'a>,
) -> Result<(Option<&'a [T]>, &'a mut [T])> {
    let CallParts {
        inputs,
        output: out,
        in_place,
        ..
    } = parts;
    let src = if in_place {
        None
    } else {
        Some(input::<T>(name, inputs.into_iter().next())?)
    };
    Ok((src, output::<T>(name, out)?))
}

fn run<T: Vectorized>(
    operation: Operation,
    isa: Option<SimdIsa>,
    checked: bool,
    parts: CallParts<'_>,
) -> Result<Outcome> {
    let name = operation.name();
    let fault = |fault: crate::error::MathFault| -> ArrayFuncError { fault.into_error(name) };

    // SAFETY: `isa` comes from a detected `Platform`, so the CPU supports it.
    unsafe {
        match operation {
            Operation::Fabs | Operation::Abs => {
                let (src, dst) = unary::<T>(name, parts)?;
                vector_or_scalar!(
                    isa,
                    operation,
                    |isa| <T as Vectorized>::abs(isa, src, &mut *dst, checked),
                    scalar::abs(src, dst, checked)
                )
                .map_err(fault)?;
                Ok(Outcome::Written)
            }
            Operation::Add => {
                let CallParts {
                    inputs,
                    output: out,
                    in_place,
                    ..
                } = parts;
                let mut inputs = inputs.into_iter();
                let lhs = if in_place {
                    None
                } else {
                    Some(input::<T>(name, inputs.next())?)
                };
                let rhs = input::<T>(name, inputs.next())?;
                let dst = output::<T>(name, out)?;
                vector_or_scalar!(
                    isa,
                    operation,
                    |isa| <T as Vectorized>::add(isa, lhs, rhs, &mut *dst, checked),
                    scalar::add(lhs, rhs, dst, checked)
                )
                .map_err(fault)?;
                Ok(Outcome::Written)
            }
            Operation::Invert => Err(unsupported_type(name, T::TYPE)),
            Operation::IsInf | Operation::IsNan | Operation::IsFinite => {
                let class = match operation {
                    Operation::IsInf => FloatClass::Infinite,
                    Operation::IsNan => FloatClass::Nan,
                    _ => FloatClass::Finite,
                };
                let data = input::<T>(name, parts.inputs.into_iter().next())?;
                let answer = vector_or_scalar!(
                    isa,
                    operation,
                    |isa| <T as Vectorized>::classify(isa, class, data),
                    scalar::classify(class, data)
                );
                Ok(Outcome::Bool(answer))
            }
            Operation::AMax | Operation::AMin => {
                let data = input::<T>(name, parts.inputs.into_iter().next())?;
                if data.is_empty() {
                    return Err(ArrayFuncError::EmptyArray { operation: name });
                }
                let best = if operation == Operation::AMax {
                    vector_or_scalar!(
                        isa,
                        operation,
                        |isa| <T as Vectorized>::max(isa, data).map(Ok),
                        scalar::max(data)
                    )
                } else {
                    vector_or_scalar!(
                        isa,
                        operation,
                        |isa| <T as Vectorized>::min(isa, data).map(Ok),
                        scalar::min(data)
                    )
                };
                best.map_err(fault)?
                    .map(|value| Outcome::Value(value.into_scalar()))
                    .ok_or(ArrayFuncError::EmptyArray { operation: name })
            }
            Operation::ASum => {
                let data = input::<T>(name, parts.inputs.into_iter().next())?;
                // Vectorized sums wrap, so they only serve unchecked calls.
                let isa = isa.filter(|_| !checked);
                let total = vector_or_scalar!(
                    isa,
                    operation,
                    |isa| <T as Vectorized>::sum(isa, data).map(Ok),
                    scalar::sum(data, checked)
                )
                .map_err(fault)?;
                Ok(Outcome::Value(total.into_scalar()))
            }
            Operation::AAny(op) | Operation::AAll(op) => {
                let quantifier = match operation {
                    Operation::AAny(_) => Quantifier::Any,
                    _ => Quantifier::All,
                };
                let data = input::<T>(name, parts.inputs.into_iter().next())?;
                let value = parts
                    .scalar
                    .ok_or_else(|| arity_error(name, "missing scalar parameter"))?;
                let param = T::from_scalar(value)
                    .ok_or_else(|| type_mismatch(name, T::TYPE, value.element_type(), 1))?;
                let answer = vector_or_scalar!(
                    isa,
                    operation,
                    |isa| <T as Vectorized>::compare(isa, op, quantifier, data, param),
                    scalar::compare(op, quantifier, data, param)
                );
                Ok(Outcome::Bool(answer))
            }
        }
    }
}

fn run_invert<T: Vectorized + PrimInt>(isa: Option<SimdIsa>, parts: CallParts<'_>) -> Result<Outcome> {
    let (src, dst) = unary::<T>(Operation::Invert.name(), parts)?;
    // SAFETY: `isa` comes from a detected `Platform`, so the CPU supports it.
    unsafe {
        vector_or_scalar!(
            isa,
            Operation::Invert,
            |isa| <T as Vectorized>::invert(isa, src, &mut *dst),
            scalar::invert(src, dst)
        );
    }
    Ok(Outcome::Written)
}
