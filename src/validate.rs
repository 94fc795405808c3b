//! Parameter validation.
//!
//! [`validate`] checks a call before any numeric work, in a fixed order:
//! arity, then type consistency, then type support, then option legality.
//! The first failure is returned. On success the arguments are sorted into a
//! [`ValidatedCall`] whose views are already cut to the effective length.

use crate::array::{Arg, ArgKind, ArrayView, ArrayViewMut};
use crate::descriptor::{Operand, Operation, OperationDescriptor};
use crate::error::{
    arity_error, invalid_option, type_mismatch, unsupported_option, unsupported_type, Result,
};
use crate::options::{CallOptions, MATHERRORS, MAXLEN};
use crate::types::{ElementType, Scalar};

/// A call that passed validation, with operands in signature order.
#[derive(Debug)]
pub struct ValidatedCall<'a> {
    operation: Operation,
    element_type: ElementType,
    len: usize,
    inputs: Vec<ArrayView<'a>>,
    output: Option<ArrayViewMut<'a>>,
    in_place: bool,
    scalar: Option<Scalar>,
    options: CallOptions,
}

impl<'a> ValidatedCall<'a> {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn descriptor(&self) -> &'static OperationDescriptor {
        self.operation.descriptor()
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Effective length: every view in the call has exactly this length.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn options(&self) -> &CallOptions {
        &self.options
    }

    /// True when the output array is also the first input.
    pub fn is_in_place(&self) -> bool {
        self.in_place
    }

    pub(crate) fn into_parts(self) -> CallParts<'a> {
        CallParts {
            inputs: self.inputs,
            output: self.output,
            in_place: self.in_place,
            scalar: self.scalar,
        }
    }
}

/// Operands of a validated call, moved out for execution.
pub(crate) struct CallParts<'a> {
    pub(crate) inputs: Vec<ArrayView<'a>>,
    pub(crate) output: Option<ArrayViewMut<'a>>,
    pub(crate) in_place: bool,
    pub(crate) scalar: Option<Scalar>,
}

/// Validates `args` against the descriptor of `operation`.
pub fn validate<'a>(
    operation: Operation,
    args: Vec<Arg<'a>>,
    options: &CallOptions,
) -> Result<ValidatedCall<'a>> {
    let descriptor = operation.descriptor();
    let name = descriptor.name;

    let signature = match_signature(descriptor, &args)?;

    let element_type = check_type_consistency(name, &args)?;

    if !descriptor.types.contains(element_type) {
        return Err(unsupported_type(name, element_type));
    }

    let shortest = args.iter().filter_map(Arg::len).min().unwrap_or(0);
    let len = match options.max_len {
        Some(max_len) if max_len > shortest => {
            return Err(invalid_option(
                MAXLEN,
                format!("{max_len} exceeds the shortest array length {shortest}"),
            ))
        }
        Some(max_len) => max_len,
        None => shortest,
    };

    if options.suppress_math_errors && !descriptor.math_errors {
        return Err(unsupported_option(name, MATHERRORS));
    }

    let mut call = ValidatedCall {
        operation,
        element_type,
        len,
        inputs: Vec::with_capacity(args.len()),
        output: None,
        in_place: false,
        scalar: None,
        options: *options,
    };

    for (operand, arg) in signature.iter().zip(args) {
        match (operand, arg) {
            (Operand::Input, Arg::Array(view)) => call.inputs.push(truncate(view, len)?),
            (Operand::Output, Arg::Mut(view)) => call.output = Some(truncate_mut(view, len)?),
            (Operand::InOut, Arg::Mut(view)) => {
                call.output = Some(truncate_mut(view, len)?);
                call.in_place = true;
            }
            (Operand::Scalar, Arg::Scalar(value)) => call.scalar = Some(value),
            (operand, arg) => {
                return Err(arity_error(
                    name,
                    format!("{:?} cannot bind {:?}", operand, arg.kind()),
                ))
            }
        }
    }

    Ok(call)
}

fn accepts(operand: Operand, kind: ArgKind) -> bool {
    matches!(
        (operand, kind),
        (Operand::Input, ArgKind::Array)
            | (Operand::Output | Operand::InOut, ArgKind::MutArray)
            | (Operand::Scalar, ArgKind::Scalar)
    )
}

fn describe(operand: Operand) -> &'static str {
    match operand {
        Operand::Input => "an input array",
        Operand::Output => "an output array",
        Operand::InOut => "a mutable array",
        Operand::Scalar => "a scalar",
    }
}

fn match_signature(
    descriptor: &'static OperationDescriptor,
    args: &[Arg<'_>],
) -> Result<&'static [Operand]> {
    let name = descriptor.name;

    if !args.iter().any(Arg::is_array) {
        return Err(arity_error(name, "at least one array argument is required"));
    }

    let mut candidates = descriptor
        .signatures
        .iter()
        .copied()
        .filter(|signature| signature.len() == args.len())
        .peekable();

    let Some(first) = candidates.peek().copied() else {
        let expected = descriptor
            .arities()
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" or ");
        return Err(arity_error(
            name,
            format!("expected {expected} argument(s), got {}", args.len()),
        ));
    };

    if let Some(signature) = candidates.find(|signature| {
        signature
            .iter()
            .zip(args)
            .all(|(operand, arg)| accepts(*operand, arg.kind()))
    }) {
        return Ok(signature);
    }

    let (position, operand) = first
        .iter()
        .zip(args)
        .enumerate()
        .find(|(_, (operand, arg))| !accepts(**operand, arg.kind()))
        .map(|(position, (operand, _))| (position, *operand))
        .unwrap_or((0, first[0]));
    Err(arity_error(
        name,
        format!("argument {position} must be {}", describe(operand)),
    ))
}

fn check_type_consistency(name: &'static str, args: &[Arg<'_>]) -> Result<ElementType> {
    // An array is always present once the arity check has passed.
    let expected = args
        .iter()
        .find(|arg| arg.is_array())
        .map(Arg::element_type)
        .ok_or_else(|| arity_error(name, "at least one array argument is required"))?;

    for (position, arg) in args.iter().enumerate() {
        let found = arg.element_type();
        if found != expected {
            return Err(type_mismatch(name, expected, found, position));
        }
    }
    Ok(expected)
}

fn truncate(view: ArrayView<'_>, len: usize) -> Result<ArrayView<'_>> {
    let available = view.len();
    view.prefix(len).ok_or_else(|| {
        invalid_option(MAXLEN, format!("{len} exceeds array length {available}"))
    })
}

fn truncate_mut(view: ArrayViewMut<'_>, len: usize) -> Result<ArrayViewMut<'_>> {
    let available = view.len();
    view.prefix(len).ok_or_else(|| {
        invalid_option(MAXLEN, format!("{len} exceeds array length {available}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::CompareOp;
    use crate::error::ArrayFuncError;

    #[test]
    fn test_effective_length_defaults_to_shortest() {
        let a = [1i32, 2, 3, 4, 5];
        let b = [1i32, 2, 3];
        let mut out = [0i32; 4];
        let call = validate(
            Operation::Add,
            vec![Arg::from(&a[..]), Arg::from(&b[..]), Arg::from(&mut out[..])],
            &CallOptions::default(),
        )
        .unwrap();
        assert_eq!(call.len(), 3);
        assert!(!call.is_in_place());

        let parts = call.into_parts();
        assert!(parts.inputs.iter().all(|view| view.len() == 3));
        assert_eq!(parts.output.map(|view| view.len()), Some(3));
    }

    #[test]
    fn test_in_place_signature() {
        let mut data = [1.0f32, -2.0];
        let call = validate(
            Operation::Fabs,
            vec![Arg::from(&mut data[..])],
            &CallOptions::default().with_max_len(1),
        )
        .unwrap();
        assert!(call.is_in_place());
        assert_eq!(call.len(), 1);
    }

    #[test]
    fn test_arity_is_checked_before_types() {
        let a = [1i8, 2];
        let b = [1u8, 2];
        let err = validate(
            Operation::IsInf,
            vec![Arg::from(&a[..]), Arg::from(&b[..])],
            &CallOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ArrayFuncError::Arity { .. }));
    }

    #[test]
    fn test_wrong_operand_kind_is_an_arity_error() {
        let a = [1i32, 2];
        let b = [1i32, 2];
        // Output position given a read-only array.
        let err = validate(
            Operation::Add,
            vec![Arg::from(&a[..]), Arg::from(&b[..]), Arg::from(&b[..])],
            &CallOptions::default(),
        )
        .unwrap_err();
        assert!(format!("{err}").contains("argument 2 must be an output array"));
    }

    #[test]
    fn test_scalar_type_must_match() {
        let data = [1i64, 2, 3];
        let err = validate(
            Operation::AAny(CompareOp::Eq),
            vec![Arg::from(&data[..]), Arg::scalar(2i32)],
            &CallOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            type_mismatch("aany", ElementType::I64, ElementType::I32, 1)
        );
    }

    #[test]
    fn test_type_support_before_options() {
        let data = [1u8, 2, 3];
        let err = validate(
            Operation::IsNan,
            vec![Arg::from(&data[..])],
            &CallOptions::default().with_max_len(10),
        )
        .unwrap_err();
        assert_eq!(err, unsupported_type("isnan", ElementType::U8));
    }
}
