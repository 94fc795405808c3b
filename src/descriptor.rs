//! Static operation metadata.
//!
//! Every [`Operation`] has one [`OperationDescriptor`]: the operand
//! signatures it accepts, what it returns, which element types it supports,
//! whether it takes the `matherrors` option, and for which element types a
//! vectorized kernel exists in each math-error mode. The dispatcher decides
//! between scalar and vectorized kernels from this table alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{invalid_option, ArrayFuncError};
use crate::types::{ElementType, TypeSet};

/// Comparison applied by `aany` and `aall` between each element and the
/// scalar parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
}

impl CompareOp {
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Eq,
        CompareOp::Ne,
        CompareOp::Gt,
        CompareOp::Ge,
        CompareOp::Lt,
        CompareOp::Le,
    ];

    /// Applies the comparison with `PartialOrd` semantics.
    #[inline(always)]
    pub fn apply<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for CompareOp {
    type Err = ArrayFuncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompareOp::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| invalid_option("compare", format!("unknown comparison `{s}`")))
    }
}

/// Whether a reduction with a comparison asks "any" or "all".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Any,
    All,
}

/// Which class of float value a classification reduction looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatClass {
    /// Any element is ±infinity.
    Infinite,
    /// Any element is NaN.
    Nan,
    /// Every element is finite.
    Finite,
}

/// Every operation the library implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Absolute value of float arrays.
    Fabs,
    /// Absolute value of signed integer and float arrays.
    Abs,
    /// Element-wise sum of two arrays.
    Add,
    /// Bitwise NOT of integer arrays.
    Invert,
    IsInf,
    IsNan,
    IsFinite,
    AMax,
    AMin,
    ASum,
    AAny(CompareOp),
    AAll(CompareOp),
}

impl Operation {
    pub fn descriptor(self) -> &'static OperationDescriptor {
        match self {
            Operation::Fabs => &FABS,
            Operation::Abs => &ABS,
            Operation::Add => &ADD,
            Operation::Invert => &INVERT,
            Operation::IsInf => &ISINF,
            Operation::IsNan => &ISNAN,
            Operation::IsFinite => &ISFINITE,
            Operation::AMax => &AMAX,
            Operation::AMin => &AMIN,
            Operation::ASum => &ASUM,
            Operation::AAny(_) => &AANY,
            Operation::AAll(_) => &AALL,
        }
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::AAny(op) | Operation::AAll(op) => write!(f, "{}({op})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Kind of one positional operand in a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Read-only input array.
    Input,
    /// Output array written by the operation.
    Output,
    /// Array read and then overwritten in place.
    InOut,
    /// Scalar parameter of the array's element type.
    Scalar,
}

/// What an operation hands back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returns {
    /// Results are written to an output array.
    Nothing,
    /// A boolean answer.
    Bool,
    /// A value of the element type.
    Element,
    /// A value of the element type's accumulator type.
    Accumulator,
}

/// Element types with a vectorized kernel, per math-error mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimdCoverage {
    /// Types vectorized while math errors are checked (the default).
    pub checked: TypeSet,
    /// Types vectorized when `matherrors` suppresses checking.
    pub unchecked: TypeSet,
}

impl SimdCoverage {
    pub const NONE: SimdCoverage = SimdCoverage {
        checked: TypeSet::EMPTY,
        unchecked: TypeSet::EMPTY,
    };

    pub const fn covers(&self, element_type: ElementType, suppress_math_errors: bool) -> bool {
        if suppress_math_errors {
            self.unchecked.contains(element_type)
        } else {
            self.checked.contains(element_type)
        }
    }
}

/// Static description of one operation.
#[derive(Debug)]
pub struct OperationDescriptor {
    pub name: &'static str,
    /// Accepted operand lists, tried in order.
    pub signatures: &'static [&'static [Operand]],
    pub returns: Returns,
    pub types: TypeSet,
    /// Whether `matherrors` is accepted.
    pub math_errors: bool,
    pub simd: SimdCoverage,
}

impl OperationDescriptor {
    pub fn writes_output(&self) -> bool {
        self.signatures.iter().any(|signature| {
            signature
                .iter()
                .any(|operand| matches!(operand, Operand::Output | Operand::InOut))
        })
    }

    pub fn returns_scalar(&self) -> bool {
        self.returns != Returns::Nothing
    }

    pub fn has_simd(&self) -> bool {
        !self.simd.checked.is_empty() || !self.simd.unchecked.is_empty()
    }

    /// Argument counts accepted by the signatures, for error messages.
    pub fn arities(&self) -> Vec<usize> {
        let mut counts: Vec<usize> = self.signatures.iter().map(|s| s.len()).collect();
        counts.sort_unstable();
        counts.dedup();
        counts
    }
}

const UNARY: &[&[Operand]] = &[&[Operand::InOut], &[Operand::Input, Operand::Output]];
const BINARY: &[&[Operand]] = &[
    &[Operand::Input, Operand::Input, Operand::Output],
    &[Operand::InOut, Operand::Input],
];
const REDUCE: &[&[Operand]] = &[&[Operand::Input]];
const REDUCE_WITH_PARAM: &[&[Operand]] = &[&[Operand::Input, Operand::Scalar]];

const SMALL_INTEGERS: TypeSet = TypeSet::EMPTY
    .with(ElementType::I8)
    .with(ElementType::U8)
    .with(ElementType::I16)
    .with(ElementType::U16)
    .with(ElementType::I32)
    .with(ElementType::U32);

const WIDE_SUM_TYPES: TypeSet = TypeSet::EMPTY
    .with(ElementType::I32)
    .with(ElementType::U32)
    .with(ElementType::I64)
    .with(ElementType::U64);

const COMPARE_TYPES: TypeSet = TypeSet::FLOATS
    .with(ElementType::I32)
    .with(ElementType::I64);

static FABS: OperationDescriptor = OperationDescriptor {
    name: "fabs",
    signatures: UNARY,
    returns: Returns::Nothing,
    types: TypeSet::FLOATS,
    math_errors: true,
    simd: SimdCoverage {
        checked: TypeSet::FLOATS,
        unchecked: TypeSet::FLOATS,
    },
};

// Integer abs checks for MIN element by element; only the wrapping variant
// is vectorized.
static ABS: OperationDescriptor = OperationDescriptor {
    name: "abs",
    signatures: UNARY,
    returns: Returns::Nothing,
    types: TypeSet::SIGNED.union(TypeSet::FLOATS),
    math_errors: true,
    simd: SimdCoverage {
        checked: TypeSet::FLOATS,
        unchecked: TypeSet::SIGNED.union(TypeSet::FLOATS),
    },
};

static ADD: OperationDescriptor = OperationDescriptor {
    name: "add",
    signatures: BINARY,
    returns: Returns::Nothing,
    types: TypeSet::ALL,
    math_errors: true,
    simd: SimdCoverage {
        checked: TypeSet::FLOATS,
        unchecked: TypeSet::ALL,
    },
};

static INVERT: OperationDescriptor = OperationDescriptor {
    name: "invert",
    signatures: UNARY,
    returns: Returns::Nothing,
    types: TypeSet::INTEGERS,
    math_errors: false,
    simd: SimdCoverage {
        checked: TypeSet::INTEGERS,
        unchecked: TypeSet::EMPTY,
    },
};

static ISINF: OperationDescriptor = OperationDescriptor {
    name: "isinf",
    signatures: REDUCE,
    returns: Returns::Bool,
    types: TypeSet::FLOATS,
    math_errors: false,
    simd: SimdCoverage {
        checked: TypeSet::FLOATS,
        unchecked: TypeSet::EMPTY,
    },
};

static ISNAN: OperationDescriptor = OperationDescriptor {
    name: "isnan",
    signatures: REDUCE,
    returns: Returns::Bool,
    types: TypeSet::FLOATS,
    math_errors: false,
    simd: SimdCoverage {
        checked: TypeSet::FLOATS,
        unchecked: TypeSet::EMPTY,
    },
};

static ISFINITE: OperationDescriptor = OperationDescriptor {
    name: "isfinite",
    signatures: REDUCE,
    returns: Returns::Bool,
    types: TypeSet::FLOATS,
    math_errors: false,
    simd: SimdCoverage {
        checked: TypeSet::FLOATS,
        unchecked: TypeSet::EMPTY,
    },
};

// Float min/max stay scalar: lane-wise max does not preserve which of two
// equal signed zeros the scalar scan keeps.
static AMAX: OperationDescriptor = OperationDescriptor {
    name: "amax",
    signatures: REDUCE,
    returns: Returns::Element,
    types: TypeSet::ALL,
    math_errors: false,
    simd: SimdCoverage {
        checked: SMALL_INTEGERS,
        unchecked: TypeSet::EMPTY,
    },
};

static AMIN: OperationDescriptor = OperationDescriptor {
    name: "amin",
    signatures: REDUCE,
    returns: Returns::Element,
    types: TypeSet::ALL,
    math_errors: false,
    simd: SimdCoverage {
        checked: SMALL_INTEGERS,
        unchecked: TypeSet::EMPTY,
    },
};

// Float sums stay scalar: lane-wise accumulation reorders the additions.
static ASUM: OperationDescriptor = OperationDescriptor {
    name: "asum",
    signatures: REDUCE,
    returns: Returns::Accumulator,
    types: TypeSet::ALL,
    math_errors: true,
    simd: SimdCoverage {
        checked: TypeSet::EMPTY,
        unchecked: WIDE_SUM_TYPES,
    },
};

static AANY: OperationDescriptor = OperationDescriptor {
    name: "aany",
    signatures: REDUCE_WITH_PARAM,
    returns: Returns::Bool,
    types: TypeSet::ALL,
    math_errors: false,
    simd: SimdCoverage {
        checked: COMPARE_TYPES,
        unchecked: TypeSet::EMPTY,
    },
};

static AALL: OperationDescriptor = OperationDescriptor {
    name: "aall",
    signatures: REDUCE_WITH_PARAM,
    returns: Returns::Bool,
    types: TypeSet::ALL,
    math_errors: false,
    simd: SimdCoverage {
        checked: COMPARE_TYPES,
        unchecked: TypeSet::EMPTY,
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchecked_only_kernels() {
        let abs = Operation::Abs.descriptor();
        assert!(!abs.simd.covers(ElementType::I32, false));
        assert!(abs.simd.covers(ElementType::I32, true));
        assert!(abs.simd.covers(ElementType::F64, false));

        let asum = Operation::ASum.descriptor();
        assert!(!asum.simd.covers(ElementType::I64, false));
        assert!(asum.simd.covers(ElementType::I64, true));
        assert!(!asum.simd.covers(ElementType::F32, true));
    }

    #[test]
    fn test_vectorized_types_are_supported_types() {
        let operations = [
            Operation::Fabs,
            Operation::Abs,
            Operation::Add,
            Operation::Invert,
            Operation::IsInf,
            Operation::IsNan,
            Operation::IsFinite,
            Operation::AMax,
            Operation::AMin,
            Operation::ASum,
            Operation::AAny(CompareOp::Eq),
            Operation::AAll(CompareOp::Eq),
        ];
        for op in operations {
            let descriptor = op.descriptor();
            for ty in descriptor.simd.checked.iter().chain(descriptor.simd.unchecked.iter()) {
                assert!(descriptor.types.contains(ty), "{op} vectorizes unsupported {ty}");
            }
            if !descriptor.math_errors {
                assert!(descriptor.simd.unchecked.is_empty(), "{op}");
            }
        }
    }

    #[test]
    fn test_descriptor_shape() {
        let fabs = Operation::Fabs.descriptor();
        assert!(fabs.writes_output());
        assert!(!fabs.returns_scalar());
        assert_eq!(fabs.arities(), vec![1, 2]);

        let isinf = Operation::IsInf.descriptor();
        assert!(!isinf.writes_output());
        assert!(isinf.returns_scalar());
        assert!(isinf.has_simd());

        assert_eq!(Operation::Add.descriptor().arities(), vec![2, 3]);
        assert_eq!(Operation::AAny(CompareOp::Gt).to_string(), "aany(>)");
    }

    #[test]
    fn test_compare_ops() {
        assert!(CompareOp::Ne.apply(f32::NAN, f32::NAN));
        assert!(!CompareOp::Eq.apply(f32::NAN, f32::NAN));
        assert!(CompareOp::Ge.apply(3, 3));
        assert!(!CompareOp::Lt.apply(3, 3));
        assert_eq!(">=".parse::<CompareOp>().unwrap(), CompareOp::Ge);
        assert!("=>".parse::<CompareOp>().is_err());
    }
}
