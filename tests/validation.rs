//! Caller-contract checks through the public dispatch surface.

use arrayfunc::{
    Arg, ArrayBuffer, ArrayFuncError, CallOptions, CompareOp, Dispatcher, ElementType, Operation,
};

fn call(operation: Operation, args: Vec<Arg<'_>>, options: &CallOptions) -> ArrayFuncError {
    let err = Dispatcher::global()
        .call(operation, args, options)
        .unwrap_err();
    println!("{operation}: {err}");
    err
}

#[test]
fn test_no_array_is_an_arity_error() {
    let err = call(
        Operation::AAny(CompareOp::Eq),
        vec![Arg::scalar(1i32), Arg::scalar(2i32)],
        &CallOptions::default(),
    );
    assert!(matches!(err, ArrayFuncError::Arity { .. }));

    let err = call(Operation::ASum, vec![], &CallOptions::default());
    assert!(matches!(err, ArrayFuncError::Arity { .. }));
}

#[test]
fn test_wrong_argument_count() {
    let a = [1i64, 2];
    let err = call(
        Operation::Add,
        vec![Arg::from(&a[..])],
        &CallOptions::default(),
    );
    assert!(format!("{err}").contains("expected 2 or 3 argument(s), got 1"));
}

#[test]
fn test_same_width_different_types_mismatch() {
    let a = [1i32, 2, 3];
    let b = [1u32, 2, 3];
    let c = [1.0f32, 2.0, 3.0];
    let mut out = [0i32; 3];

    let err = call(
        Operation::Add,
        vec![Arg::from(&a[..]), Arg::from(&b[..]), Arg::from(&mut out[..])],
        &CallOptions::default(),
    );
    assert_eq!(
        err,
        ArrayFuncError::TypeMismatch {
            operation: "add",
            expected: ElementType::I32,
            found: ElementType::U32,
            position: 1,
        }
    );

    let mut out = [0i32; 3];
    let err = call(
        Operation::Add,
        vec![Arg::from(&a[..]), Arg::from(&c[..]), Arg::from(&mut out[..])],
        &CallOptions::default(),
    );
    assert!(matches!(
        err,
        ArrayFuncError::TypeMismatch {
            found: ElementType::F32,
            ..
        }
    ));
}

#[test]
fn test_matherrors_on_operation_without_fast_path() {
    let mut data = [1u16, 2, 3];
    let err = call(
        Operation::Invert,
        vec![Arg::from(&mut data[..])],
        &CallOptions::default().with_math_errors_suppressed(true),
    );
    assert_eq!(
        err,
        ArrayFuncError::UnsupportedOption {
            operation: "invert",
            option: "matherrors",
        }
    );
    assert_eq!(data, [1, 2, 3]);
}

#[test]
fn test_max_len_longer_than_shortest_array() {
    let a = [1.0f64; 10];
    let b = [1.0f64; 6];
    let mut out = [0.0f64; 10];
    let err = call(
        Operation::Add,
        vec![Arg::from(&a[..]), Arg::from(&b[..]), Arg::from(&mut out[..])],
        &CallOptions::default().with_max_len(7),
    );
    assert!(matches!(err, ArrayFuncError::InvalidOption { .. }));
    assert!(out.iter().all(|&x| x == 0.0));
}

#[test]
fn test_checks_run_in_order() {
    // Arity wins over a type mismatch.
    let a = [1i8];
    let b = [1u8];
    let err = call(
        Operation::AMax,
        vec![Arg::from(&a[..]), Arg::from(&b[..])],
        &CallOptions::default(),
    );
    assert!(matches!(err, ArrayFuncError::Arity { .. }));

    // Consistent but unsupported.
    let mut out = [0u8];
    let err = call(
        Operation::Abs,
        vec![Arg::from(&b[..]), Arg::from(&mut out[..])],
        &CallOptions::default(),
    );
    assert!(matches!(err, ArrayFuncError::UnsupportedType { .. }));

    // Type mismatch wins over an unsupported type.
    let mut out = [0i8];
    let err = call(
        Operation::Abs,
        vec![Arg::from(&b[..]), Arg::from(&mut out[..])],
        &CallOptions::default(),
    );
    assert!(matches!(err, ArrayFuncError::TypeMismatch { .. }));

    // Type mismatch wins over a bad option.
    let err = call(
        Operation::Fabs,
        vec![Arg::from(&b[..]), Arg::from(&mut out[..])],
        &CallOptions::default().with_max_len(5),
    );
    assert!(matches!(err, ArrayFuncError::TypeMismatch { .. }));

    // Unsupported type wins over a bad option.
    let data = [1u8, 2];
    let err = call(
        Operation::IsInf,
        vec![Arg::from(&data[..])],
        &CallOptions::default().with_max_len(5),
    );
    assert!(matches!(err, ArrayFuncError::UnsupportedType { .. }));
}

#[test]
fn test_dynamic_buffers() {
    let input = ArrayBuffer::from_pattern(ElementType::I16, 20, &[-3.0, 4.0]).unwrap();
    let mut output = ArrayBuffer::zeroed(ElementType::I16, 20);
    Dispatcher::global()
        .call(
            Operation::Abs,
            vec![Arg::from(input.view()), Arg::from(output.view_mut())],
            &CallOptions::default(),
        )
        .unwrap();
    assert_eq!(output.as_slice::<i16>().unwrap()[..4], [3, 4, 3, 4]);

    let err = ArrayBuffer::from_pattern(ElementType::U8, 4, &[-1.0]).unwrap_err();
    assert!(matches!(err, ArrayFuncError::InvalidOption { .. }));
}

#[test]
fn test_options_from_serde() {
    let options: CallOptions = serde_json::from_str(r#"{"maxlen": 3, "nosimd": true}"#).unwrap();
    assert_eq!(
        options,
        CallOptions::default().with_max_len(3).with_force_scalar(true)
    );
    assert!(serde_json::from_str::<CallOptions>(r#"{"fast": true}"#).is_err());
    assert!(serde_json::from_str::<CallOptions>(r#"{"maxlen": -1}"#).is_err());
}
