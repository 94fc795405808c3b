//! Elements past `maxlen` are never read and outputs past it are never written.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use arrayfunc::{ops, CallOptions, CompareOp, Element};

fn poisoned<T: Element>(data: &[T], max_len: usize, poison: T) -> Vec<T> {
    data.iter()
        .enumerate()
        .map(|(i, &x)| if i < max_len { x } else { poison })
        .collect()
}

fn check_max_len<T: Element>(
    data: &[T],
    max_len: usize,
    poison: T,
    sentinel: T,
) -> Result<(), TestCaseError> {
    let max_len = max_len.min(data.len());
    let dirty = poisoned(data, max_len, poison);

    for force_scalar in [false, true] {
        let options = CallOptions::default()
            .with_max_len(max_len)
            .with_force_scalar(force_scalar);

        prop_assert_eq!(ops::isinf(data, &options), ops::isinf(&dirty, &options));
        prop_assert_eq!(ops::isnan(data, &options), ops::isnan(&dirty, &options));
        prop_assert_eq!(ops::isfinite(data, &options), ops::isfinite(&dirty, &options));
        prop_assert_eq!(ops::amax(data, &options), ops::amax(&dirty, &options));
        prop_assert_eq!(ops::amin(data, &options), ops::amin(&dirty, &options));
        prop_assert_eq!(ops::asum(data, &options), ops::asum(&dirty, &options));
        for op in CompareOp::ALL {
            prop_assert_eq!(
                ops::aany(op, data, poison, &options),
                ops::aany(op, &dirty, poison, &options)
            );
            prop_assert_eq!(
                ops::aall(op, data, poison, &options),
                ops::aall(op, &dirty, poison, &options)
            );
        }

        let mut clean_out = vec![sentinel; data.len()];
        let mut dirty_out = vec![sentinel; data.len()];
        let clean = ops::abs(data, &mut clean_out, &options);
        prop_assert_eq!(&clean, &ops::abs(&dirty, &mut dirty_out, &options));
        if clean.is_ok() {
            prop_assert_eq!(&clean_out, &dirty_out);
            prop_assert!(dirty_out[max_len..].iter().all(|&x| x == sentinel));
        }

        let mut clean_out = vec![sentinel; data.len()];
        let mut dirty_out = vec![sentinel; data.len()];
        let clean = ops::add(data, data, &mut clean_out, &options);
        prop_assert_eq!(&clean, &ops::add(&dirty, &dirty, &mut dirty_out, &options));
        if clean.is_ok() {
            prop_assert_eq!(&clean_out, &dirty_out);
            prop_assert!(dirty_out[max_len..].iter().all(|&x| x == sentinel));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_f32_ignores_tail(
        data in prop::collection::vec(-1.0e3f32..1.0e3f32, 0..200),
        max_len in 0usize..200,
    ) {
        check_max_len(&data, max_len, f32::NAN, 42.0)?;
        check_max_len(&data, max_len, f32::INFINITY, 42.0)?;
    }

    #[test]
    fn prop_f64_ignores_tail(
        data in prop::collection::vec(-1.0e3f64..1.0e3f64, 0..200),
        max_len in 0usize..200,
    ) {
        check_max_len(&data, max_len, f64::NEG_INFINITY, 42.0)?;
    }

    #[test]
    fn prop_i8_ignores_tail(
        data in prop::collection::vec(-60i8..60, 0..200),
        max_len in 0usize..200,
    ) {
        check_max_len(&data, max_len, i8::MIN, 99)?;
        check_max_len(&data, max_len, i8::MAX, 99)?;
    }

    #[test]
    fn prop_i32_ignores_tail(
        data in prop::collection::vec(-1000i32..1000, 0..200),
        max_len in 0usize..200,
    ) {
        check_max_len(&data, max_len, i32::MIN, 7)?;
    }

    #[test]
    fn prop_u64_ignores_tail(
        data in prop::collection::vec(0u64..1000, 0..200),
        max_len in 0usize..200,
    ) {
        check_max_len(&data, max_len, u64::MAX, 7)?;
    }
}

#[test]
fn test_zero_max_len() {
    let data = [f64::NAN, 1.0, 2.0];
    let options = CallOptions::default().with_max_len(0);
    assert!(ops::isfinite(&data, &options).unwrap());
    assert!(!ops::isnan(&data, &options).unwrap());
    assert!(ops::aall(CompareOp::Gt, &data, 5.0, &options).unwrap());
    assert!(!ops::aany(CompareOp::Lt, &data, 5.0, &options).unwrap());
    assert_eq!(ops::asum(&data, &options).unwrap(), 0.0);
    assert!(ops::amax(&data, &options).is_err());

    let mut out = [9.0f64; 3];
    ops::fabs(&data, &mut out, &options).unwrap();
    assert_eq!(out, [9.0; 3]);
}
