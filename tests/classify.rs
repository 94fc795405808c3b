//! Float classification reductions: isinf, isnan, isfinite.

use arrayfunc::{ops, CallOptions};

#[test]
fn test_isinf_examples() {
    let with_inf = [-5.0f32, -1.0, 0.0, 0.4, f32::INFINITY, 0.8];
    let without = [-5.0f32, -1.0, 0.0, 0.4];
    let options = CallOptions::default();

    assert!(ops::isinf(&with_inf, &options).unwrap());
    assert!(!ops::isinf(&without, &options).unwrap());
    assert!(!ops::isinf(&with_inf, &options.with_max_len(4)).unwrap());
}

#[test]
fn test_classification_agrees_across_paths_and_positions() {
    let specials = [f64::INFINITY, f64::NEG_INFINITY, f64::NAN];
    for len in [1usize, 3, 4, 7, 8, 33, 100] {
        for position in 0..len {
            for special in specials {
                let mut data: Vec<f64> = (0..len).map(|i| i as f64 * 0.5).collect();
                data[position] = special;

                for force_scalar in [false, true] {
                    let options = CallOptions::default().with_force_scalar(force_scalar);
                    let inf = ops::isinf(&data, &options).unwrap();
                    let nan = ops::isnan(&data, &options).unwrap();
                    let finite = ops::isfinite(&data, &options).unwrap();
                    assert_eq!(inf, special.is_infinite(), "len {len} pos {position}");
                    assert_eq!(nan, special.is_nan(), "len {len} pos {position}");
                    assert!(!finite, "len {len} pos {position}");
                }
            }
        }
    }
}

#[test]
fn test_all_finite() {
    let data: Vec<f32> = (0..1000).map(|i| i as f32 - 500.0).collect();
    let options = CallOptions::default();
    assert!(ops::isfinite(&data, &options).unwrap());
    assert!(!ops::isnan(&data, &options).unwrap());
    assert!(!ops::isinf(&data, &options).unwrap());
    assert!(ops::isfinite(&[f32::MAX, f32::MIN], &options).unwrap());
}

#[test]
fn test_special_value_beyond_max_len_is_ignored() {
    let mut data = vec![1.0f32; 64];
    data[40] = f32::NAN;
    let options = CallOptions::default().with_max_len(40);
    assert!(!ops::isnan(&data, &options).unwrap());
    assert!(ops::isfinite(&data, &options).unwrap());
    assert!(ops::isnan(&data, &options.with_max_len(41)).unwrap());
}

#[test]
fn test_classification_rejects_matherrors() {
    let data = [1.0f64];
    let err = ops::isnan(
        &data,
        &CallOptions::default().with_math_errors_suppressed(true),
    )
    .unwrap_err();
    println!("{err}");
    assert!(matches!(
        err,
        arrayfunc::ArrayFuncError::UnsupportedOption {
            operation: "isnan",
            option: "matherrors"
        }
    ));
}
