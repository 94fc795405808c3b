//! Per-call options.
//!
//! [`CallOptions`] is the closed set of knobs every operation accepts:
//! `maxlen`, `matherrors` and `nosimd`. Layers that receive options as loose
//! key/value pairs (command lines, scripts, config files) go through
//! [`CallOptions::set`] or serde, which reject anything malformed with
//! [`ArrayFuncError::InvalidOption`](crate::error::ArrayFuncError::InvalidOption).

use serde::{Deserialize, Serialize};

use crate::error::{invalid_option, Result};

pub const MAXLEN: &str = "maxlen";
pub const MATHERRORS: &str = "matherrors";
pub const NOSIMD: &str = "nosimd";

/// Options recognised by every operation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CallOptions {
    /// Process only the first `max_len` elements of every array.
    #[serde(rename = "maxlen")]
    pub max_len: Option<usize>,
    /// Skip math-error detection. Only legal for operations that have a fast
    /// path depending on it.
    #[serde(rename = "matherrors")]
    pub suppress_math_errors: bool,
    /// Always run the scalar reference kernel.
    #[serde(rename = "nosimd", alias = "force_scalar")]
    pub force_scalar: bool,
}

/// A loosely typed option value, as received from an outer layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn with_math_errors_suppressed(mut self, suppress: bool) -> Self {
        self.suppress_math_errors = suppress;
        self
    }

    pub fn with_force_scalar(mut self, force_scalar: bool) -> Self {
        self.force_scalar = force_scalar;
        self
    }

    /// Sets one option by its external key.
    pub fn set(&mut self, key: &str, value: OptionValue) -> Result<()> {
        match key {
            MAXLEN => {
                self.max_len = Some(match value {
                    OptionValue::Int(n) if n < 0 => {
                        return Err(invalid_option(key, format!("must not be negative, got {n}")))
                    }
                    OptionValue::Int(n) => usize::try_from(n)
                        .map_err(|_| invalid_option(key, format!("{n} is out of range")))?,
                    other => {
                        return Err(invalid_option(
                            key,
                            format!("must be an integer, got {other:?}"),
                        ))
                    }
                });
            }
            MATHERRORS => self.suppress_math_errors = expect_bool(key, value)?,
            NOSIMD | "force_scalar" => self.force_scalar = expect_bool(key, value)?,
            _ => return Err(invalid_option(key, "unrecognised option")),
        }
        Ok(())
    }

    /// Builds options from key/value pairs, failing on the first bad one.
    pub fn from_pairs<'k>(pairs: impl IntoIterator<Item = (&'k str, OptionValue)>) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in pairs {
            options.set(key, value)?;
        }
        Ok(options)
    }
}

fn expect_bool(key: &str, value: OptionValue) -> Result<bool> {
    match value {
        OptionValue::Bool(flag) => Ok(flag),
        other => Err(invalid_option(
            key,
            format!("must be a boolean, got {other:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArrayFuncError;

    #[test]
    fn test_builder() {
        let options = CallOptions::new()
            .with_max_len(4)
            .with_math_errors_suppressed(true)
            .with_force_scalar(true);
        assert_eq!(options.max_len, Some(4));
        assert!(options.suppress_math_errors);
        assert!(options.force_scalar);
    }

    #[test]
    fn test_set_from_pairs() {
        let options = CallOptions::from_pairs([
            (MAXLEN, OptionValue::Int(10)),
            (MATHERRORS, OptionValue::Bool(true)),
            (NOSIMD, OptionValue::Bool(false)),
        ])
        .unwrap();
        assert_eq!(
            options,
            CallOptions::new()
                .with_max_len(10)
                .with_math_errors_suppressed(true)
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut options = CallOptions::new();

        let negative = options.set(MAXLEN, OptionValue::Int(-1)).unwrap_err();
        assert!(matches!(negative, ArrayFuncError::InvalidOption { .. }));

        let fractional = options.set(MAXLEN, OptionValue::Float(2.5)).unwrap_err();
        assert!(format!("{fractional}").contains("must be an integer"));

        let not_bool = options.set(MATHERRORS, OptionValue::Int(1)).unwrap_err();
        assert!(format!("{not_bool}").contains("must be a boolean"));

        let unknown = options.set("fast", OptionValue::Bool(true)).unwrap_err();
        assert!(format!("{unknown}").contains("unrecognised option"));

        assert_eq!(options, CallOptions::default());
    }
}
