//! Platform capability detection.
//!
//! A [`Platform`] records the architecture family and the SIMD instruction
//! set the vectorized kernels may use. It is built once, either explicitly
//! (and handed to a [`Dispatcher`](crate::dispatch::Dispatcher)) or lazily
//! through [`Platform::current`], and never changes afterwards.
//!
//! Setting the `ARRAYFUNC_NOSIMD` environment variable to anything other than
//! an empty string or `0` makes [`Platform::detect`] report no SIMD support.

use std::fmt;
use std::sync::OnceLock;

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Environment variable that disables SIMD detection.
pub const NOSIMD_ENV: &str = "ARRAYFUNC_NOSIMD";

static CURRENT: OnceLock<Platform> = OnceLock::new();

/// CPU architecture family of the running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchFamily {
    X86_64,
    Aarch64,
    Other,
}

impl ArchFamily {
    pub const fn host() -> ArchFamily {
        if cfg!(target_arch = "x86_64") {
            ArchFamily::X86_64
        } else if cfg!(target_arch = "aarch64") {
            ArchFamily::Aarch64
        } else {
            ArchFamily::Other
        }
    }
}

/// SIMD instruction set used by the vectorized kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimdIsa {
    /// 256-bit AVX2 (x86_64).
    Avx2,
    /// 128-bit Advanced SIMD (aarch64).
    Neon,
}

impl SimdIsa {
    /// Register width in bytes.
    pub const fn width(self) -> usize {
        match self {
            SimdIsa::Avx2 => 32,
            SimdIsa::Neon => 16,
        }
    }
}

impl fmt::Display for SimdIsa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimdIsa::Avx2 => f.write_str("avx2"),
            SimdIsa::Neon => f.write_str("neon"),
        }
    }
}

/// Immutable description of what the current process may execute.
///
/// The SIMD field can only be populated by detection, so holding a
/// `Platform` that reports an ISA is proof that the CPU supports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Platform {
    arch: ArchFamily,
    simd: Option<SimdIsa>,
}

impl Platform {
    /// Probes the CPU, honouring [`NOSIMD_ENV`].
    pub fn detect() -> Platform {
        if simd_disabled_by_env() {
            info!("{NOSIMD_ENV} is set, vectorized kernels disabled");
            return Platform::scalar_only();
        }

        let platform = Platform {
            arch: ArchFamily::host(),
            simd: detect_isa(),
        };
        debug!(
            "detected platform: arch={:?} simd={:?}",
            platform.arch, platform.simd
        );
        platform
    }

    /// A platform that never uses vectorized kernels.
    pub fn scalar_only() -> Platform {
        Platform {
            arch: ArchFamily::host(),
            simd: None,
        }
    }

    /// The process-wide platform, detected on first use.
    pub fn current() -> &'static Platform {
        CURRENT.get_or_init(Platform::detect)
    }

    pub fn arch(&self) -> ArchFamily {
        self.arch
    }

    pub fn simd_isa(&self) -> Option<SimdIsa> {
        self.simd
    }

    pub fn is_simd_active(&self) -> bool {
        self.simd.is_some()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.simd {
            Some(isa) => write!(f, "{:?} ({isa})", self.arch),
            None => write!(f, "{:?} (scalar)", self.arch),
        }
    }
}

fn simd_disabled_by_env() -> bool {
    std::env::var(NOSIMD_ENV)
        .map(|value| !value.is_empty() && value != "0")
        .unwrap_or(false)
}

#[cfg(target_arch = "x86_64")]
fn detect_isa() -> Option<SimdIsa> {
    is_x86_feature_detected!("avx2").then_some(SimdIsa::Avx2)
}

#[cfg(target_arch = "aarch64")]
fn detect_isa() -> Option<SimdIsa> {
    std::arch::is_aarch64_feature_detected!("neon").then_some(SimdIsa::Neon)
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn detect_isa() -> Option<SimdIsa> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_only_has_no_isa() {
        let platform = Platform::scalar_only();
        assert!(!platform.is_simd_active());
        assert_eq!(platform.simd_isa(), None);
        assert_eq!(platform.arch(), ArchFamily::host());
    }

    #[test]
    fn test_detected_isa_matches_arch() {
        let platform = Platform::detect();
        match platform.simd_isa() {
            Some(SimdIsa::Avx2) => assert_eq!(platform.arch(), ArchFamily::X86_64),
            Some(SimdIsa::Neon) => assert_eq!(platform.arch(), ArchFamily::Aarch64),
            None => {}
        }
    }

    #[test]
    fn test_current_is_stable() {
        assert_eq!(Platform::current(), Platform::current());
        assert!(std::ptr::eq(Platform::current(), Platform::current()));
    }
}
