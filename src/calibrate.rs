//! Calibration and benchmark harness.
//!
//! For one operation and element type the harness times a single call to
//! estimate latency `L`, derives an iteration count `max(1, floor(D / L))`
//! for a target duration `D`, then re-runs the call that many times in up
//! to [`MAX_BATCHES`] batches. Each kernel family is measured separately:
//! scalar, vectorized with math-error checks and vectorized without them.
//! A family the dispatcher would not select for that type is reported as
//! `None`.
//!
//! ```no_run
//! use arrayfunc::calibrate::Calibrator;
//! use arrayfunc::{Dispatcher, Operation};
//!
//! let report = Calibrator::new(Dispatcher::global())
//!     .benchmark(Operation::Fabs)
//!     .unwrap();
//! println!("{report}");
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::array::{Arg, ArrayBuffer};
use crate::descriptor::{Operand, Operation};
use crate::dispatch::{Dispatcher, KernelPath, Outcome};
use crate::error::Result;
use crate::options::CallOptions;
use crate::platform::Platform;
use crate::types::{ElementType, Scalar};

/// Default target duration `D` for one measurement.
pub const DEFAULT_TARGET: Duration = Duration::from_millis(100);

/// Upper bound on the iterations of one measurement.
pub const MAX_ITERATIONS: u64 = 1_000_000;

/// A measurement stops once it has run for this many times the target.
pub const OVERRUN_FACTOR: u32 = 3;

/// Iterations are split into at most this many batches.
pub const MAX_BATCHES: u64 = 10;

/// Default array length of the workload.
pub const DEFAULT_LEN: usize = 100_000;

const SIGNED_PATTERN: [f64; 10] = [-5.0, -4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0];
const UNSIGNED_PATTERN: [f64; 10] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];

/// Number of timed iterations for a single-call latency of `single`.
pub fn iteration_count(single: Duration, target: Duration) -> u64 {
    if single.is_zero() {
        return MAX_ITERATIONS;
    }
    let count = target.as_nanos() / single.as_nanos();
    (count.min(MAX_ITERATIONS as u128) as u64).max(1)
}

/// Which kernel family a measurement exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelMode {
    Scalar,
    SimdChecked,
    SimdUnchecked,
}

impl KernelMode {
    pub const ALL: [KernelMode; 3] = [
        KernelMode::Scalar,
        KernelMode::SimdChecked,
        KernelMode::SimdUnchecked,
    ];

    /// Call options that steer the dispatcher to this family.
    pub fn options(self) -> CallOptions {
        match self {
            KernelMode::Scalar => CallOptions::default().with_force_scalar(true),
            KernelMode::SimdChecked => CallOptions::default(),
            KernelMode::SimdUnchecked => CallOptions::default().with_math_errors_suppressed(true),
        }
    }
}

/// Timing of one kernel family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub iterations: u64,
    pub total: Duration,
    /// Mean latency of one call, in nanoseconds.
    pub per_call_ns: f64,
    /// Standard deviation of the per-batch mean latency, in nanoseconds.
    pub std_dev_ns: f64,
}

/// One element type's line in a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRow {
    pub element_type: ElementType,
    pub scalar: Measurement,
    pub simd_checked: Option<Measurement>,
    pub simd_unchecked: Option<Measurement>,
}

impl BenchmarkRow {
    /// Scalar latency over the fastest vectorized latency.
    pub fn speedup(&self) -> Option<f64> {
        let fastest = [self.simd_checked, self.simd_unchecked]
            .into_iter()
            .flatten()
            .map(|m| m.per_call_ns)
            .reduce(f64::min)?;
        (fastest > 0.0).then(|| self.scalar.per_call_ns / fastest)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub operation: Operation,
    pub platform: Platform,
    pub len: usize,
    pub target: Duration,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<BenchmarkRow>,
}

fn cell(measurement: Option<Measurement>) -> String {
    match measurement {
        Some(m) => format!("{:.1}", m.per_call_ns),
        None => "-".to_string(),
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} on {} ({} elements, target {:?}, {})",
            self.operation,
            self.platform,
            self.len,
            self.target,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            f,
            "{:<6} {:>14} {:>14} {:>14} {:>8}",
            "type", "scalar ns", "simd ns", "nocheck ns", "speedup"
        )?;
        for row in &self.rows {
            let speedup = row
                .speedup()
                .map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
            writeln!(
                f,
                "{:<6} {:>14} {:>14} {:>14} {:>8}",
                row.element_type.name(),
                cell(Some(row.scalar)),
                cell(row.simd_checked),
                cell(row.simd_unchecked),
                speedup
            )?;
        }
        Ok(())
    }
}

/// Owned buffers for repeated calls of one operation.
struct Workload {
    operation: Operation,
    inputs: Vec<ArrayBuffer>,
    output: Option<ArrayBuffer>,
    param: Option<Scalar>,
}

impl Workload {
    /// Builds the widest signature of `operation`: separate output, no
    /// in-place update, so repeated calls see identical data.
    fn new(operation: Operation, element_type: ElementType, len: usize) -> Result<Workload> {
        let pattern: &[f64] = if element_type.is_signed() || element_type.is_float() {
            &SIGNED_PATTERN
        } else {
            &UNSIGNED_PATTERN
        };
        let signature = operation
            .descriptor()
            .signatures
            .iter()
            .copied()
            .max_by_key(|signature| signature.len())
            .unwrap_or(&[]);

        let mut workload = Workload {
            operation,
            inputs: Vec::new(),
            output: None,
            param: None,
        };
        for operand in signature {
            match operand {
                Operand::Input => workload
                    .inputs
                    .push(ArrayBuffer::from_pattern(element_type, len, pattern)?),
                Operand::Output | Operand::InOut => {
                    workload.output = Some(ArrayBuffer::zeroed(element_type, len))
                }
                Operand::Scalar => {
                    workload.param = ArrayBuffer::from_pattern(element_type, 1, &[0.0])?.get(0)
                }
            }
        }
        Ok(workload)
    }

    fn run(&mut self, dispatcher: &Dispatcher, options: &CallOptions) -> Result<Outcome> {
        let mut args: Vec<Arg<'_>> = self.inputs.iter().map(|b| Arg::from(b.view())).collect();
        if let Some(output) = self.output.as_mut() {
            args.push(Arg::from(output.view_mut()));
        }
        if let Some(param) = self.param {
            args.push(Arg::from(param));
        }
        dispatcher.call(self.operation, args, options)
    }
}

/// Outcome of the timed loop of one measurement.
#[derive(Debug)]
struct BatchRun {
    done: u64,
    total: Duration,
    batch_means: Vec<f64>,
    overran: bool,
}

impl BatchRun {
    fn measurement(&self) -> Measurement {
        let std_dev_ns = if self.batch_means.len() > 1 {
            self.batch_means.iter().std_dev()
        } else {
            0.0
        };
        Measurement {
            iterations: self.done,
            total: self.total,
            per_call_ns: self.total.as_nanos() as f64 / self.done as f64,
            std_dev_ns,
        }
    }
}

/// Runs `call` up to `iterations` times in at most [`MAX_BATCHES`] batches.
///
/// The deadline is checked before every call except the first, so a run
/// ends at most one call after `deadline` and never with zero iterations.
fn run_batches(
    iterations: u64,
    deadline: Duration,
    mut call: impl FnMut() -> Result<()>,
) -> Result<BatchRun> {
    let iterations = iterations.max(1);
    let batches = iterations.min(MAX_BATCHES);
    let per_batch = iterations / batches;
    let remainder = iterations % batches;

    let mut batch_means = Vec::with_capacity(batches as usize);
    let mut done = 0u64;
    let mut overran = false;
    let start = Instant::now();
    for batch in 0..batches {
        let count = per_batch + u64::from(batch < remainder);
        let batch_start = Instant::now();
        let mut ran = 0u64;
        while ran < count {
            if done + ran > 0 && start.elapsed() > deadline {
                overran = true;
                break;
            }
            call()?;
            ran += 1;
        }
        if ran > 0 {
            batch_means.push(batch_start.elapsed().as_nanos() as f64 / ran as f64);
        }
        done += ran;
        if overran {
            break;
        }
    }
    Ok(BatchRun {
        done,
        total: start.elapsed(),
        batch_means,
        overran,
    })
}

/// Runs measurements against one dispatcher.
#[derive(Debug, Clone)]
pub struct Calibrator<'d> {
    dispatcher: &'d Dispatcher,
    target: Duration,
    len: usize,
}

impl<'d> Calibrator<'d> {
    pub fn new(dispatcher: &'d Dispatcher) -> Self {
        Calibrator {
            dispatcher,
            target: DEFAULT_TARGET,
            len: DEFAULT_LEN,
        }
    }

    pub fn with_target(mut self, target: Duration) -> Self {
        self.target = target;
        self
    }

    pub fn with_len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }

    pub fn target(&self) -> Duration {
        self.target
    }

    /// Whether `mode` reaches a kernel of its own family for this type.
    pub fn is_available(&self, operation: Operation, element_type: ElementType, mode: KernelMode) -> bool {
        let options = mode.options();
        match mode {
            KernelMode::Scalar => true,
            KernelMode::SimdUnchecked if !operation.descriptor().math_errors => false,
            _ => matches!(
                self.dispatcher.select(operation, element_type, &options),
                KernelPath::Vector(_)
            ),
        }
    }

    /// Times one kernel family, or `None` when it does not exist here.
    pub fn measure(
        &self,
        operation: Operation,
        element_type: ElementType,
        mode: KernelMode,
    ) -> Result<Option<Measurement>> {
        if !self.is_available(operation, element_type, mode) {
            return Ok(None);
        }
        let options = mode.options();
        let mut workload = Workload::new(operation, element_type, self.len)?;

        let start = Instant::now();
        workload.run(self.dispatcher, &options)?;
        let single = start.elapsed();

        let iterations = iteration_count(single, self.target);
        let run = run_batches(iterations, self.target * OVERRUN_FACTOR, || {
            workload.run(self.dispatcher, &options).map(|_| ())
        })?;
        let measurement = run.measurement();
        debug!(
            "{operation} {element_type} {mode:?}: {} iterations, {:.1} ns/call{}",
            run.done,
            measurement.per_call_ns,
            if run.overran { " (stopped at deadline)" } else { "" }
        );
        Ok(Some(measurement))
    }

    pub fn benchmark_type(&self, operation: Operation, element_type: ElementType) -> Result<BenchmarkRow> {
        let scalar = self
            .measure(operation, element_type, KernelMode::Scalar)?
            .ok_or_else(|| crate::error::unsupported_type(operation.name(), element_type))?;
        Ok(BenchmarkRow {
            element_type,
            scalar,
            simd_checked: self.measure(operation, element_type, KernelMode::SimdChecked)?,
            simd_unchecked: self.measure(operation, element_type, KernelMode::SimdUnchecked)?,
        })
    }

    /// Benchmarks every element type the operation supports.
    pub fn benchmark(&self, operation: Operation) -> Result<BenchmarkReport> {
        let rows = operation
            .descriptor()
            .types
            .iter()
            .map(|element_type| self.benchmark_type(operation, element_type))
            .collect::<Result<Vec<_>>>()?;
        Ok(BenchmarkReport {
            operation,
            platform: *self.dispatcher.platform(),
            len: self.len,
            target: self.target,
            generated_at: Utc::now(),
            rows,
        })
    }
}
