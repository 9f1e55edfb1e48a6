//! Dispatch timing instrumentation.
//!
//! Pointer events arrive at pointer rate (60+ per second while dragging), and
//! every one of them runs plugin callbacks synchronously. This module provides
//! RAII timers for those hot paths plus a small per-operation statistics table.
//!
//! Enable with the `profiling` feature flag:
//! ```toml
//! [dependencies]
//! graph-explorer = { features = ["profiling"] }
//! ```
//!
//! ```ignore
//! fn dispatch_mouse_move() {
//!     profile_scope!("mouse_move");
//!     // ... callbacks ...
//! }
//! ```

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{trace, warn};

/// One frame at 60 FPS
pub const TARGET_FRAME_MS: f64 = 16.67;

/// Number of samples kept per operation
const STATS_SAMPLE_COUNT: usize = 100;

/// Runtime switch, on by default when compiled with `profiling`
static PROFILING_ENABLED: AtomicBool = AtomicBool::new(cfg!(feature = "profiling"));

static OPERATION_STATS: Mutex<Option<HashMap<&'static str, OperationStats>>> = Mutex::new(None);

/// Time the rest of the enclosing scope. Compiles to nothing without `profiling`.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $crate::perf::TARGET_FRAME_MS);
        #[cfg(not(feature = "profiling"))]
        let _ = $name;
    };
    ($name:expr, $threshold_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $threshold_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $threshold_ms);
    };
}

pub use profile_scope;

/// Enable or disable recording at runtime.
pub fn set_profiling_enabled(enabled: bool) {
    PROFILING_ENABLED.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn is_profiling_enabled() -> bool {
    PROFILING_ENABLED.load(Ordering::Relaxed)
}

/// Rolling statistics for one named operation.
#[derive(Debug, Clone)]
pub struct OperationStats {
    samples: VecDeque<f64>,
    count: u64,
    max_ms: f64,
    sum_ms: f64,
}

impl Default for OperationStats {
    fn default() -> Self {
        Self {
            samples: VecDeque::with_capacity(STATS_SAMPLE_COUNT),
            count: 0,
            max_ms: 0.0,
            sum_ms: 0.0,
        }
    }
}

impl OperationStats {
    pub fn record(&mut self, ms: f64) {
        if self.samples.len() >= STATS_SAMPLE_COUNT {
            if let Some(old) = self.samples.pop_front() {
                self.sum_ms -= old;
            }
        }
        self.samples.push_back(ms);
        self.sum_ms += ms;
        self.count += 1;
        self.max_ms = self.max_ms.max(ms);
    }

    /// Average over the retained samples.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum_ms / self.samples.len() as f64
        }
    }

    pub fn max(&self) -> f64 {
        self.max_ms
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Record a sample for `name` in the global table.
pub fn record_operation(name: &'static str, elapsed_ms: f64) {
    let mut guard = OPERATION_STATS.lock();
    guard
        .get_or_insert_with(HashMap::new)
        .entry(name)
        .or_default()
        .record(elapsed_ms);
}

/// Copy of the statistics recorded so far for `name`.
pub fn operation_stats(name: &str) -> Option<OperationStats> {
    OPERATION_STATS
        .lock()
        .as_ref()
        .and_then(|stats| stats.get(name).cloned())
}

/// Drop all recorded statistics.
pub fn reset_operation_stats() {
    *OPERATION_STATS.lock() = None;
}

/// Measures the time until it is dropped.
///
/// Warns when the scope took longer than the threshold and records the sample
/// when profiling is enabled.
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let ms = self.elapsed_ms();

        if is_profiling_enabled() {
            record_operation(self.name, ms);
        }

        if ms > self.threshold_ms {
            warn!(
                operation = self.name,
                elapsed_ms = format!("{:.2}", ms),
                threshold_ms = format!("{:.2}", self.threshold_ms),
                "Slow operation"
            );
        } else {
            trace!(operation = self.name, elapsed_ms = ms, "operation timed");
        }
    }
}
