//! Opt-in timing hooks for the patch pipeline.
//!
//! Timing is only collected when the `patch_metrics` feature is enabled and
//! the target is not WASM (`std::time::Instant` is unavailable there). When
//! disabled, all calls compile to plain closure invocations.
//!
//! # Usage
//!
//! ```ignore
//! use coons_engine::geom::{PatchMetrics, TimingBucket};
//!
//! let mut metrics = PatchMetrics::default();
//! metrics.begin();
//!
//! let curves = metrics.time(TimingBucket::CurveEvaluation, || {
//!     boundary.sample(100, true)
//! });
//!
//! if let Some(report) = metrics.end() {
//!     println!("Curves: {} ns", report.curve_evaluation_ns);
//! }
//! ```

/// Pipeline stages that accumulate time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Bernstein evaluation of the boundary curves.
    CurveEvaluation,
    /// Coons blending of the patch grid.
    PatchBlend,
    /// Grid face indexing.
    Indexing,
    /// Topology and boundary-fit checks.
    Diagnostics,
    /// Writing the mesh to a sink.
    Export,
}

/// Cumulative per-stage timings in nanoseconds.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchTimingReport {
    pub curve_evaluation_ns: u64,
    pub patch_blend_ns: u64,
    pub indexing_ns: u64,
    pub diagnostics_ns: u64,
    pub export_ns: u64,
}

impl PatchTimingReport {
    /// Returns the total time across all buckets in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.curve_evaluation_ns
            .saturating_add(self.patch_blend_ns)
            .saturating_add(self.indexing_ns)
            .saturating_add(self.diagnostics_ns)
            .saturating_add(self.export_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    fn bucket_mut(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::CurveEvaluation => &mut self.curve_evaluation_ns,
            TimingBucket::PatchBlend => &mut self.patch_blend_ns,
            TimingBucket::Indexing => &mut self.indexing_ns,
            TimingBucket::Diagnostics => &mut self.diagnostics_ns,
            TimingBucket::Export => &mut self.export_ns,
        }
    }

    /// Adds `nanos` to `bucket`, saturating at `u64::MAX`.
    pub fn add(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = self.bucket_mut(bucket);
        *slot = slot.saturating_add(nanos);
    }
}

/// Accumulator for timing pipeline stages.
///
/// Call [`begin`](Self::begin) to reset, wrap stages with
/// [`time`](Self::time), and call [`end`](Self::end) to retrieve the report.
#[derive(Debug, Default)]
pub struct PatchMetrics {
    #[cfg(all(feature = "patch_metrics", not(target_arch = "wasm32")))]
    report: PatchTimingReport,
}

impl PatchMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "patch_metrics", not(target_arch = "wasm32")))]
        {
            self.report = PatchTimingReport::default();
        }
    }

    /// Returns the accumulated timing report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<PatchTimingReport> {
        #[cfg(all(feature = "patch_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "patch_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Times the execution of `f` and accumulates the elapsed time in `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "patch_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            // Cap at u64::MAX to prevent overflow
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.report.add(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "patch_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
