//! Processing statistics (§5, §6): counters incremented by worker tasks and read back
//! by the orchestrator to write `ProcessingStatistics.txt`. Each counter is an atomic
//! so that workers increment it without coordinating through a shared lock; the
//! object as a whole exposes only increment/read operations, matching §5's
//! requirement that statistics mutation never requires the orchestrator's
//! cooperation.

use std::sync::atomic::{AtomicU64, Ordering};

/// The reason a scan or pair was not carried forward, for statistics and status-log
/// purposes. Mirrors §7's error taxonomy categories 2-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    UnreadableFile,
    EvaluationLogWriteFailed,
    EvaluationFailed,
    NoPlumeDetected,
    BelowCompletenessLimit,
    NoWindRecord,
    NoPlumeHeightRecord,
    PlumeBelowInstrument,
    UnknownInstrumentLocation,
    GeometryNonConvergence,
    GeometryDegenerate,
}

#[derive(Debug, Default)]
pub struct ProcessingStatistics {
    scans_discovered: AtomicU64,
    scans_evaluated_ok: AtomicU64,
    scans_rejected_io: AtomicU64,
    scans_rejected_quality: AtomicU64,
    scans_rejected_numerical: AtomicU64,
    geometry_pairs_attempted: AtomicU64,
    geometry_pairs_succeeded: AtomicU64,
    flux_computed: AtomicU64,
    flux_rejected: AtomicU64,
}

impl ProcessingStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_discovered(&self) {
        self.scans_discovered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evaluated_ok(&self) {
        self.scans_evaluated_ok.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self, reason: RejectionReason) {
        let counter = match reason {
            RejectionReason::UnreadableFile | RejectionReason::EvaluationLogWriteFailed => &self.scans_rejected_io,
            RejectionReason::EvaluationFailed => &self.scans_rejected_numerical,
            RejectionReason::NoPlumeDetected
            | RejectionReason::BelowCompletenessLimit
            | RejectionReason::NoWindRecord
            | RejectionReason::NoPlumeHeightRecord
            | RejectionReason::PlumeBelowInstrument
            | RejectionReason::UnknownInstrumentLocation => &self.scans_rejected_quality,
            RejectionReason::GeometryNonConvergence | RejectionReason::GeometryDegenerate => &self.scans_rejected_numerical,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_geometry_attempt(&self) {
        self.geometry_pairs_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_geometry_success(&self) {
        self.geometry_pairs_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_flux_computed(&self) {
        self.flux_computed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_flux_rejected(&self) {
        self.flux_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render(&self) -> String {
        format!(
            "scans discovered: {}\nscans evaluated ok: {}\nscans rejected (io): {}\nscans rejected (quality): {}\nscans rejected (numerical): {}\ngeometry pairs attempted: {}\ngeometry pairs succeeded: {}\nflux computed: {}\nflux rejected: {}\n",
            self.scans_discovered.load(Ordering::Relaxed),
            self.scans_evaluated_ok.load(Ordering::Relaxed),
            self.scans_rejected_io.load(Ordering::Relaxed),
            self.scans_rejected_quality.load(Ordering::Relaxed),
            self.scans_rejected_numerical.load(Ordering::Relaxed),
            self.geometry_pairs_attempted.load(Ordering::Relaxed),
            self.geometry_pairs_succeeded.load(Ordering::Relaxed),
            self.flux_computed.load(Ordering::Relaxed),
            self.flux_rejected.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counters_increment_independently() {
        let stats = ProcessingStatistics::new();
        stats.record_discovered();
        stats.record_discovered();
        stats.record_rejection(RejectionReason::NoPlumeDetected);
        stats.record_flux_computed();

        let rendered = stats.render();
        assert!(rendered.contains("scans discovered: 2"));
        assert!(rendered.contains("scans rejected (quality): 1"));
        assert!(rendered.contains("flux computed: 1"));
    }
}
