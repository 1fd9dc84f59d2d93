use std::time::Duration;

use tracing::debug;

use crate::error::TrackerError;
use crate::tracker::SegmentTracker;

/// Keeps a segment active for the guard's lifetime.
///
/// Created by [`SegmentTracker::scope`]. The segment is stopped when the
/// guard is dropped, including on early return or unwind.
#[must_use = "dropping the guard immediately stops the segment"]
#[derive(Debug)]
pub struct SegmentGuard {
    tracker: SegmentTracker,
    label: String,
    finished: bool,
}

impl SegmentGuard {
    pub(crate) fn new(tracker: SegmentTracker, label: &str) -> Self {
        Self {
            tracker,
            label: label.to_string(),
            finished: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Stop the segment now and return its duration.
    pub fn finish(mut self) -> Result<Duration, TrackerError> {
        self.finished = true;
        self.tracker.stop(&self.label)
    }
}

impl Drop for SegmentGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.tracker.stop(&self.label) {
            debug!(label = self.label.as_str(), err = %e, "segment already stopped before guard drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tracker::SegmentTracker;

    #[test]
    fn test_guard_stops_on_drop() {
        let tracker = SegmentTracker::new();
        {
            let _guard = tracker.scope("preprocess").unwrap();
            assert!(tracker.is_active("preprocess"));
        }
        assert!(!tracker.is_active("preprocess"));
        assert_eq!(tracker.completed().len(), 1);
    }

    #[test]
    fn test_finish_records_once() {
        let tracker = SegmentTracker::new();
        let guard = tracker.scope("inference").unwrap();
        let elapsed = guard.finish().unwrap();
        let completed = tracker.completed();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].elapsed, elapsed);
    }

    #[test]
    fn test_guard_tolerates_external_stop() {
        let tracker = SegmentTracker::new();
        let guard = tracker.scope("fit").unwrap();
        tracker.stop("fit").unwrap();
        drop(guard);
        assert_eq!(tracker.completed().len(), 1);
    }

    #[test]
    fn test_scope_rejects_active_label() {
        let tracker = SegmentTracker::new();
        let _guard = tracker.scope("fit").unwrap();
        assert!(tracker.scope("fit").is_err());
    }
}
