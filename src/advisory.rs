use std::time::Duration;

use tracing::warn;

/// A non-fatal condition observed by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// A segment is still active after the configured threshold.
    LongRunning {
        label: String,
        elapsed: Duration,
        hint: String,
    },
    /// An active segment had its start time reset.
    ResetInFlight { label: String },
}

impl Advisory {
    pub fn label(&self) -> &str {
        match self {
            Advisory::LongRunning { label, .. } | Advisory::ResetInFlight { label } => label,
        }
    }
}

/// Side channel that receives advisories. `emit` is called after the
/// tracker's state lock is released, so sinks may query the tracker.
pub trait AdvisorySink: Send + Sync {
    fn emit(&self, advisory: Advisory);
}

/// Default sink: every advisory becomes a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AdvisorySink for TracingSink {
    fn emit(&self, advisory: Advisory) {
        match advisory {
            Advisory::LongRunning {
                label,
                elapsed,
                hint,
            } => warn!(
                label = label.as_str(),
                elapsed_secs = elapsed.as_secs_f64(),
                "{label} is taking longer than expected to run. {hint}"
            ),
            Advisory::ResetInFlight { label } => {
                warn!(label = label.as_str(), "resetting {label} time segment")
            }
        }
    }
}
