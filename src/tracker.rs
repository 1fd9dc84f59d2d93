use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::advisory::{Advisory, AdvisorySink, TracingSink};
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::guard::SegmentGuard;
use crate::report::{self, LabelSummary};

/// One finished segment, in the order segments were stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSegment {
    pub label: String,
    pub elapsed: Duration,
}

/// An active incarnation of a label. Dropping `watchdog` cancels the
/// pending long-running check, so a timer exists exactly while the entry does.
struct ActiveSegment {
    started: Instant,
    generation: u64,
    _watchdog: Sender<()>,
}

#[derive(Default)]
struct State {
    active: HashMap<String, ActiveSegment>,
    completed: Vec<CompletedSegment>,
    next_generation: u64,
}

impl State {
    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

struct Inner {
    state: Mutex<State>,
    config: TrackerConfig,
    sink: Arc<dyn AdvisorySink>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock()
    }

    /// Watchdog callback. Warns only if the same incarnation is still running.
    /// The check runs under the lock; the advisory is emitted after releasing it.
    fn warn_if_over_limit(&self, label: &str, generation: u64) {
        let advisory = {
            let state = self.lock();
            let Some(segment) = state.active.get(label) else {
                debug!(label, "watchdog fired for stopped segment");
                return;
            };
            if segment.generation != generation {
                debug!(label, generation, current = segment.generation, "stale watchdog ignored");
                return;
            }
            Advisory::LongRunning {
                label: label.to_string(),
                elapsed: segment.started.elapsed(),
                hint: self.config.hint.clone(),
            }
        };
        self.sink.emit(advisory);
    }
}

/// Tracks wall-clock time of named segments.
///
/// Clones share the same state. All operations are synchronous and safe to
/// call from any thread; a single lock covers the public operations and the
/// watchdog check so a stale timer can never warn about a newer incarnation
/// of the same label.
#[derive(Clone)]
pub struct SegmentTracker {
    inner: Arc<Inner>,
}

impl Default for SegmentTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SegmentTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("SegmentTracker")
            .field("config", &self.inner.config)
            .field("active", &state.active.len())
            .field("completed", &state.completed.len())
            .finish()
    }
}

impl SegmentTracker {
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default())
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Build a tracker that reports advisories to `sink` instead of `tracing`.
    pub fn with_sink(config: TrackerConfig, sink: Arc<dyn AdvisorySink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                config,
                sink,
            }),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    /// Start timing `label` and arm its long-running watchdog.
    pub fn start(&self, label: &str) -> Result<(), TrackerError> {
        let mut state = self.inner.lock();
        if state.active.contains_key(label) {
            return Err(TrackerError::AlreadyActive {
                label: label.to_string(),
            });
        }
        let generation = state.bump_generation();
        let started = Instant::now();
        let watchdog = self.schedule_watchdog(label, generation, started);
        state.active.insert(
            label.to_string(),
            ActiveSegment {
                started,
                generation,
                _watchdog: watchdog,
            },
        );
        debug!(label, generation, "segment started");
        Ok(())
    }

    /// Stop `label`, record its duration and cancel its watchdog.
    pub fn stop(&self, label: &str) -> Result<Duration, TrackerError> {
        let mut state = self.inner.lock();
        let segment = state
            .active
            .remove(label)
            .ok_or_else(|| TrackerError::NotActive {
                label: label.to_string(),
            })?;
        let elapsed = segment.started.elapsed();
        state.completed.push(CompletedSegment {
            label: label.to_string(),
            elapsed,
        });
        debug!(label, elapsed_secs = elapsed.as_secs_f64(), "segment stopped");
        Ok(elapsed)
    }

    /// Restart the clock of an active segment. No-op for inactive labels.
    pub fn reset(&self, label: &str) {
        {
            let mut state = self.inner.lock();
            if !state.active.contains_key(label) {
                debug!(label, "reset of inactive segment ignored");
                return;
            }
            let generation = state.bump_generation();
            let started = Instant::now();
            let watchdog = self.schedule_watchdog(label, generation, started);
            if let Some(segment) = state.active.get_mut(label) {
                // Replacing the sender cancels the previous watchdog.
                *segment = ActiveSegment {
                    started,
                    generation,
                    _watchdog: watchdog,
                };
            }
            debug!(label, generation, "segment reset");
        }
        self.inner.sink.emit(Advisory::ResetInFlight {
            label: label.to_string(),
        });
    }

    /// Sum of completed durations, restricted to `labels` when given.
    /// Active segments are not counted.
    pub fn total_time(&self, labels: Option<&[&str]>) -> Duration {
        let state = self.inner.lock();
        state
            .completed
            .iter()
            .filter(|seg| labels.is_none_or(|wanted| wanted.contains(&seg.label.as_str())))
            .map(|seg| seg.elapsed)
            .sum()
    }

    pub fn is_active(&self, label: &str) -> bool {
        self.inner.lock().active.contains_key(label)
    }

    pub fn active_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.inner.lock().active.keys().cloned().collect();
        labels.sort();
        labels
    }

    /// Time spent so far in an active segment.
    pub fn elapsed(&self, label: &str) -> Option<Duration> {
        self.inner
            .lock()
            .active
            .get(label)
            .map(|seg| seg.started.elapsed())
    }

    pub fn completed(&self) -> Vec<CompletedSegment> {
        self.inner.lock().completed.clone()
    }

    pub fn summary(&self) -> Vec<LabelSummary> {
        report::summarize(&self.completed())
    }

    /// Start `label` and return a guard that stops it when dropped.
    pub fn scope(&self, label: &str) -> Result<SegmentGuard, TrackerError> {
        self.start(label)?;
        Ok(SegmentGuard::new(self.clone(), label))
    }

    /// Spawn the one-shot watchdog for one incarnation of `label`.
    ///
    /// The thread waits on a channel whose sender lives in the active entry;
    /// dropping that sender wakes it with `Disconnected` and it exits quietly.
    /// The wait is measured from `started`, not from when the thread runs.
    fn schedule_watchdog(&self, label: &str, generation: u64, started: Instant) -> Sender<()> {
        let (tx, rx) = mpsc::channel::<()>();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let warn_after = self.inner.config.warn_after;
        let owned_label = label.to_string();

        let spawned = thread::Builder::new()
            .name("segment-watchdog".to_string())
            .spawn(move || {
                let remaining = warn_after.saturating_sub(started.elapsed());
                if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(remaining)
                    && let Some(inner) = weak.upgrade()
                {
                    inner.warn_if_over_limit(&owned_label, generation);
                }
            });
        if let Err(e) = spawned {
            warn!(label, err = %e, "could not spawn watchdog; long-running check disabled");
        }
        tx
    }
}
