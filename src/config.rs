use std::time::Duration;

use tracing::warn;

/// Default long-running threshold: ten minutes.
pub const DEFAULT_WARN_AFTER: Duration = Duration::from_secs(600);

/// Environment variable read by [`TrackerConfig::from_env`].
pub const WARN_AFTER_ENV: &str = "SEGMENT_TRACKER_WARN_AFTER_SECS";

const DEFAULT_HINT: &str = "Use a GPU for faster processing, or if unavailable, \
     offload the work to a hosted inference API";

/// Settings for a [`crate::SegmentTracker`], fixed at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// How long a segment may stay active before a long-running advisory fires.
    pub warn_after: Duration,
    /// Suggestion appended to long-running advisories.
    pub hint: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            warn_after: DEFAULT_WARN_AFTER,
            hint: DEFAULT_HINT.to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn with_warn_after(mut self, warn_after: Duration) -> Self {
        self.warn_after = warn_after;
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    /// Default config, with `warn_after` taken from `SEGMENT_TRACKER_WARN_AFTER_SECS`
    /// when that variable holds a positive number of seconds.
    pub fn from_env() -> Self {
        Self::from_override(std::env::var(WARN_AFTER_ENV).ok().as_deref())
    }

    /// Default config with an optional raw `warn_after` override applied.
    /// Invalid values are logged and ignored.
    pub fn from_override(raw: Option<&str>) -> Self {
        let config = Self::default();
        let Some(raw) = raw else {
            return config;
        };
        match parse_warn_after(raw) {
            Some(warn_after) => config.with_warn_after(warn_after),
            None => {
                warn!(
                    var = WARN_AFTER_ENV,
                    value = raw,
                    "ignoring invalid warn-after override; expected positive seconds"
                );
                config
            }
        }
    }
}

/// Parse a seconds value (integer or fractional). Rejects zero, negatives and NaN.
pub fn parse_warn_after(raw: &str) -> Option<Duration> {
    let secs = raw.trim().parse::<f64>().ok()?;
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}
