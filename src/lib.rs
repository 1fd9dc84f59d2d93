/// segment-tracker library crate.
///
/// Exposes the tracker and its supporting modules so that integration
/// tests in tests/ and the binary in src/main.rs share one API.
pub mod advisory;
pub mod config;
pub mod error;
pub mod guard;
pub mod report;
pub mod tracker;

pub use advisory::{Advisory, AdvisorySink, TracingSink};
pub use config::TrackerConfig;
pub use error::TrackerError;
pub use guard::SegmentGuard;
pub use tracker::{CompletedSegment, SegmentTracker};
