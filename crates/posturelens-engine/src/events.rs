//! Session events broadcast by the monitor.
//!
//! Delivery is best effort: events go out on a broadcast channel and are
//! dropped when nobody listens or a subscriber lags. Assessments themselves
//! always reach the configured sinks regardless of event delivery.

use serde::Serialize;

use posturelens_core::PostureState;

use crate::evaluator::SessionSummary;

/// An event observed during a monitoring session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// Classification changed between consecutive frames.
    StateChanged {
        /// Frame at which the change was observed
        seq: u64,
        /// State of the previous frame
        previous: PostureState,
        /// State of this frame
        current: PostureState,
        /// Hip angle of this frame, when available
        angle_degrees: Option<f64>,
    },
    /// Posture has been bent continuously past the configured window.
    ///
    /// Fires at most once per bent episode; standing upright re-arms it.
    SustainedBend {
        /// Frame at which the window was crossed
        seq: u64,
        /// Continuous bent time at that frame, in milliseconds
        duration_ms: u64,
    },
    /// The session ended: source drained, frame budget reached, or stopped.
    SessionEnded {
        /// Final session summary
        summary: SessionSummary,
    },
}

impl MonitorEvent {
    /// Returns the event kind as a stable lowercase name.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::SustainedBend { .. } => "sustained_bend",
            Self::SessionEnded { .. } => "session_ended",
        }
    }
}
