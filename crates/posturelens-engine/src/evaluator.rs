//! Per-frame evaluation and session accounting.
//!
//! [`PostureEvaluator`] wraps the stateless classifier with the bookkeeping
//! a session needs: running statistics, state-transition detection, and the
//! sustained-bend debounce. Classification itself never reads any of that
//! state: a frame's assessment depends only on the frame.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use posturelens_core::{
    PoseFrame, PostureAssessment, PostureClassifier, PostureState, SessionId,
    DEFAULT_BEND_THRESHOLD_DEGREES,
};

use crate::events::MonitorEvent;
use crate::{MonitorConfig, Result};

/// Configuration for the per-frame evaluator.
#[derive(Debug, Clone, Copy)]
pub struct EvaluatorConfig {
    /// Bend threshold in degrees
    pub bend_threshold_degrees: f64,
    /// Visibility floor below which a landmark reads as missing (0.0 = off)
    pub min_visibility: f32,
    /// Continuous bent time before a sustained-bend event fires, in ms
    pub sustained_bend_ms: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            bend_threshold_degrees: DEFAULT_BEND_THRESHOLD_DEGREES,
            min_visibility: 0.0,
            sustained_bend_ms: 5_000,
        }
    }
}

impl EvaluatorConfig {
    /// Derives the evaluator knobs from a monitor configuration.
    #[must_use]
    pub fn from_monitor_config(config: &MonitorConfig) -> Self {
        Self {
            bend_threshold_degrees: config.bend_threshold_degrees,
            min_visibility: config.min_visibility,
            sustained_bend_ms: config.sustained_bend_ms,
        }
    }
}

/// Running statistics for one monitoring session.
///
/// Purely observational: nothing here feeds back into classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStatistics {
    /// Frames evaluated
    pub frames_seen: u64,
    /// Frames classified bent
    pub bent_frames: u64,
    /// Frames classified upright
    pub upright_frames: u64,
    /// Frames with no available angle
    pub unknown_frames: u64,
    /// Classification changes between consecutive frames
    pub transitions: u64,
    /// Smallest hip angle seen, in degrees
    pub min_angle_degrees: Option<f64>,
    /// Largest hip angle seen, in degrees
    pub max_angle_degrees: Option<f64>,
    /// Mean hip angle over frames with an available angle, in degrees
    pub mean_angle_degrees: Option<f64>,
}

impl SessionStatistics {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one assessment.
    pub fn record(&mut self, assessment: &PostureAssessment) {
        self.frames_seen += 1;
        match assessment.state {
            PostureState::Bent => self.bent_frames += 1,
            PostureState::Upright => self.upright_frames += 1,
            PostureState::Unknown => self.unknown_frames += 1,
        }

        // A non-finite angle would poison the running aggregates.
        if let Some(angle) = assessment.hip_angle_degrees.filter(|a| a.is_finite()) {
            self.min_angle_degrees = Some(self.min_angle_degrees.map_or(angle, |m| m.min(angle)));
            self.max_angle_degrees = Some(self.max_angle_degrees.map_or(angle, |m| m.max(angle)));

            // Incremental mean over classified frames.
            #[allow(clippy::cast_precision_loss)]
            let samples = self.classified_frames() as f64;
            self.mean_angle_degrees = Some(match self.mean_angle_degrees {
                Some(mean) => mean + (angle - mean) / samples,
                None => angle,
            });
        }
    }

    /// Records a classification change between consecutive frames.
    pub fn record_transition(&mut self) {
        self.transitions += 1;
    }

    /// Returns the number of frames with a known classification.
    #[must_use]
    pub fn classified_frames(&self) -> u64 {
        self.bent_frames + self.upright_frames
    }

    /// Returns the fraction of classified frames that were bent.
    ///
    /// Zero when no frame classified.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bent_ratio(&self) -> f64 {
        let classified = self.classified_frames();
        if classified == 0 {
            return 0.0;
        }
        self.bent_frames as f64 / classified as f64
    }

    /// Resets all counters to the empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Summary of a finished monitoring session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Session identity
    pub session_id: SessionId,
    /// When the monitor loop started
    pub started_at: DateTime<Utc>,
    /// When the session ended
    pub ended_at: DateTime<Utc>,
    /// Accumulated statistics
    pub statistics: SessionStatistics,
}

impl SessionSummary {
    /// Wall-clock span of the session in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        self.ended_at
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }
}

/// Stateful session wrapper around the stateless classifier.
pub struct PostureEvaluator {
    classifier: PostureClassifier,
    sustained_bend_ms: u64,
    statistics: SessionStatistics,
    previous_state: Option<PostureState>,
    bent_since: Option<DateTime<Utc>>,
    sustained_fired: bool,
}

impl PostureEvaluator {
    /// Creates an evaluator from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold or visibility floor is invalid.
    pub fn new(config: EvaluatorConfig) -> Result<Self> {
        let classifier = PostureClassifier::new(config.bend_threshold_degrees)?
            .with_min_visibility(config.min_visibility)?;
        Ok(Self {
            classifier,
            sustained_bend_ms: config.sustained_bend_ms,
            statistics: SessionStatistics::new(),
            previous_state: None,
            bent_since: None,
            sustained_fired: false,
        })
    }

    /// Returns the underlying classifier.
    #[must_use]
    pub fn classifier(&self) -> &PostureClassifier {
        &self.classifier
    }

    /// Returns the accumulated session statistics.
    #[must_use]
    pub fn statistics(&self) -> &SessionStatistics {
        &self.statistics
    }

    /// Evaluates one frame and returns its assessment plus any events.
    ///
    /// The sustained-bend clock runs on frame timestamps, not wall time, so
    /// replayed sessions produce the same events as live ones.
    pub fn process(&mut self, frame: &PoseFrame) -> (PostureAssessment, Vec<MonitorEvent>) {
        let assessment = self.classifier.assess(frame);
        self.statistics.record(&assessment);
        trace!(
            seq = assessment.seq,
            state = %assessment.state,
            angle = ?assessment.hip_angle_degrees,
            "frame assessed"
        );

        let mut events = Vec::new();

        if let Some(previous) = self.previous_state {
            if previous != assessment.state {
                self.statistics.record_transition();
                debug!(
                    seq = assessment.seq,
                    from = %previous,
                    to = %assessment.state,
                    "posture changed"
                );
                events.push(MonitorEvent::StateChanged {
                    seq: assessment.seq,
                    previous,
                    current: assessment.state,
                    angle_degrees: assessment.hip_angle_degrees,
                });
            }
        }

        if assessment.state == PostureState::Bent {
            let since = *self.bent_since.get_or_insert(assessment.timestamp);
            if !self.sustained_fired {
                let elapsed = assessment
                    .timestamp
                    .signed_duration_since(since)
                    .num_milliseconds();
                let window = i64::try_from(self.sustained_bend_ms).unwrap_or(i64::MAX);
                if elapsed >= window {
                    self.sustained_fired = true;
                    debug!(seq = assessment.seq, elapsed_ms = elapsed, "sustained bend");
                    events.push(MonitorEvent::SustainedBend {
                        seq: assessment.seq,
                        duration_ms: elapsed.unsigned_abs(),
                    });
                }
            }
        } else {
            self.bent_since = None;
            self.sustained_fired = false;
        }

        self.previous_state = Some(assessment.state);
        (assessment, events)
    }

    /// Clears statistics and episode tracking for a fresh session.
    pub fn reset(&mut self) {
        self.statistics.reset();
        self.previous_state = None;
        self.bent_since = None;
        self.sustained_fired = false;
    }
}
