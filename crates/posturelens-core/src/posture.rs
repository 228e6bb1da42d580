//! Posture classification from the hip angle.
//!
//! The hip angle, the interior angle at the left hip formed by the left
//! shoulder and left knee, is a proxy for torso bend. A frame classifies
//! as `Bent` below the threshold, `Upright` at or above it (boundary
//! inclusive), and `Unknown` when the angle cannot be computed. Every frame
//! is classified independently: no hysteresis, no smoothing, no memory.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::geometry::joint_angle_degrees;
use crate::types::{Landmark, LandmarkIndex, PoseFrame};
use crate::DEFAULT_BEND_THRESHOLD_DEGREES;

/// Posture classification for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PostureState {
    /// Hip angle below the bend threshold
    Bent,
    /// Hip angle at or above the bend threshold
    Upright,
    /// Angle unavailable: missing landmark or degenerate geometry
    Unknown,
}

impl PostureState {
    /// Returns `true` for a bent classification.
    #[must_use]
    pub fn is_bent(&self) -> bool {
        matches!(self, PostureState::Bent)
    }

    /// Returns `true` if an angle backed this classification.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, PostureState::Unknown)
    }

    /// Overlay color for this state, as a hex string.
    #[must_use]
    pub fn color_hex(&self) -> &'static str {
        match self {
            PostureState::Bent => "#FF69B4",
            PostureState::Upright => "#00CFFF",
            PostureState::Unknown => "#9E9E9E",
        }
    }

    /// Human-readable description of this state.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            PostureState::Bent => "Torso bent past the threshold",
            PostureState::Upright => "Torso upright",
            PostureState::Unknown => "Hip angle unavailable",
        }
    }
}

impl std::fmt::Display for PostureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostureState::Bent => write!(f, "BENT"),
            PostureState::Upright => write!(f, "UPRIGHT"),
            PostureState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classifies an optional hip angle against a threshold.
///
/// `None` and non-finite angles classify as `Unknown`; otherwise `Bent`
/// strictly below the threshold and `Upright` at or above it.
#[must_use]
pub fn classify_posture(angle_degrees: Option<f64>, threshold_degrees: f64) -> PostureState {
    match angle_degrees {
        Some(angle) if angle.is_finite() => {
            if angle < threshold_degrees {
                PostureState::Bent
            } else {
                PostureState::Upright
            }
        }
        _ => PostureState::Unknown,
    }
}

/// The per-frame evaluation result.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PostureAssessment {
    /// Sequence number of the evaluated frame
    pub seq: u64,
    /// Capture timestamp of the evaluated frame
    pub timestamp: DateTime<Utc>,
    /// Hip angle in degrees, when available
    pub hip_angle_degrees: Option<f64>,
    /// Classification of the hip angle
    pub state: PostureState,
}

impl PostureAssessment {
    /// Returns `true` if an angle backed this assessment.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.state.is_known()
    }
}

/// Stateless per-frame posture classifier.
///
/// Holds the two policy knobs (bend threshold and visibility floor) and
/// nothing else; evaluating a frame never mutates the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureClassifier {
    bend_threshold_degrees: f64,
    min_visibility: f32,
}

impl Default for PostureClassifier {
    fn default() -> Self {
        Self {
            bend_threshold_degrees: DEFAULT_BEND_THRESHOLD_DEGREES,
            min_visibility: 0.0,
        }
    }
}

impl PostureClassifier {
    /// Creates a classifier with the given bend threshold.
    ///
    /// # Errors
    ///
    /// Returns an error unless the threshold is finite and strictly inside
    /// (0, 180) degrees.
    pub fn new(bend_threshold_degrees: f64) -> CoreResult<Self> {
        if !bend_threshold_degrees.is_finite()
            || bend_threshold_degrees <= 0.0
            || bend_threshold_degrees >= 180.0
        {
            return Err(CoreError::configuration(format!(
                "bend threshold must be inside (0, 180) degrees, got {bend_threshold_degrees}"
            )));
        }
        Ok(Self {
            bend_threshold_degrees,
            min_visibility: 0.0,
        })
    }

    /// Sets the visibility floor below which a landmark reads as missing.
    ///
    /// The default floor of 0.0 disables the gate, matching detectors that
    /// report every landmark regardless of occlusion.
    ///
    /// # Errors
    ///
    /// Returns an error if the floor is not in [0.0, 1.0].
    pub fn with_min_visibility(mut self, floor: f32) -> CoreResult<Self> {
        if !(0.0..=1.0).contains(&floor) {
            return Err(CoreError::configuration(format!(
                "visibility floor must be in [0.0, 1.0], got {floor}"
            )));
        }
        self.min_visibility = floor;
        Ok(self)
    }

    /// Returns the bend threshold in degrees.
    #[must_use]
    pub fn bend_threshold_degrees(&self) -> f64 {
        self.bend_threshold_degrees
    }

    /// Returns the visibility floor.
    #[must_use]
    pub fn min_visibility(&self) -> f32 {
        self.min_visibility
    }

    fn gated(&self, frame: &PoseFrame, index: LandmarkIndex) -> Option<Landmark> {
        frame
            .landmark(index)
            .filter(|l| l.meets_visibility(self.min_visibility))
            .copied()
    }

    /// Computes the hip angle for a frame, if the landmarks allow it.
    ///
    /// Requires the left shoulder (11), left hip (23), and left knee (25);
    /// any of them missing, or gated out by the visibility floor, makes
    /// the angle unavailable, as does degenerate geometry.
    #[must_use]
    pub fn hip_angle(&self, frame: &PoseFrame) -> Option<f64> {
        let shoulder = self.gated(frame, LandmarkIndex::LeftShoulder)?;
        let hip = self.gated(frame, LandmarkIndex::LeftHip)?;
        let knee = self.gated(frame, LandmarkIndex::LeftKnee)?;
        joint_angle_degrees(shoulder.point(), hip.point(), knee.point())
    }

    /// Classifies an optional hip angle against this classifier's threshold.
    #[must_use]
    pub fn classify(&self, angle_degrees: Option<f64>) -> PostureState {
        classify_posture(angle_degrees, self.bend_threshold_degrees)
    }

    /// Evaluates one frame: angle plus classification.
    #[must_use]
    pub fn assess(&self, frame: &PoseFrame) -> PostureAssessment {
        let hip_angle_degrees = self.hip_angle(frame);
        PostureAssessment {
            seq: frame.seq,
            timestamp: frame.timestamp,
            hip_angle_degrees,
            state: self.classify(hip_angle_degrees),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Confidence;
    use crate::utils::approx_eq;
    use crate::LANDMARK_COUNT;

    /// Builds a frame whose hip angle is exactly `degrees`: hip fixed, knee
    /// straight below it, shoulder rotated off the knee direction.
    fn frame_at_angle(seq: u64, degrees: f64) -> PoseFrame {
        let theta = degrees.to_radians();
        let hip = (0.5, 0.6);
        let knee = (hip.0, hip.1 + 0.3);
        let shoulder = (hip.0 + 0.35 * theta.sin(), hip.1 + 0.35 * theta.cos());

        let mut landmarks = vec![None; LANDMARK_COUNT];
        landmarks[LandmarkIndex::LeftShoulder.index()] =
            Some(Landmark::new(shoulder.0, shoulder.1));
        landmarks[LandmarkIndex::LeftHip.index()] = Some(Landmark::new(hip.0, hip.1));
        landmarks[LandmarkIndex::LeftKnee.index()] = Some(Landmark::new(knee.0, knee.1));
        PoseFrame::new(seq, landmarks)
    }

    #[test]
    fn test_classify_threshold_boundary() {
        assert_eq!(classify_posture(Some(139.99), 140.0), PostureState::Bent);
        assert_eq!(classify_posture(Some(140.0), 140.0), PostureState::Upright);
        assert_eq!(classify_posture(Some(140.01), 140.0), PostureState::Upright);
        assert_eq!(classify_posture(Some(0.0), 140.0), PostureState::Bent);
        assert_eq!(classify_posture(Some(180.0), 140.0), PostureState::Upright);
    }

    #[test]
    fn test_classify_unavailable_and_non_finite() {
        assert_eq!(classify_posture(None, 140.0), PostureState::Unknown);
        assert_eq!(classify_posture(Some(f64::NAN), 140.0), PostureState::Unknown);
        assert_eq!(
            classify_posture(Some(f64::INFINITY), 140.0),
            PostureState::Unknown
        );
    }

    #[test]
    fn test_state_helpers() {
        assert!(PostureState::Bent.is_bent());
        assert!(!PostureState::Upright.is_bent());
        assert!(PostureState::Bent.is_known());
        assert!(!PostureState::Unknown.is_known());

        assert_eq!(PostureState::Bent.color_hex(), "#FF69B4");
        assert_eq!(PostureState::Upright.color_hex(), "#00CFFF");
        assert_eq!(PostureState::Unknown.color_hex(), "#9E9E9E");

        assert_eq!(PostureState::Bent.to_string(), "BENT");
        assert_eq!(PostureState::Upright.to_string(), "UPRIGHT");
        assert_eq!(PostureState::Unknown.to_string(), "UNKNOWN");
        assert!(!PostureState::Unknown.description().is_empty());
    }

    #[test]
    fn test_classifier_threshold_validation() {
        assert!(PostureClassifier::new(140.0).is_ok());
        assert!(PostureClassifier::new(1.0).is_ok());
        assert!(PostureClassifier::new(0.0).is_err());
        assert!(PostureClassifier::new(180.0).is_err());
        assert!(PostureClassifier::new(-5.0).is_err());
        assert!(PostureClassifier::new(f64::NAN).is_err());
    }

    #[test]
    fn test_classifier_visibility_validation() {
        let classifier = PostureClassifier::default();
        assert!(classifier.with_min_visibility(0.5).is_ok());
        assert!(classifier.with_min_visibility(-0.1).is_err());
        assert!(classifier.with_min_visibility(1.1).is_err());
    }

    #[test]
    fn test_default_classifier_policy() {
        let classifier = PostureClassifier::default();
        assert!(approx_eq(
            classifier.bend_threshold_degrees(),
            DEFAULT_BEND_THRESHOLD_DEGREES,
            1e-12
        ));
        assert_eq!(classifier.min_visibility(), 0.0);
    }

    #[test]
    fn test_assess_angle_recovery() {
        let classifier = PostureClassifier::default();
        for degrees in [30.0, 90.0, 139.0, 141.0, 175.0] {
            let assessment = classifier.assess(&frame_at_angle(1, degrees));
            let angle = assessment.hip_angle_degrees.expect("triple present");
            assert!(approx_eq(angle, degrees, 0.01), "expected {degrees}, got {angle}");
        }
    }

    #[test]
    fn test_assess_classification() {
        let classifier = PostureClassifier::default();

        let bent = classifier.assess(&frame_at_angle(1, 100.0));
        assert_eq!(bent.state, PostureState::Bent);
        assert!(bent.is_known());

        let upright = classifier.assess(&frame_at_angle(2, 170.0));
        assert_eq!(upright.state, PostureState::Upright);
        assert_eq!(upright.seq, 2);
    }

    #[test]
    fn test_assess_missing_landmark_is_unknown() {
        let classifier = PostureClassifier::default();

        let mut frame = frame_at_angle(5, 120.0);
        frame.landmarks[LandmarkIndex::LeftKnee.index()] = None;
        let assessment = classifier.assess(&frame);
        assert_eq!(assessment.state, PostureState::Unknown);
        assert_eq!(assessment.hip_angle_degrees, None);
        assert_eq!(assessment.seq, 5);

        let empty = classifier.assess(&PoseFrame::empty(6));
        assert_eq!(empty.state, PostureState::Unknown);
    }

    #[test]
    fn test_assess_degenerate_geometry_is_unknown() {
        let classifier = PostureClassifier::default();

        // Shoulder coincides with the hip.
        let mut frame = frame_at_angle(9, 120.0);
        let hip = frame.landmarks[LandmarkIndex::LeftHip.index()];
        frame.landmarks[LandmarkIndex::LeftShoulder.index()] = hip;
        let assessment = classifier.assess(&frame);
        assert_eq!(assessment.state, PostureState::Unknown);
        assert_eq!(assessment.hip_angle_degrees, None);
    }

    #[test]
    fn test_visibility_floor_gates_landmarks() {
        let classifier = PostureClassifier::default()
            .with_min_visibility(0.5)
            .expect("valid floor");

        let mut frame = frame_at_angle(3, 120.0);
        let faint = frame.landmarks[LandmarkIndex::LeftKnee.index()]
            .expect("present")
            .with_visibility(Confidence::new(0.2).expect("valid"));
        frame.landmarks[LandmarkIndex::LeftKnee.index()] = Some(faint);

        assert_eq!(classifier.assess(&frame).state, PostureState::Unknown);

        // The default classifier ignores visibility entirely.
        assert_eq!(
            PostureClassifier::default().assess(&frame).state,
            PostureState::Bent
        );
    }

    #[test]
    fn test_assess_is_stateless() {
        let classifier = PostureClassifier::default();
        let frame = frame_at_angle(1, 150.0);
        let first = classifier.assess(&frame);
        let second = classifier.assess(&frame);
        assert_eq!(first, second);
    }

    #[test]
    fn test_boundary_frame_is_upright() {
        let classifier = PostureClassifier::default();
        let assessment = classifier.assess(&frame_at_angle(1, 140.0));
        let angle = assessment.hip_angle_degrees.expect("triple present");
        // The constructed angle can land a hair on either side of 140; the
        // classification must agree with the recovered angle exactly.
        let expected = if angle < 140.0 {
            PostureState::Bent
        } else {
            PostureState::Upright
        };
        assert_eq!(assessment.state, expected);
        assert!(approx_eq(angle, 140.0, 0.01));
    }
}
