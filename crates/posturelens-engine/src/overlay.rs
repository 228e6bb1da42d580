//! Render-ready overlay payloads.
//!
//! The engine never draws. [`OverlayFrame`] packages one frame's landmarks,
//! skeleton segments, state color, and angle label in normalized coordinates
//! so any front end (canvas, terminal, SVG) can render it with a multiply.

use serde::Serialize;

use posturelens_core::{LandmarkIndex, PoseFrame, PostureAssessment, PostureState};

/// Vertical label offset from the hip anchor, in pixels. Negative is up.
pub const LABEL_OFFSET_Y_PX: f64 = -10.0;

/// Label font size in pixels.
pub const LABEL_FONT_PX: u32 = 16;

/// Skeleton edges of the 33-point convention, body only.
///
/// Face contours are omitted; the nose-to-shoulder region renders as bare
/// points when present.
pub const BODY_CONNECTIONS: &[(LandmarkIndex, LandmarkIndex)] = &[
    // Torso
    (LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder),
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftHip),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightHip),
    (LandmarkIndex::LeftHip, LandmarkIndex::RightHip),
    // Left arm
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftElbow),
    (LandmarkIndex::LeftElbow, LandmarkIndex::LeftWrist),
    (LandmarkIndex::LeftWrist, LandmarkIndex::LeftPinky),
    (LandmarkIndex::LeftWrist, LandmarkIndex::LeftIndex),
    (LandmarkIndex::LeftWrist, LandmarkIndex::LeftThumb),
    (LandmarkIndex::LeftPinky, LandmarkIndex::LeftIndex),
    // Right arm
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightElbow),
    (LandmarkIndex::RightElbow, LandmarkIndex::RightWrist),
    (LandmarkIndex::RightWrist, LandmarkIndex::RightPinky),
    (LandmarkIndex::RightWrist, LandmarkIndex::RightIndex),
    (LandmarkIndex::RightWrist, LandmarkIndex::RightThumb),
    (LandmarkIndex::RightPinky, LandmarkIndex::RightIndex),
    // Left leg
    (LandmarkIndex::LeftHip, LandmarkIndex::LeftKnee),
    (LandmarkIndex::LeftKnee, LandmarkIndex::LeftAnkle),
    (LandmarkIndex::LeftAnkle, LandmarkIndex::LeftHeel),
    (LandmarkIndex::LeftHeel, LandmarkIndex::LeftFootIndex),
    (LandmarkIndex::LeftAnkle, LandmarkIndex::LeftFootIndex),
    // Right leg
    (LandmarkIndex::RightHip, LandmarkIndex::RightKnee),
    (LandmarkIndex::RightKnee, LandmarkIndex::RightAnkle),
    (LandmarkIndex::RightAnkle, LandmarkIndex::RightHeel),
    (LandmarkIndex::RightHeel, LandmarkIndex::RightFootIndex),
    (LandmarkIndex::RightAnkle, LandmarkIndex::RightFootIndex),
];

/// A landmark to draw, in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayPoint {
    /// Which landmark this is
    pub index: LandmarkIndex,
    /// Normalized horizontal position
    pub x: f64,
    /// Normalized vertical position
    pub y: f64,
}

impl OverlayPoint {
    /// Maps the point into a pixel surface of the given size.
    #[must_use]
    pub fn to_pixels(&self, width: u32, height: u32) -> (f64, f64) {
        (self.x * f64::from(width), self.y * f64::from(height))
    }
}

/// The angle readout anchored near the hip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLabel {
    /// Text to draw, e.g. `Back angle: 132.4°`
    pub text: String,
    /// Normalized anchor x (the hip position)
    pub x: f64,
    /// Normalized anchor y (the hip position)
    pub y: f64,
    /// Pixel offset applied to the anchor's vertical position
    pub offset_y_px: f64,
    /// Font size in pixels
    pub font_px: u32,
}

impl OverlayLabel {
    /// Resolves the anchor into pixel coordinates, offset applied.
    #[must_use]
    pub fn anchor_pixels(&self, width: u32, height: u32) -> (f64, f64) {
        (
            self.x * f64::from(width),
            self.y * f64::from(height) + self.offset_y_px,
        )
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFrame {
    /// Sequence number of the source frame
    pub seq: u64,
    /// Classified posture state
    pub state: PostureState,
    /// Stroke/fill color for the skeleton, as `#RRGGBB`
    pub color: &'static str,
    /// Landmarks present in the frame
    pub points: Vec<OverlayPoint>,
    /// Skeleton edges with both endpoints present
    pub segments: Vec<(LandmarkIndex, LandmarkIndex)>,
    /// Angle readout; absent when the angle or the hip is unavailable
    pub label: Option<OverlayLabel>,
}

impl OverlayFrame {
    /// Builds the overlay for one assessed frame.
    ///
    /// All present landmarks are drawn, including ones below the visibility
    /// floor; gating affects classification only.
    #[must_use]
    pub fn build(frame: &PoseFrame, assessment: &PostureAssessment) -> Self {
        let points = frame
            .iter_present()
            .map(|(index, landmark)| OverlayPoint {
                index,
                x: landmark.x,
                y: landmark.y,
            })
            .collect();

        let segments = BODY_CONNECTIONS
            .iter()
            .copied()
            .filter(|&(a, b)| frame.has(a) && frame.has(b))
            .collect();

        let label = match (assessment.hip_angle_degrees, frame.landmark(LandmarkIndex::LeftHip)) {
            (Some(angle), Some(hip)) => Some(OverlayLabel {
                text: format!("Back angle: {angle:.1}°"),
                x: hip.x,
                y: hip.y,
                offset_y_px: LABEL_OFFSET_Y_PX,
                font_px: LABEL_FONT_PX,
            }),
            _ => None,
        };

        Self {
            seq: assessment.seq,
            state: assessment.state,
            color: assessment.state.color_hex(),
            points,
            segments,
            label,
        }
    }

    /// Returns whether there is anything to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posturelens_core::{Landmark, PostureClassifier, LANDMARK_COUNT};

    fn triple_frame() -> PoseFrame {
        let mut landmarks = vec![None; LANDMARK_COUNT];
        landmarks[LandmarkIndex::LeftShoulder.index()] = Some(Landmark::new(0.5, 0.2));
        landmarks[LandmarkIndex::LeftHip.index()] = Some(Landmark::new(0.5, 0.6));
        landmarks[LandmarkIndex::LeftKnee.index()] = Some(Landmark::new(0.5, 0.9));
        PoseFrame::new(9, landmarks)
    }

    fn assess(frame: &PoseFrame) -> PostureAssessment {
        PostureClassifier::default().assess(frame)
    }

    #[test]
    fn test_build_collects_points_and_segments() {
        let frame = triple_frame();
        let overlay = OverlayFrame::build(&frame, &assess(&frame));

        assert_eq!(overlay.seq, 9);
        assert_eq!(overlay.points.len(), 3);
        // Only shoulder-hip and hip-knee have both endpoints.
        assert_eq!(overlay.segments.len(), 2);
        assert!(overlay
            .segments
            .contains(&(LandmarkIndex::LeftShoulder, LandmarkIndex::LeftHip)));
        assert!(overlay
            .segments
            .contains(&(LandmarkIndex::LeftHip, LandmarkIndex::LeftKnee)));
        assert!(!overlay.is_empty());
    }

    #[test]
    fn test_label_text_and_anchor() {
        let frame = triple_frame();
        let overlay = OverlayFrame::build(&frame, &assess(&frame));

        let label = overlay.label.expect("angle available");
        // Collinear shoulder-hip-knee reads 180.0.
        assert_eq!(label.text, "Back angle: 180.0°");
        assert_eq!(label.font_px, 16);

        let (x, y) = label.anchor_pixels(640, 480);
        assert!((x - 320.0).abs() < 1e-9);
        assert!((y - (288.0 - 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_state_colors() {
        let frame = triple_frame();
        let overlay = OverlayFrame::build(&frame, &assess(&frame));
        assert_eq!(overlay.state, PostureState::Upright);
        assert_eq!(overlay.color, "#00CFFF");

        let mut landmarks = vec![None; LANDMARK_COUNT];
        landmarks[LandmarkIndex::LeftShoulder.index()] = Some(Landmark::new(0.8, 0.55));
        landmarks[LandmarkIndex::LeftHip.index()] = Some(Landmark::new(0.5, 0.6));
        landmarks[LandmarkIndex::LeftKnee.index()] = Some(Landmark::new(0.5, 0.9));
        let bent = PoseFrame::new(10, landmarks);
        let overlay = OverlayFrame::build(&bent, &assess(&bent));
        assert_eq!(overlay.state, PostureState::Bent);
        assert_eq!(overlay.color, "#FF69B4");
    }

    #[test]
    fn test_empty_frame_renders_nothing() {
        let frame = PoseFrame::empty(1);
        let overlay = OverlayFrame::build(&frame, &assess(&frame));
        assert!(overlay.is_empty());
        assert!(overlay.segments.is_empty());
        assert!(overlay.label.is_none());
        assert_eq!(overlay.state, PostureState::Unknown);
        assert_eq!(overlay.color, "#9E9E9E");
    }

    #[test]
    fn test_label_requires_hip() {
        // Hip missing: no angle, no label, even with other points present.
        let mut landmarks = vec![None; LANDMARK_COUNT];
        landmarks[LandmarkIndex::LeftShoulder.index()] = Some(Landmark::new(0.5, 0.2));
        landmarks[LandmarkIndex::LeftKnee.index()] = Some(Landmark::new(0.5, 0.9));
        let frame = PoseFrame::new(2, landmarks);
        let overlay = OverlayFrame::build(&frame, &assess(&frame));
        assert!(overlay.label.is_none());
        assert_eq!(overlay.points.len(), 2);
    }

    #[test]
    fn test_point_to_pixels() {
        let point = OverlayPoint {
            index: LandmarkIndex::Nose,
            x: 0.25,
            y: 0.5,
        };
        assert_eq!(point.to_pixels(1280, 720), (320.0, 360.0));
    }

    #[test]
    fn test_overlay_serializes() {
        let frame = triple_frame();
        let overlay = OverlayFrame::build(&frame, &assess(&frame));
        let json = serde_json::to_string(&overlay).expect("serialize overlay");
        assert!(json.contains("\"color\":\"#00CFFF\""));
        assert!(json.contains("Back angle"));
    }

    #[test]
    fn test_connections_are_body_only() {
        for (a, b) in BODY_CONNECTIONS {
            assert!(!a.is_face(), "{} is a face landmark", a.name());
            assert!(!b.is_face(), "{} is a face landmark", b.name());
        }
    }
}
