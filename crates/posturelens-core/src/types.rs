//! Core data types for PostureLens.
//!
//! This module defines the fundamental data structures used throughout the
//! workspace for representing pose-landmark frames and the identities
//! attached to them.
//!
//! # Type Categories
//!
//! - **Common Types**: [`SessionId`], [`Confidence`]
//! - **Geometry Primitives**: [`Point2D`]
//! - **Landmark Types**: [`LandmarkIndex`], [`Landmark`], [`PoseFrame`]

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::{DEFAULT_VISIBILITY_THRESHOLD, LANDMARK_COUNT};

// =============================================================================
// Common Types
// =============================================================================

/// Unique identifier for a monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new unique session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a session ID from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Detection confidence (visibility) score in the range [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Confidence(f32);

impl Confidence {
    /// Creates a new confidence value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range [0.0, 1.0].
    pub fn new(value: f32) -> CoreResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(CoreError::validation(format!(
                "Confidence must be in [0.0, 1.0], got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Creates a confidence value without validation (for internal use).
    ///
    /// # Safety
    ///
    /// The caller must ensure the value is in [0.0, 1.0].
    #[must_use]
    #[allow(dead_code)]
    pub(crate) fn new_unchecked(value: f32) -> Self {
        debug_assert!((0.0..=1.0).contains(&value));
        Self(value)
    }

    /// Returns the raw confidence value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.0
    }

    /// Returns `true` if the confidence exceeds the default threshold.
    #[must_use]
    pub fn is_high(&self) -> bool {
        self.0 >= DEFAULT_VISIBILITY_THRESHOLD
    }

    /// Returns `true` if the confidence exceeds the given threshold.
    #[must_use]
    pub fn exceeds(&self, threshold: f32) -> bool {
        self.0 >= threshold
    }

    /// Maximum confidence (1.0).
    pub const MAX: Self = Self(1.0);

    /// Minimum confidence (0.0).
    pub const MIN: Self = Self(0.0);
}

impl Default for Confidence {
    fn default() -> Self {
        Self(0.0)
    }
}

// =============================================================================
// Geometry Primitives
// =============================================================================

/// A 2D point in frame-normalized coordinates.
///
/// Coordinates are typically in [0, 1] relative to the video frame, but no
/// range is enforced; the angle math is agnostic to scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point2D {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate (image convention: grows downward)
    pub y: f64,
}

impl Point2D {
    /// Creates a new point.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Calculates the Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        crate::utils::euclidean_distance((self.x, self.y), (other.x, other.y))
    }
}

impl std::fmt::Display for Point2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

// =============================================================================
// Landmark Types
// =============================================================================

/// Landmark indices of the 33-point full-body skeletal convention.
///
/// The external detector emits landmarks in this fixed order; the hip-angle
/// evaluation consumes [`LeftShoulder`](Self::LeftShoulder) (11),
/// [`LeftHip`](Self::LeftHip) (23), and [`LeftKnee`](Self::LeftKnee) (25).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LandmarkIndex {
    /// Nose
    Nose = 0,
    /// Left eye (inner)
    LeftEyeInner = 1,
    /// Left eye
    LeftEye = 2,
    /// Left eye (outer)
    LeftEyeOuter = 3,
    /// Right eye (inner)
    RightEyeInner = 4,
    /// Right eye
    RightEye = 5,
    /// Right eye (outer)
    RightEyeOuter = 6,
    /// Left ear
    LeftEar = 7,
    /// Right ear
    RightEar = 8,
    /// Mouth (left corner)
    MouthLeft = 9,
    /// Mouth (right corner)
    MouthRight = 10,
    /// Left shoulder
    LeftShoulder = 11,
    /// Right shoulder
    RightShoulder = 12,
    /// Left elbow
    LeftElbow = 13,
    /// Right elbow
    RightElbow = 14,
    /// Left wrist
    LeftWrist = 15,
    /// Right wrist
    RightWrist = 16,
    /// Left pinky knuckle
    LeftPinky = 17,
    /// Right pinky knuckle
    RightPinky = 18,
    /// Left index knuckle
    LeftIndex = 19,
    /// Right index knuckle
    RightIndex = 20,
    /// Left thumb knuckle
    LeftThumb = 21,
    /// Right thumb knuckle
    RightThumb = 22,
    /// Left hip
    LeftHip = 23,
    /// Right hip
    RightHip = 24,
    /// Left knee
    LeftKnee = 25,
    /// Right knee
    RightKnee = 26,
    /// Left ankle
    LeftAnkle = 27,
    /// Right ankle
    RightAnkle = 28,
    /// Left heel
    LeftHeel = 29,
    /// Right heel
    RightHeel = 30,
    /// Left foot index (toe)
    LeftFootIndex = 31,
    /// Right foot index (toe)
    RightFootIndex = 32,
}

impl LandmarkIndex {
    /// Returns all landmark indices in convention order.
    #[must_use]
    pub fn all() -> &'static [Self; LANDMARK_COUNT] {
        &[
            Self::Nose,
            Self::LeftEyeInner,
            Self::LeftEye,
            Self::LeftEyeOuter,
            Self::RightEyeInner,
            Self::RightEye,
            Self::RightEyeOuter,
            Self::LeftEar,
            Self::RightEar,
            Self::MouthLeft,
            Self::MouthRight,
            Self::LeftShoulder,
            Self::RightShoulder,
            Self::LeftElbow,
            Self::RightElbow,
            Self::LeftWrist,
            Self::RightWrist,
            Self::LeftPinky,
            Self::RightPinky,
            Self::LeftIndex,
            Self::RightIndex,
            Self::LeftThumb,
            Self::RightThumb,
            Self::LeftHip,
            Self::RightHip,
            Self::LeftKnee,
            Self::RightKnee,
            Self::LeftAnkle,
            Self::RightAnkle,
            Self::LeftHeel,
            Self::RightHeel,
            Self::LeftFootIndex,
            Self::RightFootIndex,
        ]
    }

    /// Returns the landmark name as a string.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }

    /// Returns the position of this landmark in the convention order.
    #[must_use]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Returns `true` if this is a face landmark.
    #[must_use]
    pub fn is_face(&self) -> bool {
        (*self as u8) <= Self::MouthRight as u8
    }

    /// Returns `true` if this is an upper body landmark.
    #[must_use]
    pub fn is_upper_body(&self) -> bool {
        let index = *self as u8;
        index >= Self::LeftShoulder as u8 && index <= Self::RightThumb as u8
    }

    /// Returns `true` if this is a lower body landmark.
    #[must_use]
    pub fn is_lower_body(&self) -> bool {
        (*self as u8) >= Self::LeftHip as u8
    }
}

impl TryFrom<u8> for LandmarkIndex {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Nose),
            1 => Ok(Self::LeftEyeInner),
            2 => Ok(Self::LeftEye),
            3 => Ok(Self::LeftEyeOuter),
            4 => Ok(Self::RightEyeInner),
            5 => Ok(Self::RightEye),
            6 => Ok(Self::RightEyeOuter),
            7 => Ok(Self::LeftEar),
            8 => Ok(Self::RightEar),
            9 => Ok(Self::MouthLeft),
            10 => Ok(Self::MouthRight),
            11 => Ok(Self::LeftShoulder),
            12 => Ok(Self::RightShoulder),
            13 => Ok(Self::LeftElbow),
            14 => Ok(Self::RightElbow),
            15 => Ok(Self::LeftWrist),
            16 => Ok(Self::RightWrist),
            17 => Ok(Self::LeftPinky),
            18 => Ok(Self::RightPinky),
            19 => Ok(Self::LeftIndex),
            20 => Ok(Self::RightIndex),
            21 => Ok(Self::LeftThumb),
            22 => Ok(Self::RightThumb),
            23 => Ok(Self::LeftHip),
            24 => Ok(Self::RightHip),
            25 => Ok(Self::LeftKnee),
            26 => Ok(Self::RightKnee),
            27 => Ok(Self::LeftAnkle),
            28 => Ok(Self::RightAnkle),
            29 => Ok(Self::LeftHeel),
            30 => Ok(Self::RightHeel),
            31 => Ok(Self::LeftFootIndex),
            32 => Ok(Self::RightFootIndex),
            _ => Err(CoreError::InvalidLandmarkIndex { index: value }),
        }
    }
}

/// A single tracked body landmark.
///
/// `x` and `y` are frame-normalized coordinates. Depth and visibility are
/// carried when the detector provides them but are ignored by the angle
/// math, which is strictly 2D.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Landmark {
    /// Horizontal coordinate (normalized)
    pub x: f64,
    /// Vertical coordinate (normalized)
    pub y: f64,
    /// Depth coordinate, if the detector provides one
    #[cfg_attr(feature = "serde", serde(default))]
    pub z: Option<f64>,
    /// Detection visibility, if the detector provides one
    #[cfg_attr(feature = "serde", serde(default))]
    pub visibility: Option<Confidence>,
}

impl Landmark {
    /// Creates a new 2D landmark.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    /// Attaches a depth coordinate.
    #[must_use]
    pub fn with_depth(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    /// Attaches a visibility score.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Confidence) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Returns the 2D position.
    #[must_use]
    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Returns the 2D position as a tuple.
    #[must_use]
    pub fn position_2d(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Returns `true` if this landmark should be considered visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visibility.map_or(true, |v| v.is_high())
    }

    /// Returns `true` if this landmark meets the given visibility floor.
    ///
    /// A landmark without a visibility score always passes: the detector did
    /// not flag it, so there is nothing to gate on.
    #[must_use]
    pub fn meets_visibility(&self, floor: f32) -> bool {
        self.visibility.map_or(true, |v| v.exceeds(floor))
    }

    /// Calculates the 2D Euclidean distance to another landmark.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        crate::utils::euclidean_distance((self.x, self.y), (other.x, other.y))
    }
}

#[cfg(feature = "serde")]
fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// One body's landmark set for one frame.
///
/// Landmarks are stored in convention order. A slot may be `None` (the
/// detector suppressed that landmark) and the whole sequence may be shorter
/// than [`LANDMARK_COUNT`]; both read as "missing" through
/// [`landmark`](Self::landmark). The detector runs in single-pose mode, so
/// one frame carries exactly one body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseFrame {
    /// Monotonic frame sequence number within a session
    #[cfg_attr(feature = "serde", serde(default))]
    pub seq: u64,
    /// Capture timestamp
    #[cfg_attr(feature = "serde", serde(default = "default_timestamp"))]
    pub timestamp: DateTime<Utc>,
    /// Landmarks in convention order
    pub landmarks: Vec<Option<Landmark>>,
}

impl PoseFrame {
    /// Creates a new frame timestamped now.
    #[must_use]
    pub fn new(seq: u64, landmarks: Vec<Option<Landmark>>) -> Self {
        Self {
            seq,
            timestamp: Utc::now(),
            landmarks,
        }
    }

    /// Creates an empty frame (no landmarks detected).
    #[must_use]
    pub fn empty(seq: u64) -> Self {
        Self::new(seq, Vec::new())
    }

    /// Sets the capture timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns the landmark at the given index, if present.
    #[must_use]
    pub fn landmark(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.landmarks.get(index.index()).and_then(Option::as_ref)
    }

    /// Returns `true` if the landmark at the given index is present.
    #[must_use]
    pub fn has(&self, index: LandmarkIndex) -> bool {
        self.landmark(index).is_some()
    }

    /// Returns the number of present landmarks.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.landmarks.iter().filter(|l| l.is_some()).count()
    }

    /// Returns `true` if no landmarks are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }

    /// Iterates over present landmarks with their convention indices.
    ///
    /// Slots beyond the convention range are ignored.
    pub fn iter_present(&self) -> impl Iterator<Item = (LandmarkIndex, &Landmark)> {
        self.landmarks
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let index = u8::try_from(i).ok().and_then(|i| LandmarkIndex::try_from(i).ok())?;
                slot.as_ref().map(|landmark| (index, landmark))
            })
    }
}
