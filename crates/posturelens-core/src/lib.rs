//! # PostureLens Core
//!
//! Core types, landmark convention, and hip-angle geometry for the
//! PostureLens posture monitoring system.
//!
//! This crate provides the foundational building blocks used throughout the
//! PostureLens workspace, including:
//!
//! - **Core Data Types**: [`PoseFrame`], [`Landmark`], [`LandmarkIndex`],
//!   and [`PostureAssessment`] for representing detector output and
//!   evaluation results.
//!
//! - **Geometry**: [`joint_angle_degrees`], the clamped interior-angle
//!   computation everything else is built on.
//!
//! - **Classification**: [`PostureState`] and [`PostureClassifier`] for the
//!   bent/upright/unknown decision against the bend threshold.
//!
//! - **Traits**: [`FrameSource`] and [`AssessmentSink`], the seams between
//!   the evaluator and its carriers.
//!
//! - **Error Types**: structured error handling via the [`error`] module.
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialization/deserialization via serde
//!
//! ## Example
//!
//! ```rust
//! use posturelens_core::{
//!     classify_posture, joint_angle_degrees, Point2D, PostureState,
//!     DEFAULT_BEND_THRESHOLD_DEGREES,
//! };
//!
//! let shoulder = Point2D::new(0.0, 1.0);
//! let hip = Point2D::new(0.0, 0.0);
//! let knee = Point2D::new(1.0, 0.0);
//!
//! let angle = joint_angle_degrees(shoulder, hip, knee);
//! assert!(angle.is_some());
//! assert_eq!(
//!     classify_posture(angle, DEFAULT_BEND_THRESHOLD_DEGREES),
//!     PostureState::Bent,
//! );
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod posture;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types at the crate root
pub use error::{CoreError, CoreResult};
pub use geometry::joint_angle_degrees;
pub use posture::{classify_posture, PostureAssessment, PostureClassifier, PostureState};
pub use traits::{AssessmentSink, FrameSource};
pub use types::{Confidence, Landmark, LandmarkIndex, Point2D, PoseFrame, SessionId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of landmarks in the skeletal convention
pub const LANDMARK_COUNT: usize = 33;

/// Default bend threshold: hip angles below this classify as bent
pub const DEFAULT_BEND_THRESHOLD_DEGREES: f64 = 140.0;

/// Default visibility threshold for [`Confidence::is_high`]
pub const DEFAULT_VISIBILITY_THRESHOLD: f32 = 0.5;

/// Prelude module for convenient imports.
///
/// Convenient re-exports of commonly used types and traits.
///
/// ```rust
/// use posturelens_core::prelude::*;
/// ```
pub mod prelude {

    pub use crate::error::{CoreError, CoreResult};
    pub use crate::geometry::joint_angle_degrees;
    pub use crate::posture::{
        classify_posture, PostureAssessment, PostureClassifier, PostureState,
    };
    pub use crate::traits::{AssessmentSink, FrameSource};
    pub use crate::types::{
        Confidence, Landmark, LandmarkIndex, Point2D, PoseFrame, SessionId,
    };
    pub use crate::{DEFAULT_BEND_THRESHOLD_DEGREES, LANDMARK_COUNT};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_valid() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_constants() {
        assert_eq!(LANDMARK_COUNT, 33);
        assert!(DEFAULT_BEND_THRESHOLD_DEGREES > 0.0);
        assert!(DEFAULT_BEND_THRESHOLD_DEGREES < 180.0);
        assert!(DEFAULT_VISIBILITY_THRESHOLD > 0.0);
        assert!(DEFAULT_VISIBILITY_THRESHOLD < 1.0);
    }
}
