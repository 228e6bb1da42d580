//! Core trait definitions for PostureLens.
//!
//! Two seams keep the pipeline modular and testable:
//!
//! - [`FrameSource`]: where landmark frames come from (replay files,
//!   synthetic generators, live channels)
//! - [`AssessmentSink`]: where per-frame assessments go (JSONL writers,
//!   in-memory collectors, progress displays)
//!
//! Both are async: real sources wait on I/O or channels between frames.
//! A source is pulled by a single consumer through `&mut self`, so the
//! traits require `Send` but not `Sync`.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::posture::PostureAssessment;
use crate::types::PoseFrame;

/// A pull-based supplier of landmark frames.
#[async_trait]
pub trait FrameSource: Send {
    /// Short human-readable name for logs.
    fn name(&self) -> &str;

    /// Returns the next frame, or `None` when the source is exhausted.
    ///
    /// Exhaustion is the clean end of a session (file EOF, channel closed,
    /// frame budget reached), not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the carrier fails: unreadable input, or bytes
    /// that do not decode to a frame.
    async fn next_frame(&mut self) -> CoreResult<Option<PoseFrame>>;
}

/// A consumer of per-frame assessments.
#[async_trait]
pub trait AssessmentSink: Send {
    /// Short human-readable name for logs.
    fn name(&self) -> &str;

    /// Publishes one assessment.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination rejects the write.
    async fn publish(&mut self, assessment: &PostureAssessment) -> CoreResult<()>;

    /// Flushes any buffered output.
    ///
    /// The default implementation does nothing; buffered sinks override it.
    ///
    /// # Errors
    ///
    /// Returns an error when flushing the destination fails.
    async fn flush(&mut self) -> CoreResult<()> {
        Ok(())
    }
}
