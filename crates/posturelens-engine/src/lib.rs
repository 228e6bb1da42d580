//! # PostureLens Engine
//!
//! Session runtime for continuous posture monitoring.
//!
//! The engine pulls pose frames from a [`FrameSource`], classifies each one
//! with the core evaluator, fans the assessments out to [`AssessmentSink`]s,
//! and broadcasts session events to any subscribers.
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────────┐      ┌───────────────────┐      ┌─────────────────┐
//!  │ FrameSource  │─────►│ PostureEvaluator  │─────►│ AssessmentSinks │
//!  │  (replay,    │      │  (classifier +    │      │  (jsonl,        │
//!  │   synthetic, │      │   statistics)     │      │   memory, ...)  │
//!  │   channel)   │      └─────────┬─────────┘      └─────────────────┘
//!  └──────────────┘                │
//!                                  ▼
//!                        MonitorEvent broadcast
//!                    (state changes, sustained bend)
//! ```
//!
//! The loop is deliberately simple: read a frame, assess it, publish, sleep.
//! A shared stop flag ends the session between frames, and a frame budget or
//! source exhaustion does the same.
//!
//! ## Example
//!
//! ```rust,no_run
//! use posturelens_engine::{
//!     MemorySink, MonitorConfig, PostureMonitor, SyntheticConfig, SyntheticSource,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), posturelens_engine::EngineError> {
//!     let config = MonitorConfig::builder()
//!         .bend_threshold_degrees(140.0)
//!         .poll_interval_ms(0)
//!         .build();
//!
//!     let source = SyntheticSource::new(SyntheticConfig::new().with_frames(Some(240)));
//!     let mut monitor = PostureMonitor::new(config, source)?;
//!
//!     let sink = MemorySink::new();
//!     monitor.add_sink(sink.clone());
//!
//!     let summary = monitor.run().await?;
//!     println!(
//!         "{} frames, {} transitions",
//!         summary.statistics.frames_seen, summary.statistics.transitions
//!     );
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod evaluator;
pub mod events;
pub mod overlay;
pub mod sink;
pub mod source;

pub use evaluator::{EvaluatorConfig, PostureEvaluator, SessionStatistics, SessionSummary};
pub use events::MonitorEvent;
pub use overlay::{
    OverlayFrame, OverlayLabel, OverlayPoint, BODY_CONNECTIONS, LABEL_FONT_PX, LABEL_OFFSET_Y_PX,
};
pub use sink::{JsonlSink, MemorySink};
pub use source::{ChannelSource, JsonlReplaySource, SyntheticConfig, SyntheticSource};

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use posturelens_core::{
    AssessmentSink, CoreError, FrameSource, SessionId, DEFAULT_BEND_THRESHOLD_DEGREES,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Unified error type for engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Evaluation error from the core layer
    #[error("Evaluation error: {0}")]
    Core(#[from] CoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for a monitoring session
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Delay between frame reads in milliseconds; 0 disables pacing
    pub poll_interval_ms: u64,
    /// Hip angle below which posture reads as bent, in degrees
    pub bend_threshold_degrees: f64,
    /// Visibility floor below which a landmark reads as missing (0.0 = off)
    pub min_visibility: f32,
    /// Continuous bent time before a sustained-bend event fires, in ms
    pub sustained_bend_ms: u64,
    /// Maximum frames to evaluate; `None` runs until stopped or exhausted
    pub max_frames: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 33,
            bend_threshold_degrees: DEFAULT_BEND_THRESHOLD_DEGREES,
            min_visibility: 0.0,
            sustained_bend_ms: 5_000,
            max_frames: None,
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }
}

/// Builder for [`MonitorConfig`]
#[derive(Debug, Default)]
pub struct MonitorConfigBuilder {
    config: MonitorConfig,
}

impl MonitorConfigBuilder {
    /// Set the frame pacing interval; 0 disables pacing
    #[must_use]
    pub fn poll_interval_ms(mut self, interval: u64) -> Self {
        self.config.poll_interval_ms = interval;
        self
    }

    /// Set the bend threshold, clamped into (0, 180) degrees
    #[must_use]
    pub fn bend_threshold_degrees(mut self, degrees: f64) -> Self {
        self.config.bend_threshold_degrees = degrees.clamp(1.0, 179.0);
        self
    }

    /// Set the visibility floor, clamped into [0, 1]
    #[must_use]
    pub fn min_visibility(mut self, floor: f32) -> Self {
        self.config.min_visibility = floor.clamp(0.0, 1.0);
        self
    }

    /// Set the sustained-bend window in milliseconds
    #[must_use]
    pub fn sustained_bend_ms(mut self, window: u64) -> Self {
        self.config.sustained_bend_ms = window;
        self
    }

    /// Set the frame budget; `None` runs until stopped or exhausted
    #[must_use]
    pub fn max_frames(mut self, frames: Option<u64>) -> Self {
        self.config.max_frames = frames;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> MonitorConfig {
        self.config
    }
}

/// Clonable handle that stops a running session.
///
/// Stopping takes effect before the next frame is read; the frame being
/// processed still completes and reaches the sinks.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    /// Signals the session to stop.
    pub fn stop(&self) {
        use std::sync::atomic::Ordering;
        self.running.store(false, Ordering::SeqCst);
    }

    /// Returns whether the session is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        use std::sync::atomic::Ordering;
        self.running.load(Ordering::SeqCst)
    }
}

/// Main session coordinator
pub struct PostureMonitor {
    config: MonitorConfig,
    session_id: SessionId,
    source: Box<dyn FrameSource>,
    evaluator: PostureEvaluator,
    sinks: Vec<Box<dyn AssessmentSink>>,
    event_tx: broadcast::Sender<MonitorEvent>,
    running: Arc<AtomicBool>,
}

impl PostureMonitor {
    /// Creates a monitor reading from the given source.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration carries an invalid threshold
    /// or visibility floor. Configurations built through
    /// [`MonitorConfig::builder`] are always valid.
    pub fn new(config: MonitorConfig, source: impl FrameSource + 'static) -> Result<Self> {
        let evaluator = PostureEvaluator::new(EvaluatorConfig::from_monitor_config(&config))?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config,
            session_id: SessionId::new(),
            source: Box::new(source),
            evaluator,
            sinks: Vec::new(),
            event_tx,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Registers a sink to receive every assessment.
    pub fn add_sink(&mut self, sink: impl AssessmentSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Subscribes to session events.
    ///
    /// Events are dropped for subscribers that lag behind the channel
    /// capacity; assessments delivered to sinks are never dropped.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    /// Returns a handle that can stop the session from another task.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Returns the session identity.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Returns the statistics accumulated so far.
    #[must_use]
    pub fn statistics(&self) -> &SessionStatistics {
        self.evaluator.statistics()
    }

    /// Returns whether a session is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        use std::sync::atomic::Ordering;
        self.running.load(Ordering::SeqCst)
    }

    /// Signals the running session to stop before its next frame.
    pub fn stop(&self) {
        use std::sync::atomic::Ordering;
        self.running.store(false, Ordering::SeqCst);
    }

    /// Runs the session to completion.
    ///
    /// Each call starts a fresh session: statistics and bend-episode
    /// tracking are cleared before the first frame is read, so a rerun
    /// reports only its own frames.
    ///
    /// The loop ends when the source is exhausted, the frame budget is
    /// reached, or the stop flag is cleared. Source and sink failures end
    /// the session with an error; already-published assessments stay
    /// published.
    ///
    /// # Errors
    ///
    /// Returns the first source or sink error encountered.
    pub async fn run(&mut self) -> Result<SessionSummary> {
        use std::sync::atomic::Ordering;

        self.evaluator.reset();
        self.running.store(true, Ordering::SeqCst);
        let started_at = Utc::now();
        info!(
            session = %self.session_id,
            source = self.source.name(),
            "session started"
        );

        let outcome = self.drive().await;
        self.running.store(false, Ordering::SeqCst);

        match outcome {
            Ok(()) => {
                for sink in &mut self.sinks {
                    sink.flush().await?;
                }

                let summary = SessionSummary {
                    session_id: self.session_id,
                    started_at,
                    ended_at: Utc::now(),
                    statistics: self.evaluator.statistics().clone(),
                };
                let _ = self.event_tx.send(MonitorEvent::SessionEnded {
                    summary: summary.clone(),
                });
                info!(
                    session = %self.session_id,
                    frames = summary.statistics.frames_seen,
                    transitions = summary.statistics.transitions,
                    "session ended"
                );
                Ok(summary)
            }
            Err(e) => {
                warn!(session = %self.session_id, error = %e, "session failed");
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> Result<()> {
        use std::sync::atomic::Ordering;

        while self.running.load(Ordering::SeqCst) {
            if let Some(budget) = self.config.max_frames {
                if self.evaluator.statistics().frames_seen >= budget {
                    debug!(frames = budget, "frame budget reached");
                    break;
                }
            }

            let frame = match self.source.next_frame().await? {
                Some(frame) => frame,
                None => {
                    debug!("source exhausted");
                    break;
                }
            };

            let (assessment, events) = self.evaluator.process(&frame);
            for sink in &mut self.sinks {
                sink.publish(&assessment).await?;
            }
            for event in events {
                let _ = self.event_tx.send(event);
            }

            if self.config.poll_interval_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(
                    self.config.poll_interval_ms,
                ))
                .await;
            }
        }

        Ok(())
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ChannelSource, EngineError, EvaluatorConfig, JsonlReplaySource, JsonlSink, MemorySink,
        MonitorConfig, MonitorConfigBuilder, MonitorEvent, OverlayFrame, PostureEvaluator,
        PostureMonitor, Result, SessionStatistics, SessionSummary, StopHandle, SyntheticConfig,
        SyntheticSource,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval_ms, 33);
        assert!((config.bend_threshold_degrees - 140.0).abs() < 1e-12);
        assert_eq!(config.min_visibility, 0.0);
        assert_eq!(config.sustained_bend_ms, 5_000);
        assert_eq!(config.max_frames, None);
    }

    #[test]
    fn test_builder_clamps() {
        let config = MonitorConfig::builder()
            .poll_interval_ms(0)
            .bend_threshold_degrees(400.0)
            .min_visibility(-2.0)
            .max_frames(Some(10))
            .build();
        assert_eq!(config.poll_interval_ms, 0);
        assert!((config.bend_threshold_degrees - 179.0).abs() < 1e-12);
        assert_eq!(config.min_visibility, 0.0);
        assert_eq!(config.max_frames, Some(10));

        let config = MonitorConfig::builder().bend_threshold_degrees(-30.0).build();
        assert!((config.bend_threshold_degrees - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_monitor_rejects_invalid_raw_config() {
        let config = MonitorConfig {
            bend_threshold_degrees: f64::NAN,
            ..MonitorConfig::default()
        };
        let source = SyntheticSource::new(SyntheticConfig::default());
        assert!(PostureMonitor::new(config, source).is_err());
    }

    #[tokio::test]
    async fn test_run_to_budget() {
        let config = MonitorConfig::builder()
            .poll_interval_ms(0)
            .max_frames(Some(7))
            .build();
        let source = SyntheticSource::new(SyntheticConfig::new().with_frames(None));
        let mut monitor = PostureMonitor::new(config, source).expect("valid config");

        let sink = MemorySink::new();
        monitor.add_sink(sink.clone());

        let summary = monitor.run().await.expect("session runs");
        assert_eq!(summary.statistics.frames_seen, 7);
        assert_eq!(sink.len(), 7);
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn test_run_to_source_exhaustion() {
        let config = MonitorConfig::builder().poll_interval_ms(0).build();
        let source = SyntheticSource::new(SyntheticConfig::new().with_frames(Some(12)));
        let mut monitor = PostureMonitor::new(config, source).expect("valid config");

        let summary = monitor.run().await.expect("session runs");
        assert_eq!(summary.statistics.frames_seen, 12);
        assert!(summary.duration_ms() >= 0);
    }

    #[tokio::test]
    async fn test_rerun_starts_with_fresh_statistics() {
        let config = MonitorConfig::builder().poll_interval_ms(0).build();
        let source = SyntheticSource::new(SyntheticConfig::new().with_frames(Some(5)));
        let mut monitor = PostureMonitor::new(config, source).expect("valid config");

        let first = monitor.run().await.expect("first session runs");
        assert_eq!(first.statistics.frames_seen, 5);

        // The source stays exhausted; the rerun must report only itself,
        // not the previous session's frames.
        let second = monitor.run().await.expect("second session runs");
        assert_eq!(second.statistics.frames_seen, 0);
        assert_eq!(second.statistics.transitions, 0);
        assert_eq!(second.statistics.mean_angle_degrees, None);
    }

    #[tokio::test]
    async fn test_session_ended_event() {
        let config = MonitorConfig::builder()
            .poll_interval_ms(0)
            .max_frames(Some(3))
            .build();
        let source = SyntheticSource::new(SyntheticConfig::default());
        let mut monitor = PostureMonitor::new(config, source).expect("valid config");
        let mut events = monitor.subscribe();

        monitor.run().await.expect("session runs");

        let mut saw_session_end = false;
        while let Ok(event) = events.try_recv() {
            if let MonitorEvent::SessionEnded { summary } = event {
                assert_eq!(summary.statistics.frames_seen, 3);
                saw_session_end = true;
            }
        }
        assert!(saw_session_end);
    }

    #[tokio::test]
    async fn test_stop_handle_ends_infinite_session() {
        let config = MonitorConfig::builder().poll_interval_ms(1).build();
        let source = SyntheticSource::new(SyntheticConfig::new().with_frames(None));
        let mut monitor = PostureMonitor::new(config, source).expect("valid config");

        let handle = monitor.stop_handle();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            handle.stop();
        });

        let summary = monitor.run().await.expect("session stops cleanly");
        assert!(summary.statistics.frames_seen > 0);
        assert!(!monitor.is_running());
    }
}
