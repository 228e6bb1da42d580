//! Frame sources: JSONL replay, synthetic sweeps, and live channels.

use std::f64::consts::TAU;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;
use tracing::debug;

use posturelens_core::utils::lerp;
use posturelens_core::{
    CoreError, CoreResult, FrameSource, Landmark, LandmarkIndex, PoseFrame, LANDMARK_COUNT,
};

use crate::Result;

/// Replays pose frames from a JSONL stream, one frame per line.
///
/// Blank lines are skipped. A malformed line fails the read with a decode
/// error naming the line number. Frames may omit `seq` (or carry zero); such
/// frames are assigned sequence numbers from the emission count.
pub struct JsonlReplaySource<R> {
    reader: R,
    name: String,
    line_no: usize,
    emitted: u64,
}

impl JsonlReplaySource<BufReader<File>> {
    /// Opens a JSONL file for replay.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::with_name(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }
}

impl<R: BufRead + Send> JsonlReplaySource<R> {
    /// Wraps an arbitrary buffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self::with_name(reader, "jsonl-replay".to_string())
    }

    fn with_name(reader: R, name: String) -> Self {
        Self {
            reader,
            name,
            line_no: 0,
            emitted: 0,
        }
    }
}

#[async_trait]
impl<R: BufRead + Send> FrameSource for JsonlReplaySource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_frame(&mut self) -> CoreResult<Option<PoseFrame>> {
        let mut line = String::new();
        loop {
            line.clear();
            self.line_no += 1;
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| CoreError::io(e.to_string()))?;
            if read == 0 {
                debug!(source = %self.name, frames = self.emitted, "replay exhausted");
                return Ok(None);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let mut frame: PoseFrame = serde_json::from_str(trimmed).map_err(|e| {
                CoreError::decode(format!("line {}", self.line_no), e.to_string())
            })?;
            self.emitted += 1;
            if frame.seq == 0 {
                frame.seq = self.emitted;
            }
            return Ok(Some(frame));
        }
    }
}

/// Configuration for [`SyntheticSource`].
#[derive(Debug, Clone, Copy)]
pub struct SyntheticConfig {
    /// Number of frames to emit; `None` runs until stopped
    pub frames: Option<u64>,
    /// Frames per full bend-and-recover cycle
    pub period_frames: u64,
    /// Hip angle at the deepest bend, in degrees
    pub min_angle_degrees: f64,
    /// Hip angle when fully upright, in degrees
    pub max_angle_degrees: f64,
    /// Spacing between frame timestamps, in milliseconds
    pub frame_interval_ms: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            frames: Some(300),
            period_frames: 120,
            min_angle_degrees: 100.0,
            max_angle_degrees: 175.0,
            frame_interval_ms: 33,
        }
    }
}

impl SyntheticConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the frame budget. `None` runs until stopped.
    #[must_use]
    pub fn with_frames(mut self, frames: Option<u64>) -> Self {
        self.frames = frames;
        self
    }

    /// Sets the cycle length, floored at 2 frames.
    #[must_use]
    pub fn with_period_frames(mut self, period: u64) -> Self {
        self.period_frames = period.max(2);
        self
    }

    /// Sets the angle sweep range, clamped into (0, 180) and reordered
    /// so the minimum does not exceed the maximum.
    #[must_use]
    pub fn with_angle_range(mut self, min_degrees: f64, max_degrees: f64) -> Self {
        let lo = min_degrees.clamp(1.0, 179.0);
        let hi = max_degrees.clamp(1.0, 179.0);
        self.min_angle_degrees = lo.min(hi);
        self.max_angle_degrees = lo.max(hi);
        self
    }

    /// Sets the timestamp spacing in milliseconds.
    #[must_use]
    pub fn with_frame_interval_ms(mut self, interval_ms: u64) -> Self {
        self.frame_interval_ms = interval_ms;
        self
    }
}

/// Emits a deterministic bend-and-recover sweep.
///
/// The body starts upright at the maximum angle, bends smoothly to the
/// minimum at mid-cycle, and recovers. Only the shoulder, hip, and knee
/// landmarks are populated. Timestamps advance by a fixed interval from
/// the construction instant, so replays of the same configuration produce
/// identical event sequences.
pub struct SyntheticSource {
    config: SyntheticConfig,
    base: DateTime<Utc>,
    seq: u64,
}

impl SyntheticSource {
    /// Creates a source from a configuration.
    #[must_use]
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            base: Utc::now(),
            seq: 0,
        }
    }

    fn angle_for(&self, seq: u64) -> f64 {
        let period = self.config.period_frames.max(2);
        #[allow(clippy::cast_precision_loss)]
        let phase = TAU * ((seq % period) as f64) / (period as f64);
        // Cosine sweep: hi at phase 0, lo at mid-cycle.
        lerp(
            self.config.min_angle_degrees,
            self.config.max_angle_degrees,
            (1.0 + phase.cos()) / 2.0,
        )
    }

    fn frame_for(&self, seq: u64) -> PoseFrame {
        let theta = self.angle_for(seq).to_radians();
        let hip = (0.5, 0.6);
        let knee = (hip.0, hip.1 + 0.3);
        let shoulder = (hip.0 + 0.35 * theta.sin(), hip.1 + 0.35 * theta.cos());

        let mut landmarks = vec![None; LANDMARK_COUNT];
        landmarks[LandmarkIndex::LeftShoulder.index()] =
            Some(Landmark::new(shoulder.0, shoulder.1));
        landmarks[LandmarkIndex::LeftHip.index()] = Some(Landmark::new(hip.0, hip.1));
        landmarks[LandmarkIndex::LeftKnee.index()] = Some(Landmark::new(knee.0, knee.1));

        let offset_ms = i64::try_from(seq.saturating_mul(self.config.frame_interval_ms))
            .unwrap_or(i64::MAX);
        PoseFrame::new(seq + 1, landmarks)
            .with_timestamp(self.base + Duration::milliseconds(offset_ms))
    }
}

#[async_trait]
impl FrameSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn next_frame(&mut self) -> CoreResult<Option<PoseFrame>> {
        if let Some(budget) = self.config.frames {
            if self.seq >= budget {
                debug!(frames = self.seq, "synthetic sweep complete");
                return Ok(None);
            }
        }
        let frame = self.frame_for(self.seq);
        self.seq += 1;
        Ok(Some(frame))
    }
}

/// Adapts a bounded channel into a frame source.
///
/// A live capture process pushes frames through the sender half; the
/// monitor pulls them here. Dropping all senders ends the session cleanly.
pub struct ChannelSource {
    receiver: mpsc::Receiver<PoseFrame>,
}

impl ChannelSource {
    /// Wraps an existing receiver.
    #[must_use]
    pub fn new(receiver: mpsc::Receiver<PoseFrame>) -> Self {
        Self { receiver }
    }

    /// Creates a bounded channel and the source reading from it.
    #[must_use]
    pub fn channel(buffer: usize) -> (mpsc::Sender<PoseFrame>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl FrameSource for ChannelSource {
    fn name(&self) -> &str {
        "channel"
    }

    async fn next_frame(&mut self) -> CoreResult<Option<PoseFrame>> {
        Ok(self.receiver.recv().await)
    }
}
