//! Assessment sinks.
//!
//! Sinks receive every assessment the monitor produces, in order. A sink
//! failure fails the session; event broadcast, by contrast, is best effort.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use posturelens_core::{AssessmentSink, CoreError, CoreResult, PostureAssessment};

use crate::Result;

/// Writes assessments as JSON lines.
pub struct JsonlSink<W> {
    writer: W,
}

impl JsonlSink<BufWriter<File>> {
    /// Creates (or truncates) a JSONL file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> JsonlSink<W> {
    /// Wraps an arbitrary writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the inner writer, flushing first.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[async_trait]
impl<W: Write + Send> AssessmentSink for JsonlSink<W> {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn publish(&mut self, assessment: &PostureAssessment) -> CoreResult<()> {
        let json = serde_json::to_string(assessment)
            .map_err(|e| CoreError::serialization(e.to_string()))?;
        writeln!(self.writer, "{json}").map_err(|e| CoreError::io(e.to_string()))
    }

    async fn flush(&mut self) -> CoreResult<()> {
        self.writer.flush().map_err(|e| CoreError::io(e.to_string()))
    }
}

/// Collects assessments in memory.
///
/// Clones share the same buffer, so a handle kept outside the monitor sees
/// everything published inside it.
#[derive(Clone, Default)]
pub struct MemorySink {
    assessments: Arc<Mutex<Vec<PostureAssessment>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything published so far.
    #[must_use]
    pub fn collected(&self) -> Vec<PostureAssessment> {
        match self.assessments.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the number of assessments published so far.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.assessments.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Returns whether nothing has been published yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AssessmentSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn publish(&mut self, assessment: &PostureAssessment) -> CoreResult<()> {
        match self.assessments.lock() {
            Ok(mut guard) => guard.push(*assessment),
            Err(poisoned) => poisoned.into_inner().push(*assessment),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use posturelens_core::PostureState;

    fn assessment(seq: u64) -> PostureAssessment {
        PostureAssessment {
            seq,
            timestamp: Utc::now(),
            hip_angle_degrees: Some(123.456),
            state: PostureState::Bent,
        }
    }

    #[tokio::test]
    async fn test_jsonl_sink_writes_one_line_per_assessment() {
        let mut sink = JsonlSink::new(Vec::new());
        sink.publish(&assessment(1)).await.unwrap();
        sink.publish(&assessment(2)).await.unwrap();
        sink.flush().await.unwrap();

        let buffer = sink.into_inner().unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"seq\":1"));
        assert!(lines[1].contains("\"seq\":2"));
        assert!(lines[0].contains("\"state\":\"bent\""));
    }

    #[tokio::test]
    async fn test_memory_sink_shares_buffer_across_clones() {
        let sink = MemorySink::new();
        let mut handle = sink.clone();
        assert!(sink.is_empty());

        handle.publish(&assessment(1)).await.unwrap();
        handle.publish(&assessment(2)).await.unwrap();

        assert_eq!(sink.len(), 2);
        let collected = sink.collected();
        assert_eq!(collected[0].seq, 1);
        assert_eq!(collected[1].seq, 2);
    }
}
