//! Progress reporting for long-running operations.
//!
//! Batch transformations and template extraction report their checkpoints to
//! a [`ProgressSink`] handed in by the caller. The library ships a sink that
//! forwards to `tracing` and one that discards everything; the CLI provides a
//! colored console sink.

use std::sync::Mutex;

use tracing::{debug, info, warn};

/// Checkpoint a progress event was emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  PageQueued,
  PageStarted,
  PageRead,
  SectionTransformed,
  PageWritten,
  PageFailed,
  TemplateStep,
}

/// A single progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
  pub stage: Stage,
  pub message: String,
  /// One-based position of the unit of work.
  pub progress: usize,
  /// Total number of units of work at this level.
  pub total: usize,
}

impl ProgressEvent {
  pub fn new(stage: Stage, message: impl Into<String>, progress: usize, total: usize) -> Self {
    Self {
      stage,
      message: message.into(),
      progress,
      total,
    }
  }
}

/// Receiver of progress events. Implementations must tolerate concurrent
/// calls from batch workers.
pub trait ProgressSink: Send + Sync {
  fn on_event(&self, event: &ProgressEvent);
}

/// Sink that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
  fn on_event(&self, _event: &ProgressEvent) {}
}

/// Sink that writes events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
  fn on_event(&self, event: &ProgressEvent) {
    match event.stage {
      Stage::PageFailed => warn!("{:02}/{:02} - {}", event.progress, event.total, event.message),
      Stage::SectionTransformed | Stage::PageRead => {
        debug!("{:02}/{:02} - {}", event.progress, event.total, event.message)
      }
      _ => info!("{:02}/{:02} - {}", event.progress, event.total, event.message),
    }
  }
}

/// Sink that keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingProgress {
  events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot of the events received so far.
  pub fn events(&self) -> Vec<ProgressEvent> {
    self.events.lock().map(|events| events.clone()).unwrap_or_default()
  }
}

impl ProgressSink for RecordingProgress {
  fn on_event(&self, event: &ProgressEvent) {
    if let Ok(mut events) = self.events.lock() {
      events.push(event.clone());
    }
  }
}
