//! Import progress reporting

use serde::Serialize;
use tracing::debug;

/// Stage of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportStage {
    Detecting,
    Extracting,
    Parsing,
    Fallback,
    Tracking,
    Committing,
    Done,
}

impl ImportStage {
    pub fn name(self) -> &'static str {
        match self {
            ImportStage::Detecting => "detecting",
            ImportStage::Extracting => "extracting",
            ImportStage::Parsing => "parsing",
            ImportStage::Fallback => "fallback",
            ImportStage::Tracking => "tracking",
            ImportStage::Committing => "committing",
            ImportStage::Done => "done",
        }
    }
}

/// One progress report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub stage: ImportStage,
    /// Fraction complete, 0.0 to 1.0
    pub progress: f32,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProgressEvent {
    pub fn new(stage: ImportStage, progress: f32, status: impl Into<String>) -> Self {
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            status: status.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Receives progress events
pub trait ProgressSink {
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent),
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Discards events
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Log an event and forward it to the sink
pub(crate) fn emit(sink: &dyn ProgressSink, event: ProgressEvent) {
    debug!(
        stage = event.stage.name(),
        progress = event.progress,
        "{}",
        event.status
    );
    sink.report(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_closure_sink() {
        let seen = RefCell::new(Vec::new());
        let sink = |event: ProgressEvent| seen.borrow_mut().push(event.stage);
        emit(&sink, ProgressEvent::new(ImportStage::Detecting, 0.0, "start"));
        emit(&sink, ProgressEvent::new(ImportStage::Done, 1.0, "done"));
        assert_eq!(
            *seen.borrow(),
            vec![ImportStage::Detecting, ImportStage::Done]
        );
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(ProgressEvent::new(ImportStage::Parsing, 1.5, "x").progress, 1.0);
        assert_eq!(ProgressEvent::new(ImportStage::Parsing, -1.0, "x").progress, 0.0);
    }
}
