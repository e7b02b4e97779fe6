use std::fmt;

use slides_core::{
    ActivityRecord, ExportOutcome, GenerationEvent, GenerationStage, SectionTag, SelectionError,
};
use thiserror::Error;

/// Events flowing back from the engine thread to the app loop.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ActivityFetched(Result<ActivityRecord, SelectionError>),
    Generation(GenerationEvent),
    ExportFinished(ExportOutcome),
    LinksPersisted(Result<(), String>),
    VariationCreated(Result<(), String>),
    /// Ctrl-C arrived while interrupts were being watched.
    Interrupted,
    /// A background task panicked before it could report its result.
    TaskFailed(String),
}

/// The engine can no longer answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineFault {
    #[error("engine thread stopped")]
    Stopped,
    #[error("engine task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Lookup failures are mapped onto the selection taxonomy.
    pub fn into_selection_error(self, id: &str) -> SelectionError {
        match self.kind {
            FailureKind::NotFound => SelectionError::NotFound { id: id.to_string() },
            _ => SelectionError::Transport {
                message: self.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

/// Where the backend stored an uploaded export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedExport {
    pub name: String,
    pub pdf_url: String,
    pub thumbnail_url: String,
}

/// A page append that the document host refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("slide {} ({section}) failed: {message}", .unit_index + 1)]
pub struct PipelineFailure {
    pub unit_index: usize,
    pub section: SectionTag,
    pub message: String,
}

impl PipelineFailure {
    pub fn stage(&self) -> GenerationStage {
        GenerationStage::Inserting {
            unit: self.unit_index,
            section: self.section,
        }
    }
}

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Done { inserted: usize },
    Failed {
        failure: PipelineFailure,
        inserted: usize,
    },
    Cancelled { inserted: usize },
}

impl PipelineOutcome {
    pub fn inserted(&self) -> usize {
        match self {
            PipelineOutcome::Done { inserted }
            | PipelineOutcome::Failed { inserted, .. }
            | PipelineOutcome::Cancelled { inserted } => *inserted,
        }
    }
}
