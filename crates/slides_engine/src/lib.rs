//! Slides engine: backend client, document host, batch insertion pipeline and
//! the background runtime that executes core effects.
mod backend;
mod engine;
mod host;
mod persist;
mod pipeline;
mod types;

pub use backend::{extract_error_message, Backend, BackendSettings, ReqwestBackend};
pub use engine::EngineHandle;
pub use host::{DocumentHost, HostError, MarkdownDeckHost, EXPORT_FILE_NAME};
pub use persist::{ensure_deck_dir, AtomicFileWriter, PersistError};
pub use pipeline::{run, ChannelProgressSink, Pacing, PipelineSettings, ProgressSink};
pub use types::{
    BackendError, EngineEvent, EngineFault, FailureKind, PipelineFailure, PipelineOutcome, UploadedExport,
};
