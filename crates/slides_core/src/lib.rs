//! Slides core: pure state machine, control-state engine and view-model helpers.
mod activity;
mod alert;
mod control;
mod effect;
mod grade;
mod insertion;
mod links;
mod msg;
mod snapshot;
mod state;
mod update;
mod view_model;

pub use activity::{Activity, ActivityRecord, SelectionError, SelectionState, SelectionStep};
pub use alert::{
    LinkAlerts, TransientAlert, LINK_UNRECOGNIZED_MESSAGE, LINK_VALID_MESSAGE, LINK_VALID_TTL,
};
pub use control::*;
pub use effect::{Effect, LinkSyncRequest, VariationRequest};
pub use grade::{GradeLevel, GradeSelection, GRADE_LEVELS, SELECTABLE_GRADES};
pub use insertion::{
    decompose, progress_percent, ContentPayload, InsertionUnit, PipelineRun, RunState,
    SectionTag, CONNECTED_PROGRESS,
};
pub use links::{classify, LinkFields, LinkKind, LinkRole};
pub use msg::{ExportOutcome, GenerationEvent, GenerationOutcome, GenerationStage, Msg};
pub use snapshot::{BusyFlags, SignalSnapshot};
pub use state::{AppState, DatabaseWrite, OperationAdvisories};
pub use update::*;
pub use view_model::{ActivitySummary, AppViewModel, LinkFieldView};
