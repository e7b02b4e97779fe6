use std::fmt;
use std::time::Instant;

use crate::activity::{ActivityRecord, SelectionError};
use crate::insertion::SectionTag;
use crate::links::LinkRole;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the activity identifier input.
    IdentifierChanged(String),
    /// User clicked the identify button (fetch, or drop the current activity).
    IdentifyClicked,
    /// Backend lookup finished.
    ActivityFetched(Result<ActivityRecord, SelectionError>),
    /// User picked a grade level by index, or cleared the choice.
    GradeSelected(Option<usize>),
    /// User edited one of the share-link fields.
    LinkEdited {
        role: LinkRole,
        raw: String,
        at: Instant,
    },
    /// Clock tick; expires transient alerts.
    Tick(Instant),
    /// User clicked Generate slides.
    GenerateClicked,
    /// User asked to stop a running generation after the current page.
    CancelGenerationClicked,
    /// Engine progress for the running generation.
    Generation(GenerationEvent),
    /// User clicked Update slide links; opens the export prompt.
    SyncLinksClicked,
    /// User backed out of the export prompt.
    ExportCancelled,
    /// User confirmed the export prompt.
    ExportConfirmed,
    /// Document host finished (or abandoned) the export.
    ExportFinished(ExportOutcome),
    /// Backend finished storing the links.
    LinksPersisted(Result<(), String>),
    /// User clicked Create variation.
    CreateVariationClicked,
    /// Backend finished creating the variation.
    VariationCreated(Result<(), String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// The generator answered; `total` pages will be appended.
    Connected { total: usize },
    UnitInserted {
        completed: usize,
        total: usize,
        percent: u8,
    },
    Finished(GenerationOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Done { inserted: usize },
    Failed {
        stage: GenerationStage,
        inserted: usize,
        message: String,
    },
    Cancelled { inserted: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    RequestingContent,
    Inserting { unit: usize, section: SectionTag },
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStage::RequestingContent => write!(f, "requesting content"),
            GenerationStage::Inserting { unit, section } => {
                write!(f, "inserting slide {} ({section})", unit + 1)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Completed { url: String },
    Aborted,
    Failed { message: String },
}
