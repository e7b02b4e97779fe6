use crate::activity::SelectionState;
use crate::alert::LinkAlerts;
use crate::control::{compute, Advisory, ControlState};
use crate::grade::GradeSelection;
use crate::links::{LinkFields, LinkRole};
use crate::snapshot::{BusyFlags, SignalSnapshot};
use crate::view_model::{ActivitySummary, AppViewModel, LinkFieldView};

/// Backend writes that keep the database busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseWrite {
    SyncLinks,
    Variation,
}

/// Result/progress advisories written by the operations themselves, outside
/// the control-state engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationAdvisories {
    pub verify: Advisory,
    pub generation: Advisory,
    pub sync_links: Advisory,
    pub variation: Advisory,
}

impl OperationAdvisories {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) identifier_input: String,
    pub(crate) selection: SelectionState,
    pub(crate) grade: GradeSelection,
    pub(crate) links: LinkFields,
    pub(crate) link_alerts: LinkAlerts,
    pub(crate) pending_write: Option<DatabaseWrite>,
    pub(crate) generation_in_flight: bool,
    pub(crate) generation_progress: u8,
    pub(crate) awaiting_export: bool,
    pub(crate) export_in_flight: bool,
    pub(crate) status: OperationAdvisories,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn busy(&self) -> BusyFlags {
        BusyFlags {
            database_in_flight: self.selection.is_verifying() || self.pending_write.is_some(),
            generation_in_flight: self.generation_in_flight,
            generation_progress: self.generation_progress,
            awaiting_export: self.awaiting_export,
            export_in_flight: self.export_in_flight,
        }
    }

    /// Full, immutable copy of every signal the engine reads.
    pub fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            activity: self.selection.activity().cloned(),
            grade: self.grade,
            links: self.links.clone(),
            busy: self.busy(),
            identifier_input: self.identifier_input.clone(),
        }
    }

    pub fn controls(&self) -> ControlState {
        compute(&self.snapshot())
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            controls: self.controls(),
            status: self.status.clone(),
            identifier_input: self.identifier_input.clone(),
            activity: self.selection.activity().map(ActivitySummary::from),
            grade: self.grade.chosen(),
            links: LinkRole::ALL
                .iter()
                .map(|role| LinkFieldView {
                    role: *role,
                    raw: self.links.get(*role).to_string(),
                    kind: self.links.kind(*role),
                    alert: self.link_alerts.advisory(*role),
                })
                .collect(),
            dirty: self.dirty,
        }
    }

    /// Share-link fields are frozen while a link sync is being prepared or written.
    pub(crate) fn links_locked(&self) -> bool {
        self.awaiting_export || self.export_in_flight || self.pending_write.is_some()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a render is due and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
