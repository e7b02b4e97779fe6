use crate::activity::Activity;
use crate::grade::GradeSelection;
use crate::links::LinkFields;

/// Outstanding-operation flags. Set by the entry point before it emits an
/// effect, cleared when the operation's result message arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusyFlags {
    pub database_in_flight: bool,
    pub generation_in_flight: bool,
    /// 0..=100; meaningful only while `generation_in_flight`.
    pub generation_progress: u8,
    pub awaiting_export: bool,
    pub export_in_flight: bool,
}

impl BusyFlags {
    pub fn any_in_flight(&self) -> bool {
        self.database_in_flight || self.generation_in_flight || self.export_in_flight
    }

    /// True while any operation is outstanding, including the export prompt.
    pub fn any(&self) -> bool {
        self.any_in_flight() || self.awaiting_export
    }
}

/// Every input the control-state engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignalSnapshot {
    pub activity: Option<Activity>,
    pub grade: GradeSelection,
    pub links: LinkFields,
    pub busy: BusyFlags,
    pub identifier_input: String,
}
