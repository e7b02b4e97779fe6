//! Control-state engine: derives every button and info advisory from a
//! [`SignalSnapshot`].
//!
//! The result is always rebuilt from the whole snapshot. Busy flags take
//! precedence over everything else for the actionable controls, but never
//! touch advisories; operation results are narrated separately by
//! [`crate::OperationAdvisories`].

use crate::grade::GradeLevel;
use crate::snapshot::{BusyFlags, SignalSnapshot};

pub const WORKING_LABEL: &str = "Talking to the backend...";
pub const EXPORTING_LABEL: &str = "Exporting PDF...";
pub const AWAITING_EXPORT_LABEL: &str = "Waiting for export";

pub const IDENTIFY_LABEL: &str = "Fetch activity by ID";
pub const DESELECT_LABEL: &str = "Use other activity";
pub const GENERATE_LABEL: &str = "Generate slides";
pub const GENERATE_NO_GRADE_LABEL: &str = "Generate slides for selected activity";
pub const SYNC_LINKS_LABEL: &str = "Update slide links";
pub const VARIATION_LABEL: &str = "Create variation";
pub const VARIATION_NO_GRADE_LABEL: &str = "Create variation for selected activity";
pub const EXPORT_CONFIRM_LABEL: &str = "Export PDF";
pub const EXPORT_CANCEL_LABEL: &str = "Cancel update slides";

pub const SELECT_ACTIVITY_FIRST: &str = "Select an activity first! Scroll to the top.";
pub const SELECT_GRADE_TO_GENERATE: &str =
    "Select a grade level first. This is used to generate age-appropriate slides.";
pub const GENERATION_ORDER_WARNING: &str =
    "If you interact with the design while slides are generating, they may generate out of order.";
pub const PASTE_LINKS: &str =
    "Copy links from the \"Share\" menu into the text boxes above to update activity.";
pub const WAITING_FOR_USER_EXPORT: &str = "Waiting for user to export PDF...";
pub const WAITING_FOR_HOST_EXPORT: &str = "Waiting for the design to export as PDF...";
pub const EXPORT_NOTICE: &str = "A static PDF of the slide deck will be exported. Select \"Flatten PDF\" in the export menu to avoid formatting and file size issues, then click \"Export PDF\" to proceed.";
pub const VARIATION_SINGLE_GRADE_GROUP: &str =
    "The selected activity only has one age group. Find the parent activity to create a variation.";
pub const SELECT_GRADE_TO_VARY: &str = "Select a grade level to create a variation.";
pub const VARIATION_NEEDS_LINKS: &str = "Enter valid slide links to create a variation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Warn,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub visible: bool,
    pub message: String,
    pub tone: Tone,
}

impl Advisory {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            message: String::new(),
            tone: Tone::Info,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::shown(message, Tone::Info)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::shown(message, Tone::Warn)
    }

    pub fn positive(message: impl Into<String>) -> Self {
        Self::shown(message, Tone::Positive)
    }

    fn shown(message: impl Into<String>, tone: Tone) -> Self {
        Self {
            visible: true,
            message: message.into(),
            tone,
        }
    }
}

impl Default for Advisory {
    fn default() -> Self {
        Self::hidden()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVariant {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub disabled: bool,
    pub label: String,
    pub loading: bool,
    pub variant: ButtonVariant,
}

impl ControlView {
    fn enabled(label: impl Into<String>, variant: ButtonVariant) -> Self {
        Self {
            disabled: false,
            label: label.into(),
            loading: false,
            variant,
        }
    }

    fn disabled(label: impl Into<String>, variant: ButtonVariant) -> Self {
        Self {
            disabled: true,
            ..Self::enabled(label, variant)
        }
    }

    fn force_working(&mut self, label: &str) {
        self.disabled = true;
        self.loading = true;
        self.label = label.to_string();
    }
}

/// Confirm/cancel pair shown only while the operator is being asked to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPrompt {
    pub notice: String,
    pub confirm: ControlView,
    pub cancel: ControlView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub identify: ControlView,
    pub identifier_locked: bool,
    pub generate: ControlView,
    pub generate_advisory: Advisory,
    pub progress: Option<u8>,
    pub sync_links: ControlView,
    pub sync_links_advisory: Advisory,
    pub create_variation: ControlView,
    pub create_variation_advisory: Advisory,
    pub export_prompt: Option<ExportPrompt>,
}

impl ControlState {
    /// The controls that start an operation.
    pub fn actionable(&self) -> [&ControlView; 4] {
        [
            &self.identify,
            &self.generate,
            &self.sync_links,
            &self.create_variation,
        ]
    }
}

/// The three booleans (plus grade and grade-group count) every group reads.
#[derive(Debug, Clone, Copy)]
struct Signals {
    has_activity: bool,
    grade: Option<GradeLevel>,
    links_valid: bool,
    multiple_grade_groups: bool,
}

impl Signals {
    fn derive(snapshot: &SignalSnapshot) -> Self {
        Self {
            has_activity: snapshot.activity.is_some(),
            grade: snapshot.grade.chosen(),
            links_valid: snapshot.links.all_valid(),
            multiple_grade_groups: snapshot
                .activity
                .as_ref()
                .is_some_and(|activity| activity.has_multiple_grade_groups()),
        }
    }
}

/// Pure and deterministic.
pub fn compute(snapshot: &SignalSnapshot) -> ControlState {
    let signals = Signals::derive(snapshot);

    let mut identify = identify_control(snapshot, &signals);
    let (mut generate, generate_advisory) = generate_group(&snapshot.busy, &signals);
    let (mut sync_links, sync_links_advisory) = sync_links_group(&snapshot.busy, &signals);
    let (mut create_variation, create_variation_advisory) = variation_group(&signals);

    if let Some(label) = working_label(&snapshot.busy) {
        for control in [
            &mut identify,
            &mut generate,
            &mut sync_links,
            &mut create_variation,
        ] {
            control.force_working(label);
        }
    }

    ControlState {
        identify,
        identifier_locked: signals.has_activity || snapshot.busy.any(),
        generate,
        generate_advisory,
        progress: snapshot
            .busy
            .generation_in_flight
            .then(|| snapshot.busy.generation_progress.min(100)),
        sync_links,
        sync_links_advisory,
        create_variation,
        create_variation_advisory,
        export_prompt: export_prompt(&snapshot.busy),
    }
}

fn working_label(busy: &BusyFlags) -> Option<&'static str> {
    if busy.database_in_flight || busy.generation_in_flight {
        Some(WORKING_LABEL)
    } else if busy.export_in_flight {
        Some(EXPORTING_LABEL)
    } else if busy.awaiting_export {
        Some(AWAITING_EXPORT_LABEL)
    } else {
        None
    }
}

fn identify_control(snapshot: &SignalSnapshot, signals: &Signals) -> ControlView {
    if signals.has_activity {
        ControlView::enabled(DESELECT_LABEL, ButtonVariant::Secondary)
    } else if snapshot.identifier_input.trim().is_empty() {
        ControlView::disabled(IDENTIFY_LABEL, ButtonVariant::Primary)
    } else {
        ControlView::enabled(IDENTIFY_LABEL, ButtonVariant::Primary)
    }
}

fn generate_group(busy: &BusyFlags, signals: &Signals) -> (ControlView, Advisory) {
    const VARIANT: ButtonVariant = ButtonVariant::Primary;
    if busy.generation_in_flight {
        return (
            ControlView::disabled(GENERATE_LABEL, VARIANT),
            Advisory::warn(GENERATION_ORDER_WARNING),
        );
    }
    if !signals.has_activity {
        return (
            ControlView::disabled(GENERATE_LABEL, VARIANT),
            Advisory::warn(SELECT_ACTIVITY_FIRST),
        );
    }
    match signals.grade {
        None => (
            ControlView::disabled(GENERATE_NO_GRADE_LABEL, VARIANT),
            Advisory::warn(SELECT_GRADE_TO_GENERATE),
        ),
        Some(grade) => (
            ControlView::enabled(format!("Generate slides for {grade}"), VARIANT),
            Advisory::hidden(),
        ),
    }
}

fn sync_links_group(busy: &BusyFlags, signals: &Signals) -> (ControlView, Advisory) {
    const VARIANT: ButtonVariant = ButtonVariant::Primary;
    if busy.awaiting_export {
        return (
            ControlView::disabled(SYNC_LINKS_LABEL, VARIANT),
            Advisory::info(WAITING_FOR_USER_EXPORT),
        );
    }
    if busy.export_in_flight {
        return (
            ControlView::disabled(SYNC_LINKS_LABEL, VARIANT),
            Advisory::info(WAITING_FOR_HOST_EXPORT),
        );
    }
    if !signals.has_activity {
        (
            ControlView::disabled(SYNC_LINKS_LABEL, VARIANT),
            Advisory::warn(SELECT_ACTIVITY_FIRST),
        )
    } else if !signals.links_valid {
        (
            ControlView::disabled(SYNC_LINKS_LABEL, VARIANT),
            Advisory::warn(PASTE_LINKS),
        )
    } else {
        (
            ControlView::enabled(SYNC_LINKS_LABEL, VARIANT),
            Advisory::hidden(),
        )
    }
}

fn variation_group(signals: &Signals) -> (ControlView, Advisory) {
    const VARIANT: ButtonVariant = ButtonVariant::Secondary;
    if !signals.has_activity {
        return (
            ControlView::disabled(VARIATION_LABEL, VARIANT),
            Advisory::warn(SELECT_ACTIVITY_FIRST),
        );
    }
    // A single-grade-group activity is itself a variation; nothing else can unlock it.
    if !signals.multiple_grade_groups {
        return (
            ControlView::disabled(VARIATION_LABEL, VARIANT),
            Advisory::warn(VARIATION_SINGLE_GRADE_GROUP),
        );
    }
    let Some(grade) = signals.grade else {
        return (
            ControlView::disabled(VARIATION_NO_GRADE_LABEL, VARIANT),
            Advisory::warn(SELECT_GRADE_TO_VARY),
        );
    };
    let label = format!("Create variation for {grade}");
    if signals.links_valid {
        (ControlView::enabled(label, VARIANT), Advisory::hidden())
    } else {
        (
            ControlView::disabled(label, VARIANT),
            Advisory::warn(VARIATION_NEEDS_LINKS),
        )
    }
}

fn export_prompt(busy: &BusyFlags) -> Option<ExportPrompt> {
    if !busy.awaiting_export {
        return None;
    }
    let locked = busy.any_in_flight();
    let control = |label: &str, variant| ControlView {
        disabled: locked,
        label: label.to_string(),
        loading: false,
        variant,
    };
    Some(ExportPrompt {
        notice: EXPORT_NOTICE.to_string(),
        confirm: control(EXPORT_CONFIRM_LABEL, ButtonVariant::Secondary),
        cancel: control(EXPORT_CANCEL_LABEL, ButtonVariant::Secondary),
    })
}
