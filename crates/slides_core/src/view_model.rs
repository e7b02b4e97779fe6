use crate::activity::Activity;
use crate::control::{Advisory, ControlState};
use crate::grade::GradeLevel;
use crate::links::{LinkKind, LinkRole};
use crate::state::OperationAdvisories;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub controls: ControlState,
    pub status: OperationAdvisories,
    pub identifier_input: String,
    pub activity: Option<ActivitySummary>,
    pub grade: Option<GradeLevel>,
    pub links: Vec<LinkFieldView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySummary {
    pub id: String,
    pub title: String,
    pub grade_labels: Vec<&'static str>,
}

impl From<&Activity> for ActivitySummary {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id().to_string(),
            title: activity.title().to_string(),
            grade_labels: activity
                .grade_groups()
                .iter()
                .map(|grade| grade.label())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFieldView {
    pub role: LinkRole,
    pub raw: String,
    pub kind: LinkKind,
    pub alert: Advisory,
}
