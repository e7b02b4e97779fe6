use serde_json::Value;
use slides_logging::slides_warn;
use thiserror::Error;

use crate::grade::GradeLevel;

/// A verified activity. Only built by [`ActivityRecord::validate`], so every
/// field is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    id: String,
    title: String,
    grade_groups: Vec<GradeLevel>,
}

impl Activity {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn grade_groups(&self) -> &[GradeLevel] {
        &self.grade_groups
    }

    /// Variations can only be created from an activity spanning several grade groups.
    pub fn has_multiple_grade_groups(&self) -> bool {
        self.grade_groups.len() > 1
    }
}

/// Raw activity data as returned by the backend, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord(pub Value);

const TITLE_KEY: &str = "title";
const GRADE_GROUPS_KEY: &str = "age_group";
const ID_KEY: &str = "_id";

impl ActivityRecord {
    /// Check the required-field contract and build an [`Activity`].
    ///
    /// Every offending field is reported, not just the first. The record's own
    /// `_id` wins over `requested_id` when present.
    pub fn validate(&self, requested_id: &str) -> Result<Activity, SelectionError> {
        let Some(fields) = self.0.as_object() else {
            return Err(SelectionError::InvalidData {
                id: requested_id.to_string(),
                problems: vec!["activity data is not an object".to_string()],
            });
        };

        let mut problems = Vec::new();

        let id = match fields.get(ID_KEY) {
            None => requested_id.trim().to_string(),
            Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
            Some(_) => {
                problems.push(format!("{ID_KEY} must be a non-empty string."));
                String::new()
            }
        };
        if id.is_empty() && problems.is_empty() {
            problems.push(format!("Missing property: {ID_KEY}"));
        }

        let title = match fields.get(TITLE_KEY) {
            None => {
                problems.push(format!("Missing property: {TITLE_KEY}"));
                String::new()
            }
            Some(Value::String(title)) if !title.trim().is_empty() => title.clone(),
            Some(_) => {
                problems.push(format!("{TITLE_KEY} must not be empty."));
                String::new()
            }
        };

        let grade_groups = match fields.get(GRADE_GROUPS_KEY) {
            None => {
                problems.push(format!("Missing property: {GRADE_GROUPS_KEY}"));
                Vec::new()
            }
            Some(Value::Array(items)) => parse_grade_groups(items, &mut problems),
            Some(_) => {
                problems.push(format!("{GRADE_GROUPS_KEY} must be a list of numbers."));
                Vec::new()
            }
        };

        if !problems.is_empty() {
            slides_warn!(
                "Activity data for activity with ID {} has the following problems: {}",
                requested_id,
                problems.join(" | ")
            );
            return Err(SelectionError::InvalidData {
                id: requested_id.to_string(),
                problems,
            });
        }

        Ok(Activity {
            id,
            title,
            grade_groups,
        })
    }
}

fn parse_grade_groups(items: &[Value], problems: &mut Vec<String>) -> Vec<GradeLevel> {
    if items.is_empty() {
        problems.push(format!("{GRADE_GROUPS_KEY} must not be empty."));
        return Vec::new();
    }
    let mut groups = Vec::with_capacity(items.len());
    for item in items {
        let level = item
            .as_u64()
            .and_then(|raw| usize::try_from(raw).ok())
            .and_then(GradeLevel::from_index);
        match level {
            Some(level) => groups.push(level),
            None => problems.push(format!(
                "{GRADE_GROUPS_KEY} entry {item} is not a known grade level."
            )),
        }
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no activity with ID {id}")]
    NotFound { id: String },
    #[error("activity {id} has invalid data: {}", .problems.join(" | "))]
    InvalidData { id: String, problems: Vec<String> },
    #[error("backend unreachable: {message}")]
    Transport { message: String },
}

/// Activity identification lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    Unselected { error: Option<SelectionError> },
    Verifying { id: String },
    Selected(Activity),
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState::Unselected { error: None }
    }
}

/// What the identify action does from the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionStep {
    /// Start a remote lookup for this identifier.
    Fetch { id: String },
    /// Dropped the selection locally; no lookup needed.
    Reset,
    /// Nothing to do (blank identifier or a lookup already running).
    Ignored,
}

impl SelectionState {
    pub fn activity(&self) -> Option<&Activity> {
        match self {
            SelectionState::Selected(activity) => Some(activity),
            _ => None,
        }
    }

    pub fn is_verifying(&self) -> bool {
        matches!(self, SelectionState::Verifying { .. })
    }

    /// The identify action toggles: verify when nothing is selected, reset when
    /// something is.
    pub fn toggle(&mut self, identifier_input: &str) -> SelectionStep {
        match self {
            SelectionState::Selected(_) => {
                *self = SelectionState::Unselected { error: None };
                SelectionStep::Reset
            }
            SelectionState::Verifying { .. } => SelectionStep::Ignored,
            SelectionState::Unselected { .. } => {
                let id = identifier_input.trim();
                if id.is_empty() {
                    return SelectionStep::Ignored;
                }
                *self = SelectionState::Verifying { id: id.to_string() };
                SelectionStep::Fetch { id: id.to_string() }
            }
        }
    }

    /// Resolve a lookup. Returns `None` when no lookup was outstanding.
    pub fn resolve(
        &mut self,
        lookup: Result<ActivityRecord, SelectionError>,
    ) -> Option<Result<&Activity, SelectionError>> {
        let SelectionState::Verifying { id } = self else {
            return None;
        };
        let verified = lookup.and_then(|record| record.validate(id));
        match verified {
            Ok(activity) => {
                *self = SelectionState::Selected(activity);
                self.activity().map(Ok)
            }
            Err(err) => {
                *self = SelectionState::Unselected {
                    error: Some(err.clone()),
                };
                Some(Err(err))
            }
        }
    }
}
