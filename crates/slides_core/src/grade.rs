use std::fmt;

/// Ordered grade-level labels. Backend records and the selector both use
/// indices into this table.
pub const GRADE_LEVELS: [&str; 8] = [
    "all",
    "PK-K",
    "1-2",
    "3-5",
    "MS",
    "HS",
    "Higher Ed",
    "Workforce/PD",
];

/// Grade levels offered by the selector.
pub const SELECTABLE_GRADES: [GradeLevel; 3] = [GradeLevel(1), GradeLevel(2), GradeLevel(3)];

/// Index into [`GRADE_LEVELS`]; only constructed for in-range values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GradeLevel(u8);

impl GradeLevel {
    pub fn from_index(index: usize) -> Option<Self> {
        if index < GRADE_LEVELS.len() {
            u8::try_from(index).ok().map(GradeLevel)
        } else {
            None
        }
    }

    /// Looks a level up by its display label, e.g. `"3-5"`.
    pub fn from_label(label: &str) -> Option<Self> {
        GRADE_LEVELS
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(label.trim()))
            .and_then(Self::from_index)
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn label(self) -> &'static str {
        GRADE_LEVELS[self.index()]
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradeSelection {
    #[default]
    Unselected,
    Chosen(GradeLevel),
}

impl GradeSelection {
    pub fn chosen(self) -> Option<GradeLevel> {
        match self {
            GradeSelection::Unselected => None,
            GradeSelection::Chosen(level) => Some(level),
        }
    }

    pub fn is_chosen(self) -> bool {
        self.chosen().is_some()
    }
}
