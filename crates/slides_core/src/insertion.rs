use std::fmt;

use serde::Deserialize;

/// Progress reported once the generator has answered, before any page exists.
pub const CONNECTED_PROGRESS: u8 = 25;

/// Deck sections, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionTag {
    Play,
    Reflect,
    Connect,
    Grow,
}

impl SectionTag {
    pub const ORDER: [SectionTag; 4] = [
        SectionTag::Play,
        SectionTag::Reflect,
        SectionTag::Connect,
        SectionTag::Grow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionTag::Play => "play",
            SectionTag::Reflect => "reflect",
            SectionTag::Connect => "connect",
            SectionTag::Grow => "grow",
        }
    }
}

impl fmt::Display for SectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated deck content. Missing or `null` sections are empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ContentPayload {
    #[serde(default)]
    pub play: Option<Vec<String>>,
    #[serde(default)]
    pub reflect: Option<Vec<String>>,
    #[serde(default)]
    pub connect: Option<Vec<String>>,
    #[serde(default)]
    pub grow: Option<Vec<String>>,
}

impl ContentPayload {
    pub fn section(&self, tag: SectionTag) -> &[String] {
        let items = match tag {
            SectionTag::Play => &self.play,
            SectionTag::Reflect => &self.reflect,
            SectionTag::Connect => &self.connect,
            SectionTag::Grow => &self.grow,
        };
        items.as_deref().unwrap_or(&[])
    }
}

/// One appended page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionUnit {
    pub section: SectionTag,
    pub body: String,
}

impl InsertionUnit {
    pub fn new(section: SectionTag, body: impl Into<String>) -> Self {
        Self {
            section,
            body: body.into(),
        }
    }
}

/// Flatten a payload into pages: section order first, then item order.
pub fn decompose(payload: &ContentPayload) -> Vec<InsertionUnit> {
    SectionTag::ORDER
        .iter()
        .flat_map(|tag| {
            payload
                .section(*tag)
                .iter()
                .map(move |body| InsertionUnit::new(*tag, body.clone()))
        })
        .collect()
}

/// `floor(25 + 75 * completed / total)`, capped at 100; an empty run is 100.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total) as u64;
    let span = u64::from(100 - CONNECTED_PROGRESS);
    let percent = u64::from(CONNECTED_PROGRESS) + span * completed / total as u64;
    percent.min(100) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running { completed: usize, total: usize },
    Done { total: usize },
    Failed { completed: usize, total: usize },
    Cancelled { completed: usize, total: usize },
}

/// Bookkeeping for one insertion run. Units are handed out strictly in order
/// and each at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRun {
    units: Vec<InsertionUnit>,
    next_index: usize,
    completed: usize,
    state: RunState,
}

impl PipelineRun {
    pub fn new(units: Vec<InsertionUnit>) -> Self {
        Self {
            units,
            next_index: 0,
            completed: 0,
            state: RunState::Idle,
        }
    }

    pub fn total(&self) -> usize {
        self.units.len()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// True until the first unit has been handed out.
    pub fn nothing_sent(&self) -> bool {
        self.next_index == 0
    }

    /// Hand out the next unit. `None` once every unit was handed out or the
    /// run has ended; an empty run is marked done here.
    pub fn next_unit(&mut self) -> Option<(usize, &InsertionUnit)> {
        match self.state {
            RunState::Idle | RunState::Running { .. } => {}
            _ => return None,
        }
        if self.next_index >= self.units.len() {
            if self.completed == self.units.len() {
                self.state = RunState::Done {
                    total: self.units.len(),
                };
            }
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;
        self.state = RunState::Running {
            completed: self.completed,
            total: self.units.len(),
        };
        self.units.get(index).map(|unit| (index, unit))
    }

    /// Record the handed-out unit as appended and return the new progress.
    pub fn record_success(&mut self) -> u8 {
        self.completed = (self.completed + 1).min(self.next_index);
        let total = self.units.len();
        self.state = if self.completed == total {
            RunState::Done { total }
        } else {
            RunState::Running {
                completed: self.completed,
                total,
            }
        };
        progress_percent(self.completed, total)
    }

    pub fn record_failure(&mut self) {
        self.state = RunState::Failed {
            completed: self.completed,
            total: self.units.len(),
        };
    }

    pub fn record_cancelled(&mut self) {
        self.state = RunState::Cancelled {
            completed: self.completed,
            total: self.units.len(),
        };
    }
}
