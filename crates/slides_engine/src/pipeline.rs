use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slides_core::{
    decompose, progress_percent, ContentPayload, GenerationEvent, PipelineRun, RunState,
    CONNECTED_PROGRESS,
};
use slides_logging::{slides_debug, slides_info, slides_warn};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::host::DocumentHost;
use crate::{EngineEvent, PipelineFailure, PipelineOutcome};

/// Spacing between page appends, which the document host rate limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pacing {
    /// Wait this long after each append before starting the next one.
    FixedInterval(Duration),
    /// At most `max` appends in any rolling `per` window.
    Window { max: usize, per: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub pacing: Pacing,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            // Hosts allow roughly three appends per ten seconds.
            pacing: Pacing::FixedInterval(Duration::from_millis(4000)),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

struct Pacer {
    pacing: Pacing,
    finished: VecDeque<Instant>,
}

impl Pacer {
    fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            finished: VecDeque::new(),
        }
    }

    fn next_slot(&mut self, now: Instant) -> Option<Instant> {
        match &self.pacing {
            Pacing::FixedInterval(interval) => {
                let ready = *self.finished.back()? + *interval;
                (ready > now).then_some(ready)
            }
            Pacing::Window { max, per } => {
                while let Some(oldest) = self.finished.front() {
                    if *oldest + *per <= now {
                        self.finished.pop_front();
                    } else {
                        break;
                    }
                }
                if self.finished.len() < (*max).max(1) {
                    return None;
                }
                self.finished.front().map(|oldest| *oldest + *per)
            }
        }
    }

    fn record(&mut self, at: Instant) {
        if matches!(self.pacing, Pacing::FixedInterval(_)) {
            self.finished.clear();
        }
        self.finished.push_back(at);
    }
}

/// Append every content unit to the host, one at a time, in section order.
///
/// Emits `Connected` first, then one `UnitInserted` per page. A failed append
/// ends the run; pages already appended stay. Cancellation is honored before
/// the first page and while waiting between pages, never mid-append.
pub async fn run(
    payload: &ContentPayload,
    host: &dyn DocumentHost,
    sink: &dyn ProgressSink,
    settings: &PipelineSettings,
    cancel: &CancellationToken,
) -> PipelineOutcome {
    let mut run = PipelineRun::new(decompose(payload));
    let total = run.total();
    slides_info!(
        "Inserting {} pages at {}% floor with {:?}",
        total,
        CONNECTED_PROGRESS,
        settings.pacing
    );
    sink.emit(EngineEvent::Generation(GenerationEvent::Connected { total }));

    if total == 0 {
        sink.emit(EngineEvent::Generation(GenerationEvent::UnitInserted {
            completed: 0,
            total: 0,
            percent: progress_percent(0, 0),
        }));
        return PipelineOutcome::Done { inserted: 0 };
    }

    let mut pacer = Pacer::new(settings.pacing.clone());
    loop {
        if let Some(slot) = pacer.next_slot(Instant::now()) {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = sleep_until(slot) => {}
            }
        }
        if cancel.is_cancelled() {
            run.record_cancelled();
            slides_info!("Insertion cancelled after {} of {} pages", run.completed(), total);
            return PipelineOutcome::Cancelled {
                inserted: run.completed(),
            };
        }

        let Some((index, unit)) = run.next_unit() else {
            break;
        };
        let section = unit.section;
        slides_debug!("Appending page {}/{} ({})", index + 1, total, section);
        let result = host.append_page(section.as_str(), &unit.body).await;
        match result {
            Ok(()) => {
                pacer.record(Instant::now());
                let percent = run.record_success();
                sink.emit(EngineEvent::Generation(GenerationEvent::UnitInserted {
                    completed: run.completed(),
                    total,
                    percent,
                }));
            }
            Err(err) => {
                run.record_failure();
                let failure = PipelineFailure {
                    unit_index: index,
                    section,
                    message: err.to_string(),
                };
                slides_warn!("{}", failure);
                return PipelineOutcome::Failed {
                    failure,
                    inserted: run.completed(),
                };
            }
        }
        if matches!(run.state(), RunState::Done { .. }) {
            break;
        }
    }

    slides_info!("Inserted all {} pages", total);
    PipelineOutcome::Done {
        inserted: run.completed(),
    }
}
