use slides_logging::{slides_debug, slides_info, slides_warn};

use crate::activity::{SelectionError, SelectionStep};
use crate::control::Advisory;
use crate::effect::{LinkSyncRequest, VariationRequest};
use crate::grade::{GradeLevel, GradeSelection};
use crate::insertion::CONNECTED_PROGRESS;
use crate::msg::{ExportOutcome, GenerationEvent, GenerationOutcome};
use crate::state::DatabaseWrite;
use crate::{AppState, Effect, Msg};

pub const ACTIVITY_FOUND: &str = "Activity found!";
pub const ACTIVITY_NOT_FOUND: &str = "No activity with that ID";
pub const ACTIVITY_INVALID: &str = "Important activity data is missing or invalid; see log";
pub const CONNECTING_TO_GENERATOR: &str = "Connecting to the slide generator...";
pub const GENERATING_SLIDES: &str = "Generating slides...";
pub const SLIDES_GENERATED: &str = "Slides generated!";
pub const STOPPING_GENERATION: &str = "Stopping after the current slide...";
pub const EXPORT_ABORTED: &str = "PDF export cancelled. No updates were made. If this was a mistake, select \"Flatten PDF\" and then click \"Export\" when the PDF export menu appears.";
pub const UPDATING_SLIDES: &str = "Updating slides in the database...";
pub const SLIDES_UPDATED: &str = "Slides updated successfully!";
pub const CREATING_VARIATION: &str = "Creating variation...";
pub const VARIATION_CREATED: &str = "Variation created successfully!";

/// Pure update function: applies a message to state and returns any effects.
///
/// Clicks are checked against the derived control state first; a click on a
/// disabled control changes nothing.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::IdentifierChanged(text) => {
            if state.controls().identifier_locked {
                return (state, Vec::new());
            }
            state.identifier_input = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::IdentifyClicked => {
            if state.controls().identify.disabled {
                return (state, Vec::new());
            }
            state.status.clear();
            let input = state.identifier_input.clone();
            match state.selection.toggle(&input) {
                SelectionStep::Fetch { id } => {
                    slides_info!("Fetching activity id={}", id);
                    state.mark_dirty();
                    vec![Effect::FetchActivity { id }]
                }
                SelectionStep::Reset => {
                    slides_info!("Activity selection cleared");
                    state.mark_dirty();
                    Vec::new()
                }
                SelectionStep::Ignored => Vec::new(),
            }
        }
        Msg::ActivityFetched(lookup) => {
            let resolved = state.selection.resolve(lookup).map(|outcome| match outcome {
                Ok(activity) => {
                    slides_info!(
                        "Selected activity id={} title={:?}",
                        activity.id(),
                        activity.title()
                    );
                    Advisory::positive(ACTIVITY_FOUND)
                }
                Err(err) => verify_failure_advisory(&err),
            });
            let Some(advisory) = resolved else {
                slides_debug!("Ignoring activity lookup result; no lookup outstanding");
                return (state, Vec::new());
            };
            state.status.verify = advisory;
            state.mark_dirty();
            Vec::new()
        }
        Msg::GradeSelected(index) => {
            let grade = match index {
                None => GradeSelection::Unselected,
                Some(index) => match GradeLevel::from_index(index) {
                    Some(level) => GradeSelection::Chosen(level),
                    None => {
                        slides_warn!("Ignoring out-of-range grade index {}", index);
                        return (state, Vec::new());
                    }
                },
            };
            if state.grade != grade {
                state.grade = grade;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::LinkEdited { role, raw, at } => {
            if state.links_locked() {
                return (state, Vec::new());
            }
            state.link_alerts.on_edit(role, &raw, at);
            state.links.set(role, raw);
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick(now) => {
            if state.link_alerts.tick(now) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::GenerateClicked => {
            if state.controls().generate.disabled {
                return (state, Vec::new());
            }
            let activity_id = state.selection.activity().map(|a| a.id().to_string());
            let (Some(activity_id), Some(grade)) = (activity_id, state.grade.chosen()) else {
                return (state, Vec::new());
            };
            state.status.clear();
            state.generation_in_flight = true;
            state.generation_progress = 0;
            state.status.generation = Advisory::info(CONNECTING_TO_GENERATOR);
            state.mark_dirty();
            vec![Effect::GenerateSlides { activity_id, grade }]
        }
        Msg::CancelGenerationClicked => {
            if !state.generation_in_flight {
                return (state, Vec::new());
            }
            slides_info!("Slide generation cancel requested");
            state.status.generation = Advisory::info(STOPPING_GENERATION);
            state.mark_dirty();
            vec![Effect::CancelGeneration]
        }
        Msg::Generation(event) => {
            if !state.generation_in_flight {
                slides_debug!("Ignoring generation event {:?}; nothing running", event);
                return (state, Vec::new());
            }
            apply_generation_event(&mut state, event);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SyncLinksClicked => {
            if state.controls().sync_links.disabled {
                return (state, Vec::new());
            }
            state.status.clear();
            state.awaiting_export = true;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExportCancelled => {
            if !state.awaiting_export || state.export_in_flight {
                return (state, Vec::new());
            }
            state.awaiting_export = false;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExportConfirmed => {
            if !state.awaiting_export || state.export_in_flight {
                return (state, Vec::new());
            }
            state.awaiting_export = false;
            state.export_in_flight = true;
            state.mark_dirty();
            vec![Effect::RequestExport]
        }
        Msg::ExportFinished(outcome) => {
            if !state.export_in_flight {
                return (state, Vec::new());
            }
            state.export_in_flight = false;
            state.mark_dirty();
            match outcome {
                ExportOutcome::Aborted => {
                    state.status.sync_links = Advisory::info(EXPORT_ABORTED);
                    Vec::new()
                }
                ExportOutcome::Failed { message } => {
                    slides_warn!("Export failed: {}", message);
                    state.status.sync_links =
                        Advisory::warn(format!("Error exporting PDF: {message}"));
                    Vec::new()
                }
                ExportOutcome::Completed { url } => match state.selection.activity() {
                    Some(activity) => {
                        let request = LinkSyncRequest {
                            activity_id: activity.id().to_string(),
                            title: activity.title().to_string(),
                            export_url: url,
                            links: state.links.clone(),
                        };
                        state.pending_write = Some(DatabaseWrite::SyncLinks);
                        state.status.sync_links = Advisory::info(UPDATING_SLIDES);
                        vec![Effect::PersistLinks(request)]
                    }
                    None => {
                        state.status.sync_links =
                            Advisory::warn(crate::control::SELECT_ACTIVITY_FIRST);
                        Vec::new()
                    }
                },
            }
        }
        Msg::LinksPersisted(result) => {
            if state.pending_write != Some(DatabaseWrite::SyncLinks) {
                return (state, Vec::new());
            }
            state.pending_write = None;
            state.status.sync_links = match result {
                Ok(()) => Advisory::positive(SLIDES_UPDATED),
                Err(message) => Advisory::warn(format!("Error updating slides: {message}")),
            };
            state.mark_dirty();
            Vec::new()
        }
        Msg::CreateVariationClicked => {
            if state.controls().create_variation.disabled {
                return (state, Vec::new());
            }
            let request = match (state.selection.activity(), state.grade.chosen()) {
                (Some(activity), Some(grade)) => VariationRequest {
                    activity_id: activity.id().to_string(),
                    title: activity.title().to_string(),
                    grade,
                    links: state.links.clone(),
                },
                _ => return (state, Vec::new()),
            };
            state.status.clear();
            state.pending_write = Some(DatabaseWrite::Variation);
            state.status.variation = Advisory::info(CREATING_VARIATION);
            state.mark_dirty();
            vec![Effect::CreateVariation(request)]
        }
        Msg::VariationCreated(result) => {
            if state.pending_write != Some(DatabaseWrite::Variation) {
                return (state, Vec::new());
            }
            state.pending_write = None;
            state.status.variation = match result {
                Ok(()) => Advisory::positive(VARIATION_CREATED),
                Err(message) => Advisory::warn(format!("Error creating variation: {message}")),
            };
            state.mark_dirty();
            Vec::new()
        }
    };

    (state, effects)
}

fn verify_failure_advisory(err: &SelectionError) -> Advisory {
    slides_warn!("Activity lookup failed: {}", err);
    match err {
        SelectionError::NotFound { .. } => Advisory::warn(ACTIVITY_NOT_FOUND),
        SelectionError::InvalidData { .. } => Advisory::warn(ACTIVITY_INVALID),
        SelectionError::Transport { message } => {
            Advisory::warn(format!("Could not reach the backend: {message}"))
        }
    }
}

fn apply_generation_event(state: &mut AppState, event: GenerationEvent) {
    match event {
        GenerationEvent::Connected { total } => {
            slides_info!("Generator answered; {} slides to insert", total);
            state.generation_progress = state.generation_progress.max(CONNECTED_PROGRESS);
            state.status.generation = Advisory::info(GENERATING_SLIDES);
        }
        GenerationEvent::UnitInserted {
            completed,
            total,
            percent,
        } => {
            state.generation_progress = state.generation_progress.max(percent.min(100));
            state.status.generation =
                Advisory::info(format!("Generating slides... ({completed}/{total})"));
        }
        GenerationEvent::Finished(outcome) => {
            state.generation_in_flight = false;
            state.generation_progress = 0;
            state.status.generation = match outcome {
                GenerationOutcome::Done { inserted } => {
                    slides_info!("Generation finished; {} slides inserted", inserted);
                    Advisory::positive(SLIDES_GENERATED)
                }
                GenerationOutcome::Failed {
                    stage,
                    inserted,
                    message,
                } => {
                    slides_warn!(
                        "Generation failed while {} after {} slides: {}",
                        stage,
                        inserted,
                        message
                    );
                    Advisory::warn(format!(
                        "Error generating slides while {stage}. {inserted} slides were kept. Please try again."
                    ))
                }
                GenerationOutcome::Cancelled { inserted } => Advisory::info(format!(
                    "Slide generation cancelled after {inserted} slides."
                )),
            };
        }
    }
}
