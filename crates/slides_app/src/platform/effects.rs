use std::time::Duration;

use slides_core::{Effect, Msg};
use slides_engine::{EngineEvent, EngineFault, EngineHandle};
use slides_logging::{slides_debug, slides_info};

/// Hands core effects to the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchActivity { id } => {
                    slides_info!("FetchActivity id={}", id);
                    self.engine.fetch_activity(id);
                }
                Effect::GenerateSlides { activity_id, grade } => {
                    slides_info!("GenerateSlides activity_id={} grade={}", activity_id, grade);
                    self.engine.generate_slides(activity_id, grade);
                }
                Effect::CancelGeneration => {
                    slides_info!("CancelGeneration");
                    self.engine.cancel_generation();
                }
                Effect::RequestExport => {
                    slides_info!("RequestExport");
                    self.engine.request_export();
                }
                Effect::PersistLinks(request) => {
                    slides_info!(
                        "PersistLinks activity_id={} export_url={}",
                        request.activity_id,
                        request.export_url
                    );
                    self.engine.persist_links(request);
                }
                Effect::CreateVariation(request) => {
                    slides_info!(
                        "CreateVariation activity_id={} grade={}",
                        request.activity_id,
                        request.grade
                    );
                    self.engine.create_variation(request);
                }
            }
        }
    }

    /// Ctrl-C cancels a running generation instead of ending the process.
    pub fn watch_interrupts(&self) {
        self.engine.watch_interrupts();
    }

    /// Wait up to `timeout` for the next engine event. Errors when the engine
    /// can no longer deliver a result.
    pub fn next_msg(&self, timeout: Duration) -> Result<Option<Msg>, EngineFault> {
        let Some(event) = self.engine.next_event(timeout)? else {
            return Ok(None);
        };
        slides_debug!("Engine event {:?}", event);
        event_to_msg(event).map(Some)
    }
}

pub fn event_to_msg(event: EngineEvent) -> Result<Msg, EngineFault> {
    Ok(match event {
        EngineEvent::ActivityFetched(result) => Msg::ActivityFetched(result),
        EngineEvent::Generation(event) => Msg::Generation(event),
        EngineEvent::ExportFinished(outcome) => Msg::ExportFinished(outcome),
        EngineEvent::LinksPersisted(result) => Msg::LinksPersisted(result),
        EngineEvent::VariationCreated(result) => Msg::VariationCreated(result),
        EngineEvent::Interrupted => Msg::CancelGenerationClicked,
        EngineEvent::TaskFailed(message) => return Err(EngineFault::TaskFailed(message)),
    })
}
