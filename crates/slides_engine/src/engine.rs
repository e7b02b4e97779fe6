use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use slides_core::{
    GenerationEvent, GenerationOutcome, GenerationStage, GradeLevel, LinkSyncRequest,
    VariationRequest,
};
use slides_logging::{slides_error, slides_info, slides_warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::host::DocumentHost;
use crate::pipeline::{self, ChannelProgressSink, PipelineSettings, ProgressSink};
use crate::{EngineEvent, EngineFault, PipelineOutcome};

enum EngineCommand {
    FetchActivity {
        id: String,
    },
    GenerateSlides {
        activity_id: String,
        grade: GradeLevel,
    },
    CancelGeneration,
    RequestExport,
    PersistLinks(LinkSyncRequest),
    CreateVariation(VariationRequest),
    WatchInterrupts,
}

#[derive(Clone)]
struct Services {
    backend: Arc<dyn Backend>,
    host: Arc<dyn DocumentHost>,
    settings: PipelineSettings,
}

/// Owns the background tokio runtime. Commands go in over one channel and
/// `EngineEvent`s come back over another.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(
        backend: Arc<dyn Backend>,
        host: Arc<dyn DocumentHost>,
        settings: PipelineSettings,
    ) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let services = Services {
            backend,
            host,
            settings,
        };

        thread::Builder::new()
            .name("slides-engine".to_string())
            .spawn(move || {
                let mut generation: Option<CancellationToken> = None;
                let mut watching_interrupts = false;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::CancelGeneration => {
                            match &generation {
                                Some(token) => {
                                    slides_info!("Cancelling slide generation");
                                    token.cancel();
                                }
                                None => slides_warn!("Cancel requested with no generation running"),
                            }
                            continue;
                        }
                        EngineCommand::WatchInterrupts => {
                            if !watching_interrupts {
                                watching_interrupts = true;
                                runtime.spawn(forward_interrupts(event_tx.clone()));
                            }
                            continue;
                        }
                        _ => {}
                    }
                    let cancel = CancellationToken::new();
                    if let EngineCommand::GenerateSlides { .. } = command {
                        generation = Some(cancel.clone());
                    }
                    let services = services.clone();
                    let task_tx = event_tx.clone();
                    let task = runtime.spawn(async move {
                        handle_command(&services, command, task_tx, cancel).await;
                    });
                    runtime.spawn(report_panic(task, event_tx.clone()));
                }
                // In-flight appends get a grace period to finish.
                runtime.shutdown_timeout(Duration::from_secs(5));
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch_activity(&self, id: impl Into<String>) {
        self.send(EngineCommand::FetchActivity { id: id.into() });
    }

    pub fn generate_slides(&self, activity_id: impl Into<String>, grade: GradeLevel) {
        self.send(EngineCommand::GenerateSlides {
            activity_id: activity_id.into(),
            grade,
        });
    }

    pub fn cancel_generation(&self) {
        self.send(EngineCommand::CancelGeneration);
    }

    pub fn request_export(&self) {
        self.send(EngineCommand::RequestExport);
    }

    pub fn persist_links(&self, request: LinkSyncRequest) {
        self.send(EngineCommand::PersistLinks(request));
    }

    pub fn create_variation(&self, request: VariationRequest) {
        self.send(EngineCommand::CreateVariation(request));
    }

    /// Forward Ctrl-C as [`EngineEvent::Interrupted`] from now on. Once
    /// watched, the signal no longer ends the process.
    pub fn watch_interrupts(&self) {
        self.send(EngineCommand::WatchInterrupts);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.next_event(timeout).ok().flatten()
    }

    /// Wait up to `timeout` for an event. `Ok(None)` means nothing arrived yet;
    /// an error means no event will ever arrive.
    pub fn next_event(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineFault> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineFault::Stopped),
        }
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            slides_warn!("Engine thread is gone; command dropped");
        }
    }
}

async fn handle_command(
    services: &Services,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    let sink = ChannelProgressSink::new(event_tx);
    let event = match command {
        EngineCommand::FetchActivity { id } => {
            let result = services
                .backend
                .fetch_activity(&id)
                .await
                .map_err(|err| err.into_selection_error(&id));
            EngineEvent::ActivityFetched(result)
        }
        EngineCommand::GenerateSlides { activity_id, grade } => {
            let outcome = generate(services, &activity_id, grade, &sink, &cancel).await;
            EngineEvent::Generation(GenerationEvent::Finished(outcome))
        }
        EngineCommand::RequestExport => {
            EngineEvent::ExportFinished(services.host.request_export().await)
        }
        EngineCommand::PersistLinks(request) => {
            EngineEvent::LinksPersisted(sync_links(services, &request).await)
        }
        EngineCommand::CreateVariation(request) => EngineEvent::VariationCreated(
            services
                .backend
                .create_variation(&request)
                .await
                .map_err(|err| err.to_string()),
        ),
        EngineCommand::CancelGeneration | EngineCommand::WatchInterrupts => return,
    };
    sink.emit(event);
}

async fn generate(
    services: &Services,
    activity_id: &str,
    grade: GradeLevel,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> GenerationOutcome {
    slides_info!("Requesting {} slides for activity {}", grade, activity_id);
    let payload = match services.backend.generate_content(activity_id, grade).await {
        Ok(payload) => payload,
        Err(err) => {
            return GenerationOutcome::Failed {
                stage: GenerationStage::RequestingContent,
                inserted: 0,
                message: err.to_string(),
            }
        }
    };
    match pipeline::run(
        &payload,
        services.host.as_ref(),
        sink,
        &services.settings,
        cancel,
    )
    .await
    {
        PipelineOutcome::Done { inserted } => GenerationOutcome::Done { inserted },
        PipelineOutcome::Cancelled { inserted } => GenerationOutcome::Cancelled { inserted },
        PipelineOutcome::Failed { failure, inserted } => GenerationOutcome::Failed {
            stage: failure.stage(),
            inserted,
            message: failure.message,
        },
    }
}

async fn forward_interrupts(event_tx: mpsc::Sender<EngineEvent>) {
    loop {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                slides_info!("Interrupt received");
                if event_tx.send(EngineEvent::Interrupted).is_err() {
                    break;
                }
            }
            Err(err) => {
                slides_warn!("Cannot listen for Ctrl-C: {}", err);
                break;
            }
        }
    }
}

/// A panicking task never sends its result; report it instead of going quiet.
async fn report_panic(task: JoinHandle<()>, event_tx: mpsc::Sender<EngineEvent>) {
    if let Err(err) = task.await {
        if err.is_panic() {
            slides_error!("Engine task failed: {}", err);
            let _ = event_tx.send(EngineEvent::TaskFailed(err.to_string()));
        }
    }
}

/// Upload the exported file, then store it with the share links.
async fn sync_links(services: &Services, request: &LinkSyncRequest) -> Result<(), String> {
    let upload = services
        .backend
        .upload_export(&request.activity_id, &request.title, &request.export_url)
        .await
        .map_err(|err| format!("uploading export failed: {err}"))?;
    services
        .backend
        .persist_links(&request.activity_id, &request.links, &upload)
        .await
        .map_err(|err| err.to_string())
}
