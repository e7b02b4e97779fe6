use std::sync::Mutex;
use std::time::Duration;

use pretty_assertions::assert_eq;
use slides_core::{ContentPayload, ExportOutcome, GenerationEvent, SectionTag};
use slides_engine::{
    run, DocumentHost, EngineEvent, HostError, Pacing, PipelineOutcome, PipelineSettings,
    ProgressSink,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

struct RecordingHost {
    started: Instant,
    fail_at: Option<usize>,
    attempts: Mutex<usize>,
    pages: Mutex<Vec<(String, String, Duration)>>,
}

impl RecordingHost {
    fn new(fail_at: Option<usize>) -> Self {
        Self {
            started: Instant::now(),
            fail_at,
            attempts: Mutex::new(0),
            pages: Mutex::new(Vec::new()),
        }
    }

    fn bodies(&self) -> Vec<String> {
        self.pages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body, _)| body.clone())
            .collect()
    }

    fn offsets(&self) -> Vec<Duration> {
        self.pages.lock().unwrap().iter().map(|(_, _, at)| *at).collect()
    }

    fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl DocumentHost for RecordingHost {
    async fn append_page(&self, title: &str, body: &str) -> Result<(), HostError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts - 1
        };
        if self.fail_at == Some(attempt) {
            return Err(HostError::Rejected("rate limited".to_string()));
        }
        self.pages.lock().unwrap().push((
            title.to_string(),
            body.to_string(),
            self.started.elapsed(),
        ));
        Ok(())
    }

    async fn request_export(&self) -> ExportOutcome {
        ExportOutcome::Aborted
    }
}

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl TestSink {
    fn cancelling_after(completed: usize, token: CancellationToken) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            cancel_after: Some((completed, token)),
        }
    }

    fn generation_events(&self) -> Vec<GenerationEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Generation(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    fn percents(&self) -> Vec<u8> {
        self.generation_events()
            .into_iter()
            .filter_map(|event| match event {
                GenerationEvent::UnitInserted { percent, .. } => Some(percent),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        if let (
            Some((after, token)),
            EngineEvent::Generation(GenerationEvent::UnitInserted { completed, .. }),
        ) = (&self.cancel_after, &event)
        {
            if completed == after {
                token.cancel();
            }
        }
        self.events.lock().unwrap().push(event);
    }
}

fn strings(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

fn payload(play: &[&str], reflect: &[&str], connect: &[&str], grow: &[&str]) -> ContentPayload {
    ContentPayload {
        play: strings(play),
        reflect: strings(reflect),
        connect: strings(connect),
        grow: strings(grow),
    }
}

fn five_units() -> ContentPayload {
    payload(&["p1", "p2"], &["r1"], &["c1"], &["g1"])
}

#[tokio::test(start_paused = true)]
async fn four_units_report_progress_and_keep_spacing() {
    let host = RecordingHost::new(None);
    let sink = TestSink::default();
    let cancel = CancellationToken::new();
    let started = Instant::now();

    let outcome = run(
        &payload(&["p1"], &["r1"], &["c1"], &["g1"]),
        &host,
        &sink,
        &PipelineSettings::default(),
        &cancel,
    )
    .await;

    assert_eq!(outcome, PipelineOutcome::Done { inserted: 4 });
    assert_eq!(
        sink.generation_events().first(),
        Some(&GenerationEvent::Connected { total: 4 })
    );
    assert_eq!(sink.percents(), vec![43, 62, 81, 100]);
    assert_eq!(host.bodies(), vec!["p1", "r1", "c1", "g1"]);

    let offsets = host.offsets();
    for pair in offsets.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(4000), "{offsets:?}");
    }
    // No trailing wait after the last page.
    assert!(started.elapsed() < Duration::from_millis(12_500));
}

#[tokio::test(start_paused = true)]
async fn pages_are_titled_by_section() {
    let host = RecordingHost::new(None);
    let outcome = run(
        &payload(&["p"], &[], &["c"], &["g"]),
        &host,
        &TestSink::default(),
        &PipelineSettings::default(),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(outcome.inserted(), 3);
    let titles: Vec<String> = host
        .pages
        .lock()
        .unwrap()
        .iter()
        .map(|(title, _, _)| title.clone())
        .collect();
    assert_eq!(
        titles,
        vec![
            SectionTag::Play.to_string(),
            SectionTag::Connect.to_string(),
            SectionTag::Grow.to_string()
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn failure_on_third_of_five_stops_the_run() {
    let host = RecordingHost::new(Some(2));
    let sink = TestSink::default();

    let outcome = run(
        &five_units(),
        &host,
        &sink,
        &PipelineSettings::default(),
        &CancellationToken::new(),
    )
    .await;

    match outcome {
        PipelineOutcome::Failed { failure, inserted } => {
            assert_eq!(inserted, 2);
            assert_eq!(failure.unit_index, 2);
            assert_eq!(failure.section, SectionTag::Reflect);
            assert!(failure.message.contains("rate limited"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(host.attempts(), 3, "units 4 and 5 are never sent");
    assert_eq!(host.bodies(), vec!["p1", "p2"]);
    assert_eq!(sink.percents(), vec![40, 55]);
}

#[tokio::test(start_paused = true)]
async fn empty_payload_completes_at_full_progress() {
    let host = RecordingHost::new(None);
    let sink = TestSink::default();

    let outcome = run(
        &ContentPayload::default(),
        &host,
        &sink,
        &PipelineSettings::default(),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(outcome, PipelineOutcome::Done { inserted: 0 });
    assert_eq!(host.attempts(), 0);
    assert_eq!(
        sink.generation_events(),
        vec![
            GenerationEvent::Connected { total: 0 },
            GenerationEvent::UnitInserted {
                completed: 0,
                total: 0,
                percent: 100
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn cancellation_before_first_page_sends_nothing() {
    let host = RecordingHost::new(None);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = run(
        &five_units(),
        &host,
        &TestSink::default(),
        &PipelineSettings::default(),
        &cancel,
    )
    .await;

    assert_eq!(outcome, PipelineOutcome::Cancelled { inserted: 0 });
    assert_eq!(host.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_between_pages_keeps_order_and_never_resends() {
    let host = RecordingHost::new(None);
    let cancel = CancellationToken::new();
    let sink = TestSink::cancelling_after(2, cancel.clone());
    let started = Instant::now();

    let outcome = run(
        &five_units(),
        &host,
        &sink,
        &PipelineSettings::default(),
        &cancel,
    )
    .await;

    assert_eq!(outcome, PipelineOutcome::Cancelled { inserted: 2 });
    assert_eq!(host.attempts(), 2);
    assert_eq!(host.bodies(), vec!["p1", "p2"]);
    // The pacing wait is cut short by the cancellation.
    assert!(started.elapsed() < Duration::from_millis(8000));
}

#[tokio::test(start_paused = true)]
async fn sliding_window_allows_bursts_up_to_the_limit() {
    let host = RecordingHost::new(None);
    let settings = PipelineSettings {
        pacing: Pacing::Window {
            max: 3,
            per: Duration::from_secs(10),
        },
    };

    let outcome = run(
        &five_units(),
        &host,
        &TestSink::default(),
        &settings,
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(outcome.inserted(), 5);
    let offsets = host.offsets();
    assert!(offsets[2] < Duration::from_secs(1), "{offsets:?}");
    assert!(offsets[3] >= offsets[0] + Duration::from_secs(10), "{offsets:?}");
    assert!(offsets[4] >= offsets[1] + Duration::from_secs(10), "{offsets:?}");
}
