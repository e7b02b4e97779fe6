use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use slides_core::{update, Advisory, AppState, GradeLevel, LinkRole, Msg, Tone, SELECTABLE_GRADES};
use slides_engine::{EngineHandle, MarkdownDeckHost, ReqwestBackend};
use slides_logging::{slides_info, slides_warn};

use super::effects::EffectRunner;
use super::render::{link_lines, render};
use super::settings::AppSettings;
use crate::cli::LinkArgs;

const TICK: Duration = Duration::from_millis(100);

/// Owns the state and drives it with messages, the way a UI event loop would.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    printed: Vec<String>,
}

impl Session {
    pub fn start(settings: &AppSettings) -> anyhow::Result<Self> {
        let backend = ReqwestBackend::new(settings.backend.clone())
            .context("building the backend client")?;
        if settings.backend.user_id.is_empty() {
            slides_warn!("No user id configured; backend writes will be anonymous");
        }
        let host = MarkdownDeckHost::open(&settings.deck_dir)
            .with_context(|| format!("opening deck {}", settings.deck_dir.display()))?;
        let engine = EngineHandle::new(Arc::new(backend), Arc::new(host), settings.pipeline.clone())
            .context("starting the engine runtime")?;
        Ok(Self {
            state: AppState::new(),
            runner: EffectRunner::new(engine),
            printed: Vec::new(),
        })
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
        if self.state.consume_dirty() {
            self.render();
        }
    }

    /// Print the lines that changed since the last render.
    fn render(&mut self) {
        let lines = render(&self.state.view());
        for (index, line) in lines.iter().enumerate() {
            if self.printed.get(index) != Some(line) {
                println!("{line}");
            }
        }
        self.printed = lines;
    }

    /// Pump engine events until no operation is in flight.
    fn settle(&mut self) -> anyhow::Result<()> {
        while self.state.busy().any_in_flight() {
            let next = self
                .runner
                .next_msg(TICK)
                .context("waiting for the engine")?;
            if let Some(msg) = next {
                self.dispatch(msg);
            }
            self.dispatch(Msg::Tick(Instant::now()));
        }
        Ok(())
    }

    pub fn identify(&mut self, activity: &str) -> anyhow::Result<()> {
        self.dispatch(Msg::IdentifierChanged(activity.to_string()));
        self.dispatch(Msg::IdentifyClicked);
        self.settle()?;
        if self.state.selection().activity().is_none() {
            bail!("{}", self.state.view().status.verify.message);
        }
        Ok(())
    }

    pub fn select_grade(&mut self, label: &str) -> anyhow::Result<()> {
        let Some(grade) = GradeLevel::from_label(label) else {
            let known: Vec<&str> = SELECTABLE_GRADES.iter().map(|grade| grade.label()).collect();
            bail!("unknown grade level {label:?}; expected one of {}", known.join(", "));
        };
        self.dispatch(Msg::GradeSelected(Some(grade.index())));
        Ok(())
    }

    pub fn edit_links(&mut self, links: &LinkArgs) {
        for msg in link_edits(links, Instant::now()) {
            self.dispatch(msg);
        }
    }

    pub fn generate(&mut self) -> anyhow::Result<()> {
        let controls = self.state.controls();
        if controls.generate.disabled {
            bail!("{}", controls.generate_advisory.message);
        }
        self.runner.watch_interrupts();
        println!("Press Ctrl-C to stop after the current slide.");
        self.dispatch(Msg::GenerateClicked);
        self.settle()?;
        outcome(&self.state.view().status.generation)
    }

    pub fn sync_links(&mut self, assume_yes: bool) -> anyhow::Result<()> {
        let controls = self.state.controls();
        if controls.sync_links.disabled {
            bail!("{}", controls.sync_links_advisory.message);
        }
        self.dispatch(Msg::SyncLinksClicked);

        let notice = self
            .state
            .controls()
            .export_prompt
            .map(|prompt| prompt.notice)
            .unwrap_or_default();
        if assume_yes || confirm(&notice)? {
            self.dispatch(Msg::ExportConfirmed);
        } else {
            slides_info!("Export abandoned at the prompt");
            self.dispatch(Msg::ExportCancelled);
            return Ok(());
        }
        self.settle()?;
        outcome(&self.state.view().status.sync_links)
    }

    pub fn create_variation(&mut self) -> anyhow::Result<()> {
        let controls = self.state.controls();
        if controls.create_variation.disabled {
            bail!("{}", controls.create_variation_advisory.message);
        }
        self.dispatch(Msg::CreateVariationClicked);
        self.settle()?;
        outcome(&self.state.view().status.variation)
    }
}

/// Classify the links offline and print what the form would show.
/// Returns whether every link matches its role.
pub fn check_links(links: &LinkArgs) -> bool {
    let mut state = AppState::new();
    for msg in link_edits(links, Instant::now()) {
        state = update(state, msg).0;
    }
    let view = state.view();
    for line in link_lines(&view) {
        println!("{line}");
    }
    view.links
        .iter()
        .all(|link| link.kind == link.role.expected_kind())
}

fn link_edits(links: &LinkArgs, at: Instant) -> Vec<Msg> {
    [
        (LinkRole::Collaboration, &links.collaboration),
        (LinkRole::Template, &links.template),
        (LinkRole::PublicView, &links.public_view),
    ]
    .into_iter()
    .map(|(role, raw)| Msg::LinkEdited {
        role,
        raw: raw.clone(),
        at,
    })
    .collect()
}

fn outcome(advisory: &Advisory) -> anyhow::Result<()> {
    match advisory.tone {
        Tone::Warn => bail!("{}", advisory.message),
        Tone::Info | Tone::Positive => Ok(()),
    }
}

fn confirm(notice: &str) -> anyhow::Result<bool> {
    print!("{notice} Continue? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
