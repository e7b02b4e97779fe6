use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use slides_engine::Pacing;
use slides_logging::{LogDestination, DEFAULT_LOG_FILE};

use crate::platform::{AppSettings, DEFAULT_SETTINGS_FILE};

#[derive(Parser)]
#[command(name = "slides")]
#[command(about = "Generate activity slide decks and keep their share links in the activity database")]
#[command(version)]
pub struct Cli {
    /// Settings file (RON); missing or malformed files fall back to defaults
    #[arg(long, env = "SLIDES_SETTINGS", default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,

    /// Backend base URL (overrides settings file)
    #[arg(long, env = "SLIDES_BACKEND_URL")]
    pub base_url: Option<String>,

    /// User id recorded on backend writes (overrides settings file)
    #[arg(long, env = "SLIDES_USER_ID")]
    pub user_id: Option<String>,

    /// Deck directory (overrides settings file)
    #[arg(long)]
    pub deck: Option<PathBuf>,

    /// Minimum milliseconds between page appends (overrides settings file)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log_to: LogTarget,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn apply_overrides(&self, settings: &mut AppSettings) {
        if let Some(base_url) = &self.base_url {
            settings.backend.base_url = base_url.clone();
        }
        if let Some(user_id) = &self.user_id {
            settings.backend.user_id = user_id.clone();
        }
        if let Some(deck) = &self.deck {
            settings.deck_dir = deck.clone();
        }
        if let Some(interval) = self.interval_ms {
            settings.pipeline.pacing = Pacing::FixedInterval(Duration::from_millis(interval));
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate slides for an activity and grade, appending them to the deck
    Generate {
        #[arg(long)]
        activity: String,
        /// Grade level label, e.g. "PK-K", "1-2" or "3-5"
        #[arg(long)]
        grade: String,
    },
    /// Export the deck, upload it and store the share links on the activity
    SyncLinks {
        #[arg(long)]
        activity: String,
        #[command(flatten)]
        links: LinkArgs,
        /// Skip the export confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Create a grade-level variation of a multi-grade activity
    CreateVariation {
        #[arg(long)]
        activity: String,
        #[arg(long)]
        grade: String,
        #[command(flatten)]
        links: LinkArgs,
    },
    /// Classify share links without contacting the backend
    CheckLinks {
        #[command(flatten)]
        links: LinkArgs,
    },
    /// Write the effective settings to the settings file
    InitSettings {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct LinkArgs {
    /// Collaboration link (".../edit?...")
    #[arg(long, default_value = "")]
    pub collaboration: String,
    /// Template link (".../view?...mode=preview")
    #[arg(long, default_value = "")]
    pub template: String,
    /// Public view link (".../view?...")
    #[arg(long, default_value = "")]
    pub public_view: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::parse_from([
            "slides",
            "--base-url",
            "https://slides.example",
            "--interval-ms",
            "250",
            "--deck",
            "decks/water",
            "generate",
            "--activity",
            "abc",
            "--grade",
            "1-2",
        ]);
        let mut settings = AppSettings::default();
        cli.apply_overrides(&mut settings);

        assert_eq!(settings.backend.base_url, "https://slides.example");
        assert_eq!(
            settings.pipeline.pacing,
            Pacing::FixedInterval(Duration::from_millis(250))
        );
        assert_eq!(settings.deck_dir, PathBuf::from("decks/water"));
        assert!(matches!(cli.command, Command::Generate { ref grade, .. } if grade == "1-2"));
    }

    #[test]
    fn sync_links_takes_all_three_links() {
        let cli = Cli::parse_from([
            "slides",
            "sync-links",
            "--activity",
            "abc",
            "--collaboration",
            "https://www.canva.com/design/D/edit?x=1",
            "--template",
            "https://www.canva.com/design/D/view?x=1&mode=preview",
            "--public-view",
            "https://www.canva.com/design/D/view?x=1",
            "-y",
        ]);
        match cli.command {
            Command::SyncLinks { links, yes, .. } => {
                assert!(yes);
                assert!(links.template.ends_with("mode=preview"));
            }
            _ => panic!("expected sync-links"),
        }
    }
}
