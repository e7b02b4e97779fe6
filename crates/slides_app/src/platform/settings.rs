use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slides_engine::{AtomicFileWriter, BackendSettings, PersistError, PipelineSettings};
use slides_logging::{slides_info, slides_warn};

pub(crate) const DEFAULT_SETTINGS_FILE: &str = "slides_settings.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppSettings {
    pub backend: BackendSettings,
    pub pipeline: PipelineSettings,
    /// Directory holding the generated deck pages.
    pub deck_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            pipeline: PipelineSettings::default(),
            deck_dir: PathBuf::from("deck"),
        }
    }
}

/// Read settings from `path`. A missing or unreadable file yields defaults.
pub(crate) fn load_settings(path: &Path) -> AppSettings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            slides_info!("No settings at {:?}; using defaults", path);
            return AppSettings::default();
        }
        Err(err) => {
            slides_warn!("Failed to read settings from {:?}: {}", path, err);
            return AppSettings::default();
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => {
            slides_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            slides_warn!("Failed to parse settings from {:?}: {}", path, err);
            AppSettings::default()
        }
    }
}

pub(crate) fn save_settings(path: &Path, settings: &AppSettings) -> Result<PathBuf, PersistError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_SETTINGS_FILE);

    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(settings, pretty).map_err(|err| {
        PersistError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })?;
    AtomicFileWriter::new(dir).write(filename, &content)
}
