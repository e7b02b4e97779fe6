mod app;
mod effects;
mod render;
mod settings;

pub use app::{check_links, Session};
pub(crate) use settings::{load_settings, save_settings, AppSettings, DEFAULT_SETTINGS_FILE};
