use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use slides_core::ExportOutcome;
use slides_logging::{slides_debug, slides_info, slides_warn};
use thiserror::Error;
use url::Url;

use crate::persist::{ensure_deck_dir, AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("host refused the page: {0}")]
    Rejected(String),
}

/// The document being edited. Pages are only ever appended at the end.
#[async_trait::async_trait]
pub trait DocumentHost: Send + Sync {
    async fn append_page(&self, title: &str, body: &str) -> Result<(), HostError>;

    /// Export the whole document and return where the file can be fetched.
    async fn request_export(&self) -> ExportOutcome;
}

pub const EXPORT_FILE_NAME: &str = "deck.md";

const PAGE_PREFIX: &str = "page-";
const PAGE_SUFFIX: &str = ".md";

/// A deck stored as one markdown file per page in a directory.
///
/// Opening an existing directory continues numbering after its last page.
#[derive(Debug)]
pub struct MarkdownDeckHost {
    writer: AtomicFileWriter,
    page_count: Mutex<usize>,
}

impl MarkdownDeckHost {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let dir = dir.into();
        ensure_deck_dir(&dir)?;
        let existing = list_pages(&dir)?
            .last()
            .map(|(number, _)| *number)
            .unwrap_or(0);
        slides_debug!("Opened deck {} with {} pages", dir.display(), existing);
        Ok(Self {
            writer: AtomicFileWriter::new(dir),
            page_count: Mutex::new(existing),
        })
    }

    pub fn dir(&self) -> &Path {
        self.writer.dir()
    }

    pub fn page_count(&self) -> usize {
        self.page_count.lock().map(|count| *count).unwrap_or(0)
    }

    /// Page file paths in deck order.
    pub fn pages(&self) -> Result<Vec<PathBuf>, PersistError> {
        Ok(list_pages(self.dir())?
            .into_iter()
            .map(|(_, path)| path)
            .collect())
    }

    fn bundle(&self) -> Result<Option<PathBuf>, PersistError> {
        let pages = self.pages()?;
        if pages.is_empty() {
            return Ok(None);
        }
        let mut bundle = String::new();
        for (index, page) in pages.iter().enumerate() {
            if index > 0 {
                bundle.push_str("\n---\n\n");
            }
            bundle.push_str(&fs::read_to_string(page)?);
        }
        self.writer.write(EXPORT_FILE_NAME, &bundle).map(Some)
    }
}

#[async_trait::async_trait]
impl DocumentHost for MarkdownDeckHost {
    async fn append_page(&self, title: &str, body: &str) -> Result<(), HostError> {
        let mut count = self
            .page_count
            .lock()
            .map_err(|_| HostError::Rejected("page counter poisoned".to_string()))?;
        let number = *count + 1;
        let filename = format!("{PAGE_PREFIX}{number:03}{PAGE_SUFFIX}");
        self.writer
            .write(&filename, &format!("# {title}\n\n{body}\n"))?;
        *count = number;
        slides_debug!("Appended page {} ({})", number, title);
        Ok(())
    }

    async fn request_export(&self) -> ExportOutcome {
        match self.bundle() {
            Ok(Some(path)) => {
                let absolute = fs::canonicalize(&path).unwrap_or(path);
                match Url::from_file_path(&absolute) {
                    Ok(url) => {
                        slides_info!("Exported deck to {}", url);
                        ExportOutcome::Completed {
                            url: url.to_string(),
                        }
                    }
                    Err(()) => ExportOutcome::Failed {
                        message: format!("{} has no file URL", absolute.display()),
                    },
                }
            }
            Ok(None) => {
                slides_warn!("Export requested for an empty deck");
                ExportOutcome::Failed {
                    message: "the deck has no pages".to_string(),
                }
            }
            Err(err) => {
                slides_warn!("Export failed: {}", err);
                ExportOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }
}

fn list_pages(dir: &Path) -> Result<Vec<(usize, PathBuf)>, PersistError> {
    let mut pages = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let number = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix(PAGE_PREFIX))
            .and_then(|rest| rest.strip_suffix(PAGE_SUFFIX))
            .and_then(|digits| digits.parse::<usize>().ok());
        if let Some(number) = number {
            pages.push((number, path));
        }
    }
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages)
}
