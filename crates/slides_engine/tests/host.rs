use std::fs;

use pretty_assertions::assert_eq;
use slides_core::ExportOutcome;
use slides_engine::{DocumentHost, MarkdownDeckHost, EXPORT_FILE_NAME};
use tempfile::TempDir;

#[tokio::test]
async fn pages_are_appended_in_order() {
    let temp = TempDir::new().unwrap();
    let host = MarkdownDeckHost::open(temp.path()).unwrap();

    host.append_page("play", "Warm up").await.unwrap();
    host.append_page("grow", "Take home").await.unwrap();

    assert_eq!(host.page_count(), 2);
    let pages = host.pages().unwrap();
    let names: Vec<_> = pages
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["page-001.md", "page-002.md"]);
    assert_eq!(
        fs::read_to_string(&pages[1]).unwrap(),
        "# grow\n\nTake home\n"
    );
}

#[tokio::test]
async fn reopening_continues_after_the_last_page() {
    let temp = TempDir::new().unwrap();
    {
        let host = MarkdownDeckHost::open(temp.path()).unwrap();
        host.append_page("play", "one").await.unwrap();
    }
    fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

    let host = MarkdownDeckHost::open(temp.path()).unwrap();
    assert_eq!(host.page_count(), 1);
    host.append_page("reflect", "two").await.unwrap();
    assert_eq!(host.pages().unwrap().len(), 2);
    assert!(temp.path().join("page-002.md").exists());
}

#[tokio::test]
async fn export_bundles_every_page() {
    let temp = TempDir::new().unwrap();
    let host = MarkdownDeckHost::open(temp.path()).unwrap();
    host.append_page("play", "first").await.unwrap();
    host.append_page("connect", "second").await.unwrap();

    let url = match host.request_export().await {
        ExportOutcome::Completed { url } => url,
        other => panic!("expected export, got {other:?}"),
    };
    assert!(url.starts_with("file://"), "{url}");
    assert!(url.ends_with(EXPORT_FILE_NAME), "{url}");

    let bundle = fs::read_to_string(temp.path().join(EXPORT_FILE_NAME)).unwrap();
    let first = bundle.find("first").unwrap();
    let second = bundle.find("second").unwrap();
    assert!(first < second);
    // The bundle is not mistaken for a page.
    assert_eq!(host.pages().unwrap().len(), 2);
}

#[tokio::test]
async fn exporting_an_empty_deck_fails() {
    let temp = TempDir::new().unwrap();
    let host = MarkdownDeckHost::open(temp.path()).unwrap();
    assert!(matches!(
        host.request_export().await,
        ExportOutcome::Failed { .. }
    ));
}
