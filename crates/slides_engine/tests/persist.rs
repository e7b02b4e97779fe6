use std::fs;

use slides_engine::{ensure_deck_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_deck_dir() {
    let temp = TempDir::new().unwrap();
    let deck = temp.path().join("decks").join("leaf-hunt");
    assert!(!deck.exists());
    ensure_deck_dir(&deck).unwrap();
    assert!(deck.is_dir());
}

#[test]
fn rejects_a_file_in_place_of_the_deck_dir() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let err = ensure_deck_dir(&file_path).unwrap_err();
    assert!(matches!(err, PersistError::DeckDir { .. }), "{err}");
}

#[test]
fn rewriting_a_page_replaces_its_content() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path());

    let first = writer.write("page-001.md", "# play\n\nold\n").unwrap();
    assert_eq!(first.file_name().unwrap(), "page-001.md");

    let second = writer.write("page-001.md", "# play\n\nnew\n").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "# play\n\nnew\n");
    // Only the page remains; no temp files are left behind.
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn failed_write_leaves_nothing_behind() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("page-001.md", "data").is_err());
    assert!(!file_path.with_file_name("page-001.md").exists());
}
