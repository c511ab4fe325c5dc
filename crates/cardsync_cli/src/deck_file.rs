//! Deck document naming and file access.

use cardsync_codec::DeckRef;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension of deck documents.
pub const EXTENSION: &str = "md";

/// Turns a deck name into a file-name-safe slug.
///
/// Keeps word characters, whitespace and `-`; runs of whitespace and `-`
/// become a single `-`; the result is lowercase with no leading or trailing
/// `-`.
pub fn sanitize_deck_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        }
    }
    slug
}

/// File name of a deck document: `<sanitized-name>-<deck_id>.md`.
pub fn deck_file_name(deck: &DeckRef) -> String {
    let slug = sanitize_deck_name(&deck.deck_name);
    if slug.is_empty() {
        format!("{}.{}", deck.deck_id, EXTENSION)
    } else {
        format!("{}-{}.{}", slug, deck.deck_id, EXTENSION)
    }
}

/// Deck id encoded in a document path: the last `-` component of the stem.
pub fn deck_id_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let id = stem.rsplit('-').next()?.trim();
    (!id.is_empty()).then(|| id.to_string())
}

/// Path of a deck document inside `dir`.
pub fn deck_path(dir: &Path, deck: &DeckRef) -> PathBuf {
    dir.join(deck_file_name(deck))
}

/// Reads a deck document.
pub fn read_document(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Writes a deck document, creating parent directories as needed.
pub fn write_document(path: &Path, document: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sanitize_names() {
        assert_eq!(sanitize_deck_name("Rust Basics"), "rust-basics");
        assert_eq!(sanitize_deck_name("  C++ / Pointers!  "), "c-pointers");
        assert_eq!(sanitize_deck_name("a - b__c"), "a-b__c");
        assert_eq!(sanitize_deck_name("--x--"), "x");
        assert_eq!(sanitize_deck_name("???"), "");
    }

    #[test]
    fn file_name_round_trips_deck_id() {
        let deck = DeckRef::new("AbC123", "Rust Basics");
        let name = deck_file_name(&deck);
        assert_eq!(name, "rust-basics-AbC123.md");
        assert_eq!(deck_id_from_path(Path::new(&name)).as_deref(), Some("AbC123"));

        let unnamed = DeckRef::new("xyz", "!!!");
        assert_eq!(deck_file_name(&unnamed), "xyz.md");
        assert_eq!(deck_id_from_path(Path::new("xyz.md")).as_deref(), Some("xyz"));
    }

    #[test]
    fn deck_id_missing() {
        assert_eq!(deck_id_from_path(Path::new("notes-.md")), None);
        assert_eq!(deck_id_from_path(Path::new("")), None);
    }

    #[test]
    fn write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deck-d1.md");
        write_document(&path, "---\ncard_id: c1\n---\nQ\n---\nA\n").unwrap();
        assert_eq!(read_document(&path).unwrap(), "---\ncard_id: c1\n---\nQ\n---\nA\n");
    }
}
