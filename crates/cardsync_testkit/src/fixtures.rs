//! Test fixtures and service helpers.
//!
//! Provides sample decks, seeded in-memory services and temporary deck
//! files for common test scenarios.

use cardsync_codec::{CardRecord, DeckRef};
use cardsync_engine::MemoryCardService;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Id of the sample deck.
pub const SAMPLE_DECK_ID: &str = "d1";

/// Name of the sample deck.
pub const SAMPLE_DECK_NAME: &str = "Rust Basics";

/// A local document with a changed card and a new card.
pub const SAMPLE_LOCAL_DOCUMENT: &str = "\
# Rust Basics
---
card_id: c1
tags: [\"rust\"]
---
What does `&mut` mean?
---
An exclusive borrow.
---
card_id: null
---
What is a lifetime?
---
The scope a reference is valid for.
";

/// Remote cards matching [`SAMPLE_LOCAL_DOCUMENT`] before it was edited.
pub fn sample_remote_cards() -> Vec<CardRecord> {
    vec![
        card(Some("c1"), "What does `&mut` mean?", "A mutable borrow.").with_tags(["rust"]),
        card(Some("c9"), "Is Rust garbage collected?", "No."),
    ]
}

/// Builds a card record.
pub fn card(remote_id: Option<&str>, question: &str, answer: &str) -> CardRecord {
    let record = CardRecord::new(question, answer);
    match remote_id {
        Some(id) => record.with_remote_id(id),
        None => record,
    }
}

/// Creates an in-memory service holding one deck with the given cards.
///
/// Cards without an id get one assigned by the service.
pub fn seeded_service(deck_id: &str, cards: &[CardRecord]) -> MemoryCardService {
    let service = MemoryCardService::new();
    service.add_deck(deck_id, SAMPLE_DECK_NAME);
    for card in cards {
        service.insert_card(deck_id, card.clone());
    }
    service
}

/// A deck document in a temporary directory, removed on drop.
pub struct TestDeckFile {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestDeckFile {
    /// Writes `document` to `<name>-<deck_id>.md` in a fresh directory.
    pub fn new(deck: &DeckRef, document: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir
            .path()
            .join(format!("{}-{}.md", deck.deck_name.to_lowercase().replace(' ', "-"), deck.deck_id));
        fs::write(&path, document).expect("Failed to write deck document");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Path of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents of the document.
    pub fn read(&self) -> String {
        fs::read_to_string(&self.path).expect("Failed to read deck document")
    }
}
