//! Pull command implementation.

use super::confirm;
use crate::deck_file::{deck_path, write_document};
use cardsync_engine::{CardService, SyncEngine};
use std::path::{Path, PathBuf};
use tracing::info;

/// Runs the pull command and returns the path written, if any.
pub fn run<S: CardService>(
    engine: &SyncEngine<S>,
    deck_id: &str,
    dir: &Path,
    yes: bool,
) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let pulled = engine.pull(deck_id)?;
    let path = deck_path(dir, &pulled.deck);

    if path.exists() && !yes && !confirm(&format!("Overwrite {}?", path.display()))? {
        println!("Aborted");
        return Ok(None);
    }

    write_document(&path, &pulled.document)?;
    info!(path = %path.display(), "wrote deck document");
    println!(
        "Pulled {} card(s) from \"{}\" into {}",
        pulled.records.len(),
        pulled.deck.deck_name,
        path.display()
    );
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardsync_codec::{decode_document, CardRecord};
    use cardsync_engine::MemoryCardService;
    use tempfile::tempdir;

    #[test]
    fn pull_writes_named_document() {
        let service = MemoryCardService::new();
        service.add_deck("d1", "Rust Basics");
        service.insert_card("d1", CardRecord::new("Q", "A").with_remote_id("c1"));
        let engine = SyncEngine::new(service);
        let dir = tempdir().unwrap();

        let path = run(&engine, "d1", dir.path(), true).unwrap().unwrap();
        assert_eq!(path, dir.path().join("rust-basics-d1.md"));
        let records = decode_document(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(records, vec![CardRecord::new("Q", "A").with_remote_id("c1")]);

        // Overwriting with --yes replaces the file.
        std::fs::write(&path, "stale").unwrap();
        run(&engine, "d1", dir.path(), true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("card_id: c1"));
    }

    #[test]
    fn pull_unknown_deck_fails() {
        let engine = SyncEngine::new(MemoryCardService::new());
        let dir = tempdir().unwrap();
        assert!(run(&engine, "nope", dir.path(), true).is_err());
    }
}
