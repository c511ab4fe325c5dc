//! Push command implementation.

use super::confirm;
use crate::deck_file::{deck_id_from_path, read_document, write_document};
use cardsync_engine::{CardService, ExecutionReport, PushPlan, SyncEngine};
use std::path::Path;
use tracing::info;

/// Options of the push command.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushOptions {
    /// Bypass duplicate detection.
    pub force: bool,
    /// Skip the confirmation prompt.
    pub yes: bool,
    /// Only print the plan.
    pub dry_run: bool,
}

/// Runs the push command.
///
/// After execution the document is rewritten with the ids of newly created
/// or matched cards, even when a later write failed. A document that gains
/// no id is left byte for byte as it was.
pub fn run<S: CardService>(
    engine: &SyncEngine<S>,
    path: &Path,
    options: PushOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let deck_id = deck_id_from_path(path)
        .ok_or_else(|| format!("cannot determine deck id from {}", path.display()))?;
    let document = read_document(path)?;

    let planned = engine.plan_push(&deck_id, &document, options.force)?;
    print_plan(&deck_id, &planned);

    if options.dry_run {
        println!("(dry run - no changes will be made)");
        return Ok(());
    }

    if planned.is_empty() {
        println!("Nothing to push");
        save_ids(path, &planned, &ExecutionReport::default())?;
        return Ok(());
    }

    let question = format!("Apply {} operation(s) to deck {}?", planned.plan.len(), deck_id);
    if !options.yes && !confirm(&question)? {
        println!("Aborted");
        return Ok(());
    }

    match engine.execute(&deck_id, &planned.plan) {
        Ok(report) => {
            save_ids(path, &planned, &report)?;
            println!(
                "✓ Push complete: {} created, {} updated, {} deleted",
                report.created_count(),
                report.updated_count(),
                report.deleted_count()
            );
            Ok(())
        }
        Err(err) => {
            if let Some(report) = err.report() {
                print_partial(report);
                save_ids(path, &planned, report)?;
            }
            Err(err.into())
        }
    }
}

fn print_plan(deck_id: &str, planned: &PushPlan) {
    println!(
        "Deck {}: {} local card(s), {} remote card(s)",
        deck_id,
        planned.local.len(),
        planned.remote.len()
    );
    println!("Plan: {}", planned.plan.summary());
    for operation in &planned.plan.operations {
        println!("  {}", operation);
    }
    for duplicate in &planned.plan.duplicates {
        let question = planned
            .local
            .get(duplicate.local_index)
            .map(|record| record.question.lines().next().unwrap_or_default())
            .unwrap_or_default();
        println!(
            "  skip \"{}\": already exists as {}",
            question, duplicate.remote_id
        );
    }
}

fn print_partial(report: &ExecutionReport) {
    println!("Push stopped after {} operation(s).", report.applied.len());
    if let Some(failed) = &report.failed {
        println!("  failed: {}", failed);
    }
    for operation in &report.not_attempted {
        println!("  not attempted: {}", operation);
    }
}

fn save_ids(path: &Path, planned: &PushPlan, report: &ExecutionReport) -> std::io::Result<()> {
    if let Some(updated) = planned.document_with_new_ids(report) {
        write_document(path, &updated)?;
        info!(path = %path.display(), "updated card ids in document");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardsync_codec::{decode_document, CardRecord};
    use cardsync_engine::MemoryCardService;
    use std::fs;
    use tempfile::tempdir;

    const DOCUMENT: &str = "---\ncard_id: c1\n---\nQ1\n---\nA1\n---\ncard_id: null\n---\nQ2\n---\nA2\n";

    fn engine() -> SyncEngine<MemoryCardService> {
        let service = MemoryCardService::new();
        service.add_deck("d1", "Rust");
        service.insert_card("d1", CardRecord::new("Q1-old", "A1").with_remote_id("c1"));
        service.insert_card("d1", CardRecord::new("Qx", "Ax").with_remote_id("c9"));
        SyncEngine::new(service)
    }

    fn options(dry_run: bool) -> PushOptions {
        PushOptions {
            force: false,
            yes: true,
            dry_run,
        }
    }

    #[test]
    fn push_applies_plan_and_saves_ids() {
        let engine = engine();
        let dir = tempdir().unwrap();
        let path = dir.path().join("rust-d1.md");
        fs::write(&path, DOCUMENT).unwrap();

        run(&engine, &path, options(false)).unwrap();

        let remote = engine.service().cards("d1");
        assert_eq!(remote.len(), 2);
        let local = decode_document(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(local.iter().all(|record| !record.is_pending()));
        assert_eq!(local[1].remote_id, remote[1].remote_id);
    }

    #[test]
    fn dry_run_changes_nothing() {
        let engine = engine();
        let dir = tempdir().unwrap();
        let path = dir.path().join("rust-d1.md");
        fs::write(&path, DOCUMENT).unwrap();

        run(&engine, &path, options(true)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), DOCUMENT);
        assert_eq!(engine.service().cards("d1").len(), 2);
        assert_eq!(engine.service().cards("d1")[0].question, "Q1-old");
    }

    #[test]
    fn failed_push_still_saves_created_ids() {
        let engine = engine();
        engine.service().fail_write_at(1);
        let dir = tempdir().unwrap();
        let path = dir.path().join("rust-d1.md");
        fs::write(&path, DOCUMENT).unwrap();

        assert!(run(&engine, &path, options(false)).is_err());
        let local = decode_document(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(!local[1].is_pending());
    }

    #[test]
    fn push_without_new_ids_keeps_file_bytes() {
        let engine = engine();
        let dir = tempdir().unwrap();
        let path = dir.path().join("rust-d1.md");
        let document = "# My Rust deck notes\n\n---\ncard_id: c1\n---\nQ1\n---\nA1\n---\ncard_id: c9\n---\nQx\n---\nAx\n";
        fs::write(&path, document).unwrap();

        // Only an update: no card gains an id.
        run(&engine, &path, options(false)).unwrap();
        assert_eq!(engine.service().cards("d1")[0].question, "Q1");
        assert_eq!(fs::read_to_string(&path).unwrap(), document);

        // Nothing to push at all.
        run(&engine, &path, options(false)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), document);
    }

    #[test]
    fn missing_deck_id_is_an_error() {
        let engine = engine();
        let dir = tempdir().unwrap();
        let path = dir.path().join("-.md");
        fs::write(&path, DOCUMENT).unwrap();
        assert!(run(&engine, &path, options(false)).is_err());
    }
}
