//! Decks command implementation.

use cardsync_engine::{CardService, SyncEngine};

/// Runs the decks command.
pub fn run<S: CardService>(engine: &SyncEngine<S>) -> Result<(), Box<dyn std::error::Error>> {
    let mut decks = engine.list_decks()?;
    if decks.is_empty() {
        println!("No decks found");
        return Ok(());
    }

    decks.sort_by(|a, b| a.deck_name.cmp(&b.deck_name));
    let width = decks.iter().map(|d| d.deck_name.chars().count()).max().unwrap_or(0);
    for deck in &decks {
        println!("{:<width$}  {}", deck.deck_name, deck.deck_id, width = width);
    }
    Ok(())
}
