//! Remote state fetching.

use crate::error::{SyncError, SyncResult};
use crate::service::CardService;
use cardsync_codec::CardRecord;
use tracing::debug;

/// Fetches every card of a deck, following continuation tokens.
///
/// A page is terminal when it is empty, shorter than `page_size`, or carries
/// no (or an empty) continuation token. Cards are returned in service order
/// without deduplication.
///
/// # Errors
///
/// Any failing page aborts the whole fetch with
/// [`SyncError::RemoteFetchFailed`]; pages already retrieved are discarded.
pub fn fetch_remote_cards<S: CardService + ?Sized>(
    service: &S,
    deck_id: &str,
    page_size: u32,
) -> SyncResult<Vec<CardRecord>> {
    let mut cards = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = service
            .list_cards(deck_id, page_token.as_deref(), page_size)
            .map_err(|source| SyncError::RemoteFetchFailed {
                deck_id: deck_id.to_string(),
                pages_discarded: pages,
                source,
            })?;
        pages += 1;

        let count = page.cards.len();
        debug!(deck_id, page = pages, count, "fetched card page");
        cards.extend(page.cards);

        let full_page = count > 0 && count >= page_size as usize;
        match page.next_page_token {
            Some(token) if full_page && !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    debug!(deck_id, pages, total = cards.len(), "fetched remote deck");
    Ok(cards)
}
